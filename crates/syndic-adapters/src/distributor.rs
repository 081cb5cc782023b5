//! Dispatcher over the configured adapters

use syndic_core::Asset;

use crate::adapter::{Adapter, Distribution};
use crate::context::AuthContext;
use crate::error::{AdapterError, AdapterResult};

/// Result of one adapter within a dispatch.
#[derive(Debug)]
pub struct VendorOutcome {
    pub vendor: String,
    pub result: AdapterResult<Distribution>,
}

/// Authorization redirect that ended a dispatch before every vendor ran.
#[derive(Debug)]
pub struct Interruption {
    pub vendor: String,
    pub error: AdapterError,
}

/// Per-vendor results of distributing one asset.
///
/// `outcomes` holds the vendors that ran, including those completed before an
/// interruption; their identifiers are already cached.
#[derive(Debug)]
pub struct DistributionReport {
    pub asset: String,
    pub outcomes: Vec<VendorOutcome>,
    pub interruption: Option<Interruption>,
}

impl DistributionReport {
    fn new(asset: &Asset) -> Self {
        Self {
            asset: asset.id().to_string(),
            outcomes: Vec::new(),
            interruption: None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interruption.is_some()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &Distribution> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &AdapterError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.vendor.as_str(), e)))
    }

    pub fn is_success(&self) -> bool {
        !self.is_interrupted() && self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Upload,
    Update,
    Remove,
}

/// Runs an operation over every adapter that supports the asset, one after
/// the other, so the identifier map of an asset is never written concurrently.
///
/// A vendor failure is recorded and the next adapter runs. A pending
/// authorization redirect ends the dispatch instead, since the user-agent has
/// to come back with the callback first. The report then carries the
/// interruption next to the outcomes of the vendors that already ran.
#[derive(Debug, Default)]
pub struct Distributor {
    adapters: Vec<Box<dyn Adapter>>,
}

impl Distributor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Box<dyn Adapter>) {
        tracing::debug!(vendor = %adapter.vendor(), "Adapter registered");
        self.adapters.push(adapter);
    }

    pub fn with_adapter(mut self, adapter: Box<dyn Adapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn vendors(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.vendor()).collect()
    }

    /// Vendors whose adapter accepts the asset.
    pub fn supporting(&self, asset: &Asset) -> Vec<&str> {
        self.adapters
            .iter()
            .filter(|a| a.support(asset))
            .map(|a| a.vendor())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Upload the asset to every supporting vendor.
    pub async fn distribute(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<DistributionReport> {
        self.run(Operation::Upload, asset, ctx).await
    }

    pub async fn refresh(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<DistributionReport> {
        self.run(Operation::Update, asset, ctx).await
    }

    pub async fn withdraw(
        &mut self,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<DistributionReport> {
        self.run(Operation::Remove, asset, ctx).await
    }

    async fn run(
        &mut self,
        operation: Operation,
        asset: &Asset,
        ctx: &mut AuthContext<'_>,
    ) -> AdapterResult<DistributionReport> {
        let mut report = DistributionReport::new(asset);

        for adapter in self.adapters.iter_mut().filter(|a| a.support(asset)) {
            let result = match operation {
                Operation::Upload => adapter.upload(asset, ctx).await,
                Operation::Update => adapter.update(asset, ctx).await,
                Operation::Remove => adapter.remove(asset, ctx).await,
            };

            match result {
                Ok(distribution) => {
                    tracing::info!(
                        vendor = %distribution.vendor,
                        asset = %asset,
                        action = %distribution.action,
                        "Distribution step completed"
                    );
                    report.outcomes.push(VendorOutcome {
                        vendor: adapter.vendor().to_string(),
                        result: Ok(distribution),
                    });
                }
                Err(err) if err.interrupts_chain() => {
                    tracing::info!(
                        vendor = %adapter.vendor(),
                        asset = %asset,
                        operation = ?operation,
                        completed = report.outcomes.len(),
                        "Distribution interrupted for authorization"
                    );
                    report.interruption = Some(Interruption {
                        vendor: adapter.vendor().to_string(),
                        error: err,
                    });
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        vendor = %adapter.vendor(),
                        asset = %asset,
                        operation = ?operation,
                        error_code = err.error_code(),
                        error = %err,
                        "Distribution step failed"
                    );
                    report.outcomes.push(VendorOutcome {
                        vendor: adapter.vendor().to_string(),
                        result: Err(err),
                    });
                }
            }
        }

        Ok(report)
    }
}
