//! Syndic CLI: distribute local media files to the configured vendors.
//!
//! Vendors are configured through `{VENDOR}_CLIENT_ID`, `{VENDOR}_CLIENT_SECRET`
//! and `{VENDOR}_REDIRECT_URI`. Stores follow `STORE_BACKEND`/`LOCAL_STORE_PATH`;
//! credentials are encrypted at rest when `ENCRYPTION_KEY` is set.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use syndic_adapters::{
    AuthContext, CallbackRequest, DistributionReport, MemorySession, NonInteractive,
};
use syndic_cli::{
    asset_from_file, build_distributor, canonical_vendor, explain, init_tracing, report_to_json,
    vendors_to_json,
};
use syndic_core::encryption::KEY_ENV;
use syndic_core::{Asset, AssetKind, Credential, EncryptionService, StoreConfig};
use syndic_store::{create_stores, IdentifierCache, Owner};

#[derive(Parser)]
#[command(name = "syndic", about = "Distribute media assets to hosting vendors")]
struct Cli {
    /// Owner whose vendor accounts and identifiers are used
    #[arg(long, global = true, default_value = "default")]
    owner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AssetArgs {
    /// Path to the media file
    file: PathBuf,
    /// Stable asset identity (defaults to the file stem)
    #[arg(long)]
    id: Option<String>,
    /// Asset kind: video, image, audio, document (defaults to the extension)
    #[arg(long)]
    kind: Option<AssetKind>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Restrict to a single vendor
    #[arg(long)]
    vendor: Option<String>,
}

impl AssetArgs {
    fn asset(&self) -> anyhow::Result<Asset> {
        asset_from_file(
            &self.file,
            self.id.as_deref(),
            self.kind,
            self.title.as_deref(),
            self.description.as_deref(),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an asset (updates it where it was already distributed)
    Upload(AssetArgs),
    /// Push an asset's metadata to every vendor
    Update(AssetArgs),
    /// Delete an asset from every vendor it was distributed to
    Remove(AssetArgs),
    /// Show the vendor identifiers recorded for an asset
    Status {
        /// Asset identity
        id: String,
    },
    /// Store an access token obtained out-of-band for a vendor
    Login {
        vendor: String,
        token: String,
    },
    /// List the supported vendors and asset kinds
    Vendors,
}

#[derive(Clone, Copy)]
enum Operation {
    Upload,
    Update,
    Remove,
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn dispatch(
    owner: &Owner,
    args: &AssetArgs,
    operation: Operation,
) -> anyhow::Result<DistributionReport> {
    let asset = args.asset()?;
    let mut distributor = build_distributor(owner, args.vendor.as_deref())?;

    if distributor.supporting(&asset).is_empty() {
        anyhow::bail!(
            "No configured vendor accepts {} asset '{}'",
            asset.kind(),
            asset.id()
        );
    }

    let mut request = CallbackRequest::new();
    let session = MemorySession::new();
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);

    let report = match operation {
        Operation::Upload => distributor.distribute(&asset, &mut ctx).await,
        Operation::Update => distributor.refresh(&asset, &mut ctx).await,
        Operation::Remove => distributor.withdraw(&asset, &mut ctx).await,
    };
    report.map_err(explain)
}

/// Print the report, then fail if a vendor still needs authorization.
fn finish(mut report: DistributionReport) -> anyhow::Result<()> {
    print_json(&report_to_json(&report))?;
    match report.interruption.take() {
        Some(interruption) => Err(explain(interruption.error)),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let store_config = StoreConfig::from_env().context("Invalid store configuration")?;
    let encryption = match std::env::var(KEY_ENV) {
        Ok(_) => Some(EncryptionService::from_env().context("Invalid ENCRYPTION_KEY")?),
        Err(_) => None,
    };
    let stores = create_stores(&store_config, encryption)
        .await
        .context("Failed to open stores")?;
    let owner = Owner::new(
        cli.owner,
        stores.credentials.clone(),
        stores.identifiers.clone(),
    );

    match cli.command {
        Commands::Upload(args) => {
            finish(dispatch(&owner, &args, Operation::Upload).await?)?;
        }
        Commands::Update(args) => {
            finish(dispatch(&owner, &args, Operation::Update).await?)?;
        }
        Commands::Remove(args) => {
            finish(dispatch(&owner, &args, Operation::Remove).await?)?;
        }
        Commands::Status { id } => {
            let identifiers = stores
                .identifiers
                .fetch(&id)
                .await
                .context("Failed to read identifier cache")?
                .unwrap_or_default();
            print_json(&json!({ "asset": id, "identifiers": identifiers }))?;
        }
        Commands::Login { vendor, token } => {
            let vendor = canonical_vendor(&vendor)
                .with_context(|| format!("Unknown vendor '{}'", vendor))?;
            owner
                .set_account(vendor, &Credential::bearer(token))
                .await
                .context("Failed to store credential")?;
            print_json(&json!({ "owner": owner.id(), "vendor": vendor, "stored": true }))?;
        }
        Commands::Vendors => {
            print_json(&vendors_to_json())?;
        }
    }

    Ok(())
}
