mod helpers;

use helpers::{Harness, OWNER};
use serde_json::json;
use syndic_adapters::{
    Adapter, AdapterError, AuthContext, AuthState, CallbackRequest, DistributionAction,
    Distributor, MemorySession, NonInteractive, Redirect, RedirectMode, ResponseRedirect,
    Session, StateSide, Vimeo, VimeoAdapter, YouTube, YouTubeAdapter,
};
use syndic_core::{EncryptionService, StoreBackend, StoreConfig};
use syndic_store::{create_stores, CredentialStore, Owner};

#[tokio::test]
async fn test_state_mismatch_never_reaches_token_endpoint() {
    let mut harness = Harness::new().await;
    let token = harness.mock_token::<Vimeo>("never-issued", 0).await;

    let session = MemorySession::new();
    session.set("vimeo_state", "xyz").await.unwrap();
    let mut request = CallbackRequest::from_query("code=valid-code&state=abc");
    let sink = ResponseRedirect::new();
    let mut ctx = AuthContext::new(&mut request, &session, &sink);

    let mut adapter: VimeoAdapter = harness.adapter();
    let err = adapter.authenticate(&mut ctx).await.unwrap_err();

    assert!(matches!(err, AdapterError::StateMismatch { .. }));
    assert!(err.is_csrf_failure());
    assert!(!adapter.is_authenticated());
    assert!(sink.issued().is_none());
    token.assert_async().await;
}

#[tokio::test]
async fn test_missing_state_on_either_side_is_rejected() {
    let mut harness = Harness::new().await;
    let token = harness.mock_token::<Vimeo>("never-issued", 0).await;

    // No state in the session.
    let session = MemorySession::new();
    let mut request = CallbackRequest::from_query("code=valid-code&state=abc");
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
    let mut adapter: VimeoAdapter = harness.adapter();
    let err = adapter.authenticate(&mut ctx).await.unwrap_err();
    assert!(matches!(
        err,
        AdapterError::MissingState {
            side: StateSide::Session,
            ..
        }
    ));

    // No state in the request.
    session.set("vimeo_state", "abc").await.unwrap();
    let mut request = CallbackRequest::from_query("code=valid-code");
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
    let mut adapter: VimeoAdapter = harness.adapter();
    let err = adapter.authenticate(&mut ctx).await.unwrap_err();
    assert!(matches!(
        err,
        AdapterError::MissingState {
            side: StateSide::Request,
            ..
        }
    ));

    token.assert_async().await;
}

#[tokio::test]
async fn test_non_interactive_context_cannot_start_authorization() {
    let harness = Harness::new().await;
    let mut adapter: VimeoAdapter = harness.adapter();

    let mut request = CallbackRequest::new();
    let session = MemorySession::new();
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
    let asset = harness.video("video-42");

    let err = adapter.upload(&asset, &mut ctx).await.unwrap_err();
    match err {
        AdapterError::RedirectUnavailable { location } => {
            assert!(location.contains("/vimeo/authorize"));
            assert!(location.contains("client_id=client-id"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(adapter.auth_state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_redirect_and_callback_round_trip() {
    let mut harness = Harness::new().await;
    let token = harness.mock_token::<Vimeo>("fresh-token", 1).await;
    let session = MemorySession::new();

    // First request: no credential, the user-agent is sent to the vendor.
    let location = {
        let mut request = CallbackRequest::new();
        let sink = ResponseRedirect::new();
        let mut ctx = AuthContext::new(&mut request, &session, &sink);
        let mut adapter: VimeoAdapter = harness.adapter();

        let err = adapter.authenticate(&mut ctx).await.unwrap_err();
        assert!(err.interrupts_chain());
        assert_eq!(adapter.auth_state(), AuthState::AwaitingCallback);

        match sink.take() {
            Some(Redirect::Location(location)) => location,
            other => panic!("expected a header redirect, got {other:?}"),
        }
    };

    let state = session.get("vimeo_state").await.unwrap().unwrap();
    assert!(location.contains(&format!("state={}", state)));
    assert!(location.contains("response_type=code"));

    // Second request: the vendor calls back with the code and the same state.
    let mut request =
        CallbackRequest::from_query(&format!("?code=auth-code&state={}", state));
    let sink = ResponseRedirect::new();
    let mut ctx = AuthContext::new(&mut request, &session, &sink);
    let mut adapter: VimeoAdapter = harness.adapter();

    adapter.authenticate(&mut ctx).await.unwrap();
    assert!(adapter.is_authenticated());
    assert!(sink.issued().is_none());
    assert_eq!(ctx.request.query("code"), None);
    assert!(session.get("vimeo_state").await.unwrap().is_none());
    token.assert_async().await;

    // Third request: the stored credential is enough.
    let mut request = CallbackRequest::new();
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
    let mut adapter: VimeoAdapter = harness.adapter();
    adapter.authenticate(&mut ctx).await.unwrap();
    assert_eq!(
        adapter.credentials().await.unwrap().unwrap().access_token,
        "fresh-token"
    );
}

#[tokio::test]
async fn test_client_redirect_mode_produces_html() {
    let harness = Harness::new().await;
    let mut request = CallbackRequest::new();
    let session = MemorySession::new();
    let sink = ResponseRedirect::new();
    let mut ctx =
        AuthContext::new(&mut request, &session, &sink).with_mode(RedirectMode::Client);

    let mut adapter: VimeoAdapter = harness.adapter();
    let err = adapter.authenticate(&mut ctx).await.unwrap_err();
    assert!(matches!(err, AdapterError::AuthorizationPending { .. }));

    let Some(Redirect::Html(body)) = sink.issued() else {
        panic!("expected an HTML redirect");
    };
    assert!(body.contains("window.location.href"));
    assert!(body.contains("/vimeo/authorize"));
}

#[tokio::test]
async fn test_authenticated_adapter_does_not_reauthorize() {
    let mut harness = Harness::new().await;
    let token = harness.mock_token::<Vimeo>("fresh-token", 1).await;
    let create = harness
        .mock_create::<Vimeo>(json!({"uri": "vimeo-uri-1"}), 1)
        .await;
    let update = harness
        .mock_resource::<Vimeo>("PATCH", "vimeo-uri-1", 1)
        .await;

    let session = MemorySession::new();
    session.set("vimeo_state", "s1").await.unwrap();
    let mut request = CallbackRequest::from_query("code=auth-code&state=s1");
    let sink = ResponseRedirect::new();
    let mut ctx = AuthContext::new(&mut request, &session, &sink);

    let asset = harness.video("video-42");
    let mut adapter: VimeoAdapter = harness.adapter();
    adapter.upload(&asset, &mut ctx).await.unwrap();
    adapter.authenticate(&mut ctx).await.unwrap();
    adapter.upload(&asset, &mut ctx).await.unwrap();

    token.assert_async().await;
    create.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_rejected_code_is_terminal_for_the_adapter() {
    let mut harness = Harness::new().await;
    let token = harness
        .server
        .mock("POST", "/vimeo/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .expect(1)
        .create_async()
        .await;

    let session = MemorySession::new();
    session.set("vimeo_state", "s1").await.unwrap();
    let mut request = CallbackRequest::from_query("code=stale&state=s1");
    let sink = ResponseRedirect::new();
    let mut ctx = AuthContext::new(&mut request, &session, &sink);

    let mut adapter: VimeoAdapter = harness.adapter();
    match adapter.authenticate(&mut ctx).await.unwrap_err() {
        AdapterError::Authentication { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(adapter.auth_state(), AuthState::AuthenticationFailed);

    let err = adapter.authenticate(&mut ctx).await.unwrap_err();
    assert!(matches!(err, AdapterError::AuthenticationLocked { .. }));
    token.assert_async().await;
}

#[tokio::test]
async fn test_consumed_callback_is_invisible_to_next_vendor() {
    let mut harness = Harness::new().await;
    harness.authorize::<YouTube>("youtube-token").await;
    let vimeo_token = harness.mock_token::<Vimeo>("vimeo-token", 1).await;
    let youtube_token = harness.mock_token::<YouTube>("unused", 0).await;
    let _vimeo_create = harness
        .mock_create::<Vimeo>(json!({"uri": "vimeo-uri-1"}), 1)
        .await;
    let _youtube_create = harness
        .mock_create::<YouTube>(json!({"id": "yt-1"}), 1)
        .await;

    let vimeo: VimeoAdapter = harness.adapter();
    let youtube: YouTubeAdapter = harness.adapter();
    let mut distributor = Distributor::new()
        .with_adapter(Box::new(vimeo))
        .with_adapter(Box::new(youtube));

    let session = MemorySession::new();
    session.set("vimeo_state", "s1").await.unwrap();
    let mut request = CallbackRequest::from_query("code=auth-code&state=s1");
    let sink = ResponseRedirect::new();
    let mut ctx = AuthContext::new(&mut request, &session, &sink);

    let asset = harness.video("video-42");
    let report = distributor.distribute(&asset, &mut ctx).await.unwrap();

    assert!(report.is_success());
    assert!(report
        .succeeded()
        .all(|d| d.action == DistributionAction::Created));
    assert_eq!(ctx.request.query("code"), None);
    vimeo_token.assert_async().await;
    youtube_token.assert_async().await;
}

#[tokio::test]
async fn test_credentials_persist_encrypted_across_adapters() {
    let mut harness = Harness::new().await;
    let token = harness.mock_token::<Vimeo>("sealed-token", 1).await;
    let dir = tempfile::tempdir().unwrap();

    let config = StoreConfig {
        backend: StoreBackend::Local,
        local_path: dir.path().to_path_buf(),
    };
    let encryption = EncryptionService::from_key_bytes(&[3u8; 32]).unwrap();
    let stores = create_stores(&config, Some(encryption)).await.unwrap();
    let owner = Owner::new(OWNER, stores.credentials.clone(), stores.identifiers.clone());

    let vimeo_config = harness.adapter::<Vimeo>().configuration().clone();

    let session = MemorySession::new();
    session.set("vimeo_state", "s1").await.unwrap();
    let mut request = CallbackRequest::from_query("code=auth-code&state=s1");
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
    let mut adapter = VimeoAdapter::new(owner.clone(), vimeo_config.clone()).unwrap();
    adapter.authenticate(&mut ctx).await.unwrap();
    token.assert_async().await;

    let on_disk = std::fs::read_to_string(dir.path().join("accounts/alice/Vimeo.json")).unwrap();
    assert!(!on_disk.contains("sealed-token"));

    let mut request = CallbackRequest::new();
    let mut ctx = AuthContext::new(&mut request, &session, &NonInteractive);
    let mut adapter = VimeoAdapter::new(owner, vimeo_config).unwrap();
    adapter.authenticate(&mut ctx).await.unwrap();
    assert!(adapter.is_authenticated());

    let stored = stores
        .credentials
        .get("accounts/alice/Vimeo")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token, "sealed-token");
}
