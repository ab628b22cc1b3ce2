use simsweep_client::{Backend, ClientError, HttpBackend};
use simsweep_core::ClientConfig;

#[test]
fn test_backend_keeps_config() {
    let config = ClientConfig::new("http://127.0.0.1:5000/").unwrap();
    let backend = HttpBackend::new(config).unwrap();
    assert_eq!(backend.config().base_url, "http://127.0.0.1:5000");
    assert_eq!(
        backend.config().url(&backend.config().progress_endpoint),
        "http://127.0.0.1:5000/progress/data"
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Port 9 (discard) is closed on test machines; the connection is refused.
    let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
    let backend = HttpBackend::new(config).unwrap();

    let err = backend.list_directories("/").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
    assert!(!err.is_rejection());
}
