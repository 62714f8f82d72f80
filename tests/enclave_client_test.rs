mod common;

use serde_json::json;

use common::{config_for, gray_png, start_sandbox, write_blob};
use enclave_algo::common::error::EnclaveError;
use enclave_algo::enclave::{LogData, LogStatus, Report, ReportJsonSchema, ReportStatus};
use enclave_algo::EnclaveClient;

#[tokio::test]
async fn test_list_and_download() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let image = gray_png(128);
    write_blob(data.path(), "nofinding/x.png", &image);
    write_blob(data.path(), "covid/y.png", b"raw");

    let (_sandbox, addr) = start_sandbox(data.path()).await;
    let client = EnclaveClient::new(&config_for(addr, scratch.path()).enclave).unwrap();

    let listing = client.list_files(None).await.unwrap();
    let names: Vec<&str> = listing.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["covid/y.png", "nofinding/x.png"]);
    assert_eq!(listing.files[1].size, Some(image.len() as u64));

    let bytes = client.download_file("nofinding/x.png", None).await.unwrap();
    assert_eq!(bytes, image);
}

#[tokio::test]
async fn test_sas_url_is_sent_encoded() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    write_blob(data.path(), "covid/y.png", b"raw");

    let (_sandbox, addr) = start_sandbox(data.path()).await;
    let client = EnclaveClient::new(&config_for(addr, scratch.path()).enclave).unwrap();

    // The sandbox rejects a sas_url that isn't valid base64
    let sas = "https://account.blob.core.windows.net/data?sv=2022&sig=a%2Bb";
    assert_eq!(client.list_files(Some(sas)).await.unwrap().files.len(), 1);
    assert_eq!(
        client.download_file("covid/y.png", Some(sas)).await.unwrap(),
        b"raw".to_vec()
    );
}

#[tokio::test]
async fn test_missing_file_is_status_error() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let (_sandbox, addr) = start_sandbox(data.path()).await;
    let client = EnclaveClient::new(&config_for(addr, scratch.path()).enclave).unwrap();

    match client.download_file("covid/nope.png", None).await {
        Err(EnclaveError::Status { status, endpoint, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(endpoint, "api/v1/data/file");
        }
        other => panic!("expected 404, got {:?}", other),
    }

    match client.download_file("../secret", None).await {
        Err(EnclaveError::Status { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected 400, got {:?}", other),
    }
}

#[tokio::test]
async fn test_log_and_report_are_recorded() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let (sandbox, addr) = start_sandbox(data.path()).await;
    let client = EnclaveClient::new(&config_for(addr, scratch.path()).enclave).unwrap();

    let ack = client
        .post_log(&LogData::with_status("halfway", LogStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(ack.status.as_deref(), Some("ok"));

    let report = Report::new(
        "EscrowAI Algorithm Package",
        ReportStatus::Completed,
        json!({"report": "Performance Report"}),
    );
    client.post_report(&report).await.unwrap();

    assert_eq!(sandbox.logs().await[0].message, "halfway");
    assert_eq!(sandbox.reports().await, vec![report]);
}

#[tokio::test]
async fn test_validate_then_reject() {
    let data = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();

    let (sandbox, addr) = start_sandbox(data.path()).await;
    let client = EnclaveClient::new(&config_for(addr, scratch.path()).enclave).unwrap();

    let report = Report::new("Scores", ReportStatus::Completed, json!({"other": 1}))
        .with_schema(Some(ReportJsonSchema(json!({"required": ["report"]}))));

    let outcome = client.validate_report(&report).await.unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.errors, vec!["$: missing required property `report`"]);

    match client.post_report(&report).await {
        Err(EnclaveError::Status { status, body, .. }) => {
            assert_eq!(status, 422);
            assert!(body.contains("report"));
        }
        other => panic!("expected 422, got {:?}", other),
    }
    assert!(sandbox.reports().await.is_empty());
}

#[tokio::test]
async fn test_unreachable_enclave_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let scratch = tempfile::tempdir().unwrap();
    let client = EnclaveClient::new(&config_for(addr, scratch.path()).enclave).unwrap();

    assert!(matches!(
        client.post_log(&LogData::message("hello")).await,
        Err(EnclaveError::Transport { .. })
    ));
}
