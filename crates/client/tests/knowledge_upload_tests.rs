//! Knowledge upload tests against a mock HTTP server

use agentos_bus::MemoryNotifier;
use agentos_client::{
    ClientError, FileSource, KnowledgeApi, RemoteEndpoint, ResourceClient, UploadCandidate,
};
use mockito::{Matcher, Server};
use std::sync::Arc;

fn client() -> ResourceClient {
    ResourceClient::new(Arc::new(MemoryNotifier::new()))
}

fn batch() -> Vec<UploadCandidate> {
    vec![
        UploadCandidate::from_bytes("a.pdf", vec![0u8; 1024]),
        UploadCandidate::from_bytes("b.csv", b"x,y\n1,2\n".to_vec()),
    ]
}

#[tokio::test]
async fn test_upload_sends_one_part_per_file() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/knowledge/upload")
        .match_header("authorization", "Bearer k")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files"; filename="a.pdf""#.to_string()),
            Matcher::Regex(r#"name="files"; filename="b.csv""#.to_string()),
            Matcher::Regex("Content-Type: text/csv".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"ingested": 2, "documents": [
            {"filename": "a.pdf", "status": "ok"},
            {"filename": "b.csv", "status": "ok"}
        ]}"#)
        .create_async()
        .await;

    let endpoint = RemoteEndpoint::new(server.url()).with_token("k");
    let outcome = client().upload_knowledge(&endpoint, &batch()).await.unwrap();

    assert_eq!(outcome.ingested, 2);
    assert!(!outcome.has_errors());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_reports_per_file_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/knowledge/upload")
        .with_status(200)
        .with_body(r#"{"ingested": 1, "documents": [
            {"filename": "a.pdf", "status": "ok"},
            {"filename": "b.csv", "status": "error", "message": "corrupt"}
        ]}"#)
        .create_async()
        .await;

    let outcome = client()
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &batch())
        .await
        .unwrap();

    assert_eq!(outcome.ingested, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].filename, "b.csv");
    assert_eq!(outcome.errors[0].message.as_deref(), Some("corrupt"));
}

#[tokio::test]
async fn test_upload_tolerates_silently_dropped_files() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/knowledge/upload")
        .with_status(200)
        .with_body(r#"{"ingested": 1, "documents": []}"#)
        .create_async()
        .await;

    let outcome = client()
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &batch())
        .await
        .unwrap();

    assert_eq!(outcome.ingested, 1);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_upload_non_ok_raises_with_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/knowledge/upload")
        .with_status(400)
        .with_body(r#"{"detail": "Máximo de 5 arquivos por requisição"}"#)
        .create_async()
        .await;

    let err = client()
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &batch())
        .await
        .unwrap_err();

    match err {
        ClientError::Http {
            operation,
            status,
            detail,
        } => {
            assert_eq!(operation, "upload knowledge");
            assert_eq!(status, 400);
            assert_eq!(detail, "Máximo de 5 arquivos por requisição");
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_non_ok_empty_body_uses_status_reason() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/knowledge/upload")
        .with_status(502)
        .create_async()
        .await;

    let err = client()
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &batch())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(
        err.to_string(),
        "upload knowledge failed (502): Bad Gateway"
    );
}

#[tokio::test]
async fn test_upload_unreadable_file_fails_before_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/knowledge/upload")
        .expect(0)
        .create_async()
        .await;

    let missing = UploadCandidate::new(
        "gone.md",
        10,
        FileSource::Path("/definitely/not/here/gone.md".into()),
    );
    let err = client()
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &[missing])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::File { ref name, .. } if name == "gone.md"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_through_trait_object() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/knowledge/upload")
        .with_body(r#"{"ingested": 0, "documents": [{"filename": "a.pdf", "status": "error"}]}"#)
        .create_async()
        .await;

    let api: Arc<dyn KnowledgeApi> = Arc::new(client());
    let outcome = api
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &batch()[..1])
        .await
        .unwrap();

    assert_eq!(outcome.ingested, 0);
    assert_eq!(outcome.errors[0].describe(), "a.pdf: ingestion failed");
}

#[tokio::test]
async fn test_upload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    tokio::fs::write(&path, "# Notes\nhello").await.unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/knowledge/upload")
        .match_body(Matcher::Regex("# Notes".to_string()))
        .with_body(r#"{"ingested": 1, "documents": [{"filename": "notes.md", "status": "ok"}]}"#)
        .create_async()
        .await;

    let candidate = UploadCandidate::from_path(&path).await.unwrap();
    let outcome = client()
        .upload_knowledge(&RemoteEndpoint::new(server.url()), &[candidate])
        .await
        .unwrap();

    assert_eq!(outcome.ingested, 1);
    mock.assert_async().await;
}
