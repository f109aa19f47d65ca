use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use image_recognition::client::{ClientError, RecognitionClient};
use image_recognition::config::ServerConfig;
use image_recognition::models::Recognition;
use image_recognition::services::recognizer::Recognizer;
use image_recognition::{AppState, create_app};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(state);
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{}", addr)
}

fn write_test_image(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("flight.jpg");
    DynamicImage::new_rgb8(16, 16)
        .save_with_format(&path, ImageFormat::Jpeg)
        .unwrap();
    path
}

#[tokio::test]
async fn test_submit_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let upload_dir = tmp.path().join("received_images");
    let url = spawn_server(AppState::new(&ServerConfig::development(&upload_dir))).await;

    let client = RecognitionClient::new(url, Duration::from_secs(30)).unwrap();
    let result = client.submit(&write_test_image(tmp.path())).await.unwrap();

    assert!(result.success);
    assert_eq!(result.objects, vec!["猫", "沙发", "电视"]);
    assert_eq!(result.confidence, vec![0.95, 0.87, 0.76]);
    assert_eq!(result.error, None);

    let saved: Vec<_> = std::fs::read_dir(&upload_dir).unwrap().collect();
    assert_eq!(saved.len(), 1);
    let name = saved[0].as_ref().unwrap().file_name();
    let name = name.to_string_lossy();
    assert!(name.starts_with("test_image_"));
    assert!(name.ends_with("_127_0_0_1.jpg"));
}

#[tokio::test]
async fn test_status() {
    let tmp = tempfile::tempdir().unwrap();
    let url = spawn_server(AppState::new(&ServerConfig::development(tmp.path()))).await;

    let client = RecognitionClient::new(url, Duration::from_secs(30)).unwrap();
    let status = client.status().await.unwrap();
    assert_eq!(status.status, "running");
}

struct FailingRecognizer;

#[async_trait]
impl Recognizer for FailingRecognizer {
    async fn recognize(&self, _image: &DynamicImage) -> anyhow::Result<Recognition> {
        Err(anyhow::anyhow!("model unavailable"))
    }
}

#[tokio::test]
async fn test_non_200_carries_raw_body() {
    let tmp = tempfile::tempdir().unwrap();
    let mut state = AppState::new(&ServerConfig::development(tmp.path()));
    state.recognizer = Arc::new(FailingRecognizer);
    let url = spawn_server(state).await;

    let client = RecognitionClient::new(url, Duration::from_secs(30)).unwrap();
    let err = client
        .submit(&write_test_image(tmp.path()))
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("model unavailable"));
            assert!(body.contains("\"success\":false"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout() {
    let tmp = tempfile::tempdir().unwrap();
    // accepts connections but never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = RecognitionClient::new(format!("http://{}", addr), Duration::from_millis(200))
        .unwrap();
    let err = client
        .submit(&write_test_image(tmp.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let tmp = tempfile::tempdir().unwrap();
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = RecognitionClient::new(format!("http://{}", addr), Duration::from_secs(5))
        .unwrap();
    let err = client
        .submit(&write_test_image(tmp.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {:?}", err);
}
