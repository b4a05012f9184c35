use image::{ImageFormat, Rgb, RgbImage};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::io::Cursor;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

// Use atomic counter to give each test a unique port
static PORT_COUNTER: AtomicU16 = AtomicU16::new(9400);

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ErrorResponse {
    error: String,
    code: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct InfoResponse {
    version: String,
    engine: String,
    available_engines: Vec<String>,
    supported_formats: Vec<String>,
    default_languages: String,
    default_high_quality: bool,
    max_dimension: u32,
    max_file_size_bytes: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HealthResponse {
    status: String,
    version: String,
}

struct TestServer {
    child: Child,
    port: u16,
}

impl TestServer {
    /// Start the server with a tesseract path that cannot exist
    fn start() -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);

        let child = Command::new(env!("CARGO_BIN_EXE_photo-ocr-server"))
            .args([
                "--host",
                "127.0.0.1",
                "--port",
                &port.to_string(),
                "--engine",
                "tesseract",
                "--tesseract-path",
                "/nonexistent/photo-ocr-test/tesseract",
            ])
            .spawn()
            .expect("Failed to start server");

        let server = Self { child, port };
        server.wait_until_ready();
        server
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    fn wait_until_ready(&self) {
        let addr = format!("127.0.0.1:{}", self.port);
        for _ in 0..100 {
            if std::net::TcpStream::connect(&addr).is_ok() {
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        panic!("Server on port {} did not start", self.port);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn sample_png() -> Vec<u8> {
    let img = RgbImage::from_fn(120, 40, |x, _| {
        if x % 10 < 5 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

async fn post_file(
    client: &reqwest::Client,
    base_url: &str,
    filename: &str,
    bytes: Vec<u8>,
    mime_type: &str,
) -> reqwest::Response {
    let part = Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(mime_type)
        .unwrap();

    let form = Form::new()
        .part("file", part)
        .text("mode", "upload")
        .text("high_quality", "false");

    client
        .post(format!("{}/ocr", base_url))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response: HealthResponse = client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
}

#[tokio::test]
async fn test_info_endpoint() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response: InfoResponse = client
        .get(format!("{}/info", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(!response.version.is_empty());
    assert_eq!(response.engine, "tesseract");
    assert!(response.available_engines.contains(&"tesseract".to_string()));
    assert_eq!(response.default_languages, "jpn+eng");
    assert!(response.default_high_quality);
    assert_eq!(response.max_dimension, 800);
    assert_eq!(response.supported_formats, ["image/jpeg", "image/png"]);
}

#[tokio::test]
async fn test_index_page() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response = client
        .get(server.base_url())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Extract text"));
}

#[tokio::test]
async fn test_missing_engine_reports_unavailable() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response = post_file(
        &client,
        &server.base_url(),
        "page.png",
        sample_png(),
        "image/png",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.code, "ENGINE_UNAVAILABLE");

    // Server keeps serving after the failure
    let health = client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .unwrap();
    assert!(health.status().is_success());
}

#[tokio::test]
async fn test_text_file_with_jpg_name_is_decode_error() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let response = post_file(
        &client,
        &server.base_url(),
        "photo.jpg",
        b"this is just a note, not a photo of anything at al".to_vec(),
        "image/jpeg",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.code, "DECODE_ERROR");
}

#[tokio::test]
async fn test_missing_file_field() {
    let server = TestServer::start();
    let client = reqwest::Client::new();

    let form = Form::new().text("mode", "capture");
    let response = client
        .post(format!("{}/ocr", server.base_url()))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.code, "MISSING_FILE");
}
