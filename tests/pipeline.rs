use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tempfile::TempDir;

use python_fetch::catalog::CatalogError;
use python_fetch::common::config::{FetchConfig, ReleaseSource};
use python_fetch::common::console::Console;
use python_fetch::common::models::Platform;
use python_fetch::pipeline::{self, PipelineError};

const LINUX: &str = "cpython-3.12.1+v1-x86_64-unknown-linux-gnu-install_only.tar.gz";
const MACOS: &str = "cpython-3.12.1+v1-aarch64-apple-darwin-install_only.tar.gz";
const WINDOWS: &str = "cpython-3.12.1+v1-x86_64-pc-windows-msvc-install_only.tar.gz";
const DEBUG_BUILD: &str = "cpython-3.12.1+v1-x86_64-unknown-linux-gnu-debug-full.tar.zst";

#[derive(Clone)]
struct TestServer {
    base: String,
    transfers: Arc<AtomicUsize>,
}

impl TestServer {
    fn transfers(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }

    fn config(&self, repo: &str, output_dir: &Path, platforms: Vec<Platform>) -> FetchConfig {
        FetchConfig {
            source: ReleaseSource {
                repo: repo.to_string(),
                api_base: self.base.clone(),
                download_base: format!("{}/dl", self.base),
                token: None,
            },
            platforms,
            workers: NonZeroUsize::new(3).unwrap(),
            output_dir: output_dir.to_path_buf(),
            transfer_timeout: Some(Duration::from_secs(30)),
        }
    }
}

async fn latest_release(
    State(server): State<TestServer>,
    UrlPath((_owner, repo)): UrlPath<(String, String)>,
) -> Response {
    let asset = |name: &str, route: &str| {
        json!({
            "name": name,
            "browser_download_url": format!("{}/{}/{}", server.base, route, name),
        })
    };

    match repo.as_str() {
        "r" => Json(json!({
            "tag_name": "v1",
            "assets": [
                asset(LINUX, "files"),
                asset(MACOS, "files"),
                asset(WINDOWS, "files"),
                asset(DEBUG_BUILD, "files"),
            ],
        }))
        .into_response(),
        "broken" => Json(json!({
            "tag_name": "v1",
            "assets": [asset(LINUX, "broken")],
        }))
        .into_response(),
        "untagged" => Json(json!({
            "tag_name": null,
            "assets": [asset(LINUX, "files")],
        }))
        .into_response(),
        "garbage" => "not json".into_response(),
        _ => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn manifest(
    State(server): State<TestServer>,
    UrlPath((_owner, _repo, tag)): UrlPath<(String, String, String)>,
) -> String {
    server.transfers.fetch_add(1, Ordering::SeqCst);
    format!("deadbeef  {}\n", tag)
}

async fn artifact(State(server): State<TestServer>, UrlPath(name): UrlPath<String>) -> String {
    server.transfers.fetch_add(1, Ordering::SeqCst);
    format!("payload of {}", name)
}

async fn broken_artifact(State(server): State<TestServer>) -> StatusCode {
    server.transfers.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_server() -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = TestServer {
        base: format!("http://{}", addr),
        transfers: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/repos/{owner}/{repo}/releases/latest", get(latest_release))
        .route(
            "/dl/{owner}/{repo}/releases/download/{tag}/SHA256SUMS",
            get(manifest),
        )
        .route("/files/{name}", get(artifact))
        .route("/broken/{name}", get(broken_artifact))
        .with_state(server.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    server
}

#[derive(Clone, Default)]
struct Output(Arc<Mutex<Vec<u8>>>);

impl Output {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture_console() -> (Arc<Console>, Output) {
    let output = Output::default();
    (Arc::new(Console::new(output.clone())), output)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_platform_run() {
    let server = spawn_server().await;
    let temp = TempDir::new().unwrap();
    let (console, output) = capture_console();

    let config = server.config("o/r", temp.path(), vec![Platform::Linux]);
    let report = pipeline::run(&config, console).await.unwrap();

    assert_eq!(report.planned, 2);
    let summary = report.summary.unwrap();
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 0);

    let folder = temp.path().join("Linux/Python");
    assert_eq!(
        std::fs::read_to_string(folder.join(LINUX)).unwrap(),
        format!("payload of {}", LINUX)
    );
    assert_eq!(
        std::fs::read_to_string(folder.join("SHA256SUMS-v1.txt")).unwrap(),
        "deadbeef  v1\n"
    );
    assert!(!folder.join(DEBUG_BUILD).exists());
    assert!(!temp.path().join("macOS").exists());

    let text = output.contents();
    assert!(text.contains("使用 3 个并发任务"));
    assert!(text.contains("成功: 2, 失败: 0"));
    assert!(text.contains("Linux: 1 个文件"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rerun_performs_no_transfers() {
    let server = spawn_server().await;
    let temp = TempDir::new().unwrap();
    let config = server.config("o/r", temp.path(), Platform::ALL.to_vec());

    let (console, _) = capture_console();
    let first = pipeline::run(&config, console).await.unwrap();
    assert_eq!(first.planned, 6);
    assert_eq!(first.summary.unwrap().succeeded(), 6);
    assert_eq!(server.transfers(), 6);

    for platform in Platform::ALL {
        assert_eq!(first.catalog.artifact_count(platform), 1);
    }

    let (console, output) = capture_console();
    let second = pipeline::run(&config, console).await.unwrap();
    assert_eq!(second.planned, 0);
    assert_eq!(second.skipped, 6);
    assert!(second.summary.is_none());
    assert_eq!(server.transfers(), 6);

    let text = output.contents();
    assert!(text.contains("没有需要下载的文件"));
    assert!(text.contains(&format!("跳过 {} (已存在)", WINDOWS)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_transfer_leaves_no_file() {
    let server = spawn_server().await;
    let temp = TempDir::new().unwrap();
    let config = server.config("o/broken", temp.path(), vec![Platform::Linux]);

    let (console, output) = capture_console();
    let report = pipeline::run(&config, console).await.unwrap();

    let summary = report.summary.unwrap();
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);

    let folder = temp.path().join("Linux/Python");
    assert!(folder.join("SHA256SUMS-v1.txt").exists());
    assert!(!folder.join(LINUX).exists());
    assert!(!folder.join(format!("{}.part", LINUX)).exists());
    assert!(output.contents().contains(&format!("下载失败 {}", LINUX)));

    // 失败的文件在下一次运行时会重新下载
    let (console, _) = capture_console();
    let rerun = pipeline::run(&config, console).await.unwrap();
    assert_eq!(rerun.planned, 1);
    assert_eq!(rerun.skipped, 1);
}

#[tokio::test]
async fn test_catalog_errors_are_fatal() {
    let server = spawn_server().await;
    let temp = TempDir::new().unwrap();

    let (console, _) = capture_console();
    let config = server.config("o/down", temp.path(), Platform::ALL.to_vec());
    let result = pipeline::run(&config, console).await;
    assert!(matches!(
        result,
        Err(PipelineError::Catalog(CatalogError::Status(503)))
    ));

    let (console, _) = capture_console();
    let config = server.config("o/garbage", temp.path(), Platform::ALL.to_vec());
    let result = pipeline::run(&config, console).await;
    assert!(matches!(
        result,
        Err(PipelineError::Catalog(CatalogError::Decode(_)))
    ));

    // 没有任何下载被尝试
    assert_eq!(server.transfers(), 0);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_null_tag_gives_empty_run() {
    let server = spawn_server().await;
    let temp = TempDir::new().unwrap();

    let (console, output) = capture_console();
    let config = server.config("o/untagged", temp.path(), Platform::ALL.to_vec());
    let report = pipeline::run(&config, console).await.unwrap();

    assert_eq!(report.planned, 0);
    assert!(report.summary.is_none());
    for platform in Platform::ALL {
        assert_eq!(report.catalog.artifact_count(platform), 0);
    }
    assert_eq!(server.transfers(), 0);
    assert!(output.contents().contains("没有需要下载的文件"));
}
