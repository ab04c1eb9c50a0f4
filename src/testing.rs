//! Shared test helpers: scratch directories, a test configuration, a
//! recording dispatcher and a loopback webhook endpoint.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::contact::ContactMessage;
use crate::notify::NotificationDispatch;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh empty directory under the system temp dir
pub fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!(
        "contact-relay-{label}-{}-{}-{nanos}",
        std::process::id(),
        DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Default configuration rooted in `dir`: log file `dir/messages.jsonl`,
/// static root `dir/static`
pub fn config(dir: &Path) -> Config {
    let mut config = Config::load_from(
        "contact-relay-test-config-does-not-exist",
        Some("http://127.0.0.1:9/webhook".to_string()),
    )
    .unwrap();
    config.storage.messages_file = dir.join("messages.jsonl").display().to_string();
    config.static_files.root = dir.join("static").display().to_string();
    config.logging.access_log = false;
    config
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(ToString::to_string)
        .collect()
}

/// URL nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/webhook")
}

/// Dispatcher that keeps every message instead of sending it
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<ContactMessage>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<ContactMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationDispatch for RecordingDispatcher {
    fn dispatch(&self, message: ContactMessage) {
        self.sent.lock().unwrap().push(message);
    }
}

/// A request received by the loopback webhook
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Start a webhook endpoint on 127.0.0.1 answering every request with
/// `status`; returns its URL and the stream of captured requests
pub async fn spawn_webhook(status: StatusCode) -> (String, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let tx = tx.clone();
                    async move {
                        let (parts, body) = req.into_parts();
                        let body = body
                            .collect()
                            .await
                            .map(|c| c.to_bytes())
                            .unwrap_or_default();
                        let _ = tx.send(CapturedRequest {
                            method: parts.method,
                            path: parts.uri.path().to_string(),
                            content_type: parts
                                .headers
                                .get(hyper::header::CONTENT_TYPE)
                                .and_then(|v| v.to_str().ok())
                                .map(ToString::to_string),
                            body,
                        });
                        let mut response = Response::new(Full::new(Bytes::new()));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    (format!("http://{addr}/webhook"), rx)
}
