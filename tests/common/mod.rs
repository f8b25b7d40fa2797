#![allow(dead_code)]
//! Shared integration test utilities: a scripted transport and a recording sink.

use reqwest::Url;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use ski_results_client::{parse_base_url, ApiClient, ClientError, HttpGet, HttpResponse, RenderSink};

pub const BASE_URL: &str = "http://results.test";

static INIT_LOGGING: Once = Once::new();

/// Routes test logs through the test harness writer. Set RUST_LOG to see them.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Answers GETs from a fixed table keyed by path; unknown paths get a 404.
/// Records the order of requests and how many were in flight at once.
#[derive(Default)]
pub struct ScriptedHttp {
    routes: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        ScriptedHttp::default()
    }

    pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(path.to_string(), HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl HttpGet for ScriptedHttp {
    async fn get(&self, url: &Url) -> Result<HttpResponse, ClientError> {
        let path = url.path().to_string();
        self.requests.lock().unwrap().push(path.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let any other pending request start before this one completes
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(self
            .routes
            .get(&path)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "404 Not Found\n")))
    }
}

pub fn client(http: ScriptedHttp) -> ApiClient<ScriptedHttp> {
    init_test_logging();
    ApiClient::new(http, parse_base_url(BASE_URL).unwrap())
}

/// Keeps everything a page renders as flat strings
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl RecordingSink {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn messages(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| line.strip_prefix("message: "))
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn heading(&mut self, text: &str) {
        self.lines.push(format!("heading: {}", text));
    }

    fn field(&mut self, label: &str, value: &str) {
        self.lines.push(format!("{}: {}", label, value));
    }

    fn text(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn link(&mut self, label: &str, href: &str) {
        self.lines.push(format!("link: {} {}", label, href));
    }

    fn blank(&mut self) {}

    fn message(&mut self, text: &str) {
        self.lines.push(format!("message: {}", text));
    }
}
