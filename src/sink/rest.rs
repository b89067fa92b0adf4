use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client, Request};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use url::Url;

use crate::{
    config::TrackerConfig,
    models::{PageViewRecord, SessionRecord},
};

use super::AnalyticsSink;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Writes records to a PostgREST-style API (`POST /rest/v1/<table>`).
///
/// Each write is a detached task on the runtime the sink was built on. Page
/// teardown never cancels it; hosts that are about to exit can [`drain`]
/// whatever is still in flight.
///
/// [`drain`]: RestSink::drain
#[derive(Clone)]
pub struct RestSink {
    client: Client,
    api_key: String,
    sessions_url: Url,
    page_views_url: Url,
    runtime: Handle,
    in_flight: TaskTracker,
}

fn table_url(base: &Url, table: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("rest/v1/{table}"))
        .with_context(|| format!("invalid table endpoint for {table}"))
}

impl RestSink {
    pub fn new(config: &TrackerConfig, runtime: Handle) -> Result<Self> {
        let (api_url, api_key) = config
            .api_credentials()
            .ok_or_else(|| anyhow!("analytics API url and key are required"))?;

        let base = Url::parse(api_url).with_context(|| format!("invalid analytics API url {api_url}"))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("analytics API url must be http(s), got {}", base.scheme()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build analytics HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            sessions_url: table_url(&base, &config.sessions_table)?,
            page_views_url: table_url(&base, &config.page_views_table)?,
            runtime,
            in_flight: TaskTracker::new(),
        })
    }

    fn build_request<T: Serialize>(&self, url: &Url, payload: &T) -> Result<Request> {
        self.client
            .post(url.clone())
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .json(payload)
            .build()
            .context("failed to build analytics request")
    }

    pub fn session_request(&self, record: &SessionRecord) -> Result<Request> {
        self.build_request(&self.sessions_url, record)
    }

    pub fn page_view_request(&self, record: &PageViewRecord) -> Result<Request> {
        self.build_request(&self.page_views_url, record)
    }

    fn dispatch(&self, what: &'static str, request: Result<Request>) {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                log_warn!("Dropping {what} write: {err:#}");
                return;
            }
        };

        let client = self.client.clone();
        self.in_flight.spawn_on(
            async move {
                let url = request.url().clone();
                match client.execute(request).await.and_then(|resp| resp.error_for_status()) {
                    Ok(_) => log_debug!("{what} written to {url}"),
                    Err(err) => log_warn!("{what} write to {url} failed: {err}"),
                }
            },
            &self.runtime,
        );
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Waits for every write spawned so far. The sink keeps accepting writes.
    pub async fn drain(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
        self.in_flight.reopen();
    }
}

impl AnalyticsSink for RestSink {
    fn insert_session(&self, record: SessionRecord) {
        let request = self.session_request(&record);
        self.dispatch("session", request);
    }

    fn insert_page_view(&self, record: PageViewRecord) {
        let request = self.page_view_request(&record);
        self.dispatch("page view", request);
    }
}
