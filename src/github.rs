use crate::model::{RunOutcome, WorkflowRef};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("build http client: {0}")]
    Client(String),
    #[error("request {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

/// The latest run of a workflow, before any time zone conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestRun {
    Found {
        conclusion: Option<String>,
        updated_at: String,
    },
    HttpStatus(u16),
    NoRuns,
}

impl LatestRun {
    pub fn into_outcome(self, updated_at: impl FnOnce(String) -> String) -> RunOutcome {
        match self {
            LatestRun::Found {
                conclusion,
                updated_at: raw,
            } => RunOutcome::Completed {
                conclusion,
                updated_at: updated_at(raw),
            },
            LatestRun::HttpStatus(code) => RunOutcome::HttpStatus(code),
            LatestRun::NoRuns => RunOutcome::NoRuns,
        }
    }
}

/// Source of workflow run status. The report loop only talks to this.
pub trait RunFetcher {
    fn latest_run(&self, workflow: &WorkflowRef) -> Result<LatestRun, FetchError>;
}

#[derive(Debug, Deserialize)]
struct RunsPage {
    workflow_runs: Vec<RunSummary>,
}

#[derive(Debug, Deserialize)]
struct RunSummary {
    conclusion: Option<String>,
    updated_at: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    base_url: String,
}

impl Client {
    pub fn new(token: &str, base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FetchError::Client("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("wfdash/", env!("CARGO_PKG_VERSION"))),
        );

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn runs_url(&self, workflow: &WorkflowRef) -> String {
        format!("{}/{}", self.base_url, workflow.runs_path())
    }
}

impl RunFetcher for Client {
    fn latest_run(&self, workflow: &WorkflowRef) -> Result<LatestRun, FetchError> {
        let url = self.runs_url(workflow);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(LatestRun::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;
        parse_runs_page(&body).map_err(|message| FetchError::Malformed { url, message })
    }
}

fn parse_runs_page(body: &[u8]) -> Result<LatestRun, String> {
    let page: RunsPage = serde_json::from_slice(body).map_err(|e| e.to_string())?;

    Ok(match page.workflow_runs.into_iter().next() {
        Some(run) => LatestRun::Found {
            conclusion: run.conclusion,
            updated_at: run.updated_at,
        },
        None => LatestRun::NoRuns,
    })
}
