use crate::github::DEFAULT_API_URL;
use crate::model::WorkflowRef;
use crate::timestamp::{self, DEFAULT_ZONE, Zone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

pub const CURRENT_VERSION: i32 = 1;
pub const DEFAULT_TITLE: &str = "LF Workflow Dashboard";
pub const DEFAULT_STYLESHEET: &str = "style.css";

/// `time_zone` value that keeps API timestamps exactly as received.
pub const NO_ZONE: &str = "none";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,99}$").expect("valid regex"));

static WORKFLOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_][A-Za-z0-9_.-]*\.ya?ml|[0-9]+)$").expect("valid regex")
});

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"version: 1

dashboard:
  title: "LF Workflow Dashboard"
  stylesheet: "style.css"
  time_zone: "America/New_York"   # IANA name, "+HH:MM", "UTC", or "none" to keep API timestamps

api:
  url: "https://api.github.com"
  # timeout: "30s"

workflows:
  - group: ASV Formatter
    owner: lincc-frameworks
    repo: asv-formatter
    workflows: [smoke-test.yml, testing-and-coverage.yml]

  - group: Hipscat
    owner: astronomy-commons
    repo: hipscat
    workflows: [smoke-test.yml, testing-and-coverage.yml, asv-nightly.yml, build-documentation.yml]

  - group: Hipscat Import
    owner: astronomy-commons
    repo: hipscat-import
    workflows: [smoke-test.yml, testing-and-coverage.yml, build-documentation.yml]

  - group: Koffi
    owner: lincc-frameworks
    repo: koffi
    workflows: [smoke-test.yml, testing-and-coverage.yml]

  - group: LSDB
    owner: astronomy-commons
    repo: lsdb
    workflows: [smoke-test.yml, testing-and-coverage.yml, asv-nightly.yml, build-documentation.yml]

  - group: PPT
    owner: lincc-frameworks
    repo: python-project-template
    workflows: [ci.yml]

  - group: Rail
    owner: lsstdesc
    repo: rail
    workflows: [build_documentation.yml, smoke-test.yml, testing-and-coverage.yml]

  - group: Rail
    owner: lsstdesc
    repo: rail_base
    workflows: [smoke-test.yml, testing-and-coverage.yml]

  - group: Rail
    owner: lsstdesc
    repo: rail_pipelines
    workflows: [main.yml]

  - group: Tables IO
    owner: lsstdesc
    repo: tables_io
    workflows: [smoke-test.yml, testing-and-coverage.yml]

  - group: Tape
    owner: lincc-frameworks
    repo: tape
    workflows: [build-documentation.yml, smoke-test.yml, testing-and-coverage.yml]
"#;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub version: i32,
    pub dashboard: Dashboard,
    pub api: Api,
    pub workflows: Vec<RepoWorkflows>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Dashboard {
    pub title: String,
    pub stylesheet: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Api {
    pub url: String,
    pub timeout: String,
}

/// Several workflow files of one repository, listed under an optional group.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RepoWorkflows {
    pub group: String,
    pub owner: String,
    pub repo: String,
    pub workflows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub group: String,
    pub workflow: WorkflowRef,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub stylesheet: String,
    pub zone: Option<Zone>,
    pub api_url: String,
    pub timeout: Option<Duration>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    pub issues: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.issues.push(ValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.issues.first() {
            write!(
                f,
                "configuration validation failed: {}: {}",
                first.field, first.message
            )
        } else {
            write!(f, "configuration validation failed")
        }
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read config: {0}")]
    Read(#[source] io::Error),
    #[error("{0}")]
    Invalid(String),
}

impl LoadError {
    /// The file is missing, as opposed to present but unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::Read(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

pub fn load(path: &Path) -> Result<Config, LoadError> {
    let cfg = parse(path)?;
    validate(&cfg).map_err(|e| LoadError::Invalid(e.to_string()))?;
    Ok(cfg)
}

pub fn parse(path: &Path) -> Result<Config, LoadError> {
    let text = fs::read_to_string(path).map_err(LoadError::Read)?;
    parse_str(&text).map_err(LoadError::Invalid)
}

pub fn parse_str(text: &str) -> Result<Config, String> {
    serde_yaml::from_str(text).map_err(|e| format!("parse config yaml: {e}"))
}

/// The workflow list this dashboard ships with, used when no config file exists.
pub fn builtin() -> Result<Config, String> {
    parse_str(DEFAULT_CONFIG_TEMPLATE)
}

pub fn validate(cfg: &Config) -> Result<(), ValidationErrors> {
    let mut issues = ValidationErrors::new();

    if cfg.version != CURRENT_VERSION {
        issues.add("version", format!("must be {CURRENT_VERSION}"));
    }

    validate_dashboard(&mut issues, &cfg.dashboard);
    validate_api(&mut issues, &cfg.api);

    for (idx, entry) in cfg.workflows.iter().enumerate() {
        validate_repo_workflows(&mut issues, idx, entry);
    }

    if issues.has_issues() {
        Err(issues)
    } else {
        Ok(())
    }
}

impl Config {
    pub fn resolve(&self) -> Result<Settings, String> {
        let zone = resolve_zone(&self.dashboard.time_zone)
            .map_err(|e| format!("dashboard.time_zone: {e}"))?;
        let timeout = if self.api.timeout.is_empty() {
            None
        } else {
            Some(
                parse_duration(&self.api.timeout)
                    .map_err(|_| "api.timeout: must be a valid duration".to_string())?,
            )
        };

        Ok(Settings {
            title: or_default(&self.dashboard.title, DEFAULT_TITLE),
            stylesheet: or_default(&self.dashboard.stylesheet, DEFAULT_STYLESHEET),
            zone,
            api_url: or_default(&self.api.url, DEFAULT_API_URL),
            timeout,
            entries: self.entries(),
        })
    }

    /// Flattens the config into one entry per workflow, in file order.
    pub fn entries(&self) -> Vec<Entry> {
        self.workflows
            .iter()
            .flat_map(|repo| {
                repo.workflows.iter().map(|workflow| Entry {
                    group: repo.group.clone(),
                    workflow: WorkflowRef::new(&repo.owner, &repo.repo, workflow),
                })
            })
            .collect()
    }
}

/// Empty selects the built-in zone, `none` disables conversion.
pub fn resolve_zone(text: &str) -> Result<Option<Zone>, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case(NO_ZONE) {
        return Ok(None);
    }

    let text = if text.is_empty() { DEFAULT_ZONE } else { text };
    timestamp::parse_zone(text).map(Some)
}

fn validate_dashboard(issues: &mut ValidationErrors, d: &Dashboard) {
    if let Err(err) = resolve_zone(&d.time_zone) {
        issues.add("dashboard.time_zone", err);
    }
}

fn validate_api(issues: &mut ValidationErrors, api: &Api) {
    if !api.url.is_empty() && reqwest::Url::parse(&api.url).is_err() {
        issues.add("api.url", "must be a valid URL");
    }

    if !api.timeout.is_empty() && parse_duration(&api.timeout).is_err() {
        issues.add("api.timeout", "must be a valid duration");
    }
}

fn validate_repo_workflows(issues: &mut ValidationErrors, idx: usize, entry: &RepoWorkflows) {
    let field = format!("workflows[{idx}]");

    if entry.owner.is_empty() {
        issues.add(format!("{field}.owner"), "is required");
    } else if !NAME_RE.is_match(&entry.owner) {
        issues.add(format!("{field}.owner"), "is not a valid GitHub owner name");
    }

    if entry.repo.is_empty() {
        issues.add(format!("{field}.repo"), "is required");
    } else if !NAME_RE.is_match(&entry.repo) {
        issues.add(format!("{field}.repo"), "is not a valid repository name");
    }

    if entry.workflows.is_empty() {
        issues.add(format!("{field}.workflows"), "must list at least one workflow");
    }

    for (wf_idx, workflow) in entry.workflows.iter().enumerate() {
        if !WORKFLOW_RE.is_match(workflow) {
            issues.add(
                format!("{field}.workflows[{wf_idx}]"),
                "must be a .yml/.yaml file name or a numeric workflow id",
            );
        }
    }
}

fn parse_duration(text: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(text)
}

fn or_default(value: &str, default_value: &str) -> String {
    if value.trim().is_empty() {
        default_value.to_string()
    } else {
        value.to_string()
    }
}
