pub const GITHUB_WEB_URL: &str = "https://github.com";

/// One configured workflow: owner, repository and workflow file (or id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRef {
    pub owner: String,
    pub repo: String,
    pub workflow: String,
}

impl WorkflowRef {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        workflow: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            workflow: workflow.into(),
        }
    }

    /// Browser page listing the runs of this workflow.
    pub fn web_url(&self) -> String {
        format!(
            "{GITHUB_WEB_URL}/{}/{}/actions/workflows/{}",
            self.owner, self.repo, self.workflow
        )
    }

    pub fn runs_path(&self) -> String {
        format!(
            "repos/{}/{}/actions/workflows/{}/runs",
            self.owner, self.repo, self.workflow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Warning,
}

impl Icon {
    pub fn for_conclusion(conclusion: Option<&str>) -> Self {
        match conclusion {
            Some("success") => Icon::Success,
            _ => Icon::Warning,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Success => "✓",
            Icon::Warning => "⚠",
        }
    }
}

/// What the API told us about the latest run of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed {
        conclusion: Option<String>,
        updated_at: String,
    },
    HttpStatus(u16),
    NoRuns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatusRecord {
    pub workflow: WorkflowRef,
    pub url: String,
    pub outcome: RunOutcome,
    pub icon: Icon,
}

impl RunStatusRecord {
    pub fn new(workflow: WorkflowRef, outcome: RunOutcome) -> Self {
        let icon = match &outcome {
            RunOutcome::Completed { conclusion, .. } => Icon::for_conclusion(conclusion.as_deref()),
            RunOutcome::HttpStatus(_) | RunOutcome::NoRuns => Icon::Warning,
        };

        Self {
            url: workflow.web_url(),
            workflow,
            outcome,
            icon,
        }
    }

    pub fn is_success(&self) -> bool {
        self.icon == Icon::Success
    }

    /// Text for the conclusion column. Failed fetches show the raw status code.
    pub fn conclusion_text(&self) -> String {
        match &self.outcome {
            RunOutcome::Completed { conclusion, .. } => conclusion.clone().unwrap_or_default(),
            RunOutcome::HttpStatus(code) => code.to_string(),
            RunOutcome::NoRuns => "no runs".to_string(),
        }
    }

    pub fn updated_at_text(&self) -> &str {
        match &self.outcome {
            RunOutcome::Completed { updated_at, .. } => updated_at,
            RunOutcome::HttpStatus(_) | RunOutcome::NoRuns => "",
        }
    }
}
