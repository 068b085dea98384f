use colored::Colorize;
use derive_builder::Builder;
use std::fmt::Display;

/// Fallback domain used when the caller does not supply one.
pub const DEFAULT_DOMAIN: &str = "fasti.sh";

/// Immutable context for a single run. Only used to construct the expected
/// resource names via the `{deployment_id}-webapp-<suffix>` convention.
#[derive(Debug, Clone, Builder)]
pub struct DeploymentInfo {
    pub deployment_id: String,
    #[builder(default)]
    pub region: String,
    #[builder(default = "String::from(DEFAULT_DOMAIN)")]
    pub domain: String,
}

impl DeploymentInfo {
    pub fn resource_name(&self, suffix: &str) -> String {
        format!("{}-webapp-{}", self.deployment_id, suffix)
    }

    pub fn resource_prefix(&self) -> String {
        format!("{}-webapp", self.deployment_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Warning,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub outcome: Outcome,
    pub message: String,
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.outcome {
            Outcome::Passed => write!(f, "{} {}", "✓".green(), self.message),
            Outcome::Warning => write!(f, "{} {}", "⚠".yellow(), self.message),
            Outcome::Failed => write!(f, "{} {}", "✗".red(), self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Section(String),
    Check(CheckResult),
}

/// Ordered record of one domain's checks, together with running counters.
///
/// Every domain routine returns its own log; the runner merges them into the
/// run total. Failures are recorded here instead of being propagated, so one
/// broken domain never aborts the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct CheckLog {
    entries: Vec<LogEntry>,
    passed: usize,
    failed: usize,
    warned: usize,
}

impl CheckLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a sub-section inside a domain (presentation only,
    /// does not affect counters).
    pub fn section(&mut self, title: impl Into<String>) {
        self.entries.push(LogEntry::Section(title.into()));
    }

    pub fn pass(&mut self, message: impl Into<String>) {
        self.passed += 1;
        self.record(Outcome::Passed, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warned += 1;
        self.record(Outcome::Warning, message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.record(Outcome::Failed, message.into());
    }

    fn record(&mut self, outcome: Outcome, message: String) {
        self.entries
            .push(LogEntry::Check(CheckResult { outcome, message }));
    }

    pub fn merge(&mut self, other: CheckLog) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.warned += other.warned;
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn results(&self) -> impl Iterator<Item = &CheckResult> {
        self.entries.iter().filter_map(|e| match e {
            LogEntry::Check(result) => Some(result),
            LogEntry::Section(_) => None,
        })
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn warned(&self) -> usize {
        self.warned
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.warned
    }

    /// Gate for the process exit code. Warnings never count as failures.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
