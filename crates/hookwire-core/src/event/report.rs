use std::fmt;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::Bucket;

/// Which of the two passes a module ran in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Modules applied to every plugin load
    Always,
    /// Modules selected by the plugin's identity (or the default bucket)
    Identity,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Always => write!(f, "always"),
            Pass::Identity => write!(f, "identity"),
        }
    }
}

/// What happened to one module during a pass
#[derive(Debug)]
pub enum ActivationStatus {
    /// Gate was open and `activate` returned normally
    Activated,
    /// Gate was closed, `activate` was not called
    Inactive,
    /// Gate was open but `activate` returned an error or panicked
    Failed(PluginSystemError),
}

#[derive(Debug)]
pub struct ModuleOutcome {
    pub module: String,
    pub pass: Pass,
    pub status: ActivationStatus,
}

impl ModuleOutcome {
    pub fn is_activated(&self) -> bool {
        matches!(self.status, ActivationStatus::Activated)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ActivationStatus::Failed(_))
    }
}

/// How a dispatch pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Every eligible module in both buckets was attempted
    Completed,
    /// The plugin's environment was already gone; nothing ran
    EnvironmentUnavailable,
}

/// Per-module results of one dispatch pass, in execution order
#[derive(Debug)]
pub struct DispatchReport {
    pub identity_key: String,
    pub bucket: Bucket,
    pub status: DispatchStatus,
    pub outcomes: Vec<ModuleOutcome>,
}

impl DispatchReport {
    pub fn is_complete(&self) -> bool {
        self.status == DispatchStatus::Completed
    }

    /// Names of modules whose `activate` succeeded, in execution order
    pub fn activated(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_activated())
            .map(|o| o.module.as_str())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// Number of modules whose `activate` was called
    pub fn attempted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, ActivationStatus::Inactive))
            .count()
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = if self.identity_key.is_empty() { "<unknown>" } else { self.identity_key.as_str() };
        writeln!(f, "plugin {} (bucket: {})", identity, self.bucket)?;
        if self.status == DispatchStatus::EnvironmentUnavailable {
            return writeln!(f, "  skipped: plugin environment no longer available");
        }
        for outcome in &self.outcomes {
            match &outcome.status {
                ActivationStatus::Activated => writeln!(f, "  [{}] {}: activated", outcome.pass, outcome.module)?,
                ActivationStatus::Inactive => writeln!(f, "  [{}] {}: inactive", outcome.pass, outcome.module)?,
                ActivationStatus::Failed(e) => writeln!(f, "  [{}] {}: failed ({})", outcome.pass, outcome.module, e)?,
            }
        }
        Ok(())
    }
}

/// One entry of a dry-run plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedActivation {
    pub module: String,
    pub pass: Pass,
    /// Rendered gate predicate
    pub predicate: String,
    /// Whether the gate is currently open
    pub active: bool,
}

/// Modules a dispatch pass would activate for an identity, without running any
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub identity_key: String,
    pub bucket: Bucket,
    pub entries: Vec<PlannedActivation>,
}

impl DispatchPlan {
    pub fn active(&self) -> impl Iterator<Item = &PlannedActivation> {
        self.entries.iter().filter(|e| e.active)
    }
}

impl fmt::Display for DispatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = if self.identity_key.is_empty() { "<unknown>" } else { self.identity_key.as_str() };
        writeln!(f, "plugin {} (bucket: {})", identity, self.bucket)?;
        for entry in &self.entries {
            let verdict = if entry.active { "Would activate" } else { "Would skip" };
            writeln!(f, "  [{}] {} {} when {}", entry.pass, verdict, entry.module, entry.predicate)?;
        }
        Ok(())
    }
}
