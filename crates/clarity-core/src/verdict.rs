// SPDX-License-Identifier: Apache-2.0

//! Pass/fail decision over a vulnerability summary.
//!
//! Only critical and high findings fail a run. Medium, low and unrated counts
//! are reported but never change the verdict.

use std::fmt;

use serde::Serialize;

use crate::api::types::VulnerabilityCounts;

/// Severity that fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// At least one critical finding.
    Critical,
    /// At least one high finding, no critical ones.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "severity")]
pub enum Verdict {
    /// No critical or high findings.
    Pass,
    /// Build must fail.
    Fail(Severity),
}

impl Verdict {
    /// Returns the failure message for a failing verdict.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(severity) => Some(format!("There is a {severity} vulnerability")),
        }
    }

    /// Returns `true` if the build should pass.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Evaluates counts in strict priority order: critical, then high.
#[must_use]
pub fn evaluate(counts: &VulnerabilityCounts) -> Verdict {
    if counts.number_of_critical > 0 {
        Verdict::Fail(Severity::Critical)
    } else if counts.number_of_high > 0 {
        Verdict::Fail(Severity::High)
    } else {
        Verdict::Pass
    }
}
