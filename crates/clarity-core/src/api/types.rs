// SPDX-License-Identifier: Apache-2.0

//! Request and response bodies exchanged with the CodeClarity API.
//!
//! Every response field the pipeline reads is optional so that a missing
//! field surfaces as a stage-specific error instead of a parse failure.

use serde::{Deserialize, Serialize};

/// Generic `{ "data": ... }` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Payload, absent on malformed responses.
    pub data: Option<T>,
}

/// Object carrying an optional `id`.
#[derive(Debug, Deserialize)]
pub struct IdRef {
    /// Identifier.
    pub id: Option<String>,
}

/// `POST /auth/authenticate` request body.
#[derive(Debug, Serialize)]
pub struct AuthenticateRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// `data` payload of the authentication response.
#[derive(Debug, Deserialize)]
pub struct TokenData {
    /// Session token.
    pub token: Option<String>,
}

/// Entry of the `GET /org` list.
#[derive(Debug, Deserialize)]
pub struct Membership {
    /// Organization of the membership.
    pub organization: Option<IdRef>,
}

/// Entry of the `GET /org/{org}/integrations/vcs` list.
#[derive(Debug, Clone, Deserialize)]
pub struct Integration {
    /// Integration id.
    pub id: String,
    /// Integration kind (e.g. `VCS`).
    #[serde(default)]
    pub integration_type: Option<String>,
    /// Provider name (e.g. `GITHUB`, `GITLAB`).
    #[serde(default)]
    pub integration_provider: Option<String>,
}

/// Provider name accepted by the integration resolver.
pub const GITHUB_PROVIDER: &str = "GITHUB";

impl Integration {
    /// Returns `true` if this integration links to GitHub.
    #[must_use]
    pub fn is_github(&self) -> bool {
        self.integration_provider.as_deref() == Some(GITHUB_PROVIDER)
    }
}

/// `POST /org/{org}/projects` request body.
#[derive(Debug, Serialize)]
pub struct ImportProjectRequest<'a> {
    /// Integration used to fetch the repository.
    pub integration_id: &'a str,
    /// Repository URL.
    pub url: String,
    /// Project name.
    pub name: &'a str,
    /// Project description.
    pub description: &'a str,
}

/// Description attached to imported projects.
pub const IMPORT_DESCRIPTION: &str = "Imported by Github Action";

/// `POST /org/{org}/projects/{project}/analyses` request body.
#[derive(Debug, Serialize)]
pub struct StartAnalysisRequest<'a> {
    /// Analyzer to run.
    pub analyzer_id: &'a str,
    /// Branch to analyze.
    pub branch: &'a str,
    /// Per-plugin configuration.
    pub config: AnalysisConfig<'a>,
}

impl<'a> StartAnalysisRequest<'a> {
    /// Builds the request with the fixed plugin configuration.
    #[must_use]
    pub fn new(analyzer_id: &'a str, branch: &'a str) -> Self {
        Self {
            analyzer_id,
            branch,
            config: AnalysisConfig {
                js_sbom: SbomConfig { branch },
                license_finder: LicenseFinderConfig {
                    license_policy: Vec::new(),
                },
            },
        }
    }
}

/// Plugin configuration block of an analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisConfig<'a> {
    /// JavaScript SBOM plugin.
    #[serde(rename = "js-sbom")]
    pub js_sbom: SbomConfig<'a>,
    /// License finder plugin.
    #[serde(rename = "license-finder")]
    pub license_finder: LicenseFinderConfig,
}

/// `js-sbom` plugin configuration.
#[derive(Debug, Serialize)]
pub struct SbomConfig<'a> {
    /// Branch to build the SBOM from.
    pub branch: &'a str,
}

/// `license-finder` plugin configuration.
#[derive(Debug, Serialize)]
pub struct LicenseFinderConfig {
    /// Disallowed licenses.
    #[serde(rename = "licensePolicy")]
    pub license_policy: Vec<String>,
}

/// Error body returned by the analysis endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub message: Option<String>,
    /// Error code or message.
    pub error: Option<String>,
}

impl ErrorBody {
    /// Returns the most specific description available.
    #[must_use]
    pub fn describe(&self, status: u16) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.clone().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| format!("HTTP {status}"))
    }
}

/// Reads a count, treating `null` as zero.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Vulnerability counts by severity.
///
/// Missing and `null` counts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityCounts {
    /// Critical findings.
    #[serde(deserialize_with = "count_or_zero")]
    pub number_of_critical: u64,
    /// High findings.
    #[serde(deserialize_with = "count_or_zero")]
    pub number_of_high: u64,
    /// Medium findings.
    #[serde(deserialize_with = "count_or_zero")]
    pub number_of_medium: u64,
    /// Low findings.
    #[serde(deserialize_with = "count_or_zero")]
    pub number_of_low: u64,
    /// Findings without a severity rating.
    #[serde(deserialize_with = "count_or_zero")]
    pub number_of_none: u64,
}

/// Vulnerability summary of an analysis, emitted as the `vulnerabilities` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VulnerabilitySummary {
    /// Counts by severity.
    pub data: VulnerabilityCounts,
    /// HTTP status of the poll that produced this summary.
    pub status_code: u16,
}

/// Result of a single poll for analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Summary is available.
    Ready(VulnerabilitySummary),
    /// Platform answered with a non-success status; the caller decides whether to retry.
    Transient {
        /// HTTP status code.
        status: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_analysis_body_shape() {
        let body = serde_json::to_value(StartAnalysisRequest::new("an-1", "main")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "analyzer_id": "an-1",
                "branch": "main",
                "config": {
                    "js-sbom": {"branch": "main"},
                    "license-finder": {"licensePolicy": []}
                }
            })
        );
    }

    #[test]
    fn test_counts_default_missing_fields() {
        let counts: VulnerabilityCounts =
            serde_json::from_str(r#"{"number_of_critical": 2}"#).unwrap();
        assert_eq!(counts.number_of_critical, 2);
        assert_eq!(counts.number_of_high, 0);
        assert_eq!(counts.number_of_none, 0);
    }

    #[test]
    fn test_counts_null_reads_as_zero() {
        let counts: VulnerabilityCounts = serde_json::from_str(
            r#"{"number_of_critical": null, "number_of_high": 3, "number_of_low": null}"#,
        )
        .unwrap();
        assert_eq!(counts.number_of_critical, 0);
        assert_eq!(counts.number_of_high, 3);
        assert_eq!(counts.number_of_low, 0);
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body = ErrorBody {
            message: Some("Project is locked".to_string()),
            error: Some("Conflict".to_string()),
        };
        assert_eq!(body.describe(409), "Project is locked");
    }

    #[test]
    fn test_error_body_falls_back_to_error_then_status() {
        let body = ErrorBody {
            message: None,
            error: Some("Conflict".to_string()),
        };
        assert_eq!(body.describe(409), "Conflict");
        assert_eq!(ErrorBody::default().describe(502), "HTTP 502");
    }

    #[test]
    fn test_integration_is_github() {
        let integration: Integration = serde_json::from_str(
            r#"{"id": "i-1", "integration_type": "VCS", "integration_provider": "GITHUB"}"#,
        )
        .unwrap();
        assert!(integration.is_github());

        let gitlab: Integration =
            serde_json::from_str(r#"{"id": "i-2", "integration_provider": "GITLAB"}"#).unwrap();
        assert!(!gitlab.is_github());
    }

    #[test]
    fn test_summary_serializes_like_platform_payload() {
        let summary = VulnerabilitySummary {
            data: VulnerabilityCounts {
                number_of_medium: 5,
                ..VulnerabilityCounts::default()
            },
            status_code: 200,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["data"]["number_of_medium"], 5);
    }
}
