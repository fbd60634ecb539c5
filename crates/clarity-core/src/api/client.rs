// SPDX-License-Identifier: Apache-2.0

//! HTTPS client for the CodeClarity API.
//!
//! Holds a configured `reqwest::Client` and the API base URL. Each operation
//! issues exactly one request and never retries; retry decisions belong to
//! the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::PlatformApi;
use super::types::{
    AuthenticateRequest, Envelope, ErrorBody, IMPORT_DESCRIPTION, IdRef, ImportProjectRequest,
    Integration, Membership, PollOutcome, StartAnalysisRequest, TokenData, VulnerabilityCounts,
    VulnerabilitySummary,
};
use crate::auth::Credentials;
use crate::config::PlatformConfig;
use crate::error::{ClarityError, Stage};

/// Workspace marker sent with result polls.
const WORKSPACE: &str = ".";

/// CodeClarity API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client with configured timeout.
    http: Client,
    /// Base URL including the `/api` prefix, without trailing slash.
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `https://{domain}/api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &PlatformConfig) -> crate::Result<Self> {
        Self::with_base_url(
            format!("https://{}/api", config.domain),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Creates a client for an explicit base URL (e.g. `http://127.0.0.1:8080/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClarityError::Config {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str, token: &SecretString) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .bearer_auth(token.expose_secret())
    }

    fn post(&self, path: &str, token: &SecretString) -> RequestBuilder {
        self.http
            .post(self.url(path))
            .bearer_auth(token.expose_secret())
    }
}

/// Sends a request, mapping transport failures to the stage.
async fn send(stage: Stage, request: RequestBuilder) -> crate::Result<Response> {
    request
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|source| ClarityError::Transport { stage, source })
}

/// Fails with the HTTP status unless the response is a success.
fn ensure_success(stage: Stage, response: &Response) -> crate::Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        warn!(%stage, status = status.as_u16(), "Request rejected by platform");
        Err(ClarityError::Status {
            stage,
            status: status.as_u16(),
        })
    }
}

/// Reads and decodes a JSON body.
async fn read_json<T: DeserializeOwned>(stage: Stage, response: Response) -> crate::Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ClarityError::Transport { stage, source })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClarityError::rejected(stage, format!("invalid response body ({e})")))
}

/// Picks the first GitHub integration from a raw `data` payload.
fn first_github_integration(data: Option<serde_json::Value>) -> crate::Result<String> {
    let Some(serde_json::Value::Array(items)) = data else {
        return Err(ClarityError::rejected(
            Stage::Integrations,
            "invalid response",
        ));
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Integration>(item).ok())
        .find(Integration::is_github)
        .map(|integration| integration.id)
        .ok_or_else(|| ClarityError::rejected(Stage::Integrations, "no GitHub integration found"))
}

#[async_trait]
impl PlatformApi for ApiClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn authenticate(&self, credentials: &Credentials) -> crate::Result<SecretString> {
        let stage = Stage::Authenticate;
        let body = AuthenticateRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        let response = send(
            stage,
            self.http.post(self.url("/auth/authenticate")).json(&body),
        )
        .await?;
        ensure_success(stage, &response)?;

        let envelope: Envelope<TokenData> = read_json(stage, response).await?;
        let token = envelope
            .data
            .and_then(|d| d.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClarityError::rejected(stage, "no token received"))?;
        debug!("Session token received");
        Ok(SecretString::from(token))
    }

    #[instrument(skip_all)]
    async fn get_user(&self, token: &SecretString) -> crate::Result<String> {
        let stage = Stage::User;
        let response = send(stage, self.get("/auth/user", token)).await?;
        ensure_success(stage, &response)?;

        let envelope: Envelope<IdRef> = read_json(stage, response).await?;
        envelope
            .data
            .and_then(|d| d.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClarityError::rejected(stage, "no user ID received"))
    }

    #[instrument(skip_all)]
    async fn get_organization(&self, token: &SecretString) -> crate::Result<String> {
        let stage = Stage::Organization;
        let response = send(stage, self.get("/org", token)).await?;
        ensure_success(stage, &response)?;

        let envelope: Envelope<Vec<Membership>> = read_json(stage, response).await?;
        envelope
            .data
            .and_then(|memberships| memberships.into_iter().next())
            .and_then(|m| m.organization)
            .and_then(|o| o.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClarityError::rejected(stage, "no organization found"))
    }

    #[instrument(skip(self, token))]
    async fn get_project(
        &self,
        token: &SecretString,
        org_id: &str,
        project_name: &str,
    ) -> crate::Result<String> {
        let stage = Stage::Project;
        let path = format!("/org/{org_id}/projects?search_key={project_name}");
        let response = send(stage, self.get(&path, token)).await?;
        ensure_success(stage, &response)?;

        let envelope: Envelope<Vec<IdRef>> = read_json(stage, response).await?;
        let project_id = envelope
            .data
            .and_then(|projects| projects.into_iter().next())
            .and_then(|p| p.id)
            .unwrap_or_default();
        if project_id.is_empty() {
            debug!("No matching project");
        }
        Ok(project_id)
    }

    #[instrument(skip(self, token))]
    async fn get_github_integration(
        &self,
        token: &SecretString,
        org_id: &str,
    ) -> crate::Result<String> {
        let stage = Stage::Integrations;
        let path = format!("/org/{org_id}/integrations/vcs");
        let response = send(stage, self.get(&path, token)).await?;
        ensure_success(stage, &response)?;

        let envelope: Envelope<serde_json::Value> = read_json(stage, response).await?;
        first_github_integration(envelope.data)
    }

    #[instrument(skip(self, token))]
    async fn import_project(
        &self,
        token: &SecretString,
        org_id: &str,
        integration_id: &str,
        server_url: &str,
        project_name: &str,
    ) -> crate::Result<String> {
        let stage = Stage::ImportProject;
        let body = ImportProjectRequest {
            integration_id,
            url: format!("{server_url}/{project_name}"),
            name: project_name,
            description: IMPORT_DESCRIPTION,
        };
        let path = format!("/org/{org_id}/projects");
        let response = send(stage, self.post(&path, token).json(&body)).await?;
        ensure_success(stage, &response)?;

        let created: IdRef = read_json(stage, response).await?;
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClarityError::rejected(stage, "no project ID returned"))
    }

    #[instrument(skip(self, token))]
    async fn get_analyzer(
        &self,
        token: &SecretString,
        org_id: &str,
        analyzer_name: &str,
    ) -> crate::Result<String> {
        let stage = Stage::Analyzer;
        let path = format!("/org/{org_id}/analyzers/name?analyzer_name={analyzer_name}");
        let response = send(stage, self.get(&path, token)).await?;
        ensure_success(stage, &response)?;

        let envelope: Envelope<IdRef> = read_json(stage, response).await?;
        envelope
            .data
            .and_then(|d| d.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ClarityError::rejected(stage, format!("analyzer '{analyzer_name}' not found"))
            })
    }

    #[instrument(skip(self, token))]
    async fn start_analysis(
        &self,
        token: &SecretString,
        org_id: &str,
        project_id: &str,
        analyzer_id: &str,
        branch: &str,
    ) -> crate::Result<String> {
        let stage = Stage::StartAnalysis;
        let body = StartAnalysisRequest::new(analyzer_id, branch);
        let path = format!("/org/{org_id}/projects/{project_id}/analyses");
        let response = send(stage, self.post(&path, token).json(&body)).await?;

        let status = response.status();
        if !status.is_success() {
            let status = status.as_u16();
            // An unreadable error body still yields the HTTP status.
            let error_body: ErrorBody = read_json(stage, response).await.unwrap_or_default();
            warn!(status, "Analysis launch rejected");
            return Err(ClarityError::rejected(stage, error_body.describe(status)));
        }

        let created: IdRef = read_json(stage, response).await?;
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClarityError::rejected(stage, "no analysis ID returned"))
    }

    #[instrument(skip(self, token))]
    async fn get_result(
        &self,
        token: &SecretString,
        org_id: &str,
        project_id: &str,
        analysis_id: &str,
    ) -> crate::Result<PollOutcome> {
        let stage = Stage::Results;
        if analysis_id.is_empty() {
            return Err(ClarityError::rejected(stage, "analysisId is required"));
        }

        let path = format!(
            "/org/{org_id}/projects/{project_id}/analysis/{analysis_id}/vulnerabilities/stats?workspace={WORKSPACE}"
        );
        let response = send(stage, self.get(&path, token)).await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(status, "Results not available");
            return Ok(PollOutcome::Transient { status });
        }

        let envelope: Envelope<VulnerabilityCounts> = read_json(stage, response).await?;
        let data = envelope
            .data
            .ok_or_else(|| ClarityError::rejected(stage, "invalid response format"))?;
        Ok(PollOutcome::Ready(VulnerabilitySummary {
            data,
            status_code: status,
        }))
    }
}
