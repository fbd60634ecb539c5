// SPDX-License-Identifier: Apache-2.0

//! CodeClarity platform API.
//!
//! [`PlatformApi`] is the seam between the pipeline and the network: the
//! pipeline only talks to this trait, [`ApiClient`] implements it over HTTPS.

pub mod client;
pub mod types;

use async_trait::async_trait;
use secrecy::SecretString;

pub use client::ApiClient;
pub use types::{PollOutcome, VulnerabilityCounts, VulnerabilitySummary};

use crate::auth::Credentials;

/// Operations the pipeline performs against the platform.
///
/// Every identifier is a plain string. Only [`PlatformApi::get_project`]
/// reports absence with a value (the empty string); every other lookup
/// reports absence as an error.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Exchanges credentials for a session token.
    async fn authenticate(&self, credentials: &Credentials) -> crate::Result<SecretString>;

    /// Returns the id of the authenticated user.
    async fn get_user(&self, token: &SecretString) -> crate::Result<String>;

    /// Returns the id of the first organization of the user.
    async fn get_organization(&self, token: &SecretString) -> crate::Result<String>;

    /// Returns the id of the first project matching `project_name`, or an
    /// empty string if none matches.
    ///
    /// `project_name` must already be URL-escaped.
    async fn get_project(
        &self,
        token: &SecretString,
        org_id: &str,
        project_name: &str,
    ) -> crate::Result<String>;

    /// Returns the id of the first GitHub VCS integration of the organization.
    async fn get_github_integration(
        &self,
        token: &SecretString,
        org_id: &str,
    ) -> crate::Result<String>;

    /// Imports `{server_url}/{project_name}` as a new project and returns its id.
    ///
    /// Not idempotent: each call creates a project.
    async fn import_project(
        &self,
        token: &SecretString,
        org_id: &str,
        integration_id: &str,
        server_url: &str,
        project_name: &str,
    ) -> crate::Result<String>;

    /// Returns the id of the analyzer named `analyzer_name`.
    ///
    /// `analyzer_name` must already be URL-escaped.
    async fn get_analyzer(
        &self,
        token: &SecretString,
        org_id: &str,
        analyzer_name: &str,
    ) -> crate::Result<String>;

    /// Launches an analysis of `branch` and returns its id.
    async fn start_analysis(
        &self,
        token: &SecretString,
        org_id: &str,
        project_id: &str,
        analyzer_id: &str,
        branch: &str,
    ) -> crate::Result<String>;

    /// Polls the vulnerability summary of an analysis once.
    ///
    /// A non-success status is returned as [`PollOutcome::Transient`], not as
    /// an error.
    async fn get_result(
        &self,
        token: &SecretString,
        org_id: &str,
        project_id: &str,
        analysis_id: &str,
    ) -> crate::Result<PollOutcome>;
}
