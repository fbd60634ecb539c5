// SPDX-License-Identifier: Apache-2.0

//! Analysis pipeline.
//!
//! Runs every stage in order, each one waiting for the previous call to
//! complete:
//!
//! 1. Authenticate, resolve user and organization.
//! 2. Look up the project; import it through the GitHub integration if absent.
//! 3. Resolve the analyzer and launch the analysis.
//! 4. Wait, poll the results, and retry once on the retry status.
//! 5. Fail the run on critical or high findings.
//!
//! Any stage error aborts the run. Nothing is rolled back.

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::api::{PlatformApi, PollOutcome, VulnerabilityCounts, VulnerabilitySummary};
use crate::auth::{CredentialProvider, Credentials, redact};
use crate::error::{ClarityError, Stage};
use crate::retry::{PollPolicy, Sleeper};
use crate::utils::encode_component;
use crate::verdict::{Verdict, evaluate};

/// Name of the output carrying the final summary.
pub const VULNERABILITIES_OUTPUT: &str = "vulnerabilities";

/// Input names read from the host.
pub mod input {
    /// Branch to analyze.
    pub const BRANCH: &str = "branch";
    /// Base URL of the source-control server (e.g. `https://github.com`).
    pub const SERVER_URL: &str = "serverUrl";
    /// Repository path on the server, also used as project name.
    pub const PROJECT_NAME: &str = "projectName";
    /// Analyzer to run.
    pub const ANALYZER_NAME: &str = "analyzerName";
}

/// Runtime that hosts the pipeline (GitHub Actions runner, CLI, tests).
pub trait ActionHost: Send + Sync {
    /// Reads a named input; missing inputs read as an empty string.
    fn input(&self, name: &str) -> String;

    /// Emits a debug log line.
    fn debug(&self, message: &str);

    /// Publishes a named output value.
    fn set_output(&self, key: &str, value: &serde_json::Value) -> std::io::Result<()>;

    /// Marks the run as failed with a message.
    fn set_failed(&self, message: &str);
}

/// Inputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    /// Branch to analyze.
    pub branch: String,
    /// Base URL of the source-control server.
    pub server_url: String,
    /// Project name, unescaped.
    pub project_name: String,
    /// Analyzer name, unescaped.
    pub analyzer_name: String,
}

impl ActionInputs {
    /// Reads all inputs from the host.
    pub fn from_host(host: &dyn ActionHost) -> Self {
        Self {
            branch: host.input(input::BRANCH),
            server_url: host.input(input::SERVER_URL),
            project_name: host.input(input::PROJECT_NAME),
            analyzer_name: host.input(input::ANALYZER_NAME),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Project the analysis ran on.
    pub project_id: String,
    /// Whether the project was imported during this run.
    pub imported: bool,
    /// Analysis created by this run.
    pub analysis_id: String,
    /// Final vulnerability summary.
    pub summary: VulnerabilitySummary,
    /// Pass/fail decision.
    pub verdict: Verdict,
}

/// Sequential orchestrator over a [`PlatformApi`].
pub struct Pipeline<'a> {
    api: &'a dyn PlatformApi,
    host: &'a dyn ActionHost,
    sleeper: &'a dyn Sleeper,
    policy: PollPolicy,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        api: &'a dyn PlatformApi,
        host: &'a dyn ActionHost,
        sleeper: &'a dyn Sleeper,
        policy: PollPolicy,
    ) -> Self {
        Self {
            api,
            host,
            sleeper,
            policy,
        }
    }

    /// Runs the pipeline and reports through the host.
    ///
    /// On error the error message becomes the failure message and no output
    /// is emitted. On success a failing verdict marks the run failed, and the
    /// `vulnerabilities` output is emitted either way.
    pub async fn run(&self, credentials: &dyn CredentialProvider) -> Option<RunReport> {
        let inputs = ActionInputs::from_host(self.host);

        match self.execute(&inputs, credentials).await {
            Ok(report) => {
                if let Some(message) = report.verdict.failure_message() {
                    self.host.set_failed(&message);
                }
                self.publish(&report.summary);
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Pipeline failed");
                self.host.set_failed(&e.to_string());
                None
            }
        }
    }

    fn publish(&self, summary: &VulnerabilitySummary) {
        let published = serde_json::to_value(summary)
            .map_err(std::io::Error::other)
            .and_then(|value| self.host.set_output(VULNERABILITIES_OUTPUT, &value));
        if let Err(e) = published {
            self.host
                .set_failed(&format!("Failed to set output {VULNERABILITIES_OUTPUT}: {e}"));
        }
    }

    /// Runs every stage and returns the report without touching host outputs.
    ///
    /// # Errors
    ///
    /// Returns the first stage error; missing credentials fail before any
    /// network call.
    #[instrument(skip_all, fields(project = %inputs.project_name, branch = %inputs.branch))]
    pub async fn execute(
        &self,
        inputs: &ActionInputs,
        credentials: &dyn CredentialProvider,
    ) -> crate::Result<RunReport> {
        let host = self.host;
        host.debug(&format!(
            "Analyzing project {} on branch {} with analyzer {} ...",
            inputs.project_name, inputs.branch, inputs.analyzer_name
        ));

        let analyzer_name = encode_component(&inputs.analyzer_name);
        host.debug(&format!("Sanitized analyzer name is {analyzer_name}"));
        let project_name = encode_component(&inputs.project_name);
        host.debug(&format!("Sanitized project name is {project_name}"));

        let credentials = Credentials::resolve(credentials)?;

        let token = self.api.authenticate(&credentials).await?;
        host.debug(&format!("User token: {}", redact(&token)));

        let user_id = self.api.get_user(&token).await?;
        host.debug(&format!("User ID: {user_id}"));

        let org_id = self.api.get_organization(&token).await?;
        host.debug(&format!("Organization ID: {org_id}"));

        let mut project_id = self.api.get_project(&token, &org_id, &project_name).await?;
        host.debug(&format!("Project ID: {project_id}"));

        let imported = project_id.is_empty();
        if imported {
            let integration_id = self.api.get_github_integration(&token, &org_id).await?;
            host.debug(&format!("Integration ID: {integration_id}"));

            project_id = self
                .api
                .import_project(
                    &token,
                    &org_id,
                    &integration_id,
                    &inputs.server_url,
                    &inputs.project_name,
                )
                .await?;
            info!(%project_id, "Imported project");
            host.debug(&format!("Imported project ID: {project_id}"));
        }

        let analyzer_id = self
            .api
            .get_analyzer(&token, &org_id, &analyzer_name)
            .await?;
        host.debug(&format!("Analyzer ID: {analyzer_id}"));

        let analysis_id = self
            .api
            .start_analysis(&token, &org_id, &project_id, &analyzer_id, &inputs.branch)
            .await?;
        info!(%analysis_id, "Analysis started");
        host.debug(&format!("Analysis ID: {analysis_id}"));

        let summary = self
            .poll_results(&token, &org_id, &project_id, &analysis_id)
            .await?;
        let verdict = evaluate(&summary.data);
        info!(?verdict, "Analysis evaluated");

        Ok(RunReport {
            project_id,
            imported,
            analysis_id,
            summary,
            verdict,
        })
    }

    /// Waits, polls once, and polls exactly once more if the first poll hit
    /// the retry status.
    ///
    /// Only a repeated retry status is fatal. Any other non-success status is
    /// passed through as a summary with empty counts and that status.
    async fn poll_results(
        &self,
        token: &secrecy::SecretString,
        org_id: &str,
        project_id: &str,
        analysis_id: &str,
    ) -> crate::Result<VulnerabilitySummary> {
        self.sleeper.sleep(self.policy.initial_delay).await;
        let mut outcome = self
            .api
            .get_result(token, org_id, project_id, analysis_id)
            .await?;

        let mut retried = false;
        if let PollOutcome::Transient { status } = outcome
            && self.policy.should_retry(status)
        {
            self.host.debug("Initial attempt failed. Retrying...");
            self.sleeper.sleep(self.policy.retry_delay).await;
            outcome = self
                .api
                .get_result(token, org_id, project_id, analysis_id)
                .await?;
            retried = true;
        }

        match outcome {
            PollOutcome::Ready(summary) => Ok(summary),
            PollOutcome::Transient { status } if retried && self.policy.should_retry(status) => {
                Err(ClarityError::Status {
                    stage: Stage::Results,
                    status,
                })
            }
            // Other statuses carry empty counts and the status through.
            PollOutcome::Transient { status } => {
                warn!(status, "Results unavailable, reporting empty counts");
                Ok(VulnerabilitySummary {
                    data: VulnerabilityCounts::default(),
                    status_code: status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;

    /// Mock platform recording every call.
    struct MockApi {
        project_id: String,
        github_integration: Option<String>,
        auth_status: Option<u16>,
        polls: Mutex<VecDeque<PollOutcome>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockApi {
        fn new(project_id: &str, polls: Vec<PollOutcome>) -> Self {
            Self {
                project_id: project_id.to_string(),
                github_integration: Some("int-gh".to_string()),
                auth_status: None,
                polls: Mutex::new(polls.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl PlatformApi for MockApi {
        async fn authenticate(&self, credentials: &Credentials) -> crate::Result<SecretString> {
            self.record(format!("authenticate:{}", credentials.email));
            match self.auth_status {
                Some(status) => Err(ClarityError::Status {
                    stage: Stage::Authenticate,
                    status,
                }),
                None => Ok(SecretString::from("token-123456")),
            }
        }

        async fn get_user(&self, _token: &SecretString) -> crate::Result<String> {
            self.record("get_user".to_string());
            Ok("user-1".to_string())
        }

        async fn get_organization(&self, _token: &SecretString) -> crate::Result<String> {
            self.record("get_organization".to_string());
            Ok("org-1".to_string())
        }

        async fn get_project(
            &self,
            _token: &SecretString,
            org_id: &str,
            project_name: &str,
        ) -> crate::Result<String> {
            self.record(format!("get_project:{org_id}:{project_name}"));
            Ok(self.project_id.clone())
        }

        async fn get_github_integration(
            &self,
            _token: &SecretString,
            _org_id: &str,
        ) -> crate::Result<String> {
            self.record("get_github_integration".to_string());
            self.github_integration.clone().ok_or_else(|| {
                ClarityError::rejected(Stage::Integrations, "no GitHub integration found")
            })
        }

        async fn import_project(
            &self,
            _token: &SecretString,
            _org_id: &str,
            integration_id: &str,
            server_url: &str,
            project_name: &str,
        ) -> crate::Result<String> {
            self.record(format!(
                "import_project:{integration_id}:{server_url}/{project_name}"
            ));
            Ok("proj-new".to_string())
        }

        async fn get_analyzer(
            &self,
            _token: &SecretString,
            _org_id: &str,
            analyzer_name: &str,
        ) -> crate::Result<String> {
            self.record(format!("get_analyzer:{analyzer_name}"));
            Ok("an-1".to_string())
        }

        async fn start_analysis(
            &self,
            _token: &SecretString,
            _org_id: &str,
            project_id: &str,
            analyzer_id: &str,
            branch: &str,
        ) -> crate::Result<String> {
            self.record(format!("start_analysis:{project_id}:{analyzer_id}:{branch}"));
            Ok("analysis-1".to_string())
        }

        async fn get_result(
            &self,
            _token: &SecretString,
            _org_id: &str,
            _project_id: &str,
            analysis_id: &str,
        ) -> crate::Result<PollOutcome> {
            self.record(format!("get_result:{analysis_id}"));
            Ok(self
                .polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(PollOutcome::Transient { status: 404 }))
        }
    }

    /// Host recording debug lines, outputs and failures.
    #[derive(Default)]
    struct RecordingHost {
        inputs: HashMap<String, String>,
        debug: Mutex<Vec<String>>,
        outputs: Mutex<Vec<(String, serde_json::Value)>>,
        failures: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        fn with_inputs() -> Self {
            let inputs = [
                (input::BRANCH, "main"),
                (input::SERVER_URL, "https://github.com"),
                (input::PROJECT_NAME, "CodeClarityCE/frontend"),
                (input::ANALYZER_NAME, "JavaScript Analyzer"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
            Self {
                inputs,
                ..Self::default()
            }
        }

        fn failures(&self) -> Vec<String> {
            self.failures.lock().unwrap().clone()
        }

        fn outputs(&self) -> Vec<(String, serde_json::Value)> {
            self.outputs.lock().unwrap().clone()
        }
    }

    impl ActionHost for RecordingHost {
        fn input(&self, name: &str) -> String {
            self.inputs.get(name).cloned().unwrap_or_default()
        }

        fn debug(&self, message: &str) {
            self.debug.lock().unwrap().push(message.to_string());
        }

        fn set_output(&self, key: &str, value: &serde_json::Value) -> std::io::Result<()> {
            self.outputs
                .lock()
                .unwrap()
                .push((key.to_string(), value.clone()));
            Ok(())
        }

        fn set_failed(&self, message: &str) {
            self.failures.lock().unwrap().push(message.to_string());
        }
    }

    /// Sleeper that returns immediately and records requested durations.
    #[derive(Default)]
    struct InstantSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for InstantSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    struct StaticCredentials(Option<&'static str>, Option<&'static str>);

    impl CredentialProvider for StaticCredentials {
        fn email(&self) -> Option<String> {
            self.0.map(str::to_string)
        }

        fn password(&self) -> Option<SecretString> {
            self.1.map(SecretString::from)
        }
    }

    const CREDS: StaticCredentials =
        StaticCredentials(Some("john.doe@codeclarity.io"), Some("ThisIs4Str0ngP4ssW0rd?"));

    fn ready(critical: u64, high: u64, medium: u64) -> PollOutcome {
        PollOutcome::Ready(VulnerabilitySummary {
            data: VulnerabilityCounts {
                number_of_critical: critical,
                number_of_high: high,
                number_of_medium: medium,
                ..VulnerabilityCounts::default()
            },
            status_code: 200,
        })
    }

    #[tokio::test]
    async fn test_existing_project_skips_import() {
        let api = MockApi::new("proj-1", vec![ready(0, 0, 0)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.expect("run should succeed");

        assert_eq!(report.project_id, "proj-1");
        assert!(!report.imported);
        assert_eq!(api.count("get_github_integration"), 0);
        assert_eq!(api.count("import_project"), 0);
        assert_eq!(
            api.calls(),
            vec![
                "authenticate:john.doe@codeclarity.io",
                "get_user",
                "get_organization",
                "get_project:org-1:CodeClarityCE%2Ffrontend",
                "get_analyzer:JavaScript%20Analyzer",
                "start_analysis:proj-1:an-1:main",
                "get_result:analysis-1",
            ]
        );
        assert!(host.failures().is_empty());
    }

    #[tokio::test]
    async fn test_absent_project_is_imported() {
        let api = MockApi::new("", vec![ready(0, 0, 0)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.unwrap();

        assert!(report.imported);
        assert_eq!(report.project_id, "proj-new");
        assert!(
            api.calls()
                .contains(&"import_project:int-gh:https://github.com/CodeClarityCE/frontend".to_string())
        );
        assert!(
            api.calls()
                .contains(&"start_analysis:proj-new:an-1:main".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_github_integration_aborts() {
        let mut api = MockApi::new("", vec![ready(0, 0, 0)]);
        api.github_integration = None;
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        assert!(pipeline.run(&CREDS).await.is_none());
        assert_eq!(
            host.failures(),
            vec!["Failed to get integrations: no GitHub integration found"]
        );
        assert_eq!(api.count("import_project"), 0);
        assert!(host.outputs().is_empty());
    }

    #[tokio::test]
    async fn test_retries_once_on_500() {
        let api = MockApi::new(
            "proj-1",
            vec![PollOutcome::Transient { status: 500 }, ready(0, 0, 2)],
        );
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.unwrap();

        assert_eq!(api.count("get_result"), 2);
        assert_eq!(report.summary.data.number_of_medium, 2);
        assert_eq!(
            *sleeper.waits.lock().unwrap(),
            vec![Duration::from_secs(15), Duration::from_secs(30)]
        );
        assert!(
            host.debug
                .lock()
                .unwrap()
                .contains(&"Initial attempt failed. Retrying...".to_string())
        );
    }

    #[tokio::test]
    async fn test_second_500_is_fatal() {
        let api = MockApi::new(
            "proj-1",
            vec![
                PollOutcome::Transient { status: 500 },
                PollOutcome::Transient { status: 500 },
                ready(0, 0, 0),
            ],
        );
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        assert!(pipeline.run(&CREDS).await.is_none());
        assert_eq!(api.count("get_result"), 2);
        assert_eq!(
            host.failures(),
            vec!["Failed to get results with status 500"]
        );
        assert!(host.outputs().is_empty());
    }

    #[tokio::test]
    async fn test_non_500_status_is_passed_through() {
        let api = MockApi::new(
            "proj-1",
            vec![PollOutcome::Transient { status: 404 }, ready(0, 0, 0)],
        );
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.expect("run should reach a report");

        assert_eq!(api.count("get_result"), 1);
        assert_eq!(*sleeper.waits.lock().unwrap(), vec![Duration::from_secs(15)]);
        assert_eq!(report.summary.status_code, 404);
        assert_eq!(report.summary.data, VulnerabilityCounts::default());
        assert!(report.verdict.is_pass());
        assert!(host.failures().is_empty());
        let outputs = host.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].1["status_code"], 404);
        assert_eq!(outputs[0].1["data"]["number_of_critical"], 0);
    }

    #[tokio::test]
    async fn test_retry_ending_in_other_status_is_passed_through() {
        let api = MockApi::new(
            "proj-1",
            vec![
                PollOutcome::Transient { status: 500 },
                PollOutcome::Transient { status: 503 },
            ],
        );
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.expect("run should reach a report");

        assert_eq!(api.count("get_result"), 2);
        assert_eq!(report.summary.status_code, 503);
        assert!(host.failures().is_empty());
    }

    #[tokio::test]
    async fn test_critical_fails_and_still_emits_output() {
        let api = MockApi::new("proj-1", vec![ready(1, 0, 0)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.unwrap();

        assert!(!report.verdict.is_pass());
        assert_eq!(host.failures(), vec!["There is a critical vulnerability"]);
        let outputs = host.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].0, VULNERABILITIES_OUTPUT);
        assert_eq!(outputs[0].1["data"]["number_of_critical"], 1);
    }

    #[tokio::test]
    async fn test_high_fails() {
        let api = MockApi::new("proj-1", vec![ready(0, 1, 0)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        pipeline.run(&CREDS).await.unwrap();

        assert_eq!(host.failures(), vec!["There is a high vulnerability"]);
    }

    #[tokio::test]
    async fn test_medium_only_passes_with_output() {
        let api = MockApi::new("proj-1", vec![ready(0, 0, 5)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let report = pipeline.run(&CREDS).await.unwrap();

        assert!(report.verdict.is_pass());
        assert!(host.failures().is_empty());
        let outputs = host.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].1["status_code"], 200);
        assert_eq!(outputs[0].1["data"]["number_of_medium"], 5);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let api = MockApi::new("proj-1", vec![ready(0, 0, 0)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        let creds = StaticCredentials(Some("john.doe@codeclarity.io"), None);
        assert!(pipeline.run(&creds).await.is_none());

        assert!(api.calls().is_empty());
        assert_eq!(host.failures(), vec!["email or password env var empty"]);
    }

    #[tokio::test]
    async fn test_authentication_failure_aborts() {
        let mut api = MockApi::new("proj-1", vec![ready(0, 0, 0)]);
        api.auth_status = Some(401);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        assert!(pipeline.run(&CREDS).await.is_none());

        assert_eq!(api.calls().len(), 1);
        assert_eq!(
            host.failures(),
            vec!["Authentication failed with status 401"]
        );
        assert!(host.outputs().is_empty());
        assert!(sleeper.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_is_redacted_in_debug_log() {
        let api = MockApi::new("proj-1", vec![ready(0, 0, 0)]);
        let host = RecordingHost::with_inputs();
        let sleeper = InstantSleeper::default();
        let pipeline = Pipeline::new(&api, &host, &sleeper, PollPolicy::default());

        pipeline.run(&CREDS).await.unwrap();

        let debug = host.debug.lock().unwrap();
        assert!(debug.contains(&"User token: toke***".to_string()));
        assert!(!debug.iter().any(|line| line.contains("token-123456")));
    }
}
