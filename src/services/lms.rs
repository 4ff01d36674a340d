use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::core::config::{BasicAuth, Settings};
use crate::schemas::lms::{GradeReply, SubmissionHeader};
use crate::services::FailureNotifier;

#[derive(Debug, Clone)]
pub(crate) struct LmsClient {
    client: Client,
    basic_auth: Option<BasicAuth>,
    max_attempts: u32,
}

impl LmsClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let lms = settings.lms();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(lms.request_timeout_seconds))
            .timeout(Duration::from_secs(lms.request_timeout_seconds))
            .build()
            .context("Failed to build LMS HTTP client")?;

        Ok(Self { client, basic_auth: lms.basic_auth.clone(), max_attempts: lms.notify_attempts })
    }

    /// Posts the grading-failure reply to the callback named in `header`,
    /// retrying up to the configured number of attempts.
    pub(crate) async fn post_failure_to_lms(&self, header: &str) -> bool {
        let parsed = match serde_json::from_str::<SubmissionHeader>(header) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::error!(error = %err, "Submission header is not a valid LMS header");
                return false;
            }
        };

        if parsed.lms_callback_url.trim().is_empty() {
            tracing::error!(
                queue_name = parsed.queue_name.as_deref().unwrap_or_default(),
                "Submission header has an empty LMS callback URL"
            );
            return false;
        }

        let body = match serde_json::to_string(&GradeReply::failure()) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "Failed to encode LMS failure reply");
                return false;
            }
        };

        for attempt in 1..=self.max_attempts {
            match self.post_once(&parsed.lms_callback_url, header, &body).await {
                Ok(()) => {
                    tracing::debug!(
                        attempt,
                        lms_key = parsed.lms_key.as_deref().unwrap_or_default(),
                        "LMS acknowledged failure notice"
                    );
                    return true;
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        callback_url = %parsed.lms_callback_url,
                        error = %format!("{err:#}"),
                        "LMS failure notice attempt failed"
                    );
                }
            }
        }

        false
    }

    async fn post_once(&self, url: &str, header: &str, body: &str) -> Result<()> {
        let mut request =
            self.client.post(url).form(&[("xqueue_header", header), ("xqueue_body", body)]);

        if let Some(auth) = &self.basic_auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await.context("Failed to call LMS callback")?;
        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "LMS callback returned {status}: {}",
                text.chars().take(256).collect::<String>()
            );
        }

        Ok(())
    }
}

#[async_trait]
impl FailureNotifier for LmsClient {
    async fn post_failure(&self, header: &str) -> bool {
        self.post_failure_to_lms(header).await
    }
}
