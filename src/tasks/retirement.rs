use anyhow::{Context, Result};

use crate::db::models::FailedSubmission;
use crate::repositories::SubmissionStore;
use crate::services::FailureNotifier;

#[derive(Debug, Clone)]
pub(crate) struct RetirementOptions {
    queue_names: Vec<String>,
    force: bool,
    max_failures: u32,
}

impl RetirementOptions {
    /// An empty `queue_names` sweeps every queue.
    pub(crate) fn new(queue_names: Vec<String>, force: bool, max_failures: u32) -> Self {
        Self { queue_names, force, max_failures }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepReport {
    pub(crate) scanned: usize,
    pub(crate) below_threshold: usize,
    pub(crate) retired: usize,
    pub(crate) declined: usize,
    pub(crate) conflicts: usize,
}

impl SweepReport {
    fn absorb(&mut self, other: SweepReport) {
        self.scanned += other.scanned;
        self.below_threshold += other.below_threshold;
        self.retired += other.retired;
        self.declined += other.declined;
        self.conflicts += other.conflicts;
    }
}

/// Retires every active submission whose failure count has reached
/// `max_failures`. In force mode rows are retired without contacting the
/// LMS; otherwise a row is retired only once the LMS acknowledges the
/// failure notice, and stays a candidate for the next sweep when it does not.
pub(crate) async fn retire_failed_submissions<S, N>(
    store: &S,
    notifier: &N,
    options: &RetirementOptions,
) -> Result<SweepReport>
where
    S: SubmissionStore + ?Sized,
    N: FailureNotifier + ?Sized,
{
    tracing::info!(
        max_failures = options.max_failures,
        queues = ?options.queue_names,
        "Scanning submissions to retire failed submissions"
    );
    if options.force {
        tracing::info!("Force retiring failed submissions without contacting the LMS");
    }

    let mut report = SweepReport::default();

    if options.queue_names.is_empty() {
        report.absorb(retire_in_queue(store, notifier, options, None).await?);
    } else {
        for queue_name in &options.queue_names {
            report.absorb(
                retire_in_queue(store, notifier, options, Some(queue_name.as_str())).await?,
            );
        }
    }

    tracing::info!(
        scanned = report.scanned,
        below_threshold = report.below_threshold,
        retired = report.retired,
        declined = report.declined,
        conflicts = report.conflicts,
        "Finished retiring failed submissions"
    );

    Ok(report)
}

async fn retire_in_queue<S, N>(
    store: &S,
    notifier: &N,
    options: &RetirementOptions,
    queue_name: Option<&str>,
) -> Result<SweepReport>
where
    S: SubmissionStore + ?Sized,
    N: FailureNotifier + ?Sized,
{
    let candidates = store.list_failed(queue_name).await.with_context(|| match queue_name {
        Some(queue) => format!("Failed to fetch failed submissions for queue '{queue}'"),
        None => "Failed to fetch failed submissions".to_string(),
    })?;

    let mut report = SweepReport { scanned: candidates.len(), ..SweepReport::default() };

    for mut submission in candidates {
        if !submission.has_reached(options.max_failures) {
            tracing::debug!(
                submission_id = submission.id,
                num_failures = submission.num_failures,
                "Submission below failure threshold"
            );
            report.below_threshold += 1;
            continue;
        }

        tracing::info!(
            submission_id = submission.id,
            queue_name = %submission.queue_name,
            num_failures = submission.num_failures,
            "Retiring submission"
        );

        let mode = if options.force {
            submission.retired = true;
            "force"
        } else {
            notify_lms(notifier, &mut submission).await;
            "notified"
        };

        let saved = store
            .save_retirement(&submission)
            .await
            .with_context(|| format!("Failed to save retirement of submission {}", submission.id))?;

        if !saved {
            tracing::warn!(
                submission_id = submission.id,
                "Submission was retired concurrently; keeping the existing state"
            );
            metrics::counter!("retirement_conflicts_total").increment(1);
            report.conflicts += 1;
        } else if submission.retired {
            metrics::counter!("submissions_retired_total", "mode" => mode).increment(1);
            report.retired += 1;
        } else {
            metrics::counter!("lms_notifications_declined_total").increment(1);
            report.declined += 1;
        }
    }

    Ok(report)
}

async fn notify_lms<N>(notifier: &N, submission: &mut FailedSubmission)
where
    N: FailureNotifier + ?Sized,
{
    let ack = notifier.post_failure(&submission.xqueue_header).await;
    submission.lms_ack = Some(ack);
    submission.retired = ack;

    if !ack {
        tracing::error!(
            submission_id = submission.id,
            queue_name = %submission.queue_name,
            "Could not contact LMS to retire submission"
        );
    }
}
