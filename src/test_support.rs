use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crate::db::models::FailedSubmission;
use crate::repositories::SubmissionStore;
use crate::services::FailureNotifier;

pub(crate) fn header_for(id: i64) -> String {
    json!({
        "lms_callback_url": format!("http://lms.test/courses/score_update/{id}"),
        "lms_key": format!("key-{id}"),
        "queue_name": "test",
    })
    .to_string()
}

pub(crate) fn submission(id: i64, queue_name: &str, num_failures: i32) -> FailedSubmission {
    FailedSubmission {
        id,
        queue_name: queue_name.to_string(),
        xqueue_header: header_for(id),
        num_failures,
        retired: false,
        lms_ack: None,
    }
}

/// In-memory stand-in for the `submissions` table with the same active-row
/// write guard as the Postgres store.
#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<Vec<FailedSubmission>>,
    queries: Mutex<Vec<Option<String>>>,
    failing_queue: Option<String>,
    failing_saves: HashSet<i64>,
    retired_elsewhere: HashSet<i64>,
}

impl MemoryStore {
    pub(crate) fn new(rows: Vec<FailedSubmission>) -> Self {
        Self { rows: Mutex::new(rows), ..Self::default() }
    }

    /// Listing this queue fails as if the database went away.
    pub(crate) fn failing_on_queue(mut self, queue_name: &str) -> Self {
        self.failing_queue = Some(queue_name.to_string());
        self
    }

    /// Saving any of these rows fails as if the database went away.
    pub(crate) fn failing_save_for(mut self, ids: &[i64]) -> Self {
        self.failing_saves = ids.iter().copied().collect();
        self
    }

    /// These rows get retired by a competing sweeper right after they are listed.
    pub(crate) fn retired_elsewhere(mut self, ids: &[i64]) -> Self {
        self.retired_elsewhere = ids.iter().copied().collect();
        self
    }

    pub(crate) async fn get(&self, id: i64) -> FailedSubmission {
        self.rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("no submission {id}"))
    }

    pub(crate) async fn queries(&self) -> Vec<Option<String>> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn list_failed(
        &self,
        queue_name: Option<&str>,
    ) -> Result<Vec<FailedSubmission>, sqlx::Error> {
        self.queries.lock().await.push(queue_name.map(str::to_string));

        if queue_name.is_some() && queue_name == self.failing_queue.as_deref() {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let mut rows = self.rows.lock().await;
        let selected: Vec<FailedSubmission> = rows
            .iter()
            .filter(|row| !row.retired && row.num_failures > 0)
            .filter(|row| queue_name.map_or(true, |queue| row.queue_name == queue))
            .cloned()
            .collect();

        for row in rows.iter_mut() {
            if self.retired_elsewhere.contains(&row.id) {
                row.retired = true;
            }
        }

        Ok(selected)
    }

    async fn save_retirement(&self, submission: &FailedSubmission) -> Result<bool, sqlx::Error> {
        if self.failing_saves.contains(&submission.id) {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let mut rows = self.rows.lock().await;
        let Some(row) = rows.iter_mut().find(|row| row.id == submission.id) else {
            return Ok(false);
        };
        if row.retired {
            return Ok(false);
        }

        row.retired = submission.retired;
        row.lms_ack = submission.lms_ack;
        Ok(true)
    }
}

/// Answers with a fixed acknowledgment per submission id and records every call.
#[derive(Default)]
pub(crate) struct ScriptedNotifier {
    acks: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNotifier {
    pub(crate) fn new(acks: &[(i64, bool)]) -> Self {
        let acks = acks.iter().map(|(id, ack)| (header_for(*id), *ack)).collect();
        Self { acks: Mutex::new(acks), calls: Mutex::new(Vec::new()) }
    }

    pub(crate) async fn set_ack(&self, id: i64, ack: bool) {
        self.acks.lock().await.insert(header_for(id), ack);
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub(crate) async fn calls_for(&self, id: i64) -> usize {
        let header = header_for(id);
        self.calls.lock().await.iter().filter(|call| **call == header).count()
    }
}

#[async_trait]
impl FailureNotifier for ScriptedNotifier {
    async fn post_failure(&self, header: &str) -> bool {
        self.calls.lock().await.push(header.to_string());
        self.acks.lock().await.get(header).copied().unwrap_or(false)
    }
}
