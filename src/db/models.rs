use sqlx::FromRow;

/// The slice of a `submissions` row the retirement sweep reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub(crate) struct FailedSubmission {
    pub(crate) id: i64,
    pub(crate) queue_name: String,
    pub(crate) xqueue_header: String,
    pub(crate) num_failures: i32,
    pub(crate) retired: bool,
    pub(crate) lms_ack: Option<bool>,
}

impl FailedSubmission {
    pub(crate) fn has_reached(&self, max_failures: u32) -> bool {
        i64::from(self.num_failures) >= i64::from(max_failures)
    }
}
