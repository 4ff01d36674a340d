use serde::{Deserialize, Serialize};

const FAILURE_MESSAGE: &str = "<div class=\"capa_alert\">\
    Your submission could not be graded. \
    Please recheck your submission and try again. \
    If the problem persists, please notify the course staff.\
    </div>";

/// Routing header the LMS attaches to every submission.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmissionHeader {
    pub(crate) lms_callback_url: String,
    #[serde(default)]
    pub(crate) lms_key: Option<String>,
    #[serde(default)]
    pub(crate) queue_name: Option<String>,
}

/// Grader reply posted back to the LMS as `xqueue_body`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GradeReply {
    pub(crate) correct: Option<bool>,
    pub(crate) score: u32,
    pub(crate) msg: String,
}

impl GradeReply {
    pub(crate) fn failure() -> Self {
        Self { correct: None, score: 0, msg: FAILURE_MESSAGE.to_string() }
    }
}
