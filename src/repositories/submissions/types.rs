pub(crate) const COLUMNS: &str = "id, queue_name, xqueue_header, num_failures, retired, lms_ack";
