pub(crate) mod lms;
