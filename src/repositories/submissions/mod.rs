mod commands;
mod queries;
mod types;

pub(crate) use commands::save_retirement;
pub(crate) use queries::list_failed_active;
