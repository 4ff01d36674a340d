pub(crate) mod retirement;
