//! Host-side plumbing around the protocol core: the tokio wake source and the
//! diagnostic frame sink.
pub mod report;
pub mod timer;
