//! Encodeforge - plans staged rendition-encoding job graphs.
//!
//! The planning core lives in the `ef-*` crates. This crate wires them to
//! in-process adapters so plans can be produced from the command line and
//! exercised in integration tests without a database or a job runner.

pub mod recorded;
pub mod sink;
pub mod store;

pub use recorded::RecordedProber;
pub use sink::JobSink;
pub use store::InMemoryVideoStore;
