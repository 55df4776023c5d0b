//! Domain types and pure logic for face-swap job orchestration.
//!
//! Everything in this crate is free of network I/O: the data model
//! shared by the client, pipeline and relay crates, the artifact
//! resolver, the embedded-image encoder and the job state enum.

pub mod artifact;
pub mod encoding;
pub mod error;
pub mod job;
pub mod status;
pub mod types;
