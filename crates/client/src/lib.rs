//! Face-swap service client library.
//!
//! Provides the REST wrappers for face detection, swap submission and
//! quota lookup, plus the reconnecting push channel that delivers
//! asynchronous job status events.

pub mod api;
pub mod channel;
pub mod client;
pub mod config;
pub mod events;
pub mod messages;
pub mod processor;
pub mod reconnect;
pub mod service;
