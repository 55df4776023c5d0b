//! Face-swap job orchestration.
//!
//! [`controller::JobController`] sequences detection, submission and
//! push-notification correlation for the single in-flight job and
//! reports progress through a [`display::JobDisplay`] collaborator.
//! The transition rules live in [`machine::JobMachine`], which is pure
//! and driven by intents.

pub mod controller;
pub mod display;
pub mod download;
pub mod error;
pub mod machine;
pub mod stage;
