//! Webhook relay for face-swap status notifications.
//!
//! Receives the face-swap service's encrypted webhook on
//! `POST /api/webhook`, decrypts it, and fans the resulting status event
//! out to every client connected on `GET /ws`.

pub mod app;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod routes;
pub mod state;
pub mod ws;
