//! Vidvault API
//!
//! HTTP surface for the video upload pipeline: receive a multipart upload,
//! inspect and rewrite the container, place the object, and hand back a
//! time-limited retrieval URL.

pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
