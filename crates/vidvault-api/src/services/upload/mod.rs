//! Upload pipeline: receive → inspect → rewrite → place → sign.

pub mod pipeline;
pub mod receiver;

pub use pipeline::{process_and_place, PlacedVideo};
pub use receiver::{receive_video, ReceivedVideo};
