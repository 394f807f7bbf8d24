//! Domain logic independent of storage and transport

pub mod chat;
pub mod progress;

pub use chat::ChatEvent;
pub use progress::{apply_run, completion_met, ProgressDelta};
