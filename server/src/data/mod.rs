//! Data storage layer
//!
//! - `sqlite` - the transactional store (the only database in this app)
//! - `topics` - in-process broadcast hub for chat events
//! - `types` - row types and closed domain enums

pub mod sqlite;
pub mod topics;
pub mod types;

pub use sqlite::{SqliteError, SqliteService};
pub use topics::{BroadcastTopic, Subscriber, TopicError, TopicService};
