//! Change notifications for the campus feed.
//!
//! - [`FeedBus`]: in-process fan-out backed by `tokio::sync::broadcast`.
//! - [`FeedEvent`]: the envelope published after every mutation and every
//!   refresh outcome.
//! - [`kinds`]: the event type names.

pub mod bus;
pub mod kinds;

pub use bus::{FeedBus, FeedEvent, DEFAULT_CAPACITY};
