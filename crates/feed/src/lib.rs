//! Per-viewer campus feed session.
//!
//! [`FeedSession`] owns one viewer's snapshot and re-runs the full build
//! pipeline after every successful mutation. [`FeedConfig`] holds the
//! settings the binary reads from the environment.

pub mod config;
pub mod identity;
pub mod session;

pub use config::{ConfigError, FeedConfig};
pub use identity::lookup_identity;
pub use session::{EventDraft, FeedSession, SessionState};
