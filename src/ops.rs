//! Multi-source combination operators.
//!
//! Every combinator resolves its inputs through
//! [`subscribe_to`](crate::subscribe_to::subscribe_to) when it is built, so
//! an unsupported input is reported before anything is subscribed. On
//! subscription one outer subscriber is created; it owns every inner
//! subscription and tears all of them down before forwarding a terminal
//! event downstream.

pub mod combine_latest;
pub mod concat;
pub mod fork_join;
pub mod race;

pub use combine_latest::{combine_latest, combine_latest_with};
pub use concat::{concat, concat_scheduled};
pub use fork_join::{fork_join, fork_join_with};
pub use race::race;
