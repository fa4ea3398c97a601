//! In-memory content-sharing backend: users, sessions, posts, comments, and
//! votes.
//!
//! The crate follows a hexagonal layout. [`domain`] owns the records, the vote
//! aggregator, the ports, and the driving services; [`outbound`] provides the
//! in-memory stores and the credential adapters; [`state`] wires them together
//! from [`config::ForumSettings`].

pub mod config;
pub mod domain;
pub mod outbound;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
