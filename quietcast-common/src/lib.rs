//! # Quietcast Common Library
//!
//! Shared code for the Quietcast podcast platform:
//! - Database schema, models and queries
//! - Publish-state determination
//! - Session tokens and password hashing
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod password;
pub mod publish;
pub mod session;
pub mod time;

pub use error::{Error, Result};
pub use publish::{determine_publish_state, EpisodeStatus, PublishState};
