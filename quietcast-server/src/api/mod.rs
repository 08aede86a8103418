//! HTTP API handlers

pub mod audio;
pub mod auth;
pub mod episodes;
pub mod health;
pub mod listeners;
