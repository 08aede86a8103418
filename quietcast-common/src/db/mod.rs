//! Database access: initialization, migrations, models and queries

pub mod episodes;
pub mod init;
pub mod listeners;
pub mod migrations;
pub mod models;

pub use init::init_database;
