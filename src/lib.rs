//! Core library surface for the Library Desk application.
//!
//! `db` runs the SQL, `report` words the results, and `library` ties the two
//! together into one call per operation. The `ui` and `cli` modules are thin
//! front-ends over [`Library`].
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod report;
pub mod ui;

pub use config::Config;
pub use db::{LockGate, Proceed, LOCK_NOTICE};
pub use error::{LibraryError, Result};
pub use library::Library;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
