//! Database module for SQLite operations.
//!
//! Initialization, pragma configuration, and schema migrations for the
//! three ledger tables.

pub mod migrations;

pub use migrations::init_db;
