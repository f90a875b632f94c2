//! Minimal safe `SQLite` wrapper.
//!
//! This crate provides a small, safe Rust API over the `SQLite` C FFI. The
//! engine is compiled from the amalgamation bundled with `libsqlite3-sys` and
//! linked statically, so no system library is required.
//!
//! Consumer code (the statement cache, executor and query runner in
//! `prepkit-core`) uses only the safe types defined here and never touches
//! raw FFI directly. The `ffi` module holds every C binding.

mod ffi;

mod connection;
pub mod error;
mod statement;
pub mod value;

pub use connection::Connection;
pub use error::{DbError, DbErrorCode, DbResult};
pub use statement::{Statement, StepResult};
pub use value::Value;
