//! Statement-handle cache over an embedded `SQLite` engine.
//!
//! Hosts talk to a [`Session`] through three calls. `prep` compiles SQL
//! into a cached statement and returns its numeric handle (or closes
//! handles), `exec` runs mutating statements and `query` runs read
//! statements, encoding every row as a JSON record. `exec` and `query`
//! accept either a handle, written in decimal, or literal SQL.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod bound;

pub mod cache;
pub mod config;
pub mod logger;
pub mod reference;

mod error;
pub use error::*;

mod executor;
pub use executor::{execute, ExecOutcome};

mod query;
pub use query::{run as run_query, QueryOutcome};

mod script;

mod serializer;
pub use serializer::{encode_row, EncodeError, RecordShape};

mod session;
pub use session::Session;

mod value;
pub use value::SqlValue;

pub use config::SessionConfig;

uniffi::setup_scaffolding!("prepkit_core");
