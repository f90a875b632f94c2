//! Common test utilities shared across integration tests.

use std::path::PathBuf;

use prepkit_core::{Session, SessionConfig};
use tempfile::TempDir;

/// A session over a fresh on-disk database. The directory lives as long as
/// the returned guard.
pub fn temp_session() -> (TempDir, PathBuf, Session) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sqlite.db");
    let session = Session::open(SessionConfig::at(&path)).expect("open session");
    session
        .exec(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)",
            vec![],
        )
        .expect("create table");
    (dir, path, session)
}
