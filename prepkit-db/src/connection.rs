//! The engine handle: one open `SQLite` database.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::path::Path;

use super::error::{DbError, DbResult};
use super::ffi;
use super::statement::{Statement, StepResult};
use super::value::Value;

/// An open database connection.
///
/// Closed on drop. Not `Sync`; callers serialize access themselves (the
/// `prepkit-core` session keeps it behind a mutex).
pub struct Connection {
    db: *mut c_void,
}

// Safety: the handle is opened in serialized (FULLMUTEX) mode and only ever
// owned by one thread at a time.
unsafe impl Send for Connection {}

impl Connection {
    /// Opens the database file at `path`.
    ///
    /// A writable open creates the file if it does not exist; a read-only
    /// open requires it to exist.
    ///
    /// # Errors
    ///
    /// If the path contains a NUL byte, or the engine cannot open the file.
    pub fn open(path: &Path, read_only: bool) -> DbResult<Self> {
        let c_path = to_cstring(path.to_string_lossy().as_ref(), "path")?;
        let access = if read_only {
            ffi::SQLITE_OPEN_READONLY
        } else {
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE
        };

        let mut db: *mut c_void = std::ptr::null_mut();
        let rc = unsafe {
            ffi::sqlite3_open_v2(
                c_path.as_ptr(),
                &mut db,
                access | ffi::SQLITE_OPEN_FULLMUTEX,
                std::ptr::null(),
            )
        };
        if rc == ffi::SQLITE_OK {
            return Ok(Self { db });
        }
        // The engine may hand back a handle even on failure; it carries the
        // message and must still be closed.
        let message = if db.is_null() {
            format!("unable to open database (code {rc})")
        } else {
            let message = errmsg(db);
            unsafe {
                ffi::sqlite3_close_v2(db);
            }
            message
        };
        Err(DbError::new(rc, message))
    }

    /// Opens a private, empty in-memory database.
    ///
    /// # Errors
    ///
    /// If the engine cannot allocate the database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(Path::new(":memory:"), false)
    }

    /// Runs a semicolon-separated script, discarding any rows.
    ///
    /// # Errors
    ///
    /// The first engine error raised by the script.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let c_sql = to_cstring(sql, "SQL")?;
        let mut raw_msg: *mut c_char = std::ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_exec(self.db, c_sql.as_ptr(), &mut raw_msg) };
        if rc == ffi::SQLITE_OK {
            return Ok(());
        }
        if raw_msg.is_null() {
            return Err(DbError::new(rc, errmsg(self.db)));
        }
        let message = unsafe { CStr::from_ptr(raw_msg) }
            .to_string_lossy()
            .into_owned();
        unsafe { ffi::sqlite3_free(raw_msg.cast()) };
        Err(DbError::new(rc, message))
    }

    /// Compiles `sql`, which must hold exactly one statement. A trailing
    /// semicolon, whitespace and comments are allowed after it.
    ///
    /// # Errors
    ///
    /// The engine's compile error, verbatim. Input holding no statement at
    /// all (blank, or only comments) and input holding more than one are
    /// rejected with `SQLITE_MISUSE`.
    pub fn prepare(&self, sql: &str) -> DbResult<Statement> {
        let (stmt, tail) = self.prepare_leading(sql)?;
        let stmt = stmt.ok_or_else(|| DbError::new(ffi::SQLITE_MISUSE, "empty statement"))?;
        if self.contains_statement(tail) {
            return Err(DbError::new(
                ffi::SQLITE_MISUSE,
                "cannot prepare more than one statement",
            ));
        }
        Ok(stmt)
    }

    /// Compiles the first statement in `sql` and returns it with the
    /// uncompiled remainder of the text.
    ///
    /// The statement is `None` when `sql` holds only whitespace, comments
    /// and semicolons.
    ///
    /// # Errors
    ///
    /// The engine's compile error for the first statement, verbatim.
    pub fn prepare_leading<'s>(&self, sql: &'s str) -> DbResult<(Option<Statement>, &'s str)> {
        let mut rest = sql;
        loop {
            let (stmt, tail) = self.prepare_one(rest)?;
            // An empty statement (`;`) compiles to nothing; skip past it.
            if stmt.is_some() || tail.len() == rest.len() || tail.trim().is_empty() {
                return Ok((stmt, tail));
            }
            rest = tail;
        }
    }

    /// Returns `true` if `sql` holds at least one more statement, including
    /// one that does not compile yet (for instance because it names a table
    /// an earlier statement creates).
    pub fn contains_statement(&self, sql: &str) -> bool {
        if sql.trim().is_empty() {
            return false;
        }
        !matches!(self.prepare_leading(sql), Ok((None, _)))
    }

    fn prepare_one<'s>(&self, sql: &'s str) -> DbResult<(Option<Statement>, &'s str)> {
        let c_sql = to_cstring(sql, "SQL")?;
        let base = c_sql.as_ptr();
        let mut stmt: *mut c_void = std::ptr::null_mut();
        let mut tail: *const c_char = std::ptr::null();
        let rc = unsafe { ffi::sqlite3_prepare_v2(self.db, base, -1, &mut stmt, &mut tail) };
        if rc != ffi::SQLITE_OK {
            return Err(DbError::new(rc, errmsg(self.db)));
        }
        // The tail points into `c_sql`, whose bytes are those of `sql`.
        let consumed = if tail.is_null() {
            sql.len()
        } else {
            usize::try_from(unsafe { tail.offset_from(base) }).unwrap_or(sql.len())
        };
        let rest = sql.get(consumed..).unwrap_or_default();
        let stmt = (!stmt.is_null()).then(|| unsafe { Statement::from_raw(stmt, self.db) });
        Ok((stmt, rest))
    }

    /// Compiles `sql`, binds `params` and steps it to completion. Returns
    /// the number of changed rows.
    ///
    /// # Errors
    ///
    /// Compile, bind and step errors.
    pub fn execute(&self, sql: &str, params: &[Value]) -> DbResult<i64> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        while stmt.step()? == StepResult::Row {}
        Ok(self.changes())
    }

    /// Rowid of the most recent successful INSERT on this connection, or `0`
    /// if there has been none.
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    /// Rows changed by the most recently completed INSERT, UPDATE or DELETE.
    /// Other statements leave the count untouched.
    pub fn changes(&self) -> i64 {
        i64::from(unsafe { ffi::sqlite3_changes(self.db) })
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("db", &self.db).finish()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.db.is_null() {
            return;
        }
        // With statements still alive the handle becomes a zombie and is
        // released when the last of them is finalized.
        unsafe {
            ffi::sqlite3_close_v2(self.db);
        }
        self.db = std::ptr::null_mut();
    }
}

/// Latest error message recorded on `db`.
pub(super) fn errmsg(db: *mut c_void) -> String {
    let ptr = unsafe { ffi::sqlite3_errmsg(db) };
    if ptr.is_null() {
        return "unknown error".to_owned();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn to_cstring(text: &str, what: &str) -> DbResult<CString> {
    CString::new(text)
        .map_err(|e| DbError::new(ffi::SQLITE_MISUSE, format!("nul byte in {what}: {e}")))
}
