//! Safe wrapper around a `SQLite` prepared statement.

use std::ffi::CStr;
use std::os::raw::{c_int, c_void};

use super::connection::errmsg;
use super::error::{DbError, DbResult};
use super::ffi;
use super::value::Value;

/// Result of a single `sqlite3_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available (`SQLITE_ROW`).
    Row,
    /// The statement has finished executing (`SQLITE_DONE`).
    Done,
}

/// A prepared (compiled) `SQLite` statement.
///
/// Statements are created via [`Connection::prepare`](super::Connection::prepare)
/// and finalized when dropped. A statement does not borrow its connection, so
/// it can be stored next to it (e.g. in a statement cache); the native
/// connection is closed with `sqlite3_close_v2`, which waits for every
/// outstanding statement to be finalized.
pub struct Statement {
    /// Raw `sqlite3_stmt*` handle. Null only after finalization.
    stmt: *mut c_void,
    /// Raw `sqlite3*` handle, kept for error messages.
    db: *mut c_void,
}

// Safety: the wrapper enforces single-owner semantics and every statement is
// used under the same external lock as its connection. The connection is
// opened with `SQLITE_OPEN_FULLMUTEX`.
unsafe impl Send for Statement {}

impl Statement {
    /// Creates a new `Statement` wrapping a raw pointer pair.
    ///
    /// # Safety
    ///
    /// `stmt` must be a valid, non-null `sqlite3_stmt*`.
    /// `db` must be the owning `sqlite3*` handle.
    pub(super) unsafe fn from_raw(stmt: *mut c_void, db: *mut c_void) -> Self {
        debug_assert!(!stmt.is_null());
        Self { stmt, db }
    }

    // ── Binding ─────────────────────────────────────────────────────────

    /// Returns the number of positional parameters the statement expects.
    pub fn parameter_count(&self) -> usize {
        let n = unsafe { ffi::sqlite3_bind_parameter_count(self.stmt) };
        usize::try_from(n).unwrap_or(0)
    }

    /// Binds a slice of [`Value`]s to the statement parameters (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns the engine error when a value cannot be bound (index out of
    /// range, value too large).
    pub fn bind_values(&mut self, values: &[Value]) -> DbResult<()> {
        for (i, val) in values.iter().enumerate() {
            let idx = c_int::try_from(i + 1).map_err(|_| {
                DbError::new(ffi::SQLITE_RANGE, "parameter index overflow")
            })?;
            let rc = match val {
                Value::Null => unsafe { ffi::sqlite3_bind_null(self.stmt, idx) },
                Value::Integer(v) => unsafe { ffi::sqlite3_bind_int64(self.stmt, idx, *v) },
                Value::Real(v) => unsafe { ffi::sqlite3_bind_double(self.stmt, idx, *v) },
                Value::Text(v) => {
                    let len = byte_len(v.len())?;
                    unsafe { ffi::sqlite3_bind_text(self.stmt, idx, v.as_ptr().cast(), len) }
                }
                Value::Blob(v) => {
                    let len = byte_len(v.len())?;
                    unsafe { ffi::sqlite3_bind_blob(self.stmt, idx, v.as_ptr().cast(), len) }
                }
            };
            if rc != ffi::SQLITE_OK {
                return Err(self.last_error(rc));
            }
        }
        Ok(())
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Executes a single step.
    ///
    /// # Errors
    ///
    /// Returns the engine error for anything other than `SQLITE_ROW` or
    /// `SQLITE_DONE`.
    pub fn step(&mut self) -> DbResult<StepResult> {
        let rc = unsafe { ffi::sqlite3_step(self.stmt) };
        match rc {
            ffi::SQLITE_ROW => Ok(StepResult::Row),
            ffi::SQLITE_DONE => Ok(StepResult::Done),
            _ => Err(self.last_error(rc)),
        }
    }

    /// Puts the statement back into its freshly compiled state: the cursor is
    /// released and every parameter is unbound.
    ///
    /// Errors from previous steps were already reported by [`step`](Self::step),
    /// so the return code of the underlying reset is not inspected here.
    pub fn rewind(&mut self) {
        unsafe {
            ffi::sqlite3_reset(self.stmt);
            ffi::sqlite3_clear_bindings(self.stmt);
        }
    }

    /// Returns `true` if the statement makes no direct changes to the
    /// database file.
    pub fn is_read_only(&self) -> bool {
        unsafe { ffi::sqlite3_stmt_readonly(self.stmt) != 0 }
    }

    // ── Column reading ──────────────────────────────────────────────────

    /// Returns the number of columns in the result set.
    pub fn column_count(&self) -> usize {
        let n = unsafe { ffi::sqlite3_column_count(self.stmt) };
        usize::try_from(n).unwrap_or(0)
    }

    /// Returns the name of column `idx` as reported by the engine.
    pub fn column_name(&self, idx: usize) -> String {
        unsafe {
            let ptr = ffi::sqlite3_column_name(self.stmt, col(idx));
            if ptr.is_null() {
                return String::new();
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }

    /// Returns the names of all result columns, in column order.
    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count()).map(|i| self.column_name(i)).collect()
    }

    /// Reads a column as `i64`.
    pub fn column_i64(&self, idx: usize) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.stmt, col(idx)) }
    }

    /// Reads a column as `f64`.
    pub fn column_f64(&self, idx: usize) -> f64 {
        unsafe { ffi::sqlite3_column_double(self.stmt, col(idx)) }
    }

    /// Reads a column as a blob. Returns an empty `Vec` for NULL.
    pub fn column_blob(&self, idx: usize) -> Vec<u8> {
        unsafe {
            let ptr = ffi::sqlite3_column_blob(self.stmt, col(idx));
            let len = ffi::sqlite3_column_bytes(self.stmt, col(idx));
            match usize::try_from(len) {
                Ok(len) if !ptr.is_null() && len > 0 => {
                    std::slice::from_raw_parts(ptr.cast::<u8>(), len).to_vec()
                }
                _ => Vec::new(),
            }
        }
    }

    /// Reads a column as a UTF-8 string. Returns an empty string for NULL.
    pub fn column_text(&self, idx: usize) -> String {
        unsafe {
            let ptr = ffi::sqlite3_column_text(self.stmt, col(idx));
            if ptr.is_null() {
                return String::new();
            }
            let len = ffi::sqlite3_column_bytes(self.stmt, col(idx));
            let len = usize::try_from(len).unwrap_or(0);
            let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Returns the storage class of column `idx`.
    pub fn column_type(&self, idx: usize) -> c_int {
        unsafe { ffi::sqlite3_column_type(self.stmt, col(idx)) }
    }

    /// Reads column `idx` of the current row with its own storage class.
    pub fn column_value(&self, idx: usize) -> Value {
        match self.column_type(idx) {
            ffi::SQLITE_INTEGER => Value::Integer(self.column_i64(idx)),
            ffi::SQLITE_FLOAT => Value::Real(self.column_f64(idx)),
            ffi::SQLITE_TEXT => Value::Text(self.column_text(idx)),
            ffi::SQLITE_BLOB => Value::Blob(self.column_blob(idx)),
            _ => Value::Null,
        }
    }

    /// Reads every column of the current row, in column order.
    pub fn row_values(&self) -> Vec<Value> {
        (0..self.column_count()).map(|i| self.column_value(i)).collect()
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn last_error(&self, code: c_int) -> DbError {
        DbError::new(code, errmsg(self.db))
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("stmt", &self.stmt)
            .finish_non_exhaustive()
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            unsafe {
                ffi::sqlite3_finalize(self.stmt);
            }
            self.stmt = std::ptr::null_mut();
        }
    }
}

/// Converts a column index to the C type. Column counts are bounded by
/// `SQLITE_MAX_COLUMN`, far below `c_int::MAX`.
fn col(idx: usize) -> c_int {
    c_int::try_from(idx).unwrap_or(c_int::MAX)
}

fn byte_len(len: usize) -> DbResult<c_int> {
    c_int::try_from(len)
        .map_err(|_| DbError::new(ffi::SQLITE_RANGE, "value too large to bind"))
}
