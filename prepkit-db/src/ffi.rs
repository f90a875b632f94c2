//! Raw FFI bindings to SQLite.
//!
//! The symbols come from the SQLite amalgamation that `libsqlite3-sys`
//! compiles and links statically (`bundled` feature). The thin wrappers below
//! normalise every pointer type to `*mut c_void` so that the backend crate's
//! opaque types (`sqlite3`, `sqlite3_stmt`) do not leak into the rest of the
//! code.

#![allow(non_camel_case_types, dead_code, clippy::missing_safety_doc)]

use std::os::raw::{c_char, c_int, c_void};

// ── SQLite constants ────────────────────────────────────────────────────

pub const SQLITE_OK: c_int = 0;
pub const SQLITE_MISUSE: c_int = 21;
pub const SQLITE_RANGE: c_int = 25;
pub const SQLITE_ROW: c_int = 100;
pub const SQLITE_DONE: c_int = 101;

// Column type constants
pub const SQLITE_INTEGER: c_int = 1;
pub const SQLITE_FLOAT: c_int = 2;
pub const SQLITE_TEXT: c_int = 3;
pub const SQLITE_BLOB: c_int = 4;
pub const SQLITE_NULL: c_int = 5;

// Open flags
pub const SQLITE_OPEN_READONLY: c_int = 0x0000_0001;
pub const SQLITE_OPEN_READWRITE: c_int = 0x0000_0002;
pub const SQLITE_OPEN_CREATE: c_int = 0x0000_0004;
pub const SQLITE_OPEN_FULLMUTEX: c_int = 0x0001_0000;

// ── Bundled backend ─────────────────────────────────────────────────────

mod imp {
    use super::{c_char, c_int, c_void};

    use libsqlite3_sys as sys;

    // ── Connection lifecycle ────────────────────────────────────────────

    pub unsafe fn sqlite3_open_v2(
        filename: *const c_char,
        pp_db: *mut *mut c_void,
        flags: c_int,
        z_vfs: *const c_char,
    ) -> c_int {
        sys::sqlite3_open_v2(filename, pp_db.cast::<*mut sys::sqlite3>(), flags, z_vfs)
    }

    pub unsafe fn sqlite3_close_v2(db: *mut c_void) -> c_int {
        sys::sqlite3_close_v2(db.cast())
    }

    // ── Execution ───────────────────────────────────────────────────────

    pub unsafe fn sqlite3_exec(
        db: *mut c_void,
        sql: *const c_char,
        errmsg: *mut *mut c_char,
    ) -> c_int {
        sys::sqlite3_exec(db.cast(), sql, None, std::ptr::null_mut(), errmsg)
    }

    pub unsafe fn sqlite3_free(ptr: *mut c_void) {
        sys::sqlite3_free(ptr);
    }

    // ── Prepared statements ─────────────────────────────────────────────

    pub unsafe fn sqlite3_prepare_v2(
        db: *mut c_void,
        z_sql: *const c_char,
        n_byte: c_int,
        pp_stmt: *mut *mut c_void,
        pz_tail: *mut *const c_char,
    ) -> c_int {
        sys::sqlite3_prepare_v2(
            db.cast(),
            z_sql,
            n_byte,
            pp_stmt.cast::<*mut sys::sqlite3_stmt>(),
            pz_tail,
        )
    }

    pub unsafe fn sqlite3_step(stmt: *mut c_void) -> c_int {
        sys::sqlite3_step(stmt.cast())
    }

    pub unsafe fn sqlite3_reset(stmt: *mut c_void) -> c_int {
        sys::sqlite3_reset(stmt.cast())
    }

    pub unsafe fn sqlite3_clear_bindings(stmt: *mut c_void) -> c_int {
        sys::sqlite3_clear_bindings(stmt.cast())
    }

    pub unsafe fn sqlite3_finalize(stmt: *mut c_void) -> c_int {
        sys::sqlite3_finalize(stmt.cast())
    }

    pub unsafe fn sqlite3_stmt_readonly(stmt: *mut c_void) -> c_int {
        sys::sqlite3_stmt_readonly(stmt.cast())
    }

    // ── Parameter binding ───────────────────────────────────────────────

    pub unsafe fn sqlite3_bind_int64(stmt: *mut c_void, index: c_int, value: i64) -> c_int {
        sys::sqlite3_bind_int64(stmt.cast(), index, value)
    }

    pub unsafe fn sqlite3_bind_double(stmt: *mut c_void, index: c_int, value: f64) -> c_int {
        sys::sqlite3_bind_double(stmt.cast(), index, value)
    }

    /// Binds a blob; SQLite copies the bytes (`SQLITE_TRANSIENT`).
    pub unsafe fn sqlite3_bind_blob(
        stmt: *mut c_void,
        index: c_int,
        value: *const c_void,
        n: c_int,
    ) -> c_int {
        sys::sqlite3_bind_blob(stmt.cast(), index, value, n, sys::SQLITE_TRANSIENT())
    }

    /// Binds UTF-8 text; SQLite copies the bytes (`SQLITE_TRANSIENT`).
    pub unsafe fn sqlite3_bind_text(
        stmt: *mut c_void,
        index: c_int,
        value: *const c_char,
        n: c_int,
    ) -> c_int {
        sys::sqlite3_bind_text(stmt.cast(), index, value, n, sys::SQLITE_TRANSIENT())
    }

    pub unsafe fn sqlite3_bind_null(stmt: *mut c_void, index: c_int) -> c_int {
        sys::sqlite3_bind_null(stmt.cast(), index)
    }

    pub unsafe fn sqlite3_bind_parameter_count(stmt: *mut c_void) -> c_int {
        sys::sqlite3_bind_parameter_count(stmt.cast())
    }

    // ── Column reading ──────────────────────────────────────────────────

    pub unsafe fn sqlite3_column_int64(stmt: *mut c_void, i_col: c_int) -> i64 {
        sys::sqlite3_column_int64(stmt.cast(), i_col)
    }

    pub unsafe fn sqlite3_column_double(stmt: *mut c_void, i_col: c_int) -> f64 {
        sys::sqlite3_column_double(stmt.cast(), i_col)
    }

    pub unsafe fn sqlite3_column_blob(stmt: *mut c_void, i_col: c_int) -> *const c_void {
        sys::sqlite3_column_blob(stmt.cast(), i_col)
    }

    pub unsafe fn sqlite3_column_bytes(stmt: *mut c_void, i_col: c_int) -> c_int {
        sys::sqlite3_column_bytes(stmt.cast(), i_col)
    }

    pub unsafe fn sqlite3_column_text(stmt: *mut c_void, i_col: c_int) -> *const c_char {
        sys::sqlite3_column_text(stmt.cast(), i_col).cast()
    }

    pub unsafe fn sqlite3_column_type(stmt: *mut c_void, i_col: c_int) -> c_int {
        sys::sqlite3_column_type(stmt.cast(), i_col)
    }

    pub unsafe fn sqlite3_column_count(stmt: *mut c_void) -> c_int {
        sys::sqlite3_column_count(stmt.cast())
    }

    pub unsafe fn sqlite3_column_name(stmt: *mut c_void, i_col: c_int) -> *const c_char {
        sys::sqlite3_column_name(stmt.cast(), i_col)
    }

    // ── Error reporting ─────────────────────────────────────────────────

    pub unsafe fn sqlite3_errmsg(db: *mut c_void) -> *const c_char {
        sys::sqlite3_errmsg(db.cast())
    }

    // ── Changes ─────────────────────────────────────────────────────────

    pub unsafe fn sqlite3_changes(db: *mut c_void) -> c_int {
        sys::sqlite3_changes(db.cast())
    }

    pub unsafe fn sqlite3_last_insert_rowid(db: *mut c_void) -> i64 {
        sys::sqlite3_last_insert_rowid(db.cast())
    }
}

// ── Public re-exports ───────────────────────────────────────────────────

pub(crate) use imp::*;
