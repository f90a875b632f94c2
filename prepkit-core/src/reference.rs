//! Classification of caller-supplied statement references.
//!
//! Every entry point receives a single string that is either literal SQL or
//! the decimal form of a handle returned by an earlier `prep`. The rule that
//! tells them apart lives here and nowhere else: a string is a handle
//! reference iff it is a non-empty run of ASCII digits whose value fits in a
//! `u64`. Signs, surrounding whitespace and out-of-range numbers make it raw
//! text.
//!
//! SQL text that happens to be a bare number (`"42"`) is therefore always a
//! handle reference. This is an accepted ambiguity of the calling convention.

use std::fmt;

/// Reserved `prep` input that closes every cached statement.
pub const CLEAR_CACHE_COMMAND: &str = "clean_prep_cache";

/// Identifier of a cached compiled statement. Never `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementHandle(u64);

impl StatementHandle {
    /// Wraps a raw handle value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value handed to callers.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StatementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved statement reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// Numeric reference to a cached statement.
    Handle(StatementHandle),
    /// Literal SQL text.
    RawText(&'a str),
}

impl<'a> Reference<'a> {
    /// Classifies `input`. Pure; never fails.
    #[must_use]
    pub fn resolve(input: &'a str) -> Self {
        parse_handle(input).map_or(Self::RawText(input), Self::Handle)
    }
}

/// What a `prep` call was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepCommand<'a> {
    /// Close every cached statement.
    ClearAll,
    /// Close one cached statement.
    Close(StatementHandle),
    /// Compile and cache a statement.
    Prepare(&'a str),
}

impl<'a> PrepCommand<'a> {
    /// Classifies a `prep` input. The reserved clear command takes priority
    /// over reference resolution.
    #[must_use]
    pub fn parse(input: &'a str) -> Self {
        if input == CLEAR_CACHE_COMMAND {
            return Self::ClearAll;
        }
        match Reference::resolve(input) {
            Reference::Handle(handle) => Self::Close(handle),
            Reference::RawText(sql) => Self::Prepare(sql),
        }
    }
}

fn parse_handle(input: &str) -> Option<StatementHandle> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse::<u64>().ok().map(StatementHandle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", 0 ; "zero")]
    #[test_case("2", 2 ; "first allocated handle")]
    #[test_case("0042", 42 ; "leading zeros")]
    #[test_case("18446744073709551615", u64::MAX ; "u64 max")]
    fn test_numeric_input_is_a_handle(input: &str, expected: u64) {
        assert_eq!(
            Reference::resolve(input),
            Reference::Handle(StatementHandle::new(expected))
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("SELECT 1" ; "sql")]
    #[test_case("+5" ; "explicit sign")]
    #[test_case("-5" ; "negative")]
    #[test_case(" 5" ; "leading whitespace")]
    #[test_case("5 " ; "trailing whitespace")]
    #[test_case("1.5" ; "decimal")]
    #[test_case("18446744073709551616" ; "overflow")]
    fn test_non_numeric_input_is_raw_text(input: &str) {
        assert_eq!(Reference::resolve(input), Reference::RawText(input));
    }

    #[test]
    fn test_clear_command_has_priority() {
        assert_eq!(PrepCommand::parse(CLEAR_CACHE_COMMAND), PrepCommand::ClearAll);
        assert_eq!(
            PrepCommand::parse("clean_prep_cache "),
            PrepCommand::Prepare("clean_prep_cache ")
        );
    }

    #[test]
    fn test_prep_routes_handles_to_close() {
        assert_eq!(
            PrepCommand::parse("7"),
            PrepCommand::Close(StatementHandle::new(7))
        );
        assert_eq!(
            PrepCommand::parse("SELECT 7"),
            PrepCommand::Prepare("SELECT 7")
        );
    }
}
