//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                   |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (unspecified)                   |
//! | 2    | CLI usage error (bad args, unknown key name)  |
//! | 3    | IO error (missing or unreadable file)         |
//! | 4    | Parse error (malformed JSON, CSV or settings) |
//!
//! A grid that is waiting for a mapping or has no data is not an error; it
//! renders its placeholder message and exits 0.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input or settings file could not be read, or output could not be written.
pub const EXIT_IO: u8 = 3;

/// Input or settings file is malformed.
pub const EXIT_PARSE: u8 = 4;
