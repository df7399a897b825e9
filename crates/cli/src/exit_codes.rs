//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3-9     | input            | File detection/read codes                |
//! | 50-59   | extract          | Extraction-service codes                 |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File extension not recognized by any adapter.
pub const EXIT_UNSUPPORTED_FORMAT: u8 = 3;

/// Input file cannot be read (missing, permissions).
pub const EXIT_UNREADABLE: u8 = 4;

/// Extraction service not configured (no endpoint saved or in env).
/// Note: a configured-but-failing service is NOT an error exit — the
/// reconciliation degrades to an empty record with a warning instead.
pub const EXIT_EXTRACT_NOT_CONFIGURED: u8 = 50;
