//! CLI-wide constants and the leveled diagnostic-output macros.
//!
//! Mirrors a `DISPLAY_LEVEL` + `displaylevel!` pattern (an atomic verbosity
//! level shared across modules, not the `log` crate), which itself mirrors
//! the original `rzip.c`'s `control->verbosity` field plus direct
//! `fprintf(stderr, ...)` calls scattered through `hash_search`/`rzip_fd`.

use std::sync::atomic::{AtomicU32, Ordering};

pub const PROGRAM_NAME: &str = "rzip";
pub const DECOMPRESS_ALIAS: &str = "runzip";
pub const DEFAULT_LEVEL: u8 = 6;

/// 0 = silent, 1 = errors only (default), 2 = progress (`-P`/`-v`).
pub static VERBOSITY: AtomicU32 = AtomicU32::new(1);

#[inline]
pub fn verbosity() -> u32 {
    VERBOSITY.load(Ordering::Relaxed)
}

#[inline]
pub fn set_verbosity(level: u32) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

/// Conditionally print to stderr at or above `level` — equivalent to the
/// original's `if (control->verbosity >= level) fprintf(stderr, ...)`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::verbosity() >= $level {
            eprintln!($($arg)*);
        }
    };
}

/// Unconditional diagnostic line to stderr, prefixed with the program name —
/// used for fatal errors that abort processing of one file (prints a
/// message, leaves the overall exit status to the caller).
#[macro_export]
macro_rules! display_error {
    ($($arg:tt)*) => {{
        eprint!("{}: ", $crate::cli::constants::PROGRAM_NAME);
        eprintln!($($arg)*);
    }};
}
