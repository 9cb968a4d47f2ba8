//! Usage/version text. Mirrors a `cli::help` module shape: plain `eprintln!`
//! calls, no templating engine.

use crate::cli::constants::{DEFAULT_LEVEL, PROGRAM_NAME};
use crate::{RZIP_MAJOR_VERSION, RZIP_MINOR_VERSION};
use crate::driver::DEFAULT_SUFFIX;

/// Prints brief usage to stderr.
pub fn print_usage(program: &str) {
    eprintln!("Usage: {program} [-0..-9] [-d] [-o OUT] [-S SUF] [-f] [-k] [-P] [-L LEVEL] [-V] [-q IN_TMP] [-Q OUT_TMP] FILE...");
    eprintln!();
    eprintln!("  -0 .. -9   compression level (default -{DEFAULT_LEVEL})");
    eprintln!("  -d         decompress (default when invoked as 'runzip')");
    eprintln!("  -o OUT     explicit output filename");
    eprintln!("  -S SUF     suffix to append/strip (default '{DEFAULT_SUFFIX}')");
    eprintln!("  -f         force: overwrite an existing output file");
    eprintln!("  -k         keep (don't delete) the source file");
    eprintln!("  -P         show chunk progress");
    eprintln!("  -L LEVEL   same as -0..-9, accepts a number directly");
    eprintln!("  -v         verbose (same effect as -P)");
    eprintln!("  -q IN_TMP  drain stdin into IN_TMP before mmap'ing it");
    eprintln!("  -Q OUT_TMP write the compressed container to OUT_TMP, then stdout");
    eprintln!("  -V         print version and exit");
    eprintln!("  -h         print this help and exit");
}

/// Prints `<program> <major>.<minor>`.
pub fn print_version(program: &str) {
    println!("{program} {RZIP_MAJOR_VERSION}.{RZIP_MINOR_VERSION}");
}

/// Prints an error message plus brief usage, then exits with the
/// conventional usage-error status (255).
pub fn print_bad_usage(program: &str, msg: &str) -> ! {
    eprintln!("{program}: {msg}");
    print_usage(program);
    std::process::exit(255);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_and_version_do_not_panic() {
        print_usage(PROGRAM_NAME);
        print_version(PROGRAM_NAME);
    }
}
