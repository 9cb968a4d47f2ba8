//! Binary-name alias detection. Mirrors a `detect_alias`/`exeNameMatch`
//! pattern and the original's `strstr(argv[0], "runzip")` check in
//! `main.c`: invoking the binary as `runzip` implies decompression, exactly
//! like `lz4cat`/`unlz4` imply a fixed mode for the LZ4 CLI.

use crate::cli::arg_utils::{exe_name_match, last_name_from_path};
use crate::cli::constants::DECOMPRESS_ALIAS;

/// Whether `argv0` names the `runzip` alias (default decompress mode).
pub fn invoked_as_runzip(argv0: &str) -> bool {
    exe_name_match(last_name_from_path(argv0), DECOMPRESS_ALIAS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rzip_is_not_runzip() {
        assert!(!invoked_as_runzip("rzip"));
    }

    #[test]
    fn runzip_is_detected() {
        assert!(invoked_as_runzip("runzip"));
    }

    #[test]
    fn runzip_with_path_prefix_is_detected() {
        assert!(invoked_as_runzip("/usr/bin/runzip"));
    }

    #[test]
    fn runzip_with_exe_suffix_is_detected() {
        assert!(invoked_as_runzip("runzip.exe"));
    }

    #[test]
    fn unrelated_binary_name_is_not_runzip() {
        assert!(!invoked_as_runzip("gzip"));
    }
}
