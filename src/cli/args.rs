//! Command-line flag parsing: a hand-rolled `getopt`-style loop over
//! `std::env::args()` (no `clap` — see DESIGN.md) recognising this grammar:
//!
//! `rzip [-0..-9] [-d] [-o OUT] [-S SUF] [-f] [-k] [-P] [-L LEVEL] [-V] [-q IN_TMP] [-Q OUT_TMP] FILE...`

use crate::cli::arg_utils::read_u32_from_str;
use crate::cli::constants::DEFAULT_LEVEL;
use crate::driver::DEFAULT_SUFFIX;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Everything the post-parse dispatch in `main.rs` needs.
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    pub decompress: bool,
    pub level: u8,
    pub outname: Option<String>,
    pub suffix: String,
    pub force: bool,
    pub keep: bool,
    pub progress: bool,
    pub version: bool,
    pub help: bool,
    pub in_tmp: Option<PathBuf>,
    pub out_tmp: Option<PathBuf>,
    pub files: Vec<String>,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        ParsedArgs {
            decompress: false,
            level: DEFAULT_LEVEL,
            outname: None,
            suffix: DEFAULT_SUFFIX.to_string(),
            force: false,
            keep: false,
            progress: false,
            version: false,
            help: false,
            in_tmp: None,
            out_tmp: None,
            files: Vec::new(),
        }
    }
}

/// Parses `args` (excluding `argv[0]`), starting from `decompress` as set by
/// [`crate::cli::init::invoked_as_runzip`].
pub fn parse_args(args: &[String], decompress_default: bool) -> Result<ParsedArgs> {
    let mut parsed = ParsedArgs {
        decompress: decompress_default,
        ..ParsedArgs::default()
    };

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "-" || !arg.starts_with('-') {
            parsed.files.push(arg.to_string());
            i += 1;
            continue;
        }

        match arg {
            "-d" => parsed.decompress = true,
            "-f" => parsed.force = true,
            "-k" => parsed.keep = true,
            "-P" | "-v" => parsed.progress = true,
            "-V" => parsed.version = true,
            "-h" => parsed.help = true,
            "-o" => {
                i += 1;
                let val = args.get(i).ok_or_else(|| anyhow::anyhow!("-o requires an argument"))?;
                parsed.outname = Some(val.clone());
            }
            "-S" => {
                i += 1;
                let val = args.get(i).ok_or_else(|| anyhow::anyhow!("-S requires an argument"))?;
                parsed.suffix = val.clone();
            }
            "-L" => {
                i += 1;
                let val = args.get(i).ok_or_else(|| anyhow::anyhow!("-L requires an argument"))?;
                parsed.level = parse_level(val)?;
            }
            "-q" => {
                i += 1;
                let val = args.get(i).ok_or_else(|| anyhow::anyhow!("-q requires an argument"))?;
                parsed.in_tmp = Some(PathBuf::from(val));
            }
            "-Q" => {
                i += 1;
                let val = args.get(i).ok_or_else(|| anyhow::anyhow!("-Q requires an argument"))?;
                parsed.out_tmp = Some(PathBuf::from(val));
            }
            other if other.len() == 2 && other.as_bytes()[1].is_ascii_digit() => {
                parsed.level = other.as_bytes()[1] - b'0';
            }
            other => bail!("unknown option '{other}'"),
        }
        i += 1;
    }

    Ok(parsed)
}

/// Parses `-L`'s numeric argument, rejecting a trailing size suffix: unlike
/// `read_u32_from_str`'s other callers, a compression level is always a bare
/// one-digit number.
fn parse_level(s: &str) -> Result<u8> {
    let (value, rest) = read_u32_from_str(s).ok_or_else(|| anyhow::anyhow!("invalid level '{s}'"))?;
    if !rest.is_empty() {
        bail!("invalid level '{s}'");
    }
    if value > 9 {
        bail!("level must be 0..9, got {value}");
    }
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_level_and_mode() {
        let p = parse_args(&args(&["file.txt"]), false).unwrap();
        assert_eq!(p.level, DEFAULT_LEVEL);
        assert!(!p.decompress);
        assert_eq!(p.files, vec!["file.txt"]);
    }

    #[test]
    fn digit_flag_sets_level() {
        let p = parse_args(&args(&["-3", "file.txt"]), false).unwrap();
        assert_eq!(p.level, 3);
    }

    #[test]
    fn dash_d_sets_decompress() {
        let p = parse_args(&args(&["-d", "file.rz"]), false).unwrap();
        assert!(p.decompress);
    }

    #[test]
    fn runzip_default_can_be_overridden_by_flags_only_additively() {
        // decompress_default true (as if invoked as runzip); no -d needed.
        let p = parse_args(&args(&["file.rz"]), true).unwrap();
        assert!(p.decompress);
    }

    #[test]
    fn dash_o_sets_outname() {
        let p = parse_args(&args(&["-o", "out.bin", "file.txt"]), false).unwrap();
        assert_eq!(p.outname.as_deref(), Some("out.bin"));
    }

    #[test]
    fn dash_o_without_value_errors() {
        assert!(parse_args(&args(&["-o"]), false).is_err());
    }

    #[test]
    fn dash_capital_l_sets_level() {
        let p = parse_args(&args(&["-L", "7", "file.txt"]), false).unwrap();
        assert_eq!(p.level, 7);
    }

    #[test]
    fn dash_capital_l_rejects_out_of_range() {
        assert!(parse_args(&args(&["-L", "15", "file.txt"]), false).is_err());
    }

    #[test]
    fn dash_s_overrides_suffix() {
        let p = parse_args(&args(&["-S", ".foo", "file.txt"]), false).unwrap();
        assert_eq!(p.suffix, ".foo");
    }

    #[test]
    fn force_and_keep_flags() {
        let p = parse_args(&args(&["-f", "-k", "file.txt"]), false).unwrap();
        assert!(p.force);
        assert!(p.keep);
    }

    #[test]
    fn progress_flags() {
        assert!(parse_args(&args(&["-P", "file.txt"]), false).unwrap().progress);
        assert!(parse_args(&args(&["-v", "file.txt"]), false).unwrap().progress);
    }

    #[test]
    fn version_and_help_flags() {
        assert!(parse_args(&args(&["-V"]), false).unwrap().version);
        assert!(parse_args(&args(&["-h"]), false).unwrap().help);
    }

    #[test]
    fn dash_q_and_dash_cap_q_set_tmp_paths() {
        let p = parse_args(&args(&["-q", "/tmp/in", "-Q", "/tmp/out", "file.txt"]), false).unwrap();
        assert_eq!(p.in_tmp, Some(PathBuf::from("/tmp/in")));
        assert_eq!(p.out_tmp, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn lone_dash_is_treated_as_a_filename() {
        let p = parse_args(&args(&["-"]), false).unwrap();
        assert_eq!(p.files, vec!["-"]);
    }

    #[test]
    fn unknown_flag_errors() {
        assert!(parse_args(&args(&["--bogus"]), false).is_err());
    }

    #[test]
    fn multiple_files_collected_in_order() {
        let p = parse_args(&args(&["a.txt", "b.txt"]), false).unwrap();
        assert_eq!(p.files, vec!["a.txt", "b.txt"]);
    }
}
