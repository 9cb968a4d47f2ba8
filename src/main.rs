//! Binary entry point for the `rzip`/`runzip` CLI.
//!
//! Alias detection from `argv[0]`, flag parsing into a `ParsedArgs` value,
//! then per-file dispatch to the compress/decompress drivers in
//! [`rzip::driver`]. Every fatal condition (bad magic, checksum mismatch,
//! I/O failure) surfaces here as a printed `rzip: <message>` diagnostic and
//! exit code 1; usage errors exit 255.

use rzip::cli::args::{parse_args, ParsedArgs};
use rzip::cli::constants::{set_verbosity, PROGRAM_NAME};
use rzip::cli::help::{print_bad_usage, print_usage, print_version};
use rzip::cli::init::invoked_as_runzip;
use rzip::driver::{
    compress_file, compress_stream, copy_to_stdout, decompress_file, drain_stdin_to_seekable,
};
use std::path::Path;
use std::process::ExitCode;

const STDIN_MARK: &str = "-";

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let argv0 = argv.first().cloned().unwrap_or_else(|| PROGRAM_NAME.to_string());
    let decompress_default = invoked_as_runzip(&argv0);

    let args = match parse_args(&argv[1..], decompress_default) {
        Ok(a) => a,
        Err(e) => print_bad_usage(PROGRAM_NAME, &e.to_string()),
    };

    if args.help {
        print_usage(PROGRAM_NAME);
        return ExitCode::SUCCESS;
    }
    if args.version {
        print_version(PROGRAM_NAME);
        return ExitCode::SUCCESS;
    }
    if args.progress {
        set_verbosity(2);
    }

    if args.files.is_empty() {
        print_bad_usage(PROGRAM_NAME, "no input files given");
    }

    let mut failures = 0u32;
    for file in &args.files {
        if let Err(e) = process_one(file, &args) {
            rzip::display_error!("{}", e);
            failures += 1;
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn process_one(name: &str, args: &ParsedArgs) -> anyhow::Result<()> {
    if name == STDIN_MARK {
        return process_piped(args);
    }

    let infile = Path::new(name);
    if args.decompress {
        let outfile = decompress_file(infile, args.outname.as_deref(), &args.suffix, args.force, args.keep)?;
        displaylevel_done(name, &outfile);
    } else if let Some(outfile) = compress_file(infile, args.outname.as_deref(), &args.suffix, args.level, args.force, args.keep)? {
        displaylevel_done(name, &outfile);
    }
    Ok(())
}

/// Handles `FILE == "-"`: stdin is drained into a seekable temp file (`-q`
/// names it explicitly) before it can be mmap'd, and the finished container
/// is written to a seekable temp file (`-Q` names it explicitly) before
/// being streamed to stdout — decompression of piped output is not
/// supported, since the history file it reopens for back-references must be
/// seekable.
fn process_piped(args: &ParsedArgs) -> anyhow::Result<()> {
    if args.decompress {
        anyhow::bail!("decompression from a pipe is not supported (history file must be seekable)");
    }

    let in_tmp = open_tmp(args.in_tmp.as_deref())?;
    let mut input = drain_stdin_to_seekable(in_tmp)?;

    let mut out_tmp = open_tmp(args.out_tmp.as_deref())?;
    compress_stream(&mut input, &mut out_tmp, args.level)?;
    copy_to_stdout(&mut out_tmp)?;
    Ok(())
}

fn open_tmp(path: Option<&Path>) -> anyhow::Result<std::fs::File> {
    match path {
        Some(p) => Ok(std::fs::OpenOptions::new().read(true).write(true).create(true).truncate(true).open(p)?),
        None => Ok(tempfile::tempfile()?),
    }
}

fn displaylevel_done(infile: &str, outfile: &Path) {
    rzip::displaylevel!(2, "{} -> {}", infile, outfile.display());
}
