// SPDX-License-Identifier: GPL-3.0-or-later

use std::ffi::OsString;
use std::path::PathBuf;
use clap::Parser;
use clap::AppSettings;
use anyhow::Result;

use memmap_tools::checksum::patch_file;
use memmap_tools::util::init_logging;

/// Write the boot-vector checksum into a copy of a firmware image
#[derive(Parser, Debug)]
#[clap(
    global_setting(AppSettings::DeriveDisplayOrder)
)]
pub struct Args {
    /// Source image
    input: PathBuf,

    /// Patched image, created or overwritten
    output: PathBuf,

    /// Verbosity. Can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,
}

/// Prints the usage and returns None on bad arguments
fn parse_args<I, T>(args: I) -> Option<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Some(args),
        Err(e) => {
            let _ = e.print();
            None
        }
    }
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args_os()) {
        Some(args) => args,
        None => return Ok(()),
    };
    init_logging(args.verbose);

    patch_file(&args.input, &args.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_paths() {
        let args = parse_args(["vector-checksum", "in.bin", "out.bin"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.bin"));
        assert_eq!(args.output, PathBuf::from("out.bin"));
        assert_eq!(args.verbose, 0);

        let args = parse_args(["vector-checksum", "-vv", "in.bin", "out.bin"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn wrong_arity_is_a_usage_error() {
        assert!(parse_args(["vector-checksum"]).is_none());
        assert!(parse_args(["vector-checksum", "in.bin"]).is_none());
        assert!(parse_args(["vector-checksum", "in.bin", "out.bin", "extra.bin"]).is_none());
    }
}
