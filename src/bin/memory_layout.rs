// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use clap::Parser;
use clap::AppSettings;
use anyhow::Result;

use memmap_tools::layout::{generate_file, GenerateOptions};
use memmap_tools::util::init_logging;

/// Generate C structure declarations from peripheral memory-map documents
#[derive(Parser, Debug)]
#[clap(
    global_setting(AppSettings::DeriveDisplayOrder)
)]
pub struct Args {
    /// JSON or YAML documents, each an array of memory domains
    files: Vec<PathBuf>,

    /// Emit an extern declaration for every domain
    #[clap(long = "extern")]
    extern_decls: bool,

    /// Verbosity. Can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let opts = GenerateOptions { extern_decls: args.extern_decls };

    let mut first = true;
    for file in &args.files {
        let out = generate_file(file, opts)?;
        if out.is_empty() {
            continue;
        }
        if !first {
            println!();
        }
        print!("{}", out);
        first = false;
    }

    Ok(())
}
