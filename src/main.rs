//! ABA Direct Entry encoder CLI
//!
//! Reads a batch header CSV and a transactions CSV, validates them and
//! writes the ABA file to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- header.csv transactions.csv > payments.aba
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use aba_direct_entry::{read_batch, AbaError, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let AbaError::Invalid(errors) = &e {
            for error in errors.iter() {
                eprintln!("  {}", error);
            }
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(AbaError::MissingArgument);
    }

    let header = BufReader::new(File::open(&args[1])?);
    let transactions = BufReader::new(File::open(&args[2])?);

    let batch = read_batch(header, transactions)?;
    let output = batch.render()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(output.as_bytes())?;
    handle.flush()?;

    Ok(())
}
