//! Command-line front end for a shelf document store.

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use shelf_json_store::{JSONLocalStore, Options};

pub mod commands;
pub mod demo;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Store error: {0}")]
    Store(#[from] shelf_json_store::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

/// shelf - a file-backed JSON document store
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory of the store
    #[arg(long, env = "SHELF_ROOT", default_value = "./shelf-data")]
    pub root: PathBuf,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Write a JSON document to COLLECTION/RESOURCE
    Write {
        collection: String,
        resource: String,
        /// The document, as JSON text
        json: String,
    },
    /// Print the document stored at COLLECTION/RESOURCE
    Read { collection: String, resource: String },
    /// Print every document in COLLECTION
    ReadAll { collection: String },
    /// Delete COLLECTION/RESOURCE, or the whole collection if RESOURCE is omitted
    Delete {
        collection: String,
        resource: Option<String>,
    },
    /// Populate a `users` collection with sample records and walk through
    /// each operation
    Demo,
}

impl Args {
    /// Log filter implied by `--verbose`, used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Open the store named by `args` and run its command, printing to `out`.
pub fn run(args: &Args, out: &mut dyn io::Write) -> Result<(), CliError> {
    let store = JSONLocalStore::open(&args.root, Options::default())?;
    commands::execute(&store, &args.command, out)
}
