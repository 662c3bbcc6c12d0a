pub mod commands;
pub mod context;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::app_config::InputMode;
use crate::core::models::object_attrs::Generation;

/// Client-side OpenPGP encryption for objects in versioned cloud storage.
#[derive(Parser, Debug)]
#[command(name = "tresor", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to alternative config file (default: ~/.tresor.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt and upload an object
    Put {
        /// Object key in the bucket
        key: String,
        /// File to read the plaintext from
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Where the plaintext comes from (default: from config)
        #[arg(long, value_enum)]
        input: Option<InputMode>,
        /// Store as ASCII armor instead of binary
        #[arg(long)]
        armor: bool,
        /// Encrypt for the first key in this file instead of the configured identity
        #[arg(long, value_name = "PATH")]
        recipient_key: Option<PathBuf>,
    },

    /// Download and decrypt an object
    Get {
        /// Object key in the bucket
        key: String,
        /// Write the plaintext to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Read this generation instead of the latest
        #[arg(long = "version", value_name = "GENERATION")]
        generation: Option<Generation>,
    },

    /// Copy an object together with its metadata
    Cp {
        source: String,
        destination: String,
    },

    /// Move an object together with its metadata
    Mv {
        source: String,
        destination: String,
    },

    /// Remove an object
    Rm {
        key: String,
    },

    /// Show object attributes and encryption metadata
    Info {
        key: String,
    },

    /// List objects, newest generation first
    Ls {
        /// Only keys starting with this prefix
        prefix: Option<String>,
        /// Include every stored generation
        #[arg(long)]
        versions: bool,
    },

    /// Show objects as a tree of path segments
    Tree {
        /// Only keys starting with this prefix
        prefix: Option<String>,
    },
}
