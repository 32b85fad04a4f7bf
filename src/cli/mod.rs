// src/cli/mod.rs
//! CLI definitions for godeb
//!
//! The command implementations live in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "godeb")]
#[command(version)]
#[command(about = "Build and install Debian packages from upstream Go release tarballs", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Target architecture in upstream naming (amd64, 386, arm64, ...)
    #[arg(long, global = true, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available Go versions, newest first
    List,

    /// Build a package for a Go version and leave it in the output directory
    Download {
        /// Upstream version (default: newest)
        version: Option<String>,
    },

    /// Build and install a package for a Go version
    Install {
        /// Upstream version (default: newest)
        version: Option<String>,
    },

    /// Remove the installed go package
    Remove,

    /// Build a package from a local upstream tarball
    #[command(name = "fromtarball")]
    FromTarball {
        /// Path to a go<version>.linux-<arch>.tar.gz file
        tarball: PathBuf,

        /// Upstream version contained in the tarball
        version: String,

        /// Only build the package, do not install it
        #[arg(long)]
        no_install: bool,
    },
}
