// cli.rs — Command-line interface definitions (clap derive)
//
// Defines the top-level `xsig-interop` command:
//   xsig-interop bundles list      — discover bundles and their test cases
//   xsig-interop bundles inspect   — show validation contexts of one bundle
//   xsig-interop config default    — print the default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xsig-interop")]
#[command(about = "Signature verification fixture discovery and inspection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verification bundle commands
    Bundles {
        #[command(subcommand)]
        action: BundlesAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum BundlesAction {
    /// Discover every bundle under a fixture root and list its test cases
    List {
        /// Fixture root containing one directory per bundle
        #[arg(long, default_value = "tests/fixtures/verification")]
        root: PathBuf,

        /// Path to a harness configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit a JSON discovery report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load a single bundle and print the validation context of each case
    Inspect {
        /// Path to the bundle directory
        #[arg(long)]
        bundle: PathBuf,

        /// Path to a harness configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the default configuration as JSON
    Default,
}
