//! Command-line options for the demo front-end.

use clap::Parser;
use std::path::PathBuf;

/// Protocol: OMEGA - educational escape-room demo.
#[derive(Debug, Parser)]
#[command(name = "protocol_omega", version, about)]
pub struct Cli {
    /// Path to a custom room catalog (TOML). Uses the built-in game
    /// when omitted.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Skip the generative gateway and use fallback content only.
    #[arg(long)]
    pub offline: bool,
}
