pub mod check;
pub mod colours;
pub mod completions;
pub mod dump;
pub mod frame;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::parser::{Compiler, OverflowPolicy};

/// dmxctrl - DMX-512 console description compiler
#[derive(Parser, Debug)]
#[command(name = "dmxctrl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile console descriptions and report problems
    Check(check::CheckArgs),

    /// Print the compiled control tree
    Dump(dump::DumpArgs),

    /// Print the DMX channel frame a console produces
    Frame(frame::FrameArgs),

    /// List the named colour palette
    Colours(colours::ColoursArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Compiler settings shared by the commands that read documents.
#[derive(Args, Debug, Clone, Default)]
pub struct CompileArgs {
    /// Config file (default: ./dmxctrl.yaml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Accept controls whose channels run past 512
    #[arg(long)]
    pub allow_overflow: bool,

    /// Do not require icon files to exist
    #[arg(long)]
    pub skip_icon_check: bool,

    /// Universe for documents that do not set one
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub universe: Option<u32>,
}

impl CompileArgs {
    /// Build a compiler from the config file with command-line overrides applied.
    pub fn compiler(&self) -> Result<Compiler> {
        let config = Config::discover(self.config.as_deref(), Path::new("."))?;
        let mut options = config.compile_options();

        if self.allow_overflow {
            options.channel_overflow = OverflowPolicy::Allow;
        }
        if self.skip_icon_check {
            options.check_icons = false;
        }
        if let Some(universe) = self.universe {
            options.default_universe = universe;
        }

        tracing::debug!(?options, "compile options");
        Ok(Compiler::new().with_options(options))
    }
}
