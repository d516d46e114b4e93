//! Frame command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::frame::{ChannelFrame, Preset};
use crate::output::{display_path, plural, Printer};

use super::CompileArgs;

/// Print the DMX channel frame a console produces
#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Console description file
    pub file: PathBuf,

    /// Control state to compute the frame for
    #[arg(long, value_enum, default_value_t = PresetArg::Initial)]
    pub preset: PresetArg,

    #[command(flatten)]
    pub compile: CompileArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    /// Document values
    Initial,
    /// All levels at 0, switches on their first option
    Min,
    /// All levels at 255, switches on their last option
    Max,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Initial => Preset::Initial,
            PresetArg::Min => Preset::Minimum,
            PresetArg::Max => Preset::Maximum,
        }
    }
}

pub fn run(args: FrameArgs, printer: &Printer) -> miette::Result<()> {
    let console = args.compile.compiler()?.compile_file(&args.file)?;
    let frame = ChannelFrame::from_console(&console, args.preset.into());

    printer.status(
        "Computed",
        &format!(
            "{} {}",
            display_path(&args.file),
            printer.dim(&format!(
                "(universe {}, {} set)",
                console.universe,
                plural(frame.active_channels().count(), "channel", "channels")
            ))
        ),
    );
    println!("{}", frame.dump());
    Ok(())
}
