//! Dump command implementation.
//!
//! Prints the compiled control tree, either as an indented outline or as
//! JSON for other tools.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;

use crate::error::DmxError;
use crate::output::{display_path, Printer};
use crate::types::{Console, Control, ControlInfo};

use super::CompileArgs;

/// Print the compiled control tree
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Console description file
    pub file: PathBuf,

    /// Emit JSON instead of an outline
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub compile: CompileArgs,
}

pub fn run(args: DumpArgs, printer: &Printer) -> miette::Result<()> {
    let console = args.compile.compiler()?.compile_file(&args.file)?;
    printer.status("Compiled", &display_path(&args.file));

    if args.json {
        let json = serde_json::to_string_pretty(&console).map_err(|e| DmxError::Io {
            path: args.file.clone(),
            message: format!("Failed to serialize control tree: {}", e),
        })?;
        println!("{}", json);
    } else {
        print!("{}", outline(&console));
    }

    Ok(())
}

/// Indented outline of a console, one control per line.
///
/// Containers are marked `=`, regulators `>`, switch options `-`.
pub fn outline(console: &Console) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} universe={} channel={}{}",
        console.info.name,
        console.universe,
        console.info.channel,
        extras(&console.info)
    );

    for visit in console.walk() {
        let indent = " ".repeat(visit.depth + 1);
        let control = visit.control;
        let marker = if control.kind().is_container() { '=' } else { '>' };
        let _ = writeln!(
            out,
            "{}{} {} [{}] channel={}{}{}",
            indent,
            marker,
            control.name(),
            control.kind().name().to_lowercase(),
            control.channel(),
            details(control),
            extras(control.info())
        );

        if let Control::Switch(switch) = control {
            for (i, option) in switch.options.iter().enumerate() {
                let active = if i + 1 == switch.active { " *" } else { "" };
                let values: Vec<String> = option.value.iter().map(u8::to_string).collect();
                let _ = writeln!(
                    out,
                    "{}  - {} value={}{}{}",
                    indent,
                    option_name(&option.info, i),
                    values.join(","),
                    active,
                    extras(&option.info)
                );
            }
        }
    }

    out
}

fn details(control: &Control) -> String {
    match control {
        Control::Panel(_) => String::new(),
        Control::Level(l) => format!(" value={}", l.value),
        Control::ColorLevel(c) => format!(" value={} color={}", c.level.value, c.color),
        Control::Switch(s) => format!(" nchannels={}", s.nchannels),
    }
}

fn extras(info: &ControlInfo) -> String {
    let mut out = String::new();
    if info.hide_name {
        out.push_str(" hidename");
    }
    if !info.comments.is_empty() {
        let _ = write!(out, " # {}", info.comment_text().replace('\n', "\\n"));
    }
    out
}

fn option_name(info: &ControlInfo, index: usize) -> String {
    if info.name.is_empty() {
        format!("#{}", index + 1)
    } else {
        info.name.clone()
    }
}
