//! Check command implementation.
//!
//! Compiles each file, runs the lint checks on the result and prints a
//! status line per file. Fails when a file does not compile or a lint
//! reports an error. With `--deny-warnings`, lint warnings fail it too.

use std::path::PathBuf;

use clap::Args;
use miette::Report;

use crate::output::{display_path, plural, Printer};
use crate::types::Console;
use crate::validation::{lint_console, Severity, ValidationResult};

use super::CompileArgs;

/// Compile console descriptions and report problems
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Console description files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat lint warnings as failures
    #[arg(long)]
    pub deny_warnings: bool,

    #[command(flatten)]
    pub compile: CompileArgs,
}

pub fn run(args: CheckArgs, printer: &Printer) -> miette::Result<()> {
    let compiler = args.compile.compiler()?;

    let mut failed = 0;
    let mut warnings = 0;

    for file in &args.files {
        let display = display_path(file);

        let console = match compiler.compile_file(file) {
            Ok(console) => console,
            Err(err) => {
                failed += 1;
                printer.error("Failed", &display);
                eprintln!("{:?}", Report::new(err));
                continue;
            }
        };

        let lint = lint_console(&console);
        warnings += lint.warning_count();
        if fails_check(&lint, args.deny_warnings) {
            failed += 1;
        }

        printer.status("Checked", &format!("{} {}", display, printer.dim(&summary(&console))));
        print_diagnostics(&lint, printer);
    }

    let checked = plural(args.files.len(), "file", "files");
    if failed > 0 {
        miette::bail!(
            "{} of {} failed ({})",
            failed,
            checked,
            plural(warnings, "warning", "warnings")
        );
    }

    printer.success(
        "Finished",
        &format!("{} ({})", checked, plural(warnings, "warning", "warnings")),
    );
    Ok(())
}

/// One-line summary: control count and used channel range.
pub fn summary(console: &Console) -> String {
    let regulators: Vec<_> = console.regulators().collect();
    let controls = plural(regulators.len(), "control", "controls");

    let first = regulators.iter().map(|c| c.channel()).min();
    let last = regulators
        .iter()
        .map(|c| c.channel() as u32 + c.footprint() as u32 - 1)
        .max();

    match (first, last) {
        (Some(first), Some(last)) => format!(
            "({}, universe {}, channels {}-{})",
            controls, console.universe, first, last
        ),
        _ => format!("({}, universe {})", controls, console.universe),
    }
}

/// Lint errors always fail a file; warnings only with `--deny-warnings`.
fn fails_check(lint: &ValidationResult, deny_warnings: bool) -> bool {
    lint.has_errors() || (deny_warnings && lint.has_warnings())
}

fn print_diagnostics(result: &ValidationResult, printer: &Printer) {
    for d in result.iter() {
        let label = printer.severity(&d.severity.to_string(), d.severity == Severity::Error);
        eprintln!("  {}[{}]: {}", label, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("    {}", printer.dim(&format!("help: {}", help)));
        }
    }
}
