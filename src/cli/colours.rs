use clap::Args;

use crate::output::{plural, Printer};
use crate::types::PALETTE;

/// List the named colour palette
#[derive(Args, Debug)]
pub struct ColoursArgs {
    /// Only print names and hex values
    #[arg(long, short)]
    pub short: bool,
}

pub fn run(args: ColoursArgs, printer: &Printer) -> miette::Result<()> {
    printer.info("Palette", &plural(PALETTE.len(), "colour", "colours"));

    for (name, entry) in PALETTE {
        let colour = entry.colour();
        if args.short {
            println!("{} {}", name, colour);
        } else {
            println!(
                "{:<8} {}  {:>3} {:>3} {:>3}",
                name, colour, colour.r, colour.g, colour.b
            );
        }
    }

    Ok(())
}
