//! Core domain types for dmxctrl.
//!
//! - `Colour` - RGB values and the named palette
//! - `Console`, `Control` and friends - the compiled control tree

mod colour;
mod control;

pub use colour::{Colour, PaletteEntry, PALETTE};
pub use control::{
    ColorLevel, Console, Control, ControlInfo, Icon, Level, Panel, Switch, SwitchOption, Visit,
    Walk, MAX_CHANNEL,
};
