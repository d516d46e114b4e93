//! dmxctrl - DMX-512 lighting console description compiler
//!
//! Compiles `dmxcontrols` markup documents (panels, levels, colour levels,
//! switches) into a validated control tree with every DMX channel resolved,
//! and computes the channel frames such a console sends.

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod output;
pub mod parser;
pub mod registry;
pub mod types;
pub mod validation;

pub use config::Config;
pub use error::{CompileError, DmxError, Result};
pub use frame::{ChannelFrame, Preset};
pub use parser::{parse, parse_file, CompileOptions, Compiler, Location, OverflowPolicy};
pub use registry::{ControlKind, KindSchema};
pub use types::{
    ColorLevel, Colour, Console, Control, ControlInfo, Icon, Level, Panel, Switch, SwitchOption,
    MAX_CHANNEL,
};
pub use validation::{lint_console, validate_node, Diagnostic, Severity, ValidationResult};
