//! Control kind definitions for the schema registry.

use std::fmt;

/// The kind of a node in a console description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Console,
    Panel,
    Level,
    ColorLevel,
    Switch,
    SwitchOption,
}

impl ControlKind {
    /// Every kind, root first.
    pub const ALL: [ControlKind; 6] = [
        ControlKind::Console,
        ControlKind::Panel,
        ControlKind::Level,
        ControlKind::ColorLevel,
        ControlKind::Switch,
        ControlKind::SwitchOption,
    ];

    /// Get the type name used in messages and generated names.
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Console => "Console",
            ControlKind::Panel => "Panel",
            ControlKind::Level => "Level",
            ControlKind::ColorLevel => "ColorLevel",
            ControlKind::Switch => "Switch",
            ControlKind::SwitchOption => "SwitchOption",
        }
    }

    /// Containers group other controls and never drive channels themselves.
    pub fn is_container(&self) -> bool {
        matches!(self, ControlKind::Console | ControlKind::Panel)
    }

    /// Regulators drive one or more channels and advance the channel counter.
    pub fn consumes_channels(&self) -> bool {
        matches!(
            self,
            ControlKind::Level | ControlKind::ColorLevel | ControlKind::Switch
        )
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How many channels a kind occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footprint {
    /// Containers and options.
    None,
    /// A constant number of channels.
    Fixed(u16),
    /// Taken from the node's own `nchannels` attribute.
    PerNode,
}
