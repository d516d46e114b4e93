//! Checks on compiled controls.
//!
//! Two layers:
//! - [`validate_node`] runs while the tree is built, on each element end, and
//!   fails compilation. Only switches carry constraints here.
//! - [`lint_console`] runs on a finished console and only reports warnings.
//!   Used by `dmxctrl check`.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::error::{DmxError, Result};
use crate::types::{Console, Control, Switch};

/// Post-build check for one control. A no-op for every kind but switches.
pub fn validate_node(control: &Control) -> Result<()> {
    match control {
        Control::Switch(switch) => validate_switch(switch),
        Control::Panel(_) | Control::Level(_) | Control::ColorLevel(_) => Ok(()),
    }
}

/// A switch needs one value per channel in each option, at least two
/// options, and an `active` index that points at one of them. Arity is
/// checked first so a lone malformed option reports its values.
pub fn validate_switch(switch: &Switch) -> Result<()> {
    let name = &switch.info.name;
    let count = switch.options.len();

    for (i, option) in switch.options.iter().enumerate() {
        if option.value.len() != switch.nchannels as usize {
            return Err(DmxError::value(format!(
                "option {} of switch \"{}\" has {} value(s), expected {} (nchannels)",
                i + 1,
                name,
                option.value.len(),
                switch.nchannels
            ))
            .with_help("Give every option exactly one value per switch channel"));
        }
    }

    if count < 2 {
        return Err(DmxError::value(format!(
            "switch \"{}\" must have at least 2 options, got {}",
            name, count
        ))
        .with_help("Add <option value=\"...\"/> children to the switch"));
    }

    if switch.active == 0 || switch.active > count {
        return Err(DmxError::value(format!(
            "active option {} of switch \"{}\" is out of range 1..{}",
            switch.active, name, count
        )));
    }

    Ok(())
}

/// Run all lint checks against a compiled console.
pub fn lint_console(console: &Console) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_channel_overlaps(console));
    result.merge(checks::check_duplicate_names(console));
    result.merge(checks::check_channel_overflow(console));
    result.merge(checks::check_empty_panels(console));

    tracing::debug!(
        warnings = result.warning_count(),
        errors = result.error_count(),
        "lint finished"
    );
    result
}
