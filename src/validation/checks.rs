//! Lint checks over a compiled console.
//!
//! Each check takes a `&Console` and returns a `ValidationResult`. None of
//! them can fail compilation; they flag documents that compile but are
//! probably not what the author meant.

use std::collections::HashMap;

use crate::types::{Console, Control, ControlInfo, MAX_CHANNEL};

use super::warning::{Diagnostic, ValidationResult};

/// Regulators whose channel ranges intersect.
///
/// Auto numbering never produces this; explicit `channel` attributes can.
pub fn check_channel_overlaps(console: &Console) -> ValidationResult {
    let mut result = ValidationResult::new();

    let mut ranges: Vec<(u32, u32, &str)> = console
        .regulators()
        .filter(|c| c.footprint() > 0)
        .map(|c| {
            let first = c.channel() as u32;
            (first, first + c.footprint() as u32 - 1, c.name())
        })
        .collect();
    ranges.sort_by_key(|&(first, _, _)| first);

    // Sweep keeping the range that reaches furthest so far
    let mut reach: Option<(u32, &str)> = None;
    for (first, last, name) in ranges {
        if let Some((end, owner)) = reach {
            if first <= end {
                result.push(
                    Diagnostic::error(
                        "dmxctrl::lint::channel-overlap",
                        format!(
                            "'{}' (channels {}..{}) overlaps '{}' (up to channel {})",
                            name, first, last, owner, end
                        ),
                    )
                    .for_control(name)
                    .with_help("Both controls will write the shared channels; move one of them"),
                );
            }
            if last <= end {
                continue;
            }
        }
        reach = Some((last, name));
    }

    result
}

/// Siblings sharing a name.
///
/// Generated names are unique, so only explicit names can collide.
pub fn check_duplicate_names(console: &Console) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_siblings(console.children.iter().map(Control::info), &mut result);
    for visit in console.walk() {
        match visit.control {
            Control::Panel(panel) => {
                check_siblings(panel.children.iter().map(Control::info), &mut result)
            }
            Control::Switch(switch) => {
                check_siblings(switch.options.iter().map(|o| &o.info), &mut result)
            }
            _ => {}
        }
    }

    result
}

fn check_siblings<'a>(siblings: impl Iterator<Item = &'a ControlInfo>, result: &mut ValidationResult) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for info in siblings.filter(|info| !info.name.is_empty()) {
        let count = seen.entry(info.name.as_str()).or_default();
        *count += 1;
        if *count == 2 {
            result.push(
                Diagnostic::warning(
                    "dmxctrl::lint::duplicate-name",
                    format!("name '{}' is used more than once in the same container", info.name),
                )
                .for_control(info.name.as_str())
                .with_help("Give each control a distinct name"),
            );
        }
    }
}

/// Regulators driving channels past the end of the universe.
///
/// Only reachable when compiled with `OverflowPolicy::Allow`.
pub fn check_channel_overflow(console: &Console) -> ValidationResult {
    let mut result = ValidationResult::new();

    for control in console.regulators() {
        let last = control.channel() as u32 + control.footprint() as u32 - 1;
        if last > MAX_CHANNEL as u32 {
            result.push(
                Diagnostic::warning(
                    "dmxctrl::lint::channel-overflow",
                    format!(
                        "'{}' needs channels {}..{} but the universe ends at {}",
                        control.name(),
                        control.channel(),
                        last,
                        MAX_CHANNEL
                    ),
                )
                .for_control(control.name())
                .with_help("Values for channels past 512 are dropped"),
            );
        }
    }

    result
}

/// Panels without any controls.
pub fn check_empty_panels(console: &Console) -> ValidationResult {
    let mut result = ValidationResult::new();

    for visit in console.walk() {
        if let Control::Panel(panel) = visit.control {
            if panel.children.is_empty() {
                result.push(
                    Diagnostic::warning(
                        "dmxctrl::lint::empty-panel",
                        format!("panel '{}' has no controls", panel.info.name),
                    )
                    .for_control(panel.info.name.as_str()),
                );
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Level, Panel};

    fn level(name: &str, channel: u16) -> Control {
        Control::Level(Level {
            info: ControlInfo {
                name: name.to_string(),
                channel,
                ..Default::default()
            },
            value: 0,
            steps: 0,
            vertical: false,
        })
    }

    fn console(children: Vec<Control>) -> Console {
        Console {
            info: ControlInfo::default(),
            universe: 1,
            vertical: false,
            children,
            source: None,
        }
    }

    #[test]
    fn test_no_overlap_for_sequential_levels() {
        let c = console(vec![level("a", 1), level("b", 2), level("c", 3)]);
        assert!(check_channel_overlaps(&c).is_ok());
    }

    #[test]
    fn test_overlap_detected() {
        let c = console(vec![level("a", 4), level("b", 1), level("c", 4)]);
        let result = check_channel_overlaps(&c);
        assert_eq!(result.error_count(), 1);
        assert!(!result.has_warnings());
        let d = result.iter().next().unwrap();
        assert_eq!(d.code, "dmxctrl::lint::channel-overlap");
        assert_eq!(d.control.as_deref(), Some("c"));
    }

    #[test]
    fn test_duplicate_names_in_same_panel() {
        let c = console(vec![
            Control::Panel(Panel {
                info: ControlInfo {
                    name: "front".to_string(),
                    ..Default::default()
                },
                vertical: false,
                children: vec![level("dim", 1), level("dim", 2), level("dim", 3)],
            }),
            level("dim", 4),
        ]);
        let result = check_duplicate_names(&c);
        // One finding for the panel; the top-level "dim" is in another container
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_overflow_warning() {
        let c = console(vec![level("edge", 512)]);
        assert!(check_channel_overflow(&c).is_ok());

        let mut wide = console(vec![]);
        wide.children.push(Control::ColorLevel(crate::types::ColorLevel {
            level: Level {
                info: ControlInfo {
                    name: "rgb".to_string(),
                    channel: 511,
                    ..Default::default()
                },
                value: 0,
                steps: 0,
                vertical: false,
            },
            color: crate::types::Colour::WHITE,
        }));
        assert_eq!(check_channel_overflow(&wide).codes(), vec!["dmxctrl::lint::channel-overflow"]);
    }

    #[test]
    fn test_empty_panel() {
        let c = console(vec![Control::Panel(Panel {
            info: ControlInfo {
                name: "spare".to_string(),
                ..Default::default()
            },
            vertical: false,
            children: vec![],
        })]);
        assert_eq!(check_empty_panels(&c).warning_count(), 1);
    }
}
