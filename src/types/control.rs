//! The compiled control tree.
//!
//! A [`Console`] owns its top-level controls, panels own their children and
//! switches own their options. Everything here is produced by the compiler
//! and read-only afterwards; channels are always resolved.

use std::path::PathBuf;

use serde::Serialize;

use super::colour::Colour;
use crate::registry::ControlKind;

/// Highest DMX-512 channel number.
pub const MAX_CHANNEL: u16 = 512;

/// Icon attached to a named control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Icon {
    /// Internal swatch icon, named after a palette colour (`!red`).
    Internal(String),
    /// Image file, already resolved against the document directory for `@` paths.
    File(PathBuf),
}

/// Fields shared by every named control.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ControlInfo {
    pub name: String,
    pub icon: Option<Icon>,
    pub hide_name: bool,
    pub expand: bool,
    pub channel: u16,
    pub comments: Vec<String>,
}

impl ControlInfo {
    /// Comment fragments joined with spaces, as shown in tooltips.
    pub fn comment_text(&self) -> String {
        self.comments.join(" ")
    }
}

/// The root of a compiled console description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Console {
    #[serde(flatten)]
    pub info: ControlInfo,
    pub universe: u32,
    pub vertical: bool,
    pub children: Vec<Control>,
    /// Path of the source document, when compiled from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// A control below the console root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Control {
    Panel(Panel),
    Level(Level),
    #[serde(rename = "colorlevel")]
    ColorLevel(ColorLevel),
    Switch(Switch),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    #[serde(flatten)]
    pub info: ControlInfo,
    pub vertical: bool,
    pub children: Vec<Control>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    #[serde(flatten)]
    pub info: ControlInfo,
    /// Initial slider position, 0-255.
    pub value: u8,
    /// Number of detents, 0 for a continuous slider.
    pub steps: u8,
    pub vertical: bool,
}

/// A level driving three consecutive channels with a scaled colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorLevel {
    #[serde(flatten)]
    pub level: Level,
    pub color: Colour,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Switch {
    #[serde(flatten)]
    pub info: ControlInfo,
    /// 1-based index of the initially selected option.
    pub active: usize,
    pub nchannels: u16,
    /// Buttons per line; `None` lays all options out on one line.
    pub buttons_per_line: Option<u32>,
    pub vertical: bool,
    pub options: Vec<SwitchOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchOption {
    #[serde(flatten)]
    pub info: ControlInfo,
    /// One value per switch channel.
    pub value: Vec<u8>,
}

impl Console {
    /// Walk every control depth-first in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(None, self.children.iter())],
        }
    }

    /// Channel-consuming controls in document order.
    pub fn regulators(&self) -> impl Iterator<Item = &Control> {
        self.walk()
            .map(|visit| visit.control)
            .filter(|control| control.kind().consumes_channels())
    }

    /// Find the first control with the given name.
    pub fn find(&self, name: &str) -> Option<&Control> {
        self.walk()
            .map(|visit| visit.control)
            .find(|control| control.info().name == name)
    }

    pub fn comment_text(&self) -> String {
        self.info.comment_text()
    }
}

impl Control {
    pub fn kind(&self) -> ControlKind {
        match self {
            Control::Panel(_) => ControlKind::Panel,
            Control::Level(_) => ControlKind::Level,
            Control::ColorLevel(_) => ControlKind::ColorLevel,
            Control::Switch(_) => ControlKind::Switch,
        }
    }

    pub fn info(&self) -> &ControlInfo {
        match self {
            Control::Panel(p) => &p.info,
            Control::Level(l) => &l.info,
            Control::ColorLevel(c) => &c.level.info,
            Control::Switch(s) => &s.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn channel(&self) -> u16 {
        self.info().channel
    }

    /// Number of consecutive channels this control drives.
    pub fn footprint(&self) -> u16 {
        match self {
            Control::Panel(_) => 0,
            Control::Level(_) => 1,
            Control::ColorLevel(_) => 3,
            Control::Switch(s) => s.nchannels,
        }
    }

    /// Child controls; empty for everything but panels.
    pub fn children(&self) -> &[Control] {
        match self {
            Control::Panel(p) => &p.children,
            _ => &[],
        }
    }
}

impl Switch {
    /// The option selected when the console loads.
    pub fn active_option(&self) -> Option<&SwitchOption> {
        self.active.checked_sub(1).and_then(|i| self.options.get(i))
    }
}

/// One step of a [`Walk`].
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    /// 0 for top-level controls.
    pub depth: usize,
    /// Enclosing panel; `None` directly under the console.
    pub parent: Option<&'a Control>,
    pub control: &'a Control,
}

/// Depth-first iterator over a console's controls, in document order.
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<(Option<&'a Control>, std::slice::Iter<'a, Control>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let (parent, iter) = self.stack.last_mut()?;
            let parent = *parent;
            match iter.next() {
                Some(control) => {
                    let children = control.children();
                    if !children.is_empty() {
                        self.stack.push((Some(control), children.iter()));
                    }
                    return Some(Visit {
                        depth,
                        parent,
                        control,
                    });
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, channel: u16) -> ControlInfo {
        ControlInfo {
            name: name.to_string(),
            channel,
            ..Default::default()
        }
    }

    fn level(name: &str, channel: u16) -> Control {
        Control::Level(Level {
            info: info(name, channel),
            value: 0,
            steps: 0,
            vertical: false,
        })
    }

    fn sample() -> Console {
        Console {
            info: info("desk", 1),
            universe: 1,
            vertical: false,
            source: None,
            children: vec![
                Control::Panel(Panel {
                    info: info("front", 1),
                    vertical: false,
                    children: vec![level("a", 1), level("b", 2)],
                }),
                level("c", 3),
            ],
        }
    }

    #[test]
    fn test_walk_is_depth_first() {
        let console = sample();
        let visited: Vec<(usize, &str)> = console
            .walk()
            .map(|visit| (visit.depth, visit.control.name()))
            .collect();

        assert_eq!(visited, vec![(0, "front"), (1, "a"), (1, "b"), (0, "c")]);
    }

    #[test]
    fn test_walk_reports_parent() {
        let console = sample();
        let parents: Vec<Option<&str>> = console
            .walk()
            .map(|visit| visit.parent.map(|p| p.name()))
            .collect();

        assert_eq!(parents, vec![None, Some("front"), Some("front"), None]);
    }

    #[test]
    fn test_regulators_skip_containers() {
        let console = sample();
        let names: Vec<&str> = console.regulators().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_find() {
        let console = sample();
        assert_eq!(console.find("b").map(|c| c.channel()), Some(2));
        assert!(console.find("zzz").is_none());
    }

    #[test]
    fn test_comment_text() {
        let mut i = info("x", 1);
        i.comments = vec!["Front".to_string(), "wash".to_string()];
        assert_eq!(i.comment_text(), "Front wash");
    }

    #[test]
    fn test_active_option() {
        let option = |v: u8| SwitchOption {
            info: info("", 4),
            value: vec![v],
        };
        let switch = Switch {
            info: info("gobo", 4),
            active: 2,
            nchannels: 1,
            buttons_per_line: None,
            vertical: false,
            options: vec![option(0), option(64)],
        };
        assert_eq!(switch.active_option().map(|o| o.value.clone()), Some(vec![64]));
    }
}
