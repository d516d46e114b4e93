//! Static schema for console description nodes.
//!
//! One [`KindSchema`] per [`ControlKind`] says where the kind's tag may appear,
//! which attributes it requires or accepts, how many channels it occupies and
//! how it takes part in channel numbering and default naming. The builder
//! consults this table before any attribute value is parsed.
//!
//! # Example
//!
//! ```
//! use dmxctrl::registry::{schema_for_tag, ControlKind};
//!
//! let schema = schema_for_tag("colorlevel").unwrap();
//! assert_eq!(schema.kind, ControlKind::ColorLevel);
//! assert!(schema.accepts("color"));
//! assert!(!schema.accepts("active"));
//! ```

pub mod types;

pub use types::{ControlKind, Footprint};

/// Tag of the document root.
pub const ROOT_TAG: &str = "dmxcontrols";

/// Structural line-break marker; allowed anywhere below the root.
pub const LINE_BREAK_TAG: &str = "br";

/// Schema entry for one node kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSchema {
    pub kind: ControlKind,
    pub tag: &'static str,
    /// Tags this kind may appear under; empty for the root.
    pub parents: &'static [&'static str],
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub footprint: Footprint,
    /// Copies the parent's channel instead of taking the running counter.
    pub inherits_channel: bool,
    /// Prefix for generated `"{prefix} #{n}"` names; `None` keeps names empty.
    pub default_name: Option<&'static str>,
}

const CONTAINER_PARENTS: &[&str] = &[ROOT_TAG, "panel"];

static SCHEMAS: [KindSchema; 6] = [
    KindSchema {
        kind: ControlKind::Console,
        tag: ROOT_TAG,
        parents: &[],
        required: &[],
        optional: &[
            "name", "icon", "hidename", "channel", "universe", "vertical", "expand",
        ],
        footprint: Footprint::None,
        inherits_channel: false,
        default_name: Some("Console"),
    },
    KindSchema {
        kind: ControlKind::Panel,
        tag: "panel",
        parents: CONTAINER_PARENTS,
        required: &[],
        optional: &["name", "icon", "hidename", "channel", "vertical", "expand"],
        footprint: Footprint::None,
        inherits_channel: false,
        default_name: Some("Panel"),
    },
    KindSchema {
        kind: ControlKind::Level,
        tag: "level",
        parents: CONTAINER_PARENTS,
        required: &[],
        optional: &[
            "name", "icon", "hidename", "channel", "value", "steps", "vertical", "expand",
        ],
        footprint: Footprint::Fixed(1),
        inherits_channel: false,
        default_name: Some("Level"),
    },
    KindSchema {
        kind: ControlKind::ColorLevel,
        tag: "colorlevel",
        parents: CONTAINER_PARENTS,
        required: &[],
        optional: &[
            "name", "icon", "hidename", "channel", "value", "steps", "vertical", "expand",
            "color",
        ],
        footprint: Footprint::Fixed(3),
        inherits_channel: false,
        default_name: Some("ColorLevel"),
    },
    KindSchema {
        kind: ControlKind::Switch,
        tag: "switch",
        parents: CONTAINER_PARENTS,
        required: &[],
        optional: &[
            "name", "icon", "hidename", "channel", "vertical", "active", "nchannels", "bpl",
            "expand",
        ],
        footprint: Footprint::PerNode,
        inherits_channel: false,
        default_name: Some("Switch"),
    },
    KindSchema {
        kind: ControlKind::SwitchOption,
        tag: "option",
        parents: &["switch"],
        required: &["value"],
        optional: &["name", "icon", "hidename", "channel", "expand"],
        footprint: Footprint::None,
        inherits_channel: true,
        default_name: None,
    },
];

impl KindSchema {
    /// Whether `attr` is declared (required or optional) for this kind.
    pub fn accepts(&self, attr: &str) -> bool {
        self.required.contains(&attr) || self.optional.contains(&attr)
    }

    /// Whether this kind may appear directly under `parent_tag`.
    pub fn allows_parent(&self, parent_tag: &str) -> bool {
        self.parents.contains(&parent_tag)
    }

    /// Human-readable parent list: `"a"`, `"a" or "b"`, `"a", "b" or "c"`.
    pub fn parents_phrase(&self) -> String {
        let quoted: Vec<String> = self.parents.iter().map(|p| format!("\"{}\"", p)).collect();
        match quoted.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}

/// Schema entry for a kind.
pub fn schema(kind: ControlKind) -> &'static KindSchema {
    match kind {
        ControlKind::Console => &SCHEMAS[0],
        ControlKind::Panel => &SCHEMAS[1],
        ControlKind::Level => &SCHEMAS[2],
        ControlKind::ColorLevel => &SCHEMAS[3],
        ControlKind::Switch => &SCHEMAS[4],
        ControlKind::SwitchOption => &SCHEMAS[5],
    }
}

/// Schema entry for a child tag. The root tag is not a child tag.
pub fn schema_for_tag(tag: &str) -> Option<&'static KindSchema> {
    SCHEMAS
        .iter()
        .find(|schema| schema.tag == tag && schema.kind != ControlKind::Console)
}

/// All schema entries, root first.
pub fn schemas() -> &'static [KindSchema] {
    &SCHEMAS
}
