//! Stream-driven tree builder.
//!
//! A stack machine fed with start/text/end events. Each open element has a
//! frame; frames of schema kinds hold the node under construction. Nodes are
//! finished (validated, named) when their element closes and are then moved
//! into the parent frame's node, so the tree is assembled bottom-up while
//! channels are still assigned in document order on element start.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{DmxError, Result};
use crate::registry::{
    self, schema, schema_for_tag, ControlKind, Footprint, KindSchema, LINE_BREAK_TAG, ROOT_TAG,
};
use crate::types::{
    ColorLevel, Colour, Console, Control, ControlInfo, Level, Panel, Switch, SwitchOption,
    MAX_CHANNEL,
};
use crate::validation::validate_node;

use super::attrs::{to_bool, to_int, to_int_strict, to_rgb, to_value_list};
use super::channels::{ChannelAllocator, ChannelRequest};
use super::icon::resolve_icon;
use super::CompileOptions;

/// A node under construction.
#[derive(Debug)]
enum Node {
    Console(Console),
    Panel(Panel),
    Level(Level),
    ColorLevel(ColorLevel),
    Switch(Switch),
    Option(SwitchOption),
}

#[derive(Debug)]
struct Frame {
    tag: String,
    /// `None` for line breaks.
    node: Option<Node>,
}

/// Per-document settings the attribute setters need.
struct AttrContext<'a> {
    base_dir: &'a Path,
    check_icons: bool,
    default_universe: u32,
}

pub(crate) struct TreeBuilder<'a> {
    ctx: AttrContext<'a>,
    stack: Vec<Frame>,
    allocator: ChannelAllocator,
    name_counts: HashMap<ControlKind, usize>,
    /// Text seen before the root element opened.
    pending_comments: Vec<String>,
    result: Option<Console>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(options: &CompileOptions, base_dir: &'a Path) -> Self {
        Self {
            ctx: AttrContext {
                base_dir,
                check_icons: options.check_icons,
                default_universe: options.default_universe,
            },
            stack: Vec::new(),
            allocator: ChannelAllocator::new(options.channel_overflow),
            name_counts: HashMap::new(),
            pending_comments: Vec::new(),
            result: None,
        }
    }

    /// Tags of the currently open elements, outermost first.
    pub fn open_tags(&self) -> Vec<String> {
        self.stack.iter().map(|f| f.tag.clone()).collect()
    }

    pub fn start_element(&mut self, tag: &str, attributes: &[(String, String)]) -> Result<()> {
        self.stack.push(Frame {
            tag: tag.to_string(),
            node: None,
        });

        if self.stack.len() == 1 {
            return self.start_root(tag, attributes);
        }

        if tag == LINE_BREAK_TAG {
            if let Some((name, _)) = attributes.first() {
                return Err(DmxError::structure(format!(
                    "unsupported parameter(s) - \"{}\"",
                    name
                ))
                .with_help("<br> takes no attributes"));
            }
            if let Some(node) = self.nearest_node_mut() {
                node.info_mut().comments.push("\n".to_string());
            }
            return Ok(());
        }

        let schema = schema_for_tag(tag).ok_or_else(|| {
            DmxError::structure(format!("unsupported tag \"{}\"", tag)).with_help(format!(
                "Known tags: {}",
                registry::schemas()
                    .iter()
                    .map(|s| s.tag)
                    .chain([LINE_BREAK_TAG])
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        let parent_tag = &self.stack[self.stack.len() - 2].tag;
        if !schema.allows_parent(parent_tag) {
            return Err(DmxError::structure(format!(
                "\"{}\" must be child of {}",
                tag,
                schema.parents_phrase()
            )));
        }

        let node = Node::new(schema.kind, self.ctx.default_universe);
        self.accept(node, schema, attributes)
    }

    fn start_root(&mut self, tag: &str, attributes: &[(String, String)]) -> Result<()> {
        if self.result.is_some() {
            return Err(DmxError::Malformed {
                message: format!("unexpected <{}> after the root element", tag),
            });
        }
        if tag != ROOT_TAG {
            return Err(DmxError::structure(format!(
                "root tag must be \"{}\", found \"{}\"",
                ROOT_TAG, tag
            ))
            .with_help("This does not look like a console description"));
        }

        let mut node = Node::new(ControlKind::Console, self.ctx.default_universe);
        node.info_mut().comments = std::mem::take(&mut self.pending_comments);
        self.accept(node, schema(ControlKind::Console), attributes)
    }

    /// Apply attributes, assign the channel and park the node on the top frame.
    fn accept(
        &mut self,
        mut node: Node,
        schema: &KindSchema,
        attributes: &[(String, String)],
    ) -> Result<()> {
        let undeclared: Vec<String> = attributes
            .iter()
            .filter(|(name, _)| !schema.accepts(name))
            .map(|(name, _)| format!("\"{}\"", name))
            .collect();
        if !undeclared.is_empty() {
            return Err(DmxError::structure(format!(
                "unsupported parameter(s) - {}",
                undeclared.join(", ")
            ))
            .with_help(format!(
                "<{}> accepts: {}",
                schema.tag,
                schema
                    .required
                    .iter()
                    .chain(schema.optional)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let lookup = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let mut explicit_channel = None;
        for &name in schema.required {
            let value = lookup(name).ok_or_else(|| {
                DmxError::value(format!("required parameter \"{}\" is missing", name))
            })?;
            node.apply(name, value, &self.ctx)?;
        }
        for &name in schema.optional {
            let Some(value) = lookup(name) else {
                continue;
            };
            if name == "channel" {
                explicit_channel = to_int(name, value, true, Some(1), Some(MAX_CHANNEL as i64))?
                    .map(|n| n as u16);
            } else {
                node.apply(name, value, &self.ctx)?;
            }
        }

        let inherited = if schema.inherits_channel {
            self.parent_node().map(|parent| parent.info().channel)
        } else {
            None
        };
        let footprint = match schema.footprint {
            Footprint::None => 0,
            Footprint::Fixed(n) => n,
            Footprint::PerNode => node.nchannels(),
        };
        let channel = self.allocator.assign(ChannelRequest {
            explicit: explicit_channel,
            inherited,
            footprint,
            consumes: schema.kind.consumes_channels(),
        })?;
        node.info_mut().channel = channel;

        tracing::trace!(tag = schema.tag, channel, footprint, "element accepted");

        if let Some(frame) = self.stack.last_mut() {
            frame.node = Some(node);
        }
        Ok(())
    }

    /// Text goes to the node of the innermost open element. Text in a frame
    /// without a node (`<br>`, or outside the root) is document text and
    /// ends up on the root.
    pub fn characters(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let text = text.to_string();
        match self.stack.last_mut().and_then(|f| f.node.as_mut()) {
            Some(node) => node.info_mut().comments.push(text),
            None => self.document_comments_mut().push(text),
        }
        Ok(())
    }

    pub fn end_element(&mut self, tag: &str) -> Result<()> {
        let Some(frame) = self.stack.last_mut() else {
            return Err(DmxError::Malformed {
                message: format!("unexpected closing tag </{}>", tag),
            });
        };
        if frame.tag != tag {
            return Err(DmxError::Malformed {
                message: format!("expected </{}>, found </{}>", frame.tag, tag),
            });
        }

        // Finish the node while its frame is still open so errors report it
        let finished = match frame.node.take() {
            Some(mut node) => {
                let kind = node.kind();
                if node.info().name.is_empty() {
                    if let Some(prefix) = schema(kind).default_name {
                        let n = self.name_counts.entry(kind).or_default();
                        *n += 1;
                        node.info_mut().name = format!("{} #{}", prefix, n);
                    }
                }
                let node = node.finish()?;
                tracing::trace!(kind = %kind, name = %node.name(), "element finished");
                Some(node)
            }
            None => None,
        };

        self.stack.pop();

        match finished {
            None => Ok(()),
            Some(Finished::Console(console)) => {
                self.result = Some(console);
                Ok(())
            }
            Some(child) => match self.stack.last_mut().and_then(|f| f.node.as_mut()) {
                Some(parent) => parent.attach(child),
                None => Err(DmxError::structure(format!(
                    "<{}> has no enclosing control",
                    tag
                ))),
            },
        }
    }

    /// The compiled console once the root has closed.
    pub fn finish(self) -> Result<Console> {
        if let Some(frame) = self.stack.last() {
            return Err(DmxError::Malformed {
                message: format!("unexpected end of document, <{}> is not closed", frame.tag),
            });
        }
        let console = self.result.ok_or_else(|| DmxError::Malformed {
            message: "document has no root element".to_string(),
        })?;

        tracing::debug!(
            name = %console.info.name,
            controls = console.walk().count(),
            next_channel = self.allocator.next_channel(),
            "console compiled"
        );
        Ok(console)
    }

    /// Comments of the root, wherever it currently lives.
    fn document_comments_mut(&mut self) -> &mut Vec<String> {
        if let Some(console) = self.result.as_mut() {
            return &mut console.info.comments;
        }
        match self.stack.first_mut().and_then(|f| f.node.as_mut()) {
            Some(root) => &mut root.info_mut().comments,
            None => &mut self.pending_comments,
        }
    }

    fn nearest_node_mut(&mut self) -> Option<&mut Node> {
        self.stack.iter_mut().rev().find_map(|f| f.node.as_mut())
    }

    /// Node of the frame below the top one.
    fn parent_node(&self) -> Option<&Node> {
        let len = self.stack.len();
        self.stack.get(len.checked_sub(2)?)?.node.as_ref()
    }
}

/// A node after its element closed.
enum Finished {
    Console(Console),
    Control(Control),
    Option(SwitchOption),
}

impl Finished {
    fn name(&self) -> &str {
        match self {
            Finished::Console(c) => &c.info.name,
            Finished::Control(c) => c.name(),
            Finished::Option(o) => &o.info.name,
        }
    }
}

impl Node {
    fn new(kind: ControlKind, default_universe: u32) -> Self {
        let info = ControlInfo::default();
        match kind {
            ControlKind::Console => Node::Console(Console {
                info,
                universe: default_universe,
                vertical: false,
                children: Vec::new(),
                source: None,
            }),
            ControlKind::Panel => Node::Panel(Panel {
                info,
                vertical: false,
                children: Vec::new(),
            }),
            ControlKind::Level => Node::Level(new_level(info)),
            ControlKind::ColorLevel => Node::ColorLevel(ColorLevel {
                level: new_level(info),
                color: Colour::WHITE,
            }),
            ControlKind::Switch => Node::Switch(Switch {
                info,
                active: 1,
                nchannels: 1,
                buttons_per_line: None,
                vertical: false,
                options: Vec::new(),
            }),
            ControlKind::SwitchOption => Node::Option(SwitchOption {
                info,
                value: Vec::new(),
            }),
        }
    }

    fn kind(&self) -> ControlKind {
        match self {
            Node::Console(_) => ControlKind::Console,
            Node::Panel(_) => ControlKind::Panel,
            Node::Level(_) => ControlKind::Level,
            Node::ColorLevel(_) => ControlKind::ColorLevel,
            Node::Switch(_) => ControlKind::Switch,
            Node::Option(_) => ControlKind::SwitchOption,
        }
    }

    fn info(&self) -> &ControlInfo {
        match self {
            Node::Console(c) => &c.info,
            Node::Panel(p) => &p.info,
            Node::Level(l) => &l.info,
            Node::ColorLevel(c) => &c.level.info,
            Node::Switch(s) => &s.info,
            Node::Option(o) => &o.info,
        }
    }

    fn info_mut(&mut self) -> &mut ControlInfo {
        match self {
            Node::Console(c) => &mut c.info,
            Node::Panel(p) => &mut p.info,
            Node::Level(l) => &mut l.info,
            Node::ColorLevel(c) => &mut c.level.info,
            Node::Switch(s) => &mut s.info,
            Node::Option(o) => &mut o.info,
        }
    }

    fn nchannels(&self) -> u16 {
        match self {
            Node::Switch(s) => s.nchannels,
            _ => 0,
        }
    }

    /// Set one attribute. The caller has already checked it against the schema.
    fn apply(&mut self, attr: &str, value: &str, ctx: &AttrContext<'_>) -> Result<()> {
        match attr {
            "name" => self.info_mut().name = value.to_string(),
            "icon" => {
                self.info_mut().icon = Some(resolve_icon(value, ctx.base_dir, ctx.check_icons)?)
            }
            "hidename" => self.info_mut().hide_name = to_bool(attr, value)?,
            "expand" => self.info_mut().expand = to_bool(attr, value)?,
            _ => self.apply_specific(attr, value, ctx)?,
        }
        Ok(())
    }

    fn apply_specific(&mut self, attr: &str, value: &str, ctx: &AttrContext<'_>) -> Result<()> {
        match (self, attr) {
            (Node::Console(c), "universe") => {
                c.universe = to_int(attr, value, true, Some(1), Some(u32::MAX as i64))?
                    .map(|n| n as u32)
                    .unwrap_or(ctx.default_universe)
            }
            (Node::Console(c), "vertical") => c.vertical = to_bool(attr, value)?,
            (Node::Panel(p), "vertical") => p.vertical = to_bool(attr, value)?,
            (Node::Level(l), _) => apply_level(l, attr, value)?,
            (Node::ColorLevel(c), "color") => c.color = to_rgb(attr, value)?,
            (Node::ColorLevel(c), _) => apply_level(&mut c.level, attr, value)?,
            (Node::Switch(s), "vertical") => s.vertical = to_bool(attr, value)?,
            (Node::Switch(s), "active") => {
                s.active = to_int_strict(attr, value, Some(1), None)? as usize
            }
            (Node::Switch(s), "nchannels") => {
                s.nchannels = to_int_strict(attr, value, Some(1), Some(MAX_CHANNEL as i64))? as u16
            }
            (Node::Switch(s), "bpl") => {
                let n = to_int_strict(attr, value, None, Some(u32::MAX as i64))?;
                s.buttons_per_line = (n > 0).then_some(n as u32);
            }
            (Node::Option(o), "value") => o.value = to_value_list(attr, value)?,
            (node, attr) => {
                return Err(DmxError::structure(format!(
                    "unsupported parameter \"{}\" for {}",
                    attr,
                    node.kind()
                )))
            }
        }
        Ok(())
    }

    /// Run the post-build check and unwrap into the public tree type.
    fn finish(self) -> Result<Finished> {
        let control = match self {
            Node::Console(c) => return Ok(Finished::Console(c)),
            Node::Option(o) => return Ok(Finished::Option(o)),
            Node::Panel(p) => Control::Panel(p),
            Node::Level(l) => Control::Level(l),
            Node::ColorLevel(c) => Control::ColorLevel(c),
            Node::Switch(s) => Control::Switch(s),
        };
        validate_node(&control)?;
        Ok(Finished::Control(control))
    }

    fn attach(&mut self, child: Finished) -> Result<()> {
        match (self, child) {
            (Node::Console(c), Finished::Control(control)) => c.children.push(control),
            (Node::Panel(p), Finished::Control(control)) => p.children.push(control),
            (Node::Switch(s), Finished::Option(option)) => s.options.push(option),
            (parent, child) => {
                return Err(DmxError::structure(format!(
                    "\"{}\" cannot hold \"{}\"",
                    parent.kind(),
                    child.name()
                )))
            }
        }
        Ok(())
    }
}

fn new_level(info: ControlInfo) -> Level {
    Level {
        info,
        value: 0,
        steps: 0,
        vertical: false,
    }
}

fn apply_level(level: &mut Level, attr: &str, value: &str) -> Result<()> {
    match attr {
        "value" => level.value = to_int_strict(attr, value, Some(0), Some(255))? as u8,
        "steps" => level.steps = to_int_strict(attr, value, Some(0), Some(32))? as u8,
        "vertical" => level.vertical = to_bool(attr, value)?,
        _ => {
            return Err(DmxError::structure(format!(
                "unsupported parameter \"{}\" for level",
                attr
            )))
        }
    }
    Ok(())
}
