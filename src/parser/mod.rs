//! Console description compiler.
//!
//! Reads a `dmxcontrols` markup document and produces a [`Console`] with
//! every channel resolved, or a [`CompileError`] pointing at the element that
//! broke it.
//!
//! # Document Structure
//!
//! ```xml
//! <dmxcontrols name="Stage" universe="1">
//!   <panel name="Front">
//!     <level name="Dimmer"/>
//!     <colorlevel name="Wash" color="azure"/>
//!   </panel>
//!   <switch name="Gobo" nchannels="1">
//!     <option name="Open" value="0"/>
//!     <option name="Star" value="64"/>
//!   </switch>
//! </dmxcontrols>
//! ```
//!
//! # Usage
//!
//! ```
//! let console = dmxctrl::parse(
//!     r#"<dmxcontrols><level name="Dimmer"/><colorlevel/></dmxcontrols>"#,
//! )?;
//!
//! assert_eq!(console.find("Dimmer").map(|c| c.channel()), Some(1));
//! assert_eq!(console.find("ColorLevel #1").map(|c| c.channel()), Some(2));
//! # Ok::<(), dmxctrl::CompileError>(())
//! ```

mod builder;
pub mod attrs;
pub mod channels;
pub mod icon;
pub mod reader;
pub mod span;

use std::path::{Path, PathBuf};

pub use channels::OverflowPolicy;
pub use span::{offset_to_location, Location};

use crate::error::{CompileError, DmxError};
use crate::types::Console;

use builder::TreeBuilder;
use reader::{MarkupEvent, MarkupReader};

/// Display name for documents compiled from memory.
pub const STRING_DOCUMENT: &str = "<string>";

/// Knobs that change how a document is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub channel_overflow: OverflowPolicy,
    /// Require file icons to exist.
    pub check_icons: bool,
    /// Universe used when the root has no `universe` attribute, or `auto`.
    pub default_universe: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            channel_overflow: OverflowPolicy::Error,
            check_icons: true,
            default_universe: 1,
        }
    }
}

/// Configurable compiler front end.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
    base_dir: Option<PathBuf>,
    document_name: Option<String>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Directory `@` icon paths are resolved against.
    ///
    /// Defaults to the document's directory for files, the working directory
    /// otherwise.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Name used for the document in error messages.
    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = Some(name.into());
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a document held in memory.
    pub fn compile(&self, source: &str) -> Result<Console, CompileError> {
        let name = self.document_name.as_deref().unwrap_or(STRING_DOCUMENT);
        let base_dir = self.base_dir.as_deref().unwrap_or(Path::new("."));
        self.run(source, name, base_dir)
    }

    /// Read and compile a document file.
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<Console, CompileError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let name = self.document_name.as_deref().unwrap_or(&shown);

        let source = std::fs::read_to_string(path).map_err(|e| {
            CompileError::without_location(
                DmxError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
                name,
            )
        })?;

        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        tracing::debug!(path = %shown, "compiling");
        let mut console = self.run(&source, name, &base_dir)?;
        console.source = Some(path.to_path_buf());
        Ok(console)
    }

    fn run(&self, source: &str, name: &str, base_dir: &Path) -> Result<Console, CompileError> {
        let mut reader = MarkupReader::new(source);
        let mut builder = TreeBuilder::new(&self.options, base_dir);

        // Offset of the event being handled, for error positions
        let mut offset = 0;
        let outcome = loop {
            let event = match reader.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => break Ok(()),
                Err(e) => {
                    offset = reader.position();
                    break Err(e);
                }
            };
            offset = event.offset();

            let step = match &event {
                MarkupEvent::Start {
                    name, attributes, ..
                } => builder.start_element(name, attributes),
                MarkupEvent::Text { text, .. } => builder.characters(text),
                MarkupEvent::End { name, .. } => builder.end_element(name),
            };
            if let Err(e) = step {
                break Err(e);
            }
        };

        let wrap = |cause: DmxError, offset: usize, stack: Vec<String>| {
            CompileError::new(
                cause,
                Some(offset_to_location(source, offset)),
                stack,
                name,
                source,
            )
        };

        if let Err(cause) = outcome {
            return Err(wrap(cause, offset, builder.open_tags()));
        }

        let stack = builder.open_tags();
        builder
            .finish()
            .map_err(|cause| wrap(cause, source.len(), stack))
    }
}

/// Compile a document with default options.
pub fn parse(source: &str) -> Result<Console, CompileError> {
    Compiler::new().compile(source)
}

/// Read and compile a document file with default options.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Console, CompileError> {
    Compiler::new().compile_file(path)
}
