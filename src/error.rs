use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::parser::span::Location;

/// Main error type for dmxctrl operations
#[derive(Error, Diagnostic, Debug)]
pub enum DmxError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(dmxctrl::io))]
    Io { path: PathBuf, message: String },

    #[error("Malformed document: {message}")]
    #[diagnostic(code(dmxctrl::malformed))]
    Malformed { message: String },

    /// Unknown tags, misplaced tags and undeclared attributes.
    #[error("{message}")]
    #[diagnostic(code(dmxctrl::structure))]
    Structure {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Missing attributes, bad literals and failed post-build checks.
    #[error("{message}")]
    #[diagnostic(code(dmxctrl::value))]
    Value {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(dmxctrl::resource))]
    Resource { path: PathBuf, message: String },

    #[error("Config error: {message}")]
    #[diagnostic(code(dmxctrl::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl DmxError {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        DmxError::Structure {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn value(message: impl Into<String>) -> Self {
        DmxError::Value {
            message: message.into(),
            help: None,
        }
    }

    /// Attach help text to structure/value/config errors.
    pub(crate) fn with_help(self, text: impl Into<String>) -> Self {
        match self {
            DmxError::Structure { message, .. } => DmxError::Structure {
                message,
                help: Some(text.into()),
            },
            DmxError::Value { message, .. } => DmxError::Value {
                message,
                help: Some(text.into()),
            },
            DmxError::Config { message, .. } => DmxError::Config {
                message,
                help: Some(text.into()),
            },
            other => other,
        }
    }

    /// Help text carried by the error, if any.
    pub fn help_text(&self) -> Option<&str> {
        match self {
            DmxError::Structure { help, .. }
            | DmxError::Value { help, .. }
            | DmxError::Config { help, .. } => help.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DmxError>;

/// A failure while compiling a console description.
///
/// Wraps the underlying [`DmxError`] with the position of the element being
/// processed and the stack of open tags at that point.
#[derive(Error, Diagnostic, Debug)]
#[error("Error at position {position} of \"{document}\": {cause}")]
#[diagnostic(code(dmxctrl::compile))]
pub struct CompileError {
    /// Location of the offending element, when the reader got that far.
    pub location: Option<Location>,
    /// Open tag names, outermost first.
    pub stack: Vec<String>,
    /// Display name of the document (file path or `<string>`).
    pub document: String,
    #[source]
    pub cause: DmxError,
    position: String,
    #[help]
    help: Option<String>,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: Option<SourceSpan>,
}

impl CompileError {
    pub(crate) fn new(
        cause: DmxError,
        location: Option<Location>,
        stack: Vec<String>,
        document: &str,
        source: &str,
    ) -> Self {
        let position = match &location {
            None => "?".to_string(),
            Some(loc) if stack.is_empty() => loc.to_string(),
            Some(loc) => format!("{} ({})", loc, stack.join("/")),
        };

        Self {
            span: location.map(|loc| SourceSpan::from((loc.offset, 0))),
            location,
            stack,
            document: document.to_string(),
            help: cause.help_text().map(str::to_string),
            cause,
            position,
            src: NamedSource::new(document, source.to_string()),
        }
    }

    /// Build an error that happened before any markup was read.
    pub(crate) fn without_location(cause: DmxError, document: &str) -> Self {
        Self::new(cause, None, Vec::new(), document, "")
    }

    /// The slash-joined open tag stack, e.g. `dmxcontrols/panel/level`.
    pub fn stack_path(&self) -> String {
        self.stack.join("/")
    }

    pub fn is_structural(&self) -> bool {
        matches!(self.cause, DmxError::Structure { .. })
    }

    pub fn is_value_error(&self) -> bool {
        matches!(self.cause, DmxError::Value { .. })
    }

    pub fn is_resource_error(&self) -> bool {
        matches!(self.cause, DmxError::Resource { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.cause, DmxError::Malformed { .. } | DmxError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_message_with_stack() {
        let err = CompileError::new(
            DmxError::value("value out of range"),
            Some(Location::new(10, 3, 5)),
            vec!["dmxcontrols".to_string(), "level".to_string()],
            "desk.dmxctrl",
            "",
        );

        assert_eq!(
            err.to_string(),
            "Error at position 3:5 (dmxcontrols/level) of \"desk.dmxctrl\": value out of range"
        );
        assert_eq!(err.stack_path(), "dmxcontrols/level");
        assert!(err.is_value_error());
    }

    #[test]
    fn test_compile_error_without_location() {
        let err = CompileError::without_location(
            DmxError::Malformed {
                message: "empty".to_string(),
            },
            "<string>",
        );

        assert!(err.to_string().starts_with("Error at position ? of"));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_help_is_carried_over() {
        let cause = DmxError::structure("unsupported tag \"knob\"")
            .with_help("Use panel, level, colorlevel or switch");
        assert_eq!(
            cause.help_text(),
            Some("Use panel, level, colorlevel or switch")
        );
    }
}
