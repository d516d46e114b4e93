//! Icon reference resolution.

use std::path::{Path, PathBuf};

use crate::error::{DmxError, Result};
use crate::types::{Colour, Icon};

/// Resolve an `icon` attribute.
///
/// - `!name` refers to an internal swatch and must be a palette colour name
/// - `@path` is relative to the document directory
/// - anything else is a plain filesystem path
///
/// When `check_files` is set, file icons must exist.
pub fn resolve_icon(value: &str, base_dir: &Path, check_files: bool) -> Result<Icon> {
    let value = value.trim();

    if let Some(name) = value.strip_prefix('!') {
        let name = name.trim().to_ascii_lowercase();
        if Colour::named(&name).is_none() {
            return Err(DmxError::Resource {
                path: PathBuf::from(value),
                message: format!("unknown internal icon \"{}\"", name),
            });
        }
        return Ok(Icon::Internal(name));
    }

    if value.is_empty() || value == "@" {
        return Err(DmxError::value("\"icon\" attribute must not be empty"));
    }

    let path = match value.strip_prefix('@') {
        Some(relative) => base_dir.join(relative),
        None => PathBuf::from(value),
    };

    if check_files && !path.is_file() {
        return Err(DmxError::Resource {
            message: format!("icon file \"{}\" not found", path.display()),
            path,
        });
    }

    Ok(Icon::File(path))
}
