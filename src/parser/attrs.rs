//! Attribute value coercion.
//!
//! Pure conversions from attribute strings to typed values. Every failure is
//! a [`DmxError::Value`] naming the attribute.

use crate::error::{DmxError, Result};
use crate::types::Colour;

/// Parse an integer attribute.
///
/// `*` and `auto` (any case) are accepted only when `allow_auto` is set and
/// yield `None`. Bounds are inclusive.
pub fn to_int(
    name: &str,
    value: &str,
    allow_auto: bool,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<Option<i64>> {
    let trimmed = value.trim();

    if trimmed == "*" || trimmed.eq_ignore_ascii_case("auto") {
        if allow_auto {
            return Ok(None);
        }
        return Err(DmxError::value(format!(
            "\"{}\" attribute must be an integer, not \"{}\"",
            name, trimmed
        )));
    }

    let n: i64 = trimmed.parse().map_err(|_| {
        DmxError::value(format!(
            "\"{}\" attribute must be an integer, got \"{}\"",
            name, value
        ))
    })?;

    match (min, max) {
        (Some(lo), Some(hi)) if n < lo || n > hi => Err(DmxError::value(format!(
            "\"{}\" value {} out of range {}..{}",
            name, n, lo, hi
        ))),
        (Some(lo), _) if n < lo => Err(DmxError::value(format!(
            "\"{}\" value {} must be at least {}",
            name, n, lo
        ))),
        (_, Some(hi)) if n > hi => Err(DmxError::value(format!(
            "\"{}\" value {} must be at most {}",
            name, n, hi
        ))),
        _ => Ok(Some(n)),
    }
}

/// Parse an integer attribute that must not be `auto`.
pub fn to_int_strict(name: &str, value: &str, min: Option<i64>, max: Option<i64>) -> Result<i64> {
    // allow_auto is false, so a missing value cannot come back
    to_int(name, value, false, min, max)?
        .ok_or_else(|| DmxError::value(format!("\"{}\" attribute must be an integer", name)))
}

/// Parse a whitespace-separated list of integers.
///
/// Elements that are `auto` (when allowed) come back as `None`.
pub fn to_int_list(
    name: &str,
    value: &str,
    allow_auto: bool,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<Vec<Option<i64>>> {
    value
        .split_whitespace()
        .map(|token| to_int(name, token, allow_auto, min, max))
        .collect()
}

/// Parse a boolean attribute: `0`/`1`, `true`/`false`, `yes`/`no`.
pub fn to_bool(name: &str, value: &str) -> Result<bool> {
    let v = value.trim().to_ascii_lowercase();
    match v.as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(DmxError::value(format!(
            "\"{}\" attribute must be a boolean, got \"{}\"",
            name, value
        ))
        .with_help("Use 0/1, true/false or yes/no")),
    }
}

/// Parse a colour attribute.
///
/// Accepted shapes, tried in this order:
/// - a palette name (`red`, `Azure`, `white`...)
/// - `#RGB` or `#RRGGBB`
/// - `hls(hue, lightness, saturation)` with hue 0-360, the rest 0-100
/// - three space-separated integers 0-255
pub fn to_rgb(name: &str, value: &str) -> Result<Colour> {
    let v = value.trim();

    if let Some(colour) = Colour::named(v) {
        return Ok(colour);
    }

    if v.starts_with('#') {
        if v.len() != 4 && v.len() != 7 {
            return Err(colour_format_error(name, value));
        }
        return Colour::from_hex(v).map_err(|e| {
            DmxError::value(format!("\"{}\" attribute: {}", name, e)).with_help(COLOUR_HELP)
        });
    }

    if let Some(args) = strip_function(v, "hls") {
        return parse_hls(name, args);
    }

    let components = to_int_list(name, v, false, Some(0), Some(255))?;
    match components.as_slice() {
        [Some(r), Some(g), Some(b)] => Ok(Colour::rgb(*r as u8, *g as u8, *b as u8)),
        _ => Err(colour_format_error(name, value)),
    }
}

/// Parse a channel value list: a colour or whitespace-separated bytes.
///
/// Colours expand to three values. Used for switch option values.
pub fn to_value_list(name: &str, value: &str) -> Result<Vec<u8>> {
    let v = value.trim();
    if v.is_empty() {
        return Err(DmxError::value(format!("\"{}\" attribute must not be empty", name)));
    }

    let looks_like_colour =
        v.starts_with('#') || strip_function(v, "hls").is_some() || Colour::named(v).is_some();
    if looks_like_colour {
        return to_rgb(name, v).map(|c| c.to_array().to_vec());
    }

    to_int_list(name, v, false, Some(0), Some(255))?
        .into_iter()
        .map(|n| {
            n.map(|n| n as u8)
                .ok_or_else(|| DmxError::value(format!("\"{}\" values must be integers", name)))
        })
        .collect()
}

const COLOUR_HELP: &str = "Use a palette name, #RGB, #RRGGBB, hls(h,l,s) or \"r g b\"";

fn colour_format_error(name: &str, value: &str) -> DmxError {
    DmxError::value(format!("invalid colour format of \"{}\" attribute: \"{}\"", name, value))
        .with_help(COLOUR_HELP)
}

/// Return the argument text of `func(...)`, matching the name case-insensitively.
fn strip_function<'a>(v: &'a str, func: &str) -> Option<&'a str> {
    let head = v.get(..func.len())?;
    if !head.eq_ignore_ascii_case(func) {
        return None;
    }
    v[func.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hls(name: &str, args: &str) -> Result<Colour> {
    let parts: Vec<&str> = args.split(',').collect();
    let [hue, lightness, saturation] = parts.as_slice() else {
        return Err(DmxError::value(format!(
            "\"{}\" attribute: hls() takes 3 components, got {}",
            name,
            parts.len()
        ))
        .with_help("Use hls(hue, lightness, saturation), e.g. hls(200, 50, 100)"));
    };

    let hue = to_int_strict(&format!("{} hue", name), hue, Some(0), Some(360))?;
    let lightness = to_int_strict(&format!("{} lightness", name), lightness, Some(0), Some(100))?;
    let saturation =
        to_int_strict(&format!("{} saturation", name), saturation, Some(0), Some(100))?;

    Ok(Colour::from_hls(
        hue as f32,
        lightness as f32 / 100.0,
        saturation as f32 / 100.0,
    ))
}
