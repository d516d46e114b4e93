//! Markup event source.
//!
//! Turns an XML document into the flat start/text/end event stream the tree
//! builder consumes. Self-closing elements are reported as a start followed
//! by an end. Declarations, comments and processing instructions are skipped.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DmxError, Result};

/// One markup event with the byte offset where it begins.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent<'a> {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        offset: usize,
    },
    Text {
        text: Cow<'a, str>,
        offset: usize,
    },
    End {
        name: String,
        offset: usize,
    },
}

impl MarkupEvent<'_> {
    pub fn offset(&self) -> usize {
        match self {
            MarkupEvent::Start { offset, .. }
            | MarkupEvent::Text { offset, .. }
            | MarkupEvent::End { offset, .. } => *offset,
        }
    }
}

/// Pull reader over an in-memory document.
pub struct MarkupReader<'a> {
    reader: Reader<&'a [u8]>,
    pending_end: Option<(String, usize)>,
}

impl<'a> MarkupReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            reader: Reader::from_str(source),
            pending_end: None,
        }
    }

    /// Byte offset the reader has consumed up to.
    pub fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Read the next event, `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<MarkupEvent<'a>>> {
        if let Some((name, offset)) = self.pending_end.take() {
            return Ok(Some(MarkupEvent::End { name, offset }));
        }

        loop {
            let offset = self.position();
            let event = self.reader.read_event().map_err(|e| DmxError::Malformed {
                message: e.to_string(),
            })?;

            match event {
                Event::Start(e) => {
                    let (name, attributes) = element_parts(&e)?;
                    return Ok(Some(MarkupEvent::Start {
                        name,
                        attributes,
                        offset,
                    }));
                }
                Event::Empty(e) => {
                    let (name, attributes) = element_parts(&e)?;
                    self.pending_end = Some((name.clone(), offset));
                    return Ok(Some(MarkupEvent::Start {
                        name,
                        attributes,
                        offset,
                    }));
                }
                Event::End(e) => {
                    let name = utf8(e.name().as_ref())?.to_string();
                    return Ok(Some(MarkupEvent::End { name, offset }));
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| DmxError::Malformed {
                        message: e.to_string(),
                    })?;
                    return Ok(Some(MarkupEvent::Text { text, offset }));
                }
                Event::CData(e) => {
                    let text = Cow::Owned(String::from_utf8_lossy(&e).into_owned());
                    return Ok(Some(MarkupEvent::Text { text, offset }));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

fn element_parts(e: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>)> {
    let name = utf8(e.name().as_ref())?.to_string();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DmxError::Malformed {
            message: format!("attribute error in <{}>: {}", name, e),
        })?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value().map_err(|e| DmxError::Malformed {
            message: format!("attribute \"{}\" of <{}>: {}", key, name, e),
        })?;
        attributes.push((key, value.into_owned()));
    }

    Ok((name, attributes))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| DmxError::Malformed {
        message: format!("invalid UTF-8 in name: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &str) -> Vec<MarkupEvent<'_>> {
        let mut reader = MarkupReader::new(source);
        let mut events = Vec::new();
        while let Some(event) = reader.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_start_text_end() {
        let events = collect("<a x=\"1\">hi</a>");

        assert_eq!(
            events,
            vec![
                MarkupEvent::Start {
                    name: "a".to_string(),
                    attributes: vec![("x".to_string(), "1".to_string())],
                    offset: 0,
                },
                MarkupEvent::Text {
                    text: Cow::Borrowed("hi"),
                    offset: 9,
                },
                MarkupEvent::End {
                    name: "a".to_string(),
                    offset: 11,
                },
            ]
        );
    }

    #[test]
    fn test_empty_element_expands() {
        let events = collect("<a><b/></a>");
        let kinds: Vec<(&str, usize)> = events
            .iter()
            .map(|e| match e {
                MarkupEvent::Start { name, offset, .. } => (name.as_str(), *offset),
                MarkupEvent::End { name, offset } => (name.as_str(), *offset),
                MarkupEvent::Text { offset, .. } => ("#text", *offset),
            })
            .collect();

        assert_eq!(kinds, vec![("a", 0), ("b", 3), ("b", 3), ("a", 7)]);
    }

    #[test]
    fn test_skips_declaration_and_comments() {
        let events = collect("<?xml version=\"1.0\"?><!-- c --><a/>");
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], MarkupEvent::Start { name, .. } if name == "a"));
    }

    #[test]
    fn test_entities_unescaped() {
        let events = collect("<a name=\"R&amp;D\">x &lt; y</a>");
        match &events[0] {
            MarkupEvent::Start { attributes, .. } => assert_eq!(attributes[0].1, "R&D"),
            other => panic!("unexpected {:?}", other),
        }
        match &events[1] {
            MarkupEvent::Text { text, .. } => assert_eq!(text, "x < y"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_end_is_malformed() {
        let mut reader = MarkupReader::new("<a><b></a>");
        let mut result = Ok(None);
        for _ in 0..4 {
            result = reader.next_event();
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(DmxError::Malformed { .. })));
    }
}
