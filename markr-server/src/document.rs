//! XML to generic document tree
//!
//! Converts an XML body into a `serde_json::Value` using the same conventions the
//! validator expects:
//! - element attributes are keys prefixed with `@_`
//! - numeric-looking text and attribute values become numbers
//! - repeated sibling elements collapse into an array
//! - an element with neither attributes nor children becomes its text value
//! - text next to attributes or children is stored under `#text`
//!
//! The returned value is always an object keyed by the top-level element names;
//! an empty body yields an empty object.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

use crate::error::ImportError;

/// Attribute key prefix
pub const ATTRIBUTE_PREFIX: &str = "@_";

/// Key for text stored alongside attributes or child elements
pub const TEXT_KEY: &str = "#text";

/// Element being built while its end tag is pending
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(start: &BytesStart<'_>) -> Result<Self, ImportError> {
        Ok(Self {
            name: element_name(start)?,
            children: attributes(start)?,
            text: String::new(),
        })
    }

    fn finish(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.children.is_empty() {
            coerce_scalar(text)
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert(TEXT_KEY.to_string(), coerce_scalar(text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

/// Parse an XML document into a generic tree
pub fn parse_document(xml: &str) -> Result<Value, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            ImportError::MalformedDocument(format!(
                "{} at position {}",
                e,
                reader.error_position()
            ))
        })?;

        match event {
            Event::Start(start) => stack.push(Frame::new(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::new(&start)?.finish();
                attach(parent_map(&mut stack, &mut root), name, value);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let data = std::str::from_utf8(&data).map_err(malformed)?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(data);
                }
            }
            Event::End(_) => {
                // End-name mismatches are rejected by the reader itself
                let frame = stack
                    .pop()
                    .ok_or_else(|| ImportError::MalformedDocument("unexpected end tag".to_string()))?;
                let (name, value) = frame.finish();
                attach(parent_map(&mut stack, &mut root), name, value);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(ImportError::MalformedDocument(format!(
            "unclosed element <{}>",
            frame.name
        )));
    }

    Ok(Value::Object(root))
}

fn malformed(err: impl std::fmt::Display) -> ImportError {
    ImportError::MalformedDocument(err.to_string())
}

fn parent_map<'a>(stack: &'a mut [Frame], root: &'a mut Map<String, Value>) -> &'a mut Map<String, Value> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

fn element_name(start: &BytesStart<'_>) -> Result<String, ImportError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(malformed)
}

fn attributes(start: &BytesStart<'_>) -> Result<Map<String, Value>, ImportError> {
    let mut map = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?;
        map.insert(
            format!("{}{}", ATTRIBUTE_PREFIX, key),
            coerce_scalar(value.trim()),
        );
    }
    Ok(map)
}

/// Add a child, turning a repeated name into an array
fn attach(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

/// Numeric-looking text becomes a number, everything else stays a string
///
/// Integers keep full `i64` precision (leading zeros are dropped, so `002299`
/// becomes `2299`). Decimal notation becomes a float. `inf`, `nan` and hex are
/// left as strings.
pub fn coerce_scalar(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(int.into());
    }
    if looks_decimal(text) {
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

fn looks_decimal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}
