//! Kover XML report parser
//!
//! Kover writes the JaCoCo XML schema: a `<report>` root carrying
//! project-level `<counter>` elements, and `<class sourcefilename="...">`
//! elements (nested in packages) carrying their own counters. Only
//! INSTRUCTION counters are read.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use super::{CoverageCounter, CoverageReport};
use crate::error::{KoverError, Result};

const INSTRUCTION: &str = "INSTRUCTION";

/// Read and parse a Kover XML report from disk
pub fn parse_kover(path: &Path) -> Result<CoverageReport> {
    if path.as_os_str().is_empty() {
        return Err(KoverError::EmptyPath);
    }
    if !path.is_file() {
        return Err(KoverError::ReportNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read(path).map_err(|source| KoverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_kover_bytes(&raw)
}

/// Parse Kover XML content from a string
pub fn parse_kover_string(content: &str) -> Result<CoverageReport> {
    parse_kover_bytes(content.as_bytes())
}

/// Parse raw Kover XML bytes
pub fn parse_kover_bytes(raw: &[u8]) -> Result<CoverageReport> {
    let mut reader = Reader::from_reader(raw);
    reader.trim_text(true);

    let mut report = CoverageReport::default();
    let mut total: Option<CoverageCounter> = None;

    // Names of currently open elements, root first
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut root_closed = false;
    let mut seen_root = false;

    // Source file of the class being read; `Some(None)` for a class without one
    let mut current_class: Option<Option<String>> = None;

    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            KoverError::MalformedReport(format!(
                "{} at position {}",
                e,
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if root_closed {
                    return Err(KoverError::MalformedReport(
                        "content after the root element".to_string(),
                    ));
                }
                seen_root = true;

                let is_empty = matches!(event, Event::Empty(_));
                let name = e.name().as_ref().to_vec();

                match name.as_slice() {
                    b"counter" => {
                        if let Some(counter) = read_instruction_counter(e)? {
                            match open.last().map(Vec::as_slice) {
                                Some(b"report") if open.len() == 1 => {
                                    // First project counter wins
                                    if total.is_none() {
                                        total = Some(counter);
                                    }
                                }
                                Some(b"class") => {
                                    if let Some(Some(ref file)) = current_class {
                                        let entry =
                                            report.file_counters.entry(file.clone()).or_default();
                                        *entry = sum_counters(file, *entry, counter)?;
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    b"class" if !is_empty => {
                        current_class = Some(source_file_name(e)?);
                    }
                    _ => {}
                }

                if !is_empty {
                    open.push(name);
                } else if open.is_empty() {
                    root_closed = true;
                }
            }
            Event::End(ref e) => {
                let closed = open.pop().ok_or_else(|| {
                    KoverError::MalformedReport("unexpected closing tag".to_string())
                })?;
                if closed.as_slice() == b"class" {
                    current_class = None;
                }
                if closed.as_slice() != e.name().as_ref() {
                    return Err(KoverError::MalformedReport(format!(
                        "expected </{}>, found </{}>",
                        String::from_utf8_lossy(&closed),
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                if open.is_empty() {
                    root_closed = true;
                }
            }
            Event::Text(ref t) => {
                if open.is_empty() && !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(KoverError::MalformedReport(
                        "text outside of the root element".to_string(),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(KoverError::MalformedReport(
            "document has no root element".to_string(),
        ));
    }
    if let Some(unclosed) = open.last() {
        return Err(KoverError::MalformedReport(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(unclosed)
        )));
    }

    report.total_counter = total.ok_or(KoverError::MissingCounter)?;
    Ok(report)
}

/// Read a `<counter>` element, returning `None` unless it is an INSTRUCTION counter
fn read_instruction_counter(e: &BytesStart) -> Result<Option<CoverageCounter>> {
    let mut is_instruction = false;
    let mut missed: Option<String> = None;
    let mut covered: Option<String> = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| KoverError::MalformedReport(e.to_string()))?;
        match attr.key.as_ref() {
            b"type" => is_instruction = unescaped(&attr)? == INSTRUCTION,
            b"missed" => missed = Some(unescaped(&attr)?),
            b"covered" => covered = Some(unescaped(&attr)?),
            _ => {}
        }
    }

    if !is_instruction {
        return Ok(None);
    }

    Ok(Some(CoverageCounter {
        missed: parse_count("missed", missed)?,
        covered: parse_count("covered", covered)?,
    }))
}

fn parse_count(attribute: &str, value: Option<String>) -> Result<u64> {
    let value = value.unwrap_or_default();
    value
        .parse::<u64>()
        .map_err(|_| KoverError::InvalidCounterValue {
            attribute: attribute.to_string(),
            value,
        })
}

/// Attribute value with entity and character references resolved
fn unescaped(attr: &Attribute) -> Result<String> {
    attr.unescape_value()
        .map(|value| value.into_owned())
        .map_err(|e| KoverError::MalformedReport(e.to_string()))
}

/// Add a class counter to its file's running total
fn sum_counters(
    file: &str,
    sum: CoverageCounter,
    counter: CoverageCounter,
) -> Result<CoverageCounter> {
    sum.checked_add(counter)
        .ok_or_else(|| KoverError::InvalidCounterValue {
            attribute: format!("{} counter sum", file),
            value: format!(
                "{}/{} + {}/{}",
                sum.missed, sum.covered, counter.missed, counter.covered
            ),
        })
}

fn source_file_name(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| KoverError::MalformedReport(e.to_string()))?;
        if attr.key.as_ref() == b"sourcefilename" {
            return Ok(Some(unescaped(&attr)?));
        }
    }
    Ok(None)
}
