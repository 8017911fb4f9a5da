//! Schema-agnostic response normalizer.
//!
//! The mirrors return the same logical data nested at unpredictable depths
//! and under inconsistent key names: a top-level array, `{data: {items}}`,
//! `{tracks: {items}}`, `{data: {tracks: {items}}}`, or `{data: [..]}` have
//! all been observed. This module digs the requested section out of
//! whatever shape arrived.

use serde_json::Value;
use std::collections::HashSet;

/// Uniform result section extracted from a raw payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

impl Page {
    fn from_records(items: Vec<Value>) -> Self {
        let len = items.len() as u64;
        Self {
            items,
            limit: len,
            offset: 0,
            total: len,
        }
    }

    fn from_section(section: &serde_json::Map<String, Value>, items: Vec<Value>) -> Self {
        let len = items.len() as u64;
        let count = |key: &str| section.get(key).and_then(Value::as_u64);
        Self {
            limit: count("limit").unwrap_or(len),
            offset: count("offset").unwrap_or(0),
            total: count("total")
                .or_else(|| count("totalNumberOfItems"))
                .unwrap_or(len),
            items,
        }
    }
}

/// Extract the `section_key` result section from an arbitrarily shaped
/// payload.
///
/// A missing or malformed section normalizes to an empty page; callers must
/// treat "no results" and "garbage payload" identically.
pub fn normalize(payload: &Value, section_key: &str) -> Page {
    let mut visited = HashSet::new();
    if let Some(page) = find_section(payload, section_key, &mut visited) {
        return page;
    }

    // No `items` section anywhere. Some mirrors return the records as a
    // bare list (top level or under a wrapper key).
    visited.clear();
    if let Some(records) = find_record_list(payload, section_key, &mut visited) {
        return Page::from_records(records.clone());
    }

    Page::default()
}

/// Depth-first search for an object holding an `items` array, preferring
/// the exact section key at each level.
fn find_section(
    node: &Value,
    section_key: &str,
    visited: &mut HashSet<*const Value>,
) -> Option<Page> {
    if !visited.insert(node as *const Value) {
        return None;
    }

    match node {
        Value::Array(elements) => elements
            .iter()
            .find_map(|e| find_section(e, section_key, visited)),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("items") {
                return Some(Page::from_section(map, items.clone()));
            }
            if let Some(preferred) = map.get(section_key) {
                if let Some(page) = find_section(preferred, section_key, visited) {
                    return Some(page);
                }
            }
            map.iter()
                .filter(|(key, _)| key.as_str() != section_key)
                .find_map(|(_, child)| find_section(child, section_key, visited))
        }
        _ => None,
    }
}

/// Fallback search for a bare array of record objects.
fn find_record_list<'a>(
    node: &'a Value,
    section_key: &str,
    visited: &mut HashSet<*const Value>,
) -> Option<&'a Vec<Value>> {
    if !visited.insert(node as *const Value) {
        return None;
    }

    match node {
        Value::Array(elements) => {
            if elements.iter().all(Value::is_object) {
                return Some(elements);
            }
            elements
                .iter()
                .find_map(|e| find_record_list(e, section_key, visited))
        }
        Value::Object(map) => {
            if let Some(preferred) = map.get(section_key) {
                if let Some(list) = find_record_list(preferred, section_key, visited) {
                    return Some(list);
                }
            }
            map.iter()
                .filter(|(key, _)| key.as_str() != section_key)
                .find_map(|(_, child)| find_record_list(child, section_key, visited))
        }
        _ => None,
    }
}
