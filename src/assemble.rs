//! Captured values → nested output document.
use serde_json::{Map, Value};

use crate::property::{Kind, Property};

/// Writes every captured value at its path. Uncaptured nodes are left out.
pub fn assemble(properties: &[Property]) -> Map<String, Value> {
    let mut document = Map::new();
    for property in properties {
        write_tree(&mut document, property, 0);
    }
    document
}

/// Assembles an object node relative to itself (array elements).
pub fn assemble_relative(object: &Property) -> Map<String, Value> {
    let mut document = Map::new();
    if let Kind::Object(rules) = &object.kind {
        let base = object.path.depth();
        for child in &rules.children {
            write_tree(&mut document, child, base);
        }
    }
    document
}

/// Whether assembling `property` would write anything.
pub fn has_value(property: &Property) -> bool {
    property.value().is_some()
        || property.object().is_some_and(|rules| rules.children.iter().any(has_value))
}

fn write_tree(document: &mut Map<String, Value>, property: &Property, skip: usize) {
    if let Some(value) = property.value() {
        write_at(document, &property.path.segments()[skip..], value.clone());
    }
    if let Kind::Object(rules) = &property.kind {
        for child in &rules.children {
            write_tree(document, child, skip);
        }
    }
}

/// Sets `segments` to `value`, creating (or replacing non-object) intermediates.
/// Writing the same path again overwrites.
pub fn write_at(document: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = document;
    for segment in parents {
        let slot = cursor
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        cursor = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    cursor.insert(last.clone(), value);
}
