//! Path-indexed tree accessor
//!
//! The intermediate tree of every mapping call is a `serde_json` object.
//! [`get`] treats missing nodes, `null` and out-of-bounds indices as absent;
//! [`set`] creates intermediate maps and sequences on the way down.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::path::{Path, Segment};
use serde_json::{Map, Value};

/// Look up the value at `path`, `None` when any step is missing
pub fn get<'a>(tree: &'a Map<String, Value>, path: &Path) -> Option<&'a Value> {
    let (last, parents) = path.segments().split_last()?;

    let mut current = tree;
    for segment in parents {
        current = lookup(current, segment)?.as_object()?;
    }

    lookup(current, last).filter(|value| !value.is_null())
}

fn lookup<'a>(map: &'a Map<String, Value>, segment: &Segment) -> Option<&'a Value> {
    match segment {
        Segment::Key(name) => map.get(name),
        Segment::Index { name, index } => map.get(name)?.as_array()?.get(*index),
    }
}

/// Write `value` at `path`, creating intermediate containers
///
/// Index segments grow the addressed sequence to `index + 1`, filling new
/// slots with empty maps. When both the existing and the new value are maps
/// they are merged.
pub fn set(tree: &mut Map<String, Value>, path: &Path, value: Value) -> Result<()> {
    let (last, parents) = path
        .segments()
        .split_last()
        .ok_or_else(|| Error::path_conflict("can not set a value at the root", path.to_string()))?;

    let mut current = tree;
    for segment in parents {
        current = descend(current, segment, path)?;
    }

    let slot = match last {
        Segment::Key(name) => current.entry(name.as_str()).or_insert(Value::Null),
        Segment::Index { name, index } => vivify_slot(current, name, *index, path)?,
    };
    merge(slot, value);
    Ok(())
}

fn descend<'a>(
    map: &'a mut Map<String, Value>,
    segment: &Segment,
    path: &Path,
) -> Result<&'a mut Map<String, Value>> {
    let node = match segment {
        Segment::Key(name) => map.entry(name.as_str()).or_insert(Value::Null),
        Segment::Index { name, index } => vivify_slot(map, name, *index, path)?,
    };
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut().ok_or_else(|| {
        Error::path_conflict(
            format!("'{}' already holds a non-map value", segment),
            path.to_string(),
        )
    })
}

fn vivify_slot<'a>(
    map: &'a mut Map<String, Value>,
    name: &str,
    index: usize,
    path: &Path,
) -> Result<&'a mut Value> {
    let node = map.entry(name).or_insert(Value::Null);
    if node.is_null() {
        *node = Value::Array(Vec::new());
    }
    let items = node.as_array_mut().ok_or_else(|| {
        Error::path_conflict(
            format!("'{}' already holds a non-sequence value", name),
            path.to_string(),
        )
    })?;
    if items.len() <= index {
        items.resize_with(index + 1, || Value::Object(Map::new()));
    }
    Ok(&mut items[index])
}

/// Deep-merge `overlay` into `base`
///
/// Maps merge key by key, anything else in `overlay` replaces `base`.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => merge_maps(base, overlay),
        (base, overlay) => *base = overlay,
    }
}

/// Deep-merge the entries of `overlay` into `base`
pub fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Deep-merge `overlay` into `base`, landing on an existing key of `base`
/// that differs only in ASCII case when there is no exact match
pub fn merge_maps_folding(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        let target = if base.contains_key(&key) {
            Some(key.clone())
        } else {
            base.keys().find(|k| k.eq_ignore_ascii_case(&key)).cloned()
        };
        match target.and_then(|k| base.get_mut(&k)) {
            Some(existing) => match (existing, value) {
                (Value::Object(existing), Value::Object(entries)) => {
                    merge_maps_folding(existing, entries)
                }
                (existing, value) => *existing = value,
            },
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Whether `value` is the zero value of its kind
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
