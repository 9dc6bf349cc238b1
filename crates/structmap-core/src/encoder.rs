//! Record to tree encoding
//!
//! The encoder walks the annotated fields of a source record and writes each
//! participating value at its resolved path. Nested records are encoded
//! through their own annotations, either under the field path or spliced into
//! the current level when the field dismisses nesting.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use crate::descriptor::FieldDescriptor;
use crate::error::{Error, Result};
use crate::options::MapperOptions;
use crate::record::{FieldKind, FieldValue, Record};
use crate::tree;
use serde_json::{Map, Value};

/// Builds a path-addressed tree from a record
pub struct Encoder<'a> {
    type_restraint: &'a str,
    options: &'a MapperOptions,
}

impl<'a> Encoder<'a> {
    /// Create an encoder targeting the type named `type_restraint`
    pub fn new(type_restraint: &'a str, options: &'a MapperOptions) -> Self {
        Self {
            type_restraint,
            options,
        }
    }

    pub fn type_restraint(&self) -> &str {
        self.type_restraint
    }

    /// Encode `src` into a fresh tree
    pub fn run(&self, src: &dyn Record) -> Result<Map<String, Value>> {
        log::debug!(
            "Encoding '{}' for target type '{}'",
            src.shape().type_name,
            self.type_restraint
        );

        let mut tree = Map::new();
        self.encode_record(src, &mut tree, 0)?;
        Ok(tree)
    }

    fn encode_record(
        &self,
        record: &dyn Record,
        into: &mut Map<String, Value>,
        depth: usize,
    ) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::DepthExceeded {
                depth,
                limit: self.options.max_depth,
            });
        }

        let shape = record.shape();
        for (field, value) in shape.fields.iter().zip(record.values()) {
            let Some(descriptor) = FieldDescriptor::resolve(field, self.type_restraint)? else {
                continue;
            };
            self.encode_field(&descriptor, value, into, depth)
                .map_err(|err| err.in_field(field.name))?;
        }

        Ok(())
    }

    fn encode_field(
        &self,
        descriptor: &FieldDescriptor,
        value: FieldValue<'_>,
        into: &mut Map<String, Value>,
        depth: usize,
    ) -> Result<()> {
        let omit_empty = self.options.omit_empty;

        let node = match value {
            FieldValue::Value(value) => {
                let node = value.to_tree().map_err(unsupported)?;
                if omit_empty && tree::is_zero(&node) {
                    log::trace!("Omitting empty field '{}'", descriptor.name());
                    return Ok(());
                }
                node
            }
            FieldValue::Record(None) => {
                if omit_empty || descriptor.dismisses_nesting() {
                    log::trace!("Omitting unset record '{}'", descriptor.name());
                    return Ok(());
                }
                Value::Null
            }
            FieldValue::Record(Some(nested)) => {
                let optional = matches!(descriptor.kind(), FieldKind::Record { optional: true, .. });
                if omit_empty && !optional && record_is_zero(nested)? {
                    log::trace!("Omitting empty record '{}'", descriptor.name());
                    return Ok(());
                }
                if descriptor.dismisses_nesting() {
                    return self.encode_record(nested, into, depth + 1);
                }
                let mut sub_tree = Map::new();
                self.encode_record(nested, &mut sub_tree, depth + 1)?;
                Value::Object(sub_tree)
            }
            FieldValue::Records(items) => {
                if descriptor.dismisses_nesting() {
                    return Err(Error::configuration(
                        "'->' can not be used on a sequence of records",
                        descriptor.name(),
                    ));
                }
                if omit_empty && items.is_empty() {
                    log::trace!("Omitting empty sequence '{}'", descriptor.name());
                    return Ok(());
                }
                let elements = items
                    .into_iter()
                    .map(|item| {
                        let mut element = Map::new();
                        self.encode_record(item, &mut element, depth + 1)?;
                        Ok(Value::Object(element))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Value::Array(elements)
            }
        };

        match descriptor.path() {
            Some(path) => tree::set(into, path, node),
            None => match node {
                Value::Object(entries) => {
                    tree::merge_maps(into, entries);
                    Ok(())
                }
                _ => Err(Error::configuration(
                    "'->' requires a record or map value",
                    descriptor.name(),
                )),
            },
        }
    }
}

/// Whether every annotated field of `record` holds its zero value
pub fn record_is_zero(record: &dyn Record) -> Result<bool> {
    for (field, value) in record.shape().fields.iter().zip(record.values()) {
        let zero = match value {
            FieldValue::Value(value) => tree::is_zero(&value.to_tree().map_err(unsupported)?),
            FieldValue::Record(None) => true,
            FieldValue::Record(Some(nested)) => match field.kind {
                FieldKind::Record { optional: true, .. } => false,
                _ => record_is_zero(nested)?,
            },
            FieldValue::Records(items) => items.is_empty(),
        };
        if !zero {
            return Ok(false);
        }
    }
    Ok(true)
}

fn unsupported(err: serde_json::Error) -> Error {
    Error::UnsupportedType {
        kind: err.to_string(),
        field: None,
    }
}
