//! Tree to record decoding
//!
//! Decoding walks the shape of the destination record and pulls every
//! participating field out of the path-addressed source tree. The result is a
//! name-addressed tree matching the destination's own serialized form, ready
//! to be hydrated by serde.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use crate::descriptor::FieldDescriptor;
use crate::error::{Error, Result};
use crate::options::MapperOptions;
use crate::path::Path;
use crate::record::{FieldKind, Shape};
use crate::tree;
use serde_json::{Map, Value};

/// Builds a destination-shaped tree out of a source tree
pub struct Decoder<'a> {
    type_restraint: &'a str,
    options: &'a MapperOptions,
}

impl<'a> Decoder<'a> {
    /// Create a decoder reading from a source of type `type_restraint`
    pub fn new(type_restraint: &'a str, options: &'a MapperOptions) -> Self {
        Self {
            type_restraint,
            options,
        }
    }

    pub fn type_restraint(&self) -> &str {
        self.type_restraint
    }

    /// Shape `src` after the destination `shape`
    pub fn run(&self, src: &Map<String, Value>, shape: &'static Shape) -> Result<Map<String, Value>> {
        log::debug!(
            "Decoding into '{}' from source type '{}'",
            shape.type_name,
            self.type_restraint
        );
        self.shape_record(src, shape, &Path::root(), 0)
    }

    fn shape_record(
        &self,
        src: &Map<String, Value>,
        shape: &'static Shape,
        prefix: &Path,
        depth: usize,
    ) -> Result<Map<String, Value>> {
        if depth > self.options.max_depth {
            return Err(Error::DepthExceeded {
                depth,
                limit: self.options.max_depth,
            });
        }

        let mut out = Map::new();
        for field in shape.fields {
            let Some(descriptor) = FieldDescriptor::resolve(field, self.type_restraint)? else {
                continue;
            };
            if let Some(value) = self
                .shape_field(src, &descriptor, prefix, depth)
                .map_err(|err| err.in_field(field.name))?
            {
                out.insert(field.name.to_string(), value);
            }
        }

        Ok(out)
    }

    fn shape_field(
        &self,
        src: &Map<String, Value>,
        descriptor: &FieldDescriptor,
        prefix: &Path,
        depth: usize,
    ) -> Result<Option<Value>> {
        match descriptor.kind() {
            FieldKind::Record { shape, optional } => {
                let nested_prefix = descriptor
                    .path_under(prefix)
                    .unwrap_or_else(|| prefix.clone());
                if optional
                    && !descriptor.dismisses_nesting()
                    && tree::get(src, &nested_prefix).is_none()
                {
                    log::trace!("No record at '{}' for '{}'", nested_prefix, descriptor.name());
                    return Ok(None);
                }
                let nested = self.shape_record(src, shape(), &nested_prefix, depth + 1)?;
                if optional && is_hollow(&nested) {
                    return Ok(None);
                }
                Ok(Some(Value::Object(nested)))
            }
            FieldKind::Records { shape } => {
                let path = descriptor.path_under(prefix).ok_or_else(|| {
                    Error::configuration(
                        "'->' can not be used on a sequence of records",
                        descriptor.name(),
                    )
                })?;
                let Some(found) = tree::get(src, &path) else {
                    log::trace!("No sequence at '{}' for '{}'", path, descriptor.name());
                    return Ok(None);
                };
                let Some(items) = found.as_array() else {
                    log::trace!("Value at '{}' is not a sequence", path);
                    return Ok(None);
                };

                let empty = Map::new();
                let elements = items
                    .iter()
                    .map(|item| {
                        let element = item.as_object().unwrap_or(&empty);
                        self.shape_record(element, shape(), &Path::root(), depth + 1)
                            .map(Value::Object)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(Value::Array(elements)))
            }
            FieldKind::Value => {
                let Some(path) = descriptor.path_under(prefix) else {
                    return Ok(None);
                };
                let found = tree::get(src, &path).cloned();
                if found.is_none() {
                    log::trace!("No value at '{}' for '{}'", path, descriptor.name());
                }
                Ok(found)
            }
        }
    }
}

/// Whether `map` holds nothing but (nested) empty maps
fn is_hollow(map: &Map<String, Value>) -> bool {
    map.values().all(|value| match value {
        Value::Object(nested) => is_hollow(nested),
        _ => false,
    })
}
