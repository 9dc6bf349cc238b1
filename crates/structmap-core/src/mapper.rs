//! Mapping entry points
//!
//! [`Mapper`] wires the encoder and decoder to the generic serde codec:
//! encoding builds a tree from a mapped record and hydrates the destination
//! from it, decoding serializes the source, shapes it after the mapped
//! destination and hydrates the destination from the shaped tree.
//!
//! Copyright (c) 2025 Structmap Team
//! Licensed under the Apache-2.0 license

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::options::MapperOptions;
use crate::record::{short_type_name, Mapped, Record};
use crate::tree;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Mapping engine configured with [`MapperOptions`]
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    options: MapperOptions,
}

impl Mapper {
    pub fn new(options: MapperOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Route the annotated fields of `src` into `dst`
    ///
    /// Fields are gated and resolved against the short type name of `D`.
    pub fn encode<S, D>(&self, src: &S, dst: &mut D) -> Result<()>
    where
        S: Record,
        D: Serialize + DeserializeOwned,
    {
        let target = short_type_name::<D>();
        let tree = Encoder::new(target, &self.options).run(src)?;
        self.hydrate(tree, dst)
    }

    /// Build the path-addressed tree of `src` for a target named `target_type`
    pub fn encode_to_value<S>(&self, src: &S, target_type: &str) -> Result<Value>
    where
        S: Record,
    {
        Encoder::new(target_type, &self.options)
            .run(src)
            .map(Value::Object)
    }

    /// Same as [`Mapper::encode_to_value`], serialized as JSON bytes
    pub fn encode_to_vec<S>(&self, src: &S, target_type: &str) -> Result<Vec<u8>>
    where
        S: Record,
    {
        let tree = self.encode_to_value(src, target_type)?;
        Ok(serde_json::to_vec(&tree)?)
    }

    /// Pull the annotated fields of `dst` out of `src`
    ///
    /// Fields are gated and resolved against the short type name of `S`.
    pub fn decode<S, D>(&self, src: &S, dst: &mut D) -> Result<()>
    where
        S: Serialize + ?Sized,
        D: Mapped + Serialize + DeserializeOwned,
    {
        let tree = serde_json::to_value(src)?;
        self.decode_from_value(tree, dst, short_type_name::<S>())
    }

    /// Decode a source tree produced by a type named `source_type`
    pub fn decode_from_value<D>(&self, tree: Value, dst: &mut D, source_type: &str) -> Result<()>
    where
        D: Mapped + Serialize + DeserializeOwned,
    {
        let shaped = self.shape::<D>(&tree, source_type)?;
        self.hydrate(shaped, dst)
    }

    /// Decode JSON bytes produced by a type named `source_type`
    pub fn decode_from_slice<D>(&self, bytes: &[u8], dst: &mut D, source_type: &str) -> Result<()>
    where
        D: Mapped + Serialize + DeserializeOwned,
    {
        let tree: Value = serde_json::from_slice(bytes)?;
        self.decode_from_value(tree, dst, source_type)
    }

    /// Shape a source tree after `D` without hydrating anything
    pub fn decode_to_value<D: Mapped>(&self, tree: &Value, source_type: &str) -> Result<Value> {
        self.shape::<D>(tree, source_type).map(Value::Object)
    }

    fn shape<D: Mapped>(&self, tree: &Value, source_type: &str) -> Result<Map<String, Value>> {
        let source = tree.as_object().ok_or_else(|| Error::InvalidArgument {
            message: format!(
                "source of type '{}' must serialize to a map, got {}",
                source_type,
                kind_of(tree)
            ),
        })?;
        Decoder::new(source_type, &self.options).run(source, D::record_shape())
    }

    /// Populate `dst` from a name-addressed tree
    ///
    /// Tree keys land on the destination's own keys regardless of ASCII case.
    /// `dst` is only assigned once the whole tree deserialized successfully.
    fn hydrate<D>(&self, tree: Map<String, Value>, dst: &mut D) -> Result<()>
    where
        D: Serialize + DeserializeOwned,
    {
        let image = if self.options.merge_into_destination {
            let mut current = serde_json::to_value(&*dst)?;
            match current {
                Value::Object(ref mut entries) => tree::merge_maps_folding(entries, tree),
                ref other => {
                    return Err(Error::InvalidArgument {
                        message: format!(
                            "destination of type '{}' must serialize to a map, got {}",
                            short_type_name::<D>(),
                            kind_of(other)
                        ),
                    })
                }
            }
            current
        } else {
            Value::Object(tree)
        };

        *dst = serde_json::from_value(image)?;
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}
