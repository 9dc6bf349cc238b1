//! Structmap Core - path-addressed transcoding between record schemas
//!
//! This crate converts values between two differently shaped records by
//! routing each annotated field through a dotted path expression. The source
//! side is flattened into a path-addressed tree, the destination side is
//! rebuilt from that tree, and serde does the generic work at both ends.
//!
//! # Main Components
//!
//! - **Paths**: dotted paths with `name[index]` segments ([`Path`])
//! - **Annotations**: the `#[sm("...")]` tag grammar ([`Annotation`])
//! - **Descriptors**: per-call resolution of type gates and per-type paths
//! - **Tree accessor**: get/set into the intermediate tree ([`tree`])
//! - **Encoder / Decoder**: record to tree and tree to destination shape
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use structmap_core::Mapped;
//!
//! #[derive(Mapped, Serialize, Deserialize, Default)]
//! #[serde(default)]
//! struct Internal {
//!     #[sm("metadata.name")]
//!     name: String,
//!     #[sm("+,types<Deployment:spec.replicas|Job:spec.parallelism>")]
//!     workers: i64,
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! #[serde(default)]
//! struct Metadata {
//!     name: String,
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! #[serde(default)]
//! struct Spec {
//!     replicas: i64,
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! #[serde(default)]
//! struct Deployment {
//!     metadata: Metadata,
//!     spec: Spec,
//! }
//!
//! # fn main() -> structmap_core::Result<()> {
//! let internal = Internal { name: "web".to_string(), workers: 3 };
//! let mut deployment = Deployment::default();
//! structmap_core::encode(&internal, &mut deployment)?;
//! assert_eq!(deployment.spec.replicas, 3);
//!
//! let mut back = Internal::default();
//! structmap_core::decode(&deployment, &mut back)?;
//! assert_eq!(back.name, "web");
//! # Ok(())
//! # }
//! ```

extern crate self as structmap_core;

pub mod annotation;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod mapper;
pub mod options;
pub mod path;
pub mod record;
pub mod tree;


pub use annotation::{Annotation, Target, TypeMatch};
pub use decoder::Decoder;
pub use descriptor::FieldDescriptor;
pub use encoder::Encoder;
pub use error::{Error, Result, PER_TYPE_PATH_NOT_VALID};
pub use mapper::Mapper;
pub use options::MapperOptions;
pub use path::{Path, Segment, DISMISS_NESTING, MULTI_TYPE};
pub use record::{
    short_type_name, FieldKind, FieldShape, FieldValue, Mapped, Record, Shape, ToTree,
};

#[cfg(feature = "derive")]
pub use structmap_derive::Mapped;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Attribute key recognized on record fields
pub const FIELD_TAG_KEY: &str = "sm";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Route the annotated fields of `src` into `dst` with default options
pub fn encode<S, D>(src: &S, dst: &mut D) -> Result<()>
where
    S: Record,
    D: Serialize + DeserializeOwned,
{
    Mapper::default().encode(src, dst)
}

/// Pull the annotated fields of `dst` out of `src` with default options
pub fn decode<S, D>(src: &S, dst: &mut D) -> Result<()>
where
    S: Serialize + ?Sized,
    D: Mapped + Serialize + DeserializeOwned,
{
    Mapper::default().decode(src, dst)
}

/// Alias of [`encode`]
pub fn marshal<S, D>(src: &S, dst: &mut D) -> Result<()>
where
    S: Record,
    D: Serialize + DeserializeOwned,
{
    encode(src, dst)
}

/// Alias of [`decode`]
pub fn unmarshal<S, D>(src: &S, dst: &mut D) -> Result<()>
where
    S: Serialize + ?Sized,
    D: Mapped + Serialize + DeserializeOwned,
{
    decode(src, dst)
}

/// Build the path-addressed tree of `src` for a target named `target_type`
pub fn encode_to_value<S>(src: &S, target_type: &str) -> Result<Value>
where
    S: Record,
{
    Mapper::default().encode_to_value(src, target_type)
}

/// Build the path-addressed tree of `src` as JSON bytes
pub fn encode_to_vec<S>(src: &S, target_type: &str) -> Result<Vec<u8>>
where
    S: Record,
{
    Mapper::default().encode_to_vec(src, target_type)
}

/// Decode a tree produced by a type named `source_type` into `dst`
pub fn decode_from_value<D>(tree: Value, dst: &mut D, source_type: &str) -> Result<()>
where
    D: Mapped + Serialize + DeserializeOwned,
{
    Mapper::default().decode_from_value(tree, dst, source_type)
}

/// Decode JSON bytes produced by a type named `source_type` into `dst`
pub fn decode_from_slice<D>(bytes: &[u8], dst: &mut D, source_type: &str) -> Result<()>
where
    D: Mapped + Serialize + DeserializeOwned,
{
    Mapper::default().decode_from_slice(bytes, dst, source_type)
}

/// Shape a tree produced by a type named `source_type` after `D`
pub fn decode_to_value<D: Mapped>(tree: &Value, source_type: &str) -> Result<Value> {
    Mapper::default().decode_to_value::<D>(tree, source_type)
}
