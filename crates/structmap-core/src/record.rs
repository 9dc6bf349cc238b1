//! Record shapes and field capabilities
//!
//! Mapped records describe their annotated fields through a static [`Shape`]
//! (used when decoding, no instance required) and expose per-instance field
//! values through [`Record::values`] (used when encoding). Both are normally
//! generated by `#[derive(Mapped)]`.

use serde::Serialize;
use serde_json::Value;

/// Static description of a mapped record
#[derive(Debug)]
pub struct Shape {
    /// Short type name, matched against `types<...>` clauses of peers
    pub type_name: &'static str,
    /// Annotated fields in declaration order
    pub fields: &'static [FieldShape],
}

/// Static description of one annotated field
#[derive(Debug)]
pub struct FieldShape {
    /// Serde key of the field in the record's own serialized form
    pub name: &'static str,
    /// Raw annotation tag
    pub tag: &'static str,
    pub kind: FieldKind,
}

/// Capability of a field, known without an instance
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Scalar, sequence of scalars, map or any plain serde value
    Value,
    /// Nested record, `optional` when declared as `Option<T>`
    Record {
        shape: fn() -> &'static Shape,
        optional: bool,
    },
    /// Sequence of nested records
    Records { shape: fn() -> &'static Shape },
}

/// Capability of a field on a concrete instance
pub enum FieldValue<'a> {
    Value(&'a dyn ToTree),
    /// `None` for an unset optional record
    Record(Option<&'a dyn Record>),
    Records(Vec<&'a dyn Record>),
}

/// Conversion of a plain field value into a tree value
pub trait ToTree {
    fn to_tree(&self) -> serde_json::Result<Value>;
}

impl<T: Serialize + ?Sized> ToTree for T {
    fn to_tree(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Object-safe view of a mapped record instance
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a mapped record",
    note = "derive `Mapped` for `{Self}`, or mark the field `#[sm(\"...\", opaque)]` to map it as a plain serde value"
)]
pub trait Record {
    fn shape(&self) -> &'static Shape;

    /// Field values in the order of `shape().fields`
    fn values(&self) -> Vec<FieldValue<'_>>;
}

/// A record whose shape is known statically
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a mapped record",
    note = "derive `Mapped` for `{Self}`, or mark the field `#[sm(\"...\", opaque)]` to map it as a plain serde value"
)]
pub trait Mapped: Record {
    fn record_shape() -> &'static Shape
    where
        Self: Sized;

    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        Self::record_shape().type_name
    }
}

/// Pointer types looked through when naming a type
const POINTER_WRAPPERS: [&str; 3] = ["Box", "Rc", "Arc"];

/// Short name of a Rust type as matched by `types<...>` clauses
///
/// `app::api::ApiObject<T>` becomes `ApiObject`. References and the
/// `Box`/`Rc`/`Arc` pointers are looked through.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let mut full = std::any::type_name::<T>();
    loop {
        full = full.trim_start_matches('&');
        full = full.strip_prefix("mut ").unwrap_or(full);
        let base = full.split('<').next().unwrap_or(full);
        let short = base.rsplit("::").next().unwrap_or(base);

        let inner = full
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('<'))
            .and_then(|rest| rest.strip_suffix('>'));
        match inner {
            Some(inner) if POINTER_WRAPPERS.contains(&short) => full = inner,
            _ => return short,
        }
    }
}
