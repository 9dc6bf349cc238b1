//! Field descriptors
//!
//! A descriptor binds one annotated field to the type restraint of the
//! current call (the concrete type name of the opposite endpoint) and decides
//! whether the field takes part and under which path.

use crate::annotation::{Annotation, Target};
use crate::error::{Error, Result, PER_TYPE_PATH_NOT_VALID};
use crate::path::Path;
use crate::record::{FieldKind, FieldShape};
use std::sync::Arc;

/// Resolved decision for one field in one mapping call
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    field: &'static FieldShape,
    annotation: Arc<Annotation>,
    path: Option<Path>,
}

impl FieldDescriptor {
    /// Resolve `field` against `type_restraint`
    ///
    /// Returns `Ok(None)` when the field is type-gated and no clause names the
    /// restraint.
    pub fn resolve(field: &'static FieldShape, type_restraint: &str) -> Result<Option<Self>> {
        let annotation = Annotation::cached(field.tag)?;

        if annotation.has_override_paths() && annotation.target() != &Target::MultiType {
            return Err(Error::configuration(PER_TYPE_PATH_NOT_VALID, field.name));
        }

        let override_path = if annotation.is_type_gated() {
            match annotation.find_type_match(type_restraint) {
                Some(matched) => matched.path.clone(),
                None => {
                    log::trace!(
                        "Skipping field '{}': not gated for type '{}'",
                        field.name,
                        type_restraint
                    );
                    return Ok(None);
                }
            }
        } else {
            None
        };

        let path = match annotation.target() {
            Target::DismissNesting => None,
            Target::Path(path) => Some(path.clone()),
            Target::MultiType => Some(override_path.ok_or_else(|| {
                Error::configuration(
                    format!(
                        "main path '+' requires a per-type path for type '{}'",
                        type_restraint
                    ),
                    field.name,
                )
            })?),
        };

        Ok(Some(Self {
            field,
            annotation,
            path,
        }))
    }

    /// Serde key of the field
    pub fn name(&self) -> &'static str {
        self.field.name
    }

    pub fn kind(&self) -> FieldKind {
        self.field.kind
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Effective path, `None` when the field dismisses nesting
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn dismisses_nesting(&self) -> bool {
        self.path.is_none()
    }

    /// Effective path placed under `prefix`
    pub fn path_under(&self, prefix: &Path) -> Option<Path> {
        self.path.as_ref().map(|path| prefix.join(path))
    }
}
