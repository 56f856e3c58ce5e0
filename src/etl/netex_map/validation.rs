use crate::errors::{EntityRef, Error, Result, TagError, TagErrorKind, TagErrors};

/// A tag a variant cannot be mapped without, and how to tell whether interpretation
/// found it.
pub struct RequiredTag<T> {
    pub tag: &'static str,
    pub present: fn(&T) -> bool,
}

/// Collects every tag problem on one entity so they can be reported together.
#[derive(Debug, Default)]
pub struct TagErrorCollector {
    errors: Vec<TagError>,
}

impl TagErrorCollector {
    pub fn missing(&mut self, tag: &'static str) {
        self.errors.push(TagError {
            tag,
            kind: TagErrorKind::Missing,
        });
    }

    pub fn invalid(&mut self, tag: &'static str, value: &str) {
        self.errors.push(TagError {
            tag,
            kind: TagErrorKind::InvalidValue(value.to_string()),
        });
    }

    pub fn check_required<T>(&mut self, values: &T, required: &[RequiredTag<T>]) {
        for requirement in required {
            if !(requirement.present)(values) {
                self.missing(requirement.tag);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self, entity: EntityRef) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingTags(TagErrors {
                entity,
                errors: self.errors,
            }))
        }
    }
}

/// Required values must be present and non-empty.
pub fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}
