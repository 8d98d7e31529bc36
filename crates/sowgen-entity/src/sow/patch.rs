//! Ordered partial updates.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use sowgen_core::AppError;

use super::field::{SowField, SowFieldName};
use super::status::SowStatus;

/// A partial update to a SOW.
///
/// Fields keep the order in which they were first set, so revision change
/// lists are reproducible for the same input. Presence in the patch is the
/// participation signal: a field set to `None` is a deliberate clear, a
/// field that is absent is left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SowPatch {
    fields: Vec<SowField>,
}

impl SowPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Setting the same field twice keeps its first position
    /// and its last value.
    pub fn set(&mut self, field: SowField) -> &mut Self {
        let name = field.name();
        match self.fields.iter_mut().find(|f| f.name() == name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Builder form of [`SowPatch::set`].
    pub fn with(mut self, field: SowField) -> Self {
        self.set(field);
        self
    }

    /// A patch that only requests a status change.
    pub fn status(status: SowStatus) -> Self {
        Self::new().with(SowField::Status(status))
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &SowField> {
        self.fields.iter()
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The requested status, if the patch carries one.
    pub fn requested_status(&self) -> Option<SowStatus> {
        self.fields.iter().find_map(|f| match f {
            SowField::Status(s) => Some(*s),
            _ => None,
        })
    }

    /// The field value for `name`, if present.
    pub fn get(&self, name: SowFieldName) -> Option<&SowField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Decode a JSON object in key order.
    ///
    /// Unknown and bookkeeping keys (`id`, `version`, `updatedAt`, ...) are
    /// dropped silently; malformed values for tracked keys are rejected.
    pub fn from_json(value: &Value) -> Result<Self, AppError> {
        let object = value
            .as_object()
            .ok_or_else(|| AppError::validation("SOW patch must be a JSON object"))?;

        let mut patch = Self::new();
        for (key, raw) in object {
            if let Some(name) = SowFieldName::from_key(key) {
                patch.set(SowField::decode(name, raw.clone())?);
            }
        }
        Ok(patch)
    }
}

impl<'de> Deserialize<'de> for SowPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SowPatch::from_json(&value).map_err(serde::de::Error::custom)
    }
}
