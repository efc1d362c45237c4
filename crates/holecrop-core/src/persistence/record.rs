//! The six-scalar exchange record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::transform::AffineTransform;

/// Field names of the exchange record, in coefficient order.
pub const RECORD_FIELDS: [&str; 6] = ["a", "b", "c", "d", "tx", "ty"];

/// What to do with a stored record that has only some of its six fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialRecordPolicy {
    /// Missing `a` and `d` become 1, the others 0.
    #[default]
    FillDefaults,
    /// Treat the record as absent.
    Reject,
}

/// A transform as stored or handed to the host.
///
/// Every field is optional so that records written by other producers can
/// be read back; [`TransformRecord::resolve`] decides what a partial record
/// means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<f64>,
}

impl TransformRecord {
    pub fn from_transform(transform: &AffineTransform) -> Self {
        Self::from_fields(transform.as_coeffs().map(Some))
    }

    fn fields(&self) -> [Option<f64>; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    fn from_fields(fields: [Option<f64>; 6]) -> Self {
        let [a, b, c, d, tx, ty] = fields;
        Self { a, b, c, d, tx, ty }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(Option::is_none)
    }

    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(Option::is_some)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        RECORD_FIELDS
            .iter()
            .zip(self.fields())
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// The record as a flat map containing only the present fields.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        RECORD_FIELDS
            .iter()
            .zip(self.fields())
            .filter_map(|(name, v)| v.map(|v| (name.to_string(), v)))
            .collect()
    }

    /// Build a record from a flat map. Unknown keys are ignored.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Self {
        Self::from_fields(RECORD_FIELDS.map(|name| map.get(name).copied()))
    }

    /// The transform this record describes, if any.
    ///
    /// Empty records, partial records under [`PartialRecordPolicy::Reject`],
    /// and records yielding a non-finite or singular matrix give `None`.
    pub fn resolve(&self, policy: PartialRecordPolicy) -> Option<AffineTransform> {
        if self.is_empty() {
            return None;
        }

        if !self.is_complete() {
            let missing = self.missing_fields();
            match policy {
                PartialRecordPolicy::Reject => {
                    log::warn!("rejecting partial transform record, missing {:?}", missing);
                    return None;
                }
                PartialRecordPolicy::FillDefaults => {
                    log::warn!("filling defaults for partial transform record, missing {:?}", missing);
                }
            }
        }

        let identity = AffineTransform::IDENTITY.as_coeffs();
        let fields = self.fields();
        let transform =
            AffineTransform::from_coeffs(std::array::from_fn(|i| fields[i].unwrap_or(identity[i])));

        if transform.inverse().is_none() {
            log::warn!("ignoring stored transform that is singular or not finite: {:?}", transform);
            return None;
        }
        Some(transform)
    }
}

impl From<AffineTransform> for TransformRecord {
    fn from(transform: AffineTransform) -> Self {
        Self::from_transform(&transform)
    }
}
