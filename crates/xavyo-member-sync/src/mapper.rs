//! Field mapper between directory attributes and local record fields.

use std::collections::BTreeMap;

use tracing::trace;

use xavyo_directory::{AttributeSet, AttributeValue};

use crate::member::MemberRecord;
use crate::policy::FieldMapping;

/// Translates directory attributes to local fields and back.
///
/// Both directions are pure and driven only by the mapping table. Attributes
/// or fields without a mapping are ignored, and absent source values produce
/// absent entries.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    mappings: Vec<FieldMapping>,
}

impl FieldMapper {
    /// Create a mapper. When a directory attribute appears more than once the
    /// first entry wins; `SyncPolicy::validate` rejects such tables up front.
    #[must_use]
    pub fn new(mappings: Vec<FieldMapping>) -> Self {
        let mut unique: Vec<FieldMapping> = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let duplicate = unique.iter().any(|m| {
                m.directory_attribute
                    .eq_ignore_ascii_case(&mapping.directory_attribute)
            });
            if !duplicate {
                unique.push(mapping);
            }
        }
        Self { mappings: unique }
    }

    /// The mapping table in configured order.
    #[must_use]
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Local field for a directory attribute, if mapped.
    #[must_use]
    pub fn local_field_for(&self, directory_attribute: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.directory_attribute.eq_ignore_ascii_case(directory_attribute))
            .map(|m| m.local_field.as_str())
    }

    /// Map directory attributes to local field values.
    ///
    /// Multi-valued attributes contribute their first value. Binary mappings
    /// are left out; see [`FieldMapper::binary_fields`].
    #[must_use]
    pub fn to_local_fields(&self, attributes: &AttributeSet) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for mapping in self.mappings.iter().filter(|m| !m.is_binary()) {
            let Some(value) = attributes
                .get_ignore_case(&mapping.directory_attribute)
                .and_then(AttributeValue::first)
            else {
                continue;
            };
            if let Some(text) = value.to_text() {
                fields.insert(mapping.local_field.clone(), text);
            } else {
                trace!(
                    attribute = %mapping.directory_attribute,
                    "Skipping non-text attribute value"
                );
            }
        }
        fields
    }

    /// Binary mappings (e.g. `thumbnailPhoto`) present in `attributes`,
    /// paired with their local field.
    #[must_use]
    pub fn binary_fields<'a>(&'a self, attributes: &'a AttributeSet) -> Vec<(&'a str, &'a [u8])> {
        self.mappings
            .iter()
            .filter(|m| m.is_binary())
            .filter_map(|mapping| {
                let bytes = attributes
                    .get_ignore_case(&mapping.directory_attribute)
                    .and_then(AttributeValue::first)
                    .and_then(AttributeValue::as_binary)?;
                Some((mapping.local_field.as_str(), bytes))
            })
            .collect()
    }

    /// Map local record fields to directory attributes.
    ///
    /// Binary mappings are skipped: their local field holds the path of the
    /// stored file, not the directory value.
    #[must_use]
    pub fn to_directory_attributes(&self, record: &MemberRecord) -> AttributeSet {
        let mut attributes = AttributeSet::new();
        for mapping in self.mappings.iter().filter(|m| !m.is_binary()) {
            if let Some(value) = record.field(&mapping.local_field) {
                attributes.set(mapping.directory_attribute.clone(), value);
            }
        }
        attributes
    }

    /// Local fields that management UI must render read-only for `record`.
    ///
    /// Directory-managed records own their mapped fields unless write-back is
    /// enabled, and their binary fields always; local-only records own nothing
    /// from the directory.
    #[must_use]
    pub fn read_only_fields(&self, record: &MemberRecord, write_back: bool) -> Vec<&str> {
        if !record.is_directory_managed() {
            return Vec::new();
        }
        self.mappings
            .iter()
            .filter(|m| !write_back || m.is_binary())
            .map(|m| m.local_field.as_str())
            .collect()
    }
}
