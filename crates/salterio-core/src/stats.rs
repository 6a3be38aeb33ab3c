use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ContentRecord;

/// Record counts per classification label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub total: usize,
    /// Cycle or category.
    pub primary: BTreeMap<String, usize>,
    /// Liturgical time or exercise type.
    pub secondary: BTreeMap<String, usize>,
    pub with_readings: usize,
    pub without_link: usize,
}

impl CorpusStats {
    pub fn from_records(records: &[ContentRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            *stats
                .primary
                .entry(record.classification.primary().to_string())
                .or_default() += 1;
            *stats
                .secondary
                .entry(record.classification.secondary().to_string())
                .or_default() += 1;
            if !record.readings.is_empty() {
                stats.with_readings += 1;
            }
            if record.link.is_empty() {
                stats.without_link += 1;
            }
        }
        stats
    }
}
