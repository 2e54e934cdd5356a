//! Label frequency counting and under-represented class selection

use crate::annotations::{resolve_label, AnnotationMap, LabelMap};
use crate::error::Result;
use std::collections::{BTreeSet, HashMap};

/// Classes at or below this many examples are augmented by default
pub const DEFAULT_THRESHOLD: usize = 2000;

/// Number of annotated videos per label name
///
/// Counts are keyed by resolved name, so two codes sharing a name are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFrequencies {
    counts: HashMap<String, usize>,
}

impl LabelFrequencies {
    /// Count every annotation entry by its label name.
    pub fn count(annotations: &AnnotationMap, labels: &LabelMap) -> Result<Self> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for (video_id, &code) in annotations {
            let name = resolve_label(labels, video_id, code)?;
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
        Ok(Self { counts })
    }

    /// Count for a single label name (zero when absent)
    pub fn get(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Number of distinct label names seen
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Label names with their counts, ascending by count then by name
    pub fn sorted_ascending(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Names whose count is `<= threshold`
    pub fn at_or_below(&self, threshold: usize) -> BTreeSet<String> {
        self.counts
            .iter()
            .filter(|(_, count)| **count <= threshold)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Select the label names that need augmentation.
pub fn select_under_represented(
    annotations: &AnnotationMap,
    labels: &LabelMap,
    threshold: usize,
) -> Result<BTreeSet<String>> {
    let frequencies = LabelFrequencies::count(annotations, labels)?;
    let selected = frequencies.at_or_below(threshold);

    tracing::debug!(
        labels = frequencies.len(),
        selected = selected.len(),
        threshold,
        "Selected under-represented labels"
    );

    Ok(selected)
}
