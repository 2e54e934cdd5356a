//! Annotation and label mapping types
//!
//! An annotation mapping assigns each video identifier an integer label code. A label
//! mapping resolves codes to human-readable action names. Both are stored as JSON
//! objects; label codes are JSON object keys and therefore arrive as strings.

use crate::error::{AugmentError, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Integer action label code
pub type LabelCode = i64;

/// Video identifier to label code, in file order
pub type AnnotationMap = IndexMap<String, LabelCode>;

/// Label code to label name
pub type LabelMap = BTreeMap<LabelCode, String>;

/// Convert the raw string-keyed JSON object into a [`LabelMap`].
pub fn parse_label_keys<I>(raw: I) -> Result<LabelMap>
where
    I: IntoIterator<Item = (String, String)>,
{
    raw.into_iter()
        .map(|(key, name)| {
            key.trim()
                .parse::<LabelCode>()
                .map(|code| (code, name))
                .map_err(|_| AugmentError::InvalidLabelKey(key))
        })
        .collect()
}

/// Resolve the label name for one annotation entry.
///
/// A code absent from `labels` is fatal for every caller, so the error carries the
/// video id for diagnostics.
pub fn resolve_label<'a>(
    labels: &'a LabelMap,
    video_id: &str,
    code: LabelCode,
) -> Result<&'a str> {
    labels
        .get(&code)
        .map(String::as_str)
        .ok_or_else(|| AugmentError::UnknownLabel {
            video_id: video_id.to_string(),
            code,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_keys() {
        let raw = vec![
            ("0".to_string(), "block".to_string()),
            (" 7".to_string(), "dribble".to_string()),
        ];
        let labels = parse_label_keys(raw).unwrap();
        assert_eq!(labels.get(&0).map(String::as_str), Some("block"));
        assert_eq!(labels.get(&7).map(String::as_str), Some("dribble"));
    }

    #[test]
    fn test_parse_label_keys_rejects_non_integer() {
        let raw = vec![("shoot".to_string(), "shoot".to_string())];
        let err = parse_label_keys(raw).unwrap_err();
        assert!(matches!(err, AugmentError::InvalidLabelKey(ref k) if k == "shoot"));
    }

    #[test]
    fn test_resolve_label_unknown_code() {
        let labels = LabelMap::from([(1, "pass".to_string())]);
        assert_eq!(resolve_label(&labels, "v1", 1).unwrap(), "pass");

        let err = resolve_label(&labels, "v2", 9).unwrap_err();
        assert!(matches!(
            err,
            AugmentError::UnknownLabel { ref video_id, code: 9 } if video_id == "v2"
        ));
    }
}
