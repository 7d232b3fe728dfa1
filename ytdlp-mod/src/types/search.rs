use serde::Serialize;
use serde_json::Value;

use super::info::{ExtractedInfo, StreamCandidate};
use super::validate::{ValidationError, Validator};

/// Delivery protocols that download as a single progressive file.
pub const PREFERRED_PROTOCOLS: [&str; 2] = ["https", "http"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchExtractedInfo {
    entries: Vec<ExtractedInfo>
}

impl SearchExtractedInfo {
    pub fn new(entries: Vec<ExtractedInfo>) -> Self {
        Self { entries }
    }

    /// Validates at most `limit` raw results, keeping their order.
    pub fn from_values(values: &[Value], limit: usize) -> Result<Self, ValidationError> {
        let mut validator = Validator::new();
        let entries: Vec<ExtractedInfo> = values
            .iter()
            .take(limit)
            .enumerate()
            .filter_map(|(i, value)| ExtractedInfo::read(&mut validator, value, &format!("entries[{i}]")))
            .collect();
        validator.finish(Some(Self { entries }))
    }

    /// Drops entries with no stream over a preferred protocol, e.g. live
    /// items that only offer HLS or DASH fragments.
    #[must_use]
    pub fn filter_best_protocol(self) -> Self {
        let before = self.entries.len();
        let entries: Vec<ExtractedInfo> = self
            .entries
            .into_iter()
            .filter(|info| info.formats.iter().any(uses_preferred_protocol))
            .collect();
        tracing::debug!(before, after = entries.len(), "filtered search results by protocol");
        Self { entries }
    }

    pub fn entries(&self) -> &[ExtractedInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedInfo> {
        self.entries.iter()
    }
}

impl IntoIterator for SearchExtractedInfo {
    type Item = ExtractedInfo;
    type IntoIter = std::vec::IntoIter<ExtractedInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchExtractedInfo {
    type Item = &'a ExtractedInfo;
    type IntoIter = std::slice::Iter<'a, ExtractedInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn uses_preferred_protocol(candidate: &StreamCandidate) -> bool {
    candidate
        .protocol
        .as_deref()
        .is_some_and(|protocol| PREFERRED_PROTOCOLS.contains(&protocol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(id: &str, protocols: &[&str]) -> Value {
        let formats: Vec<Value> = protocols
            .iter()
            .enumerate()
            .map(|(i, protocol)| json!({"format_id": i.to_string(), "ext": "mp4", "protocol": protocol}))
            .collect();
        json!({"id": id, "title": format!("video {id}"), "formats": formats})
    }

    #[test]
    fn test_limit_preserves_order() {
        let values: Vec<Value> = ["a", "b", "c", "d", "e"].iter().map(|id| raw(id, &["https"])).collect();
        let results = SearchExtractedInfo::from_values(&values, 2).unwrap();
        assert_eq!(results.len(), 2);
        let ids: Vec<&str> = results.iter().map(|info| info.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_entries_past_limit_not_validated() {
        let values = vec![raw("a", &["https"]), json!({"title": 1})];
        assert_eq!(SearchExtractedInfo::from_values(&values, 1).unwrap().len(), 1);

        let err = SearchExtractedInfo::from_values(&values, 2).unwrap_err();
        let paths: Vec<&str> = err.paths().collect();
        assert_eq!(paths, vec!["entries[1].id", "entries[1].formats"]);
    }

    #[test]
    fn test_filter_best_protocol() {
        let values = vec![
            raw("live", &["m3u8_native", "m3u8_native"]),
            raw("mixed", &["m3u8_native", "https"]),
            raw("empty", &[]),
            raw("plain", &["http"])
        ];
        let results = SearchExtractedInfo::from_values(&values, 10).unwrap().filter_best_protocol();
        let ids: Vec<&str> = results.iter().map(|info| info.id.as_str()).collect();
        assert_eq!(ids, vec!["mixed", "plain"]);
    }

    #[test]
    fn test_everything_filtered_is_empty_not_error() {
        let values = vec![raw("live", &["m3u8_native"])];
        let results = SearchExtractedInfo::from_values(&values, 5).unwrap().filter_best_protocol();
        assert!(results.is_empty());
    }
}
