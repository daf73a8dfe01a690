use serde::ser::{Serialize, SerializeMap, Serializer};

/// Raw tags one catalog returned for an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTags {
    pub source: String,
    pub tags: Vec<String>,
}

/// Per-source raw results, in the fixed adapter order.
///
/// Only sources that returned at least one tag are present. Serializes as a
/// JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceResults(Vec<SourceTags>);

impl SourceResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source's tags. Empty tag lists are ignored.
    pub fn push(&mut self, source: impl Into<String>, tags: Vec<String>) {
        if !tags.is_empty() {
            self.0.push(SourceTags {
                source: source.into(),
                tags,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the tags reported by `source`, if it contributed any.
    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.tags.as_slice())
    }

    /// Source names in adapter order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.source.as_str())
    }

    /// All raw tags concatenated in adapter order.
    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|entry| entry.tags.iter().map(String::as_str))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceTags> {
        self.0.iter()
    }
}

impl Serialize for SourceResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.source, &entry.tags)?;
        }
        map.end()
    }
}
