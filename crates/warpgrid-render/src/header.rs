/// Header name used for the resolved media type.
pub const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    name: String,
    value: String,
}

/// Response headers in insertion order, one value per name.
///
/// Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<Header>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing any earlier value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.entries.push(Header { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_case_insensitive() {
        let mut map = HeaderMap::new();
        map.set(CONTENT_TYPE, "text/html");
        assert_eq!(map.get("content-type"), Some("text/html"));
        assert_eq!(map.get("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(map.get("x-missing"), None);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut map = HeaderMap::new();
        map.set("X-First", "1");
        map.set("content-type", "text/plain");
        map.set("X-Last", "2");

        map.set(CONTENT_TYPE, "text/html; charset=utf-8");

        assert_eq!(map.len(), 3);
        assert_eq!(map.entries[1].name, "content-type");
        assert_eq!(map.get(CONTENT_TYPE), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn empty_map() {
        let map = HeaderMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
