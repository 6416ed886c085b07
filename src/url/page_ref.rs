/// Page reference: the path and ordered query of a listing page
///
/// The walker builds one from the starting location and then only ever
/// rewrites the page-number parameter.
use url::Url;

/// Path plus ordered query parameters of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    path: String,
    query: Vec<(String, String)>,
}

impl PageRef {
    /// Creates a page reference from a path and query pairs
    pub fn new(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Captures the path and decoded query pairs of a URL, in order
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use vndb_export::url::PageRef;
    ///
    /// let url = Url::parse("https://vndb.org/u2/ulist?l=7&p=3").unwrap();
    /// let page = PageRef::from_url(&url);
    /// assert_eq!(page.path(), "/u2/ulist");
    /// assert_eq!(page.get("p"), Some("3"));
    /// ```
    pub fn from_url(url: &Url) -> Self {
        Self {
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the first value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.query.iter().any(|(k, _)| k == key)
    }

    /// Sets `key` to `value`
    ///
    /// The first existing entry keeps its position and any duplicates are
    /// dropped; a new key is appended at the end.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.query.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.query[index].1 = value;
                let mut seen = 0;
                self.query.retain(|(k, _)| {
                    if k == key {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.query.push((key.to_string(), value)),
        }
    }

    /// Removes every entry stored under `key`
    pub fn remove(&mut self, key: &str) {
        self.query.retain(|(k, _)| k != key);
    }

    /// Builds the absolute URL of this page on `host`
    ///
    /// Query pairs are form-encoded in their stored order; an empty query
    /// produces no `?`.
    pub fn to_url(&self, host: &Url) -> Url {
        let mut url = host.clone();
        url.set_path(&self.path);
        url.set_query(None);
        url.set_fragment(None);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> Url {
        Url::parse("https://vndb.org").unwrap()
    }

    #[test]
    fn test_from_url_keeps_query_order() {
        let url = Url::parse("https://vndb.org/u2/ulist?s=title&l=7&o=a").unwrap();
        let page = PageRef::from_url(&url);
        let keys: Vec<&str> = page.query().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["s", "l", "o"]);
    }

    #[test]
    fn test_set_appends_new_key() {
        let mut page = PageRef::new("/u2/ulist", vec![("l".into(), "7".into())]);
        page.set("p", "2");
        assert_eq!(page.to_url(&host()).as_str(), "https://vndb.org/u2/ulist?l=7&p=2");
    }

    #[test]
    fn test_set_replaces_in_place_and_drops_duplicates() {
        let mut page = PageRef::new(
            "/u2/ulist",
            vec![
                ("p".into(), "1".into()),
                ("l".into(), "7".into()),
                ("p".into(), "9".into()),
            ],
        );
        page.set("p", "4");
        assert_eq!(
            page.query(),
            &[("p".to_string(), "4".to_string()), ("l".to_string(), "7".to_string())]
        );
    }

    #[test]
    fn test_remove_and_has() {
        let url = Url::parse("https://vndb.org/u2/ulist?vnlist=1&p=5").unwrap();
        let mut page = PageRef::from_url(&url);
        assert!(page.has("p"));
        page.remove("p");
        assert!(!page.has("p"));
        assert!(page.has("vnlist"));
        assert_eq!(page.get("vnlist"), Some("1"));
    }

    #[test]
    fn test_to_url_without_query() {
        let page = PageRef::new("/u2/lengthvotes", vec![]);
        assert_eq!(page.to_url(&host()).as_str(), "https://vndb.org/u2/lengthvotes");
    }

    #[test]
    fn test_to_url_encodes_values() {
        let page = PageRef::new("/u2/ulist", vec![("q".into(), "a b&c".into())]);
        assert_eq!(page.to_url(&host()).as_str(), "https://vndb.org/u2/ulist?q=a+b%26c");
    }

    #[test]
    fn test_to_url_ignores_host_path_and_query() {
        let host = Url::parse("http://127.0.0.1:4000/ignored?x=1#frag").unwrap();
        let page = PageRef::new("/u2/ulist", vec![("p".into(), "2".into())]);
        assert_eq!(page.to_url(&host).as_str(), "http://127.0.0.1:4000/u2/ulist?p=2");
    }
}
