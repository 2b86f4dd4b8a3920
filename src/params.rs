//! Route parameter extraction and query string parsing
//!
//! This module provides types for values bound by route patterns (like `:id`
//! or `*rest`) and for query strings (like `?page=1&sort=name`).

use std::collections::HashMap;

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use waypoint::RouteParams;
///
/// // Route pattern: /users/:id
/// // Matched path: /users/123
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), "123".to_string());
///
/// assert_eq!(params.get("id"), Some(&"123".to_string()));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from hashmap
    pub fn from_map(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Get a parameter value as a string
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter
    pub fn insert(&mut self, key: String, value: String) {
        self.params.insert(key, value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get all parameters as a reference to the HashMap
    pub fn all(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Iterate over all parameters
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.params.iter()
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from a URL query string
///
/// Supports multiple values for the same key.
///
/// # Example
///
/// ```
/// use waypoint::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&sort=name&tag=rust&tag=router");
///
/// assert_eq!(query.get("page"), Some(&"1".to_string()));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from query string
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint::QueryParams;
    ///
    /// let query = QueryParams::from_query_string("page=1&sort=name");
    /// assert_eq!(query.get("page"), Some(&"1".to_string()));
    /// ```
    pub fn from_query_string(query: &str) -> Self {
        let mut params = HashMap::new();

        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                let key = decode_uri_component(key);
                let value = decode_uri_component(value);

                params.entry(key).or_insert_with(Vec::new).push(value);
            }
        }

        Self { params }
    }

    /// Get first value for a parameter
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)?.first()
    }

    /// Get all values for a parameter
    ///
    /// Useful for parameters that can appear multiple times like `?tag=a&tag=b`
    pub fn get_all(&self, key: &str) -> Option<&Vec<String>> {
        self.params.get(key)
    }

    /// Get parameter as a specific type
    ///
    /// Returns the first value parsed as type T.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Insert a parameter
    ///
    /// If the key already exists, the value is appended to the list.
    pub fn insert(&mut self, key: String, value: String) {
        self.params.entry(key).or_default().push(value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Convert to query string
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<String> = self
            .params
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |value| {
                    format!(
                        "{}={}",
                        encode_uri_component(key),
                        encode_uri_component(value)
                    )
                })
            })
            .collect();

        pairs.join("&")
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of unique parameter keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Simple URI component encoding
///
/// Unreserved characters pass through; everything else is percent-encoded
/// byte by byte, so multi-byte UTF-8 characters become escape sequences like
/// `%E2%82%AC`.
pub(crate) fn encode_uri_component(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }

    result
}

/// Simple URI component decoding
///
/// Percent escapes are decoded into a byte buffer first so multi-byte UTF-8
/// sequences reassemble correctly; invalid sequences are replaced rather than
/// rejected.
pub(crate) fn decode_uri_component(s: &str) -> String {
    let mut bytes = Vec::with_capacity(s.len());
    let mut input = s.bytes();

    while let Some(b) = input.next() {
        if b == b'%' {
            let hex: Vec<u8> = input.by_ref().take(2).collect();
            match std::str::from_utf8(&hex)
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok())
            {
                Some(byte) if hex.len() == 2 => bytes.push(byte),
                _ => {
                    // Malformed escape: keep it verbatim
                    bytes.push(b'%');
                    bytes.extend_from_slice(&hex);
                }
            }
        } else if b == b'+' {
            bytes.push(b' ');
        } else {
            bytes.push(b);
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id".to_string(), "123".to_string());

        assert_eq!(params.get("id"), Some(&"123".to_string()));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let mut params = RouteParams::new();
        params.insert("id".to_string(), "123".to_string());
        params.insert("active".to_string(), "true".to_string());

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<u32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_from_map() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "John".to_string());
        map.insert("age".to_string(), "30".to_string());

        let params = RouteParams::from_map(map);

        assert_eq!(params.get("name"), Some(&"John".to_string()));
        assert_eq!(params.get_as::<i32>("age"), Some(30));
    }

    #[test]
    fn test_route_params_empty() {
        let params = RouteParams::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);

        let mut params = RouteParams::new();
        params.insert("key".to_string(), "value".to_string());
        assert!(!params.is_empty());
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_query_params_basic() {
        let query = QueryParams::from_query_string("page=1&sort=name&filter=active");

        assert_eq!(query.get("page"), Some(&"1".to_string()));
        assert_eq!(query.get("sort"), Some(&"name".to_string()));
        assert_eq!(query.get("filter"), Some(&"active".to_string()));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn test_query_params_multiple_values() {
        let query = QueryParams::from_query_string("tag=rust&tag=router&tag=ui");

        let tags = query.get_all("tag").unwrap();
        assert_eq!(tags.len(), 3);
        assert!(tags.contains(&"rust".to_string()));

        // get() returns first value
        assert_eq!(query.get("tag"), Some(&"rust".to_string()));
    }

    #[test]
    fn test_query_params_insert_appends() {
        let mut query = QueryParams::new();
        query.insert("key".to_string(), "value1".to_string());
        query.insert("key".to_string(), "value2".to_string());

        let values = query.get_all("key").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], "value1");
        assert_eq!(values[1], "value2");
    }

    #[test]
    fn test_uri_encoding() {
        let encoded = encode_uri_component("hello world");
        assert_eq!(encoded, "hello%20world");

        let encoded = encode_uri_component("test@example.com");
        assert!(encoded.contains("%40"));
    }

    #[test]
    fn test_uri_decoding() {
        let decoded = decode_uri_component("hello%20world");
        assert_eq!(decoded, "hello world");

        let decoded = decode_uri_component("hello+world");
        assert_eq!(decoded, "hello world");
    }

    #[test]
    fn test_uri_codec_multibyte_utf8() {
        // Multi-byte escapes must reassemble into whole characters, not
        // one code point per byte.
        assert_eq!(decode_uri_component("%E2%82%AC"), "€");
        assert_eq!(decode_uri_component("caf%C3%A9"), "café");

        assert_eq!(encode_uri_component("€"), "%E2%82%AC");
        assert_eq!(decode_uri_component(&encode_uri_component("héllo wörld")), "héllo wörld");
    }

    #[test]
    fn test_uri_decoding_malformed_escape_kept_verbatim() {
        assert_eq!(decode_uri_component("100%"), "100%");
        assert_eq!(decode_uri_component("%2"), "%2");
        assert_eq!(decode_uri_component("%zz"), "%zz");
    }

    #[test]
    fn test_to_query_string_round_trip() {
        let mut query = QueryParams::new();
        query.insert("page".to_string(), "1".to_string());
        query.insert("sort".to_string(), "name".to_string());

        let s = query.to_query_string();
        // Order may vary, check both keys are present
        assert!(s.contains("page=1"));
        assert!(s.contains("sort=name"));
    }

    #[test]
    fn test_empty_query_string() {
        let query = QueryParams::from_query_string("");
        assert!(query.is_empty());
    }
}
