//! Query string parsing.
//!
//! # Format
//! ```text
//! a=1&a=2          repeated keys keep every value, in order
//! m[k]=v&m[j]=w    bracketed sub-keys build a map under "m"
//! flag             key without '=' has an empty value
//! ```
//!
//! # Design Decisions
//! - `+` decodes to a space (form encoding)
//! - Malformed escapes pass through literally; one bad pair never fails the parse

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Parsed query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
    // Keys in first-seen order, for binding and display.
    order: Vec<String>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        let mut params = Self::default();
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        for pair in raw.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key);
            if key.is_empty() {
                continue;
            }
            params.push(key.into_owned(), decode(value).into_owned());
        }

        params
    }

    fn push(&mut self, key: String, value: String) {
        match self.values.get_mut(&key) {
            Some(values) => values.push(value),
            None => {
                self.order.push(key.clone());
                self.values.insert(key, vec![value]);
            }
        }
    }

    /// First value for `name`, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.first(name).unwrap_or("")
    }

    /// First value for `name`, or `default` when the key is absent.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.first(name).unwrap_or(default)
    }

    /// Every value for `name` in appearance order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Map built from `name[subkey]=value` pairs. The first value of a sub-key wins.
    pub fn get_map(&self, name: &str) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for key in &self.order {
            let Some(sub) = key
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('['))
                .and_then(|rest| rest.strip_suffix(']'))
            else {
                continue;
            };
            if sub.is_empty() || sub.contains(['[', ']']) {
                continue;
            }
            if let Some(value) = self.values.get(key).and_then(|v| v.first()) {
                map.entry(sub.to_string()).or_insert_with(|| value.clone());
            }
        }
        map
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// `(key, first value)` pairs in first-seen key order.
    pub fn first_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().filter_map(|key| {
            self.values
                .get(key)
                .and_then(|v| v.first())
                .map(|v| (key.as_str(), v.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }
}

fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['+', '%']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(spaced),
    }
}
