//! HTTP methods the router can register routes under.

use std::fmt;

/// A concrete HTTP method with its own route trie.
///
/// `ANY` is not a variant: `Router::any` fans out over [`Method::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Every method `any()` registers under, in display order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Head,
        Method::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Map a transport method onto a routable one.
    /// Extension methods (CONNECT, TRACE, custom verbs) have no trie.
    pub fn from_http(method: &axum::http::Method) -> Option<Self> {
        match *method {
            axum::http::Method::GET => Some(Method::Get),
            axum::http::Method::POST => Some(Method::Post),
            axum::http::Method::PUT => Some(Method::Put),
            axum::http::Method::PATCH => Some(Method::Patch),
            axum::http::Method::DELETE => Some(Method::Delete),
            axum::http::Method::HEAD => Some(Method::Head),
            axum::http::Method::OPTIONS => Some(Method::Options),
            _ => None,
        }
    }

    /// Index into per-method tables.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http() {
        assert_eq!(Method::from_http(&axum::http::Method::GET), Some(Method::Get));
        assert_eq!(Method::from_http(&axum::http::Method::OPTIONS), Some(Method::Options));
        assert_eq!(Method::from_http(&axum::http::Method::TRACE), None);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, m) in Method::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }
}
