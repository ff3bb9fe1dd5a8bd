//! Segment trie holding the routes of a single HTTP method.
//!
//! # Matching
//! At every node the walk prefers, in order:
//! 1. a literal child equal to the current segment
//! 2. the capture child (non-empty segments only)
//! 3. the wildcard child, which takes the rest of the path
//!
//! A branch that dead-ends falls back to the next option, so a literal
//! sibling never hides a capture route that would otherwise match.
//!
//! # Trailing Slash
//! A single trailing empty segment is accepted for a route ending at the
//! current node. If the node has a wildcard child, the wildcard wins and
//! captures `""` so the slash stays observable. Captures never bind an
//! empty segment, so `/require/:p` does not match `/require/`.

use std::collections::HashMap;

use crate::routing::method::Method;
use crate::routing::pattern::{Params, Pattern, Segment};
use crate::routing::RouteError;

#[derive(Debug)]
struct Node<T> {
    literals: HashMap<String, Node<T>>,
    capture: Option<(String, Box<Node<T>>)>,
    wildcard: Option<(String, T)>,
    value: Option<T>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            literals: HashMap::new(),
            capture: None,
            wildcard: None,
            value: None,
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct Match<'t, T> {
    pub value: &'t T,
    pub params: Params,
}

/// Route table for one method.
#[derive(Debug)]
pub struct RouteTrie<T> {
    method: Method,
    root: Node<T>,
    len: usize,
}

impl<T> RouteTrie<T> {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            root: Node::new(),
            len: 0,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `value` under `pattern`.
    ///
    /// Conflicts are detected before the trie is touched, so a failed
    /// insert leaves the table exactly as it was.
    pub fn insert(&mut self, pattern: &Pattern, value: T) -> Result<(), RouteError> {
        self.check(pattern)?;

        let mut node = &mut self.root;
        for segment in pattern.segments() {
            match segment {
                Segment::Literal(s) => {
                    node = node.literals.entry(s.clone()).or_insert_with(Node::new);
                }
                Segment::Capture(name) => {
                    let (_, child) = node
                        .capture
                        .get_or_insert_with(|| (name.clone(), Box::new(Node::new())));
                    node = &mut **child;
                }
                Segment::Wildcard(name) => {
                    node.wildcard = Some((name.clone(), value));
                    self.len += 1;
                    return Ok(());
                }
            }
        }

        node.value = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Report whether `pattern` could be inserted, without inserting it.
    pub fn check(&self, pattern: &Pattern) -> Result<(), RouteError> {
        let mut node = &self.root;
        for segment in pattern.segments() {
            let next = match segment {
                Segment::Literal(s) => node.literals.get(s),
                Segment::Capture(name) => match &node.capture {
                    Some((existing, _)) if existing != name => {
                        return Err(self.conflict(pattern, segment, existing, ':'));
                    }
                    Some((_, child)) => Some(&**child),
                    None => None,
                },
                Segment::Wildcard(name) => {
                    return match &node.wildcard {
                        Some((existing, _)) if existing == name => Err(self.duplicate(pattern)),
                        Some((existing, _)) => Err(self.conflict(pattern, segment, existing, '*')),
                        None => Ok(()),
                    };
                }
            };
            match next {
                Some(child) => node = child,
                // Fresh branch: nothing below can collide.
                None => return Ok(()),
            }
        }

        if node.value.is_some() {
            return Err(self.duplicate(pattern));
        }
        Ok(())
    }

    fn duplicate(&self, pattern: &Pattern) -> RouteError {
        RouteError::Duplicate {
            method: self.method,
            pattern: pattern.to_string(),
        }
    }

    fn conflict(&self, pattern: &Pattern, segment: &Segment, existing: &str, sigil: char) -> RouteError {
        RouteError::Conflict {
            method: self.method,
            pattern: pattern.to_string(),
            segment: segment.to_string(),
            existing: format!("{}{}", sigil, existing),
        }
    }

    /// Call `f` on every registered value.
    pub fn visit(&self, f: &mut dyn FnMut(&T)) {
        visit_node(&self.root, f);
    }

    /// Look up the route matching a request path.
    pub fn find(&self, path: &str) -> Option<Match<'_, T>> {
        let path = path.strip_prefix('/').unwrap_or(path);
        // "/" is the root node itself, not one empty segment below it.
        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };
        let mut params = Params::new();
        let value = walk(&self.root, &segments, &mut params)?;
        Some(Match { value, params })
    }
}

fn visit_node<T>(node: &Node<T>, f: &mut dyn FnMut(&T)) {
    if let Some(value) = &node.value {
        f(value);
    }
    for child in node.literals.values() {
        visit_node(child, f);
    }
    if let Some((_, child)) = &node.capture {
        visit_node(child, f);
    }
    if let Some((_, value)) = &node.wildcard {
        f(value);
    }
}

fn walk<'t, T>(node: &'t Node<T>, segments: &[&str], params: &mut Params) -> Option<&'t T> {
    match segments {
        [] => {
            if let Some(value) = &node.value {
                return Some(value);
            }
            let (name, value) = node.wildcard.as_ref()?;
            params.push(name, String::new());
            Some(value)
        }
        [""] => {
            if let Some((name, value)) = &node.wildcard {
                params.push(name, String::new());
                return Some(value);
            }
            node.value.as_ref()
        }
        [head, rest @ ..] => {
            if let Some(child) = node.literals.get(*head) {
                if let Some(value) = walk(child, rest, params) {
                    return Some(value);
                }
            }

            if !head.is_empty() {
                if let Some((name, child)) = &node.capture {
                    params.push(name, head.to_string());
                    if let Some(value) = walk(child, rest, params) {
                        return Some(value);
                    }
                    params.pop();
                }
            }

            let (name, value) = node.wildcard.as_ref()?;
            params.push(name, segments.join("/"));
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(patterns: &[&'static str]) -> RouteTrie<&'static str> {
        let mut t = RouteTrie::new(Method::Get);
        for p in patterns {
            t.insert(&Pattern::parse(p).unwrap(), *p).unwrap();
        }
        t
    }

    #[test]
    fn test_literal_routes() {
        let t = trie(&["/", "/router/method", "/router/any"]);
        assert_eq!(*t.find("/router/method").unwrap().value, "/router/method");
        assert_eq!(*t.find("/router/any").unwrap().value, "/router/any");
        assert_eq!(*t.find("/").unwrap().value, "/");
        assert!(t.find("/router").is_none());
        assert!(t.find("/router/method/extra").is_none());
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_capture_binds_single_segment() {
        let t = trie(&["/require/:p"]);
        let m = t.find("/require/1").unwrap();
        assert_eq!(m.params.get("p"), Some("1"));

        // Trailing slash tolerated after a bound capture
        let m = t.find("/require/1/").unwrap();
        assert_eq!(m.params.get("p"), Some("1"));

        assert!(t.find("/require/").is_none());
        assert!(t.find("/require").is_none());
        assert!(t.find("/require/1/2").is_none());
    }

    #[test]
    fn test_wildcard_keeps_trailing_slash() {
        let t = trie(&["/remain/*p"]);
        assert_eq!(t.find("/remain/").unwrap().params.get("p"), Some(""));
        assert_eq!(t.find("/remain").unwrap().params.get("p"), Some(""));
        assert_eq!(t.find("/remain/a/b").unwrap().params.get("p"), Some("a/b"));
        assert_eq!(t.find("/remain/a/b/").unwrap().params.get("p"), Some("a/b/"));
        assert_eq!(t.find("/remain/1").unwrap().params.get("p"), Some("1"));
    }

    #[test]
    fn test_priority_literal_capture_wildcard() {
        let t = trie(&["/users/new", "/users/:id", "/users/*rest"]);
        assert_eq!(*t.find("/users/new").unwrap().value, "/users/new");

        let m = t.find("/users/42").unwrap();
        assert_eq!(*m.value, "/users/:id");
        assert_eq!(m.params.get("id"), Some("42"));

        let m = t.find("/users/42/posts").unwrap();
        assert_eq!(*m.value, "/users/*rest");
        assert_eq!(m.params.get("rest"), Some("42/posts"));
    }

    #[test]
    fn test_backtracks_from_dead_literal_branch() {
        let t = trie(&["/a/new", "/a/:id/edit"]);
        let m = t.find("/a/new/edit").unwrap();
        assert_eq!(*m.value, "/a/:id/edit");
        assert_eq!(m.params.get("id"), Some("new"));
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn test_visit_reaches_every_route() {
        let t = trie(&["/", "/a/:id", "/a/:id/b", "/files/*p", "/x"]);
        let mut seen = Vec::new();
        t.visit(&mut |v: &&'static str| seen.push(*v));
        seen.sort();
        assert_eq!(seen, vec!["/", "/a/:id", "/a/:id/b", "/files/*p", "/x"]);
    }

    #[test]
    fn test_multiple_captures() {
        let t = trie(&["/users/:id/posts/:post_id"]);
        let m = t.find("/users/7/posts/9").unwrap();
        assert_eq!(m.params.get("id"), Some("7"));
        assert_eq!(m.params.get("post_id"), Some("9"));
    }

    #[test]
    fn test_duplicate_rejected_and_table_unchanged() {
        let mut t = trie(&["/router/method"]);
        let err = t
            .insert(&Pattern::parse("/router/method/").unwrap(), "again")
            .unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
        assert_eq!(*t.find("/router/method").unwrap().value, "/router/method");
        assert_eq!(t.len(), 1);

        t.insert(&Pattern::parse("/files/*p").unwrap(), "a").unwrap();
        let err = t.insert(&Pattern::parse("/files/*p").unwrap(), "b").unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_conflicting_capture_names() {
        let mut t = trie(&["/users/:id"]);
        let err = t
            .insert(&Pattern::parse("/users/:name/profile").unwrap(), "x")
            .unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));
        // The failed insert must not leave a half-built branch behind
        assert!(t.find("/users/bob/profile").is_none());
        assert_eq!(t.len(), 1);

        let mut t = trie(&["/files/*path"]);
        let err = t.insert(&Pattern::parse("/files/*other").unwrap(), "x").unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));
    }

    #[test]
    fn test_root_literal_beats_root_wildcard() {
        let t = trie(&["/", "/*p"]);
        for path in ["/", ""] {
            let m = t.find(path).unwrap();
            assert_eq!(*m.value, "/");
            assert!(m.params.is_empty());
        }

        let m = t.find("/a/b").unwrap();
        assert_eq!(*m.value, "/*p");
        assert_eq!(m.params.get("p"), Some("a/b"));
    }

    #[test]
    fn test_root_wildcard_alone_matches_root() {
        let t = trie(&["/*p"]);
        let m = t.find("/").unwrap();
        assert_eq!(*m.value, "/*p");
        assert_eq!(m.params.get("p"), Some(""));
    }
}
