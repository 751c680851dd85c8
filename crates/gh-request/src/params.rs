//! Immutable request parameters and their merge rules
//!
//! A [`Params`] snapshot is the value object every builder instance wraps.
//! Snapshots are never mutated in place; deriving a configuration always
//! goes through [`Params::merged`], which produces a fresh snapshot with
//! the delta's keys winning.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Characters escaped when a path segment is percent-encoded.
///
/// `%` stays unescaped so that normalizing an already-normalized path is a
/// no-op: splitting and re-joining a produced path yields the same string.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'%');

/// One immutable snapshot of accumulated request configuration.
///
/// Every field is optional so that merging two snapshots is a shallow
/// "delta keys win" operation. A snapshot attached to an
/// [`ApiRequest`](crate::ApiRequest) never changes after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Uppercase HTTP verb. The configured defaults supply `GET`.
    pub method: Option<String>,
    /// Path resolved against the configured base URL, or an absolute URL
    /// used verbatim. Stored in normalized form: percent-encoded segments
    /// joined with `/`, empty segments dropped.
    pub path: Option<String>,
    /// Query pairs; replaces any query string embedded in `path`.
    pub query: Option<BTreeMap<String, String>>,
    /// Request payload, serialized by the transport.
    pub body: Option<Value>,
    /// Extra request headers; these win over the injected authorization
    /// header on conflict.
    pub headers: Option<BTreeMap<String, String>>,
    /// `Some(false)` suppresses the authorization header even when a token
    /// is configured. `None` and `Some(true)` behave identically.
    pub authorize: Option<bool>,
    /// Memoize the first execution outcome of the owning instance.
    pub once: Option<bool>,
}

impl Params {
    /// Shallow-merge `delta` over `self` into a new snapshot.
    ///
    /// Keys present in the delta win; everything else is inherited
    /// untouched. The delta's `method` is coerced to uppercase and its
    /// `path` is normalized, so snapshots built from raw input (defaults,
    /// send overrides) end up in the same form as ones built through the
    /// fluent mutators.
    pub fn merged(&self, delta: Params) -> Params {
        let mut out = self.clone();
        if let Some(method) = delta.method {
            out.method = Some(method.to_uppercase());
        }
        if let Some(path) = delta.path {
            out.path = Some(normalize_path(&path));
        }
        if let Some(query) = delta.query {
            out.query = Some(query);
        }
        if let Some(body) = delta.body {
            out.body = Some(body);
        }
        if let Some(headers) = delta.headers {
            out.headers = Some(headers);
        }
        if let Some(authorize) = delta.authorize {
            out.authorize = Some(authorize);
        }
        if let Some(once) = delta.once {
            out.once = Some(once);
        }
        out
    }

    /// Normalize a snapshot that was built directly from raw field values.
    pub(crate) fn normalized(self) -> Params {
        Params::default().merged(self)
    }
}

/// Conversion into a normalized request path.
///
/// Accepts a `/`-delimited string or an already-split sequence of segments;
/// both forms produce the same percent-encoded representation. A segment
/// supplied through the sequence form keeps embedded slashes, encoded as
/// `%2F`.
pub trait IntoPath {
    fn into_path(self) -> String;
}

impl IntoPath for &str {
    fn into_path(self) -> String {
        normalize_path(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> String {
        normalize_path(&self)
    }
}

impl<S: AsRef<str>> IntoPath for &[S] {
    fn into_path(self) -> String {
        encode_segments(self.iter().map(|s| s.as_ref()))
    }
}

impl<S: AsRef<str>, const N: usize> IntoPath for [S; N] {
    fn into_path(self) -> String {
        encode_segments(self.iter().map(|s| s.as_ref()))
    }
}

impl<S: AsRef<str>> IntoPath for Vec<S> {
    fn into_path(self) -> String {
        encode_segments(self.iter().map(|s| s.as_ref()))
    }
}

/// Normalize a `/`-delimited path string.
///
/// Absolute URLs pass through verbatim, and a query string hanging off the
/// path survives untouched; only the path portion is decomposed, encoded,
/// and re-joined.
fn normalize_path(path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };
    let mut out = encode_segments(path.split('/'));
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    out
}

/// Percent-encode raw segments and join them with a leading `/`.
/// Empty segments are dropped.
fn encode_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let encoded: Vec<String> = segments
        .filter(|s| !s.is_empty())
        .map(|s| utf8_percent_encode(s, SEGMENT_ENCODE_SET).to_string())
        .collect();
    format!("/{}", encoded.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merged_leaves_the_parent_untouched() {
        let parent = Params {
            method: Some("GET".to_string()),
            path: Some("/me".to_string()),
            ..Params::default()
        };
        let child = parent.merged(Params {
            path: Some("/you".to_string()),
            ..Params::default()
        });

        assert_eq!(parent.path.as_deref(), Some("/me"));
        assert_eq!(child.path.as_deref(), Some("/you"));
        assert_eq!(child.method.as_deref(), Some("GET"));
    }

    #[test]
    fn delta_keys_win_and_the_rest_is_inherited() {
        let parent = Params {
            method: Some("GET".to_string()),
            query: Some(BTreeMap::from([("a".to_string(), "1".to_string())])),
            body: Some(json!({"k": "v"})),
            ..Params::default()
        };
        let child = parent.merged(Params {
            query: Some(BTreeMap::from([("b".to_string(), "2".to_string())])),
            ..Params::default()
        });

        assert_eq!(
            child.query,
            Some(BTreeMap::from([("b".to_string(), "2".to_string())]))
        );
        assert_eq!(child.method, parent.method);
        assert_eq!(child.body, parent.body);
    }

    #[test]
    fn method_is_coerced_to_uppercase() {
        let merged = Params::default().merged(Params {
            method: Some("patch".to_string()),
            ..Params::default()
        });
        assert_eq!(merged.method.as_deref(), Some("PATCH"));
    }

    #[test]
    fn string_and_segment_forms_normalize_identically() {
        assert_eq!("/a/b/c".into_path(), ["a", "b", "c"].into_path());
        assert_eq!("a/b/c".into_path(), "/a/b/c");
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!("//repos//org/repo/".into_path(), "/repos/org/repo");
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!("a b/c".into_path(), "/a%20b/c");
        assert_eq!(["a b", "c/d"].into_path(), "/a%20b/c%2Fd");
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = ["a b", "c/d"].into_path();
        let second = first.clone().into_path();
        assert_eq!(first, second);
    }

    #[test]
    fn absolute_urls_pass_through() {
        let url = "https://api.github.com/user?x=1";
        assert_eq!(url.into_path(), url);
    }

    #[test]
    fn embedded_query_strings_survive() {
        assert_eq!("/me?x=1".into_path(), "/me?x=1");
    }
}
