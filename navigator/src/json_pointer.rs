//! RFC 6901 pointer tokens, decoded lazily.
//!
//! ```
//! use docnav_navigator::json_pointer::tokenize;
//!
//! let tokens: Vec<String> = tokenize("/a~1b/c").collect();
//! assert_eq!(tokens, vec!["a/b".to_string(), "c".to_string()]);
//! ```

use serde_json::Value;
use std::str::Split;

const SEPARATOR: char = '/';

/// Iterator over the decoded reference tokens of a pointer.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    inner: Option<Split<'a, char>>,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(decode)
    }
}

/// Splits `pointer` into decoded tokens. A pointer that is empty or does not
/// start with `/` has no tokens.
pub fn tokenize(pointer: &str) -> Tokens<'_> {
    let inner = pointer
        .strip_prefix(SEPARATOR)
        .map(|rest| rest.split(SEPARATOR));
    Tokens { inner }
}

/// Walks `value` along `pointer`, indexing objects by key and arrays by
/// decimal position.
pub fn resolve<'v>(value: &'v Value, pointer: &str) -> Option<&'v Value> {
    tokenize(pointer).try_fold(value, |current, token| match current {
        Value::Object(map) => map.get(&token),
        Value::Array(items) => parse_index(&token).and_then(|idx| items.get(idx)),
        _ => None,
    })
}

fn parse_index(token: &str) -> Option<usize> {
    // leading zeros are not valid array indices
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn decode(token: &str) -> String {
    if !token.contains('~') {
        return token.to_string();
    }
    let mut decoded = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.peek() {
                Some('0') => {
                    chars.next();
                    decoded.push('~');
                    continue;
                }
                Some('1') => {
                    chars.next();
                    decoded.push('/');
                    continue;
                }
                _ => {}
            }
        }
        decoded.push(ch);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tokens(pointer: &str) -> Vec<String> {
        tokenize(pointer).collect()
    }

    #[test]
    fn pointers_without_leading_separator_have_no_tokens() {
        assert!(tokens("").is_empty());
        assert!(tokens("!").is_empty());
        assert!(tokens("a/b").is_empty());
    }

    #[test]
    fn splits_and_decodes_tokens() {
        assert_eq!(tokens("/"), vec![""]);
        assert_eq!(tokens("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(tokens("/~0/~1"), vec!["~", "/"]);
        assert_eq!(tokens("/a~1b"), vec!["a/b"]);
        assert_eq!(tokens("/m~0n"), vec!["m~n"]);
    }

    #[test]
    fn keeps_empty_segments() {
        assert_eq!(tokens("/a/"), vec!["a", ""]);
        assert_eq!(tokens("//b"), vec!["", "b"]);
        assert_eq!(tokens("///"), vec!["", "", ""]);
    }

    #[test]
    fn escapes_decode_once() {
        assert_eq!(tokens("/~01"), vec!["~1"]);
        assert_eq!(tokens("/~2"), vec!["~2"]);
    }

    #[test]
    fn tokenize_restarts_on_every_call() {
        let pointer = "/x/y";
        let first = tokenize(pointer);
        let replay = first.clone();
        assert_eq!(first.count(), 2);
        assert_eq!(replay.collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(tokens(pointer), vec!["x", "y"]);
    }

    #[test]
    fn resolves_nested_values() {
        let doc = json!({
            "interfaceLanguages": {
                "swift": [{ "title": "SlothCreator", "children": [] }]
            },
            "a/b": { "m~n": 7 }
        });
        assert_eq!(
            resolve(&doc, "/interfaceLanguages/swift/0/title"),
            Some(&json!("SlothCreator"))
        );
        assert_eq!(resolve(&doc, "/a~1b/m~0n"), Some(&json!(7)));
        assert_eq!(resolve(&doc, ""), Some(&doc));
        assert_eq!(resolve(&doc, "/interfaceLanguages/swift/01"), None);
        assert_eq!(resolve(&doc, "/missing"), None);
    }
}
