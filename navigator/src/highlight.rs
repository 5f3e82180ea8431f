//! Matched/unmatched text runs for rendering search hits.

use crate::error::Result;
use regex::Matches;
use regex::Regex;
use regex::RegexBuilder;
use serde::Serialize;

/// A run of text that either matched the query or did not. Concatenating the
/// segments of one call yields the input text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Segment<'t> {
    pub text: &'t str,
    pub matched: bool,
}

impl<'t> Segment<'t> {
    fn plain(text: &'t str) -> Self {
        Self {
            text,
            matched: false,
        }
    }

    fn hit(text: &'t str) -> Self {
        Self {
            text,
            matched: true,
        }
    }
}

/// Lazy segment iterator returned by [`highlight`].
#[derive(Debug)]
pub struct Highlights<'t, 'r> {
    text: &'t str,
    matches: Option<Matches<'r, 't>>,
    cursor: usize,
    pending: Option<(usize, usize)>,
    done: bool,
}

impl<'t> Iterator for Highlights<'t, '_> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(matches) = self.matches.as_mut() else {
            self.done = true;
            return Some(Segment::plain(self.text));
        };
        if let Some((start, end)) = self.pending.take() {
            self.cursor = end;
            return Some(Segment::hit(&self.text[start..end]));
        }
        for found in matches.by_ref() {
            if found.is_empty() {
                continue;
            }
            if found.start() > self.cursor {
                let gap = &self.text[self.cursor..found.start()];
                self.cursor = found.start();
                self.pending = Some((found.start(), found.end()));
                return Some(Segment::plain(gap));
            }
            self.cursor = found.end();
            return Some(Segment::hit(found.as_str()));
        }
        self.done = true;
        (self.cursor < self.text.len()).then(|| Segment::plain(&self.text[self.cursor..]))
    }
}

/// Splits `text` around every non-overlapping match of `pattern`. Without a
/// pattern the whole text comes back as a single unmatched segment.
pub fn highlight<'t, 'r>(text: &'t str, pattern: Option<&'r Regex>) -> Highlights<'t, 'r> {
    Highlights {
        text,
        matches: pattern.map(|pattern| pattern.find_iter(text)),
        cursor: 0,
        pending: None,
        done: false,
    }
}

/// Builds a case-insensitive pattern that treats `query` literally and
/// ignores whitespace on both sides: query whitespace is dropped and any
/// whitespace run may sit between two query characters. A blank query gives
/// `None`.
pub fn safe_highlight_pattern(query: &str) -> Result<Option<Regex>> {
    let chars: Vec<String> = query
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| regex::escape(ch.encode_utf8(&mut [0; 4])))
        .collect();
    if chars.is_empty() {
        return Ok(None);
    }
    let pattern = RegexBuilder::new(&chars.join(r"\s*"))
        .case_insensitive(true)
        .build()?;
    Ok(Some(pattern))
}

fn same_char(left: char, right: char) -> bool {
    left == right || left.to_lowercase().eq(right.to_lowercase())
}

fn query_chars(query: &str) -> Vec<char> {
    query.chars().filter(|ch| !ch.is_whitespace()).collect()
}

/// Byte offsets of the greedy subsequence match of `query` starting at
/// `from`, one per query character.
fn subsequence(text: &str, query: &[char], from: usize) -> Option<Vec<(usize, usize)>> {
    let mut hits = Vec::with_capacity(query.len());
    let mut wanted = query.iter().peekable();
    for (offset, ch) in text[from..].char_indices() {
        let Some(next) = wanted.peek() else {
            break;
        };
        if same_char(ch, **next) {
            hits.push((from + offset, from + offset + ch.len_utf8()));
            wanted.next();
        }
    }
    wanted.peek().is_none().then_some(hits)
}

/// Highlights the characters of `query` found in order inside `text`,
/// ignoring case and query whitespace. Each matched character is its own
/// segment. Text that does not contain the whole query comes back unmatched.
pub fn fragment_highlight<'t>(text: &'t str, query: &str) -> Vec<Segment<'t>> {
    let query = query_chars(query);
    let hits = if query.is_empty() {
        None
    } else {
        subsequence(text, &query, 0)
    };
    let Some(hits) = hits else {
        return vec![Segment::plain(text)];
    };
    let mut segments = Vec::with_capacity(hits.len() * 2 + 1);
    let mut cursor = 0;
    for (start, end) in hits {
        if start > cursor {
            segments.push(Segment::plain(&text[cursor..start]));
        }
        segments.push(Segment::hit(&text[start..end]));
        cursor = end;
    }
    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

/// Byte range of the shortest substring of `text` containing `query` as a
/// case-insensitive subsequence. Ties go to the leftmost window.
pub fn fragment_span(text: &str, query: &str) -> Option<(usize, usize)> {
    let query = query_chars(query);
    let first = *query.first()?;
    let mut best: Option<(usize, usize, usize)> = None;
    for (start, ch) in text.char_indices() {
        if !same_char(ch, first) {
            continue;
        }
        let Some(hits) = subsequence(text, &query, start) else {
            // no later start can complete the match either
            break;
        };
        let end = hits.last().map_or(start, |(_, end)| *end);
        let width = text[start..end].chars().count();
        if best.is_none_or(|(_, _, current)| width < current) {
            best = Some((start, end, width));
        }
    }
    best.map(|(start, end, _)| (start, end))
}

pub fn fragment_window<'t>(text: &'t str, query: &str) -> Option<&'t str> {
    fragment_span(text, query).map(|(start, end)| &text[start..end])
}
