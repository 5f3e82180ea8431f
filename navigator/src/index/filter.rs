use super::model::LanguageIndex;
use super::model::NodeRef;
use super::model::ParentId;
use crate::error::Result;
use crate::highlight::safe_highlight_pattern;
use crate::proto::ApiChanges;
use crate::proto::ChangeKind;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Narrows a language index by title pattern, kind, API change, and
/// deprecation.
#[derive(Clone, Debug, Default)]
pub struct NodeFilter {
    pattern: Option<Regex>,
    kinds: Vec<String>,
    changes: Option<Arc<ApiChanges>>,
    change_kinds: Vec<ChangeKind>,
    hide_deprecated: bool,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches titles against `query`, compiled with the safe highlight rules.
    pub fn with_query(mut self, query: &str) -> Result<Self> {
        self.pattern = safe_highlight_pattern(query)?;
        Ok(self)
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Keeps only nodes whose path appears in `changes`.
    pub fn with_changes(mut self, changes: Arc<ApiChanges>) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Change kinds that satisfy the kind selection alongside node kinds.
    pub fn with_change_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ChangeKind>,
    {
        self.change_kinds = kinds.into_iter().collect();
        self
    }

    pub fn hide_deprecated(mut self, hide: bool) -> Self {
        self.hide_deprecated = hide;
        self
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn is_noop(&self) -> bool {
        self.pattern.is_none()
            && self.kinds.is_empty()
            && self.changes.is_none()
            && self.change_kinds.is_empty()
            && !self.hide_deprecated
    }

    pub fn matches(&self, node: &NodeRef<'_>) -> bool {
        if let Some(pattern) = &self.pattern
            && !pattern.is_match(&node.title)
        {
            return false;
        }
        let change = match &self.changes {
            Some(changes) => match node.path.as_deref().and_then(|path| changes.get(path)) {
                Some(change) => Some(*change),
                None => return false,
            },
            None => None,
        };
        if !self.kinds.is_empty() || !self.change_kinds.is_empty() {
            let kind_hit = node
                .kind
                .as_deref()
                .is_some_and(|kind| self.kinds.iter().any(|wanted| wanted == kind));
            let change_hit = change.is_some_and(|change| self.change_kinds.contains(&change));
            if !kind_hit && !change_hit {
                return false;
            }
        }
        !(self.hide_deprecated && is_deprecated(node))
    }

    /// Matching flat ids over the whole index.
    pub fn apply(&self, index: &LanguageIndex) -> Vec<usize> {
        index
            .iter()
            .filter(|node| self.matches(node))
            .map(|node| node.id())
            .collect()
    }

    /// Re-filters an earlier result. A narrower query only needs to look at
    /// what the broader one kept.
    pub fn apply_to(&self, index: &LanguageIndex, candidates: &[usize]) -> Vec<usize> {
        candidates
            .iter()
            .filter_map(|id| index.get(*id))
            .filter(|node| self.matches(node))
            .map(|node| node.id())
            .collect()
    }
}

/// A group marker reads as deprecated once every member it labels is, so an
/// empty group reads as deprecated too.
fn is_deprecated(node: &NodeRef<'_>) -> bool {
    if node.deprecated {
        return true;
    }
    node.is_group_marker() && node.deprecated_children_count() == node.group_member_ids().len()
}

/// Adds every ancestor of `ids`, returning flat order so the result still
/// reads as a pre-order tree.
pub fn with_ancestors(index: &LanguageIndex, ids: &[usize]) -> Vec<usize> {
    let mut keep = BTreeSet::new();
    for id in ids {
        let mut cursor = index.get(*id);
        while let Some(node) = cursor {
            if !keep.insert(node.id()) {
                break;
            }
            cursor = match node.parent() {
                ParentId::Node(parent) => index.get(parent),
                ParentId::Root => None,
            };
        }
    }
    keep.into_iter().collect()
}
