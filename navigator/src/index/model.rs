use indexmap::IndexMap;
use serde::Serialize;
use serde::Serializer;
use serde_with::skip_serializing_none;
use std::ops::Deref;
use std::sync::Arc;

pub const ROOT_KEY: &str = "<root>";
pub const DEFAULT_LANGUAGE: &str = "swift";

/// Parent of a flattened node: either another flat id or the index root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParentId {
    Root,
    Node(usize),
}

impl Serialize for ParentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Root => serializer.serialize_str(ROOT_KEY),
            Self::Node(id) => serializer.serialize_u64(*id as u64),
        }
    }
}

/// A flattened outline entry. Ids held here are local to the segment that
/// owns the node; [`NodeRef`] translates them to language-wide flat ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigatorNode {
    pub title: String,
    pub path: Option<String>,
    pub kind: Option<String>,
    pub depth: usize,
    pub beta: bool,
    pub deprecated: bool,
    pub external: bool,
    pub(crate) deprecated_children_count: usize,
    pub(crate) index: usize,
    pub(crate) sibling_count: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) group_marker: Option<usize>,
    pub(crate) group_members: Vec<usize>,
}

impl NavigatorNode {
    pub fn is_group_marker(&self) -> bool {
        self.kind.as_deref() == Some(crate::proto::GROUP_MARKER_KIND)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Flattened nodes of one top-level technology, placed within a language.
#[derive(Clone, Debug)]
pub struct Segment {
    pub offset: usize,
    pub position: usize,
    pub siblings: usize,
    pub nodes: Arc<[NavigatorNode]>,
    pub(crate) group_marker: Option<usize>,
    pub(crate) group_members: Vec<usize>,
    pub(crate) deprecated_members: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn contains(&self, id: usize) -> bool {
        id >= self.offset && id < self.offset + self.nodes.len()
    }
}

/// Pre-order flat outline of one interface language.
#[derive(Clone, Debug, Default)]
pub struct LanguageIndex {
    pub(crate) segments: Vec<Segment>,
    pub(crate) len: usize,
}

impl LanguageIndex {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segment_of(&self, id: usize) -> Option<&Segment> {
        if id >= self.len {
            return None;
        }
        let slot = self.segments.partition_point(|segment| segment.offset <= id);
        self.segments
            .get(slot.checked_sub(1)?)
            .filter(|segment| segment.contains(id))
    }
}

/// All interface languages of one index document.
#[derive(Clone, Debug, Default)]
pub struct FlatIndex {
    pub languages: IndexMap<String, LanguageIndex>,
}

impl FlatIndex {
    pub fn language(&self, language: &str) -> Option<&LanguageIndex> {
        self.languages.get(language)
    }

    /// The requested language, or `fallback` when it is missing or empty,
    /// together with the name of the language that was picked.
    pub fn language_or_default(
        &self,
        language: &str,
        fallback: &str,
    ) -> Option<(&str, &LanguageIndex)> {
        self.languages
            .get_key_value(language)
            .filter(|(_, index)| !index.is_empty())
            .or_else(|| self.languages.get_key_value(fallback))
            .map(|(name, index)| (name.as_str(), index))
    }

    pub fn is_empty(&self) -> bool {
        self.languages.values().all(LanguageIndex::is_empty)
    }

    pub fn total_nodes(&self) -> usize {
        self.languages.values().map(LanguageIndex::len).sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyProps {
    pub title: String,
    pub identifier: String,
    pub child_count: usize,
    pub beta: bool,
    pub languages: Vec<String>,
}

pub type TechnologyTable = IndexMap<String, TechnologyProps>;

#[derive(Clone, Debug, Default)]
pub struct FlattenedIndex {
    pub flat: FlatIndex,
    pub technologies: TechnologyTable,
}

/// Borrowed view of a node resolved against its language.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
    id: usize,
    node: &'a NavigatorNode,
    segment: &'a Segment,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(id: usize, node: &'a NavigatorNode, segment: &'a Segment) -> Self {
        Self { id, node, segment }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn node(&self) -> &'a NavigatorNode {
        self.node
    }

    pub fn parent(&self) -> ParentId {
        match self.node.parent {
            Some(local) => ParentId::Node(self.segment.offset + local),
            None => ParentId::Root,
        }
    }

    pub fn sibling_index(&self) -> usize {
        if self.node.depth == 0 {
            self.segment.position
        } else {
            self.node.index
        }
    }

    pub fn sibling_count(&self) -> usize {
        if self.node.depth == 0 {
            self.segment.siblings
        } else {
            self.node.sibling_count
        }
    }

    pub fn child_ids(&self) -> impl Iterator<Item = usize> + 'a {
        let offset = self.segment.offset;
        self.node.children.iter().map(move |local| offset + local)
    }

    /// Flat id of the group marker this node follows, if any.
    pub fn group_marker(&self) -> Option<usize> {
        if self.node.depth == 0 {
            self.segment.group_marker
        } else {
            self.node.group_marker.map(|local| self.segment.offset + local)
        }
    }

    pub fn group_member_ids(&self) -> Vec<usize> {
        if self.node.depth == 0 {
            self.segment.group_members.clone()
        } else {
            let offset = self.segment.offset;
            self.node
                .group_members
                .iter()
                .map(|local| offset + local)
                .collect()
        }
    }

    pub fn deprecated_children_count(&self) -> usize {
        if self.node.depth == 0 {
            self.segment.deprecated_members
        } else {
            self.node.deprecated_children_count
        }
    }

    pub fn view(&self) -> NodeView<'a> {
        NodeView {
            id: self.id,
            parent: self.parent(),
            title: &self.node.title,
            path: self.node.path.as_deref(),
            kind: self.node.kind.as_deref(),
            depth: self.node.depth,
            index: self.sibling_index(),
            siblings_count: self.sibling_count(),
            child_count: self.node.child_count(),
            beta: self.node.beta,
            deprecated: self.node.deprecated,
            external: self.node.external,
            group_marker: self.group_marker(),
            deprecated_children_count: self
                .node
                .is_group_marker()
                .then(|| self.deprecated_children_count()),
        }
    }
}

impl Deref for NodeRef<'_> {
    type Target = NavigatorNode;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView<'a> {
    pub id: usize,
    pub parent: ParentId,
    pub title: &'a str,
    pub path: Option<&'a str>,
    #[serde(rename = "type")]
    pub kind: Option<&'a str>,
    pub depth: usize,
    pub index: usize,
    pub siblings_count: usize,
    pub child_count: usize,
    pub beta: bool,
    pub deprecated: bool,
    pub external: bool,
    pub group_marker: Option<usize>,
    pub deprecated_children_count: Option<usize>,
}
