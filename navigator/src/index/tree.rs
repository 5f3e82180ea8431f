use super::model::LanguageIndex;
use super::model::NodeRef;
use super::model::ParentId;
use super::model::Segment;
use crate::error::Result;
use crate::paging;

impl LanguageIndex {
    pub fn get(&self, id: usize) -> Option<NodeRef<'_>> {
        let segment = self.segment_of(id)?;
        let node = segment.nodes.get(id - segment.offset)?;
        Some(NodeRef::new(id, node, segment))
    }

    /// Nodes in flat order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.segments.iter().flat_map(|segment| {
            segment
                .nodes
                .iter()
                .enumerate()
                .map(move |(local, node)| NodeRef::new(segment.offset + local, node, segment))
        })
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.segments.iter().filter_map(|segment| {
            segment
                .nodes
                .first()
                .map(|node| NodeRef::new(segment.offset, node, segment))
        })
    }

    /// Direct children of `parent`, or the technologies for the root.
    pub fn children(&self, parent: ParentId) -> Vec<NodeRef<'_>> {
        match parent {
            ParentId::Root => self.roots().collect(),
            ParentId::Node(id) => match self.get(id) {
                Some(node) => node.child_ids().filter_map(|child| self.get(child)).collect(),
                None => Vec::new(),
            },
        }
    }

    /// `id` followed by every node below it, in flat order.
    pub fn descendants(&self, id: usize) -> Vec<NodeRef<'_>> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        let mut collected = vec![node];
        let mut stack: Vec<usize> = node.child_ids().collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            let Some(child) = self.get(next) else {
                continue;
            };
            let before = stack.len();
            stack.extend(child.child_ids());
            stack[before..].reverse();
            collected.push(child);
        }
        collected
    }

    /// Chain from the technology down to `id`, inclusive.
    pub fn ancestors(&self, id: usize) -> Vec<NodeRef<'_>> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            chain.push(node);
            cursor = match node.parent() {
                ParentId::Node(parent) => self.get(parent),
                ParentId::Root => None,
            };
        }
        chain.reverse();
        chain
    }

    /// All children of `id`'s parent, `id` included.
    pub fn siblings(&self, id: usize) -> Vec<NodeRef<'_>> {
        match self.get(id) {
            Some(node) => self.children(node.parent()),
            None => Vec::new(),
        }
    }

    pub fn group_members(&self, marker: usize) -> Vec<NodeRef<'_>> {
        let Some(node) = self.get(marker) else {
            return Vec::new();
        };
        node.group_member_ids()
            .into_iter()
            .filter_map(|member| self.get(member))
            .collect()
    }

    /// Technology root whose path matches, ignoring ASCII case.
    pub fn technology(&self, path: &str) -> Option<NodeRef<'_>> {
        self.roots().find(|root| {
            root.path
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(path))
        })
    }

    /// Flat node references split into pages of `size`.
    pub fn pages(&self, size: usize) -> Result<Vec<Vec<NodeRef<'_>>>> {
        let nodes: Vec<NodeRef<'_>> = self.iter().collect();
        Ok(paging::page(&nodes, size)?
            .into_iter()
            .map(<[NodeRef<'_>]>::to_vec)
            .collect())
    }

    /// The technology segment holding flat id `id`.
    pub fn segment_containing(&self, id: usize) -> Option<&Segment> {
        self.segment_of(id)
    }
}
