use super::model::FlatIndex;
use super::model::FlattenedIndex;
use super::model::LanguageIndex;
use super::model::NavigatorNode;
use super::model::Segment;
use super::model::TechnologyProps;
use super::model::TechnologyTable;
use crate::proto::IndexEntry;
use crate::proto::InterfaceLanguages;
use crate::proto::TreeNode;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct Frame<'t> {
    children: Vec<&'t TreeNode>,
    next: usize,
    parent: usize,
    depth: usize,
    parent_beta: bool,
    group_marker: Option<usize>,
}

/// Flattens every interface language of an index document into pre-order
/// flat ids and collects technology metadata in the same pass.
///
/// A technology subtree shared between languages (the same `Arc`) is walked
/// once and its nodes are shared by every language that lists it.
pub fn flatten_index(languages: &InterfaceLanguages) -> FlattenedIndex {
    let mut flat = FlatIndex::default();
    let mut technologies = TechnologyTable::new();
    let mut shared: HashMap<*const TreeNode, Arc<[NavigatorNode]>> = HashMap::new();
    let mut skipped = 0usize;

    for (language, entries) in languages {
        let roots: Vec<&Arc<TreeNode>> = entries
            .iter()
            .filter_map(IndexEntry::node)
            .filter(|node| node.is_well_formed())
            .collect();
        skipped += entries.len() - roots.len();

        let mut segments: Vec<Segment> = Vec::with_capacity(roots.len());
        let mut offset = 0;
        let mut marker: Option<usize> = None;
        for (position, root) in roots.iter().enumerate() {
            let key = Arc::as_ptr(root);
            let nodes = match shared.get(&key) {
                Some(nodes) => Arc::clone(nodes),
                None => {
                    let nodes: Arc<[NavigatorNode]> = flatten_technology(root, &mut skipped).into();
                    shared.insert(key, Arc::clone(&nodes));
                    nodes
                }
            };
            let mut segment = Segment {
                offset,
                position,
                siblings: roots.len(),
                nodes,
                group_marker: None,
                group_members: Vec::new(),
                deprecated_members: 0,
            };
            if root.is_group_marker() {
                marker = Some(segments.len());
            } else if let Some(slot) = marker {
                let owner = &mut segments[slot];
                segment.group_marker = Some(owner.offset);
                owner.group_members.push(offset);
                if root.deprecated {
                    owner.deprecated_members += 1;
                }
            }
            if !root.is_group_marker()
                && let Some(path) = root.path.as_deref()
            {
                let props = technologies
                    .entry(path.to_string())
                    .or_insert_with(|| TechnologyProps {
                        title: root.title.clone().unwrap_or_default(),
                        identifier: path.to_string(),
                        child_count: segment.nodes.first().map_or(0, NavigatorNode::child_count),
                        beta: root.beta,
                        languages: Vec::new(),
                    });
                if !props.languages.iter().any(|known| known == language) {
                    props.languages.push(language.clone());
                }
            }
            offset += segment.len();
            segments.push(segment);
        }
        flat.languages.insert(
            language.clone(),
            LanguageIndex {
                segments,
                len: offset,
            },
        );
    }

    if skipped > 0 {
        debug!("navigator flatten skipped {skipped} malformed entries");
    }
    FlattenedIndex { flat, technologies }
}

fn flatten_technology(root: &TreeNode, skipped: &mut usize) -> Vec<NavigatorNode> {
    let mut nodes = vec![base_node(root, 0, false)];
    let mut stack = Vec::new();
    let children = surviving(&root.children, skipped);
    if !children.is_empty() {
        stack.push(Frame {
            children,
            next: 0,
            parent: 0,
            depth: 1,
            parent_beta: root.beta,
            group_marker: None,
        });
    }

    while let Some(frame) = stack.last_mut() {
        let Some(&raw) = frame.children.get(frame.next) else {
            stack.pop();
            continue;
        };
        let id = nodes.len();
        let mut node = base_node(raw, frame.depth, frame.parent_beta);
        node.index = frame.next;
        node.sibling_count = frame.children.len();
        node.parent = Some(frame.parent);
        frame.next += 1;

        if raw.is_group_marker() {
            frame.group_marker = Some(id);
        } else if let Some(marker) = frame.group_marker {
            node.group_marker = Some(marker);
            let owner = &mut nodes[marker];
            owner.group_members.push(id);
            if raw.deprecated {
                owner.deprecated_children_count += 1;
            }
        }

        let parent = frame.parent;
        let depth = frame.depth + 1;
        let parent_beta = frame.parent_beta || raw.beta;
        nodes[parent].children.push(id);
        nodes.push(node);

        let children = surviving(&raw.children, skipped);
        if !children.is_empty() {
            stack.push(Frame {
                children,
                next: 0,
                parent: id,
                depth,
                parent_beta,
                group_marker: None,
            });
        }
    }
    nodes
}

fn surviving<'t>(entries: &'t [IndexEntry], skipped: &mut usize) -> Vec<&'t TreeNode> {
    let children: Vec<&TreeNode> = entries
        .iter()
        .filter_map(IndexEntry::node)
        .map(Arc::as_ref)
        .filter(|node| node.is_well_formed())
        .collect();
    *skipped += entries.len() - children.len();
    children
}

fn base_node(raw: &TreeNode, depth: usize, parent_beta: bool) -> NavigatorNode {
    NavigatorNode {
        title: raw.title.clone().unwrap_or_default(),
        path: raw.path.clone(),
        kind: raw.kind.clone(),
        depth,
        // a beta parent already marks the whole subtree
        beta: raw.beta && !parent_beta,
        deprecated: raw.deprecated,
        external: raw.external,
        ..Default::default()
    }
}
