use crate::highlight::Segment;
use crate::highlight::fragment_highlight;
use crate::highlight::fragment_span;
use crate::index::LanguageIndex;
use crate::index::NodeRef;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct QuickNavMatch<'a> {
    pub node: NodeRef<'a>,
    pub window: &'a str,
    #[serde(skip)]
    pub window_start: usize,
    pub segments: Vec<Segment<'a>>,
}

impl QuickNavMatch<'_> {
    pub fn id(&self) -> usize {
        self.node.id()
    }
}

/// Fuzzy lookup over navigable entries: tighter windows first, then earlier
/// windows, then flat order.
pub fn quick_navigation<'a>(
    index: &'a LanguageIndex,
    query: &str,
    limit: usize,
) -> Vec<QuickNavMatch<'a>> {
    let mut found: Vec<(usize, QuickNavMatch<'a>)> = index
        .iter()
        .filter(|node| node.path.is_some() && !node.is_group_marker())
        .filter_map(|node| {
            let title: &'a str = &node.node().title;
            let (start, end) = fragment_span(title, query)?;
            let window = &title[start..end];
            Some((
                window.chars().count(),
                QuickNavMatch {
                    node,
                    window,
                    window_start: start,
                    segments: fragment_highlight(title, query),
                },
            ))
        })
        .collect();
    found.sort_by(|(left_width, left), (right_width, right)| {
        left_width
            .cmp(right_width)
            .then_with(|| left.window_start.cmp(&right.window_start))
            .then_with(|| left.id().cmp(&right.id()))
    });
    found.into_iter().take(limit).map(|(_, hit)| hit).collect()
}
