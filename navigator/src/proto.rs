use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_with::DefaultOnNull;
use serde_with::serde_as;
use serde_with::skip_serializing_none;
use std::sync::Arc;
use tracing::debug;

pub const INDEX_FILENAME: &str = "index.json";
pub const GROUP_MARKER_KIND: &str = "groupMarker";

pub type References = IndexMap<String, ReferenceRecord>;
pub type InterfaceLanguages = IndexMap<String, Vec<IndexEntry>>;
/// API change per node path, between the viewed and a chosen older version.
pub type ApiChanges = IndexMap<String, ChangeKind>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deprecated,
}

/// The document served at `/index/[<locale>/]index.json`. Absent or null
/// fields decode as empty; a language whose outline is not an array is
/// dropped on its own.
#[serde_as]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<SchemaVersion>,
    #[serde_as(as = "DefaultOnNull")]
    pub included_archive_identifiers: Vec<String>,
    #[serde(deserialize_with = "lenient_languages")]
    pub interface_languages: InterfaceLanguages,
    #[serde_as(as = "DefaultOnNull")]
    pub references: References,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLanguages {
    Outlines(IndexMap<String, Value>),
    Other(Value),
}

fn lenient_languages<'de, D>(deserializer: D) -> Result<InterfaceLanguages, D::Error>
where
    D: Deserializer<'de>,
{
    let outlines = match RawLanguages::deserialize(deserializer)? {
        RawLanguages::Outlines(outlines) => outlines,
        RawLanguages::Other(Value::Null) => return Ok(InterfaceLanguages::new()),
        RawLanguages::Other(other) => {
            debug!("ignoring interfaceLanguages that is not an object: {other}");
            return Ok(InterfaceLanguages::new());
        }
    };
    let mut languages = InterfaceLanguages::with_capacity(outlines.len());
    for (language, outline) in outlines {
        match serde_json::from_value::<Vec<IndexEntry>>(outline) {
            Ok(entries) => {
                languages.insert(language, entries);
            }
            Err(err) => debug!("skipping interface language `{language}`: {err}"),
        }
    }
    Ok(languages)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    Topic,
    Section,
    #[serde(untagged)]
    Other(String),
}

impl ReferenceKind {
    /// Topic-like references point into an archive and can go inactive.
    pub fn is_topic_like(&self) -> bool {
        matches!(self, Self::Topic | Self::Section)
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceRecord {
    #[serde(default)]
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: Option<ReferenceKind>,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReferenceRecord {
    pub fn is_topic_like(&self) -> bool {
        self.kind
            .as_ref()
            .map(ReferenceKind::is_topic_like)
            .unwrap_or(false)
    }
}

/// One entry of an interface-language outline. Anything that does not decode
/// as a node is kept as `Malformed` so a single bad branch cannot fail the
/// whole document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    Node(Arc<TreeNode>),
    Malformed(Value),
}

impl IndexEntry {
    pub fn node(&self) -> Option<&Arc<TreeNode>> {
        match self {
            Self::Node(node) => Some(node),
            Self::Malformed(_) => None,
        }
    }
}

impl From<TreeNode> for IndexEntry {
    fn from(node: TreeNode) -> Self {
        Self::Node(Arc::new(node))
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeNode {
    pub title: Option<String>,
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub children: Vec<IndexEntry>,
    pub beta: bool,
    pub deprecated: bool,
    pub external: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TreeNode {
    pub fn new(title: impl Into<String>, path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            path: Some(path.into()),
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    pub fn group_marker(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            kind: Some(GROUP_MARKER_KIND.to_string()),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<IndexEntry>) -> Self {
        self.children = children;
        self
    }

    pub fn is_group_marker(&self) -> bool {
        self.kind.as_deref() == Some(GROUP_MARKER_KIND)
    }

    /// A node needs a title, and a path unless it only labels a group.
    pub fn is_well_formed(&self) -> bool {
        let has_title = self.title.as_deref().is_some_and(|t| !t.is_empty());
        let has_path = self.path.as_deref().is_some_and(|p| !p.is_empty());
        has_title && (has_path || self.is_group_marker())
    }
}
