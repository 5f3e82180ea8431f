use crate::error::NavigatorError;
use crate::error::Result;
use crate::index::flatten_index;
use crate::proto::ApiChanges;
use crate::proto::INDEX_FILENAME;
use crate::proto::IndexDocument;
use crate::references::filter_references;
use crate::store::IndexStatus;
use crate::store::IndexStore;
use crate::store::LoadedIndex;
use async_trait::async_trait;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Path of the index document for `locale`, relative to the host root.
pub fn index_data_path(locale: Option<&str>) -> String {
    match locale.map(str::trim).filter(|slug| !slug.is_empty()) {
        Some(slug) => format!("/index/{slug}/{INDEX_FILENAME}"),
        None => format!("/index/{INDEX_FILENAME}"),
    }
}

#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Raw bytes of the index document for `locale`.
    async fn fetch(&self, locale: Option<&str>) -> Result<Vec<u8>>;

    fn describe(&self) -> String;
}

pub struct HttpIndexSource {
    base_url: String,
    http: reqwest::Client,
}

impl HttpIndexSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(NavigatorError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http:// or https:// url".to_string(),
            });
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: trimmed.to_string(),
            http,
        })
    }

    pub fn url_for(&self, locale: Option<&str>) -> String {
        format!("{}{}", self.base_url, index_data_path(locale))
    }
}

#[async_trait]
impl IndexSource for HttpIndexSource {
    async fn fetch(&self, locale: Option<&str>) -> Result<Vec<u8>> {
        let url = self.url_for(locale);
        debug!("navigator fetching index from {url}");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NavigatorError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads an index document from disk: either the document itself or a
/// documentation root that holds `index/[<locale>/]index.json`.
pub struct FileIndexSource {
    path: PathBuf,
}

impl FileIndexSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn resolve(&self, locale: Option<&str>) -> PathBuf {
        if self.path.is_dir() {
            let relative = index_data_path(locale);
            self.path.join(relative.trim_start_matches('/'))
        } else {
            self.path.clone()
        }
    }
}

#[async_trait]
impl IndexSource for FileIndexSource {
    async fn fetch(&self, locale: Option<&str>) -> Result<Vec<u8>> {
        let path = self.resolve(locale);
        debug!("navigator reading index from {}", path.display());
        Ok(tokio::fs::read(&path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Picks a source for a command-line style location.
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn IndexSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpIndexSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileIndexSource::new(Path::new(location))))
    }
}

/// Decodes an index document. serde_json caps nesting at 128 levels, which
/// allows outlines roughly 60 nodes deep; deeper documents fail to decode.
pub fn decode_document(bytes: &[u8]) -> Result<IndexDocument> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a path to change-kind map such as `{"/documentation/kit": "added"}`.
pub fn decode_api_changes(bytes: &[u8]) -> Result<ApiChanges> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Flattens the outline and filters references against the archives the
/// document says are loaded.
pub fn prepare(document: &IndexDocument) -> LoadedIndex {
    let flattened = flatten_index(&document.interface_languages);
    let references = filter_references(
        &document.references,
        &document.included_archive_identifiers,
    );
    LoadedIndex {
        flat: flattened.flat,
        references,
        technologies: flattened.technologies,
        included_archive_identifiers: document.included_archive_identifiers.clone(),
    }
}

pub async fn fetch_document(source: &dyn IndexSource, locale: Option<&str>) -> Result<IndexDocument> {
    let bytes = source.fetch(locale).await?;
    decode_document(&bytes)
}

pub async fn fetch_index(source: &dyn IndexSource, locale: Option<&str>) -> Result<LoadedIndex> {
    Ok(prepare(&fetch_document(source, locale).await?))
}

/// Resets `store` and fills it from `source`. Failures are logged and leave
/// the store empty with its error flag set.
pub async fn load_index(
    source: &dyn IndexSource,
    store: &IndexStore,
    locale: Option<&str>,
) -> IndexStatus {
    load_document(source, store, locale).await;
    store.status()
}

/// Same as [`load_index`], but hands back the decoded document so callers can
/// derive references for another archive set without fetching again.
pub async fn load_document(
    source: &dyn IndexSource,
    store: &IndexStore,
    locale: Option<&str>,
) -> Option<IndexDocument> {
    store.reset();
    match fetch_document(source, locale).await {
        Ok(document) => {
            let loaded = prepare(&document);
            info!(
                "navigator index loaded from {}: {} nodes, {} references",
                source.describe(),
                loaded.flat.total_nodes(),
                loaded.references.len()
            );
            store.populate(loaded);
            Some(document)
        }
        Err(err) => {
            warn!("navigator index fetch from {} failed: {err:?}", source.describe());
            store.set_error_fetching(true);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::method;
    use wiremock::matchers::path;

    fn document() -> serde_json::Value {
        json!({
            "schemaVersion": { "major": 0, "minor": 1, "patch": 1 },
            "includedArchiveIdentifiers": ["Kit"],
            "interfaceLanguages": {
                "swift": [{
                    "title": "Kit",
                    "path": "/documentation/kit",
                    "type": "module",
                    "children": [
                        { "title": "Widget", "path": "/documentation/kit/widget", "type": "class" }
                    ]
                }]
            },
            "references": {
                "doc://Kit/documentation/kit/widget": {
                    "identifier": "doc://Kit/documentation/kit/widget",
                    "type": "topic",
                    "url": "/documentation/kit/widget"
                },
                "doc://Other/documentation/other": {
                    "identifier": "doc://Other/documentation/other",
                    "type": "topic",
                    "url": "/documentation/other"
                }
            }
        })
    }

    #[test]
    fn index_paths_follow_locale() {
        assert_eq!(index_data_path(None), "/index/index.json");
        assert_eq!(index_data_path(Some("")), "/index/index.json");
        assert_eq!(index_data_path(Some("ja-JP")), "/index/ja-JP/index.json");
    }

    #[test]
    fn rejects_non_http_base_urls() {
        let err = HttpIndexSource::new("ftp://docs", Duration::from_secs(1));
        assert!(matches!(err, Err(NavigatorError::InvalidBaseUrl { .. })));
        let source = HttpIndexSource::new("https://docs.example/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            source.url_for(Some("zh-CN")),
            "https://docs.example/index/zh-CN/index.json"
        );
    }

    #[test]
    fn prepare_filters_references_against_included_archives() {
        let document: IndexDocument = serde_json::from_value(document()).unwrap();
        let loaded = prepare(&document);
        assert_eq!(loaded.flat.total_nodes(), 2);
        assert_eq!(
            loaded.references["doc://Kit/documentation/kit/widget"].url.as_deref(),
            Some("/documentation/kit/widget")
        );
        assert_eq!(loaded.references["doc://Other/documentation/other"].url, None);
        assert_eq!(loaded.included_archive_identifiers, vec!["Kit".to_string()]);
    }

    fn nested_document(depth: usize) -> Vec<u8> {
        let mut node = json!({ "title": "leaf", "path": "/documentation/kit/leaf" });
        for level in 0..depth {
            node = json!({
                "title": format!("level {level}"),
                "path": format!("/documentation/kit/{level}"),
                "children": [node]
            });
        }
        serde_json::to_vec(&json!({ "interfaceLanguages": { "swift": [node] } })).unwrap()
    }

    #[test]
    fn nesting_depth_is_capped_by_the_decoder() {
        let document = decode_document(&nested_document(40)).unwrap();
        assert_eq!(prepare(&document).flat.total_nodes(), 41);
        assert!(matches!(
            decode_document(&nested_document(100)),
            Err(NavigatorError::Decode(_))
        ));
    }

    #[test]
    fn decodes_api_changes() {
        let changes =
            decode_api_changes(br#"{"/documentation/kit/widget": "added"}"#).unwrap();
        assert_eq!(
            changes.get("/documentation/kit/widget"),
            Some(&crate::proto::ChangeKind::Added)
        );
        assert!(matches!(
            decode_api_changes(b"[]"),
            Err(NavigatorError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn one_bad_language_does_not_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.json");
        std::fs::write(
            &file,
            serde_json::to_vec(&json!({
                "interfaceLanguages": {
                    "swift": [{ "title": "Kit", "path": "/documentation/kit", "type": "module" }],
                    "occ": { "bad": 1 }
                },
                "references": null
            }))
            .unwrap(),
        )
        .unwrap();
        let store = IndexStore::new();
        let document = load_document(&FileIndexSource::new(&file), &store, None)
            .await
            .unwrap();
        assert_eq!(document.interface_languages.len(), 1);
        let state = store.snapshot();
        assert_eq!(state.status(), IndexStatus::Populated);
        assert_eq!(state.flat.total_nodes(), 1);
        assert!(state.references.is_empty());
    }

    #[tokio::test]
    async fn empty_document_loads_as_populated() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.json");
        std::fs::write(&file, b"{}").unwrap();
        let store = IndexStore::new();
        let status = load_index(&FileIndexSource::new(&file), &store, None).await;
        assert_eq!(status, IndexStatus::Populated);
        assert!(store.snapshot().flat.is_empty());
    }

    #[tokio::test]
    async fn loads_from_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(document()))
            .mount(&server)
            .await;

        let source = HttpIndexSource::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let store = IndexStore::new();
        let status = load_index(&source, &store, None).await;
        assert_eq!(status, IndexStatus::Populated);
        let state = store.snapshot();
        assert_eq!(state.technologies.len(), 1);
        assert_eq!(state.references.len(), 2);
    }

    #[tokio::test]
    async fn http_failure_sets_error_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index/en/index.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = HttpIndexSource::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let store = IndexStore::new();
        store.set_references(serde_json::from_value(json!({ "x": { "identifier": "x" } })).unwrap());
        let status = load_index(&source, &store, Some("en")).await;
        assert_eq!(status, IndexStatus::Error);
        let state = store.snapshot();
        assert!(state.flat.languages.is_empty());
        assert!(state.references.is_empty());
        assert!(state.technologies.is_empty());
        assert!(state.included_archive_identifiers.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_sets_error_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
            .mount(&server)
            .await;

        let source = HttpIndexSource::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let store = IndexStore::new();
        assert_eq!(load_index(&source, &store, None).await, IndexStatus::Error);
        assert!(matches!(
            fetch_index(&source, None).await,
            Err(NavigatorError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn reads_documentation_roots_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let localized = dir.path().join("index").join("ja-JP");
        std::fs::create_dir_all(&localized).unwrap();
        std::fs::write(
            localized.join("index.json"),
            serde_json::to_vec(&document()).unwrap(),
        )
        .unwrap();

        let source = FileIndexSource::new(dir.path());
        let loaded = fetch_index(&source, Some("ja-JP")).await.unwrap();
        assert_eq!(loaded.flat.total_nodes(), 2);

        let store = IndexStore::new();
        assert_eq!(load_index(&source, &store, None).await, IndexStatus::Error);

        let file = FileIndexSource::new(localized.join("index.json"));
        assert_eq!(load_index(&file, &store, None).await, IndexStatus::Populated);
    }
}
