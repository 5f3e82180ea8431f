//! Navigator index engine for documentation archives.
//!
//! A fetched index document is flattened into per-language pre-order node
//! arrays, its reference table is filtered against the loaded archives, and
//! the result lands in an [`IndexStore`] that readers snapshot.

pub mod config;
pub mod error;
pub mod fetch;
pub mod highlight;
pub mod index;
pub mod json_pointer;
pub mod paging;
pub mod proto;
pub mod quick_nav;
pub mod references;
pub mod store;

pub use config::NavigatorConfig;
pub use error::NavigatorError;
pub use error::Result;
pub use fetch::FileIndexSource;
pub use fetch::HttpIndexSource;
pub use fetch::IndexSource;
pub use fetch::load_document;
pub use fetch::load_index;
pub use highlight::Segment;
pub use highlight::highlight;
pub use highlight::safe_highlight_pattern;
pub use index::FlatIndex;
pub use index::LanguageIndex;
pub use index::NodeFilter;
pub use index::NodeRef;
pub use index::flatten_index;
pub use proto::ApiChanges;
pub use proto::ChangeKind;
pub use proto::IndexDocument;
pub use proto::ReferenceRecord;
pub use proto::References;
pub use quick_nav::quick_navigation;
pub use references::filter_references;
pub use store::IndexStatus;
pub use store::IndexStore;
pub use store::LoadedIndex;
