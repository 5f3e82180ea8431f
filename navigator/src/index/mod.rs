//! Flat navigator index: model, flattening, tree queries, and filtering.

pub mod filter;
pub mod flatten;
pub mod model;
mod tree;

pub use filter::NodeFilter;
pub use filter::with_ancestors;
pub use flatten::flatten_index;
pub use model::FlatIndex;
pub use model::FlattenedIndex;
pub use model::LanguageIndex;
pub use model::NavigatorNode;
pub use model::NodeRef;
pub use model::NodeView;
pub use model::ParentId;
pub use model::Segment;
pub use model::TechnologyProps;
pub use model::TechnologyTable;
