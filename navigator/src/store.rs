use crate::index::FlatIndex;
use crate::index::TechnologyTable;
use crate::proto::ApiChanges;
use crate::proto::References;
use serde::Serialize;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Empty,
    Populated,
    Error,
}

/// Everything one successful fetch produces.
#[derive(Clone, Debug, Default)]
pub struct LoadedIndex {
    pub flat: FlatIndex,
    pub references: References,
    pub technologies: TechnologyTable,
    pub included_archive_identifiers: Vec<String>,
}

/// Read-only view of the store at one point in time.
#[derive(Clone, Debug, Default)]
pub struct IndexState {
    pub flat: Arc<FlatIndex>,
    pub references: Arc<References>,
    pub technologies: Arc<TechnologyTable>,
    pub included_archive_identifiers: Arc<[String]>,
    pub api_changes: Arc<ApiChanges>,
    pub error_fetching: bool,
    /// Set once a fetch has landed, even when the document held nothing.
    pub populated: bool,
}

impl IndexState {
    pub fn status(&self) -> IndexStatus {
        if self.error_fetching {
            IndexStatus::Error
        } else if self.populated || !self.flat.is_empty() || !self.references.is_empty() {
            IndexStatus::Populated
        } else {
            IndexStatus::Empty
        }
    }
}

/// Shared holder of the loaded navigator index. Writers swap whole fields;
/// readers take a [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct IndexStore {
    state: RwLock<IndexState>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        *self.write() = IndexState::default();
    }

    pub fn set_flat_children(&self, flat: FlatIndex) {
        self.write().flat = Arc::new(flat);
    }

    pub fn set_references(&self, references: References) {
        self.write().references = Arc::new(references);
    }

    pub fn set_technology_props(&self, technologies: TechnologyTable) {
        self.write().technologies = Arc::new(technologies);
    }

    pub fn set_included_archive_identifiers(&self, identifiers: Vec<String>) {
        self.write().included_archive_identifiers = identifiers.into();
    }

    pub fn set_api_changes(&self, changes: ApiChanges) {
        self.write().api_changes = Arc::new(changes);
    }

    pub fn set_error_fetching(&self, error_fetching: bool) {
        self.write().error_fetching = error_fetching;
    }

    pub fn populate(&self, loaded: LoadedIndex) {
        let mut state = self.write();
        state.flat = Arc::new(loaded.flat);
        state.references = Arc::new(loaded.references);
        state.technologies = Arc::new(loaded.technologies);
        state.included_archive_identifiers = loaded.included_archive_identifiers.into();
        state.populated = true;
    }

    pub fn snapshot(&self) -> IndexState {
        self.read().clone()
    }

    pub fn status(&self) -> IndexStatus {
        self.read().status()
    }
}

impl IndexStore {
    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
