use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::{CopyState, LibraryResult};
use crate::utils::date::serializer;
use crate::utils::mem::MemRecord;

// CopyEntity abstracts a single physical copy of a book. The copy only validates the value
// of its state; when a transition may happen is decided by the loan and return services.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct CopyEntity {
    pub copy_id: String,
    pub version: i64,
    pub code: String,
    pub book_id: String,
    pub copy_state: CopyState,
    pub location: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl CopyEntity {
    pub fn new(code: &str, book_id: &str, location: &str) -> Self {
        Self {
            copy_id: Uuid::new_v4().to_string(),
            version: 0,
            code: code.to_string(),
            book_id: book_id.to_string(),
            copy_state: CopyState::Available,
            location: location.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // replaces the state with the given literal, which must be one of the four legal states
    pub fn set_state(&mut self, state: &str) -> LibraryResult<()> {
        let next = CopyState::try_from(state)?;
        self.transition_to(next);
        Ok(())
    }

    pub fn transition_to(&mut self, state: CopyState) {
        self.copy_state = state;
        self.updated_at = Utc::now().naive_utc();
    }

    pub fn state(&self) -> CopyState {
        self.copy_state
    }

    pub fn is_available(&self) -> bool {
        self.copy_state == CopyState::Available
    }
}

impl Identifiable for CopyEntity {
    fn id(&self) -> String {
        self.copy_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemRecord for CopyEntity {
    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
