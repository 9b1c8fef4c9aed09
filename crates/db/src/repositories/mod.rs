use async_trait::async_trait;
use thiserror::Error;

use wardline_core::domain::patient::PatientRecord;

pub mod memory;
pub mod patient;

pub use memory::InMemoryPatientRepository;
pub use patient::SqlPatientRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Exact-match lookup on the patient's full name.
    async fn find_by_name(&self, name: &str) -> Result<Option<PatientRecord>, RepositoryError>;
    async fn save(&self, record: PatientRecord) -> Result<(), RepositoryError>;
}
