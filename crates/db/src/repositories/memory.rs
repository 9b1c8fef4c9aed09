use std::collections::HashMap;

use tokio::sync::RwLock;

use wardline_core::domain::patient::PatientRecord;

use super::{PatientRepository, RepositoryError};

/// Test- and demo-friendly patient store keyed by full name.
#[derive(Default)]
pub struct InMemoryPatientRepository {
    records: RwLock<HashMap<String, PatientRecord>>,
}

#[async_trait::async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<PatientRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.get(name).cloned())
    }

    async fn save(&self, record: PatientRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.insert(record.full_name.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryPatientRepository;
    use crate::fixtures::sample_patients;
    use crate::repositories::PatientRepository;

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repository = InMemoryPatientRepository::default();
        let record = sample_patients().remove(0);

        repository.save(record.clone()).await.expect("save should succeed");
        let found = repository
            .find_by_name(&record.full_name)
            .await
            .expect("find should succeed")
            .expect("record should be present");

        assert_eq!(found, record);
    }
}
