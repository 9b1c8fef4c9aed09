use chrono::NaiveDate;
use sqlx::FromRow;

use wardline_core::domain::patient::PatientRecord;

use super::{PatientRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPatientRepository {
    pool: DbPool,
}

impl SqlPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PatientRow {
    full_name: String,
    age: i64,
    gender: String,
    ward: String,
    bed: String,
    diagnosis: String,
    attending_physician: String,
    admitted_on: NaiveDate,
}

impl TryFrom<PatientRow> for PatientRecord {
    type Error = RepositoryError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let age = u32::try_from(row.age)
            .map_err(|_| RepositoryError::Decode(format!("patient age out of range: {}", row.age)))?;
        Ok(PatientRecord {
            full_name: row.full_name,
            age,
            gender: row.gender,
            ward: row.ward,
            bed: row.bed,
            diagnosis: row.diagnosis,
            attending_physician: row.attending_physician,
            admitted_on: row.admitted_on,
        })
    }
}

#[async_trait::async_trait]
impl PatientRepository for SqlPatientRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<PatientRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, PatientRow>(
            "SELECT full_name, age, gender, ward, bed, diagnosis, attending_physician, admitted_on \
             FROM patient WHERE full_name = ?1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PatientRecord::try_from).transpose()
    }

    async fn save(&self, record: PatientRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO patient \
             (full_name, age, gender, ward, bed, diagnosis, attending_physician, admitted_on) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&record.full_name)
        .bind(i64::from(record.age))
        .bind(&record.gender)
        .bind(&record.ward)
        .bind(&record.bed)
        .bind(&record.diagnosis)
        .bind(&record.attending_physician)
        .bind(record.admitted_on)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
