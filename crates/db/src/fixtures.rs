use chrono::NaiveDate;

use wardline_core::domain::patient::PatientRecord;

use crate::repositories::{PatientRepository, RepositoryError, SqlPatientRepository};
use crate::DbPool;

/// Deterministic seed set used by repository tests and local demos.
pub fn sample_patients() -> Vec<PatientRecord> {
    vec![
        PatientRecord {
            full_name: "Somchai Jaidee".to_string(),
            age: 72,
            gender: "male".to_string(),
            ward: "Medical Ward 2".to_string(),
            bed: "12A".to_string(),
            diagnosis: "Type 2 diabetes, hypertension".to_string(),
            attending_physician: "Dr. Pimchanok Srisuwan".to_string(),
            admitted_on: date(2025, 11, 3),
        },
        PatientRecord {
            full_name: "Malee Thongdee".to_string(),
            age: 68,
            gender: "female".to_string(),
            ward: "Geriatric Ward 1".to_string(),
            bed: "4C".to_string(),
            diagnosis: "Post-operative hip replacement recovery".to_string(),
            attending_physician: "Dr. Anan Charoensuk".to_string(),
            admitted_on: date(2025, 12, 18),
        },
        PatientRecord {
            full_name: "Prasert Wongsawat".to_string(),
            age: 81,
            gender: "male".to_string(),
            ward: "Medical Ward 2".to_string(),
            bed: "7B".to_string(),
            diagnosis: "Chronic obstructive pulmonary disease".to_string(),
            attending_physician: "Dr. Pimchanok Srisuwan".to_string(),
            admitted_on: date(2026, 1, 9),
        },
    ]
}

pub async fn seed_sample_patients(pool: &DbPool) -> Result<usize, RepositoryError> {
    let repository = SqlPatientRepository::new(pool.clone());
    let records = sample_patients();
    let count = records.len();
    for record in records {
        repository.save(record).await?;
    }
    Ok(count)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
