use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One admitted patient as the lookup store returns it. The webhook core
/// only carries this through to the flex renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub full_name: String,
    pub age: u32,
    pub gender: String,
    pub ward: String,
    pub bed: String,
    pub diagnosis: String,
    pub attending_physician: String,
    pub admitted_on: NaiveDate,
}
