use serde::Serialize;

use wardline_core::domain::patient::PatientRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlexLayout {
    Vertical,
    Horizontal,
    Baseline,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexComponent {
    Box {
        layout: FlexLayout,
        contents: Vec<FlexComponent>,
        #[serde(skip_serializing_if = "Option::is_none")]
        spacing: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        margin: Option<String>,
    },
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        weight: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        flex: Option<u32>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        wrap: bool,
    },
    Separator {
        #[serde(skip_serializing_if = "Option::is_none")]
        margin: Option<String>,
    },
}

impl FlexComponent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into(), weight: None, size: None, color: None, flex: None, wrap: false }
    }

    pub fn vertical_box(contents: Vec<FlexComponent>) -> Self {
        Self::Box { layout: FlexLayout::Vertical, contents, spacing: None, margin: None }
    }

    pub fn horizontal_box(contents: Vec<FlexComponent>) -> Self {
        Self::Box { layout: FlexLayout::Horizontal, contents, spacing: None, margin: None }
    }

    pub fn weight(mut self, value: impl Into<String>) -> Self {
        if let Self::Text { weight, .. } = &mut self {
            *weight = Some(value.into());
        }
        self
    }

    pub fn size(mut self, value: impl Into<String>) -> Self {
        if let Self::Text { size, .. } = &mut self {
            *size = Some(value.into());
        }
        self
    }

    pub fn color(mut self, value: impl Into<String>) -> Self {
        if let Self::Text { color, .. } = &mut self {
            *color = Some(value.into());
        }
        self
    }

    pub fn flex(mut self, value: u32) -> Self {
        if let Self::Text { flex, .. } = &mut self {
            *flex = Some(value);
        }
        self
    }

    pub fn wrap(mut self) -> Self {
        if let Self::Text { wrap, .. } = &mut self {
            *wrap = true;
        }
        self
    }

    pub fn spacing(mut self, value: impl Into<String>) -> Self {
        if let Self::Box { spacing, .. } = &mut self {
            *spacing = Some(value.into());
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexContainer {
    Bubble {
        #[serde(skip_serializing_if = "Option::is_none")]
        header: Option<FlexComponent>,
        body: FlexComponent,
    },
}

fn labelled_row(label: &str, value: impl Into<String>) -> FlexComponent {
    FlexComponent::horizontal_box(vec![
        FlexComponent::text(label).color("#8C8C8C").size("sm").flex(2),
        FlexComponent::text(value).size("sm").flex(5).wrap(),
    ])
}

/// Builds the reply card for one patient record. Total function: every
/// record renders, there is no failure path.
pub fn patient_bubble(record: &PatientRecord) -> FlexContainer {
    let header = FlexComponent::vertical_box(vec![
        FlexComponent::text("Patient Record").weight("bold").size("xl"),
        FlexComponent::text(record.full_name.clone()).size("md").color("#555555"),
    ]);

    let body = FlexComponent::vertical_box(vec![
        labelled_row("Ward", format!("{}, bed {}", record.ward, record.bed)),
        labelled_row("Age", record.age.to_string()),
        labelled_row("Gender", record.gender.clone()),
        FlexComponent::Separator { margin: Some("md".to_string()) },
        labelled_row("Diagnosis", record.diagnosis.clone()),
        labelled_row("Physician", record.attending_physician.clone()),
        labelled_row("Admitted", record.admitted_on.format("%Y-%m-%d").to_string()),
    ])
    .spacing("sm");

    FlexContainer::Bubble { header: Some(header), body }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use wardline_core::domain::patient::PatientRecord;

    use super::{patient_bubble, FlexComponent};

    fn record() -> PatientRecord {
        PatientRecord {
            full_name: "Somchai Jaidee".to_string(),
            age: 72,
            gender: "male".to_string(),
            ward: "Medical Ward 2".to_string(),
            bed: "12A".to_string(),
            diagnosis: "Type 2 diabetes".to_string(),
            attending_physician: "Dr. Pimchanok Srisuwan".to_string(),
            admitted_on: NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date"),
        }
    }

    #[test]
    fn text_component_serializes_with_type_tag_and_skips_defaults() {
        let component = FlexComponent::text("Ward").size("sm").flex(2);

        let value = serde_json::to_value(&component).expect("serialization should succeed");
        assert_eq!(value, json!({"type": "text", "text": "Ward", "size": "sm", "flex": 2}));
    }

    #[test]
    fn bubble_carries_header_and_labelled_body_rows() {
        let value =
            serde_json::to_value(patient_bubble(&record())).expect("serialization should succeed");

        assert_eq!(value["type"], "bubble");
        assert_eq!(value["header"]["type"], "box");
        assert_eq!(value["header"]["contents"][1]["text"], "Somchai Jaidee");

        let rows = value["body"]["contents"].as_array().expect("body rows");
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0]["contents"][0]["text"], "Ward");
        assert_eq!(rows[0]["contents"][1]["text"], "Medical Ward 2, bed 12A");
        assert_eq!(rows[3]["type"], "separator");
        assert_eq!(rows[6]["contents"][1]["text"], "2025-11-03");
    }

    #[test]
    fn rendering_is_deterministic() {
        let first = serde_json::to_string(&patient_bubble(&record())).expect("first render");
        let second = serde_json::to_string(&patient_bubble(&record())).expect("second render");
        assert_eq!(first, second);
    }
}
