//! Daily symptom reports filed by patients

use super::{PatientId, ReportId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of symptoms a patient can tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Tired,
    ChronicPain,
    AcutePain,
    MovementDifficulty,
    InjuryWorsening,
}

impl Symptom {
    pub const ALL: [Symptom; 5] = [
        Symptom::Tired,
        Symptom::ChronicPain,
        Symptom::AcutePain,
        Symptom::MovementDifficulty,
        Symptom::InjuryWorsening,
    ];

    /// Label shown in the clinic UI
    pub fn label(&self) -> &'static str {
        match self {
            Symptom::Tired => "Cansado",
            Symptom::ChronicPain => "Dolor crónico",
            Symptom::AcutePain => "Dolores agudos",
            Symptom::MovementDifficulty => "Dificultades de movimiento",
            Symptom::InjuryWorsening => "Intensificación de la lesión",
        }
    }
}

/// At most one per patient per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub id: ReportId,
    pub patient_id: PatientId,
    pub date: NaiveDate,
    pub symptoms: Vec<Symptom>,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symptom_labels_are_distinct() {
        let labels: std::collections::HashSet<_> = Symptom::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), Symptom::ALL.len());
    }

    #[test]
    fn test_symptom_wire_names() {
        let json = serde_json::to_string(&Symptom::MovementDifficulty).unwrap();
        assert_eq!(json, "\"movement_difficulty\"");
    }
}
