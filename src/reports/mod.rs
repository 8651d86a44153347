//! Daily symptom reports
//!
//! A patient files at most one report per day; later changes go through
//! `update`. Clinicians read them per patient or as a summary.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ErrorCode, PlannerError, Result};
use crate::model::{PatientId, Symptom, SymptomReport};
use crate::storage::{NewReport, UnifiedStorage};

const MAX_COMMENT_CHARS: usize = 1000;

/// Report body as submitted by the patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReportInput {
    pub fn new(symptoms: impl IntoIterator<Item = Symptom>) -> Self {
        Self {
            symptoms: symptoms.into_iter().collect(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Deduplicate symptoms and normalise the comment
    fn normalize(self) -> Result<(Vec<Symptom>, Option<String>)> {
        let mut symptoms = Vec::with_capacity(self.symptoms.len());
        for symptom in self.symptoms {
            if !symptoms.contains(&symptom) {
                symptoms.push(symptom);
            }
        }
        if symptoms.is_empty() {
            return Err(PlannerError::validation_with_code(
                ErrorCode::VALIDATION_REQUIRED_FIELD,
                "select at least one symptom",
                Some("symptoms".to_string()),
            ));
        }

        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS)
        {
            return Err(PlannerError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("comment is longer than {} characters", MAX_COMMENT_CHARS),
                Some("comment".to_string()),
            ));
        }
        Ok((symptoms, comment))
    }
}

/// Per-patient line of the clinician overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientReportSummary {
    pub patient_id: PatientId,
    pub full_name: String,
    pub report_count: usize,
    pub latest_date: NaiveDate,
}

#[derive(Clone)]
pub struct ReportService {
    storage: Arc<dyn UnifiedStorage>,
}

impl ReportService {
    pub fn new(storage: Arc<dyn UnifiedStorage>) -> Self {
        Self { storage }
    }

    pub async fn submit_today(&self, patient_id: PatientId, input: ReportInput) -> Result<SymptomReport> {
        self.submit(patient_id, today(), input).await
    }

    pub async fn update_today(&self, patient_id: PatientId, input: ReportInput) -> Result<SymptomReport> {
        self.update(patient_id, today(), input).await
    }

    pub async fn get_today(&self, patient_id: PatientId) -> Result<Option<SymptomReport>> {
        self.get(patient_id, today()).await
    }

    pub async fn delete_today(&self, patient_id: PatientId) -> Result<()> {
        self.delete(patient_id, today()).await
    }

    /// File the report for a day; a second one for the same day is a conflict
    pub async fn submit(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
        input: ReportInput,
    ) -> Result<SymptomReport> {
        let (symptoms, comment) = input.normalize()?;
        let report = self
            .storage
            .report_storage()
            .insert(NewReport {
                patient_id,
                date,
                symptoms,
                comment,
            })
            .await?;
        info!("Patient {} filed report {} for {}", patient_id, report.id, date);
        Ok(report)
    }

    pub async fn update(
        &self,
        patient_id: PatientId,
        date: NaiveDate,
        input: ReportInput,
    ) -> Result<SymptomReport> {
        let (symptoms, comment) = input.normalize()?;
        let existing = self.require(patient_id, date).await?;
        let report = self
            .storage
            .report_storage()
            .update(
                existing.id,
                NewReport {
                    patient_id,
                    date,
                    symptoms,
                    comment,
                },
            )
            .await?;
        debug!("Patient {} updated report {}", patient_id, report.id);
        Ok(report)
    }

    pub async fn get(&self, patient_id: PatientId, date: NaiveDate) -> Result<Option<SymptomReport>> {
        Ok(self.storage.report_storage().find(patient_id, date).await?)
    }

    pub async fn delete(&self, patient_id: PatientId, date: NaiveDate) -> Result<()> {
        let existing = self.require(patient_id, date).await?;
        self.storage.report_storage().delete(existing.id).await?;
        info!("Patient {} withdrew report for {}", patient_id, date);
        Ok(())
    }

    /// All of a patient's reports, newest first
    pub async fn reports_for_patient(&self, patient_id: PatientId) -> Result<Vec<SymptomReport>> {
        Ok(self
            .storage
            .report_storage()
            .list_for_patient(patient_id)
            .await?)
    }

    /// Report count and latest date per patient, most recent activity first
    pub async fn report_summary(&self) -> Result<Vec<PatientReportSummary>> {
        let reports = self.storage.report_storage().list_all().await?;
        let mut per_patient: BTreeMap<PatientId, (usize, NaiveDate)> = BTreeMap::new();
        for report in &reports {
            per_patient
                .entry(report.patient_id)
                .and_modify(|(count, latest)| {
                    *count += 1;
                    if report.date > *latest {
                        *latest = report.date;
                    }
                })
                .or_insert((1, report.date));
        }

        let patients = self.storage.patient_storage();
        let mut rows = Vec::with_capacity(per_patient.len());
        for (patient_id, (report_count, latest_date)) in per_patient {
            let full_name = patients
                .get(patient_id)
                .await?
                .map(|p| p.full_name)
                .unwrap_or_default();
            rows.push(PatientReportSummary {
                patient_id,
                full_name,
                report_count,
                latest_date,
            });
        }
        rows.sort_by(|a, b| b.latest_date.cmp(&a.latest_date).then(a.patient_id.cmp(&b.patient_id)));
        Ok(rows)
    }

    async fn require(&self, patient_id: PatientId, date: NaiveDate) -> Result<SymptomReport> {
        self.get(patient_id, date).await?.ok_or_else(|| {
            PlannerError::not_found("report", format!("report of patient {} for {}", patient_id, date))
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
