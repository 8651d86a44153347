//! Tests for storage backends
use crate::model::{DateSelector, Dosage, ExerciseId, PatientId, PatientStatus, RoutineExercise};
use crate::storage::backends::{FileBackend, MemoryBackend};
use crate::storage::error::StorageError;
use crate::storage::traits::UnifiedStorage;
use crate::storage::types::*;
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_patient(email: &str, status: PatientStatus) -> NewPatient {
    NewPatient {
        full_name: format!("Patient {email}"),
        email: email.to_string(),
        status,
    }
}

/// Seed one active patient and one routine with a single exercise
async fn seed(storage: &dyn UnifiedStorage) -> (PatientId, crate::model::RoutineId) {
    let patient = storage
        .patient_storage()
        .insert(new_patient("ana@example.com", PatientStatus::Active))
        .await
        .unwrap();
    let exercise = storage
        .catalog_storage()
        .insert_exercise(NewExercise {
            name: "Sentadilla".to_string(),
            description: "Bajar despacio".to_string(),
            media: None,
        })
        .await
        .unwrap();
    let routine = storage
        .catalog_storage()
        .insert_routine(NewRoutine {
            name: "Rodilla".to_string(),
            description: String::new(),
            exercises: vec![RoutineExercise {
                exercise_id: exercise.id,
                series: 3,
                dosage: Dosage::repetitions(10),
                order: 1,
            }],
        })
        .await
        .unwrap();
    (patient.id, routine.id)
}

async fn exercise_assignment_contract(storage: Arc<dyn UnifiedStorage>) {
    let (patient_id, routine_id) = seed(storage.as_ref()).await;
    let store = storage.assignment_storage();
    let new = NewAssignment {
        patient_id,
        routine_id,
        date: day("2026-03-02"),
    };

    let created = store.create(new).await.unwrap();
    assert!(matches!(
        store.create(new).await,
        Err(StorageError::Conflict { constraint: "assignment_triple", .. })
    ));

    let listed = store.list(patient_id, DateSelector::All).await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    store.delete(created.id).await.unwrap();
    assert!(store.delete(created.id).await.unwrap_err().is_not_found());
    assert!(store.list(patient_id, DateSelector::All).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_backend_assignment_contract() {
    exercise_assignment_contract(Arc::new(MemoryBackend::new())).await;
}

#[tokio::test]
async fn test_file_backend_assignment_contract() {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::open(dir.path().join("planner.json")).await.unwrap();
    exercise_assignment_contract(Arc::new(backend)).await;
}

#[tokio::test]
async fn test_concurrent_duplicate_assign_has_single_winner() {
    let storage = Arc::new(MemoryBackend::new());
    let (patient_id, routine_id) = seed(storage.as_ref()).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage
                .assignment_storage()
                .create(NewAssignment {
                    patient_id,
                    routine_id,
                    date: day("2026-04-10"),
                })
                .await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) if e.is_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 15);
}

#[tokio::test]
async fn test_assignment_requires_active_patient_and_existing_routine() {
    let storage = MemoryBackend::new();
    let (_, routine_id) = seed(&storage).await;
    let pending = storage
        .patient_storage()
        .insert(new_patient("pending@example.com", PatientStatus::Pending))
        .await
        .unwrap();

    let err = storage
        .assignment_storage()
        .create(NewAssignment {
            patient_id: pending.id,
            routine_id,
            date: day("2026-03-02"),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = storage
        .assignment_storage()
        .create(NewAssignment {
            patient_id: PatientId(999),
            routine_id,
            date: day("2026-03-02"),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_listing_orders_by_date_then_insertion() {
    let storage = MemoryBackend::new();
    let (patient_id, first_routine) = seed(&storage).await;
    let second_routine = storage
        .catalog_storage()
        .insert_routine(NewRoutine {
            name: "Hombro".to_string(),
            description: String::new(),
            exercises: vec![],
        })
        .await
        .unwrap()
        .id;
    let store = storage.assignment_storage();

    let later = store
        .create(NewAssignment {
            patient_id,
            routine_id: first_routine,
            date: day("2026-03-05"),
        })
        .await
        .unwrap();
    let same_day_b = store
        .create(NewAssignment {
            patient_id,
            routine_id: second_routine,
            date: day("2026-03-01"),
        })
        .await
        .unwrap();
    let same_day_a = store
        .create(NewAssignment {
            patient_id,
            routine_id: first_routine,
            date: day("2026-03-01"),
        })
        .await
        .unwrap();

    let ids: Vec<_> = store
        .list(patient_id, DateSelector::All)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![same_day_b.id, same_day_a.id, later.id]);

    let range = store
        .list(
            patient_id,
            DateSelector::Range {
                from: day("2026-03-02"),
                to: day("2026-03-31"),
            },
        )
        .await
        .unwrap();
    assert_eq!(range.len(), 1);
    assert_eq!(range[0].id, later.id);
}

#[tokio::test]
async fn test_deleting_routine_cascades_assignments() {
    let storage = MemoryBackend::new();
    let (patient_id, routine_id) = seed(&storage).await;
    for d in ["2026-03-01", "2026-03-02"] {
        storage
            .assignment_storage()
            .create(NewAssignment {
                patient_id,
                routine_id,
                date: day(d),
            })
            .await
            .unwrap();
    }

    let removed = storage.catalog_storage().delete_routine(routine_id).await.unwrap();
    assert_eq!(removed, 2);
    assert!(storage
        .assignment_storage()
        .list(patient_id, DateSelector::All)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_routine_rejects_unknown_exercise() {
    let storage = MemoryBackend::new();
    let err = storage
        .catalog_storage()
        .insert_routine(NewRoutine {
            name: "Fantasma".to_string(),
            description: String::new(),
            exercises: vec![RoutineExercise {
                exercise_id: ExerciseId(404),
                series: 1,
                dosage: Dosage::timed(10),
                order: 1,
            }],
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_one_report_per_patient_per_day() {
    let storage = MemoryBackend::new();
    let (patient_id, _) = seed(&storage).await;
    let new = NewReport {
        patient_id,
        date: day("2026-03-01"),
        symptoms: vec![crate::model::Symptom::Tired],
        comment: None,
    };
    storage.report_storage().insert(new.clone()).await.unwrap();
    assert!(storage.report_storage().insert(new).await.unwrap_err().is_conflict());
}

#[tokio::test]
async fn test_file_backend_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("planner.json");

    let assignment = {
        let backend = FileBackend::open(&path).await.unwrap();
        let (patient_id, routine_id) = seed(&backend).await;
        backend
            .assignment_storage()
            .create(NewAssignment {
                patient_id,
                routine_id,
                date: day("2026-05-20"),
            })
            .await
            .unwrap()
    };

    let reopened = FileBackend::open(&path).await.unwrap();
    let rows = reopened
        .assignment_storage()
        .list(assignment.patient_id, DateSelector::Day(day("2026-05-20")))
        .await
        .unwrap();
    assert_eq!(rows, vec![assignment]);
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_file_backend_failed_constraint_does_not_persist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("planner.json");
    let backend = FileBackend::open(&path).await.unwrap();
    seed(&backend).await;

    let before = std::fs::read_to_string(&path).unwrap();
    let _ = backend
        .patient_storage()
        .insert(new_patient("ana@example.com", PatientStatus::Active))
        .await
        .unwrap_err();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_names_are_unique_ignoring_accented_case() {
    let storage = MemoryBackend::new();
    let catalog = storage.catalog_storage();
    let exercise = |name: &str| NewExercise {
        name: name.to_string(),
        description: String::new(),
        media: None,
    };
    let routine = |name: &str| NewRoutine {
        name: name.to_string(),
        description: String::new(),
        exercises: Vec::new(),
    };

    catalog.insert_exercise(exercise("Elevación")).await.unwrap();
    assert!(matches!(
        catalog.insert_exercise(exercise("ELEVACIÓN")).await,
        Err(StorageError::Conflict { constraint: "exercise_name", .. })
    ));

    catalog.insert_routine(routine("Extensión lumbar")).await.unwrap();
    assert!(matches!(
        catalog.insert_routine(routine("EXTENSIÓN LUMBAR")).await,
        Err(StorageError::Conflict { constraint: "routine_name", .. })
    ));
    assert_eq!(catalog.list_exercises().await.unwrap().len(), 1);
}

async fn remove_routine_exercise_contract(storage: Arc<dyn UnifiedStorage>) {
    let catalog = storage.catalog_storage();
    let mut ids = Vec::new();
    for name in ["Puente", "Plancha", "Sentadilla"] {
        let exercise = catalog
            .insert_exercise(NewExercise {
                name: name.to_string(),
                description: String::new(),
                media: None,
            })
            .await
            .unwrap();
        ids.push(exercise.id);
    }
    let entries = |ids: &[ExerciseId]| -> Vec<RoutineExercise> {
        ids.iter()
            .enumerate()
            .map(|(index, id)| RoutineExercise {
                exercise_id: *id,
                series: 1,
                dosage: Dosage::repetitions(8),
                order: index as u32 + 1,
            })
            .collect()
    };
    let routine = catalog
        .insert_routine(NewRoutine {
            name: "Core".to_string(),
            description: String::new(),
            exercises: entries(&ids),
        })
        .await
        .unwrap();
    catalog
        .replace_routine(
            routine.id,
            NewRoutine {
                name: "Core avanzado".to_string(),
                description: String::new(),
                exercises: entries(&ids),
            },
        )
        .await
        .unwrap();

    let updated = catalog
        .remove_routine_exercise(routine.id, ids[1])
        .await
        .unwrap();
    assert_eq!(updated.name, "Core avanzado");
    let order: Vec<_> = updated
        .exercises
        .iter()
        .map(|e| (e.exercise_id, e.order))
        .collect();
    assert_eq!(order, vec![(ids[0], 1), (ids[2], 2)]);

    assert!(catalog
        .remove_routine_exercise(routine.id, ids[1])
        .await
        .unwrap_err()
        .is_not_found());
    let stored = catalog.get_routine(routine.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_memory_backend_removes_routine_exercise_in_place() {
    remove_routine_exercise_contract(Arc::new(MemoryBackend::new())).await;
}

#[tokio::test]
async fn test_file_backend_removes_routine_exercise_in_place() {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::open(dir.path().join("planner.json")).await.unwrap();
    remove_routine_exercise_contract(Arc::new(backend)).await;
}
