//! Common test utilities and helpers

#![allow(dead_code)]

use physio_planner::app::AppContext;
use physio_planner::model::{ExerciseId, PatientId, RoutineDraft, RoutineId};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::TcpListener;

/// A running API server on an ephemeral port plus direct service access
pub struct TestServer {
    pub base_url: String,
    pub context: AppContext,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(AppContext::in_memory()).await
    }

    pub async fn start_with(context: AppContext) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = context.clone();
        let handle = tokio::spawn(async move {
            physio_planner::api::serve_on(listener, served).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            context,
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        decode(response).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self.client.post(self.url(path)).json(body).send().await.unwrap();
        decode(response).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self.client.put(self.url(path)).json(body).send().await.unwrap();
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        let response = self.client.delete(self.url(path)).send().await.unwrap();
        decode(response).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn decode(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

/// Deserialize the `data` field of an envelope
pub fn data<T: DeserializeOwned>(body: &Value) -> T {
    serde_json::from_value(body["data"].clone()).unwrap()
}

/// Seeded clinic: one active patient, a rep-based and a timed exercise,
/// and a routine using both
pub struct Clinic {
    pub patient: PatientId,
    pub squat: ExerciseId,
    pub plank: ExerciseId,
    pub routine: RoutineId,
}

pub async fn seed_clinic(context: &AppContext) -> Clinic {
    let patient = context
        .directory
        .register_patient("Ana Torres", "ana@example.com")
        .await
        .unwrap();
    context.directory.approve(patient.id).await.unwrap();
    let squat = context
        .catalog
        .create_exercise("Sentadilla", "Bajar hasta 90 grados", None)
        .await
        .unwrap();
    let plank = context
        .catalog
        .create_exercise("Plancha", "Mantener la espalda recta", None)
        .await
        .unwrap();
    let routine = context
        .catalog
        .create_routine(
            RoutineDraft::new("Fuerza básica")
                .with_exercise(squat.id, 2, "10 repeticiones")
                .with_exercise(plank.id, 1, "30 segundos"),
        )
        .await
        .unwrap();
    Clinic {
        patient: patient.id,
        squat: squat.id,
        plank: plank.id,
        routine: routine.id,
    }
}
