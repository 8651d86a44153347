//! Runtime initialization and setup

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::app::logging::init_logging;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::directory::PatientDirectory;
use crate::error::Result;
use crate::execution::ExecutionEngine;
use crate::plan::DailyPlanResolver;
use crate::reports::ReportService;
use crate::scheduler::Scheduler;
use crate::storage::{StorageFactory, UnifiedStorage};

/// Storage plus every service built on it
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub storage: Arc<dyn UnifiedStorage>,
    pub directory: PatientDirectory,
    pub catalog: Catalog,
    pub scheduler: Scheduler,
    pub resolver: DailyPlanResolver,
    pub reports: ReportService,
}

impl AppContext {
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let storage = StorageFactory::from_config(&config.storage).await?;
        debug!("Using {:?} storage backend", config.storage.backend);
        Ok(Self::with_storage(config, storage))
    }

    /// Default configuration over a fresh memory backend
    pub fn in_memory() -> Self {
        Self::with_storage(AppConfig::default(), StorageFactory::memory())
    }

    pub fn with_storage(config: AppConfig, storage: Arc<dyn UnifiedStorage>) -> Self {
        let scheduler = Scheduler::new(storage.clone());
        Self {
            directory: PatientDirectory::new(storage.clone()),
            catalog: Catalog::new(storage.clone()),
            resolver: DailyPlanResolver::new(scheduler.clone(), storage.clone()),
            reports: ReportService::new(storage.clone()),
            scheduler,
            storage,
            config,
        }
    }

    pub fn rest_interval(&self) -> Duration {
        self.config.execution.rest_interval
    }

    /// A fresh engine for one patient's session, using the configured rest
    pub fn execution_engine(&self) -> ExecutionEngine {
        ExecutionEngine::new(self.rest_interval())
    }
}

/// Initialize logging and build the application context
pub async fn initialize_app(config: AppConfig, verbose: u8) -> anyhow::Result<AppContext> {
    init_logging(&config, verbose);

    let context = AppContext::from_config(config).await?;
    let health = context.storage.health_check().await?;
    info!(
        "Storage ready ({}): {} patients, {} routines, {} assignments",
        health.backend_type, health.patients, health.routines, health.assignments
    );
    Ok(context)
}
