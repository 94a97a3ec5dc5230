//! HomeSync Backend
//!
//! Local-first record store for a household app.
//!
//! Layered architecture:
//! - domain: Entities, validation and derived state
//! - repository: Record stores, snapshot persistence, seeding and backup
//! - commands: Per-screen operations a UI shell calls
//! - config: Application settings

use chrono::NaiveDate;
use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;

use config::AppConfig;
use domain::{
    Bill, CalendarEvent, Clock, DomainError, DomainResult, Document, Entity, FamilyMember,
    GroceryItem, StaffMember, SystemClock, Transaction, Vehicle,
};
use repository::{load_seed, Collection, RecordStore, SeedSource, SnapshotBackend, SqliteBackend};

pub const APP_NAME: &str = "homesync";

/// Application state shared across commands
pub struct AppState {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub staff: Collection<StaffMember>,
    pub bills: Collection<Bill>,
    pub groceries: Collection<GroceryItem>,
    pub events: Collection<CalendarEvent>,
    pub vehicles: Collection<Vehicle>,
    pub family: Collection<FamilyMember>,
    pub documents: Collection<Document>,
    pub transactions: Collection<Transaction>,
}

impl AppState {
    /// Open every collection using the wall clock in the configured zone
    pub async fn open(config: AppConfig) -> DomainResult<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset()?));
        Self::with_clock(config, clock).await
    }

    pub async fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        config.validate()?;
        if !config.persist {
            log::info!("persistence disabled, collections live in memory");
            return Self::in_memory(config, clock);
        }

        let path = config.database_path();
        log::info!("opening database at {}", path.display());
        let backend: Arc<dyn SnapshotBackend> = Arc::new(SqliteBackend::open(&path)?);
        let seed = &config.seed;

        Ok(Self {
            staff: open_collection(&backend, &clock, seed).await?,
            bills: open_collection(&backend, &clock, seed).await?,
            groceries: open_collection(&backend, &clock, seed).await?,
            events: open_collection(&backend, &clock, seed).await?,
            vehicles: open_collection(&backend, &clock, seed).await?,
            family: open_collection(&backend, &clock, seed).await?,
            documents: open_collection(&backend, &clock, seed).await?,
            transactions: open_collection(&backend, &clock, seed).await?,
            config,
            clock,
        })
    }

    /// Memory-only state; nothing survives the process
    pub fn in_memory(config: AppConfig, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        let seed = &config.seed;
        Ok(Self {
            staff: memory_collection(&clock, seed)?,
            bills: memory_collection(&clock, seed)?,
            groceries: memory_collection(&clock, seed)?,
            events: memory_collection(&clock, seed)?,
            vehicles: memory_collection(&clock, seed)?,
            family: memory_collection(&clock, seed)?,
            documents: memory_collection(&clock, seed)?,
            transactions: memory_collection(&clock, seed)?,
            config,
            clock,
        })
    }

    /// Calendar day used for overdue and expiry checks
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

async fn open_collection<T: Entity>(
    backend: &Arc<dyn SnapshotBackend>,
    clock: &Arc<dyn Clock>,
    seed: &SeedSource,
) -> DomainResult<Collection<T>> {
    Collection::open(backend.clone(), clock.clone(), load_seed::<T>(seed)?).await
}

fn memory_collection<T: Entity>(clock: &Arc<dyn Clock>, seed: &SeedSource) -> DomainResult<Collection<T>> {
    let store = RecordStore::seeded(clock.clone(), load_seed::<T>(seed)?)?;
    Ok(Collection::in_memory(store))
}

/// Install the rolling file logger described by `config`
pub fn init_logging(config: &AppConfig) -> DomainResult<()> {
    let options = config.logger_options()?;
    rolling_logger::init_logger_with(config.log_path(), APP_NAME, options).map_err(DomainError::Internal)?;
    log::info!("{} {} started", APP_NAME, env!("CARGO_PKG_VERSION"));
    Ok(())
}
