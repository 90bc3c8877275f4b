use chrono::FixedOffset;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::engine::{Engine, EngineRecords};
use crate::errors::AppError;
use crate::models::{call_log, case, expense, followup, offer, user};
use crate::models::call_log::CallLogEntry;
use crate::models::case::Case;
use crate::models::expense::Expense;
use crate::models::followup::FollowUp;
use crate::models::offer::Offer;
use crate::models::user::User;

/// Where planned records are written before the engine commits them.
///
/// `Memory` keeps nothing beyond the engine itself; the service runs that way
/// when no `DATABASE_URL` is configured, and the HTTP tests use it.
#[derive(Debug, Clone)]
pub enum Store {
    Memory,
    Postgres(PgPool),
}

/// A stored value that does not map back onto the domain model.
pub fn decode_error(column: &str, raw: &str) -> AppError {
    AppError::Db(sqlx::Error::Decode(
        format!("unexpected value '{raw}' in {column}").into(),
    ))
}

impl Store {
    pub async fn connect(config: &AppConfig) -> Result<Store, AppError> {
        let Some(url) = config.database_url.as_deref() else {
            log::warn!("DATABASE_URL not set, running with in-memory storage only");
            return Ok(Store::Memory);
        };
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(url)
            .await?;
        log::info!("Connected to PostgreSQL (max {} connections)", config.db_max_connections);
        Ok(Store::Postgres(pool))
    }

    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Store::Memory => None,
            Store::Postgres(pool) => Some(pool),
        }
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        if let Store::Postgres(pool) = self {
            sqlx::migrate!("./migrations").run(pool).await?;
            log::info!("Database migrations complete");
        }
        Ok(())
    }

    /// Full scan of every table into a fresh engine.
    pub async fn load_engine(&self, tz: FixedOffset) -> Result<Engine, AppError> {
        let Store::Postgres(pool) = self else {
            return Ok(Engine::new(tz));
        };
        let records = EngineRecords {
            users: user::queries::find_all(pool).await?,
            follow_ups: followup::queries::find_all(pool).await?,
            call_logs: call_log::queries::find_all(pool).await?,
            cases: case::queries::find_all(pool).await?,
            offers: offer::queries::find_all(pool).await?,
            expenses: expense::queries::find_all(pool).await?,
        };
        log::info!(
            "Loaded {} users, {} follow-ups, {} call logs, {} cases, {} offers, {} expenses",
            records.users.len(),
            records.follow_ups.len(),
            records.call_logs.len(),
            records.cases.len(),
            records.offers.len(),
            records.expenses.len()
        );
        Ok(Engine::with_records(tz, records))
    }

    pub async fn save_user(&self, u: &User) -> Result<(), AppError> {
        match self {
            Store::Memory => Ok(()),
            Store::Postgres(pool) => user::queries::upsert(pool, u).await,
        }
    }

    pub async fn save_follow_up(&self, f: &FollowUp) -> Result<(), AppError> {
        match self {
            Store::Memory => Ok(()),
            Store::Postgres(pool) => followup::queries::upsert(pool, f).await,
        }
    }

    /// The lead and the call it produced are written together or not at all.
    pub async fn save_outcome(&self, f: &FollowUp, entry: &CallLogEntry) -> Result<(), AppError> {
        let Store::Postgres(pool) = self else {
            return Ok(());
        };
        let mut tx = pool.begin().await?;
        followup::queries::upsert(&mut *tx, f).await?;
        call_log::queries::insert(&mut *tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn save_case(&self, c: &Case) -> Result<(), AppError> {
        match self {
            Store::Memory => Ok(()),
            Store::Postgres(pool) => case::queries::upsert(pool, c).await,
        }
    }

    pub async fn save_offer(&self, o: &Offer) -> Result<(), AppError> {
        match self {
            Store::Memory => Ok(()),
            Store::Postgres(pool) => offer::queries::upsert(pool, o).await,
        }
    }

    pub async fn delete_offer(&self, id: i64) -> Result<(), AppError> {
        match self {
            Store::Memory => Ok(()),
            Store::Postgres(pool) => offer::queries::delete(pool, id).await,
        }
    }

    pub async fn save_expense(&self, e: &Expense) -> Result<(), AppError> {
        match self {
            Store::Memory => Ok(()),
            Store::Postgres(pool) => expense::queries::upsert(pool, e).await,
        }
    }
}
