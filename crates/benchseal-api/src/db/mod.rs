//! # Database Persistence Layer
//!
//! Postgres backend for the submission store via SQLx.
//!
//! The database is optional. With `DATABASE_URL` set, registrations,
//! submissions and accepted entries are persisted to PostgreSQL and each
//! pipeline call runs in one database transaction. Without it the server
//! uses the in-memory store from `benchseal-registry`, which does not
//! survive restarts.
//!
//! Registration uniqueness is enforced by the `(digest, content_address)`
//! unique constraint with `ON CONFLICT DO NOTHING`; concurrent committers of
//! the same content serialize on that constraint.

pub mod registrations;
pub mod submissions;

use async_trait::async_trait;
use benchseal_core::{ContentRef, UploaderId};
use benchseal_registry::{
    HashRegistry, PersistedEntry, Registration, StoreError, SubmissionRecord, SubmissionStore,
    SubmissionTx,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;

/// Connect to `url` and run the embedded migrations.
///
/// Returns `None` when no URL is configured (in-memory mode).
pub async fn init_pool(url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = url else {
        tracing::warn!(
            "DATABASE_URL not set; running with the in-memory store. \
             Commitments will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

pub(crate) fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// [`SubmissionStore`] over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn begin(&self) -> Result<Box<dyn SubmissionTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(backend)?;
        Ok(Box::new(PgTx { tx: Mutex::new(tx) }))
    }

    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(backend)?;
        registrations::find(&mut conn, content_ref).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

/// One database transaction. Dropping it without `commit` rolls back.
pub struct PgTx {
    tx: Mutex<Transaction<'static, Postgres>>,
}

#[async_trait]
impl HashRegistry for PgTx {
    async fn register(
        &self,
        content_ref: &ContentRef,
        committer: &UploaderId,
    ) -> Result<Registration, StoreError> {
        let mut tx = self.tx.lock().await;
        registrations::insert_or_get(&mut tx, &Registration::new(content_ref, committer)).await
    }

    async fn lookup(&self, content_ref: &ContentRef) -> Result<Option<Registration>, StoreError> {
        let mut tx = self.tx.lock().await;
        registrations::find(&mut tx, content_ref).await
    }
}

#[async_trait]
impl SubmissionTx for PgTx {
    async fn record_submission(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let mut tx = self.tx.lock().await;
        submissions::insert(&mut tx, record).await
    }

    async fn persist_entry(&self, entry: &PersistedEntry) -> Result<(), StoreError> {
        let mut tx = self.tx.lock().await;
        submissions::insert_entry(&mut tx, entry).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgTx { tx } = *self;
        tx.into_inner().commit().await.map_err(backend)
    }
}
