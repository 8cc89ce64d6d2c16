//! Submission and entry persistence.

use benchseal_registry::{PersistedEntry, StoreError, StoredEntry, SubmissionRecord};
use sqlx::types::Json;
use sqlx::PgConnection;

use super::backend;

fn to_i32(what: &str, n: usize) -> Result<i32, StoreError> {
    i32::try_from(n).map_err(|_| StoreError::Backend(format!("{what} {n} out of range")))
}

/// Insert the submission header row.
pub async fn insert(conn: &mut PgConnection, record: &SubmissionRecord) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO submissions (id, uploader_id, uploader_role, entry_count, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(*record.id.as_uuid())
    .bind(record.uploader.id.as_str())
    .bind(record.uploader.role.as_str())
    .bind(to_i32("entry_count", record.entry_count)?)
    .bind(record.created_at)
    .execute(conn)
    .await
    .map_err(backend)?;

    Ok(())
}

/// Insert one accepted entry.
pub async fn insert_entry(conn: &mut PgConnection, entry: &PersistedEntry) -> Result<(), StoreError> {
    let content = entry.entry.content_ref();
    let registration_id = match &entry.entry {
        StoredEntry::Embargoed {
            registration_id, ..
        } => Some(*registration_id.as_uuid()),
        StoredEntry::Revealed {
            prior_registration, ..
        } => prior_registration.map(|id| *id.as_uuid()),
    };

    sqlx::query(
        "INSERT INTO submission_entries (submission_id, entry_index, uploader_id, kind, variant,
         digest, content_address, registration_id, entry)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(*entry.submission_id.as_uuid())
    .bind(to_i32("entry index", entry.index)?)
    .bind(entry.uploader_id.as_str())
    .bind(entry.entry.kind().as_str())
    .bind(entry.entry.variant().as_str())
    .bind(content.digest.to_hex())
    .bind(content.content_address.as_str())
    .bind(registration_id)
    .bind(Json(&entry.entry))
    .execute(conn)
    .await
    .map_err(backend)?;

    Ok(())
}
