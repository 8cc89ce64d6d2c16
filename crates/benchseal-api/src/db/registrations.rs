//! Registration persistence.
//!
//! All functions operate on the `registrations` table through a connection
//! or transaction supplied by the caller.

use benchseal_core::{ContentAddress, ContentDigest, ContentRef, RegistrationId, UploaderId};
use benchseal_registry::{Registration, StoreError};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use super::backend;

const COLUMNS: &str = "id, digest, content_address, committer_id, created_at";

/// Insert `registration` unless its content is already registered, and
/// return whichever row owns the content.
pub async fn insert_or_get(
    conn: &mut PgConnection,
    registration: &Registration,
) -> Result<Registration, StoreError> {
    let inserted = sqlx::query_as::<_, RegistrationRow>(&format!(
        "INSERT INTO registrations ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (digest, content_address) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(*registration.id.as_uuid())
    .bind(registration.digest.to_hex())
    .bind(registration.content_address.as_str())
    .bind(registration.committer_id.as_str())
    .bind(registration.created_at)
    .fetch_optional(&mut *conn)
    .await
    .map_err(backend)?;

    if let Some(row) = inserted {
        return row.into_registration();
    }

    find(conn, &registration.content_ref()).await?.ok_or_else(|| {
        StoreError::Backend(format!(
            "registration for {} conflicted but could not be read back",
            registration.content_address
        ))
    })
}

/// Fetch the registration for `content_ref`.
pub async fn find(
    conn: &mut PgConnection,
    content_ref: &ContentRef,
) -> Result<Option<Registration>, StoreError> {
    let row = sqlx::query_as::<_, RegistrationRow>(&format!(
        "SELECT {COLUMNS} FROM registrations
         WHERE digest = $1 AND content_address = $2"
    ))
    .bind(content_ref.digest.to_hex())
    .bind(content_ref.content_address.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(backend)?;

    row.map(RegistrationRow::into_registration).transpose()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    digest: String,
    content_address: String,
    committer_id: String,
    created_at: DateTime<Utc>,
}

impl RegistrationRow {
    fn into_registration(self) -> Result<Registration, StoreError> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            StoreError::Corrupt(format!("registration {}: {field}: {e}", self.id))
        };
        Ok(Registration {
            id: RegistrationId::from_uuid(self.id),
            digest: ContentDigest::from_hex(&self.digest).map_err(|e| corrupt("digest", &e))?,
            content_address: ContentAddress::parse(&self.content_address)
                .map_err(|e| corrupt("content_address", &e))?,
            committer_id: UploaderId::new(self.committer_id.as_str())
                .map_err(|e| corrupt("committer_id", &e))?,
            created_at: self.created_at,
        })
    }
}
