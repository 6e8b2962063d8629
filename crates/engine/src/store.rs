//! Persistence of verification send times.
//!
//! Table: `verification_info(id BINARY(16) PRIMARY KEY, username VARCHAR, email_exp_time DATETIME)`.
//! One row per user; a resend moves the timestamp forward in place.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlExecutor};
use sqlx::Connection;

use verimail_common::db;
use verimail_common::error::AppError;
use verimail_common::types::VerificationRecord;

/// Where verification send times are written.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Insert the record, or update the send time of an existing one.
    async fn upsert(&self, record: &VerificationRecord) -> Result<(), AppError>;
}

/// Upsert a single record. Only `email_exp_time` is updated on conflict.
///
/// Returns MySQL's affected-row count: 1 for an insert, 2 for an update,
/// 0 when the stored row already held the same values.
pub async fn upsert_verification<'e, E>(
    executor: E,
    record: &VerificationRecord,
) -> Result<u64, sqlx::Error>
where
    E: MySqlExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO verification_info (id, username, email_exp_time)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE email_exp_time = VALUES(email_exp_time)
        "#,
    )
    .bind(record.id_bytes().to_vec())
    .bind(&record.username)
    .bind(record.email_exp_time)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// MySQL-backed store. Opens and closes one connection per write.
#[derive(Debug, Clone)]
pub struct MySqlVerificationStore {
    options: MySqlConnectOptions,
}

impl MySqlVerificationStore {
    pub fn new(options: MySqlConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl VerificationStore for MySqlVerificationStore {
    async fn upsert(&self, record: &VerificationRecord) -> Result<(), AppError> {
        let mut conn = db::connect(&self.options).await?;

        let mut tx = conn.begin().await?;
        let affected = upsert_verification(&mut *tx, record).await?;
        tx.commit().await?;

        conn.close().await?;

        tracing::debug!(uuid = %record.id, affected, "Recorded verification send time");
        Ok(())
    }
}
