//! # SentEmailRepository
//!
//! 送信メール監査レコードの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **追記専用**: insert と新着順の読み出しのみ。UPDATE / DELETE はない
//! - **挿入は通知操作のみが行う**: 他のコンポーネントはこのストアに
//!   書き込まない
//! - **新着順の安定化**: timestamp の同値は id（UUID v7、生成順）で
//!   降順に並べる

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meibo_domain::{
    notification::{DeliveryStatus, EmailAddress},
    sent_email::{SentEmail, SentEmailId},
};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::InfraError;

/// 送信メール監査レコードリポジトリトレイト
#[async_trait]
pub trait SentEmailRepository: Send + Sync {
    /// 監査レコードを挿入する
    async fn insert(&self, record: &SentEmail) -> Result<(), InfraError>;

    /// 全監査レコードを新しい順（timestamp 降順）で取得する
    async fn list_newest_first(&self) -> Result<Vec<SentEmail>, InfraError>;
}

/// sent_emails テーブルの行構造体
#[derive(Debug, sqlx::FromRow)]
struct SentEmailRow {
    id:         Uuid,
    sender:     String,
    recipients: String,
    subject:    String,
    body:       String,
    status:     String,
    timestamp:  DateTime<Utc>,
}

impl SentEmailRow {
    fn into_sent_email(self) -> Result<SentEmail, InfraError> {
        let sender = EmailAddress::new(self.sender)
            .map_err(|e| InfraError::unexpected(format!("sent_emails 行の復元に失敗: {e}")))?;
        let status = DeliveryStatus::from_str(&self.status)
            .map_err(|e| InfraError::unexpected(format!("sent_emails 行の復元に失敗: {e}")))?;
        Ok(SentEmail::from_db(
            SentEmailId::from_uuid(self.id),
            sender,
            self.recipients,
            self.subject,
            self.body,
            status,
            self.timestamp,
        ))
    }
}

/// PostgreSQL 実装の SentEmailRepository
#[derive(Debug, Clone)]
pub struct PostgresSentEmailRepository {
    pool: PgPool,
}

impl PostgresSentEmailRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SentEmailRepository for PostgresSentEmailRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, record: &SentEmail) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO sent_emails (id, sender, recipients, subject, body, status, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.sender().as_str())
        .bind(record.recipients())
        .bind(record.subject())
        .bind(record.body())
        .bind(record.status().to_string())
        .bind(record.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn list_newest_first(&self) -> Result<Vec<SentEmail>, InfraError> {
        let rows = sqlx::query_as::<_, SentEmailRow>(
            r#"
            SELECT id, sender, recipients, subject, body, status, "timestamp"
            FROM sent_emails
            ORDER BY "timestamp" DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SentEmailRow::into_sent_email).collect()
    }
}
