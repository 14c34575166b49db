//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **username に UNIQUE 制約**: 登録フローの check-then-act 競合で
//!   二重挿入が起きても DB エラーとして表面化する
//! - **一覧は username 順**: トップページの表示順をクエリ側で保証する

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meibo_domain::{
    role::RoleId,
    user::{User, UserId, UserName},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザー名でユーザーを検索する
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_username(&self, username: &UserName) -> Result<Option<User>, InfraError>;

    /// ユーザーを挿入する
    ///
    /// 同名ユーザーが既に存在する場合は UNIQUE 制約違反の
    /// データベースエラーを返す。
    async fn insert(&self, user: &User) -> Result<(), InfraError>;

    /// 全ユーザーをユーザー名の昇順で取得する
    async fn list_ordered_by_username(&self) -> Result<Vec<User>, InfraError>;
}

/// users テーブルの行構造体
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id:         Uuid,
    username:   String,
    role_id:    Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, InfraError> {
        let username = UserName::new(self.username)
            .map_err(|e| InfraError::unexpected(format!("users 行の復元に失敗: {e}")))?;
        Ok(User::from_db(
            UserId::from_uuid(self.id),
            username,
            self.role_id.map(RoleId::from_uuid),
            self.created_at,
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_username(&self, username: &UserName) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, role_id, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, role_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.username().as_str())
        .bind(user.role_id().map(|role_id| *role_id.as_uuid()))
        .bind(user.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn list_ordered_by_username(&self) -> Result<Vec<User>, InfraError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, role_id, created_at
            FROM users
            ORDER BY username ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresUserRepository>();
    }
}
