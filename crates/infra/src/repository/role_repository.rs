//! # RoleRepository
//!
//! ロールの永続化を担当するリポジトリ。
//!
//! ロールは起動時の種付けでのみ作成され、以後は参照専用。

use async_trait::async_trait;
use meibo_domain::role::{Role, RoleId, RoleName};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ロールリポジトリトレイト
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// ロール名でロールを検索する
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, InfraError>;

    /// 同名ロールが存在しなければ挿入する
    ///
    /// 既に存在する場合は何もしない（起動時の種付けを冪等にするため）。
    async fn insert_if_absent(&self, role: &Role) -> Result<(), InfraError>;

    /// 全ロールをロール名の昇順で取得する
    async fn list(&self) -> Result<Vec<Role>, InfraError>;
}

/// roles テーブルの行構造体
#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id:   Uuid,
    name: String,
}

impl RoleRow {
    fn into_role(self) -> Result<Role, InfraError> {
        let name = RoleName::new(self.name)
            .map_err(|e| InfraError::unexpected(format!("roles 行の復元に失敗: {e}")))?;
        Ok(Role::from_db(RoleId::from_uuid(self.id), name))
    }
}

/// PostgreSQL 実装の RoleRepository
#[derive(Debug, Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, InfraError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RoleRow::into_role).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert_if_absent(&self, role: &Role) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn list(&self) -> Result<Vec<Role>, InfraError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name
            FROM roles
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresRoleRepository>();
    }
}
