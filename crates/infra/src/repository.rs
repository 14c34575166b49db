//! # リポジトリ実装
//!
//! ドメインエンティティの永続化操作をトレイトで定義し、
//! PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でリポジトリを利用する
//! - **実行時バインド**: クエリは `sqlx::query` / `query_as` +
//!   行構造体で組み立てる（オフラインでもビルド可能）
//! - **テスタビリティ**: `test-utils` feature のモックで置き換え可能

pub mod role_repository;
pub mod sent_email_repository;
pub mod user_repository;

pub use role_repository::{PostgresRoleRepository, RoleRepository};
pub use sent_email_repository::{PostgresSentEmailRepository, SentEmailRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
