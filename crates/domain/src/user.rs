//! # ユーザー
//!
//! 登録フォームから作成されるユーザーエンティティと値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: `UserId` は UUID をラップし、型安全性を確保
//! - **不変性**: エンティティフィールドは不変、参照は getter 経由
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use meibo_domain::user::{User, UserId, UserName};
//!
//! let user = User::new(UserId::new(), UserName::new("alice")?, None, chrono::Utc::now());
//! assert_eq!(user.username().as_str(), "alice");
//! assert!(user.role_id().is_none());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::RoleId;

define_uuid_id! {
    /// ユーザー ID（一意識別子）
    ///
    /// users テーブルの主キー。UUID v7 を使用し、生成順にソート可能。
    pub struct UserId;
}

define_validated_string! {
    /// ユーザー名（値オブジェクト）
    ///
    /// 登録フォームで入力される名前。trim 後に空でないこと、
    /// 64 文字以内であることを生成時に検証する。
    pub struct UserName {
        label: "ユーザー名",
        max_length: 64,
    }
}

/// ユーザーエンティティ
///
/// 登録フォームの送信ごとに（未登録の名前であれば）1 件作成される。
/// ロールは任意で、既定ロールが存在しない環境では `None` のまま保存される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id:         UserId,
    username:   UserName,
    role_id:    Option<RoleId>,
    created_at: DateTime<Utc>,
}

impl User {
    /// 新規ユーザーを作成する
    pub fn new(
        id: UserId,
        username: UserName,
        role_id: Option<RoleId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            role_id,
            created_at,
        }
    }

    /// DB の行からユーザーを復元する
    ///
    /// リポジトリ実装専用。バリデーションは保存時に済んでいる前提だが、
    /// 値オブジェクトの生成は再度検証を通す。
    pub fn from_db(
        id: UserId,
        username: UserName,
        role_id: Option<RoleId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            role_id,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &UserName {
        &self.username
    }

    pub fn role_id(&self) -> Option<&RoleId> {
        self.role_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_user_nameは前後の空白を除去する() {
        let name = UserName::new("  alice  ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_user_nameは空文字列を拒否する() {
        assert!(UserName::new("").is_err());
        assert!(UserName::new("   ").is_err());
    }

    #[test]
    fn test_user_nameは64文字を超える値を拒否する() {
        let long = "a".repeat(65);
        assert!(UserName::new(long).is_err());
        assert!(UserName::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn test_user_idはuuid経由で復元できる() {
        let id = UserId::new();
        assert_eq!(id, UserId::from_uuid(*id.as_uuid()));
    }
}
