//! # ロール
//!
//! ユーザー区分を表すロールエンティティを定義する。
//!
//! 登録時には既定ロール [`DEFAULT_ROLE_NAME`] が割り当てられる。
//! ロールの CRUD 画面は持たず、起動時の種付けでのみ作成される。

use serde::{Deserialize, Serialize};

define_uuid_id! {
    /// ロール ID（一意識別子）
    ///
    /// roles テーブルの主キー。UUID v7 を使用。
    pub struct RoleId;
}

define_validated_string! {
    /// ロール名（値オブジェクト）
    pub struct RoleName {
        label: "ロール名",
        max_length: 64,
    }
}

/// 新規登録ユーザーに割り当てる既定ロール名
pub const DEFAULT_ROLE_NAME: &str = "User";

/// 起動時に種付けするロール名の一覧
pub const SEED_ROLE_NAMES: [&str; 2] = ["Administrator", "User"];

/// ロールエンティティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id:   RoleId,
    name: RoleName,
}

impl Role {
    /// 新規ロールを作成する
    pub fn new(id: RoleId, name: RoleName) -> Self {
        Self { id, name }
    }

    /// DB の行からロールを復元する
    pub fn from_db(id: RoleId, name: RoleName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> &RoleId {
        &self.id
    }

    pub fn name(&self) -> &RoleName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_既定ロール名は種付け一覧に含まれる() {
        assert!(SEED_ROLE_NAMES.contains(&DEFAULT_ROLE_NAME));
    }

    #[test]
    fn test_role_nameは空文字列を拒否する() {
        assert!(RoleName::new(" ").is_err());
        assert!(RoleName::new("User").is_ok());
    }
}
