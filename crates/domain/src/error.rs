//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// Web 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティ種別（例: "User"）
        entity_type: &'static str,
        /// エンティティの ID
        id:          String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validationのメッセージが整形される() {
        let err = DomainError::Validation("ユーザー名は必須です".to_string());
        assert_eq!(
            format!("{err}"),
            "バリデーションエラー: ユーザー名は必須です"
        );
    }

    #[test]
    fn test_not_foundのメッセージが整形される() {
        let err = DomainError::NotFound {
            entity_type: "User",
            id:          "U-001".to_string(),
        };
        assert_eq!(format!("{err}"), "User が見つかりません: U-001");
    }
}
