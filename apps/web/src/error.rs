//! # Web 層エラーハンドリング
//!
//! 下位層のエラーを集約し、HTML エラーページとしてレスポンスに変換する。
//!
//! ## ステータスコードの割り当て
//!
//! | エラー | ステータス |
//! |--------|-----------|
//! | 入力バリデーション失敗 | 400 Bad Request |
//! | エンティティ未検出 | 404 Not Found |
//! | それ以外（DB、メール送信、テンプレート） | 500 Internal Server Error |
//!
//! 内部エラーの詳細はログにのみ出力し、レスポンスには含めない。

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use meibo_domain::{DomainError, notification::NotificationError};
use meibo_infra::InfraError;
use thiserror::Error;

/// 404 エラーページ（ビルド時に埋め込み）
pub const NOT_FOUND_PAGE: &str = include_str!("../templates/404.html");
/// 500 エラーページ（ビルド時に埋め込み）
pub const SERVER_ERROR_PAGE: &str = include_str!("../templates/500.html");

/// Web 層エラー
#[derive(Debug, Error)]
pub enum WebError {
    /// ドメイン層エラー（バリデーション失敗・未検出）
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// インフラ層エラー（データベース）
    #[error(transparent)]
    Infra(#[from] InfraError),

    /// 通知エラー（メール送信・監査レコード記録）
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// テンプレート描画エラー
    #[error("テンプレートの描画に失敗: {0}")]
    Template(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::Domain(DomainError::Validation(message)) => {
                tracing::debug!(reason = %message, "リクエストを拒否");
                (StatusCode::BAD_REQUEST, Html(bad_request_page(&message))).into_response()
            }
            Self::Domain(DomainError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
            }
            other => {
                tracing::error!(error = %other, "リクエスト処理中に内部エラーが発生");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

/// 400 エラーページを組み立てる
///
/// `message` はアプリケーション側で定義したバリデーションメッセージのみ
/// （ユーザー入力は含まれない）。
fn bad_request_page(message: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="ja">
<head><meta charset="utf-8"><title>400 Bad Request</title></head>
<body>
<h1>400 - リクエストが不正です</h1>
<p>{message}</p>
<p><a href="/">ホームに戻る</a></p>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_バリデーションエラーは400になる() {
        let error = WebError::Domain(DomainError::Validation("ユーザー名は必須です".to_string()));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_未検出エラーは404になる() {
        let error = WebError::Domain(DomainError::NotFound {
            entity_type: "user",
            id:          "x".to_string(),
        });
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_通知エラーは500になる() {
        let error = WebError::Notification(NotificationError::Transport("接続拒否".to_string()));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
