//! # HTTP ハンドラ
//!
//! ルーティングされたリクエストの処理を担当する。
//!
//! | メソッド・パス | ハンドラ | 説明 |
//! |---------------|---------|------|
//! | `GET /` | [`index::show_index`] | 登録フォームとユーザー一覧 |
//! | `POST /` | [`index::register`] | 名前の登録（PRG パターン） |
//! | `GET /emails` | [`emails::list_sent_emails`] | 送信メール一覧 |
//! | `GET /health` | [`health::health_check`] | ヘルスチェック |
//! | その他 | [`not_found`] | 404 ページ |

pub mod emails;
pub mod health;
pub mod index;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::error::NOT_FOUND_PAGE;

/// 未定義パスの fallback ハンドラ
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}
