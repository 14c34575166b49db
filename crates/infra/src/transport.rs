//! # メール送信 transport
//!
//! サードパーティ HTTP メール API への送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `EmailTransport` trait でメール送信を抽象化
//! - **2 つの実装**: HTTP（メール API、本番用）、Noop（開発・通知無効時）
//! - **環境変数切替**: `MAIL_BACKEND` でランタイム選択
//! - **非 2xx はエラーにしない**: プロバイダの拒否応答も
//!   [`TransportOutcome`] として正常に返す。エラーになるのは
//!   応答自体を受け取れなかった場合だけ

mod http;
mod noop;

use async_trait::async_trait;
pub use http::HttpEmailTransport;
use meibo_domain::notification::{NotificationError, OutboundEmail, TransportOutcome};
pub use noop::NoopEmailTransport;

/// メール送信トレイト
///
/// 通知操作の中核。メール送信の具体的な方法を抽象化する。
/// HTTP / Noop の 2 実装を環境変数で切り替える。
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// メールを 1 回送信し、プロバイダの応答を返す
    ///
    /// リトライは行わない。transport レベルの失敗は
    /// [`NotificationError::Transport`] として返る。
    async fn send(&self, email: &OutboundEmail) -> Result<TransportOutcome, NotificationError>;
}
