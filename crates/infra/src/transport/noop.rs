//! Noop transport 実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 開発環境や通知無効化時に使用する。

use async_trait::async_trait;
use meibo_domain::notification::{NotificationError, OutboundEmail, TransportOutcome};

use super::EmailTransport;

/// Noop transport（ログ出力のみ）
///
/// 常に 200 の固定応答を返すため、監査レコードは `sent` で記録される。
#[derive(Debug, Clone)]
pub struct NoopEmailTransport;

#[async_trait]
impl EmailTransport for NoopEmailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<TransportOutcome, NotificationError> {
        tracing::info!(
            to = %email.to.to_form_value(),
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(TransportOutcome {
            status_code: 200,
            body:        r#"{"message":"noop"}"#.to_string(),
        })
    }
}
