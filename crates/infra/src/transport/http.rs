//! HTTP メール API transport 実装
//!
//! 設定されたエンドポイントへ form エンコードの POST を 1 回行う。
//! 認証はベーシック認証（ユーザー名は固定の `"api"`、パスワードは API キー）。

use std::time::Duration;

use async_trait::async_trait;
use meibo_domain::notification::{NotificationError, OutboundEmail, TransportOutcome};

use super::EmailTransport;

/// ベーシック認証のユーザー名（プロバイダ仕様で固定）
const BASIC_AUTH_USER: &str = "api";

/// HTTP メール API transport
///
/// `reqwest::Client` をラップする。リクエストタイムアウトは
/// 構築時に明示する（呼び出し中のキャンセル手段は持たない）。
pub struct HttpEmailTransport {
    client:  reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailTransport {
    /// 新しい HTTP transport を作成する
    ///
    /// # 引数
    ///
    /// - `api_url`: メール API のエンドポイント URL
    /// - `api_key`: ベーシック認証に使う API キー
    /// - `timeout`: リクエスト全体のタイムアウト
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                NotificationError::Transport(format!("HTTP クライアントの構築に失敗: {e}"))
            })?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn send(&self, email: &OutboundEmail) -> Result<TransportOutcome, NotificationError> {
        let form = [
            ("from", email.from.as_str().to_string()),
            ("to", email.to.to_form_value()),
            ("subject", email.subject.clone()),
            ("text", email.text.clone()),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        tracing::debug!(status = status_code, "メール API の応答を受信");

        Ok(TransportOutcome { status_code, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpEmailTransport>();
    }

    #[test]
    fn test_構築時にタイムアウトを受け取る() {
        let transport = HttpEmailTransport::new(
            "https://api.mail.example.com/v3/messages",
            "key-test",
            Duration::from_secs(30),
        );
        assert!(transport.is_ok());
    }
}
