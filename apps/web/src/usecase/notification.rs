//! # 通知ユースケース
//!
//! メールを 1 回送信し、結果を監査レコードとして記録する。
//! アプリケーションから外部へ出るメールはすべてこの操作を経由する。
//!
//! ## 送信と記録の流れ
//!
//! 1. 件名にプレフィックスを合成して送信ペイロードを組み立てる
//! 2. transport に渡して 1 回だけ送信する（リトライしない）
//! 3. HTTP 応答を受け取れた場合、2xx なら `sent`、それ以外は `attempted`
//!    として監査レコードを記録する
//! 4. 応答自体を受け取れなかった場合、既定では記録せずエラーを返す
//!    （[`AuditPolicy::Always`] なら `failed` として記録する）
//!
//! ## 部分失敗
//!
//! 送信は成功したが記録に失敗した場合、メールは既に外に出ている。
//! この状態は [`NotificationError::AuditLog`] として呼び出し元に伝わる。

use std::sync::Arc;

use chrono::Utc;
use meibo_domain::{
    notification::{
        AuditPolicy, DeliveryStatus, EmailAddress, NotificationError, OutboundEmail, Recipients,
        TransportOutcome,
    },
    sent_email::{SentEmail, SentEmailId},
};
use meibo_infra::{repository::SentEmailRepository, transport::EmailTransport};
use meibo_shared::{event_log::event, log_business_event};

/// 通知ユースケースの設定
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    /// 送信元アドレス（エンドユーザーは指定できない）
    pub from_address:   EmailAddress,
    /// 件名の先頭に付与するプレフィックス
    pub subject_prefix: String,
    /// transport 失敗時に監査レコードを残すかの方針
    pub audit_policy:   AuditPolicy,
}

/// 通知サービス
///
/// transport と監査ストアを束ね、送信と記録を一体の操作として提供する。
pub struct NotificationService {
    transport: Arc<dyn EmailTransport>,
    audit:     Arc<dyn SentEmailRepository>,
    settings:  NotificationSettings,
}

impl NotificationService {
    pub fn new(
        transport: Arc<dyn EmailTransport>,
        audit: Arc<dyn SentEmailRepository>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            transport,
            audit,
            settings,
        }
    }

    /// メールを送信し、監査レコードを記録する
    ///
    /// 非 2xx 応答はエラーではなく、`attempted` として記録した上で
    /// [`TransportOutcome`] をそのまま返す。応答の解釈は呼び出し元に委ねる。
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn send_and_log(
        &self,
        recipients: Recipients,
        subject: &str,
        body: &str,
    ) -> Result<TransportOutcome, NotificationError> {
        let email = OutboundEmail {
            from:    self.settings.from_address.clone(),
            to:      recipients,
            subject: format!("{} {}", self.settings.subject_prefix, subject),
            text:    body.to_string(),
        };

        match self.transport.send(&email).await {
            Ok(outcome) => {
                let (action, status) = if outcome.is_success() {
                    (event::action::NOTIFICATION_SENT, DeliveryStatus::Sent)
                } else {
                    (event::action::NOTIFICATION_ATTEMPTED, DeliveryStatus::Attempted)
                };
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = action,
                    event.result = event::result::SUCCESS,
                    entity_type = event::entity_type::SENT_EMAIL,
                    recipient_count = email.to.len(),
                    status_code = outcome.status_code,
                );

                self.record(&email, status).await?;
                Ok(outcome)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    entity_type = event::entity_type::SENT_EMAIL,
                    recipient_count = email.to.len(),
                    error = %e,
                );

                if self.settings.audit_policy == AuditPolicy::Always {
                    // 失敗の記録に失敗しても元のエラーを優先する
                    if let Err(log_error) = self.record(&email, DeliveryStatus::Failed).await {
                        tracing::error!(error = %log_error, "失敗レコードの記録に失敗");
                    }
                }
                Err(e)
            }
        }
    }

    /// 送信ペイロードと同じフィールドから監査レコードを作成して記録する
    async fn record(
        &self,
        email: &OutboundEmail,
        status: DeliveryStatus,
    ) -> Result<(), NotificationError> {
        let record = SentEmail::new(
            SentEmailId::new(),
            email.from.clone(),
            &email.to,
            email.subject.as_str(),
            email.text.as_str(),
            status,
            Utc::now(),
        );

        self.audit
            .insert(&record)
            .await
            .map_err(|e| NotificationError::AuditLog(e.to_string()))
    }
}
