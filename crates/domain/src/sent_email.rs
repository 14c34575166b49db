//! # 送信メール監査レコード
//!
//! 外部メール API への送信試行 1 回につき 1 件作成される監査レコード。
//!
//! ## 設計方針
//!
//! - **不変**: 作成後の更新・削除はない（ストアは追記と読み出しのみ）
//! - **User との FK なし**: 宛先は自由テキスト（[`Recipients`] の保存表現）
//!   としてのみ記録され、参照整合性は持たない
//! - **送信の有無と独立**: レコードは「試行があったこと」を表す。
//!   成否は [`DeliveryStatus`] で区別する

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    DomainError,
    notification::{DeliveryStatus, EmailAddress, Recipients},
};

define_uuid_id! {
    /// 送信メール監査レコード ID（一意識別子）
    ///
    /// sent_emails テーブルの主キー。UUID v7 を使用。
    pub struct SentEmailId;
}

/// 送信メール監査レコード
///
/// 通知操作が合成したペイロードと同じフィールドから構築される。
/// `timestamp` は作成時に割り当てられ、以後変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEmail {
    id:         SentEmailId,
    sender:     EmailAddress,
    recipients: String,
    subject:    String,
    body:       String,
    status:     DeliveryStatus,
    timestamp:  DateTime<Utc>,
}

impl SentEmail {
    /// 送信試行から監査レコードを作成する
    ///
    /// `recipients` はこの時点で可逆な保存表現に変換される。
    pub fn new(
        id: SentEmailId,
        sender: EmailAddress,
        recipients: &Recipients,
        subject: impl Into<String>,
        body: impl Into<String>,
        status: DeliveryStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender,
            recipients: recipients.to_stored(),
            subject: subject.into(),
            body: body.into(),
            status,
            timestamp,
        }
    }

    /// DB の行から監査レコードを復元する
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: SentEmailId,
        sender: EmailAddress,
        recipients: String,
        subject: String,
        body: String,
        status: DeliveryStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender,
            recipients,
            subject,
            body,
            status,
            timestamp,
        }
    }

    pub fn id(&self) -> &SentEmailId {
        &self.id
    }

    pub fn sender(&self) -> &EmailAddress {
        &self.sender
    }

    /// 宛先の保存表現（JSON 文字列または JSON 配列）
    pub fn recipients(&self) -> &str {
        &self.recipients
    }

    /// 保存表現から宛先を復元する
    pub fn parse_recipients(&self) -> Result<Recipients, DomainError> {
        Recipients::from_stored(&self.recipients)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
