//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`OutboundEmail`] | 送信ペイロード（from / to / subject / text） |
//! | [`Recipients`] | 宛先（単一アドレスまたは順序付きリスト） |
//! | [`TransportOutcome`] | メール API の応答（ステータスコード + ボディ） |
//! | [`DeliveryStatus`] | 監査レコードの送信状態 |
//! | [`AuditPolicy`] | transport 失敗時に監査レコードを残すかの方針 |
//!
//! ## 設計方針
//!
//! - **宛先は sum 型**: 単一とリストを文字列化で潰さず、監査レコードには
//!   可逆な JSON 表現（単一 = JSON 文字列、リスト = JSON 配列）で保存する
//! - **非 2xx 応答はエラーではない**: プロバイダの拒否応答も
//!   [`TransportOutcome`] として正常に返り、監査レコードに記録される
//! - **transport エラーは伝播**: リトライや握り潰しはしない

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::DomainError;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// transport レベルの失敗（DNS 解決不可、接続拒否、タイムアウト）
    ///
    /// HTTP 応答を一度も受け取れなかった場合のみ使用する。
    /// 非 2xx 応答はこのエラーにはならない。
    #[error("メール送信に失敗: {0}")]
    Transport(String),

    /// 監査レコードの記録に失敗
    ///
    /// transport 呼び出しは既に完了しているため、メールは送信済みで
    /// 記録だけが欠けた部分失敗状態を表す。
    #[error("監査レコードの記録に失敗: {0}")]
    AuditLog(String),
}

/// メールアドレス（値オブジェクト）
///
/// 生成時に基本的な構造検証を行い、不正な値の作成を防ぐ。
/// アドレス構文の厳密な検証は行わない（spec: no validation of address
/// syntax）。`local@domain` 形式と長さのみ確認する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `@` の前後がどちらも空でない
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };
        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.chars().count() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは 255 文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 宛先（単一アドレスまたは順序付きリスト）
///
/// 原典は「1 アドレスのことも、リストのこともある」値を暗黙の文字列化で
/// 保存していた。ここでは sum 型として明示し、保存表現を可逆にする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// 単一の宛先
    Single(EmailAddress),
    /// 順序付きの宛先リスト（1 件以上）
    List(Vec<EmailAddress>),
}

impl Recipients {
    /// アドレスのリストから宛先を作成する
    ///
    /// 空リストは拒否する。1 件のリストも `List` のまま保持する
    /// （呼び出し元の意図を保存表現に反映するため）。
    pub fn from_list(addresses: Vec<EmailAddress>) -> Result<Self, DomainError> {
        if addresses.is_empty() {
            return Err(DomainError::Validation(
                "宛先は 1 件以上である必要があります".to_string(),
            ));
        }
        Ok(Self::List(addresses))
    }

    /// 宛先の件数を返す
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        // from_list が空リストを拒否するため常に false
        self.len() == 0
    }

    /// メール API の `to` フィールド用の文字列を返す
    ///
    /// 複数宛先はカンマ区切りで連結する（プロバイダの form 形式）。
    pub fn to_form_value(&self) -> String {
        match self {
            Self::Single(address) => address.as_str().to_string(),
            Self::List(list) => list
                .iter()
                .map(EmailAddress::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// 監査レコード用の可逆な保存表現を返す
    ///
    /// 単一は JSON 文字列、リストは JSON 配列。[`Recipients::from_stored`]
    /// で元の構造に復元できる。
    pub fn to_stored(&self) -> String {
        let value = match self {
            Self::Single(address) => Value::String(address.as_str().to_owned()),
            Self::List(list) => Value::Array(
                list.iter()
                    .map(|a| Value::String(a.as_str().to_owned()))
                    .collect(),
            ),
        };
        value.to_string()
    }

    /// 保存表現から宛先を復元する
    pub fn from_stored(stored: &str) -> Result<Self, DomainError> {
        let value: Value = serde_json::from_str(stored).map_err(|e| {
            DomainError::Validation(format!("宛先の保存表現が不正です: {e}"))
        })?;

        match value {
            Value::String(s) => Ok(Self::Single(EmailAddress::new(s)?)),
            Value::Array(items) => {
                let addresses = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => EmailAddress::new(s),
                        other => Err(DomainError::Validation(format!(
                            "宛先の保存表現が不正です: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::from_list(addresses)
            }
            other => Err(DomainError::Validation(format!(
                "宛先の保存表現が不正です: {other}"
            ))),
        }
    }
}

/// 送信ペイロード
///
/// 件名プレフィックスまで合成済みの、transport に渡される最終形。
/// 監査レコードはこの同じフィールドから構築される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// 送信元アドレス（設定由来。エンドユーザーは指定できない）
    pub from:    EmailAddress,
    /// 宛先
    pub to:      Recipients,
    /// プレフィックス合成済みの件名
    pub subject: String,
    /// 本文（呼び出し元で合成済み）
    pub text:    String,
}

/// メール API の応答（ステータスコード + ボディ）
///
/// 通知操作はこの値を解釈せず、そのまま呼び出し元に返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOutcome {
    /// HTTP ステータスコード
    pub status_code: u16,
    /// 応答ボディ（スキーマは仮定しない）
    pub body:        String,
}

impl TransportOutcome {
    /// 2xx 応答かどうか
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 監査レコードの送信状態
///
/// sent_emails テーブルの `status` カラムに格納される値。
/// snake_case でシリアライズされる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    /// プロバイダが 2xx で受理した
    Sent,
    /// HTTP 応答は受け取ったが 2xx ではなかった
    Attempted,
    /// transport レベルで失敗し、応答を受け取れなかった
    /// （[`AuditPolicy::Always`] のときのみ記録される）
    Failed,
}

/// transport 失敗時に監査レコードを残すかの方針
///
/// 原典は「HTTP 応答を受けた試行だけ記録する」挙動だった。互換性のため
/// 既定は [`ResponseOnly`](AuditPolicy::ResponseOnly) とし、
/// [`Always`](AuditPolicy::Always) で失敗も監査対象にできる。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum AuditPolicy {
    /// HTTP 応答を受けた試行のみ記録する（原典互換）
    #[default]
    ResponseOnly,
    /// transport 失敗も `failed` として記録する
    Always,
}
