//! # アプリケーション設定
//!
//! 環境変数から設定を読み込む。グローバルな設定アクセスは提供せず、
//! 起動時に読み込んだ値をコンストラクタ経由で各コンポーネントに渡す。
//!
//! ## 環境変数一覧
//!
//! | 変数 | 必須 | 既定値 | 説明 |
//! |------|------|--------|------|
//! | `WEB_HOST` | - | `0.0.0.0` | バインドするホスト |
//! | `WEB_PORT` | - | `8000` | バインドするポート |
//! | `DATABASE_URL` | ✓ | - | PostgreSQL 接続文字列 |
//! | `SECRET_KEY` | ✓ | - | cookie 署名キー（32 バイト以上） |
//! | `MAIL_BACKEND` | - | `http` | `http` または `noop` |
//! | `MAIL_API_URL` | http 時のみ | - | メール API のエンドポイント |
//! | `MAIL_API_KEY` | http 時のみ | - | メール API の認証キー |
//! | `MAIL_FROM_ADDRESS` | - | `noreply@meibo.example.com` | 送信元アドレス |
//! | `MAIL_SUBJECT_PREFIX` | - | `[Meibo]` | 件名プレフィックス |
//! | `MAIL_ADMIN_ADDRESS` | - | - | 管理者通知の宛先（未設定なら通知しない） |
//! | `MAIL_OPT_IN_ADDRESS` | - | - | チェックボックスで追加される宛先 |
//! | `MAIL_TIMEOUT_SECS` | - | `30` | メール API のタイムアウト秒数 |
//! | `MAIL_AUDIT_POLICY` | - | `response_only` | `response_only` または `always` |

use std::{env, str::FromStr, time::Duration};

use meibo_domain::notification::{AuditPolicy, EmailAddress};
use thiserror::Error;

/// cookie 署名キーの最小バイト数
const SECRET_KEY_MIN_BYTES: usize = 32;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("環境変数 {0} が設定されていません")]
    Missing(&'static str),

    #[error("環境変数 {name} の値が不正です: {message}")]
    Invalid {
        name:    &'static str,
        message: String,
    },
}

/// メール送信バックエンドの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MailBackend {
    /// サードパーティ HTTP メール API に送信する（本番用）
    #[default]
    Http,
    /// 送信せずログ出力のみ行う（開発・通知無効時）
    Noop,
}

/// メール通知の設定
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub backend:        MailBackend,
    /// メール API のエンドポイント URL（`Http` バックエンド時は必須）
    pub api_url:        Option<String>,
    /// メール API の認証キー（`Http` バックエンド時は必須）
    pub api_key:        Option<String>,
    pub from_address:   EmailAddress,
    pub subject_prefix: String,
    /// 管理者通知の宛先。未設定なら登録時の通知は行われない
    pub admin_address:  Option<EmailAddress>,
    /// チェックボックスで追加される宛先
    pub opt_in_address: Option<EmailAddress>,
    pub timeout:        Duration,
    pub audit_policy:   AuditPolicy,
}

/// Web サーバーの設定
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host:         String,
    pub port:         u16,
    pub database_url: String,
    /// cookie 署名キー（32 バイト以上）
    pub secret_key:   String,
    pub mail:         MailConfig,
}

impl WebConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `Http` バックエンド時の `MAIL_API_URL` / `MAIL_API_KEY` の存在も
    /// ここで検証し、起動後の設定エラーを防ぐ。
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = optional("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("WEB_PORT", 8000)?;
        let database_url = required("DATABASE_URL")?;

        let secret_key = required("SECRET_KEY")?;
        if secret_key.len() < SECRET_KEY_MIN_BYTES {
            return Err(ConfigError::Invalid {
                name:    "SECRET_KEY",
                message: format!("{SECRET_KEY_MIN_BYTES} バイト以上である必要があります"),
            });
        }

        Ok(Self {
            host,
            port,
            database_url,
            secret_key,
            mail: MailConfig::from_env()?,
        })
    }
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = match optional("MAIL_BACKEND") {
            Some(value) => {
                MailBackend::from_str(&value).map_err(|_| ConfigError::Invalid {
                    name:    "MAIL_BACKEND",
                    message: format!("http または noop を指定してください（指定値: {value}）"),
                })?
            }
            None => MailBackend::default(),
        };

        let api_url = optional("MAIL_API_URL");
        let api_key = optional("MAIL_API_KEY");
        if backend == MailBackend::Http {
            if api_url.is_none() {
                return Err(ConfigError::Missing("MAIL_API_URL"));
            }
            if api_key.is_none() {
                return Err(ConfigError::Missing("MAIL_API_KEY"));
            }
        }

        let from_address = email("MAIL_FROM_ADDRESS")?.unwrap_or_else(default_from_address);
        let subject_prefix =
            optional("MAIL_SUBJECT_PREFIX").unwrap_or_else(|| "[Meibo]".to_string());

        let timeout = Duration::from_secs(parse_or("MAIL_TIMEOUT_SECS", 30)?);

        let audit_policy = match optional("MAIL_AUDIT_POLICY") {
            Some(value) => {
                AuditPolicy::from_str(&value).map_err(|_| ConfigError::Invalid {
                    name:    "MAIL_AUDIT_POLICY",
                    message: format!(
                        "response_only または always を指定してください（指定値: {value}）"
                    ),
                })?
            }
            None => AuditPolicy::default(),
        };

        Ok(Self {
            backend,
            api_url,
            api_key,
            from_address,
            subject_prefix,
            admin_address: email("MAIL_ADMIN_ADDRESS")?,
            opt_in_address: email("MAIL_OPT_IN_ADDRESS")?,
            timeout,
            audit_policy,
        })
    }
}

fn default_from_address() -> EmailAddress {
    // リテラルは valid な形式のため失敗しない
    EmailAddress::new("noreply@meibo.example.com")
        .unwrap_or_else(|_| unreachable!("既定の送信元アドレスは valid"))
}

/// 必須の環境変数を読み取る
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// 任意の環境変数を読み取る（未設定と空文字列は `None` として扱う）
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// 任意の環境変数をパースする（未設定なら既定値）
fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// 任意のメールアドレス環境変数を読み取り、構造を検証する
fn email(name: &'static str) -> Result<Option<EmailAddress>, ConfigError> {
    optional(name)
        .map(|value| {
            EmailAddress::new(value).map_err(|e| ConfigError::Invalid {
                name,
                message: e.to_string(),
            })
        })
        .transpose()
}
