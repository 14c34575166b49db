//! # ユースケース層
//!
//! ドメインモデルとインフラ層を組み合わせたアプリケーションのユースケース。
//!
//! - [`notification`] - メールの送信と監査レコードの記録
//! - [`registration`] - 名前の登録と管理者通知

pub mod notification;
pub mod registration;

pub use notification::{NotificationService, NotificationSettings};
pub use registration::{RegistrationOutcome, RegistrationService};
