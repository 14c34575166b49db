//! # Meibo ドメイン層
//!
//! ユーザー登録とメール通知監査のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（[`user::User`],
//!   [`sent_email::SentEmail`]）
//! - **値オブジェクト**: 生成時にバリデーションされる不変オブジェクト
//!   （[`user::UserName`], [`notification::EmailAddress`],
//!   [`notification::Recipients`]）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! web → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、メール API）には一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use meibo_domain::{notification::EmailAddress, user::UserName};
//!
//! let name = UserName::new("alice")?;
//! let address = EmailAddress::new("admin@example.com")?;
//! assert_eq!(name.as_str(), "alice");
//! assert_eq!(address.as_str(), "admin@example.com");
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod error;
pub mod notification;
pub mod role;
pub mod sent_email;
pub mod user;

pub use error::DomainError;
