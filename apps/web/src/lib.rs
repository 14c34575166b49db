//! # Meibo Web アプリケーション
//!
//! 名前の登録フォームと送信メール監査の閲覧を提供する Web サーバー。
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - Web 層エラーとエラーページ
//! - [`handler`] - HTTP ハンドラ
//! - [`page`] - Tera テンプレートによる画面描画
//! - [`state`] - アプリケーション状態
//! - [`usecase`] - 登録・通知ユースケース

pub mod config;
pub mod error;
pub mod handler;
pub mod page;
pub mod state;
pub mod usecase;
