//! # アプリケーション状態
//!
//! 全ハンドラで共有される状態。リポジトリとユースケースは `Arc` で共有し、
//! cookie 署名キーは [`FromRef`] 経由で [`SignedCookieJar`] extractor に渡す。
//!
//! [`SignedCookieJar`]: axum_extra::extract::cookie::SignedCookieJar

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use meibo_infra::repository::{SentEmailRepository, UserRepository};

use crate::{page::PageRenderer, usecase::RegistrationService};

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub registration: Arc<RegistrationService>,
    pub users:        Arc<dyn UserRepository>,
    pub sent_emails:  Arc<dyn SentEmailRepository>,
    pub pages:        Arc<PageRenderer>,
    /// cookie 署名キー（`SECRET_KEY` から導出）
    pub cookie_key:   Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
