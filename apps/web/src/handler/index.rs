//! # トップページハンドラ
//!
//! 登録フォームの表示と POST 処理を担当する。
//!
//! ## セッション cookie
//!
//! 最後に登録した名前と既知ユーザーかどうかを署名付き cookie に保持し、
//! リダイレクト後の GET で挨拶表示に使う（PRG パターン）。

use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use serde::Deserialize;

use crate::{error::WebError, state::AppState, usecase::RegistrationOutcome};

/// 最後に入力された名前を保持する cookie
const COOKIE_NAME: &str = "name";
/// 既知ユーザーかどうかを保持する cookie
const COOKIE_KNOWN: &str = "known";

/// 登録フォーム
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name:   String,
    /// 追加通知先チェックボックス（チェック時のみ送信される）
    #[serde(default)]
    pub opt_in: Option<String>,
}

/// `GET /` - 登録フォームとユーザー一覧を表示する
pub async fn show_index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Html<String>, WebError> {
    let name = jar.get(COOKIE_NAME).map(|c| c.value().to_string());
    let known = jar
        .get(COOKIE_KNOWN)
        .is_some_and(|c| c.value() == "true");

    let users = state.users.list_ordered_by_username().await?;
    let page = state.pages.index(name.as_deref(), known, &users)?;

    Ok(Html(page))
}

/// `POST /` - 名前を登録してトップページへリダイレクトする
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(SignedCookieJar, Redirect), WebError> {
    let opt_in = form.opt_in.is_some();
    let outcome = state.registration.register(&form.name, opt_in).await?;
    let known = outcome == RegistrationOutcome::AlreadyKnown;

    let jar = jar
        .add(
            Cookie::build((COOKIE_NAME, form.name.trim().to_string()))
                .path("/")
                .build(),
        )
        .add(
            Cookie::build((COOKIE_KNOWN, known.to_string()))
                .path("/")
                .build(),
        );

    Ok((jar, Redirect::to("/")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::HeaderMap;
    use axum_extra::extract::cookie::Key;
    use meibo_domain::notification::{AuditPolicy, EmailAddress};
    use meibo_infra::mock::{
        MockEmailTransport, MockRoleRepository, MockSentEmailRepository, MockUserRepository,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        page::PageRenderer,
        usecase::{NotificationService, NotificationSettings, RegistrationService},
    };

    fn state(users: &MockUserRepository) -> AppState {
        let notifier = Arc::new(NotificationService::new(
            Arc::new(MockEmailTransport::new()),
            Arc::new(MockSentEmailRepository::new()),
            NotificationSettings {
                from_address:   EmailAddress::new("noreply@meibo.example.com").unwrap(),
                subject_prefix: "[Meibo]".to_string(),
                audit_policy:   AuditPolicy::default(),
            },
        ));
        let registration = Arc::new(RegistrationService::new(
            Arc::new(users.clone()),
            Arc::new(MockRoleRepository::new()),
            notifier,
            None,
            None,
        ));

        AppState {
            registration,
            users: Arc::new(users.clone()),
            sent_emails: Arc::new(MockSentEmailRepository::new()),
            pages: Arc::new(PageRenderer::new().unwrap()),
            cookie_key: Key::generate(),
        }
    }

    fn empty_jar(state: &AppState) -> SignedCookieJar {
        SignedCookieJar::from_headers(&HeaderMap::new(), state.cookie_key.clone())
    }

    #[tokio::test]
    async fn test_cookieがなければストレンジャーとして挨拶する() {
        let state = state(&MockUserRepository::new());
        let jar = empty_jar(&state);

        let Html(page) = show_index(State(state), jar).await.unwrap();

        assert!(page.contains("ストレンジャー"));
    }

    #[tokio::test]
    async fn test_登録するとセッションcookieが設定されリダイレクトされる() {
        let users = MockUserRepository::new();
        let state = state(&users);
        let jar = empty_jar(&state);

        let form = RegisterForm {
            name:   "alice".to_string(),
            opt_in: None,
        };
        let (jar, _redirect) = register(State(state), jar, Form(form)).await.unwrap();

        assert_eq!(jar.get(COOKIE_NAME).unwrap().value(), "alice");
        assert_eq!(jar.get(COOKIE_KNOWN).unwrap().value(), "false");
        assert_eq!(users.users().len(), 1);
    }

    #[tokio::test]
    async fn test_再登録ではknownのcookieがtrueになる() {
        let users = MockUserRepository::new();
        let state1 = state(&users);
        let jar = empty_jar(&state1);
        let form = RegisterForm {
            name:   "alice".to_string(),
            opt_in: None,
        };
        register(State(state1), jar, Form(form)).await.unwrap();

        let state2 = state(&users);
        let jar = empty_jar(&state2);
        let form = RegisterForm {
            name:   "alice".to_string(),
            opt_in: None,
        };
        let (jar, _redirect) = register(State(state2), jar, Form(form)).await.unwrap();

        assert_eq!(jar.get(COOKIE_KNOWN).unwrap().value(), "true");
        assert_eq!(users.users().len(), 1);
    }
}
