//! # 送信メール一覧ハンドラ

use axum::{extract::State, response::Html};

use crate::{error::WebError, state::AppState};

/// `GET /emails` - 監査レコードを新しい順に表示する
pub async fn list_sent_emails(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let records = state.sent_emails.list_newest_first().await?;
    let page = state.pages.emails(&records)?;

    Ok(Html(page))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_extra::extract::cookie::Key;
    use chrono::{Duration, Utc};
    use meibo_domain::{
        notification::{AuditPolicy, DeliveryStatus, EmailAddress, Recipients},
        sent_email::{SentEmail, SentEmailId},
    };
    use meibo_infra::{
        mock::{
            MockEmailTransport, MockRoleRepository, MockSentEmailRepository, MockUserRepository,
        },
        repository::SentEmailRepository as _,
    };

    use super::*;
    use crate::{
        page::PageRenderer,
        usecase::{NotificationService, NotificationSettings, RegistrationService},
    };

    fn state(audit: &MockSentEmailRepository) -> AppState {
        let notifier = Arc::new(NotificationService::new(
            Arc::new(MockEmailTransport::new()),
            Arc::new(audit.clone()),
            NotificationSettings {
                from_address:   EmailAddress::new("noreply@meibo.example.com").unwrap(),
                subject_prefix: "[Meibo]".to_string(),
                audit_policy:   AuditPolicy::default(),
            },
        ));
        let registration = Arc::new(RegistrationService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockRoleRepository::new()),
            notifier,
            None,
            None,
        ));

        AppState {
            registration,
            users: Arc::new(MockUserRepository::new()),
            sent_emails: Arc::new(audit.clone()),
            pages: Arc::new(PageRenderer::new().unwrap()),
            cookie_key: Key::generate(),
        }
    }

    fn record(subject: &str, timestamp: chrono::DateTime<Utc>) -> SentEmail {
        SentEmail::new(
            SentEmailId::new(),
            EmailAddress::new("noreply@meibo.example.com").unwrap(),
            &Recipients::Single(EmailAddress::new("admin@example.com").unwrap()),
            subject,
            "本文",
            DeliveryStatus::Sent,
            timestamp,
        )
    }

    #[tokio::test]
    async fn test_送信メール一覧は挿入順に関係なく新しい順に表示される() {
        let audit = MockSentEmailRepository::new();
        let now = Utc::now();
        // 古いレコードを先に挿入する
        audit
            .insert(&record("古いメール", now - Duration::minutes(10)))
            .await
            .unwrap();
        audit.insert(&record("新しいメール", now)).await.unwrap();

        let Html(page) = list_sent_emails(State(state(&audit))).await.unwrap();

        let newer = page.find("新しいメール").unwrap();
        let older = page.find("古いメール").unwrap();
        assert!(newer < older);
    }
}
