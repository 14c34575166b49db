//! # 登録ユースケース
//!
//! 名前の登録と、新規登録時の管理者通知を担当する。
//!
//! ## 登録の流れ
//!
//! 1. 入力された名前を検証する（trim 後に空なら拒否）
//! 2. 同名ユーザーを検索し、存在すれば既知として返す
//! 3. 存在しなければ既定ロールを紐付けて作成する
//! 4. 管理者アドレスが設定されていれば通知メールを送信する
//!
//! 検索と挿入の間に同名登録が割り込んだ場合は username の UNIQUE 制約で
//! データベースエラーになる。

use std::sync::Arc;

use chrono::Utc;
use meibo_domain::{
    notification::{EmailAddress, Recipients},
    role::DEFAULT_ROLE_NAME,
    user::{User, UserId, UserName},
};
use meibo_infra::repository::{RoleRepository, UserRepository};
use meibo_shared::{event_log::event, log_business_event};

use crate::{error::WebError, usecase::notification::NotificationService};

/// 管理者通知メールの件名（プレフィックス合成前）
const NEW_USER_SUBJECT: &str = "Novo usuário";

/// 登録結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// 新規ユーザーとして作成された
    Created,
    /// 同名ユーザーが既に存在した
    AlreadyKnown,
}

/// 登録サービス
pub struct RegistrationService {
    users:          Arc<dyn UserRepository>,
    roles:          Arc<dyn RoleRepository>,
    notifier:       Arc<NotificationService>,
    /// 管理者通知の宛先。`None` なら通知は行わない
    admin_address:  Option<EmailAddress>,
    /// チェックボックスで追加される宛先
    opt_in_address: Option<EmailAddress>,
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        notifier: Arc<NotificationService>,
        admin_address: Option<EmailAddress>,
        opt_in_address: Option<EmailAddress>,
    ) -> Self {
        Self {
            users,
            roles,
            notifier,
            admin_address,
            opt_in_address,
        }
    }

    /// 名前を登録する
    ///
    /// 既知ユーザーの場合は何も作成せず [`AlreadyKnown`] を返す。
    /// 新規作成時に管理者通知が失敗した場合、ユーザーは作成済みのまま
    /// エラーが伝播する。
    ///
    /// [`AlreadyKnown`]: RegistrationOutcome::AlreadyKnown
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn register(
        &self,
        name: &str,
        opt_in: bool,
    ) -> Result<RegistrationOutcome, WebError> {
        let username = UserName::new(name)?;

        if self.users.find_by_username(&username).await?.is_some() {
            log_business_event!(
                event.category = event::category::REGISTRATION,
                event.action = event::action::USER_KNOWN,
                event.result = event::result::SUCCESS,
                entity_type = event::entity_type::USER,
            );
            return Ok(RegistrationOutcome::AlreadyKnown);
        }

        let role_id = self
            .roles
            .find_by_name(DEFAULT_ROLE_NAME)
            .await?
            .map(|role| role.id().clone());
        let user = User::new(UserId::new(), username, role_id, Utc::now());
        self.users.insert(&user).await?;

        log_business_event!(
            event.category = event::category::REGISTRATION,
            event.action = event::action::USER_CREATED,
            event.result = event::result::SUCCESS,
            entity_type = event::entity_type::USER,
            entity_id = %user.id(),
        );

        self.notify_admin(&user, opt_in).await?;

        Ok(RegistrationOutcome::Created)
    }

    /// 新規登録を管理者にメールで通知する
    ///
    /// 管理者アドレスが未設定なら何もしない（監査レコードも残らない）。
    async fn notify_admin(&self, user: &User, opt_in: bool) -> Result<(), WebError> {
        let Some(admin) = &self.admin_address else {
            return Ok(());
        };

        let mut addresses = vec![admin.clone()];
        if opt_in && let Some(extra) = &self.opt_in_address {
            addresses.push(extra.clone());
        }
        let recipients = Recipients::from_list(addresses)?;

        let body = format!("Novo usuário cadastrado: {}", user.username());
        self.notifier
            .send_and_log(recipients, NEW_USER_SUBJECT, &body)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use meibo_domain::{
        DomainError,
        notification::{AuditPolicy, NotificationError},
        role::{Role, RoleId, RoleName},
    };
    use meibo_infra::mock::{
        MockEmailTransport, MockRoleRepository, MockSentEmailRepository, MockUserRepository,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::usecase::notification::NotificationSettings;

    struct Fixture {
        users:     MockUserRepository,
        audit:     MockSentEmailRepository,
        transport: MockEmailTransport,
        service:   RegistrationService,
    }

    fn fixture(admin: Option<&str>, opt_in_extra: Option<&str>) -> Fixture {
        let users = MockUserRepository::new();
        let roles = MockRoleRepository::new();
        roles.add_role(Role::new(
            RoleId::new(),
            RoleName::new(DEFAULT_ROLE_NAME).unwrap(),
        ));
        let audit = MockSentEmailRepository::new();
        let transport = MockEmailTransport::new();

        let notifier = Arc::new(NotificationService::new(
            Arc::new(transport.clone()),
            Arc::new(audit.clone()),
            NotificationSettings {
                from_address:   EmailAddress::new("noreply@meibo.example.com").unwrap(),
                subject_prefix: "[Flasky]".to_string(),
                audit_policy:   AuditPolicy::default(),
            },
        ));
        let service = RegistrationService::new(
            Arc::new(users.clone()),
            Arc::new(roles),
            notifier,
            admin.map(|a| EmailAddress::new(a).unwrap()),
            opt_in_extra.map(|a| EmailAddress::new(a).unwrap()),
        );

        Fixture {
            users,
            audit,
            transport,
            service,
        }
    }

    #[tokio::test]
    async fn test_新規ユーザーは既定ロール付きで作成される() {
        let f = fixture(None, None);

        let outcome = f.service.register("alice", false).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::Created);
        let users = f.users.users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username().as_str(), "alice");
        assert!(users[0].role_id().is_some());
    }

    #[tokio::test]
    async fn test_既知ユーザーは再作成されない() {
        let f = fixture(None, None);

        f.service.register("alice", false).await.unwrap();
        let outcome = f.service.register("alice", false).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::AlreadyKnown);
        assert_eq!(f.users.users().len(), 1);
    }

    #[tokio::test]
    async fn test_名前は前後の空白を除いて比較される() {
        let f = fixture(None, None);

        f.service.register("alice", false).await.unwrap();
        let outcome = f.service.register("  alice  ", false).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::AlreadyKnown);
    }

    #[tokio::test]
    async fn test_空の名前は検証エラーになる() {
        let f = fixture(None, None);

        let result = f.service.register("   ", false).await;

        assert!(matches!(
            result,
            Err(WebError::Domain(DomainError::Validation(_)))
        ));
        assert!(f.users.users().is_empty());
    }

    #[tokio::test]
    async fn test_管理者設定時は新規登録で通知が送られ監査レコードが残る() {
        let f = fixture(Some("admin@example.com"), None);

        f.service.register("alice", false).await.unwrap();

        let sent = f.transport.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.to_form_value(), "admin@example.com");
        assert_eq!(sent[0].subject, "[Flasky] Novo usuário");
        assert_eq!(sent[0].text, "Novo usuário cadastrado: alice");

        let records = f.audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject(), "[Flasky] Novo usuário");
    }

    #[tokio::test]
    async fn test_既知ユーザーの再登録では通知されない() {
        let f = fixture(Some("admin@example.com"), None);

        f.service.register("alice", false).await.unwrap();
        f.service.register("alice", false).await.unwrap();

        assert_eq!(f.transport.sent_emails().len(), 1);
        assert_eq!(f.audit.len(), 1);
    }

    #[tokio::test]
    async fn test_opt_inで追加宛先が含まれる() {
        let f = fixture(Some("admin@example.com"), Some("extra@example.com"));

        f.service.register("bob", true).await.unwrap();

        let sent = f.transport.sent_emails();
        assert_eq!(sent[0].to.len(), 2);
        assert_eq!(
            sent[0].to.to_form_value(),
            "admin@example.com, extra@example.com"
        );
    }

    #[tokio::test]
    async fn test_opt_inでも追加宛先が未設定なら管理者のみに送られる() {
        let f = fixture(Some("admin@example.com"), None);

        f.service.register("bob", true).await.unwrap();

        assert_eq!(f.transport.sent_emails()[0].to.len(), 1);
    }

    #[tokio::test]
    async fn test_管理者未設定なら通知も監査レコードもない() {
        let f = fixture(None, Some("extra@example.com"));

        f.service.register("alice", true).await.unwrap();

        assert!(f.transport.sent_emails().is_empty());
        assert!(f.audit.is_empty());
        assert_eq!(f.users.users().len(), 1);
    }

    #[tokio::test]
    async fn test_通知失敗はエラーとして伝播するがユーザーは作成済みのまま() {
        let f = fixture(Some("admin@example.com"), None);
        f.transport.fail_with("接続拒否");

        let result = f.service.register("alice", false).await;

        assert!(matches!(
            result,
            Err(WebError::Notification(NotificationError::Transport(_)))
        ));
        assert_eq!(f.users.users().len(), 1);
    }
}
