//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! meibo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meibo_domain::{
    notification::{NotificationError, OutboundEmail, TransportOutcome},
    role::Role,
    sent_email::SentEmail,
    user::{User, UserName},
};

use crate::{
    error::InfraError,
    repository::{RoleRepository, SentEmailRepository, UserRepository},
    transport::EmailTransport,
};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_username(&self, username: &UserName) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn list_ordered_by_username(&self) -> Result<Vec<User>, InfraError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| a.username().as_str().cmp(b.username().as_str()));
        Ok(users)
    }
}

// ===== MockRoleRepository =====

#[derive(Clone, Default)]
pub struct MockRoleRepository {
    roles: Arc<Mutex<Vec<Role>>>,
}

impl MockRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_role(&self, role: Role) {
        self.roles.lock().unwrap().push(role);
    }
}

#[async_trait]
impl RoleRepository for MockRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, InfraError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name().as_str() == name)
            .cloned())
    }

    async fn insert_if_absent(&self, role: &Role) -> Result<(), InfraError> {
        let mut roles = self.roles.lock().unwrap();
        if !roles.iter().any(|r| r.name() == role.name()) {
            roles.push(role.clone());
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Role>, InfraError> {
        let mut roles = self.roles.lock().unwrap().clone();
        roles.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(roles)
    }
}

// ===== MockSentEmailRepository =====

#[derive(Clone, Default)]
pub struct MockSentEmailRepository {
    records: Arc<Mutex<Vec<SentEmail>>>,
    fail_inserts: Arc<Mutex<bool>>,
}

impl MockSentEmailRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 挿入順のまま記録を返す（検証用）
    pub fn records(&self) -> Vec<SentEmail> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// 以後の insert を失敗させる（ストア停止の再現）
    pub fn fail_inserts(&self) {
        *self.fail_inserts.lock().unwrap() = true;
    }
}

#[async_trait]
impl SentEmailRepository for MockSentEmailRepository {
    async fn insert(&self, record: &SentEmail) -> Result<(), InfraError> {
        if *self.fail_inserts.lock().unwrap() {
            return Err(InfraError::unexpected("モック: ストアが利用できません"));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_newest_first(&self) -> Result<Vec<SentEmail>, InfraError> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        Ok(records)
    }
}

// ===== MockEmailTransport =====

/// モック transport の応答動作
enum MockTransportBehavior {
    /// 固定の HTTP 応答を返す
    Respond(u16, String),
    /// transport レベルのエラーを発生させる
    Fail(String),
}

/// 送信されたメールを記録するモック transport
///
/// 既定では 200 応答を返す。`respond_with` で非 2xx 応答、
/// `fail_with` で transport エラーを再現できる。
#[derive(Clone)]
pub struct MockEmailTransport {
    sent:     Arc<Mutex<Vec<OutboundEmail>>>,
    behavior: Arc<Mutex<MockTransportBehavior>>,
}

impl MockEmailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定の HTTP 応答を設定する
    pub fn respond_with(&self, status_code: u16, body: impl Into<String>) {
        *self.behavior.lock().unwrap() = MockTransportBehavior::Respond(status_code, body.into());
    }

    /// transport エラーを発生させる
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.behavior.lock().unwrap() = MockTransportBehavior::Fail(message.into());
    }

    /// 送信された（transport まで届いた）メールを返す
    pub fn sent_emails(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockEmailTransport {
    fn default() -> Self {
        Self {
            sent:     Arc::new(Mutex::new(Vec::new())),
            behavior: Arc::new(Mutex::new(MockTransportBehavior::Respond(
                200,
                r#"{"message":"Queued"}"#.to_string(),
            ))),
        }
    }
}

#[async_trait]
impl EmailTransport for MockEmailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<TransportOutcome, NotificationError> {
        match &*self.behavior.lock().unwrap() {
            MockTransportBehavior::Respond(status_code, body) => {
                self.sent.lock().unwrap().push(email.clone());
                Ok(TransportOutcome {
                    status_code: *status_code,
                    body:        body.clone(),
                })
            }
            MockTransportBehavior::Fail(message) => {
                Err(NotificationError::Transport(message.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use meibo_domain::notification::{EmailAddress, Recipients};

    use super::*;

    fn make_email() -> OutboundEmail {
        OutboundEmail {
            from:    EmailAddress::new("noreply@example.com").unwrap(),
            to:      Recipients::Single(EmailAddress::new("admin@example.com").unwrap()),
            subject: "[Meibo] テスト".to_string(),
            text:    "本文".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_transportは既定で200を返し送信を記録する() {
        let transport = MockEmailTransport::new();
        let outcome = transport.send(&make_email()).await.unwrap();

        assert_eq!(outcome.status_code, 200);
        assert_eq!(transport.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_withでtransportエラーを再現できる() {
        let transport = MockEmailTransport::new();
        transport.fail_with("接続拒否");

        let result = transport.send(&make_email()).await;
        assert!(matches!(result, Err(NotificationError::Transport(_))));
        // 失敗した送信は記録されない
        assert!(transport.sent_emails().is_empty());
    }
}
