//! # 画面テンプレート
//!
//! Tera テンプレートによる HTML 描画。テンプレートはビルド時に
//! バイナリへ埋め込み、起動後のファイル読み込みを不要にする。

use meibo_domain::{sent_email::SentEmail, user::User};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::WebError;

/// 送信メール一覧の表示用行
#[derive(Debug, Serialize)]
struct SentEmailRow {
    timestamp:  String,
    sender:     String,
    recipients: String,
    subject:    String,
    body:       String,
    status:     &'static str,
}

impl SentEmailRow {
    fn from_record(record: &SentEmail) -> Self {
        // 宛先は可逆な保存表現から表示用のカンマ区切りに戻す。
        // 復元できない行（手動変更など）は保存表現をそのまま表示する。
        let recipients = record
            .parse_recipients()
            .map(|r| r.to_form_value())
            .unwrap_or_else(|_| record.recipients().to_string());

        Self {
            timestamp: record
                .timestamp()
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            sender: record.sender().as_str().to_string(),
            recipients,
            subject: record.subject().to_string(),
            body: record.body().to_string(),
            status: record.status().into(),
        }
    }
}

/// HTML ページの描画を担当する
pub struct PageRenderer {
    engine: Tera,
}

impl PageRenderer {
    /// 埋め込みテンプレートからレンダラーを構築する
    pub fn new() -> Result<Self, WebError> {
        let mut engine = Tera::default();
        engine
            .add_raw_templates(vec![
                ("base.html", include_str!("../templates/base.html")),
                ("index.html", include_str!("../templates/index.html")),
                ("emails.html", include_str!("../templates/emails.html")),
            ])
            .map_err(|e| WebError::Template(e.to_string()))?;
        Ok(Self { engine })
    }

    /// トップページ（登録フォーム + ユーザー一覧）を描画する
    ///
    /// `name` / `known` はセッション cookie 由来の挨拶表示に使う。
    pub fn index(
        &self,
        name: Option<&str>,
        known: bool,
        users: &[User],
    ) -> Result<String, WebError> {
        let usernames: Vec<&str> = users.iter().map(|u| u.username().as_str()).collect();

        let mut context = Context::new();
        context.insert("name", &name);
        context.insert("known", &known);
        context.insert("users", &usernames);

        self.render("index.html", &context)
    }

    /// 送信メール一覧ページを描画する
    pub fn emails(&self, records: &[SentEmail]) -> Result<String, WebError> {
        let rows: Vec<SentEmailRow> = records.iter().map(SentEmailRow::from_record).collect();

        let mut context = Context::new();
        context.insert("emails", &rows);

        self.render("emails.html", &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, WebError> {
        self.engine
            .render(template, context)
            .map_err(|e| WebError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use meibo_domain::{
        notification::{DeliveryStatus, EmailAddress, Recipients},
        sent_email::{SentEmail, SentEmailId},
        user::{User, UserId, UserName},
    };

    use super::*;

    fn renderer() -> PageRenderer {
        PageRenderer::new().unwrap()
    }

    fn user(name: &str) -> User {
        User::new(UserId::new(), UserName::new(name).unwrap(), None, Utc::now())
    }

    #[test]
    fn test_トップページに登録ユーザーが表示される() {
        let page = renderer()
            .index(None, false, &[user("alice"), user("bob")])
            .unwrap();

        assert!(page.contains("ストレンジャー"));
        assert!(page.contains("alice"));
        assert!(page.contains("bob"));
    }

    #[test]
    fn test_トップページは既知ユーザーに再訪の挨拶をする() {
        let page = renderer().index(Some("alice"), true, &[]).unwrap();

        assert!(page.contains("こんにちは、alice！"));
        assert!(page.contains("また会えましたね。"));
    }

    #[test]
    fn test_トップページは新規ユーザーに初対面の挨拶をする() {
        let page = renderer().index(Some("alice"), false, &[]).unwrap();

        assert!(page.contains("はじめまして！"));
    }

    #[test]
    fn test_送信メール一覧に監査レコードが表示される() {
        let recipients = Recipients::from_list(vec![
            EmailAddress::new("admin@example.com").unwrap(),
            EmailAddress::new("extra@example.com").unwrap(),
        ])
        .unwrap();
        let record = SentEmail::new(
            SentEmailId::new(),
            EmailAddress::new("noreply@meibo.example.com").unwrap(),
            &recipients,
            "[Meibo] Novo usuário",
            "Novo usuário cadastrado: alice",
            DeliveryStatus::Sent,
            Utc::now(),
        );

        let page = renderer().emails(&[record]).unwrap();

        // 表示はカンマ区切り（保存表現の JSON ではない）
        assert!(page.contains("admin@example.com, extra@example.com"));
        assert!(page.contains("[Meibo] Novo usuário"));
        assert!(page.contains("sent"));
    }

    #[test]
    fn test_送信メールがない場合は空メッセージを表示する() {
        let page = renderer().emails(&[]).unwrap();

        assert!(page.contains("まだメールは送信されていません。"));
    }
}
