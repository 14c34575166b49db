//! # ビジネスイベントログの構造化ヘルパー
//!
//! ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"`
//! マーカーが自動付与され、`jq 'select(.["event.kind"] == "business_event")'`
//! でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`event.action`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const REGISTRATION: &str = "registration";
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        // 登録
        pub const USER_CREATED: &str = "user.created";
        pub const USER_KNOWN: &str = "user.known";

        // 通知
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_ATTEMPTED: &str = "notification.attempted";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const USER: &str = "user";
        pub const SENT_EMAIL: &str = "sent_email";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tracing::{
        Event, Metadata,
        span::{Attributes, Id, Record},
    };

    use super::*;

    /// 受信したイベント数を数えるだけの subscriber
    struct CountingSubscriber {
        events: Arc<AtomicUsize>,
    }

    impl tracing::Subscriber for CountingSubscriber {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _attrs: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }

        fn record(&self, _id: &Id, _record: &Record<'_>) {}

        fn record_follows_from(&self, _id: &Id, _follows: &Id) {}

        fn event(&self, _event: &Event<'_>) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }

        fn enter(&self, _id: &Id) {}

        fn exit(&self, _id: &Id) {}
    }

    #[test]
    fn test_log_business_eventはinfoイベントを1件出力する() {
        let events = Arc::new(AtomicUsize::new(0));
        let subscriber = CountingSubscriber {
            events: events.clone(),
        };

        tracing::subscriber::with_default(subscriber, || {
            crate::log_business_event!(
                event.category = event::category::REGISTRATION,
                event.action = event::action::USER_CREATED,
                event.result = event::result::SUCCESS,
                entity_type = event::entity_type::USER,
            );
        });

        assert_eq!(events.load(Ordering::SeqCst), 1);
    }
}
