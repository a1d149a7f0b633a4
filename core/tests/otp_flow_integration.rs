//! End-to-end passcode flows through the dispatch service

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use otp_core::{
    Channel, CodeDelivery, DomainError, ManualClock, MemoryRowStore, NoBypassPolicy, Notifier,
    OtpError, OtpService, OtpServiceConfig, RowStore, SecureCodeGenerator, CURRENT_ROW,
};

#[derive(Default)]
struct RecordingNotifier {
    codes: Mutex<HashMap<String, String>>,
}

impl RecordingNotifier {
    fn last_code(&self, destination: &str) -> String {
        self.codes
            .lock()
            .unwrap()
            .get(destination)
            .cloned()
            .expect("no code delivered")
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, delivery: &CodeDelivery) -> Result<String, String> {
        self.codes
            .lock()
            .unwrap()
            .insert(delivery.destination.clone(), delivery.code.expose().to_string());
        Ok("recorded".to_string())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

struct Flow {
    service: OtpService,
    store: Arc<MemoryRowStore>,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<ManualClock>,
}

fn flow() -> Flow {
    let store = Arc::new(MemoryRowStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
    ));
    let service = OtpService::with_components(
        store.clone(),
        notifier.clone(),
        Arc::new(NoBypassPolicy),
        clock.clone(),
        Arc::new(SecureCodeGenerator),
        OtpServiceConfig::default(),
    );
    Flow {
        service,
        store,
        notifier,
        clock,
    }
}

fn wrong_code(correct: &str) -> String {
    if correct == "999999" {
        "100000".to_string()
    } else {
        (correct.parse::<u32>().unwrap() + 1).to_string()
    }
}

#[tokio::test]
async fn verify_correct_code_once() {
    let f = flow();
    f.service.issue_and_send("a@x.com", Channel::Email).await.unwrap();
    let code = f.notifier.last_code("a@x.com");

    assert!(f.service.verify("a@x.com", &code).await.unwrap());
    assert!(!f.service.verify("a@x.com", &code).await.unwrap());
}

#[tokio::test]
async fn five_wrong_guesses_burn_the_code() {
    let f = flow();
    f.service.issue_and_send("b@x.com", Channel::Email).await.unwrap();
    let code = f.notifier.last_code("b@x.com");
    let wrong = wrong_code(&code);

    for _ in 0..5 {
        assert!(!f.service.verify("b@x.com", &wrong).await.unwrap());
    }
    assert!(f.store.get("b@x.com", CURRENT_ROW).await.unwrap().is_none());
    assert!(!f.service.verify("b@x.com", &code).await.unwrap());
}

#[tokio::test]
async fn fourth_rapid_issue_is_rate_limited() {
    let f = flow();
    for _ in 0..3 {
        f.service.issue_and_send("c@x.com", Channel::Email).await.unwrap();
    }

    let err = f
        .service
        .issue_and_send("c@x.com", Channel::Email)
        .await
        .unwrap_err();
    match err {
        DomainError::Otp(OtpError::RateLimitExceeded {
            retry_after_seconds,
            limit,
            window_seconds,
        }) => {
            assert_eq!(limit, 3);
            assert_eq!(window_seconds, 600);
            assert!(retry_after_seconds >= 1 && retry_after_seconds <= 600);
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn issuance_resumes_after_window() {
    let f = flow();
    for _ in 0..3 {
        f.service.issue_and_send("c@x.com", Channel::Email).await.unwrap();
    }
    assert!(f.service.issue_and_send("c@x.com", Channel::Email).await.is_err());

    f.clock.advance(Duration::seconds(601));
    f.service.issue_and_send("c@x.com", Channel::Email).await.unwrap();
}

#[tokio::test]
async fn expired_code_is_rejected_and_removed() {
    let f = flow();
    f.service.issue_and_send("d@x.com", Channel::Email).await.unwrap();
    let code = f.notifier.last_code("d@x.com");

    f.clock.advance(Duration::minutes(4));
    assert!(!f.service.verify("d@x.com", &code).await.unwrap());
    assert!(f.store.get("d@x.com", CURRENT_ROW).await.unwrap().is_none());
}

#[tokio::test]
async fn reissue_supersedes_previous_code() {
    let f = flow();
    f.service.issue_and_send("e@x.com", Channel::Email).await.unwrap();
    let first = f.notifier.last_code("e@x.com");
    f.service.issue_and_send("e@x.com", Channel::Email).await.unwrap();
    let second = f.notifier.last_code("e@x.com");

    if first != second {
        assert!(!f.service.verify("e@x.com", &first).await.unwrap());
    }
    assert!(f.service.verify("e@x.com", &second).await.unwrap());
}

#[tokio::test]
async fn subjects_are_isolated() {
    let f = flow();
    f.service.issue_and_send("f@x.com", Channel::Email).await.unwrap();
    f.service.issue_and_send("g@x.com", Channel::Email).await.unwrap();
    let code_f = f.notifier.last_code("f@x.com");

    f.service.clear("g@x.com").await.unwrap();
    assert!(f.service.verify("f@x.com", &code_f).await.unwrap());
}
