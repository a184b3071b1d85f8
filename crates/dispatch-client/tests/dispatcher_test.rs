//! Dispatcher behavior: cached reads, invalidation, validation and notices.

use std::sync::Arc;

use dispatch_client::{
    ClientConfig, Dispatcher, FeatureFlags, MemoryNotifier, NoticeLevel, QueryKey,
    SEND_DISABLED_MESSAGE,
};
use dispatch_core::{JobDraft, PlannerState};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn truck_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "truckName": name,
        "capacityCuFt": 800.0,
        "maxWeightLbs": null,
        "truckType": "large",
        "currentStatus": "available",
        "lastKnownLat": null,
        "lastKnownLng": null,
        "driver": "Sam",
        "createdAt": "2026-03-01T08:00:00Z",
        "updatedAt": "2026-03-01T08:00:00Z"
    })
}

fn dispatcher(server: &MockServer, flags: FeatureFlags) -> (Dispatcher, Arc<MemoryNotifier>) {
    let config = ClientConfig {
        base_url: server.uri(),
        feature_flags: flags,
        ..Default::default()
    };
    let notifier = Arc::new(MemoryNotifier::new());
    let dispatcher = Dispatcher::from_config(&config, notifier.clone()).unwrap();
    (dispatcher, notifier)
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trucks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": [truck_json(1, "Big Red")]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, _) = dispatcher(&server, FeatureFlags::default());
    assert_eq!(dispatcher.trucks().await.unwrap().len(), 1);
    assert_eq!(dispatcher.trucks().await.unwrap()[0].truck_name, "Big Red");
    assert!(dispatcher.cache().contains(&QueryKey::Trucks));
}

#[tokio::test]
async fn test_successful_mutation_invalidates_and_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trucks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": [truck_json(1, "Big Red")]})),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/trucks/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, notifier) = dispatcher(&server, FeatureFlags::default());
    dispatcher.trucks().await.unwrap();
    dispatcher.delete_truck(1).await.unwrap();
    assert!(!dispatcher.cache().contains(&QueryKey::Trucks));
    dispatcher.trucks().await.unwrap();

    let last = notifier.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Success);
    assert_eq!(last.message, "Truck deleted");
}

#[tokio::test]
async fn test_failed_mutation_emits_error_notice_and_keeps_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trucks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": [truck_json(1, "Big Red")]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/jobs/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Job not found"})))
        .mount(&server)
        .await;

    let (dispatcher, notifier) = dispatcher(&server, FeatureFlags::default());
    dispatcher.trucks().await.unwrap();
    assert!(dispatcher.delete_job(42).await.is_err());

    let last = notifier.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, "Failed to delete job: Job not found");
    assert!(dispatcher.cache().contains(&QueryKey::Trucks));
}

#[tokio::test]
async fn test_invalid_job_draft_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (dispatcher, notifier) = dispatcher(&server, FeatureFlags::default());
    let mut state = PlannerState::new();
    let draft = JobDraft {
        location_name: "Warehouse".to_string(),
        address: "9 Dock Rd".to_string(),
        items: vec![],
        ..Default::default()
    };

    assert!(dispatcher.create_job(&mut state, &draft).await.is_err());
    assert!(state.locations.is_empty());
    assert_eq!(
        notifier.last().unwrap().message,
        "Please fill in location, address, and select at least one item"
    );
}

#[tokio::test]
async fn test_mark_three_complete_notice_counts_stops() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ops/mark-3-complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"completed": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, notifier) = dispatcher(&server, FeatureFlags::default());
    dispatcher.mark_three_complete(1, None).await.unwrap();
    assert_eq!(notifier.last().unwrap().message, "Marked 2 stops as complete");
}

#[tokio::test]
async fn test_send_next_three_refused_when_flag_off() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ops/send-next-3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let flags = FeatureFlags {
        whatsapp_stub: false,
        ..Default::default()
    };
    let (dispatcher, notifier) = dispatcher(&server, flags);
    assert!(dispatcher.send_next_three(1, None).await.is_err());

    let last = notifier.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(last.message, SEND_DISABLED_MESSAGE);
}

#[tokio::test]
async fn test_send_next_three_shows_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ops/send-next-3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Webhook triggered (mocked)"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, notifier) = dispatcher(&server, FeatureFlags::default());
    dispatcher.send_next_three(2, None).await.unwrap();
    assert_eq!(notifier.last().unwrap().message, "Webhook triggered (mocked)");
}
