//! ApiClient against a mock backend.
//!
//! Verifies paths, bodies, envelope unwrapping and error mapping.

use chrono::NaiveDate;
use dispatch_client::ApiClient;
use dispatch_core::defaults::MAX_PAGE_LIMIT;
use dispatch_core::{Error, ListJobsQuery, MetricsQuery, SendNextRequest};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn job_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "title": "Downtown Depot",
        "actionType": "PICKUP",
        "location": {"name": "Downtown Depot", "address": "1 Main St"},
        "items": [1],
        "priority": 1,
        "earliestTime": null,
        "latestTime": null,
        "serviceMinutes": null,
        "notes": null,
        "largeTruckOnly": false,
        "curfewFlag": false,
        "assignedTruckId": 1,
        "assignedDriverId": null,
        "assignedTruck": null,
        "status": status,
        "sequence": 1,
        "date": "2026-03-02",
        "createdAt": "2026-03-01T08:00:00Z",
        "updatedAt": "2026-03-01T08:00:00Z"
    })
}

#[tokio::test]
async fn test_list_all_jobs_follows_pages() {
    let mock_server = MockServer::start().await;
    let limit = MAX_PAGE_LIMIT.to_string();

    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .and(query_param("page", "1"))
        .and(query_param("limit", limit.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"total": 3, "page": 1, "limit": 2,
                     "jobs": [job_json(1, "assigned"), job_json(2, "assigned")]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"total": 3, "page": 2, "limit": 2, "jobs": [job_json(3, "completed")]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let page = client
        .list_all_jobs(NaiveDate::from_ymd_opt(2026, 3, 2))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.page, 1);
    let ids: Vec<i64> = page.jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_list_jobs_sends_date_and_unwraps_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .and(query_param("date", "2026-03-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"total": 1, "page": 1, "limit": 100, "jobs": [job_json(7, "assigned")]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let page = client
        .list_jobs(&ListJobsQuery {
            date: NaiveDate::from_ymd_opt(2026, 3, 2),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.jobs[0].id, 7);
}

#[tokio::test]
async fn test_error_body_becomes_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/jobs/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Job not found"})))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let err = client.get_job(99).await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Job not found");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/trucks/3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let err = client.delete_truck(3).await.unwrap_err();
    assert_eq!(err.user_message(), "database unavailable");
}

#[tokio::test]
async fn test_unreachable_backend_is_request_error() {
    // Port 9 (discard) is not served in the test environment.
    let client = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
    let err = client.list_trucks().await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}

#[tokio::test]
async fn test_defer_posts_new_priority() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/jobs/4/defer"))
        .and(body_json(json!({"new_priority": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": job_json(4, "deferred")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let job = client.defer_job(4, 3).await.unwrap();
    assert_eq!(job.status.to_string(), "deferred");
}

#[tokio::test]
async fn test_optimize_answer_is_not_enveloped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/jobs/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "totalJobs": 2,
            "assigned": 1,
            "assignments": [{
                "jobId": 8,
                "jobTitle": "Warehouse",
                "assignedTruck": "Big Red",
                "driver": "Sam",
                "score": "1.00"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let result = client.optimize_jobs().await.unwrap();
    assert_eq!(result.total_jobs, 2);
    assert_eq!(result.assignments[0].assigned_truck, "Big Red");
}

#[tokio::test]
async fn test_ops_payloads_use_snake_case() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ops/mark-3-complete"))
        .and(body_json(json!({"truck_id": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"completed": 3})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ops/send-next-3"))
        .and(body_json(json!({"truck_id": 2, "webhook": "https://hooks.example.com"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Webhook triggered (mocked)"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    assert_eq!(client.mark_three_complete(1, None).await.unwrap().completed, 3);

    let sent = client
        .send_next_three(&SendNextRequest {
            truck_id: 2,
            webhook: Some("https://hooks.example.com".to_string()),
            date: None,
        })
        .await
        .unwrap();
    assert!(sent.success);
}

#[tokio::test]
async fn test_metrics_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics/summary"))
        .and(query_param("from", "2026-03-01"))
        .and(query_param("to", "2026-03-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "date_range": {"from": "2026-03-01", "to": "2026-03-07"},
            "utilization_by_truck": [{"truck_name": "Big Red", "utilization": 62.5}],
            "jobs_completed": 12,
            "jobs_deferred": 1,
            "on_time_percentage": 94.5,
            "avg_service_time_minutes": 18.0,
            "avg_drive_time_minutes": 24.0,
            "heatmap_data": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let metrics = client
        .metrics(&MetricsQuery {
            from: NaiveDate::from_ymd_opt(2026, 3, 1),
            to: NaiveDate::from_ymd_opt(2026, 3, 7),
        })
        .await
        .unwrap();
    assert_eq!(metrics.jobs_completed, 12);
    assert_eq!(metrics.utilization_by_truck[0].utilization, 62.5);
}

#[tokio::test]
async fn test_health_check_reports_false_on_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    assert!(!client.health_check().await.unwrap());
}
