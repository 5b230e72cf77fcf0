#[path = "common/mod.rs"]
mod common;

use std::net::TcpListener;
use std::time::Duration;

use certdesk::filter::DateRange;
use certdesk::types::{Certificate, NewShip, Report, Ship, ShipKind};
use certdesk::{DeskError, EntityId, FailureKind, HttpClient, ResourceClient};
use common::CannedServer;
use jiff::civil::date;
use url::Url;

fn client_for(server: &CannedServer) -> HttpClient {
    HttpClient::with_timeouts(
        Url::parse(&server.url).unwrap(),
        Duration::from_secs(5),
        Duration::from_secs(2),
    )
    .unwrap()
}

fn new_ship() -> NewShip {
    NewShip {
        imo: "9074729".to_string(),
        name: "MV Test".to_string(),
        kind: ShipKind::Ship,
        flag: "Panama".to_string(),
    }
}

#[tokio::test]
async fn test_list_sends_page_and_limit() {
    let server = CannedServer::start(vec![(
        200,
        r#"{"ships": [{"id": 101, "name": "Ocean Star", "imo": "9074729", "type": "Ship"}], "total": 120}"#
            .to_string(),
    )]);
    let client = client_for(&server);

    let page = client.list::<Ship>(3, 50).await.unwrap();
    assert_eq!(page.number, 3);
    assert_eq!(page.total, 120);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.items[0].id, EntityId::from("101"));

    let requests = server.requests();
    assert_eq!(requests[0].target, "/api/ships/getAll?page=3&limit=50");
}

#[tokio::test]
async fn test_error_status_carries_server_reason() {
    let server = CannedServer::start(vec![(
        409,
        r#"{"message": "IMO already registered"}"#.to_string(),
    )]);
    let client = client_for(&server);

    let err = client.create::<Ship>(&new_ship()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Application);
    assert_eq!(err.to_string(), "IMO already registered");
    match err {
        DeskError::Application { status, .. } => assert_eq!(status, Some(409)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_without_body_uses_status_text() {
    let server = CannedServer::start(vec![(500, String::new())]);
    let client = client_for(&server);

    let err = client.list::<Certificate>(1, 50).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Application);
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn test_success_false_is_an_application_failure() {
    let server = CannedServer::start(vec![(
        200,
        r#"{"success": false, "error": "flag is required"}"#.to_string(),
    )]);
    let client = client_for(&server);

    let err = client.create::<Ship>(&new_ship()).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Application);
    assert_eq!(err.to_string(), "flag is required");
}

#[tokio::test]
async fn test_create_posts_json_and_returns_message() {
    let server = CannedServer::start(vec![(200, r#"{"message": "Ship created"}"#.to_string())]);
    let client = client_for(&server);

    let ack = client.create::<Ship>(&new_ship()).await.unwrap();
    assert_eq!(ack.message, "Ship created");

    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/api/ships/new");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["type"], "Ship");
    assert_eq!(body["flag"], "Panama");
}

#[tokio::test]
async fn test_delete_uses_uid_query() {
    let server = CannedServer::start(vec![(200, r#"{"message": "Report deleted"}"#.to_string())]);
    let client = client_for(&server);

    let ack = client.delete::<Report>(&EntityId::from("r1")).await.unwrap();
    assert_eq!(ack.message, "Report deleted");
    assert_eq!(server.requests()[0].method, "DELETE");
    assert_eq!(server.requests()[0].target, "/api/reports/delete?uid=r1");
}

#[tokio::test]
async fn test_unsupported_operations_send_nothing() {
    let server = CannedServer::start(vec![]);
    let client = client_for(&server);

    let err = client.search::<Certificate>("load").await.unwrap_err();
    assert!(matches!(err, DeskError::Unsupported { .. }));
    let err = client
        .delete::<Certificate>(&EntityId::from("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Unsupported { .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_filter_reports_sends_range() {
    let server = CannedServer::start(vec![(
        200,
        r#"{"reports": [{"id": "r1", "name": "Ocean Star", "price": "1,500.00", "date_create": "2024-01-10"}]}"#
            .to_string(),
    )]);
    let client = client_for(&server);
    let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

    let reports = client.filter_reports(&range).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].price, Some(1500.0));
    assert_eq!(
        server.requests()[0].target,
        "/api/reports/getFilterReport?startDate=2024-01-01&endDate=2024-01-31"
    );
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_failure() {
    let client = HttpClient::with_timeouts(
        Url::parse("http://127.0.0.1:9").unwrap(),
        Duration::from_secs(2),
        Duration::from_secs(1),
    )
    .unwrap();

    let err = client.list::<Ship>(1, 50).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(err.to_string().contains("could not reach the API"));
}

#[tokio::test]
async fn test_stalled_server_times_out_as_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            std::thread::sleep(Duration::from_secs(5));
            drop(stream);
        }
    });
    let client = HttpClient::with_timeouts(
        Url::parse(&format!("http://{addr}")).unwrap(),
        Duration::from_secs(1),
        Duration::from_secs(1),
    )
    .unwrap();

    let err = client.list::<Ship>(1, 50).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert_eq!(err.to_string(), "request timed out after 1s");
}

#[tokio::test]
async fn test_malformed_body_is_an_application_failure() {
    let server = CannedServer::start(vec![(200, "<html>oops</html>".to_string())]);
    let client = client_for(&server);

    let err = client.list::<Ship>(1, 50).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Application);
}
