//! API integration tests
//!
//! Drive the router in-process against the in-memory store.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use inventrack_server::{api, repository::Repository, AppState};

const BASE_URL: &str = "/api/v1";

fn app() -> Router {
    api::create_router(AppState::new(Repository::in_memory()))
}

async fn send(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(format!("{}{}", BASE_URL, path))
        .header(CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

async fn create_resource(app: &Router, name: &str, kind: &str, serial: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/resources",
        Some(json!({
            "name": name,
            "type": kind,
            "serialNumber": serial,
            "inventoryLocation": "Room 101"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

async fn assign(app: &Router, resource_id: &str, user_id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/assignments",
        Some(json!({ "resourceId": resource_id, "userId": user_id })),
    )
    .await
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("No id in response").to_string()
}

const ALICE: &str = "6f1c4b1e-2f0a-4c59-9d1e-0c2b7a3e5d11";
const BOB: &str = "0b7e9a52-8d3c-4e1f-a6b2-5c9d8e7f6a40";

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_and_get_resource() {
    let app = app();
    let created = create_resource(&app, "Dell Laptop", "LAPTOP", "SN123456").await;

    assert_eq!(created["status"], "NOT_ASSIGNED");
    assert_eq!(created["type"], "LAPTOP");
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    let (status, fetched) = send(&app, Method::GET, &format!("/resources/{}", id_of(&created)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_resource_with_blank_name() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/resources",
        Some(json!({
            "name": " ",
            "type": "MOUSE",
            "serialNumber": "SN1",
            "inventoryLocation": "Room 101"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_create_resource_with_missing_name() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/resources",
        Some(json!({
            "type": "LAPTOP",
            "serialNumber": "SN1",
            "inventoryLocation": "Room 101"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 18);
}

#[tokio::test]
async fn test_create_resource_with_unknown_type() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/resources",
        Some(json!({
            "name": "Toaster",
            "type": "TOASTER",
            "serialNumber": "SN1",
            "inventoryLocation": "Kitchen"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_duplicate_serial_number() {
    let app = app();
    create_resource(&app, "Mouse", "MOUSE", "SN-DUP").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/resources",
        Some(json!({
            "name": "Other mouse",
            "type": "MOUSE",
            "serialNumber": "SN-DUP",
            "inventoryLocation": "Room 102"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_unknown_resource() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/resources/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");
}

#[tokio::test]
async fn test_update_and_delete_resource() {
    let app = app();
    let created = create_resource(&app, "HP Monitor", "MONITOR", "SN-M1").await;
    let path = format!("/resources/{}", id_of(&created));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &path,
        Some(json!({
            "name": "HP Monitor 27\"",
            "type": "MONITOR",
            "status": "DEPRECATED",
            "serialNumber": "SN-M1",
            "inventoryLocation": "Storage"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["status"], "DEPRECATED");
    assert_eq!(updated["inventoryLocation"], "Storage");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, _) = send(&app, Method::DELETE, &path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_resources() {
    let app = app();
    let dell = create_resource(&app, "Dell Laptop", "LAPTOP", "SN-A1").await;
    create_resource(&app, "HP Monitor", "MONITOR", "SN-B1").await;
    let apple = create_resource(&app, "Apple MacBook", "LAPTOP", "SN-C1").await;

    let (status, all) = send(&app, Method::POST, "/resources/search", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, by_name) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({ "name": "laptop" })),
    )
    .await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);
    assert_eq!(by_name[0]["id"], dell["id"]);

    let (_, laptops) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({
            "name": "a",
            "type": "LAPTOP",
            "sort": "name",
            "sortDirection": "ASCENDING"
        })),
    )
    .await;
    let ids: Vec<&Value> = laptops.as_array().unwrap().iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&apple["id"], &dell["id"]]);

    let (_, by_serial) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({ "serialNumber": "B1" })),
    )
    .await;
    assert_eq!(by_serial.as_array().unwrap().len(), 1);
    assert_eq!(by_serial[0]["name"], "HP Monitor");
}

#[tokio::test]
async fn test_search_resources_by_creation_range() {
    let app = app();
    create_resource(&app, "Chair", "CHAIR", "SN-CH").await;

    let (_, past) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({
            "startDate": "2000-01-01T00:00:00Z",
            "endDate": "2000-12-31T23:59:59Z"
        })),
    )
    .await;
    assert!(past.as_array().unwrap().is_empty());

    let (_, around_now) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({
            "startDate": "2000-01-01T00:00:00Z",
            "endDate": "2999-12-31T23:59:59Z"
        })),
    )
    .await;
    assert_eq!(around_now.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_resources_by_zoneless_range() {
    let app = app();
    create_resource(&app, "Desk", "DESK", "SN-D").await;

    let (status, past) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({
            "startDate": "2022-01-01T00:00:00",
            "endDate": "2022-12-31T23:59:59"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(past.as_array().unwrap().is_empty());

    let (status, current) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({
            "startDate": "2022-01-01T00:00:00",
            "endDate": "2999-12-31T23:59:59"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_resources_by_status() {
    let app = app();
    create_resource(&app, "Dell Laptop", "LAPTOP", "SN-A1").await;
    let monitor = create_resource(&app, "HP Monitor", "MONITOR", "SN-B1").await;
    create_resource(&app, "Apple MacBook", "LAPTOP", "SN-C1").await;
    let (status, _) = assign(&app, &id_of(&monitor), ALICE).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, assigned) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({ "status": "ASSIGNED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let assigned = assigned.as_array().unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0]["id"], monitor["id"]);

    let (_, free) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({ "status": "NOT_ASSIGNED" })),
    )
    .await;
    assert_eq!(free.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_unknown_sort_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/resources/search",
        Some(json!({ "sort": "price", "sortDirection": "DESCENDING" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_assign_and_return() {
    let app = app();
    let resource = create_resource(&app, "Dell Laptop", "LAPTOP", "SN-1").await;
    let resource_path = format!("/resources/{}", id_of(&resource));

    let (status, assignment) = assign(&app, &id_of(&resource), ALICE).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["status"], "NOT_RETURNED");
    assert_eq!(assignment["resourceId"], resource["id"]);
    assert_eq!(assignment["userId"], ALICE);
    assert!(assignment["returnDate"].is_null());

    let (_, held) = send(&app, Method::GET, &resource_path, None).await;
    assert_eq!(held["status"], "ASSIGNED");

    let (status, body) = assign(&app, &id_of(&resource), BOB).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ResourceNotAvailable");

    let return_path = format!("/assignments/{}/return", id_of(&assignment));
    let (status, returned) = send(&app, Method::POST, &return_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "RETURNED");
    assert!(returned["returnDate"].is_string());

    let (_, freed) = send(&app, Method::GET, &resource_path, None).await;
    assert_eq!(freed["status"], "NOT_ASSIGNED");

    let (status, body) = send(&app, Method::POST, &return_path, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyReturned");
}

#[tokio::test]
async fn test_assignment_status_from_caller_is_ignored() {
    let app = app();
    let resource = create_resource(&app, "Keyboard", "KEYBOARD", "SN-K").await;
    let (status, assignment) = send(
        &app,
        Method::POST,
        "/assignments",
        Some(json!({
            "resourceId": resource["id"],
            "userId": ALICE,
            "status": "RETURNED",
            "assignedDate": "2024-02-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["status"], "NOT_RETURNED");
    assert_eq!(assignment["assignedDate"], "2024-02-01");
}

#[tokio::test]
async fn test_assign_unknown_resource() {
    let app = app();
    let (status, _) = assign(&app, "00000000-0000-0000-0000-000000000000", ALICE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_assignments() {
    let app = app();
    let laptop = create_resource(&app, "Laptop", "LAPTOP", "SN-L").await;
    let phone = create_resource(&app, "Phone", "MOBILE", "SN-P").await;

    let (_, first) = assign(&app, &id_of(&laptop), ALICE).await;
    send(&app, Method::POST, &format!("/assignments/{}/return", id_of(&first)), None).await;
    assign(&app, &id_of(&laptop), BOB).await;
    assign(&app, &id_of(&phone), ALICE).await;

    let (status, all) = send(&app, Method::GET, "/assignments/search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, by_resource) = send(
        &app,
        Method::GET,
        &format!("/assignments/search?resourceId={}", id_of(&laptop)),
        None,
    )
    .await;
    assert_eq!(by_resource.as_array().unwrap().len(), 2);

    let (_, by_user) = send(&app, Method::GET, &format!("/assignments/search?userId={}", ALICE), None).await;
    assert_eq!(by_user.as_array().unwrap().len(), 2);

    let (_, by_both) = send(
        &app,
        Method::GET,
        &format!("/assignments/search?resourceId={}&userId={}", id_of(&laptop), BOB),
        None,
    )
    .await;
    let by_both = by_both.as_array().unwrap();
    assert_eq!(by_both.len(), 1);
    assert_eq!(by_both[0]["userId"], BOB);
    assert_eq!(by_both[0]["status"], "NOT_RETURNED");

    let (_, listed) = send(&app, Method::GET, "/assignments", None).await;
    assert_eq!(listed, all);
}

#[tokio::test]
async fn test_search_assignments_with_malformed_id() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/assignments/search?userId=alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_update_assignment() {
    let app = app();
    let resource = create_resource(&app, "Scanner", "SCANNER", "SN-S").await;
    let (_, assignment) = assign(&app, &id_of(&resource), ALICE).await;
    let path = format!("/assignments/{}", id_of(&assignment));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &path,
        Some(json!({
            "userId": BOB,
            "status": "NOT_RETURNED",
            "assignedDate": "2024-03-04",
            "returnDate": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["userId"], BOB);
    assert_eq!(updated["assignedDate"], "2024-03-04");

    let (_, fetched) = send(&app, Method::GET, &path, None).await;
    assert_eq!(fetched, updated);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/assignments/00000000-0000-0000-0000-000000000000",
        Some(json!({
            "userId": BOB,
            "status": "RETURNED",
            "assignedDate": "2024-03-04",
            "returnDate": "2024-03-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_assignment_and_resource() {
    let app = app();
    let resource = create_resource(&app, "Printer", "PRINTER", "SN-PR").await;
    let resource_path = format!("/resources/{}", id_of(&resource));
    let (_, assignment) = assign(&app, &id_of(&resource), ALICE).await;

    // Held resources cannot be deleted
    let (status, body) = send(&app, Method::DELETE, &resource_path, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ResourceInUse");

    let assignment_path = format!("/assignments/{}", id_of(&assignment));
    let (status, _) = send(&app, Method::DELETE, &assignment_path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &assignment_path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, freed) = send(&app, Method::GET, &resource_path, None).await;
    assert_eq!(freed["status"], "NOT_ASSIGNED");

    let (status, _) = send(&app, Method::DELETE, &resource_path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
