//! HTTP-level tests for the board API, run against the in-memory store.

mod support;

use axum::http::{Method, StatusCode};
use kanban_core::UserId;
use serde_json::{json, Value};
use support::{column_orders, column_titles, test_app, TestApp};

async fn main_board(app: &TestApp, user: UserId) -> Value {
    let (status, board) = app.get("/api/v1/boards/main", user).await;
    assert_eq!(status, StatusCode::OK, "main board: {}", board);
    board
}

fn column_id(board: &Value, index: usize) -> String {
    board["columns"][index]["id"]
        .as_str()
        .expect("column id")
        .to_string()
}

async fn add_task(app: &TestApp, user: UserId, column: &str, title: &str) -> Value {
    let (status, task) = app
        .post(
            &format!("/api/v1/columns/{}/tasks", column),
            user,
            json!({ "title": title }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create task: {}", task);
    task
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = test_app();
    let (status, body) = app
        .send(Method::GET, "/api/v1/boards/main", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_main_board_is_seeded_once() {
    let app = test_app();
    let user = UserId::now_v7();

    let first = main_board(&app, user).await;
    assert_eq!(first["name"], "My Tasks");
    let names: Vec<&str> = first["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["To Do", "In Progress", "Done"]);

    let second = main_board(&app, user).await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(app.store.board_count().await, 1);
}

#[tokio::test]
async fn test_created_tasks_append_in_order() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let todo = column_id(&board, 0);

    for (i, title) in ["A", "B", "C"].iter().enumerate() {
        let task = add_task(&app, user, &todo, title).await;
        assert_eq!(task["order"], i as i64);
        assert_eq!(task["priority"], "medium");
    }

    let board = main_board(&app, user).await;
    assert_eq!(column_titles(&board, 0), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_move_within_column_reorders() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let todo = column_id(&board, 0);

    let a = add_task(&app, user, &todo, "A").await;
    for title in ["B", "C", "D"] {
        add_task(&app, user, &todo, title).await;
    }

    let (status, body) = app
        .post(
            &format!("/api/v1/tasks/{}/move", a["id"].as_str().expect("id")),
            user,
            json!({ "new_column_id": todo, "new_index": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let board = main_board(&app, user).await;
    assert_eq!(column_titles(&board, 0), vec!["B", "C", "A", "D"]);
    assert_eq!(column_orders(&board, 0), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_move_across_columns_closes_and_opens_gaps() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let todo = column_id(&board, 0);
    let doing = column_id(&board, 1);

    add_task(&app, user, &todo, "A").await;
    let b = add_task(&app, user, &todo, "B").await;
    add_task(&app, user, &todo, "C").await;
    add_task(&app, user, &doing, "X").await;

    let (status, _) = app
        .post(
            &format!("/api/v1/tasks/{}/move", b["id"].as_str().expect("id")),
            user,
            json!({ "new_column_id": doing, "new_index": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let board = main_board(&app, user).await;
    assert_eq!(column_titles(&board, 0), vec!["A", "C"]);
    assert_eq!(column_orders(&board, 0), vec![0, 1]);
    assert_eq!(column_titles(&board, 1), vec!["B", "X"]);
    assert_eq!(column_orders(&board, 1), vec![0, 1]);
}

#[tokio::test]
async fn test_move_into_foreign_column_is_forbidden() {
    let app = test_app();
    let alice = UserId::now_v7();
    let bob = UserId::now_v7();

    let alice_board = main_board(&app, alice).await;
    let bob_board = main_board(&app, bob).await;
    let task = add_task(&app, alice, &column_id(&alice_board, 0), "Mine").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/tasks/{}/move", task["id"].as_str().expect("id")),
            alice,
            json!({ "new_column_id": column_id(&bob_board, 0), "new_index": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let bob_board = main_board(&app, bob).await;
    assert!(column_titles(&bob_board, 0).is_empty());
}

#[tokio::test]
async fn test_foreign_task_is_not_found() {
    let app = test_app();
    let alice = UserId::now_v7();
    let bob = UserId::now_v7();

    let board = main_board(&app, alice).await;
    let task = add_task(&app, alice, &column_id(&board, 0), "Private").await;
    let uri = format!("/api/v1/tasks/{}", task["id"].as_str().expect("id"));

    let (status, body) = app.get(&uri, bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TASK_NOT_FOUND");

    let (status, _) = app.get(&uri, alice).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_foreign_board_is_forbidden() {
    let app = test_app();
    let alice = UserId::now_v7();
    let board = main_board(&app, alice).await;

    let (status, _) = app
        .get(
            &format!("/api/v1/boards/{}", board["id"].as_str().expect("id")),
            UserId::now_v7(),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;

    let (status, body) = app
        .post(
            &format!("/api/v1/columns/{}/tasks", column_id(&board, 0)),
            user,
            json!({ "title": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");
    assert_eq!(app.store.task_count().await, 0);
}

#[tokio::test]
async fn test_negative_index_is_rejected() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let todo = column_id(&board, 0);
    let task = add_task(&app, user, &todo, "A").await;

    let (status, _) = app
        .post(
            &format!("/api/v1/tasks/{}/move", task["id"].as_str().expect("id")),
            user,
            json!({ "new_column_id": todo, "new_index": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_then_create_appends_after_gap() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let todo = column_id(&board, 0);

    add_task(&app, user, &todo, "A").await;
    let b = add_task(&app, user, &todo, "B").await;
    add_task(&app, user, &todo, "C").await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/tasks/{}", b["id"].as_str().expect("id")),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let d = add_task(&app, user, &todo, "D").await;
    assert_eq!(d["order"], 3);

    let (status, body) = app
        .post(&format!("/api/v1/columns/{}/compact", todo), user, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renumbered"], 2);

    let board = main_board(&app, user).await;
    assert_eq!(column_titles(&board, 0), vec!["A", "C", "D"]);
    assert_eq!(column_orders(&board, 0), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_patch_task_clears_nullable_fields() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let (status, task) = app
        .post(
            &format!("/api/v1/columns/{}/tasks", column_id(&board, 0)),
            user,
            json!({ "title": "Write docs", "label": "docs", "priority": "high" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/tasks/{}", task["id"].as_str().expect("id")),
            Some(user),
            Some(json!({ "label": null, "title": "Write more docs" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Write more docs");
    assert!(updated["label"].is_null());
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["order"], task["order"]);
}

#[tokio::test]
async fn test_list_my_tasks() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    add_task(&app, user, &column_id(&board, 0), "First").await;
    add_task(&app, user, &column_id(&board, 2), "Second").await;

    let (status, body) = app.get("/api/v1/tasks", user).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .filter_map(|t| t["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_move_column_reorders_board() {
    let app = test_app();
    let user = UserId::now_v7();
    let board = main_board(&app, user).await;
    let done = column_id(&board, 2);

    let (status, column) = app
        .post(
            &format!("/api/v1/columns/{}/move", done),
            user,
            json!({ "new_index": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(column["order"], 0);

    let board = main_board(&app, user).await;
    let names: Vec<&str> = board["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Done", "To Do", "In Progress"]);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["storage"]["backend"], "memory");
}

#[cfg(feature = "openapi")]
#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/tasks/{id}/move"].is_object());
}
