mod common;

use board_block::tasks;
use common::*;
use lambda_http::http::{Method, StatusCode};
use serde_json::json;
use taskboard_atoms::tasks::{Task, MAX_ORDER};
use taskboard_shared::messages;

#[tokio::test]
async fn list_returns_sorted_tasks_and_resyncs_the_board() {
    let h = Harness::new();
    h.tasks.seed(stored_task("b1", "late", 1, 5));
    h.tasks.seed(stored_task("b1", "early", 1, 2));
    h.tasks.seed(stored_task("b1", "first", 0, 9));
    h.tasks.seed(stored_task("b2", "other", 0, 0));
    h.tasks.seed(Task {
        team_id: "someone-else".to_string(),
        ..stored_task("b1", "foreign", 0, 0)
    });

    // The client's view of b1 is out of date; b2 is untouched.
    let state = state_of(&[("b1", vec![("gone", 3, 0)]), ("b2", vec![("other", 0, 0)])]);
    let cookies = [h.member(), h.state(&state)];

    let event = request(Method::GET, "/tasks", &[("boardID", "b1")], &cookies, None);
    let resp = tasks::list(&h.app, &event).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let listed: Vec<Task> = serde_json::from_value(body_json(&resp)).unwrap();
    let ids: Vec<_> = listed.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "early", "late"]);

    assert_eq!(
        h.issued_state(&resp),
        state_of(&[
            ("b1", vec![("first", 0, 9), ("early", 1, 2), ("late", 1, 5)]),
            ("b2", vec![("other", 0, 0)]),
        ])
    );
}

#[tokio::test]
async fn list_requires_board_in_state() {
    let h = Harness::new();
    let cookies = [h.member(), h.state(&state_of(&[("b1", vec![])]))];

    let event = request(Method::GET, "/tasks", &[("boardID", "b2")], &cookies, None);
    let resp = tasks::list(&h.app, &event).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&resp), messages::INVALID_BOARD_ID);
}

#[tokio::test]
async fn reorder_moves_tasks_in_storage_and_state() {
    let h = Harness::new();
    h.tasks.seed(stored_task("b1", "t1", 0, 0));
    h.tasks.seed(stored_task("b1", "t2", 0, 1));
    h.tasks.seed(stored_task("b1", "t3", 1, 0));
    let state = state_of(&[("b1", vec![("t1", 0, 0), ("t2", 0, 1), ("t3", 1, 0)])]);
    let cookies = [h.member(), h.state(&state)];

    let body = json!({
        "board": "b1",
        "tasks": [
            {"id": "t1", "column": 1, "order": 1},
            {"id": "t2", "column": 0, "order": 0},
        ],
    });
    let resp = tasks::reorder(&h.app, &request(Method::PATCH, "/tasks", &[], &cookies, Some(body)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(
        h.issued_state(&resp),
        state_of(&[("b1", vec![("t2", 0, 0), ("t3", 1, 0), ("t1", 1, 1)])])
    );
    let moved = h.tasks.snapshot(TEAM, "t1").unwrap();
    assert_eq!((moved.column, moved.order), (1, 1));
}

#[tokio::test]
async fn reorder_validates_everything_before_writing() {
    let h = Harness::new();
    h.tasks.seed(stored_task("b1", "t1", 0, 0));
    h.tasks.seed(stored_task("b2", "t2", 0, 0));
    let state = state_of(&[("b1", vec![("t1", 0, 0)]), ("b2", vec![("t2", 0, 0)])]);
    let cookies = [h.member(), h.state(&state)];

    let cases = [
        (
            json!({"board": "b1", "tasks": [{"id": "t1", "column": 1, "order": 0}, {"id": "t2", "column": 0, "order": 1}]}),
            messages::INVALID_TASK_ID,
        ),
        (
            json!({"board": "b1", "tasks": [{"id": "t1", "column": 1, "order": 0}, {"id": "t1", "column": 2, "order": 0}]}),
            messages::INVALID_TASK_ID,
        ),
        (
            json!({"board": "b1", "tasks": [{"id": "t1", "column": 4, "order": 0}]}),
            messages::INVALID_COLUMN,
        ),
        (
            json!({"board": "b3", "tasks": []}),
            messages::INVALID_BOARD_ID,
        ),
    ];

    for (body, message) in cases {
        let resp = tasks::reorder(&h.app, &request(Method::PATCH, "/tasks", &[], &cookies, Some(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&resp), message);
    }
    assert_eq!(h.tasks.write_calls(), 0);
}

#[tokio::test]
async fn reorder_of_a_vanished_task_is_not_found() {
    let h = Harness::new();
    let state = state_of(&[("b1", vec![("t1", 0, 0)])]);
    let cookies = [h.member(), h.state(&state)];

    let body = json!({"board": "b1", "tasks": [{"id": "t1", "column": 2, "order": 0}]});
    let resp = tasks::reorder(&h.app, &request(Method::PATCH, "/tasks", &[], &cookies, Some(body)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie(&resp, taskboard_shared::auth::cookies::STATE_TOKEN).is_none());
}

#[tokio::test]
async fn reorder_rejects_out_of_range_orders() {
    let h = Harness::new();
    h.tasks.seed(stored_task("b1", "t1", 0, 0));
    let state = state_of(&[("b1", vec![("t1", 0, 0)])]);
    let cookies = [h.member(), h.state(&state)];

    for order in [i64::MAX, MAX_ORDER + 1, -1] {
        let body = json!({"board": "b1", "tasks": [{"id": "t1", "column": 0, "order": order}]});
        let resp = tasks::reorder(&h.app, &request(Method::PATCH, "/tasks", &[], &cookies, Some(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&resp), messages::INVALID_ORDER);
        assert!(set_cookie(&resp, taskboard_shared::auth::cookies::STATE_TOKEN).is_none());
    }
    assert_eq!(h.tasks.write_calls(), 0);
    assert_eq!(h.tasks.snapshot(TEAM, "t1").unwrap().order, 0);

    let body = json!({"board": "b1", "tasks": [{"id": "t1", "column": 0, "order": MAX_ORDER}]});
    let resp = tasks::reorder(&h.app, &request(Method::PATCH, "/tasks", &[], &cookies, Some(body)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.issued_state(&resp), state_of(&[("b1", vec![("t1", 0, MAX_ORDER)])]));
}
