#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use serde_json::{Value, json};
use sudoku_relay::gateway::Gateway;
use sudoku_relay::protocol::Reply;
use sudoku_relay::rooms::{PlayerId, RoomStore};
use tokio::sync::mpsc;
use uuid::Uuid;

use common::snapshot;

fn connect(gateway: &Gateway) -> (PlayerId, mpsc::UnboundedReceiver<String>) {
    let player = Uuid::new_v4();
    let (tx, rx) = mpsc::unbounded_channel();
    gateway.connect(player, tx);
    (player, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(text) = rx.try_recv() {
        frames.push(serde_json::from_str(&text).unwrap());
    }
    frames
}

async fn create(gateway: &Gateway, player: PlayerId, puzzle_index: i64) -> String {
    match gateway.create_room(player, None, snapshot(puzzle_index)).await {
        Reply::Created { room_code } => room_code,
        other => unreachable!("expected a room, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_reaches_other_members_only() {
    let gateway = Gateway::new(RoomStore::default());
    let (a, mut rx_a) = connect(&gateway);
    let (b, mut rx_b) = connect(&gateway);
    let (c, mut rx_c) = connect(&gateway);

    let (d, mut rx_d) = connect(&gateway);

    let shared = create(&gateway, a, 3).await;
    gateway.join_room(b, None, &shared).await;
    gateway.join_room(c, None, &shared).await;
    create(&gateway, d, 8).await;
    for rx in [&mut rx_a, &mut rx_b, &mut rx_c, &mut rx_d] {
        drain(rx);
    }

    let envelope = json!({ "type": "cell", "data": { "row": 0, "col": 0, "value": 7 } });
    gateway.game_update(a, &shared, envelope.clone()).await.unwrap();

    let relayed = vec![json!({ "type": "game-update", "payload": envelope })];
    assert!(drain(&mut rx_a).is_empty());
    assert_eq!(drain(&mut rx_b), relayed);
    assert_eq!(drain(&mut rx_c), relayed);
    // d sits in another room
    assert!(drain(&mut rx_d).is_empty());
}

#[tokio::test]
async fn test_late_joiner_receives_current_snapshot() {
    let gateway = Gateway::new(RoomStore::default());
    let (a, _rx_a) = connect(&gateway);
    let (b, mut rx_b) = connect(&gateway);

    let code = create(&gateway, a, 3).await;
    gateway
        .game_update(
            a,
            &code,
            json!({ "type": "cell", "data": { "row": 0, "col": 0, "value": 7 } }),
        )
        .await
        .unwrap();
    gateway
        .game_update(
            a,
            &code,
            json!({ "type": "settings", "data": { "autoClearNotes": false, "theme": "dark" } }),
        )
        .await
        .unwrap();

    let Reply::Joined { game_state } = gateway.join_room(b, Some(9), &code).await else {
        unreachable!("room should exist");
    };
    assert_eq!(game_state.board[0][0], 7);
    assert_eq!(game_state.current_puzzle_index, 3);
    assert!(!game_state.auto_clear_notes);

    let frames = drain(&mut rx_b);
    assert_eq!(frames[0]["type"], "ack");
    assert_eq!(frames[0]["requestId"], 9);
    let snapshot = &frames[0]["payload"]["gameState"];
    assert_eq!(snapshot["board"][0][0], 7);
    assert_eq!(snapshot["currentPuzzleIndex"], 3);
    assert_eq!(snapshot["theme"], "dark");
    assert_eq!(frames[1], json!({ "type": "player-count", "payload": 2 }));
}

#[tokio::test]
async fn test_new_game_resets_room() {
    let gateway = Gateway::new(RoomStore::default());
    let (a, _rx_a) = connect(&gateway);
    let (b, mut rx_b) = connect(&gateway);

    let code = create(&gateway, a, 3).await;
    gateway.join_room(b, None, &code).await;
    gateway
        .game_update(
            a,
            &code,
            json!({ "type": "markedCells", "data": { "markedCells": ["0-0"] } }),
        )
        .await
        .unwrap();
    drain(&mut rx_b);

    let mut board = vec![vec![0; 9]; 9];
    board[4][4] = 5;
    let mut fixed = vec![vec![false; 9]; 9];
    fixed[4][4] = true;
    let envelope = json!({
        "type": "new-game",
        "data": {
            "board": board,
            "initialBoard": board,
            "fixed": fixed,
            "currentPuzzleIndex": 41,
        }
    });
    gateway.game_update(a, &code, envelope.clone()).await.unwrap();

    assert_eq!(
        drain(&mut rx_b),
        vec![json!({ "type": "game-update", "payload": envelope })]
    );

    let Reply::Joined { game_state } = gateway.join_room(b, None, &code).await else {
        unreachable!("room should exist");
    };
    assert_eq!(game_state.current_puzzle_index, 41);
    assert_eq!(game_state.board[4][4], 5);
    assert!(game_state.fixed[4][4]);
    assert!(game_state.marked_cells.is_empty());
    assert!(game_state.undo_history.is_empty());
}

#[tokio::test]
async fn test_leave_room_updates_count() {
    let gateway = Gateway::new(RoomStore::default());
    let (a, mut rx_a) = connect(&gateway);
    let (b, mut rx_b) = connect(&gateway);

    let code = create(&gateway, a, 0).await;
    gateway.join_room(b, None, &code).await;
    drain(&mut rx_a);

    let reply = gateway.leave_room(b, Some(3), &code).await;
    assert_eq!(reply, Reply::Left);

    assert_eq!(
        drain(&mut rx_a),
        vec![json!({ "type": "player-count", "payload": 1 })]
    );
    let frames = drain(&mut rx_b);
    assert_eq!(frames.last().unwrap()["payload"], json!({ "success": true }));

    // b no longer hears the room
    gateway
        .game_update(
            a,
            &code,
            json!({ "type": "cell", "data": { "row": 1, "col": 1, "value": 2 } }),
        )
        .await
        .unwrap();
    assert!(drain(&mut rx_b).is_empty());
}

#[tokio::test]
async fn test_room_survives_until_reaped() {
    let gateway = Gateway::new(RoomStore::new(10, chrono::TimeDelta::zero()));
    let (a, _rx_a) = connect(&gateway);

    let code = create(&gateway, a, 0).await;
    gateway.disconnect(a).await;
    assert!(gateway.store().await.room_exists(&code));

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    assert_eq!(gateway.cleanup_empty_rooms().await, 1);
    assert!(!gateway.store().await.room_exists(&code));
}
