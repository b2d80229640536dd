use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CardMoveCmd, Engine, EngineError};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn workspace_with_boards(engine: &Engine, names: &[&str]) -> (String, Vec<String>) {
    let ws = engine.new_workspace("Acme", "alice").await.unwrap();
    let mut ids = Vec::new();
    for name in names {
        ids.push(engine.new_board(&ws, name, "alice").await.unwrap());
    }
    (ws, ids)
}

fn board_order(boards: &[engine::BoardWithCards]) -> Vec<(String, i32)> {
    boards
        .iter()
        .map(|b| (b.board.name.clone(), b.board.position))
        .collect()
}

#[tokio::test]
async fn new_boards_append_with_dense_positions() {
    let (engine, _db) = engine_with_db().await;
    let (ws, _) = workspace_with_boards(&engine, &["Todo", "Doing", "Done"]).await;

    let boards = engine.boards(&ws, "alice").await.unwrap();
    assert_eq!(
        board_order(&boards),
        vec![
            ("Todo".to_string(), 0),
            ("Doing".to_string(), 1),
            ("Done".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn reorder_boards_persists_dense_positions() {
    let (engine, _db) = engine_with_db().await;
    let (ws, _) = workspace_with_boards(&engine, &["Todo", "Doing", "Done"]).await;

    engine.reorder_boards(&ws, 0, 2, "alice").await.unwrap();
    let boards = engine.boards(&ws, "alice").await.unwrap();
    assert_eq!(
        board_order(&boards),
        vec![
            ("Doing".to_string(), 0),
            ("Done".to_string(), 1),
            ("Todo".to_string(), 2),
        ]
    );

    // Destination past the end clamps to the last slot.
    engine.reorder_boards(&ws, 0, 99, "alice").await.unwrap();
    let boards = engine.boards(&ws, "alice").await.unwrap();
    assert_eq!(boards.last().unwrap().board.name, "Doing");

    // A bad source index is an error, not a clamp.
    let err = engine.reorder_boards(&ws, 99, 0, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::IndexOutOfRange(_)));
}

#[tokio::test]
async fn deleting_a_board_closes_the_gap() {
    let (engine, _db) = engine_with_db().await;
    let (ws, ids) = workspace_with_boards(&engine, &["Todo", "Doing", "Done"]).await;

    engine.delete_board(&ids[1], "alice").await.unwrap();
    let boards = engine.boards(&ws, "alice").await.unwrap();
    assert_eq!(
        board_order(&boards),
        vec![("Todo".to_string(), 0), ("Done".to_string(), 1)]
    );
}

#[tokio::test]
async fn cards_reorder_within_a_board() {
    let (engine, _db) = engine_with_db().await;
    let (ws, ids) = workspace_with_boards(&engine, &["Todo"]).await;
    for title in ["a", "b", "c"] {
        engine.new_card(&ids[0], title, None, "alice").await.unwrap();
    }

    engine
        .move_card(CardMoveCmd {
            workspace_id: ws.clone(),
            source_board_id: ids[0].clone(),
            dest_board_id: ids[0].clone(),
            source_index: 2,
            dest_index: 0,
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();

    let boards = engine.boards(&ws, "alice").await.unwrap();
    let titles: Vec<_> = boards[0].cards.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "a", "b"]);
    let positions: Vec<_> = boards[0].cards.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn cards_move_across_boards_and_both_lists_stay_dense() {
    let (engine, _db) = engine_with_db().await;
    let (ws, ids) = workspace_with_boards(&engine, &["Todo", "Doing"]).await;
    for title in ["a", "b", "c"] {
        engine.new_card(&ids[0], title, None, "alice").await.unwrap();
    }
    engine.new_card(&ids[1], "x", None, "alice").await.unwrap();

    // Move "b" (index 1 of Todo) to the front of Doing.
    engine
        .move_card(CardMoveCmd {
            workspace_id: ws.clone(),
            source_board_id: ids[0].clone(),
            dest_board_id: ids[1].clone(),
            source_index: 1,
            dest_index: 0,
            user_id: "alice".to_string(),
        })
        .await
        .unwrap();

    let boards = engine.boards(&ws, "alice").await.unwrap();
    let todo: Vec<_> = boards[0]
        .cards
        .iter()
        .map(|c| (c.title.as_str(), c.position))
        .collect();
    let doing: Vec<_> = boards[1]
        .cards
        .iter()
        .map(|c| (c.title.as_str(), c.position))
        .collect();
    assert_eq!(todo, vec![("a", 0), ("c", 1)]);
    assert_eq!(doing, vec![("b", 0), ("x", 1)]);

    // The moved card now belongs to the destination board.
    assert!(boards[1].cards.iter().all(|c| c.board_id == ids[1]));
}

#[tokio::test]
async fn moving_across_workspaces_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (ws, ids) = workspace_with_boards(&engine, &["Todo"]).await;
    engine.new_card(&ids[0], "a", None, "alice").await.unwrap();

    let other_ws = engine.new_workspace("Beta", "alice").await.unwrap();
    let foreign = engine.new_board(&other_ws, "Elsewhere", "alice").await.unwrap();

    let err = engine
        .move_card(CardMoveCmd {
            workspace_id: ws,
            source_board_id: ids[0].clone(),
            dest_board_id: foreign.clone(),
            source_index: 0,
            dest_index: 0,
            user_id: "alice".to_string(),
        })
        .await
        .unwrap_err();
    // The rejection names the offending board.
    match err {
        EngineError::KeyNotFound(msg) => assert!(msg.contains(&foreign)),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn deleting_a_card_renumbers_the_survivors() {
    let (engine, _db) = engine_with_db().await;
    let (ws, ids) = workspace_with_boards(&engine, &["Todo"]).await;
    let mut card_ids = Vec::new();
    for title in ["a", "b", "c"] {
        card_ids.push(engine.new_card(&ids[0], title, None, "alice").await.unwrap());
    }

    engine.delete_card(&card_ids[0], "alice").await.unwrap();
    let boards = engine.boards(&ws, "alice").await.unwrap();
    let cards: Vec<_> = boards[0]
        .cards
        .iter()
        .map(|c| (c.title.as_str(), c.position))
        .collect();
    assert_eq!(cards, vec![("b", 0), ("c", 1)]);
}
