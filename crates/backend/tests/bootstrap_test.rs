//! Bootstrap against a real database file: the schema applies cleanly to an
//! empty file, re-applies without complaint and the data survives reopening.

mod common;

use backend::domain::return_request::service;
use backend::shared::data::{db, schema};
use common::{seed_sale, submit_request};

#[tokio::test]
async fn test_file_backed_bootstrap_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("returns.db");
    let path_str = path.to_string_lossy().to_string();

    let conn = db::connect(&path_str).await.unwrap();
    schema::apply(&conn).await.unwrap();
    // повторный прогон DDL безвреден
    schema::apply(&conn).await.unwrap();

    let seeded = seed_sale(&conn, 1, 1, 1500, 5, 5).await;
    let request = submit_request(&conn, &seeded, 1).await;
    drop(conn);

    assert!(path.exists());

    let conn = db::connect(&path_str).await.unwrap();
    let detail = service::get_detail(&conn, request.id).await.unwrap();
    assert_eq!(detail.request.code, request.code);
    assert_eq!(detail.items.len(), 1);
}
