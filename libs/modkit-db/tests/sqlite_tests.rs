use modkit_db::{sqlite, ConnectOpts, DbEngine, DbHandle};
use sea_orm::{ConnectionTrait, Statement};
use tempfile::TempDir;

async fn journal_mode(db: &DbHandle) -> String {
    let conn = db.sea();
    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "PRAGMA journal_mode".to_owned(),
        ))
        .await
        .unwrap()
        .expect("pragma row");
    row.try_get_by_index::<String>(0).unwrap().to_lowercase()
}

#[tokio::test]
async fn in_memory_database_keeps_state_across_statements() {
    let db = DbHandle::connect(sqlite::MEMORY_DSN, ConnectOpts::default())
        .await
        .unwrap();
    assert_eq!(db.engine(), DbEngine::Sqlite);

    let conn = db.sea();
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(
        backend,
        "CREATE TABLE t (id INTEGER PRIMARY KEY)".to_owned(),
    ))
    .await
    .unwrap();
    conn.execute(Statement::from_string(backend, "INSERT INTO t DEFAULT VALUES".to_owned()))
        .await
        .unwrap();

    // Same single connection, so the table is still there.
    let row = conn
        .query_one(Statement::from_string(backend, "SELECT COUNT(*) FROM t".to_owned()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get_by_index::<i64>(0).unwrap(), 1);
    assert_eq!(journal_mode(&db).await, "memory");
    db.close().await;
}

#[tokio::test]
async fn file_database_creates_dirs_and_uses_wal() {
    let tmp = TempDir::new().unwrap();
    let dsn = sqlite::absolutize_dsn("sqlite://nested/data/carelens.db", tmp.path()).unwrap();

    let db = DbHandle::connect(&dsn, ConnectOpts::default()).await.unwrap();
    assert!(tmp.path().join("nested/data/carelens.db").exists());
    assert_eq!(journal_mode(&db).await, "wal");
    assert!(db.sqlx_sqlite().is_some());
    db.close().await;
}

#[tokio::test]
async fn unknown_scheme_fails_before_connecting() {
    let err = DbHandle::connect("redis://localhost", ConnectOpts::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown DSN"));
}
