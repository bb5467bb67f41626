use super::*;

#[tokio::test]
async fn stores_and_reads_values() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.put_value("wallet.mnemonic", "abandon ability").await.expect("put");

    let value = storage.get_value("wallet.mnemonic").await.expect("get");
    assert_eq!(value.as_deref(), Some("abandon ability"));
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.get_value("absent").await.expect("get"), None);
}

#[tokio::test]
async fn put_overwrites_existing_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.put_value("fiat", "USD").await.expect("first put");
    storage.put_value("fiat", "EUR").await.expect("second put");

    assert_eq!(
        storage.get_value("fiat").await.expect("get").as_deref(),
        Some("EUR")
    );
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_kv")
        .fetch_one(storage.pool())
        .await
        .expect("count");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn delete_reports_whether_a_row_was_removed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.put_value("wallet.mnemonic", "words").await.expect("put");

    assert!(storage.delete_value("wallet.mnemonic").await.expect("delete"));
    assert!(!storage.delete_value("wallet.mnemonic").await.expect("second delete"));
    assert_eq!(storage.get_value("wallet.mnemonic").await.expect("get"), None);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("wallet.db");
    let database_url = sqlite_url_for_path(&db_path);

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[test]
fn memory_url_has_no_file_path() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/wallet.db?mode=rwc"),
        Some(PathBuf::from("./data/wallet.db"))
    );
}
