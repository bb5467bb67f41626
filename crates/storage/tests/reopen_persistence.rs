use storage::{sqlite_url_for_path, Storage};

#[tokio::test]
async fn values_survive_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let database_url = sqlite_url_for_path(&temp_root.path().join("wallet.db"));

    {
        let storage = Storage::new(&database_url).await.expect("first open");
        storage
            .put_value("wallet.mnemonic", "legal winner thank year wave sausage")
            .await
            .expect("put");
        storage.pool().close().await;
    }

    let reopened = Storage::new(&database_url).await.expect("second open");
    let value = reopened.get_value("wallet.mnemonic").await.expect("get");
    assert_eq!(
        value.as_deref(),
        Some("legal winner thank year wave sausage")
    );
}
