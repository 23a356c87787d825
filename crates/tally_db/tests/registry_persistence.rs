use tally_db::TallyDb;
use tally_ids::PlayerId;
use tempfile::TempDir;

#[tokio::test]
async fn test_registry_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("registry.sqlite");
    let nova = PlayerId::parse("1379719411534925917").unwrap();

    let db = TallyDb::open(&path).await.unwrap();
    db.registry_set(&nova, "Nova").await.unwrap();
    db.close().await;

    let reopened = TallyDb::open_existing(&path).await.unwrap();
    assert_eq!(
        reopened.registry_get(&nova).await.unwrap().as_deref(),
        Some("Nova")
    );

    let records = reopened.registry_list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].player_id, nova);
    reopened.close().await;
}
