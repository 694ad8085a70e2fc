use dao_backend::config::DatabaseSettings;
use dao_backend::dao::{Criteria, Dao};
use dao_backend::db::Database;
use dao_backend::db::schema::create_tables;
use dao_backend::error::{DbError, DbResultExt};
use dao_backend::models::{Interest, NewTestModel, TestModel, registry};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::NamedTempFile;
use uuid::Uuid;

async fn setup() -> (NamedTempFile, Arc<Database>) {
    let temp_file = NamedTempFile::new().unwrap();
    let url = format!("sqlite:{}?mode=rwc", temp_file.path().display());
    let settings = DatabaseSettings::parse(&url).unwrap();
    let db = Arc::new(Database::connect(&settings).await.unwrap());
    create_tables(&db, registry()).await.unwrap();
    (temp_file, db)
}

fn by_id(id: Uuid) -> Criteria {
    Criteria::new().eq("test_id", id.to_string())
}

async fn create(dao: &Dao<TestModel>, info: &str) -> TestModel {
    dao.create(&NewTestModel {
        info: info.to_string(),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_created_record_is_found_by_its_key() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let created = create(&dao, "hello").await;
    assert_eq!(created.info, "hello");
    assert!(!created.test_id.is_nil());

    let found = dao.find_one_or_none(&by_id(created.test_id)).await.unwrap();
    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn test_create_keeps_supplied_identifier() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let id = Uuid::new_v4();
    let created = dao
        .create(&json!({"test_id": id.to_string(), "info": "fixed"}))
        .await
        .unwrap();
    assert_eq!(created.test_id, id);
}

#[tokio::test]
async fn test_zero_matches_is_empty_not_error() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    assert_eq!(dao.find_one_or_none(&by_id(Uuid::new_v4())).await.unwrap(), None);
    assert!(
        dao.find_all(&Criteria::new().eq("info", "nothing"))
            .await
            .unwrap()
            .is_empty()
    );
    assert!(dao.find_all(&Criteria::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_all_filters_by_equality() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    create(&dao, "a").await;
    create(&dao, "a").await;
    create(&dao, "b").await;

    let matching = dao.find_all(&Criteria::new().eq("info", "a")).await.unwrap();
    assert_eq!(matching.len(), 2);
    assert!(matching.iter().all(|m| m.info == "a"));
    assert_eq!(dao.find_all(&Criteria::all()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_find_one_with_several_matches_is_an_error() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    create(&dao, "dup").await;
    create(&dao, "dup").await;

    let err = dao
        .find_one_or_none(&Criteria::new().eq("info", "dup"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::MultipleRows { .. }));
}

#[tokio::test]
async fn test_unknown_filter_field_is_a_schema_error() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let err = dao
        .find_all(&Criteria::new().eq("no_such_field", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Schema { .. }));
}

#[tokio::test]
async fn test_delete_by_id() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    assert!(
        !dao.delete_by_id("test_id", Uuid::new_v4().to_string())
            .await
            .unwrap()
    );

    let created = create(&dao, "doomed").await;
    assert!(
        dao.delete_by_id("test_id", created.test_id.to_string())
            .await
            .unwrap()
    );
    assert_eq!(dao.find_one_or_none(&by_id(created.test_id)).await.unwrap(), None);
}

#[tokio::test]
async fn test_update_by_id_returns_post_update_record() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let created = create(&dao, "before").await;
    let updated = dao
        .update_by_id("test_id", created.test_id.to_string(), &json!({"info": "after"}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.test_id, created.test_id);
    assert_eq!(updated.info, "after");

    let found = dao.find_one_or_none(&by_id(created.test_id)).await.unwrap();
    assert_eq!(found, Some(updated));
}

#[tokio::test]
async fn test_update_missing_record_is_none() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let updated = dao
        .update_by_id("test_id", Uuid::new_v4().to_string(), &json!({"info": "x"}))
        .await
        .unwrap();
    assert_eq!(updated, None);
}

#[tokio::test]
async fn test_empty_patch_is_rejected() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let created = create(&dao, "keep").await;
    let err = dao
        .update_by_id("test_id", created.test_id.to_string(), &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_pages_are_disjoint_and_cover_the_larger_page() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    for i in 0..7 {
        create(&dao, &format!("item {i}")).await;
    }

    let ids = |page: Vec<TestModel>| page.into_iter().map(|m| m.test_id).collect::<Vec<_>>();

    let first = ids(dao.get_paginated(0, 3, &Criteria::all()).await.unwrap());
    let second = ids(dao.get_paginated(3, 3, &Criteria::all()).await.unwrap());
    let both = ids(dao.get_paginated(0, 6, &Criteria::all()).await.unwrap());

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    let first_set: HashSet<_> = first.iter().collect();
    assert!(second.iter().all(|id| !first_set.contains(id)));

    let mut union = first.clone();
    union.extend(second);
    assert_eq!(union, both);

    let tail = dao.get_paginated(6, 3, &Criteria::all()).await.unwrap();
    assert_eq!(tail.len(), 1);
    assert!(dao.get_paginated(7, 3, &Criteria::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_page_limit_is_invalid() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let err = dao.get_paginated(0, 0, &Criteria::all()).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_hello_lifecycle() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db);

    let created = create(&dao, "hello").await;
    let listed = dao.find_all(&Criteria::all()).await.unwrap();
    assert!(listed.contains(&created));

    assert!(
        dao.delete_by_id("test_id", created.test_id.to_string())
            .await
            .unwrap()
    );
    let listed = dao.find_all(&Criteria::all()).await.unwrap();
    assert!(!listed.contains(&created));
}

#[tokio::test]
async fn test_closed_pool_is_retried_then_reported() {
    let (_file, db) = setup().await;
    let dao = Dao::<TestModel>::new(db.clone());
    db.close().await;

    let err = dao.find_all(&Criteria::all()).await.unwrap_err();
    assert!(err.is_transient());

    // Legacy empty-on-failure behaviour
    assert!(dao.find_all(&Criteria::all()).await.suppress().is_empty());
    assert!(
        !dao.delete_by_id("test_id", Uuid::new_v4().to_string())
            .await
            .suppress()
    );
}

#[tokio::test]
async fn test_multilanguage_fields() {
    let (_file, db) = setup().await;
    let dao = Dao::<Interest>::new(db);

    let music = dao
        .create(&json!({
            "interest_name": {"en": "Music", "ru": "Музыка"},
            "interest_icon_url": "https://cdn.example.com/music.svg"
        }))
        .await
        .unwrap();
    let chess = dao
        .create(&json!({"interest_name": {"en": "Chess"}}))
        .await
        .unwrap();
    assert_ne!(music.interest_id, chess.interest_id);
    assert_eq!(chess.interest_icon_url, None);

    let ru = dao.get_multilanguage_field("ru").await.unwrap();
    assert_eq!(ru.len(), 2);
    let name_of = |rows: &[dao_backend::models::Fields], id: i64| {
        rows.iter()
            .find(|r| r["interest_id"] == json!(id))
            .map(|r| r["interest_name"].clone())
            .unwrap()
    };
    assert_eq!(name_of(&ru, music.interest_id), json!("Музыка"));
    assert_eq!(name_of(&ru, chess.interest_id), json!("Chess"));

    let de = dao.get_multilanguage_field("de").await.unwrap();
    assert_eq!(name_of(&de, music.interest_id), json!("Music"));
}
