//! Integration tests for `PgStore` against a real database.
//!
//! Ignored by default; run with `DATABASE_URL` set and `--ignored`.

use assert_matches::assert_matches;
use campus_core::error::StoreError;
use campus_core::rows::{
    CommentEdit, EventQuery, NewComment, NewEvent, NewGroup, Role, VisibilityTier,
};
use campus_core::store::{RowSource, RowWriter};
use campus_db::PgStore;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_university(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO universities (name) VALUES ($1) RETURNING university_id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_user(pool: &PgPool, email: &str, university_id: i64, role: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (user_id, name, email, university_id, role) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(email)
    .bind(email)
    .bind(university_id)
    .bind(role)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn seed_rso(pool: &PgPool, name: &str, university_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO rsos (name, university_id, is_active) VALUES ($1, $2, true) RETURNING rso_id",
    )
    .bind(name)
    .bind(university_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_event(
    pool: &PgPool,
    name: &str,
    created_by: Uuid,
    visibility: &str,
    rso_id: Option<i64>,
    approved: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO events (name, event_datetime, created_by, visibility, rso_id, is_approved) \
         VALUES ($1, now() + interval '1 day', $2, $3, $4, $5) RETURNING event_id",
    )
    .bind(name)
    .bind(created_by)
    .bind(visibility)
    .bind(rso_id)
    .bind(approved)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn events_map_columns_and_filter_unapproved(pool: PgPool) {
    let uni = seed_university(&pool, "State University").await;
    let admin = seed_user(&pool, "admin@state.edu", uni, "admin").await;
    let chess = seed_rso(&pool, "Chess Club", uni).await;
    let approved = seed_event(&pool, "Chess Night", admin, "rso", Some(chess), true).await;
    seed_event(&pool, "Draft", admin, "public", None, false).await;

    let store = PgStore::new(pool);
    let events = store.fetch_events(&EventQuery::default()).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, approved);
    assert_eq!(events[0].title, "Chess Night");
    assert_eq!(events[0].visibility, VisibilityTier::Group);
    assert_eq!(events[0].group_id, Some(chess));
    assert_eq!(events[0].created_by, admin);

    let all = store
        .fetch_events(&EventQuery {
            approved_only: false,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn batched_lookups_skip_missing_ids(pool: PgPool) {
    let uni = seed_university(&pool, "State University").await;
    let alex = seed_user(&pool, "alex_j@state.edu", uni, "student").await;
    let chess = seed_rso(&pool, "Chess Club", uni).await;

    let store = PgStore::new(pool);

    let users = store.fetch_users(&[alex, Uuid::new_v4()]).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::Student);
    assert_eq!(users[0].organization_id, Some(uni));

    let groups = store.fetch_groups(&[chess, 9_999]).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Chess Club");

    let orgs = store.fetch_organizations(&[uni]).await.unwrap();
    assert_eq!(orgs[0].name, "State University");
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn comment_writes_are_scoped_to_author(pool: PgPool) {
    let uni = seed_university(&pool, "State University").await;
    let alex = seed_user(&pool, "alex_j@state.edu", uni, "student").await;
    let sam = seed_user(&pool, "sam@state.edu", uni, "student").await;
    let event = seed_event(&pool, "Career Fair", sam, "public", None, true).await;

    let store = PgStore::new(pool);
    let id = store
        .insert_comment(&NewComment {
            event_id: event,
            author_id: alex,
            text: "See you there".into(),
            rating: Some(4),
        })
        .await
        .unwrap();

    let edit = |author_id| CommentEdit {
        comment_id: id,
        author_id,
        text: "Running late".into(),
    };
    assert!(!store.update_comment(&edit(sam)).await.unwrap());
    assert!(store.update_comment(&edit(alex)).await.unwrap());

    let comments = store.fetch_comments(&[event]).await.unwrap();
    assert_eq!(comments[0].text, "Running late");
    assert_eq!(comments[0].rating, Some(4));

    assert!(!store.delete_comment(id, sam).await.unwrap());
    assert!(store.delete_comment(id, alex).await.unwrap());
    assert!(store.fetch_comments(&[event]).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn out_of_range_rating_is_rejected(pool: PgPool) {
    let uni = seed_university(&pool, "State University").await;
    let alex = seed_user(&pool, "alex_j@state.edu", uni, "student").await;
    let event = seed_event(&pool, "Career Fair", alex, "public", None, true).await;

    let store = PgStore::new(pool);
    let err = store
        .insert_comment(&NewComment {
            event_id: event,
            author_id: alex,
            text: "Ten stars".into(),
            rating: Some(10),
        })
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Rejected(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn membership_insert_is_idempotent(pool: PgPool) {
    let uni = seed_university(&pool, "State University").await;
    let alex = seed_user(&pool, "alex_j@state.edu", uni, "student").await;
    let chess = seed_rso(&pool, "Chess Club", uni).await;

    let store = PgStore::new(pool);
    assert!(store.insert_membership(alex, chess).await.unwrap());
    assert!(!store.insert_membership(alex, chess).await.unwrap());
    assert_eq!(store.fetch_memberships(alex).await.unwrap().len(), 1);

    assert!(store.delete_membership(alex, chess).await.unwrap());
    assert!(!store.delete_membership(alex, chess).await.unwrap());
    assert!(store.fetch_memberships(alex).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn created_event_and_rso_round_trip_through_reads(pool: PgPool) {
    let uni = seed_university(&pool, "State University").await;
    let admin = seed_user(&pool, "admin@state.edu", uni, "super_admin").await;
    let location: i64 = sqlx::query_scalar(
        "INSERT INTO locations (name) VALUES ('Student Union') RETURNING location_id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let category: i64 = sqlx::query_scalar(
        "INSERT INTO event_categories (category_name) VALUES ('tech') RETURNING category_id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let store = PgStore::new(pool);
    let rso = store
        .insert_group(&NewGroup {
            name: "Film Society".into(),
            organization_id: uni,
            admin_id: admin,
            is_active: true,
        })
        .await
        .unwrap();
    let groups = store.fetch_groups(&[rso]).await.unwrap();
    assert_eq!(groups[0].admin_id, Some(admin));
    assert!(groups[0].is_active);

    let event = store
        .insert_event(&NewEvent {
            created_by: admin,
            title: "Screening Night".into(),
            description: "Classic films".into(),
            date: chrono::Utc::now() + chrono::Duration::days(3),
            visibility: VisibilityTier::Group,
            group_id: rso,
            category_id: category,
            location_id: location,
            contact_phone: "555-0100".into(),
            contact_email: "film@state.edu".into(),
            is_approved: true,
        })
        .await
        .unwrap();

    let events = store.fetch_events(&EventQuery::default()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, event);
    assert_eq!(events[0].visibility, VisibilityTier::Group);
    assert_eq!(events[0].location_id, Some(location));
    assert_eq!(events[0].contact_email.as_deref(), Some("film@state.edu"));
}
