//! `AuthStore` contract tests against the real PostgreSQL implementation.
//!
//! These run against the database named by `TEST_DATABASE_URL` and are
//! ignored by default. Each test starts from a clean schema.

mod common;

use auth_core::models::{Provider, User};
use auth_core::services::{AuthStore, Database};
use chrono::{Duration, Utc};
use common::create_test_pool;

async fn test_store() -> Database {
    let pool = create_test_pool().await.expect("test pool");
    Database::new(pool)
}

fn local_user(name: &str, email: &str) -> User {
    User::new_local(name.to_string(), email.to_string(), "$argon2id$fake".to_string())
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn user_round_trips_through_both_lookups() {
    let store = test_store().await;
    let user = local_user("Alice", "alice@x.com");
    store.create_user(&user).await.unwrap();

    let by_email = store
        .find_user_by_email("alice@x.com")
        .await
        .unwrap()
        .unwrap();
    let by_id = store.find_user_by_id(user.user_id).await.unwrap().unwrap();

    assert_eq!(by_email.user_id, user.user_id);
    assert_eq!(by_id.email, "alice@x.com");
    assert_eq!(by_id.role, user.role);
    assert_eq!(by_id.provider, Provider::Local);
    assert!(by_id.is_first_login);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn duplicate_email_is_a_conflict() {
    let store = test_store().await;
    store
        .create_user(&local_user("Alice", "alice@x.com"))
        .await
        .unwrap();

    let err = store
        .create_user(&local_user("Other", "alice@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn update_password_persists_and_clears_first_login() {
    let store = test_store().await;
    let user = local_user("Alice", "alice@x.com");
    store.create_user(&user).await.unwrap();

    store
        .update_password(user.user_id, "$argon2id$new")
        .await
        .unwrap();

    let stored = store.find_user_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash.as_deref(), Some("$argon2id$new"));
    assert!(!stored.is_first_login);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn set_verified_persists() {
    let store = test_store().await;
    let user = local_user("Alice", "alice@x.com");
    store.create_user(&user).await.unwrap();

    store.set_verified(user.user_id).await.unwrap();

    let stored = store.find_user_by_id(user.user_id).await.unwrap().unwrap();
    assert!(stored.is_verified);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn link_round_trip_and_subject_uniqueness() {
    let store = test_store().await;
    let alice = local_user("Alice", "alice@x.com");
    let bob = local_user("Bob", "bob@x.com");
    store.create_user(&alice).await.unwrap();
    store.create_user(&bob).await.unwrap();

    store
        .create_link(alice.user_id, Provider::Google, "goog-1")
        .await
        .unwrap();

    let linked = store
        .find_linked_user(Provider::Google, "goog-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.user_id, alice.user_id);

    let err = store
        .create_link(bob.user_id, Provider::Google, "goog-1")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn adopt_or_create_creates_then_reuses_the_identity() {
    let store = test_store().await;

    let created = store
        .adopt_or_create_federated(Provider::Github, "gh-1", "Carol", "carol@x.com")
        .await
        .unwrap();
    assert_eq!(created.provider, Provider::Github);
    assert!(created.password_hash.is_none());
    assert!(created.is_verified);

    // A second provider with the same email adopts the same identity.
    let adopted = store
        .adopt_or_create_federated(Provider::Google, "goog-1", "Carol", "carol@x.com")
        .await
        .unwrap();
    assert_eq!(adopted.user_id, created.user_id);

    let via_google = store
        .find_linked_user(Provider::Google, "goog-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(via_google.user_id, created.user_id);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn adopt_or_create_adopts_a_local_account_by_email() {
    let store = test_store().await;
    let local = local_user("Alice", "alice@x.com");
    store.create_user(&local).await.unwrap();

    let adopted = store
        .adopt_or_create_federated(Provider::Google, "goog-1", "Alice G", "alice@x.com")
        .await
        .unwrap();

    assert_eq!(adopted.user_id, local.user_id);
    assert_eq!(adopted.provider, Provider::Local);
    assert!(adopted.password_hash.is_some());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn refresh_token_lifecycle() {
    let store = test_store().await;
    let user = local_user("Alice", "alice@x.com");
    store.create_user(&user).await.unwrap();

    let expires = Utc::now() + Duration::days(7);
    store
        .save_refresh_token(user.user_id, "tok-1", expires)
        .await
        .unwrap();

    let row = store.find_refresh_token("tok-1").await.unwrap().unwrap();
    assert_eq!(row.user_id, user.user_id);
    assert!(row.user_active);
    assert_eq!(row.role, user.role);
    assert!(!row.is_expired());

    store.delete_refresh_token("tok-1").await.unwrap();
    assert!(store.find_refresh_token("tok-1").await.unwrap().is_none());

    // Deleting an absent record stays a no-op.
    store.delete_refresh_token("tok-1").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn expired_record_is_still_returned() {
    let store = test_store().await;
    let user = local_user("Alice", "alice@x.com");
    store.create_user(&user).await.unwrap();

    store
        .save_refresh_token(user.user_id, "stale", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    let row = store.find_refresh_token("stale").await.unwrap().unwrap();
    assert!(row.is_expired());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn password_change_revokes_sessions_atomically() {
    let store = test_store().await;
    let alice = local_user("Alice", "alice@x.com");
    let bob = local_user("Bob", "bob@x.com");
    store.create_user(&alice).await.unwrap();
    store.create_user(&bob).await.unwrap();

    let expires = Utc::now() + Duration::days(7);
    store
        .save_refresh_token(alice.user_id, "a-1", expires)
        .await
        .unwrap();
    store
        .save_refresh_token(alice.user_id, "a-2", expires)
        .await
        .unwrap();
    store
        .save_refresh_token(bob.user_id, "b-1", expires)
        .await
        .unwrap();

    store
        .update_password_revoking_sessions(alice.user_id, "$argon2id$new")
        .await
        .unwrap();

    let stored = store.find_user_by_id(alice.user_id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash.as_deref(), Some("$argon2id$new"));
    assert!(store.find_refresh_token("a-1").await.unwrap().is_none());
    assert!(store.find_refresh_token("a-2").await.unwrap().is_none());
    assert!(store.find_refresh_token("b-1").await.unwrap().is_some());
}
