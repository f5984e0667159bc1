//! PostgreSQL credential store tests.
//!
//! Require a reachable database: `DATABASE_URL=... cargo test -- --ignored`.

use user_accounts::accounts::NewUser;
use user_accounts::auth::{AuthError, ConflictField};
use user_accounts::{Database, DatabaseConfig, Role, UserRepository};

async fn setup() -> (Database, user_accounts::PgUserRepository) {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/user_accounts_test".to_string());

    let db = Database::new(&DatabaseConfig::with_url(database_url))
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Migrations failed");

    let repo = db.users();
    (db, repo)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@pg.test"),
        password_hash: "$argon2id$v=19$placeholder".to_string(),
        role: Role::ManagerProject,
        is_approved: false,
    }
}

async fn cleanup(repo: &user_accounts::PgUserRepository, username: &str) {
    if let Ok(Some(user)) = repo.find_by_username(username).await {
        let _ = repo.delete(user.id).await;
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_lookup() {
    let (db, repo) = setup().await;
    cleanup(&repo, "pg_lookup").await;

    let user = repo.insert(new_user("pg_lookup")).await.unwrap();
    assert_eq!(user.role, Role::ManagerProject);

    let by_email = repo.find_by_email("pg_lookup@pg.test").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    let mut changed = user.clone();
    changed.is_approved = true;
    let saved = repo.update(&changed).await.unwrap();
    assert!(saved.is_approved);
    assert_eq!(saved.created_at, user.created_at);

    assert!(repo.delete(user.id).await.unwrap());
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    db.close().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_unique_violation_maps_to_conflict() {
    let (db, repo) = setup().await;
    cleanup(&repo, "pg_dupe").await;

    repo.insert(new_user("pg_dupe")).await.unwrap();
    let mut dupe = new_user("pg_dupe");
    dupe.email = "other@pg.test".to_string();

    assert!(matches!(
        repo.insert(dupe).await,
        Err(AuthError::Conflict(ConflictField::Username))
    ));

    cleanup(&repo, "pg_dupe").await;
    db.close().await;
}
