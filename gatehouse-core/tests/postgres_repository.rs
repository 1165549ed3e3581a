#![cfg(feature = "postgres-tests")]

use std::sync::Arc;

use anyhow::Result;
use gatehouse_core::error::IdentityError;
use gatehouse_core::identity::{
    AuthCrypto, CredentialStore, FailureCode, IdentityManager, IdentityRepository,
    PasswordPolicy, Role, User,
};
use gatehouse_core::infrastructure::PostgresIdentityRepository;
use sqlx::PgPool;

fn crypto() -> Arc<AuthCrypto> {
    Arc::new(AuthCrypto::new("pepper-for-tests", "token-key-for-tests").expect("crypto"))
}

#[sqlx::test(migrator = "gatehouse_core::MIGRATOR")]
async fn unique_constraints_map_to_conflicts(pool: PgPool) -> Result<()> {
    let repo = PostgresIdentityRepository::new(pool);

    repo.insert_user(&User::new("ann@example.com"), "hash").await?;
    let err = repo
        .insert_user(&User::new("ANN@example.com"), "hash")
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Conflict(_)));

    repo.insert_role(&Role::new("Admin")).await?;
    let err = repo.insert_role(&Role::new("admin")).await.unwrap_err();
    assert!(matches!(err, IdentityError::Conflict(_)));

    Ok(())
}

#[sqlx::test(migrator = "gatehouse_core::MIGRATOR")]
async fn memberships_are_inserted_once(pool: PgPool) -> Result<()> {
    let repo = PostgresIdentityRepository::new(pool);
    let user = User::new("ben@example.com");
    let admin = Role::new("Admin");
    let editor = Role::new("Editor");
    repo.insert_user(&user, "hash").await?;
    repo.insert_role(&editor).await?;
    repo.insert_role(&admin).await?;

    assert!(repo.insert_membership(user.id, editor.id).await?);
    assert!(repo.insert_membership(user.id, admin.id).await?);
    assert!(!repo.insert_membership(user.id, admin.id).await?);

    assert_eq!(
        repo.role_names_for_user(user.id).await?,
        vec!["Admin".to_string(), "Editor".to_string()]
    );
    Ok(())
}

#[sqlx::test(migrator = "gatehouse_core::MIGRATOR")]
async fn identity_manager_round_trips_through_postgres(pool: PgPool) -> Result<()> {
    let store = IdentityManager::new(
        Arc::new(PostgresIdentityRepository::new(pool)),
        crypto(),
        PasswordPolicy::default(),
    );

    let user = store
        .create_user("cleo@example.com", "Secret#1")
        .await?
        .into_result()
        .expect("user created");
    assert!(store.check_password(&user, "Secret#1").await?);
    assert_eq!(store.find_by_id(user.id).await?, Some(user.clone()));

    let dup = store.create_user("Cleo@Example.com", "Secret#1").await?;
    assert_eq!(dup.failures()[0].code, FailureCode::DuplicateEmail);

    assert!(store.create_role("Editor").await?.is_succeeded());
    assert!(store.add_to_role(&user, "editor").await?.is_succeeded());
    assert_eq!(store.roles_for(&user).await?, vec!["Editor".to_string()]);
    Ok(())
}
