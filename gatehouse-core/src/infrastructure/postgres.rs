use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{IdentityError, Result},
    identity::{IdentityRepository, Role, User},
};

/// PostgreSQL-backed identity persistence.
#[derive(Clone, Debug)]
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn conflict_or_storage(err: sqlx::Error, what: &str) -> IdentityError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            IdentityError::Conflict(format!("{what} already exists"))
        }
        _ => err.into(),
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, normalized_email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(password_hash)
        .bind(user.created_at)
        .execute(self.pool())
        .await
        .map_err(|err| conflict_or_storage(err, "user"))?;

        Ok(())
    }

    async fn find_user_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, normalized_email, created_at
            FROM users
            WHERE normalized_email = $1
            "#,
        )
        .bind(normalized_email)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, normalized_email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;

        Ok(hash)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, normalized_email, created_at
            FROM users
            ORDER BY normalized_email
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(users)
    }

    async fn insert_role(&self, role: &Role) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, normalized_name, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.normalized_name)
        .bind(role.created_at)
        .execute(self.pool())
        .await
        .map_err(|err| conflict_or_storage(err, "role"))?;

        Ok(())
    }

    async fn find_role_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, normalized_name, created_at
            FROM roles
            WHERE normalized_name = $1
            "#,
        )
        .bind(normalized_name)
        .fetch_optional(self.pool())
        .await?;

        Ok(role)
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, normalized_name, created_at FROM roles ORDER BY normalized_name",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(roles)
    }

    async fn insert_membership(&self, user_id: Uuid, role_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn role_names_for_user(&self, user_id: Uuid) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            INNER JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.normalized_name
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(names)
    }
}
