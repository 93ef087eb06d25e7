use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewUser, UserModel, UserPatch};
use crate::shared::AppError;

const EMAIL_TAKEN: &str = "Credentials taken";

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Inserts a user; a duplicate email is `AppError::Conflict`
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError>;
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    /// Applies a partial update; a duplicate email is `AppError::Conflict`
    async fn update_user(&self, user_id: i32, patch: &UserPatch) -> Result<UserModel, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Emulates the unique index on email so conflict handling behaves the same
/// as against PostgreSQL.
pub struct InMemoryUserRepository {
    state: Mutex<InMemoryUsers>,
}

struct InMemoryUsers {
    users: BTreeMap<i32, UserModel>,
    next_id: i32,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryUsers {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryUsers> {
        // A poisoned lock only means another test thread panicked mid-operation
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in memory");

        let mut state = self.lock();
        if state.users.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "Email already registered in memory");
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let now = Utc::now();
        let model = UserModel {
            id: state.next_id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        };
        state.next_id += 1;
        state.users.insert(model.id, model.clone());

        debug!(user_id = model.id, "User created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError> {
        debug!(user_id, "Fetching user from memory");
        Ok(self.lock().users.get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!(email = %email, "Fetching user by email from memory");
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, user_id: i32, patch: &UserPatch) -> Result<UserModel, AppError> {
        debug!(user_id, "Updating user in memory");

        let mut state = self.lock();
        if let Some(email) = &patch.email {
            if state
                .users
                .values()
                .any(|u| u.id != user_id && &u.email == email)
            {
                warn!(user_id, email = %email, "Email already registered to another user");
                return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }

        let user = state.users.get_mut(&user_id).ok_or_else(|| {
            warn!(user_id, "User not found for update in memory");
            AppError::NotFound("User not found".to_string())
        })?;
        user.apply(patch);

        debug!(user_id, "User updated successfully in memory");
        Ok(user.clone())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translates a unique violation into a conflict and anything else into a storage error
fn map_write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            warn!(constraint = ?db_err.constraint(), "Unique constraint violated");
            AppError::Conflict(EMAIL_TAKEN.to_string())
        }
        _ => {
            warn!(error = %e, "Failed to write user to database");
            AppError::DatabaseError(e.to_string())
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(email = %user.email, "Creating user in database");

        let model = sqlx::query_as::<_, UserModel>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash, first_name, last_name, created_at, updated_at",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        debug!(user_id = model.id, "User created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError> {
        debug!(user_id, "Fetching user from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, email, password_hash, first_name, last_name, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        debug!(email = %email, "Fetching user by email from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, email, password_hash, first_name, last_name, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, user_id: i32, patch: &UserPatch) -> Result<UserModel, AppError> {
        debug!(user_id, "Updating user in database");

        let updated = sqlx::query_as::<_, UserModel>(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 first_name = CASE WHEN $3 THEN $4 ELSE first_name END, \
                 last_name = CASE WHEN $5 THEN $6 ELSE last_name END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, email, password_hash, first_name, last_name, created_at, updated_at",
        )
        .bind(user_id)
        .bind(&patch.email)
        .bind(patch.first_name.is_some())
        .bind(patch.first_name.as_ref().and_then(|n| n.as_deref()))
        .bind(patch.last_name.is_some())
        .bind(patch.last_name.as_ref().and_then(|n| n.as_deref()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match updated {
            Some(user) => {
                debug!(user_id, "User updated successfully in database");
                Ok(user)
            }
            None => {
                warn!(user_id, "User not found for update");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }
}
