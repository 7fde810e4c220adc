use crate::auth::{self, AuthError, AuthState, LOGIN_TOKEN_TTL_MINUTES};
use crate::entities::*;
use sea_orm::*;
use std::sync::Arc;

pub mod api;

/// A registered user as exposed by the service layer. Never carries the password hash.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct User {
    id: i32,
    email: String,
    username: String,
    gender: String,
    goal: Vec<String>,
}

impl User {
    pub fn new(id: i32, email: String, username: String, gender: String, goal: Vec<String>) -> Self {
        Self {
            id,
            email,
            username,
            gender,
            goal,
        }
    }

    /// Returns the ID of the user.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the email address of the user.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    /// Returns the user's goals in the order they were registered.
    pub fn goal(&self) -> &[String] {
        &self.goal
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        let goal = serde_json::from_str(&model.goal).unwrap_or_else(|e| {
            tracing::warn!("User {} has an unreadable goal list: {}", model.id, e);
            Vec::new()
        });
        User::new(model.id, model.email, model.username, model.gender, goal)
    }
}

/// Everything needed to register a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub username: String,
    pub gender: String,
    pub goal: Vec<String>,
}

/// Error type for UserService operations.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// The email or username is already taken.
    #[error("A user with this email or username already exists")]
    Conflict,
    /// Unknown user or wrong password. The two cases are deliberately not told apart.
    #[error("Incorrect username or password")]
    InvalidCredentials,
    /// The goal list could not be encoded for storage.
    #[error("Goal list error: {0}")]
    Goal(#[from] serde_json::Error),
    /// Represents a failure in the credential subsystem.
    #[error("Credential error: {0}")]
    Auth(#[from] AuthError),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Shared state for the `/auth` routes.
#[derive(Clone)]
pub struct UserState {
    pub db: Arc<sea_orm::DatabaseConnection>,
    pub auth: Arc<AuthState>,
}

pub struct UserService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl UserService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> UserService<'_> {
        UserService { db }
    }

    /// Registers a new user, storing only the hash of the password.
    ///
    /// Uniqueness of email and username is left to the database; a violation
    /// comes back as [`UserServiceError::Conflict`].
    #[tracing::instrument(skip(self, new_user), fields(email = %new_user.email, username = %new_user.username))]
    pub async fn register(&self, new_user: NewUser) -> Result<User, UserServiceError> {
        let hashed_password = auth::hash_password(&new_user.password)?;
        let goal = serde_json::to_string(&new_user.goal)?;

        let active_model = user::ActiveModel {
            email: ActiveValue::Set(new_user.email),
            username: ActiveValue::Set(new_user.username),
            hashed_password: ActiveValue::Set(hashed_password),
            gender: ActiveValue::Set(new_user.gender),
            goal: ActiveValue::Set(goal),
            ..Default::default()
        };

        let created_model = active_model.insert(self.db).await.map_err(|err| {
            match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => UserServiceError::Conflict,
                _ => UserServiceError::Database(err),
            }
        })?;
        tracing::info!("Registered user {}", created_model.id);
        Ok(User::from(created_model))
    }

    /// Returns whether an account exists for `email`.
    #[tracing::instrument(skip(self))]
    pub async fn is_email_registered(&self, email: &str) -> Result<bool, UserServiceError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Checks an email/password pair.
    ///
    /// Returns `None` both for an unknown email and for a wrong password.
    #[tracing::instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let user_model = self.find_by_email(email).await?;
        let hashed_password = user_model.as_ref().map(|model| model.hashed_password.as_str());
        if !auth::verify_password_or_dummy(password, hashed_password) {
            return Ok(None);
        }
        Ok(user_model.map(User::from))
    }

    /// Authenticates by username and issues a signed access token.
    #[tracing::instrument(skip(self, password, jwt_secret))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        jwt_secret: &str,
    ) -> Result<String, UserServiceError> {
        let user_model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await?;

        let hashed_password = user_model.as_ref().map(|model| model.hashed_password.as_str());
        if !auth::verify_password_or_dummy(password, hashed_password) {
            return Err(UserServiceError::InvalidCredentials);
        }
        let user_model = user_model.ok_or(UserServiceError::InvalidCredentials)?;

        let token = auth::encode_jwt(
            &user_model.username,
            user_model.id,
            Some(chrono::Duration::minutes(LOGIN_TOKEN_TTL_MINUTES)),
            jwt_secret,
        )?;
        Ok(token)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, UserServiceError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?;
        Ok(model)
    }
}
