use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthService;
use crate::entities::user;
use crate::errors::ServiceError;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Account registration, login and profile management.
pub struct UserService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Creates an account and signs the new user in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<(String, user::Model), ServiceError> {
        request.validate()?;
        let email = Self::normalize_email(&request.email);

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(self.auth.hash_password(&request.password)?),
            name: Set(request.name.trim().to_string()),
            phone: Set(request.phone),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(self.db.as_ref()).await?;

        info!(user_id = %saved.id, "Registered new account");
        let token = self.auth.issue_token(&saved)?;
        Ok((token, saved))
    }

    /// Verifies credentials and issues a token. Unknown email and wrong
    /// password produce the same response.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<(String, user::Model), ServiceError> {
        request.validate()?;
        let email = Self::normalize_email(&request.email);

        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;

        let user = match user {
            Some(u) if self.auth.verify_password(&request.password, &u.password_hash) => u,
            _ => {
                return Err(ServiceError::Unauthorized(
                    "Invalid email or password".to_string(),
                ))
            }
        };

        info!(user_id = %user.id, "User logged in");
        let token = self.auth.issue_token(&user)?;
        Ok((token, user))
    }

    /// Partial profile update; absent fields are left untouched.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user: user::Model,
        request: UpdateProfileRequest,
    ) -> Result<user::Model, ServiceError> {
        let mut active: user::ActiveModel = user.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }
}
