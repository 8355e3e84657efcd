use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::auth_dto::{LoginPayload, RegisterPayload, RegisteredUser, TokenResponse};
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::Claims;
use crate::models::employee_profile::EmployeeProfile;
use crate::models::user::{User, ROLE_ADMIN, ROLE_EMPLOYEE};
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

/// Signs an HS256 token for `user_id` valid for the configured TTL.
pub fn issue_token(user_id: Uuid, role: &str, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>)> {
    let config = get_config();
    let expires_at = now + Duration::hours(config.token_ttl_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expires_at.timestamp().max(0) as usize,
        role: Some(role.to_string()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an employee user and its profile together.
    pub async fn register(&self, payload: RegisterPayload) -> Result<RegisteredUser> {
        let password_hash = hash_password(&payload.password)?;
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(payload.username.trim())
        .bind(&password_hash)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(ROLE_EMPLOYEE)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_as_conflict(e, "Username is already taken"))?;

        let profile = sqlx::query_as::<_, EmployeeProfile>(
            r#"
            INSERT INTO employee_profiles (user_id, employee_id, department)
            VALUES ($1, $2, $3)
            RETURNING *
            "#
        )
        .bind(user.id)
        .bind(payload.employee_id.trim())
        .bind(&payload.department)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_as_conflict(e, "Employee ID is already registered"))?;

        tx.commit().await?;
        tracing::info!(user_id = %user.id, employee_id = %profile.employee_id, "Employee registered");

        Ok(RegisteredUser {
            user_id: user.id,
            profile_id: profile.id,
            username: user.username,
            employee_id: profile.employee_id,
            department: profile.department,
        })
    }

    pub async fn login(&self, payload: LoginPayload, now: DateTime<Utc>) -> Result<TokenResponse> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE username = $1"#)
            .bind(payload.username.trim())
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user.filter(|u| u.is_active) else {
            return Err(Error::Unauthorized("Invalid username or password".to_string()));
        };
        if !verify_password(&payload.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login rejected, wrong password");
            return Err(Error::Unauthorized("Invalid username or password".to_string()));
        }

        let role = if user.is_admin() { ROLE_ADMIN } else { ROLE_EMPLOYEE };
        let (access_token, expires_at) = issue_token(user.id, role, now)?;
        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
            role: role.to_string(),
        })
    }

    /// The employee profile behind an authenticated user.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<EmployeeProfile> {
        sqlx::query_as::<_, EmployeeProfile>(r#"SELECT * FROM employee_profiles WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::MissingProfile { user_id })
    }
}

fn duplicate_as_conflict(err: sqlx::Error, message: &str) -> Error {
    if is_unique_violation(&err) {
        Error::Conflict(message.to_string())
    } else {
        err.into()
    }
}
