//! Authentication service: password hashing, JWT, registration, and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::{AuthPayload, LoginUser, RegisterUser, User, UserResponse};

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Lockout duration in minutes after exceeding max failed attempts.
const LOCKOUT_DURATION_MINUTES: i32 = 15;

/// JWT claims embedded in session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Issue a session token for the user.
pub fn generate_token(user: &User, jwt_secret: &str, expiry_secs: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id.to_string(),
        role: user.role.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    jsonwebtoken::decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Create an account from the registration form and sign the user in.
pub async fn register(
    pool: &PgPool,
    input: &RegisterUser,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<AuthPayload, AppError> {
    input.validate()?;
    let password_hash = hash_password(&input.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (full_name, email, password_hash, role, student_id, faculty, program, year_of_study)
        VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(input.full_name.trim())
    .bind(input.email.trim())
    .bind(&password_hash)
    .bind(input.role)
    .bind(&input.student_id)
    .bind(&input.faculty)
    .bind(&input.program)
    .bind(input.year_of_study)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("An account with this email already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    let token = generate_token(&user, jwt_secret, expiry_secs)?;
    Ok(AuthPayload {
        user: UserResponse::from(user),
        token,
    })
}

/// Authenticate by email and password.
///
/// Every failure reports `InvalidCredentials` so callers cannot tell unknown
/// accounts, locked accounts, and wrong passwords apart.
pub async fn login(
    pool: &PgPool,
    input: &LoginUser,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<AuthPayload, AppError> {
    input.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
        .bind(input.email.trim())
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            tracing::warn!(user_id = %user.id, "Login attempt on locked account");
            return Err(AppError::InvalidCredentials);
        }
    }

    if !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    if !verify_password(&input.password, &user.password_hash)? {
        record_failed_attempt(pool, &user).await?;
        return Err(AppError::InvalidCredentials);
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, last_login = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    let token = generate_token(&user, jwt_secret, expiry_secs)?;
    Ok(AuthPayload {
        user: UserResponse::from(user),
        token,
    })
}

/// Bump the failure counter in the database and lock the account once it
/// reaches the limit. The increment happens in SQL so concurrent failures
/// are all counted.
async fn record_failed_attempt(pool: &PgPool, user: &User) -> Result<(), AppError> {
    let (attempts, locked_until): (i32, Option<DateTime<Utc>>) = sqlx::query_as(
        r#"
        UPDATE users
        SET failed_login_attempts = failed_login_attempts + 1,
            locked_until = CASE
                WHEN failed_login_attempts + 1 >= $1 THEN NOW() + make_interval(mins => $2)
                ELSE locked_until
            END
        WHERE id = $3
        RETURNING failed_login_attempts, locked_until
        "#,
    )
    .bind(MAX_FAILED_ATTEMPTS)
    .bind(LOCKOUT_DURATION_MINUTES)
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    if attempts >= MAX_FAILED_ATTEMPTS {
        tracing::warn!(user_id = %user.id, attempts, ?locked_until, "Account locked after failed logins");
    }
    Ok(())
}

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Kofi Asante".to_string(),
            email: "kofi@cug.edu.gh".to_string(),
            password_hash: "hash".to_string(),
            role,
            student_id: None,
            faculty: None,
            program: None,
            year_of_study: None,
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_generation_and_validation() {
        let lecturer = user(UserRole::Lecturer);
        let secret = "test-secret-key-for-jwt";
        let token = generate_token(&lecturer, secret, 900).unwrap();

        let claims = validate_token(&token, secret).unwrap();
        assert_eq!(claims.sub, "kofi@cug.edu.gh");
        assert_eq!(claims.user_id, lecturer.id.to_string());
        assert_eq!(claims.role, "lecturer");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let token = generate_token(&user(UserRole::Admin), "one-secret", 900).unwrap();
        assert!(validate_token(&token, "another-secret").is_err());
    }

    #[test]
    fn invalid_token_rejected() {
        assert!(validate_token("garbage.token.here", "secret").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        // Well beyond the 60s leeway window
        let token = generate_token(&user(UserRole::Student), "test-secret", -3600).unwrap();
        assert!(validate_token(&token, "test-secret").is_err());
    }
}
