use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{ChangePasswordInput, LoginInput, RegisterInput, User, UserWithToken},
    repository::UserRepository,
    telemetry::USERS_REGISTERED,
};

const PASSWORD_MIN_LEN: usize = 8;
const RESERVED_USERNAMES: &[&str] = &["me", "admin", "subscriptions"];

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_expires_in_hours: i64,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, config: &Config) -> Self {
        Self {
            user_repo,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expires_in_hours: config.jwt_expires_in_hours,
        }
    }

    #[instrument(name = "auth.register", skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserWithToken> {
        validate_registration(&input)?;

        if self.user_repo.exists_by_email(&input.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self.user_repo.exists_by_username(&input.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = self.hash_password(&input.password)?;

        let user = self
            .user_repo
            .create(
                &input.email,
                &input.username,
                &password_hash,
                &input.first_name,
                &input.last_name,
            )
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "User already exists"))?;

        let token = self.generate_token(user.id)?;

        USERS_REGISTERED.add(1, &[]);

        tracing::info!(user_id = user.id, "User registered");

        Ok(UserWithToken::from_user(&user, token))
    }

    #[instrument(name = "auth.login", skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> AppResult<UserWithToken> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.verify_password(&input.password, &user.password_hash)?;

        let token = self.generate_token(user.id)?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(UserWithToken::from_user(&user, token))
    }

    #[instrument(name = "auth.get_user", skip(self))]
    pub async fn get_user(&self, user_id: i32) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))
    }

    #[instrument(name = "auth.change_password", skip(self, input))]
    pub async fn change_password(&self, user_id: i32, input: ChangePasswordInput) -> AppResult<()> {
        let user = self.get_user(user_id).await?;

        self.verify_password(&input.current_password, &user.password_hash)
            .map_err(|_| AppError::Validation("Current password is incorrect".to_string()))?;

        if input.new_password.len() < PASSWORD_MIN_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_LEN
            )));
        }

        let password_hash = self.hash_password(&input.new_password)?;
        self.user_repo.update_password(user_id, &password_hash).await?;

        tracing::info!(user_id, "Password changed");

        Ok(())
    }

    #[instrument(name = "auth.set_avatar", skip(self, avatar))]
    pub async fn set_avatar(&self, user_id: i32, avatar: &str) -> AppResult<User> {
        if avatar.is_empty() {
            return Err(AppError::Validation("Avatar must not be empty".to_string()));
        }

        Ok(self.user_repo.update_avatar(user_id, avatar).await?)
    }

    #[instrument(name = "auth.delete_avatar", skip(self))]
    pub async fn delete_avatar(&self, user_id: i32) -> AppResult<()> {
        self.get_user(user_id).await?;
        self.user_repo.update_avatar(user_id, "").await?;
        Ok(())
    }

    #[instrument(name = "auth.validate_token", skip(self, token))]
    pub fn validate_token(&self, token: &str) -> AppResult<i32> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims.sub)
    }

    fn generate_token(&self, user_id: i32) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::hours(self.jwt_expires_in_hours);

        let claims = Claims {
            sub: user_id,
            exp: exp.unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<()> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid hash: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::InvalidCredentials)
    }
}

fn validate_registration(input: &RegisterInput) -> AppResult<()> {
    if input.email.trim().is_empty() || !input.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    validate_username(&input.username)?;
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "First and last name are required".to_string(),
        ));
    }
    if input.password.len() < PASSWORD_MIN_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(AppError::Validation(format!(
            "Username '{}' is reserved",
            username
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits and .@+-_ characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_claims(user_id: i32, hours_offset: i64) -> Claims {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::hours(hours_offset);
        Claims {
            sub: user_id,
            exp: exp.unix_timestamp(),
            iat: now.unix_timestamp(),
        }
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            email: "cook@example.com".to_string(),
            username: "homecook".to_string(),
            first_name: "Home".to_string(),
            last_name: "Cook".to_string(),
            password: "secure_password_123".to_string(),
        }
    }

    #[test]
    fn test_jwt_encode_decode() {
        let secret = "test-secret-key-for-jwt";
        let user_id = 42;

        let claims = create_test_claims(user_id, 24);

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed");

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .expect("decoding should succeed");

        assert_eq!(decoded.claims.sub, user_id);
    }

    #[test]
    fn test_jwt_expired_token() {
        let secret = "test-secret-key-for-jwt";
        let claims = create_test_claims(42, -1);

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed");

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_jwt_wrong_secret() {
        let secret = "test-secret-key-for-jwt";
        let claims = create_test_claims(42, 24);

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed");

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("wrong-secret".as_bytes()),
            &Validation::default(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let password = "secure_password_123";
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .expect("hashing should succeed")
            .to_string();

        let parsed_hash = PasswordHash::new(&hash).expect("parsing should succeed");

        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);
        assert!(result.is_ok());
    }

    #[test]
    fn test_password_verify_wrong_password() {
        let password = "secure_password_123";
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .expect("hashing should succeed")
            .to_string();

        let parsed_hash = PasswordHash::new(&hash).expect("parsing should succeed");

        let result = argon2.verify_password("wrong_password".as_bytes(), &parsed_hash);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_registration_accepts_valid_input() {
        assert!(validate_registration(&register_input()).is_ok());
    }

    #[test]
    fn test_validate_registration_rejects_bad_email() {
        let mut input = register_input();
        input.email = "not-an-email".to_string();
        assert!(matches!(
            validate_registration(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_registration_rejects_short_password() {
        let mut input = register_input();
        input.password = "short".to_string();
        assert!(matches!(
            validate_registration(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_username_rejects_reserved() {
        assert!(validate_username("me").is_err());
        assert!(validate_username("Me").is_err());
        assert!(validate_username("homecook").is_ok());
    }

    #[test]
    fn test_validate_username_rejects_invalid_chars() {
        assert!(validate_username("has space").is_err());
        assert!(validate_username("has#hash").is_err());
        assert!(validate_username("dot.plus+dash-ok").is_ok());
    }

    #[test]
    fn test_claims_serialization() {
        let claims = create_test_claims(42, 24);
        let json = serde_json::to_string(&claims).expect("serialization should succeed");
        let parsed: Claims = serde_json::from_str(&json).expect("deserialization should succeed");

        assert_eq!(claims.sub, parsed.sub);
        assert_eq!(claims.exp, parsed.exp);
        assert_eq!(claims.iat, parsed.iat);
    }
}
