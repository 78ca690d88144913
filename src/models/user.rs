use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAvatarInput {
    pub avatar: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserWithToken,
}

#[derive(Debug, Serialize)]
pub struct UserWithToken {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub token: String,
}

impl UserWithToken {
    pub fn from_user(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: user.avatar.clone(),
            token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub is_subscribed: bool,
}

impl ProfileResponse {
    pub fn from_user(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            is_subscribed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<ProfileResponse>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn create_test_user() -> User {
        User {
            id: 1,
            email: "cook@example.com".to_string(),
            username: "homecook".to_string(),
            password_hash: "hashed_password".to_string(),
            first_name: "Home".to_string(),
            last_name: "Cook".to_string(),
            avatar: "https://example.com/avatar.jpg".to_string(),
            created_at: datetime!(2024-01-15 10:30:00 UTC),
            updated_at: datetime!(2024-01-16 15:45:00 UTC),
        }
    }

    #[test]
    fn test_user_with_token_from_user() {
        let user = create_test_user();
        let token = "jwt_token_here".to_string();

        let user_with_token = UserWithToken::from_user(&user, token.clone());

        assert_eq!(user_with_token.id, user.id);
        assert_eq!(user_with_token.email, user.email);
        assert_eq!(user_with_token.username, user.username);
        assert_eq!(user_with_token.avatar, user.avatar);
        assert_eq!(user_with_token.token, token);
    }

    #[test]
    fn test_profile_response_from_user() {
        let user = create_test_user();
        let profile = ProfileResponse::from_user(user.clone(), true);

        assert_eq!(profile.id, user.id);
        assert_eq!(profile.email, user.email);
        assert_eq!(profile.username, user.username);
        assert!(profile.is_subscribed);
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user();
        let json = serde_json::to_string(&user).expect("serialization should succeed");

        assert!(json.contains("\"email\":\"cook@example.com\""));
        assert!(json.contains("\"username\":\"homecook\""));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hashed_password"));
    }

    #[test]
    fn test_register_input_deserialization() {
        let json = r#"{
            "email": "new@example.com",
            "username": "newcook",
            "first_name": "New",
            "last_name": "Cook",
            "password": "secret123"
        }"#;
        let input: RegisterInput =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert_eq!(input.email, "new@example.com");
        assert_eq!(input.username, "newcook");
        assert_eq!(input.password, "secret123");
    }

    #[test]
    fn test_change_password_input_deserialization() {
        let json = r#"{"current_password": "old_secret", "new_password": "new_secret"}"#;
        let input: ChangePasswordInput =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert_eq!(input.current_password, "old_secret");
        assert_eq!(input.new_password, "new_secret");
    }

    #[test]
    fn test_profile_response_serialization() {
        let user = create_test_user();
        let profile = ProfileResponse::from_user(user, false);

        let json = serde_json::to_string(&profile).expect("serialization should succeed");
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"is_subscribed\":false"));
    }
}
