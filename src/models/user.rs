use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// 登録済みユーザーを表すドメインモデル。
/// パスワードハッシュは `#[serde(skip_serializing)]` で JSON に出さないようにしている。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// サインアップ・ログインの両方で受け取るペイロード。
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// 画面 (ダッシュボード) に返す公開用のユーザー情報。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
        }
    }
}

impl Credentials {
    /// ユーザー名・パスワードの必須チェックと文字数上限を検証する。
    /// パスワードは前後の空白も意味を持つので `trim` しない。
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username cannot be empty".to_string());
        }

        if self.username.trim().chars().count() > 150 {
            return Err("Username cannot exceed 150 characters".to_string());
        }

        if self.password.is_empty() {
            return Err("Password cannot be empty".to_string());
        }

        if self.password.chars().count() > 256 {
            return Err("Password cannot exceed 256 characters".to_string());
        }

        Ok(())
    }

    /// 保存・検索に使うユーザー名 (前後の空白を除去)。
    pub fn get_normalized_username(&self) -> String {
        self.username.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_credentials_validation() {
        assert!(credentials("alice", "secret").validate().is_ok());

        // Empty username
        assert!(credentials("", "secret").validate().is_err());
        assert!(credentials("   ", "secret").validate().is_err());

        // Empty password
        assert!(credentials("alice", "").validate().is_err());

        // Too long
        assert!(credentials(&"a".repeat(151), "secret").validate().is_err());
        assert!(credentials("alice", &"p".repeat(257)).validate().is_err());

        // Whitespace-only passwords are still passwords
        assert!(credentials("alice", "   ").validate().is_ok());
    }

    #[test]
    fn test_username_normalization() {
        assert_eq!(credentials("  alice ", "x").get_normalized_username(), "alice");
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            created_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
        };

        let json = serde_json::to_string(&user).expect("Failed to serialize user");
        assert_eq!(json, r#"{"id":7,"username":"alice","created_at":"2024-01-01T00:00:00Z"}"#);

        let response = UserResponse::from(user);
        assert_eq!(response, UserResponse { id: 7, username: "alice".to_string() });
    }
}
