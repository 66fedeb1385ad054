use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::auth::repo_types::User;

/// Request body for registration and edit.
///
/// Missing and `null` fields deserialize as empty strings so they are
/// reported by validation instead of rejecting the body.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        rename = "FullName",
        alias = "fullName",
        alias = "full_name"
    )]
    pub full_name: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        rename = "Email",
        alias = "email"
    )]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        rename = "Password",
        alias = "password"
    )]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        rename = "Email",
        alias = "email"
    )]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        rename = "Password",
        alias = "password"
    )]
    pub password: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// User as returned by the listing. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(rename = "mensagem")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "erro")]
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    #[serde(rename = "erros")]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn register_request_accepts_pascal_and_camel_case() {
        let pascal: RegisterRequest = serde_json::from_str(
            r#"{"FullName":"Ana Silva","Email":"ana@example.com","Password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(pascal.full_name, "Ana Silva");
        assert_eq!(pascal.email, "ana@example.com");
        assert_eq!(pascal.password, "secret1");

        let camel: RegisterRequest = serde_json::from_str(
            r#"{"fullName":"Ana Silva","email":"ana@example.com","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(camel.full_name, "Ana Silva");
    }

    #[test]
    fn missing_fields_become_empty() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn null_fields_become_empty() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"FullName":null,"Email":"ana@example.com","Password":null}"#,
        )
        .unwrap();
        assert!(req.full_name.is_empty());
        assert_eq!(req.email, "ana@example.com");
        assert!(req.password.is_empty());
    }

    #[test]
    fn wrong_type_still_fails() {
        let res =
            serde_json::from_str::<LoginRequest>(r#"{"Email":"a@b.co","Password":123456}"#);
        assert!(res.is_err());
    }

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: 7,
            full_name: "Ana Silva".into(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: datetime!(2024-01-01 12:00 UTC),
            updated_at: datetime!(2024-01-02 12:00 UTC),
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["fullName"], "Ana Silva");
        assert_eq!(json["createdAt"], "2024-01-01T12:00:00Z");
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn response_bodies_use_wire_names() {
        let json = serde_json::to_string(&MessageResponse::new("ok")).unwrap();
        assert_eq!(json, r#"{"mensagem":"ok"}"#);
        let json = serde_json::to_string(&ValidationErrorResponse {
            errors: vec!["a".into()],
        })
        .unwrap();
        assert_eq!(json, r#"{"erros":["a"]}"#);
    }
}
