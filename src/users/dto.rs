use serde::{Deserialize, Serialize};

use crate::{
    auth::jwt::AccessToken,
    users::{model::User, repo::ListQuery, services::CreateUser},
    values::{Email, Pagination, Password, Sorts, ValidationErrors},
};

/// Keeps every validation failure instead of stopping at the first one.
fn collect<T>(result: Result<T, ValidationErrors>, errors: &mut Vec<ValidationErrors>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn merged(errors: Vec<ValidationErrors>) -> ValidationErrors {
    errors
        .into_iter()
        .fold(ValidationErrors(Vec::new()), ValidationErrors::merge)
}

/// Request body for `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TokenRequest {
    pub fn into_credentials(self) -> Result<(Email, Password), ValidationErrors> {
        let mut errors = Vec::new();
        let email = collect(Email::new(self.email), &mut errors);
        let password = collect(Password::new(self.password), &mut errors);
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(merged(errors)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// RFC 3339, UTC.
    pub access_token_expired_at: String,
}

impl From<AccessToken> for TokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token_expired_at: token.expires_at.to_rfc3339(),
            access_token: token.token,
        }
    }
}

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub firstname: String,
}

impl TryFrom<CreateUserRequest> for CreateUser {
    type Error = ValidationErrors;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();
        let email = collect(Email::new(req.email.trim()), &mut errors);
        let password = collect(Password::new(req.password), &mut errors);
        match (email, password) {
            (Some(email), Some(password)) => Ok(CreateUser {
                email,
                password,
                lastname: req.lastname.trim().to_string(),
                firstname: req.firstname.trim().to_string(),
            }),
            _ => Err(merged(errors)),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub lastname: String,
    pub firstname: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.value().to_string(),
            lastname: user.lastname.clone(),
            firstname: user.firstname.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            deleted_at: user.deleted_at.as_ref().map(|t| t.to_rfc3339()),
        }
    }
}

/// Query string of the listing routes: `?page=2&size=50&sort=+lastname,-created_at`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn into_query(self, deleted: bool) -> ListQuery {
        ListQuery {
            pagination: Pagination::from_query(
                self.page.as_deref().unwrap_or_default(),
                self.size.as_deref().unwrap_or_default(),
                "",
            ),
            sorts: Sorts::parse(self.sort.as_deref().unwrap_or_default()),
            deleted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Id, Timestamp};

    #[test]
    fn token_request_reports_every_invalid_field() {
        let req = TokenRequest {
            email: "nope".into(),
            password: "short".into(),
        };
        let errors = req.into_credentials().err().expect("invalid");
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn create_request_trims_names() {
        let req = CreateUserRequest {
            email: " jane@example.com ".into(),
            password: "long enough".into(),
            lastname: " Doe ".into(),
            firstname: "Jane".into(),
        };
        let create = CreateUser::try_from(req).expect("valid");
        assert_eq!(create.email.value(), "jane@example.com");
        assert_eq!(create.lastname, "Doe");
    }

    #[test]
    fn user_response_uses_rfc3339() {
        let ts = Timestamp::parse_rfc3339("2024-01-02T03:04:05Z", None).expect("timestamp");
        let user = User {
            id: Id::generate(),
            email: Email::new("jane@example.com").expect("email"),
            lastname: "Doe".into(),
            firstname: "Jane".into(),
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        let json = serde_json::to_value(UserResponse::from(&user)).expect("json");
        assert_eq!(json["created_at"], "2024-01-02T03:04:05Z");
        assert_eq!(json["id"], user.id.to_string());
        assert!(json.get("deleted_at").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn list_params_fall_back_to_defaults() {
        let query = ListParams::default().into_query(false);
        assert_eq!(query.pagination.page(), 1);
        assert_eq!(query.pagination.size(), 100);
        assert!(query.sorts.is_empty());

        let query = ListParams {
            page: Some("3".into()),
            size: Some("abc".into()),
            sort: Some("-lastname".into()),
        }
        .into_query(true);
        assert_eq!(query.pagination.page(), 3);
        assert_eq!(query.pagination.size(), 100);
        assert!(query.deleted);
        assert!(!query.sorts.is_empty());
    }
}
