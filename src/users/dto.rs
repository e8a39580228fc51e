use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{patch, users::repo_types::User};

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
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
            name: u.name,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Request body for `PUT /users/:id`; omitted fields are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "patch::present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::present")]
    pub password: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<PublicUser>,
    pub total: i64,
}
