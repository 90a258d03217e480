use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Profile mirrored from the identity provider, keyed by its subject id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub clerk_id: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub clerk_id: String,
    #[serde(default, alias = "Image")]
    pub image: String,
}

/// Partial profile edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub clerk_id: Option<String>,
    #[serde(alias = "Image")]
    pub image: Option<String>,
}

impl UserUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(clerk_id) = self.clerk_id {
            user.clerk_id = clerk_id;
        }
        if let Some(image) = self.image {
            user.image = image;
        }
    }
}
