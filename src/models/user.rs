use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Traveler,
    Admin,
    ContentManager,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Traveler => "traveler",
            UserRole::Admin => "admin",
            UserRole::ContentManager => "content_manager",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// Unknown role strings degrade to the least privileged role.
    pub fn parse(role: &str) -> Self {
        match role {
            "admin" => UserRole::Admin,
            "content_manager" => UserRole::ContentManager,
            "super_admin" => UserRole::SuperAdmin,
            _ => UserRole::Traveler,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub travel_style: String,
    pub budget_currency: String,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            travel_style: "leisure".to_string(),
            budget_currency: "USD".to_string(),
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    // Always hashed; federated accounts have none
    pub password: Option<String>,
    pub name: String,
    pub picture: Option<String>,
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new_traveler(email: String, password_hash: Option<String>, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            email,
            password: password_hash,
            name,
            picture: None,
            auth_provider: None,
            role: UserRole::Traveler,
            preferences: Preferences::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of a user; never carries the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub auth_provider: Option<String>,
    pub role: UserRole,
    pub preferences: Preferences,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            name: user.name,
            picture: user.picture,
            auth_provider: user.auth_provider,
            role: user.role,
            preferences: user.preferences,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}
