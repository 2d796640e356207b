//! Request and response payloads
//!
//! Only the fields the client reads are typed; everything else the backend
//! sends is kept in `extra`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub username: Option<String>,
    pub id: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Publication stage of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Draft,
    Published,
    Scheduled,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub user_liked: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeData {
    #[serde(default)]
    pub profile: Option<Value>,
    #[serde(default)]
    pub blogs: Vec<Blog>,
}

/// Filters shared by the user and admin blog listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    /// `None` or `"all"` means every category
    pub category: Option<String>,
    /// Applied only when both ends are set
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub search: Option<String>,
    /// Admin listing only
    pub stage: Option<Stage>,
}

impl BlogFilter {
    /// Query pairs in the order the backend expects
    #[must_use]
    pub fn query_pairs(&self, include_stage: bool) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if include_stage && let Some(stage) = self.stage {
            pairs.push(("stage".to_string(), stage.as_str().to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| *c != "all" && !c.is_empty()) {
            pairs.push(("category".to_string(), category.to_string()));
        }
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            pairs.push(("fromDate".to_string(), from.format("%Y-%m-%d").to_string()));
            pairs.push(("toDate".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs
    }
}

/// Image attached to a blog form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Fields of the create/update blog forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub stage: Stage,
    /// RFC 3339 timestamp; creation defaults it to now
    pub scheduled_at: Option<String>,
    /// Update form only
    pub created_at: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview<'a> {
    pub rating: u8,
    pub review: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Stored with its country code, e.g. `+919876543210`; the edit form
    /// holds only the national number
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Split the stored phone into a known country code and the national
    /// number, for filling the edit form.
    ///
    /// Falls back to `default_code` with the whole number when no code matches.
    #[must_use]
    pub fn phone_parts<'a>(
        &'a self,
        known_codes: &[&'a str],
        default_code: &'a str,
    ) -> (&'a str, &'a str) {
        split_phone(&self.phone, known_codes, default_code)
    }
}

fn split_phone<'a>(
    full: &'a str,
    known_codes: &[&'a str],
    default_code: &'a str,
) -> (&'a str, &'a str) {
    known_codes
        .iter()
        .find(|code| full.starts_with(**code))
        .map(|code| (*code, &full[code.len()..]))
        .unwrap_or((default_code, full))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

/// One step of the forgot-password wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ForgotPasswordStep {
    /// Ask the backend to email a reset code
    RequestCode { email: String },
    /// Check the emailed code
    VerifyCode { email: String, code: u32 },
    /// Set the new password
    Reset {
        email: String,
        code: u32,
        #[serde(rename = "newPassword")]
        new_password: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
