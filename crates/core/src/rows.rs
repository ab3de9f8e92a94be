//! Typed row contracts for the raw fetch layer.
//!
//! One struct per entity. Every `RowSource` implementation hands these to
//! the core; stored strings (roles, visibility tiers) are parsed here so the
//! rest of the pipeline only sees validated values.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::{DbId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Stored visibility tier strings.
pub const TIER_PUBLIC: &str = "public";
pub const TIER_PRIVATE: &str = "private";
pub const TIER_GROUP: &str = "rso";
/// Accepted on read as a synonym for [`TIER_GROUP`].
pub const TIER_GROUP_ALIAS: &str = "group";

/// Stored role strings.
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_ADMIN, ROLE_SUPER_ADMIN];

/// Maximum length of a comment body, in characters.
pub const MAX_COMMENT_LENGTH: u64 = 2000;

/// Maximum length of an event title or group name, in characters.
pub const MAX_NAME_LENGTH: u64 = 200;

/// Inclusive bounds of a comment rating.
pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Who may see an event.
///
/// Unknown stored values are preserved as [`VisibilityTier::Unrecognized`]
/// so the visibility resolver can reject them instead of the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityTier {
    Public,
    Private,
    Group,
    Unrecognized(String),
}

impl VisibilityTier {
    /// Convert from a stored string value. Never fails.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            TIER_PUBLIC => Self::Public,
            TIER_PRIVATE => Self::Private,
            TIER_GROUP | TIER_GROUP_ALIAS => Self::Group,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Public => TIER_PUBLIC,
            Self::Private => TIER_PRIVATE,
            Self::Group => TIER_GROUP,
            Self::Unrecognized(s) => s,
        }
    }
}

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Convert from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ROLE_STUDENT => Ok(Self::Student),
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_SUPER_ADMIN => Ok(Self::SuperAdmin),
            _ => Err(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            )),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => ROLE_STUDENT,
            Self::Admin => ROLE_ADMIN,
            Self::SuperAdmin => ROLE_SUPER_ADMIN,
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationRow {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub organization_id: Option<DbId>,
    pub role: Role,
}

/// A registered student organization (RSO).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub id: DbId,
    pub name: String,
    pub organization_id: DbId,
    pub admin_id: Option<UserId>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipRow {
    pub user_id: UserId,
    pub group_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRow {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub date: Timestamp,
    pub visibility: VisibilityTier,
    pub created_by: UserId,
    pub group_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub location_id: Option<DbId>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_approved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRow {
    pub id: DbId,
    pub event_id: DbId,
    pub author_id: UserId,
    pub text: String,
    pub rating: Option<i16>,
    pub created_at: Timestamp,
}

/// Predicate for [`RowSource::fetch_events`](crate::store::RowSource::fetch_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    /// Only return events that passed moderation.
    pub approved_only: bool,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            approved_only: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// Payload for inserting a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewComment {
    pub event_id: DbId,
    pub author_id: UserId,
    #[validate(
        length(min = 1, max = 2000, message = "comment must be 1-2000 characters"),
        custom(function = "not_blank")
    )]
    pub text: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

/// Payload for editing the body of an existing comment.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct CommentEdit {
    pub comment_id: DbId,
    pub author_id: UserId,
    #[validate(
        length(min = 1, max = 2000, message = "comment must be 1-2000 characters"),
        custom(function = "not_blank")
    )]
    pub text: String,
}

/// Payload for inserting an event. Every reference is required.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewEvent {
    pub created_by: UserId,
    #[validate(
        length(min = 1, max = 200, message = "title must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    pub date: Timestamp,
    #[validate(custom(function = "known_tier"))]
    pub visibility: VisibilityTier,
    pub group_id: DbId,
    pub category_id: DbId,
    pub location_id: DbId,
    #[validate(
        length(min = 1, max = 30, message = "contact phone must be 1-30 characters"),
        custom(function = "not_blank")
    )]
    pub contact_phone: String,
    #[validate(email(message = "contact email is not a valid address"))]
    pub contact_email: String,
    pub is_approved: bool,
}

/// Payload for inserting a group.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewGroup {
    #[validate(
        length(min = 1, max = 200, message = "name must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub organization_id: DbId,
    pub admin_id: UserId,
    pub is_active: bool,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn known_tier(tier: &VisibilityTier) -> Result<(), ValidationError> {
    if let VisibilityTier::Unrecognized(value) = tier {
        let mut err = ValidationError::new("unknown_tier");
        err.message = Some(format!("unknown visibility '{value}'").into());
        return Err(err);
    }
    Ok(())
}
