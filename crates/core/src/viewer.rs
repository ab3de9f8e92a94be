//! The viewer on whose behalf visibility and comment ownership are evaluated.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::FeedError;
use crate::references::chunked_ids;
use crate::rows::Role;
use crate::store::RowSource;
use crate::types::{DbId, UserId};

/// What the authentication collaborator knows about the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerIdentity {
    pub user_id: UserId,
    pub organization_name: String,
    pub role: Role,
}

/// A fully resolved viewer for one build cycle.
///
/// `groups` maps group id to group name. Visibility decisions consult the
/// ids only; the names are carried for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewer {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub organization_id: Option<DbId>,
    pub organization_name: String,
    pub role: Role,
    pub groups: BTreeMap<DbId, String>,
}

impl Viewer {
    /// Whether the viewer belongs to the group with this id.
    pub fn is_member_of(&self, group_id: DbId) -> bool {
        self.groups.contains_key(&group_id)
    }

    /// Names of the viewer's groups, sorted by group id.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.values().map(String::as_str).collect()
    }
}

/// Resolve the full viewer for `identity`: profile, home organization name
/// and current group memberships.
///
/// Memberships are read fresh on every call so that a join or leave is
/// reflected by the next build cycle.
pub async fn resolve_viewer<S>(
    source: &S,
    identity: &ViewerIdentity,
    batch_size: usize,
) -> Result<Viewer, FeedError>
where
    S: RowSource + ?Sized,
{
    let user = source
        .fetch_users(&[identity.user_id])
        .await
        .map_err(FeedError::fetch("user"))?
        .into_iter()
        .find(|u| u.id == identity.user_id)
        .ok_or(FeedError::Unauthenticated)?;

    let organization_name = match user.organization_id {
        Some(org_id) => source
            .fetch_organizations(&[org_id])
            .await
            .map_err(FeedError::fetch("organization"))?
            .into_iter()
            .find(|o| o.id == org_id)
            .map(|o| o.name)
            .unwrap_or_else(|| identity.organization_name.clone()),
        None => identity.organization_name.clone(),
    };

    let memberships = source
        .fetch_memberships(identity.user_id)
        .await
        .map_err(FeedError::fetch("membership"))?;
    let group_ids: Vec<DbId> = memberships.iter().map(|m| m.group_id).collect();

    let mut groups = BTreeMap::new();
    for chunk in chunked_ids(group_ids, batch_size) {
        let rows = source
            .fetch_groups(&chunk)
            .await
            .map_err(FeedError::fetch("group"))?;
        groups.extend(rows.into_iter().map(|g| (g.id, g.name)));
    }

    tracing::debug!(
        viewer_id = %user.id,
        organization_id = ?user.organization_id,
        group_count = groups.len(),
        "Resolved viewer",
    );

    Ok(Viewer {
        id: user.id,
        display_name: user.name,
        email: user.email,
        organization_id: user.organization_id,
        organization_name,
        role: user.role,
        groups,
    })
}
