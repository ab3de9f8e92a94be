//! Identity lookup for sessions started from a bare user id.

use campus_core::error::FeedError;
use campus_core::store::RowSource;
use campus_core::types::UserId;
use campus_core::viewer::ViewerIdentity;

/// Build the identity of `user_id` from stored rows.
///
/// Returns `None` when no such user exists. A user without an organization
/// gets an empty organization name.
pub async fn lookup_identity<S>(
    source: &S,
    user_id: UserId,
) -> Result<Option<ViewerIdentity>, FeedError>
where
    S: RowSource + ?Sized,
{
    let Some(user) = source
        .fetch_users(&[user_id])
        .await
        .map_err(FeedError::fetch("user"))?
        .into_iter()
        .find(|u| u.id == user_id)
    else {
        return Ok(None);
    };

    let organization_name = match user.organization_id {
        Some(id) => source
            .fetch_organizations(&[id])
            .await
            .map_err(FeedError::fetch("organization"))?
            .into_iter()
            .find(|o| o.id == id)
            .map(|o| o.name)
            .unwrap_or_default(),
        None => String::new(),
    };

    Ok(Some(ViewerIdentity {
        user_id,
        organization_name,
        role: user.role,
    }))
}
