//! Per-event visibility decision for a viewer.
//!
//! First matching rule wins:
//!
//! 1. `public`: visible to everyone.
//! 2. `private`: visible iff the creator's organization is known and equals
//!    the viewer's organization.
//! 3. `group`: visible iff the event names a group, the group resolves in
//!    the reference maps, and the viewer is a member of that group id.
//! 4. anything else: hidden.
//!
//! Group names never take part in the decision.

use crate::references::ReferenceMaps;
use crate::rows::{EventRow, VisibilityTier};
use crate::viewer::Viewer;

/// Why an event was kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityDecision {
    Public,
    SameOrganization,
    GroupMember,
    OtherOrganization,
    UnknownCreatorOrganization,
    MissingGroupId,
    UnknownGroup,
    NotGroupMember,
    UnrecognizedTier,
}

impl VisibilityDecision {
    pub fn is_visible(self) -> bool {
        matches!(
            self,
            Self::Public | Self::SameOrganization | Self::GroupMember
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::SameOrganization => "same_organization",
            Self::GroupMember => "group_member",
            Self::OtherOrganization => "other_organization",
            Self::UnknownCreatorOrganization => "unknown_creator_organization",
            Self::MissingGroupId => "missing_group_id",
            Self::UnknownGroup => "unknown_group",
            Self::NotGroupMember => "not_group_member",
            Self::UnrecognizedTier => "unrecognized_tier",
        }
    }
}

/// Decide whether `viewer` may see `event`, naming the rule that applied.
pub fn decide(event: &EventRow, viewer: &Viewer, refs: &ReferenceMaps) -> VisibilityDecision {
    match &event.visibility {
        VisibilityTier::Public => VisibilityDecision::Public,
        VisibilityTier::Private => match refs.organization_of(&event.created_by) {
            None => VisibilityDecision::UnknownCreatorOrganization,
            Some(org) if Some(org) == viewer.organization_id => {
                VisibilityDecision::SameOrganization
            }
            Some(_) => VisibilityDecision::OtherOrganization,
        },
        VisibilityTier::Group => match event.group_id {
            None => VisibilityDecision::MissingGroupId,
            Some(group_id) if !refs.groups.contains_key(&group_id) => {
                VisibilityDecision::UnknownGroup
            }
            Some(group_id) if viewer.is_member_of(group_id) => VisibilityDecision::GroupMember,
            Some(_) => VisibilityDecision::NotGroupMember,
        },
        VisibilityTier::Unrecognized(_) => VisibilityDecision::UnrecognizedTier,
    }
}

pub fn is_visible(event: &EventRow, viewer: &Viewer, refs: &ReferenceMaps) -> bool {
    decide(event, viewer, refs).is_visible()
}
