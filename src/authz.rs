//! Membership resolution and access decisions.
//!
//! A user's organisations are never stored: they are derived on every call
//! from the teams the user belongs to. Project access goes through the
//! project's embedded ACL, with the most privileged role winning when
//! several teams grant different ones.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{Organisation, Project, Role, Team};
use crate::store::Store;

/// What an operation demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Member of any team of the organisation.
    AnyMember,
    /// Holds the admin role on some project of the organisation.
    Admin,
}

/// The set of organisations the user belongs to, derived as the union of
/// `team.organisation` over every team containing the user. Read-through on
/// every call; nothing is cached.
pub fn organisations_for_user<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
) -> CoreResult<Vec<Organisation>> {
    let mut seen = HashSet::new();
    let mut organisations = Vec::new();
    for team in store.teams_for_user(user)? {
        if seen.insert(team.organisation) {
            if let Some(organisation) = store.find_organisation(team.organisation)? {
                organisations.push(organisation);
            }
        }
    }
    Ok(organisations)
}

/// The user's effective role on a project: the maximum role granted by any
/// ACL entry whose team contains the user, or `None` when no entry does.
pub fn role_in_project<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    project: &Project,
) -> CoreResult<Option<Role>> {
    let mut effective: Option<Role> = None;
    for entry in &project.acl {
        if let Some(team) = store.find_team(entry.team)? {
            if team.has_member(user) {
                effective = effective.max(Some(entry.role));
            }
        }
    }
    Ok(effective)
}

/// Resolves an organisation by slug among the user's own organisations.
///
/// An organisation the user does not belong to answers `NotFound`, exactly
/// like a slug that matches nothing, so callers cannot learn whether an
/// organisation exists. `Access::Admin` additionally demands the admin role
/// via some project ACL of the organisation, answering `Forbidden` when the
/// user is a member without it.
pub fn authorize<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation_slug: &str,
    access: Access,
) -> CoreResult<Organisation> {
    let organisation = organisations_for_user(store, user)?
        .into_iter()
        .find(|o| o.slug == organisation_slug)
        .ok_or(CoreError::NotFound)?;

    if access == Access::Admin {
        let mut is_admin = false;
        for project in store.projects_in_organisation(organisation.id)? {
            if role_in_project(store, user, &project)? == Some(Role::Admin) {
                is_admin = true;
                break;
            }
        }
        if !is_admin {
            return Err(CoreError::Forbidden);
        }
    }

    Ok(organisation)
}

/// Resolves the team a requester nominated (for example as a new project's
/// admin team) and checks the requester belongs to it. A team outside the
/// organisation is treated as absent; membership failure is `Forbidden`,
/// distinct from the `NotFound` used for invisible organisations.
pub fn nominated_team<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation: Uuid,
    team: Uuid,
) -> CoreResult<Team> {
    let team = store
        .find_team(team)?
        .filter(|t| t.organisation == organisation)
        .ok_or(CoreError::NotFound)?;
    if !team.has_member(user) {
        return Err(CoreError::Forbidden);
    }
    Ok(team)
}
