//! Project operations, all scoped under an organisation slug.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::authz::{self, Access};
use crate::error::{CoreError, CoreResult};
use crate::models::{AclEntry, Project, Role};
use crate::pagination::{paginate, PaginationMeta, PaginationParams};
use crate::persist;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub slug: String,
    /// The team nominated as the new project's admin team. The requester
    /// must be one of its members.
    pub team: Option<Uuid>,
}

/// A project together with the requesting user's effective role on it.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub project: Project,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub data: Vec<ProjectView>,
    pub pagination: PaginationMeta,
}

/// Lists the organisation's projects for any member, annotated with the
/// member's role on each (which may be none for projects whose ACL does
/// not reach them).
pub fn list<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation_slug: &str,
    pagination: &PaginationParams,
) -> CoreResult<ProjectList> {
    let organisation = authz::authorize(store, user, organisation_slug, Access::AnyMember)?;
    let projects = store.projects_in_organisation(organisation.id)?;
    let (page, pagination) = paginate(projects, pagination);

    let mut data = Vec::with_capacity(page.len());
    for project in page {
        let role = authz::role_in_project(store, user, &project)?;
        data.push(ProjectView { project, role });
    }
    Ok(ProjectList { data, pagination })
}

/// Creates a project under the organisation. The organisation must be
/// visible to the requester (`NotFound` otherwise); the nominated team must
/// belong to it and contain the requester (`Forbidden` otherwise) and
/// becomes the project's admin ACL entry.
pub fn create<S: Store + ?Sized>(
    store: &mut S,
    user: Uuid,
    organisation_slug: &str,
    request: CreateProject,
) -> CoreResult<ProjectView> {
    let organisation = authz::authorize(store, user, organisation_slug, Access::AnyMember)?;
    let team_id = request
        .team
        .ok_or_else(|| CoreError::validation("team", "Team is required"))?;
    let team = authz::nominated_team(store, user, organisation.id, team_id)?;

    let project = Project::new(
        request.name,
        request.slug,
        organisation.id,
        vec![AclEntry {
            team: team.id,
            role: Role::Admin,
        }],
    );
    persist::save_project(store, &project)?;

    info!(
        project_id = %project.id,
        project_slug = %project.slug,
        organisation_id = %organisation.id,
        admin_team = %team.id,
        created_by = %user,
        "Created project"
    );
    Ok(ProjectView {
        project,
        role: Some(Role::Admin),
    })
}

/// Fetches one project by (organisation slug, project slug).
pub fn get<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation_slug: &str,
    project_slug: &str,
) -> CoreResult<ProjectView> {
    let organisation = authz::authorize(store, user, organisation_slug, Access::AnyMember)?;
    let project = store
        .projects_with_slug(organisation.id, project_slug)?
        .into_iter()
        .next()
        .ok_or(CoreError::NotFound)?;
    let role = authz::role_in_project(store, user, &project)?;
    Ok(ProjectView { project, role })
}

/// Whether `candidate` is still free among the organisation's projects.
/// Advisory only; creation re-validates.
pub fn slug_available<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation_slug: &str,
    candidate: &str,
) -> CoreResult<bool> {
    let organisation = authz::authorize(store, user, organisation_slug, Access::AnyMember)?;
    Ok(store
        .projects_with_slug(organisation.id, candidate)?
        .is_empty())
}
