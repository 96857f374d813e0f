//! Organisation operations.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::authz::{self, Access};
use crate::error::CoreResult;
use crate::models::Organisation;
use crate::pagination::{paginate, PaginationMeta, PaginationParams};
use crate::persist;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganisation {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrganisationList {
    pub data: Vec<Organisation>,
    pub pagination: PaginationMeta,
}

/// The requesting user's organisations, derived from team membership.
pub fn list<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    pagination: &PaginationParams,
) -> CoreResult<OrganisationList> {
    let organisations = authz::organisations_for_user(store, user)?;
    let (data, pagination) = paginate(organisations, pagination);
    Ok(OrganisationList { data, pagination })
}

/// Creates a new organisation. Any authenticated user may do this; the
/// creator only becomes a member once a team containing them exists, so
/// callers typically follow up with a team write.
pub fn create<S: Store + ?Sized>(
    store: &mut S,
    user: Uuid,
    request: CreateOrganisation,
) -> CoreResult<Organisation> {
    let mut organisation = Organisation::new(request.name, request.slug);
    organisation.image = request.image;
    persist::save_organisation(store, &organisation)?;

    info!(
        organisation_id = %organisation.id,
        organisation_slug = %organisation.slug,
        created_by = %user,
        "Created organisation"
    );
    Ok(organisation)
}

/// Fetches one organisation by slug. Answers `NotFound` both for a slug
/// that matches nothing and for an organisation the user is not a member
/// of — the two cases are indistinguishable by design.
pub fn get<S: Store + ?Sized>(store: &S, user: Uuid, slug: &str) -> CoreResult<Organisation> {
    authz::authorize(store, user, slug, Access::AnyMember)
}

/// Whether `slug` is still free for a new organisation. The check is
/// global; the answer is advisory only and creation re-validates.
pub fn slug_available<S: Store + ?Sized>(store: &S, slug: &str) -> CoreResult<bool> {
    Ok(store.organisations_with_slug(slug)?.is_empty())
}
