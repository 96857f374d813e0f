//! Slug derivation and scoped uniqueness checks.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::store::Store;

/// Derives a URL-safe slug from a human-readable name: lowercased, runs of
/// non-alphanumeric characters collapsed into single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Checks that no *other* organisation already uses `candidate`.
///
/// `exclude` is the identity of the record being saved, so an update that
/// keeps its own slug does not conflict with itself; matching is by id,
/// never by content. If several pre-existing records already share the slug
/// (a data-integrity anomaly) the candidate is rejected outright rather
/// than picking one of them as "self".
pub fn validate_organisation_slug<S: Store + ?Sized>(
    store: &S,
    candidate: &str,
    exclude: Option<Uuid>,
) -> CoreResult<()> {
    let matches = store.organisations_with_slug(candidate)?;
    let duplicate = matches.len() > 1 || matches.iter().any(|o| Some(o.id) != exclude);
    if duplicate {
        return Err(CoreError::DuplicateSlug {
            slug: candidate.to_string(),
        });
    }
    Ok(())
}

/// Same check as [`validate_organisation_slug`], scoped to one organisation:
/// the slug only has to be free among that organisation's projects.
pub fn validate_project_slug<S: Store + ?Sized>(
    store: &S,
    organisation: Uuid,
    candidate: &str,
    exclude: Option<Uuid>,
) -> CoreResult<()> {
    let matches = store.projects_with_slug(organisation, candidate)?;
    let duplicate = matches.len() > 1 || matches.iter().any(|p| Some(p.id) != exclude);
    if duplicate {
        return Err(CoreError::DuplicateSlug {
            slug: candidate.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AclEntry, Organisation, Project, Role, Team};
    use crate::store::MemoryStore;

    fn acl_for(store: &mut MemoryStore, organisation: Uuid) -> Vec<AclEntry> {
        let team = Team::new("Developers", organisation, vec![Uuid::new_v4()]);
        store.write_team(&team).unwrap();
        vec![AclEntry {
            team: team.id,
            role: Role::Admin,
        }]
    }

    #[test]
    fn slugify_normalises_names() {
        assert_eq!(slugify("open labs"), "open-labs");
        assert_eq!(slugify("Titan Project"), "titan-project");
        assert_eq!(slugify("  weird -- spacing  "), "weird-spacing");
        assert_eq!(slugify("v0.1 (alpha)"), "v0-1-alpha");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn organisation_slug_free_and_taken() {
        let mut store = MemoryStore::new();
        let org = Organisation::new("open labs", "open-labs");
        store.write_organisation(&org).unwrap();

        assert!(validate_organisation_slug(&store, "infy-labs", None).is_ok());
        assert!(matches!(
            validate_organisation_slug(&store, "open-labs", None),
            Err(CoreError::DuplicateSlug { .. })
        ));
        // The record itself may keep its slug on update.
        assert!(validate_organisation_slug(&store, "open-labs", Some(org.id)).is_ok());
    }

    #[test]
    fn project_slug_scoped_to_organisation() {
        let mut store = MemoryStore::new();
        let org_a = Organisation::new("open labs", "open-labs");
        let org_b = Organisation::new("infy", "infy-labs");
        store.write_organisation(&org_a).unwrap();
        store.write_organisation(&org_b).unwrap();

        let acl = acl_for(&mut store, org_a.id);
        let project = Project::new("Titan", "titan", org_a.id, acl);
        store.write_project(&project).unwrap();

        assert!(matches!(
            validate_project_slug(&store, org_a.id, "titan", None),
            Err(CoreError::DuplicateSlug { .. })
        ));
        // Same slug is free under the other organisation.
        assert!(validate_project_slug(&store, org_b.id, "titan", None).is_ok());
        // And the project itself may keep it.
        assert!(validate_project_slug(&store, org_a.id, "titan", Some(project.id)).is_ok());
    }

    #[test]
    fn pre_existing_duplicates_always_conflict() {
        // Two organisations sharing a slug can only come from legacy data
        // written before the unique index existed. The validator must refuse
        // the slug even for one of the two, never "pick the first".
        let mut store = MemoryStore::new();
        let first = Organisation::new("open labs", "open-labs");
        let mut second = Organisation::new("open lab", "open-lab");
        store.write_organisation(&first).unwrap();
        store.write_organisation(&second).unwrap();

        second.slug = "open-labs".to_string();
        store.seed_organisation_unchecked(&second);

        assert!(matches!(
            validate_organisation_slug(&store, "open-labs", Some(first.id)),
            Err(CoreError::DuplicateSlug { .. })
        ));
        assert!(matches!(
            validate_organisation_slug(&store, "open-labs", Some(second.id)),
            Err(CoreError::DuplicateSlug { .. })
        ));
    }

    #[test]
    fn pre_existing_project_duplicates_always_conflict() {
        let mut store = MemoryStore::new();
        let org = Organisation::new("open labs", "open-labs");
        store.write_organisation(&org).unwrap();

        let acl = acl_for(&mut store, org.id);
        let first = Project::new("Titan", "titan", org.id, acl.clone());
        let mut second = Project::new("New Titan", "new-titan", org.id, acl);
        store.write_project(&first).unwrap();
        store.write_project(&second).unwrap();

        second.slug = "titan".to_string();
        store.seed_project_unchecked(&second);

        assert!(matches!(
            validate_project_slug(&store, org.id, "titan", Some(first.id)),
            Err(CoreError::DuplicateSlug { .. })
        ));
    }
}
