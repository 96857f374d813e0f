//! Validated save paths.
//!
//! Every write of a domain entity goes through one of these functions:
//! required-field validation, then the slug pre-flight where one applies,
//! then the raw store write. The pre-flight turns the common duplicate into
//! a friendly [`CoreError::DuplicateSlug`] before the store is touched; a
//! concurrent duplicate that slips past it is still caught by the store's
//! unique index and mapped to the same error, so callers see one failure
//! mode either way.

use crate::error::{CoreError, CoreResult, StorageError};
use crate::models::{Organisation, Project, Task, TaskList, Team, User};
use crate::slug::{validate_organisation_slug, validate_project_slug};
use crate::store::Store;

pub fn save_user<S: Store + ?Sized>(store: &mut S, user: &User) -> CoreResult<()> {
    user.validate()?;
    store.write_user(user).map_err(|e| match e {
        StorageError::UniqueViolation { .. } => {
            CoreError::validation("email", "A user with this email already exists")
        }
        other => CoreError::Storage(other),
    })
}

pub fn save_organisation<S: Store + ?Sized>(
    store: &mut S,
    organisation: &Organisation,
) -> CoreResult<()> {
    organisation.validate()?;
    validate_organisation_slug(store, &organisation.slug, Some(organisation.id))?;
    store.write_organisation(organisation).map_err(|e| match e {
        StorageError::UniqueViolation { .. } => CoreError::DuplicateSlug {
            slug: organisation.slug.clone(),
        },
        other => CoreError::Storage(other),
    })
}

pub fn save_team<S: Store + ?Sized>(store: &mut S, team: &Team) -> CoreResult<()> {
    team.validate()?;
    if store.find_organisation(team.organisation)?.is_none() {
        return Err(CoreError::validation(
            "organisation",
            "Organisation does not exist",
        ));
    }
    store.write_team(team)?;
    Ok(())
}

pub fn save_project<S: Store + ?Sized>(store: &mut S, project: &Project) -> CoreResult<()> {
    project.validate()?;
    if store.find_organisation(project.organisation)?.is_none() {
        return Err(CoreError::validation(
            "organisation",
            "Organisation does not exist",
        ));
    }
    for entry in &project.acl {
        let team = store
            .find_team(entry.team)?
            .ok_or_else(|| CoreError::validation("acl", "Team does not exist"))?;
        if team.organisation != project.organisation {
            return Err(CoreError::validation(
                "acl",
                "Team belongs to a different organisation",
            ));
        }
    }
    validate_project_slug(store, project.organisation, &project.slug, Some(project.id))?;
    store.write_project(project).map_err(|e| match e {
        StorageError::UniqueViolation { .. } => CoreError::DuplicateSlug {
            slug: project.slug.clone(),
        },
        other => CoreError::Storage(other),
    })
}

pub fn save_task_list<S: Store + ?Sized>(store: &mut S, task_list: &TaskList) -> CoreResult<()> {
    task_list.validate()?;
    if store.find_project(task_list.project)?.is_none() {
        return Err(CoreError::validation("project", "Project does not exist"));
    }
    store.write_task_list(task_list)?;
    Ok(())
}

pub fn save_task<S: Store + ?Sized>(store: &mut S, task: &Task) -> CoreResult<()> {
    if task.title.trim().is_empty() {
        return Err(CoreError::validation("title", "Title is required"));
    }
    if store.find_task_list(task.task_list)?.is_none() {
        return Err(CoreError::validation("task_list", "Task list does not exist"));
    }
    if store.find_user(task.assigned_to)?.is_none() {
        return Err(CoreError::validation("assigned_to", "Assignee does not exist"));
    }
    store.write_task(task)?;
    Ok(())
}
