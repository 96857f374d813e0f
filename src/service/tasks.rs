//! Task list and task operations.
//!
//! Reads are open to any member of the owning organisation; writes require
//! at least the participant role on the project — observers are read-only.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{Role, Task, TaskDraft, TaskList, TaskStatus};
use crate::persist;
use crate::service::projects::{self, ProjectView};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskList {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFollowUp {
    pub message: String,
    pub to_status: TaskStatus,
    pub to_due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

fn require_at_least(view: &ProjectView, needed: Role) -> CoreResult<()> {
    if view.role >= Some(needed) {
        Ok(())
    } else {
        Err(CoreError::Forbidden)
    }
}

pub fn create_task_list<S: Store + ?Sized>(
    store: &mut S,
    user: Uuid,
    organisation_slug: &str,
    project_slug: &str,
    request: CreateTaskList,
) -> CoreResult<TaskList> {
    let view = projects::get(store, user, organisation_slug, project_slug)?;
    require_at_least(&view, Role::Participant)?;

    let task_list = TaskList::new(request.name, view.project.id);
    persist::save_task_list(store, &task_list)?;

    info!(
        task_list_id = %task_list.id,
        project_id = %view.project.id,
        created_by = %user,
        "Created task list"
    );
    Ok(task_list)
}

pub fn list_task_lists<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation_slug: &str,
    project_slug: &str,
) -> CoreResult<Vec<TaskList>> {
    let view = projects::get(store, user, organisation_slug, project_slug)?;
    Ok(store.task_lists_in_project(view.project.id)?)
}

pub fn create_task<S: Store + ?Sized>(
    store: &mut S,
    user: Uuid,
    organisation_slug: &str,
    project_slug: &str,
    draft: TaskDraft,
) -> CoreResult<Task> {
    let view = projects::get(store, user, organisation_slug, project_slug)?;
    require_at_least(&view, Role::Participant)?;

    let task = draft.build()?;
    let owning_list = store
        .find_task_list(task.task_list)?
        .ok_or_else(|| CoreError::validation("task_list", "Task list does not exist"))?;
    if owning_list.project != view.project.id {
        return Err(CoreError::validation(
            "task_list",
            "Task list belongs to a different project",
        ));
    }
    persist::save_task(store, &task)?;

    info!(
        task_id = %task.id,
        task_list_id = %task.task_list,
        status = %task.status(),
        created_by = %user,
        "Created task"
    );
    Ok(task)
}

pub fn list_tasks<S: Store + ?Sized>(
    store: &S,
    user: Uuid,
    organisation_slug: &str,
    project_slug: &str,
    task_list: Uuid,
) -> CoreResult<Vec<Task>> {
    let view = projects::get(store, user, organisation_slug, project_slug)?;
    let owning_list = store.find_task_list(task_list)?.ok_or(CoreError::NotFound)?;
    if owning_list.project != view.project.id {
        return Err(CoreError::NotFound);
    }
    Ok(store.tasks_in_list(task_list)?)
}

/// Appends a follow-up to the task, which is also the only way its status
/// or due date ever changes.
pub fn add_follow_up<S: Store + ?Sized>(
    store: &mut S,
    user: Uuid,
    organisation_slug: &str,
    project_slug: &str,
    task_id: Uuid,
    request: NewFollowUp,
) -> CoreResult<Task> {
    let view = projects::get(store, user, organisation_slug, project_slug)?;
    require_at_least(&view, Role::Participant)?;

    let mut task = store.find_task(task_id)?.ok_or(CoreError::NotFound)?;
    let owning_list = store
        .find_task_list(task.task_list)?
        .ok_or(CoreError::NotFound)?;
    if owning_list.project != view.project.id {
        return Err(CoreError::NotFound);
    }

    let from_status = task.status();
    task.record_follow_up(
        request.message,
        request.to_status,
        request.to_due_date,
        request.attachments,
    );
    persist::save_task(store, &task)?;

    info!(
        task_id = %task.id,
        from_status = %from_status,
        to_status = %request.to_status,
        recorded_by = %user,
        "Recorded follow-up"
    );
    Ok(task)
}
