//! Domain entities and embedded value objects.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Privilege level a team holds on a project.
///
/// The declaration order gives the derived total order used for the
/// most-privileged-wins reduction: `Observer < Participant < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access to the project.
    Observer,
    /// Can do everything except invite users.
    Participant,
    /// Invites users to the project and deletes comments.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Observer => "observer",
            Role::Participant => "participant",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "observer" => Ok(Role::Observer),
            "participant" => Ok(Role::Participant),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::validation(
                "role",
                format!("'{other}' is not a valid role"),
            )),
        }
    }
}

/// Lifecycle status of a task. Transitions are deliberately unrestricted:
/// any status may follow any other, including reopening a resolved task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    New,
    InProgress,
    Hold,
    Resolved,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "new",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Hold => "hold",
            TaskStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(TaskStatus::New),
            "in-progress" => Ok(TaskStatus::InProgress),
            "hold" => Ok(TaskStatus::Hold),
            "resolved" => Ok(TaskStatus::Resolved),
            other => Err(CoreError::validation(
                "status",
                format!("'{other}' is not a valid status"),
            )),
        }
    }
}

/// Top-level tenant. The slug is globally unique, case-sensitive as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Reference into the external blob store, if a logo was uploaded.
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Organisation {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            image: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name", "Name is required"));
        }
        if self.slug.trim().is_empty() {
            return Err(CoreError::validation("slug", "Slug is required"));
        }
        Ok(())
    }
}

/// An authenticated account. Authentication itself and the hashing of the
/// credential are the identity collaborator's business; the hash is stored
/// opaquely. A user's organisations are derived from team membership, never
/// stored here (see [`crate::authz::organisations_for_user`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name", "Name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(CoreError::validation("email", "Email is required"));
        }
        Ok(())
    }
}

/// A named group of users, owned by exactly one organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub organisation: Uuid,
    members: Vec<Uuid>,
    pub created_at: NaiveDateTime,
}

impl Team {
    pub fn new(name: impl Into<String>, organisation: Uuid, members: Vec<Uuid>) -> Self {
        let mut team = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            organisation,
            members: Vec::new(),
            created_at: Utc::now().naive_utc(),
        };
        for member in members {
            team.add_member(member);
        }
        team
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name", "Name is required"));
        }
        Ok(())
    }

    /// Membership is a set: adding an existing member is a no-op.
    pub fn add_member(&mut self, user: Uuid) {
        if !self.members.contains(&user) {
            self.members.push(user);
        }
    }

    pub fn remove_member(&mut self, user: Uuid) {
        self.members.retain(|m| *m != user);
    }

    pub fn has_member(&self, user: Uuid) -> bool {
        self.members.contains(&user)
    }

    pub fn members(&self) -> &[Uuid] {
        &self.members
    }

    /// Rebuilds a team from its stored parts. For store implementations.
    pub(crate) fn from_parts(
        id: Uuid,
        name: String,
        organisation: Uuid,
        members: Vec<Uuid>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name,
            organisation,
            members,
            created_at,
        }
    }
}

/// One entry of a project's access control list: a team and the role it
/// grants. Embedded in the project, copied by value, never addressable on
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AclEntry {
    pub team: Uuid,
    pub role: Role,
}

/// A project under an organisation. The slug is unique only within the
/// owning organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub organisation: Uuid,
    pub acl: Vec<AclEntry>,
    pub created_at: NaiveDateTime,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        organisation: Uuid,
        acl: Vec<AclEntry>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            organisation,
            acl,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name", "Name is required"));
        }
        if self.slug.trim().is_empty() {
            return Err(CoreError::validation("slug", "Slug is required"));
        }
        if self.acl.is_empty() {
            return Err(CoreError::validation(
                "acl",
                "A project needs at least one access control entry",
            ));
        }
        Ok(())
    }
}

/// A named list of tasks under a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: Uuid,
    pub name: String,
    pub project: Uuid,
    pub created_at: NaiveDateTime,
}

impl TaskList {
    pub fn new(name: impl Into<String>, project: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            project,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("name", "Name is required"));
        }
        Ok(())
    }
}

/// Immutable audit record of a status or due-date transition on a task.
/// Once appended it is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub message: String,
    pub from_status: TaskStatus,
    pub to_status: TaskStatus,
    pub from_due_date: Option<NaiveDateTime>,
    pub to_due_date: Option<NaiveDateTime>,
    /// References into the external blob store.
    pub attachments: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// A work item under a task list.
///
/// `status` and `due_date` are private: the only way they change is
/// [`Task::record_follow_up`], which appends the audit record in the same
/// step. That keeps the follow-up history an exact account of every
/// transition without relying on caller discipline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    status: TaskStatus,
    due_date: Option<NaiveDateTime>,
    pub assigned_to: Uuid,
    pub watchers: Vec<Uuid>,
    pub task_list: Uuid,
    follow_ups: Vec<FollowUp>,
    pub created_at: NaiveDateTime,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<NaiveDateTime> {
        self.due_date
    }

    pub fn follow_ups(&self) -> &[FollowUp] {
        &self.follow_ups
    }

    /// Applies a status/due-date transition, capturing the prior values as a
    /// delta snapshot. Any transition is legal, including reopening a
    /// resolved task.
    pub fn record_follow_up(
        &mut self,
        message: impl Into<String>,
        to_status: TaskStatus,
        to_due_date: Option<NaiveDateTime>,
        attachments: Vec<String>,
    ) -> &FollowUp {
        let follow_up = FollowUp {
            message: message.into(),
            from_status: self.status,
            to_status,
            from_due_date: self.due_date,
            to_due_date,
            attachments,
            created_at: Utc::now().naive_utc(),
        };
        self.status = to_status;
        self.due_date = to_due_date;
        self.follow_ups.push(follow_up);
        self.follow_ups.last().unwrap()
    }

    /// Total time spent across follow-ups.
    ///
    /// Follow-ups do not record a duration or start/end timestamps, so there
    /// is nothing to sum yet; the aggregate is always zero until the data
    /// model grows those fields.
    pub fn hours(&self) -> chrono::Duration {
        chrono::Duration::zero()
    }

    /// Rebuilds a task from its stored parts. For store implementations;
    /// everything else goes through [`TaskDraft`] and `record_follow_up`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: Uuid,
        title: String,
        status: TaskStatus,
        due_date: Option<NaiveDateTime>,
        assigned_to: Uuid,
        watchers: Vec<Uuid>,
        task_list: Uuid,
        follow_ups: Vec<FollowUp>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title,
            status,
            due_date,
            assigned_to,
            watchers,
            task_list,
            follow_ups,
            created_at,
        }
    }
}

/// Input for a new task. Every required field is optional here so that each
/// omission is reported on its own; `build` turns a complete draft into a
/// [`Task`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDateTime>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub watchers: Vec<Uuid>,
    pub task_list: Option<Uuid>,
}

impl TaskDraft {
    pub fn build(self) -> CoreResult<Task> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(CoreError::validation("title", "Title is required")),
        };
        let status = self
            .status
            .ok_or_else(|| CoreError::validation("status", "Status is required"))?;
        let assigned_to = self
            .assigned_to
            .ok_or_else(|| CoreError::validation("assigned_to", "Assignee is required"))?;
        let task_list = self
            .task_list
            .ok_or_else(|| CoreError::validation("task_list", "Task list is required"))?;

        Ok(Task {
            id: Uuid::new_v4(),
            title,
            status,
            due_date: self.due_date,
            assigned_to,
            watchers: self.watchers,
            task_list,
            follow_ups: Vec::new(),
            created_at: Utc::now().naive_utc(),
        })
    }
}
