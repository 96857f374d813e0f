//! In-process document store.
//!
//! Backs the test suites and any embedded use of the core. It upholds the
//! same unique indexes the Postgres schema declares, so the storage-level
//! uniqueness guarantees hold regardless of which backend is plugged in.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{Organisation, Project, Task, TaskList, Team, User};

use super::Store;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: HashMap<Uuid, User>,
    organisations: HashMap<Uuid, Organisation>,
    teams: HashMap<Uuid, Team>,
    projects: HashMap<Uuid, Project>,
    task_lists: HashMap<Uuid, TaskList>,
    tasks: HashMap<Uuid, Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organisation_count(&self) -> usize {
        self.organisations.len()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_list_count(&self) -> usize {
        self.task_lists.len()
    }

    /// Seeds a record past the unique index, to model data written before
    /// the index existed. Test-only.
    #[cfg(test)]
    pub(crate) fn seed_organisation_unchecked(&mut self, organisation: &Organisation) {
        self.organisations
            .insert(organisation.id, organisation.clone());
    }

    #[cfg(test)]
    pub(crate) fn seed_project_unchecked(&mut self, project: &Project) {
        self.projects.insert(project.id, project.clone());
    }
}

/// Stable creation order, ties broken by id.
fn sorted<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

impl Store for MemoryStore {
    fn find_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.values().find(|u| u.email == email).cloned())
    }

    fn write_user(&mut self, user: &User) -> Result<(), StorageError> {
        let taken = self
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id);
        if taken {
            return Err(StorageError::UniqueViolation {
                constraint: "users_email_key",
            });
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn find_organisation(&self, id: Uuid) -> Result<Option<Organisation>, StorageError> {
        Ok(self.organisations.get(&id).cloned())
    }

    fn organisations_with_slug(&self, slug: &str) -> Result<Vec<Organisation>, StorageError> {
        let matches: Vec<_> = self
            .organisations
            .values()
            .filter(|o| o.slug == slug)
            .cloned()
            .collect();
        Ok(sorted(matches, |o| (o.created_at, o.id)))
    }

    fn write_organisation(&mut self, organisation: &Organisation) -> Result<(), StorageError> {
        let taken = self
            .organisations
            .values()
            .any(|o| o.slug == organisation.slug && o.id != organisation.id);
        if taken {
            return Err(StorageError::UniqueViolation {
                constraint: "organisations_slug_key",
            });
        }
        self.organisations
            .insert(organisation.id, organisation.clone());
        Ok(())
    }

    fn find_team(&self, id: Uuid) -> Result<Option<Team>, StorageError> {
        Ok(self.teams.get(&id).cloned())
    }

    fn teams_for_user(&self, user: Uuid) -> Result<Vec<Team>, StorageError> {
        let matches: Vec<_> = self
            .teams
            .values()
            .filter(|t| t.has_member(user))
            .cloned()
            .collect();
        Ok(sorted(matches, |t| (t.created_at, t.id)))
    }

    fn teams_in_organisation(&self, organisation: Uuid) -> Result<Vec<Team>, StorageError> {
        let matches: Vec<_> = self
            .teams
            .values()
            .filter(|t| t.organisation == organisation)
            .cloned()
            .collect();
        Ok(sorted(matches, |t| (t.created_at, t.id)))
    }

    fn write_team(&mut self, team: &Team) -> Result<(), StorageError> {
        self.teams.insert(team.id, team.clone());
        Ok(())
    }

    fn find_project(&self, id: Uuid) -> Result<Option<Project>, StorageError> {
        Ok(self.projects.get(&id).cloned())
    }

    fn projects_in_organisation(&self, organisation: Uuid) -> Result<Vec<Project>, StorageError> {
        let matches: Vec<_> = self
            .projects
            .values()
            .filter(|p| p.organisation == organisation)
            .cloned()
            .collect();
        Ok(sorted(matches, |p| (p.created_at, p.id)))
    }

    fn projects_with_slug(
        &self,
        organisation: Uuid,
        slug: &str,
    ) -> Result<Vec<Project>, StorageError> {
        let matches: Vec<_> = self
            .projects
            .values()
            .filter(|p| p.organisation == organisation && p.slug == slug)
            .cloned()
            .collect();
        Ok(sorted(matches, |p| (p.created_at, p.id)))
    }

    fn write_project(&mut self, project: &Project) -> Result<(), StorageError> {
        let taken = self.projects.values().any(|p| {
            p.organisation == project.organisation && p.slug == project.slug && p.id != project.id
        });
        if taken {
            return Err(StorageError::UniqueViolation {
                constraint: "projects_organisation_id_slug_key",
            });
        }
        self.projects.insert(project.id, project.clone());
        Ok(())
    }

    fn find_task_list(&self, id: Uuid) -> Result<Option<TaskList>, StorageError> {
        Ok(self.task_lists.get(&id).cloned())
    }

    fn task_lists_in_project(&self, project: Uuid) -> Result<Vec<TaskList>, StorageError> {
        let matches: Vec<_> = self
            .task_lists
            .values()
            .filter(|l| l.project == project)
            .cloned()
            .collect();
        Ok(sorted(matches, |l| (l.created_at, l.id)))
    }

    fn write_task_list(&mut self, task_list: &TaskList) -> Result<(), StorageError> {
        self.task_lists.insert(task_list.id, task_list.clone());
        Ok(())
    }

    fn find_task(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn tasks_in_list(&self, task_list: Uuid) -> Result<Vec<Task>, StorageError> {
        let matches: Vec<_> = self
            .tasks
            .values()
            .filter(|t| t.task_list == task_list)
            .cloned()
            .collect();
        Ok(sorted(matches, |t| (t.created_at, t.id)))
    }

    fn write_task(&mut self, task: &Task) -> Result<(), StorageError> {
        self.tasks.insert(task.id, task.clone());
        Ok(())
    }
}
