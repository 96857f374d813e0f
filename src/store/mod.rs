//! Persistence collaborator seam.
//!
//! The core talks to its backing store through [`Store`]: targeted finders
//! returning ordered sequences, and raw `write_*` upserts. Every
//! implementation enforces the storage-level unique constraints itself
//! (organisation slug, user email, and the (organisation, slug) pair for
//! projects) and reports a breach as [`StorageError::UniqueViolation`] —
//! the application-level slug pre-flight in [`crate::persist`] is a
//! best-effort courtesy, not the authority.
//!
//! Application code writes organisations and projects only through
//! [`crate::persist`], which layers validation on top of these raw writes.

pub mod memory;
pub mod pg;

use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{Organisation, Project, Task, TaskList, Team, User};

pub use memory::MemoryStore;
pub use pg::{create_db_pool, create_db_pool_with_url, DbPool, PgStore};

pub trait Store {
    fn find_user(&self, id: Uuid) -> Result<Option<User>, StorageError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;
    fn write_user(&mut self, user: &User) -> Result<(), StorageError>;

    fn find_organisation(&self, id: Uuid) -> Result<Option<Organisation>, StorageError>;
    /// All organisations carrying exactly this slug. Normally at most one,
    /// but pre-existing data anomalies can yield more; callers must not
    /// assume a single match.
    fn organisations_with_slug(&self, slug: &str) -> Result<Vec<Organisation>, StorageError>;
    fn write_organisation(&mut self, organisation: &Organisation) -> Result<(), StorageError>;

    fn find_team(&self, id: Uuid) -> Result<Option<Team>, StorageError>;
    /// Fresh read-through: every call re-reads membership, nothing is cached.
    fn teams_for_user(&self, user: Uuid) -> Result<Vec<Team>, StorageError>;
    fn teams_in_organisation(&self, organisation: Uuid) -> Result<Vec<Team>, StorageError>;
    fn write_team(&mut self, team: &Team) -> Result<(), StorageError>;

    fn find_project(&self, id: Uuid) -> Result<Option<Project>, StorageError>;
    fn projects_in_organisation(&self, organisation: Uuid) -> Result<Vec<Project>, StorageError>;
    /// Projects in the organisation carrying exactly this slug; same
    /// multi-match caveat as [`Store::organisations_with_slug`].
    fn projects_with_slug(
        &self,
        organisation: Uuid,
        slug: &str,
    ) -> Result<Vec<Project>, StorageError>;
    fn write_project(&mut self, project: &Project) -> Result<(), StorageError>;

    fn find_task_list(&self, id: Uuid) -> Result<Option<TaskList>, StorageError>;
    fn task_lists_in_project(&self, project: Uuid) -> Result<Vec<TaskList>, StorageError>;
    fn write_task_list(&mut self, task_list: &TaskList) -> Result<(), StorageError>;

    fn find_task(&self, id: Uuid) -> Result<Option<Task>, StorageError>;
    fn tasks_in_list(&self, task_list: Uuid) -> Result<Vec<Task>, StorageError>;
    fn write_task(&mut self, task: &Task) -> Result<(), StorageError>;
}
