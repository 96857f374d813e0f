//! Postgres store backed by diesel with r2d2 pooling.
//!
//! Embedded aggregates (a project's ACL, a task's watchers and follow-ups)
//! live in `Jsonb` columns; everything with its own identity gets a table.
//! The unique indexes declared in the migrations are the final authority on
//! slug and email uniqueness, and a `UniqueViolation` from the database is
//! translated at this boundary so no diesel error types leak upward.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::error::StorageError;
use crate::models::{
    AclEntry, FollowUp, Organisation, Project, Task, TaskList, TaskStatus, Team, User,
};
use crate::schema::{organisations, projects, task_lists, tasks, team_members, teams, users};

use super::Store;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_db_pool(config: &Config) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(&config.database.url);
    r2d2::Pool::builder()
        .max_size(config.database.max_connections)
        .min_idle(Some(config.database.min_connections))
        .connection_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.database.idle_timeout_secs)))
        .build(manager)
        .expect("Failed to create database pool")
}

pub fn create_db_pool_with_url(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(10)
        .min_idle(Some(2))
        .connection_timeout(Duration::from_secs(30))
        .idle_timeout(Some(Duration::from_secs(600)))
        .build(manager)
        .expect("Failed to create database pool")
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Backend(format!("connection pool: {e}")))
    }
}

fn backend(e: diesel::result::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn unique_or_backend(e: diesel::result::Error, constraint: &'static str) -> StorageError {
    if matches!(
        e,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    ) {
        StorageError::UniqueViolation { constraint }
    } else {
        backend(e)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, StorageError> {
    serde_json::to_value(value).map_err(|e| StorageError::Backend(format!("encode: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, StorageError> {
    serde_json::from_value(value).map_err(|e| StorageError::Backend(format!("decode: {e}")))
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: NaiveDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = organisations)]
struct OrganisationRow {
    id: Uuid,
    name: String,
    slug: String,
    image: Option<String>,
    created_at: NaiveDateTime,
}

impl From<OrganisationRow> for Organisation {
    fn from(row: OrganisationRow) -> Self {
        Organisation {
            id: row.id,
            name: row.name,
            slug: row.slug,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = teams)]
struct TeamRow {
    id: Uuid,
    name: String,
    organisation_id: Uuid,
    created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = team_members)]
struct NewTeamMember {
    team_id: Uuid,
    user_id: Uuid,
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
struct ProjectRow {
    id: Uuid,
    name: String,
    slug: String,
    organisation_id: Uuid,
    acl: Value,
    created_at: NaiveDateTime,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StorageError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let acl: Vec<AclEntry> = from_json(row.acl)?;
        Ok(Project {
            id: row.id,
            name: row.name,
            slug: row.slug,
            organisation: row.organisation_id,
            acl,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_lists)]
struct TaskListRow {
    id: Uuid,
    name: String,
    project_id: Uuid,
    created_at: NaiveDateTime,
}

impl From<TaskListRow> for TaskList {
    fn from(row: TaskListRow) -> Self {
        TaskList {
            id: row.id,
            name: row.name,
            project: row.project_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
struct TaskRow {
    id: Uuid,
    title: String,
    status: String,
    due_date: Option<NaiveDateTime>,
    assigned_to: Uuid,
    watchers: Value,
    task_list_id: Uuid,
    follow_ups: Value,
    created_at: NaiveDateTime,
}

impl TryFrom<TaskRow> for Task {
    type Error = StorageError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::from_str(&row.status)
            .map_err(|_| StorageError::Backend(format!("unknown task status '{}'", row.status)))?;
        let watchers: Vec<Uuid> = from_json(row.watchers)?;
        let follow_ups: Vec<FollowUp> = from_json(row.follow_ups)?;
        Ok(Task::from_parts(
            row.id,
            row.title,
            status,
            row.due_date,
            row.assigned_to,
            watchers,
            row.task_list_id,
            follow_ups,
            row.created_at,
        ))
    }
}

fn load_team(conn: &mut PgConnection, row: TeamRow) -> Result<Team, StorageError> {
    let members: Vec<Uuid> = team_members::table
        .filter(team_members::team_id.eq(row.id))
        .order(team_members::created_at.asc())
        .select(team_members::user_id)
        .load(conn)
        .map_err(backend)?;
    Ok(Team::from_parts(
        row.id,
        row.name,
        row.organisation_id,
        members,
        row.created_at,
    ))
}

impl Store for PgStore {
    fn find_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let mut conn = self.conn()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)
            .map(|row| row.map(User::from))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let mut conn = self.conn()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)
            .map(|row| row.map(User::from))
    }

    fn write_user(&mut self, user: &User) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let row = UserRow {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .map_err(|e| unique_or_backend(e, "users_email_key"))?;
        Ok(())
    }

    fn find_organisation(&self, id: Uuid) -> Result<Option<Organisation>, StorageError> {
        let mut conn = self.conn()?;
        organisations::table
            .find(id)
            .select(OrganisationRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)
            .map(|row| row.map(Organisation::from))
    }

    fn organisations_with_slug(&self, slug: &str) -> Result<Vec<Organisation>, StorageError> {
        let mut conn = self.conn()?;
        let rows: Vec<OrganisationRow> = organisations::table
            .filter(organisations::slug.eq(slug))
            .order(organisations::created_at.asc())
            .select(OrganisationRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        Ok(rows.into_iter().map(Organisation::from).collect())
    }

    fn write_organisation(&mut self, organisation: &Organisation) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let row = OrganisationRow {
            id: organisation.id,
            name: organisation.name.clone(),
            slug: organisation.slug.clone(),
            image: organisation.image.clone(),
            created_at: organisation.created_at,
        };
        diesel::insert_into(organisations::table)
            .values(&row)
            .on_conflict(organisations::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .map_err(|e| unique_or_backend(e, "organisations_slug_key"))?;
        Ok(())
    }

    fn find_team(&self, id: Uuid) -> Result<Option<Team>, StorageError> {
        let mut conn = self.conn()?;
        let row: Option<TeamRow> = teams::table
            .find(id)
            .select(TeamRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)?;
        row.map(|r| load_team(&mut conn, r)).transpose()
    }

    fn teams_for_user(&self, user: Uuid) -> Result<Vec<Team>, StorageError> {
        let mut conn = self.conn()?;
        let team_ids: Vec<Uuid> = team_members::table
            .filter(team_members::user_id.eq(user))
            .select(team_members::team_id)
            .load(&mut conn)
            .map_err(backend)?;
        let rows: Vec<TeamRow> = teams::table
            .filter(teams::id.eq_any(team_ids))
            .order(teams::created_at.asc())
            .select(TeamRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        rows.into_iter().map(|r| load_team(&mut conn, r)).collect()
    }

    fn teams_in_organisation(&self, organisation: Uuid) -> Result<Vec<Team>, StorageError> {
        let mut conn = self.conn()?;
        let rows: Vec<TeamRow> = teams::table
            .filter(teams::organisation_id.eq(organisation))
            .order(teams::created_at.asc())
            .select(TeamRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        rows.into_iter().map(|r| load_team(&mut conn, r)).collect()
    }

    fn write_team(&mut self, team: &Team) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let row = TeamRow {
            id: team.id,
            name: team.name.clone(),
            organisation_id: team.organisation,
            created_at: team.created_at,
        };
        let members: Vec<NewTeamMember> = team
            .members()
            .iter()
            .map(|user_id| NewTeamMember {
                team_id: team.id,
                user_id: *user_id,
            })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(teams::table)
                .values(&row)
                .on_conflict(teams::id)
                .do_update()
                .set(&row)
                .execute(conn)?;
            diesel::delete(team_members::table.filter(team_members::team_id.eq(team.id)))
                .execute(conn)?;
            diesel::insert_into(team_members::table)
                .values(&members)
                .execute(conn)?;
            Ok(())
        })
        .map_err(backend)
    }

    fn find_project(&self, id: Uuid) -> Result<Option<Project>, StorageError> {
        let mut conn = self.conn()?;
        let row: Option<ProjectRow> = projects::table
            .find(id)
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)?;
        row.map(Project::try_from).transpose()
    }

    fn projects_in_organisation(&self, organisation: Uuid) -> Result<Vec<Project>, StorageError> {
        let mut conn = self.conn()?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::organisation_id.eq(organisation))
            .order(projects::created_at.asc())
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        rows.into_iter().map(Project::try_from).collect()
    }

    fn projects_with_slug(
        &self,
        organisation: Uuid,
        slug: &str,
    ) -> Result<Vec<Project>, StorageError> {
        let mut conn = self.conn()?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::organisation_id.eq(organisation))
            .filter(projects::slug.eq(slug))
            .order(projects::created_at.asc())
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        rows.into_iter().map(Project::try_from).collect()
    }

    fn write_project(&mut self, project: &Project) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let row = ProjectRow {
            id: project.id,
            name: project.name.clone(),
            slug: project.slug.clone(),
            organisation_id: project.organisation,
            acl: to_json(&project.acl)?,
            created_at: project.created_at,
        };
        diesel::insert_into(projects::table)
            .values(&row)
            .on_conflict(projects::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .map_err(|e| unique_or_backend(e, "projects_organisation_id_slug_key"))?;
        Ok(())
    }

    fn find_task_list(&self, id: Uuid) -> Result<Option<TaskList>, StorageError> {
        let mut conn = self.conn()?;
        task_lists::table
            .find(id)
            .select(TaskListRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)
            .map(|row| row.map(TaskList::from))
    }

    fn task_lists_in_project(&self, project: Uuid) -> Result<Vec<TaskList>, StorageError> {
        let mut conn = self.conn()?;
        let rows: Vec<TaskListRow> = task_lists::table
            .filter(task_lists::project_id.eq(project))
            .order(task_lists::created_at.asc())
            .select(TaskListRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        Ok(rows.into_iter().map(TaskList::from).collect())
    }

    fn write_task_list(&mut self, task_list: &TaskList) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let row = TaskListRow {
            id: task_list.id,
            name: task_list.name.clone(),
            project_id: task_list.project,
            created_at: task_list.created_at,
        };
        diesel::insert_into(task_lists::table)
            .values(&row)
            .on_conflict(task_lists::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .map_err(backend)?;
        Ok(())
    }

    fn find_task(&self, id: Uuid) -> Result<Option<Task>, StorageError> {
        let mut conn = self.conn()?;
        let row: Option<TaskRow> = tasks::table
            .find(id)
            .select(TaskRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(backend)?;
        row.map(Task::try_from).transpose()
    }

    fn tasks_in_list(&self, task_list: Uuid) -> Result<Vec<Task>, StorageError> {
        let mut conn = self.conn()?;
        let rows: Vec<TaskRow> = tasks::table
            .filter(tasks::task_list_id.eq(task_list))
            .order(tasks::created_at.asc())
            .select(TaskRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;
        rows.into_iter().map(Task::try_from).collect()
    }

    fn write_task(&mut self, task: &Task) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let row = TaskRow {
            id: task.id,
            title: task.title.clone(),
            status: task.status().to_string(),
            due_date: task.due_date(),
            assigned_to: task.assigned_to,
            watchers: to_json(&task.watchers)?,
            task_list_id: task.task_list,
            follow_ups: to_json(&task.follow_ups())?,
            created_at: task.created_at,
        };
        diesel::insert_into(tasks::table)
            .values(&row)
            .on_conflict(tasks::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .map_err(backend)?;
        Ok(())
    }
}
