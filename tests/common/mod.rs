//! Shared fixtures for the integration suites.
//!
//! Everything runs against [`MemoryStore`], which enforces the same unique
//! indexes as the Postgres schema, so the suites cover the storage-backed
//! behaviour without needing a database.

#![allow(dead_code)]

use once_cell::sync::Lazy;
use uuid::Uuid;

use titan::config::Config;
use titan::models::{AclEntry, Organisation, Project, Role, Team, User};
use titan::persist;
use titan::slug::slugify;
use titan::store::MemoryStore;
use titan::telemetry::init_telemetry;

// Opt into log output with TEST_LOG=1; the subscriber can only be
// installed once per process.
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        init_telemetry(&Config::default_for_testing());
    }
});

pub struct TestApp {
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Lazy::force(&TRACING);
        Self {
            store: MemoryStore::new(),
        }
    }

    pub fn create_user(&mut self, name: &str, email: &str) -> User {
        let user = User::new(name, email, "not-a-real-hash");
        persist::save_user(&mut self.store, &user).expect("failed to create user");
        user
    }

    pub fn create_organisation(&mut self, name: &str) -> Organisation {
        let organisation = Organisation::new(name, slugify(name));
        persist::save_organisation(&mut self.store, &organisation)
            .expect("failed to create organisation");
        organisation
    }

    pub fn create_team(&mut self, name: &str, organisation: Uuid, members: Vec<Uuid>) -> Team {
        let team = Team::new(name, organisation, members);
        persist::save_team(&mut self.store, &team).expect("failed to create team");
        team
    }

    /// Builds a project the way the original fixtures did: an admin team and
    /// a participant team, both containing `user`, wired into the ACL.
    pub fn create_project(
        &mut self,
        user: Uuid,
        name: &str,
        slug: &str,
        organisation: Uuid,
    ) -> Project {
        let admin_team = self.create_team("Admin", organisation, vec![user]);
        let participant_team = self.create_team("Participant", organisation, vec![user]);
        let project = Project::new(
            name,
            slugify(slug),
            organisation,
            vec![
                AclEntry {
                    team: admin_team.id,
                    role: Role::Admin,
                },
                AclEntry {
                    team: participant_team.id,
                    role: Role::Participant,
                },
            ],
        );
        persist::save_project(&mut self.store, &project).expect("failed to create project");
        project
    }
}
