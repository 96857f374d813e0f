mod common;

use common::TestApp;

use titan::error::CoreError;
use titan::models::{AclEntry, Project, Role};
use titan::pagination::PaginationParams;
use titan::persist;
use titan::service::projects::{self, CreateProject};

fn request(name: &str, slug: &str, team: Option<uuid::Uuid>) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        slug: slug.to_string(),
        team,
    }
}

#[test]
fn create_project_grants_the_nominated_team_admin() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    let team = app.create_team("Developers", organisation.id, vec![alice.id]);

    let view = projects::create(
        &mut app.store,
        alice.id,
        "open-labs",
        request("Titan", "titan", Some(team.id)),
    )
    .expect("creation should succeed");

    assert_eq!(view.role, Some(Role::Admin));
    assert_eq!(
        view.project.acl,
        vec![AclEntry {
            team: team.id,
            role: Role::Admin,
        }]
    );
}

#[test]
fn create_project_requires_a_team() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    app.create_team("Developers", organisation.id, vec![alice.id]);

    match projects::create(
        &mut app.store,
        alice.id,
        "open-labs",
        request("Titan", "titan", None),
    ) {
        Err(CoreError::Validation { field, .. }) => assert_eq!(field, "team"),
        other => panic!("expected team validation error, got {other:?}"),
    }
}

#[test]
fn create_project_rejects_a_team_the_requester_is_outside_of() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let bob = app.create_user("Bob", "bob@example.com");
    let organisation = app.create_organisation("Open Labs");
    app.create_team("Developers", organisation.id, vec![alice.id]);
    let managers = app.create_team("Managers", organisation.id, vec![bob.id]);

    // Alice is an organisation member but not in the nominated team.
    assert!(matches!(
        projects::create(
            &mut app.store,
            alice.id,
            "open-labs",
            request("Titan", "titan", Some(managers.id)),
        ),
        Err(CoreError::Forbidden)
    ));
}

#[test]
fn create_project_rejects_a_team_from_another_organisation() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    app.create_team("Developers", organisation.id, vec![alice.id]);

    let elsewhere = app.create_organisation("Other Labs");
    let foreign = app.create_team("Developers", elsewhere.id, vec![alice.id]);

    assert!(matches!(
        projects::create(
            &mut app.store,
            alice.id,
            "open-labs",
            request("Titan", "titan", Some(foreign.id)),
        ),
        Err(CoreError::NotFound)
    ));
}

#[test]
fn create_project_under_an_invisible_organisation_is_not_found() {
    let mut app = TestApp::new();
    let mallory = app.create_user("Mallory", "mallory@example.com");
    let organisation = app.create_organisation("Open Labs");
    let team = app.create_team("Developers", organisation.id, Vec::new());

    assert!(matches!(
        projects::create(
            &mut app.store,
            mallory.id,
            "open-labs",
            request("Titan", "titan", Some(team.id)),
        ),
        Err(CoreError::NotFound)
    ));
}

#[test]
fn project_slugs_are_unique_per_organisation() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    app.create_project(alice.id, "Titan", "titan", organisation.id);

    let team = app.create_team("Second", organisation.id, vec![alice.id]);
    match projects::create(
        &mut app.store,
        alice.id,
        "open-labs",
        request("Titan Again", "titan", Some(team.id)),
    ) {
        Err(CoreError::DuplicateSlug { slug }) => assert_eq!(slug, "titan"),
        other => panic!("expected duplicate slug error, got {other:?}"),
    }
}

#[test]
fn the_same_project_slug_can_live_in_two_organisations() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");

    let first = app.create_organisation("Open Labs");
    let second = app.create_organisation("Other Labs");
    app.create_project(alice.id, "Titan", "titan", first.id);
    let project = app.create_project(alice.id, "Titan", "titan", second.id);

    assert_eq!(project.slug, "titan");
    assert_eq!(project.organisation, second.id);
}

#[test]
fn updating_a_project_keeps_its_own_slug() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    let mut project = app.create_project(alice.id, "Titan", "titan", organisation.id);

    project.name = "Titan Tracker".to_string();
    persist::save_project(&mut app.store, &project).expect("self-update should succeed");

    app.create_project(alice.id, "Ares", "ares", organisation.id);
    project.slug = "ares".to_string();
    match persist::save_project(&mut app.store, &project) {
        Err(CoreError::DuplicateSlug { slug }) => assert_eq!(slug, "ares"),
        other => panic!("expected duplicate slug error, got {other:?}"),
    }
}

#[test]
fn slug_availability_is_scoped_to_the_organisation() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let first = app.create_organisation("Open Labs");
    let second = app.create_organisation("Other Labs");
    app.create_project(alice.id, "Titan", "titan", first.id);
    app.create_team("Developers", second.id, vec![alice.id]);

    assert!(!projects::slug_available(&app.store, alice.id, "open-labs", "titan").unwrap());
    assert!(projects::slug_available(&app.store, alice.id, "open-labs", "ares").unwrap());
    assert!(projects::slug_available(&app.store, alice.id, "other-labs", "titan").unwrap());

    // The organisation itself has to be visible before slugs can be probed.
    let mallory = app.create_user("Mallory", "mallory@example.com");
    assert!(matches!(
        projects::slug_available(&app.store, mallory.id, "open-labs", "titan"),
        Err(CoreError::NotFound)
    ));
}

#[test]
fn get_returns_the_project_with_the_callers_role() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    let project = app.create_project(alice.id, "Titan", "titan", organisation.id);

    let view = projects::get(&app.store, alice.id, "open-labs", "titan")
        .expect("member should see the project");
    assert_eq!(view.project.id, project.id);
    // Alice sits in both the admin and the participant team; the higher
    // role wins.
    assert_eq!(view.role, Some(Role::Admin));

    assert!(matches!(
        projects::get(&app.store, alice.id, "open-labs", "no-such-project"),
        Err(CoreError::NotFound)
    ));
}

#[test]
fn list_annotates_each_project_with_the_callers_role() {
    let mut app = TestApp::new();
    let alice = app.create_user("Alice", "alice@example.com");
    let organisation = app.create_organisation("Open Labs");
    let reachable = app.create_project(alice.id, "Titan", "titan", organisation.id);

    // A second project whose ACL does not reach alice: she still sees it as
    // an organisation member, but holds no role on it.
    let others = app.create_team("Others", organisation.id, Vec::new());
    let unreachable = Project::new(
        "Ares",
        "ares",
        organisation.id,
        vec![AclEntry {
            team: others.id,
            role: Role::Admin,
        }],
    );
    persist::save_project(&mut app.store, &unreachable).expect("save should succeed");

    let listed = projects::list(
        &app.store,
        alice.id,
        "open-labs",
        &PaginationParams::default(),
    )
    .expect("list should succeed");

    assert_eq!(listed.pagination.total_count, 2);
    let roles: Vec<(uuid::Uuid, Option<Role>)> = listed
        .data
        .iter()
        .map(|view| (view.project.id, view.role))
        .collect();
    assert!(roles.contains(&(reachable.id, Some(Role::Admin))));
    assert!(roles.contains(&(unreachable.id, None)));
}
