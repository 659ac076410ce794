use projecthub_core::db::open_db_in_memory;
use projecthub_core::{
    Account, AccountService, CreatedProject, EditError, EditService, EditServiceError, EditState,
    Project, ProjectId, ProjectService, SqliteAccountRepository, SqliteEditRepository,
    SqliteProjectRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn create_admin(conn: &mut Connection) -> Account {
    let repo = SqliteAccountRepository::try_new(conn).unwrap();
    AccountService::new(repo)
        .create_account("admin", "admin@example.com")
        .unwrap()
}

fn create_project(conn: &mut Connection, name: &str) -> CreatedProject {
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    let mut service = ProjectService::new(repo);
    service.create_project(name, None).unwrap()
}

fn reload(conn: &mut Connection, id: ProjectId) -> Project {
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    ProjectService::new(repo)
        .get_project(id, true)
        .unwrap()
        .unwrap()
}

#[test]
fn undo_fails_with_no_editor() {
    let mut conn = open_db_in_memory().unwrap();
    let created = create_project(&mut conn, "Red");

    {
        let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
        let err = service.do_undo(created.edit.id, None).unwrap_err();
        assert!(err.is_no_editor_account());
        assert!(matches!(err, EditServiceError::Edit(EditError::NoEditorAccount)));
    }

    assert!(!reload(&mut conn, created.project.id).deleted);
}

#[test]
fn undo_works_with_editor() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let created = create_project(&mut conn, "Red");
    assert!(!created.project.deleted);

    {
        let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
        let record = service.do_undo(created.edit.id, Some(admin.id)).unwrap();
        assert!(record.target().deleted);
        assert_eq!(record.state(), EditState::Undone);
    }

    assert!(reload(&mut conn, created.project.id).deleted);
}

#[test]
fn redo_fails_with_no_editor() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let created = create_project(&mut conn, "Red");

    {
        let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
        service.do_undo(created.edit.id, Some(admin.id)).unwrap();

        let err = service.do_redo(created.edit.id, None).unwrap_err();
        assert!(err.is_no_editor_account());

        let edit = service.get_edit(created.edit.id).unwrap().unwrap();
        assert!(edit.undone);
        assert_eq!(edit.undone_by, Some(admin.id));
    }

    assert!(reload(&mut conn, created.project.id).deleted);
}

#[test]
fn redo_works_with_editor() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let created = create_project(&mut conn, "Red");

    {
        let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
        let undone = service.do_undo(created.edit.id, Some(admin.id)).unwrap();
        assert!(undone.target().deleted);
        let redone = service.do_redo(created.edit.id, Some(admin.id)).unwrap();
        assert!(!redone.target().deleted);
        assert_eq!(redone.state(), EditState::Active);
    }

    let project = reload(&mut conn, created.project.id);
    assert!(!project.deleted);
}

#[test]
fn undo_and_redo_can_be_toggled_repeatedly() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let created = create_project(&mut conn, "Blue");

    let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
    for _ in 0..3 {
        service.do_undo(created.edit.id, Some(admin.id)).unwrap();
        service.do_redo(created.edit.id, Some(admin.id)).unwrap();
    }
    let edit = service.get_edit(created.edit.id).unwrap().unwrap();
    assert!(!edit.undone);
    assert_eq!(edit.undone_by, None);
}

#[test]
fn repeated_undo_is_rejected_without_changes() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let created = create_project(&mut conn, "Apple");

    {
        let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
        service.do_undo(created.edit.id, Some(admin.id)).unwrap();
        let err = service
            .do_undo(created.edit.id, Some(admin.id))
            .unwrap_err();
        assert!(matches!(
            err,
            EditServiceError::Edit(EditError::AlreadyUndone(id)) if id == created.edit.id
        ));

        service.do_redo(created.edit.id, Some(admin.id)).unwrap();
        let err = service
            .do_redo(created.edit.id, Some(admin.id))
            .unwrap_err();
        assert!(matches!(err, EditServiceError::Edit(EditError::NotUndone(_))));
    }

    assert!(!reload(&mut conn, created.project.id).deleted);
}

#[test]
fn unknown_editor_account_is_rejected_without_changes() {
    let mut conn = open_db_in_memory().unwrap();
    let created = create_project(&mut conn, "Red");
    let stranger = Uuid::new_v4();

    {
        let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
        let err = service
            .do_undo(created.edit.id, Some(stranger))
            .unwrap_err();
        assert!(matches!(err, EditServiceError::EditorNotFound(id) if id == stranger));
    }

    assert!(!reload(&mut conn, created.project.id).deleted);
}

#[test]
fn unknown_edit_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let missing = Uuid::new_v4();

    let mut service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
    let err = service.do_redo(missing, Some(admin.id)).unwrap_err();
    assert!(matches!(err, EditServiceError::EditNotFound(id) if id == missing));
}

#[test]
fn project_history_lists_create_edit() {
    let mut conn = open_db_in_memory().unwrap();
    let admin = create_admin(&mut conn);
    let created = {
        let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        ProjectService::new(repo)
            .create_project("Red", Some(admin.id))
            .unwrap()
    };

    let service = EditService::new(SqliteEditRepository::try_new(&mut conn).unwrap());
    let edits = service.list_project_edits(created.project.id).unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].id, created.edit.id);
    assert_eq!(edits[0].account_id, Some(admin.id));
    assert_eq!(edits[0].state(), EditState::Active);
}
