//! Integration tests for soft delete, restore, cascade and hard delete.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Soft-deleted rows are hidden from `find_by_id` and list queries
//! - Restoring a soft-deleted row makes it visible again
//! - Unique columns are only unique among live rows
//! - Soft-deleting a parent applies the delete policy to its dependents
//! - Hard deletes fall through to the storage foreign-key actions

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use taskforge_core::types::{DbId, Timestamp};
use taskforge_db::models::comment::CreateComment;
use taskforge_db::models::notification::CreateNotification;
use taskforge_db::models::project::CreateProject;
use taskforge_db::models::status::NotificationType;
use taskforge_db::models::task::CreateTask;
use taskforge_db::models::team::CreateTeam;
use taskforge_db::models::time_entry::CreateTimeEntry;
use taskforge_db::models::user::CreateUser;
use taskforge_db::repositories::{
    CommentRepo, NotificationRepo, ProjectRepo, TaskRepo, TeamRepo, TimeEntryRepo, UserRepo,
};
use taskforge_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password: "correct horse".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        is_active: None,
    }
}

fn new_project(team_id: Option<DbId>, name: &str) -> CreateProject {
    CreateProject {
        team_id,
        name: name.to_string(),
        description: None,
        status: None,
        start_date: at(1),
        end_date: Some(at(20)),
    }
}

fn new_task(project_id: Option<DbId>, assignee_id: Option<DbId>, title: &str) -> CreateTask {
    CreateTask {
        project_id,
        assignee_id,
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        due_date: Some(Utc::now() + Duration::days(7)),
        metadata: None,
    }
}

fn new_time_entry(user_id: DbId, task_id: DbId) -> CreateTimeEntry {
    CreateTimeEntry {
        user_id,
        task_id,
        start_time: at(2),
        end_time: Some(at(2) + Duration::hours(2)),
        duration: None,
        description: None,
        is_manual_entry: None,
    }
}

/// A team with one project holding one task.
async fn seed_team_tree(pool: &PgPool) -> (DbId, DbId, DbId) {
    let team = TeamRepo::create(pool, &CreateTeam {
        name: "Platform".to_string(),
        description: None,
    })
    .await
    .unwrap();
    let project = ProjectRepo::create(pool, &new_project(Some(team.id), "Billing"))
        .await
        .unwrap();
    let task = TaskRepo::create(pool, &new_task(Some(project.id), None, "Invoice export"))
        .await
        .unwrap();
    (team.id, project.id, task.id)
}

// ---------------------------------------------------------------------------
// Test: soft delete hides, restore reveals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_hides_user(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("hidden@example.com"))
        .await
        .unwrap();

    assert!(UserRepo::soft_delete(&pool, user.id).await.unwrap());

    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
    assert!(UserRepo::find_by_email(&pool, "hidden@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(!UserRepo::list(&pool).await.unwrap().iter().any(|u| u.id == user.id));

    let raw = UserRepo::find_by_id_include_deleted(&pool, user.id)
        .await
        .unwrap()
        .expect("soft-deleted row should still exist");
    assert!(raw.deleted_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_is_idempotent(pool: PgPool) {
    let (_, project_id, _) = seed_team_tree(&pool).await;

    assert!(ProjectRepo::soft_delete(&pool, project_id).await.unwrap());
    assert!(
        !ProjectRepo::soft_delete(&pool, project_id).await.unwrap(),
        "second soft_delete should return false"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_makes_visible_again(pool: PgPool) {
    let (_, project_id, _) = seed_team_tree(&pool).await;

    ProjectRepo::soft_delete(&pool, project_id).await.unwrap();
    assert!(ProjectRepo::find_by_id(&pool, project_id).await.unwrap().is_none());

    assert!(ProjectRepo::restore(&pool, project_id).await.unwrap());
    let restored = ProjectRepo::find_by_id(&pool, project_id)
        .await
        .unwrap()
        .expect("restored project should be visible");
    assert!(restored.deleted_at.is_none());

    assert!(
        !ProjectRepo::restore(&pool, project_id).await.unwrap(),
        "restoring a live row should return false"
    );
}

// ---------------------------------------------------------------------------
// Test: uniqueness only among live rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_reusable_after_soft_delete(pool: PgPool) {
    let first = UserRepo::create(&pool, &new_user("reuse@example.com"))
        .await
        .unwrap();
    UserRepo::soft_delete(&pool, first.id).await.unwrap();

    let second = UserRepo::create(&pool, &new_user("reuse@example.com"))
        .await
        .expect("email of a soft-deleted user should be reusable");
    assert_ne!(first.id, second.id);

    // Restoring the first would produce two live rows with the same email.
    let err = UserRepo::restore(&pool, first.id).await.unwrap_err();
    let err = DbError::from(err);
    assert!(err.is_unique_violation());
    assert_eq!(err.constraint(), Some("uq_users_email"));
}

// ---------------------------------------------------------------------------
// Test: cascade on soft delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_team_soft_delete_cascades_to_projects_and_tasks(pool: PgPool) {
    let (team_id, project_id, task_id) = seed_team_tree(&pool).await;
    let user = UserRepo::create(&pool, &new_user("member@example.com"))
        .await
        .unwrap();
    TeamRepo::add_member(&pool, team_id, user.id).await.unwrap();
    let entry = TimeEntryRepo::create(&pool, &new_time_entry(user.id, task_id))
        .await
        .unwrap();
    let comment = CommentRepo::create(&pool, &CreateComment {
        user_id: user.id,
        task_id,
        content: "Needs a CSV option".to_string(),
    })
    .await
    .unwrap();

    assert!(TeamRepo::soft_delete(&pool, team_id).await.unwrap());

    assert!(TeamRepo::find_by_id(&pool, team_id).await.unwrap().is_none());
    assert!(ProjectRepo::find_by_id(&pool, project_id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, task_id).await.unwrap().is_none());
    assert!(TimeEntryRepo::find_by_id(&pool, entry.id).await.unwrap().is_none());
    assert!(CommentRepo::find_by_id(&pool, comment.id).await.unwrap().is_none());

    // Rows are kept, only stamped.
    let task = TaskRepo::find_by_id_include_deleted(&pool, task_id)
        .await
        .unwrap()
        .expect("cascaded task should still exist");
    assert!(task.deleted_at.is_some());

    // Memberships are removed; the user is untouched.
    assert!(TeamRepo::list_teams_for_user(&pool, user.id).await.unwrap().is_empty());
    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_does_not_resurrect_cascaded_children(pool: PgPool) {
    let (team_id, project_id, _) = seed_team_tree(&pool).await;

    TeamRepo::soft_delete(&pool, team_id).await.unwrap();
    TeamRepo::restore(&pool, team_id).await.unwrap();

    assert!(TeamRepo::find_by_id(&pool, team_id).await.unwrap().is_some());
    assert!(ProjectRepo::find_by_id(&pool, project_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignee_soft_delete_unassigns_task(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("assignee@example.com"))
        .await
        .unwrap();
    let task = TaskRepo::create(&pool, &new_task(None, Some(user.id), "Orphan-proof"))
        .await
        .unwrap();
    assert_eq!(task.assignee_id, Some(user.id));

    UserRepo::soft_delete(&pool, user.id).await.unwrap();

    let task = TaskRepo::find_by_id(&pool, task.id)
        .await
        .unwrap()
        .expect("task should survive its assignee");
    assert_eq!(task.assignee_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_soft_delete_removes_notifications(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("notified@example.com"))
        .await
        .unwrap();
    NotificationRepo::create(&pool, &CreateNotification {
        user_id: user.id,
        title: "Welcome".to_string(),
        message: "Your account is ready".to_string(),
        notification_type: NotificationType::System,
        related_id: None,
        payload: None,
    })
    .await
    .unwrap();
    assert_eq!(NotificationRepo::unread_count(&pool, user.id).await.unwrap(), 1);

    UserRepo::soft_delete(&pool, user.id).await.unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, user.id).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: hard delete uses storage foreign-key actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_project_removes_tasks(pool: PgPool) {
    let (_, project_id, task_id) = seed_team_tree(&pool).await;

    assert!(ProjectRepo::hard_delete(&pool, project_id).await.unwrap());

    assert!(ProjectRepo::find_by_id_include_deleted(&pool, project_id)
        .await
        .unwrap()
        .is_none());
    assert!(TaskRepo::find_by_id_include_deleted(&pool, task_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_assignee_nulls_task(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("gone@example.com"))
        .await
        .unwrap();
    let task = TaskRepo::create(&pool, &new_task(None, Some(user.id), "Still here"))
        .await
        .unwrap();

    assert!(UserRepo::hard_delete(&pool, user.id).await.unwrap());

    let task = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task.assignee_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_soft_deleted_row(pool: PgPool) {
    let (team_id, _, _) = seed_team_tree(&pool).await;

    TeamRepo::soft_delete(&pool, team_id).await.unwrap();
    assert!(
        TeamRepo::hard_delete(&pool, team_id).await.unwrap(),
        "hard_delete should remove soft-deleted rows too"
    );
    assert!(TeamRepo::find_by_id_include_deleted(&pool, team_id)
        .await
        .unwrap()
        .is_none());
}
