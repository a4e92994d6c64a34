//! Integration tests for write-time validation.
//!
//! Invalid records must be rejected before they reach storage, and storage
//! constraint violations must be classifiable by the caller.

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use taskforge_core::error::CoreError;
use taskforge_core::password::verify_password;
use taskforge_core::types::{DbId, Timestamp};
use taskforge_db::models::project::{CreateProject, UpdateProject};
use taskforge_db::models::role::CreateRole;
use taskforge_db::models::status::{ProjectStatus, TaskPriority, TaskStatus};
use taskforge_db::models::task::{CreateTask, UpdateTask};
use taskforge_db::models::time_entry::{CreateTimeEntry, UpdateTimeEntry};
use taskforge_db::models::user::{ChangePassword, CreateUser};
use taskforge_db::repositories::{ProjectRepo, RoleRepo, TaskRepo, TimeEntryRepo, UserRepo};
use taskforge_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 4, day, hour, 0, 0).unwrap()
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password: "s3cret!".to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        is_active: None,
    }
}

fn new_project(start_date: Timestamp, end_date: Option<Timestamp>) -> CreateProject {
    CreateProject {
        team_id: None,
        name: "Compiler".to_string(),
        description: None,
        status: None,
        start_date,
        end_date,
    }
}

fn new_task(due_date: Option<Timestamp>) -> CreateTask {
    CreateTask {
        project_id: None,
        assignee_id: None,
        title: "Write the linker".to_string(),
        description: None,
        status: None,
        priority: None,
        due_date,
        metadata: None,
    }
}

async fn seed_task(pool: &PgPool) -> (DbId, DbId) {
    let user = UserRepo::create(pool, &new_user("tracker@example.com"))
        .await
        .unwrap();
    let task = TaskRepo::create(pool, &new_task(None)).await.unwrap();
    (user.id, task.id)
}

fn new_entry(
    user_id: DbId,
    task_id: DbId,
    start_time: Timestamp,
    end_time: Option<Timestamp>,
) -> CreateTimeEntry {
    CreateTimeEntry {
        user_id,
        task_id,
        start_time,
        end_time,
        duration: None,
        description: None,
        is_manual_entry: None,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_defaults_and_hashed_password(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("grace@example.com"))
        .await
        .unwrap();

    assert!(user.is_active);
    assert!(user.last_login.is_none());
    assert_ne!(user.password_hash, "s3cret!");
    assert!(verify_password("s3cret!", &user.password_hash).unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_email_rejected(pool: PgPool) {
    let err = UserRepo::create(&pool, &new_user("not-an-email"))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Validation(_)));
    assert!(UserRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_short_password_rejected(pool: PgPool) {
    let mut input = new_user("short@example.com");
    input.password = "12345".to_string();
    let err = UserRepo::create(&pool, &input).await.unwrap_err();
    assert!(err.is_validation());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_rejected(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup@example.com"))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user("dup@example.com"))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(err.constraint(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_password_and_record_login(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("rotate@example.com"))
        .await
        .unwrap();

    let changed = UserRepo::set_password(&pool, user.id, &ChangePassword {
        password: "n3w-passw0rd".to_string(),
    })
    .await
    .unwrap();
    assert!(changed);
    assert!(UserRepo::record_login(&pool, user.id).await.unwrap());

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(verify_password("n3w-passw0rd", &user.password_hash).unwrap());
    assert!(!verify_password("s3cret!", &user.password_hash).unwrap());
    assert!(user.last_login.is_some());
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_defaults_to_active(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project(at(1, 9), None))
        .await
        .unwrap();
    assert_eq!(project.status, ProjectStatus::Active);
    assert!(project.end_date.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_end_before_start_rejected(pool: PgPool) {
    let err = ProjectRepo::create(&pool, &new_project(at(10, 9), Some(at(5, 9))))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Validation(ref msg)) if msg.contains("end_date"));

    let err = ProjectRepo::create(&pool, &new_project(at(10, 9), Some(at(10, 9))))
        .await
        .unwrap_err();
    assert!(err.is_validation(), "equal dates should be rejected");

    assert!(ProjectRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_update_checks_merged_dates(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project(at(10, 9), Some(at(20, 9))))
        .await
        .unwrap();

    // Moving the start past the stored end is rejected.
    let err = ProjectRepo::update(&pool, project.id, &UpdateProject {
        start_date: Some(at(25, 9)),
        ..Default::default()
    })
    .await
    .unwrap_err();
    assert!(err.is_validation());

    // Extending the end is fine.
    let updated = ProjectRepo::update(&pool, project.id, &UpdateProject {
        end_date: Some(at(28, 9)),
        status: Some(ProjectStatus::Completed),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.end_date, Some(at(28, 9)));
    assert_eq!(updated.status, ProjectStatus::Completed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_end_date_can_be_cleared(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project(at(1, 9), Some(at(2, 9))))
        .await
        .unwrap();

    // A plain `None` leaves the stored value alone.
    let untouched = ProjectRepo::update(&pool, project.id, &UpdateProject {
        end_date: None,
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(untouched.end_date, Some(at(2, 9)));

    let cleared = ProjectRepo::update(&pool, project.id, &UpdateProject {
        clear_end_date: true,
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.end_date, None);

    // With no end date, any start is accepted.
    let moved = ProjectRepo::update(&pool, project.id, &UpdateProject {
        start_date: Some(at(25, 9)),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(moved.start_date, at(25, 9));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_clear_and_set_end_date_rejected(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project(at(1, 9), Some(at(2, 9))))
        .await
        .unwrap();

    let err = ProjectRepo::update(&pool, project.id, &UpdateProject {
        end_date: Some(at(3, 9)),
        clear_end_date: true,
        ..Default::default()
    })
    .await
    .unwrap_err();
    assert!(err.is_validation());

    let stored = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(stored.end_date, Some(at(2, 9)));
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_defaults(pool: PgPool) {
    let task = TaskRepo::create(&pool, &new_task(None)).await.unwrap();
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.metadata, serde_json::json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_past_due_date_rejected(pool: PgPool) {
    let err = TaskRepo::create(&pool, &new_task(Some(Utc::now() - Duration::days(1))))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Validation(ref msg)) if msg.contains("due_date"));
    assert!(TaskRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_update_past_due_date_rejected(pool: PgPool) {
    let task = TaskRepo::create(&pool, &new_task(Some(Utc::now() + Duration::days(3))))
        .await
        .unwrap();

    let err = TaskRepo::update(&pool, task.id, &UpdateTask {
        due_date: Some(Utc::now() - Duration::hours(1)),
        ..Default::default()
    })
    .await
    .unwrap_err();
    assert!(err.is_validation());

    let updated = TaskRepo::update(&pool, task.id, &UpdateTask {
        status: Some(TaskStatus::InProgress),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_due_date_can_be_cleared(pool: PgPool) {
    let task = TaskRepo::create(&pool, &new_task(Some(Utc::now() + Duration::days(3))))
        .await
        .unwrap();
    assert!(task.due_date.is_some());

    let err = TaskRepo::update(&pool, task.id, &UpdateTask {
        due_date: Some(Utc::now() + Duration::days(5)),
        clear_due_date: true,
        ..Default::default()
    })
    .await
    .unwrap_err();
    assert!(err.is_validation());

    let cleared = TaskRepo::update(&pool, task.id, &UpdateTask {
        clear_due_date: true,
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.due_date, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_assign_and_list_by_assignee(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("dev@example.com"))
        .await
        .unwrap();
    let task = TaskRepo::create(&pool, &new_task(None)).await.unwrap();

    TaskRepo::assign(&pool, task.id, Some(user.id)).await.unwrap();
    let assigned = TaskRepo::list_by_assignee(&pool, user.id, None).await.unwrap();
    assert_eq!(assigned.len(), 1);
    let done = TaskRepo::list_by_assignee(&pool, user.id, Some(TaskStatus::Completed))
        .await
        .unwrap();
    assert!(done.is_empty());

    let unassigned = TaskRepo::assign(&pool, task.id, None).await.unwrap().unwrap();
    assert_eq!(unassigned.assignee_id, None);
}

// ---------------------------------------------------------------------------
// Time entries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_end_not_after_start_rejected(pool: PgPool) {
    let (user_id, task_id) = seed_task(&pool).await;

    let err = TimeEntryRepo::create(&pool, &new_entry(user_id, task_id, at(3, 10), Some(at(3, 9))))
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::Validation(ref msg)) if msg.contains("end_time"));

    let err = TimeEntryRepo::create(&pool, &new_entry(user_id, task_id, at(3, 10), Some(at(3, 10))))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(TimeEntryRepo::list_by_task(&pool, task_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_duration_derived(pool: PgPool) {
    let (user_id, task_id) = seed_task(&pool).await;

    let entry = TimeEntryRepo::create(&pool, &new_entry(user_id, task_id, at(3, 9), Some(at(3, 11))))
        .await
        .unwrap();
    assert_eq!(entry.duration, 7200);
    assert!(!entry.is_manual_entry);

    let total = TimeEntryRepo::total_duration_for_task(&pool, task_id)
        .await
        .unwrap();
    assert_eq!(total, 7200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_stop(pool: PgPool) {
    let (user_id, task_id) = seed_task(&pool).await;

    let running = TimeEntryRepo::create(&pool, &new_entry(user_id, task_id, at(4, 9), None))
        .await
        .unwrap();
    assert_eq!(running.duration, 0);

    let err = TimeEntryRepo::stop(&pool, running.id, at(4, 8)).await.unwrap_err();
    assert!(err.is_validation());

    let stopped = TimeEntryRepo::stop(&pool, running.id, at(4, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stopped.end_time, Some(at(4, 10)));
    assert_eq!(stopped.duration, 3600);

    assert!(
        TimeEntryRepo::stop(&pool, running.id, at(4, 12)).await.unwrap().is_none(),
        "a stopped entry cannot be stopped again"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_update_checks_merged_interval(pool: PgPool) {
    let (user_id, task_id) = seed_task(&pool).await;
    let entry = TimeEntryRepo::create(&pool, &new_entry(user_id, task_id, at(5, 9), Some(at(5, 10))))
        .await
        .unwrap();

    let err = TimeEntryRepo::update(&pool, entry.id, &UpdateTimeEntry {
        start_time: Some(at(5, 11)),
        ..Default::default()
    })
    .await
    .unwrap_err();
    assert!(err.is_validation());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_closed_by_update_gets_duration(pool: PgPool) {
    let (user_id, task_id) = seed_task(&pool).await;
    let running = TimeEntryRepo::create(&pool, &new_entry(user_id, task_id, at(7, 9), None))
        .await
        .unwrap();
    assert_eq!(running.duration, 0);

    let closed = TimeEntryRepo::update(&pool, running.id, &UpdateTimeEntry {
        end_time: Some(at(7, 11)),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(closed.end_time, Some(at(7, 11)));
    assert_eq!(closed.duration, 7200);

    // Moving the start re-measures against the stored end.
    let moved = TimeEntryRepo::update(&pool, running.id, &UpdateTimeEntry {
        start_time: Some(at(7, 10)),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(moved.duration, 3600);

    // An explicit duration is kept as given.
    let manual = TimeEntryRepo::update(&pool, running.id, &UpdateTimeEntry {
        end_time: Some(at(7, 12)),
        duration: Some(900),
        is_manual_entry: Some(true),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(manual.duration, 900);
    assert!(manual.is_manual_entry);

    // Edits that leave the interval alone do not touch the duration.
    let described = TimeEntryRepo::update(&pool, running.id, &UpdateTimeEntry {
        description: Some("pairing".to_string()),
        ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(described.duration, 900);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_duration_rejected(pool: PgPool) {
    let (user_id, task_id) = seed_task(&pool).await;
    let mut input = new_entry(user_id, task_id, at(6, 9), None);
    input.duration = Some(-5);

    let err = TimeEntryRepo::create(&pool, &input).await.unwrap_err();
    assert!(err.is_validation());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_entry_unknown_task_is_fk_violation(pool: PgPool) {
    let (user_id, _) = seed_task(&pool).await;

    let err = TimeEntryRepo::create(&pool, &new_entry(user_id, 999_999, at(6, 9), None))
        .await
        .unwrap_err();
    assert!(err.is_foreign_key_violation());
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_role_level_rejected(pool: PgPool) {
    let err = RoleRepo::create(&pool, &CreateRole {
        name: "ghost".to_string(),
        description: None,
        is_default: None,
        level: Some(-1),
    })
    .await
    .unwrap_err();
    assert!(err.is_validation());
}
