//! Repository-level tests for order assignment, partial updates, and the
//! personal task queries.

use sqlx::PgPool;
use taskhive_core::types::DbId;
use taskhive_db::models::category::CreateCategory;
use taskhive_db::models::project::CreateProject;
use taskhive_db::models::task::{CreateTask, TaskPriority, TaskStatus, UpdateTask};
use taskhive_db::models::user::CreateUser;
use taskhive_db::repositories::{CategoryRepo, ProjectRepo, TaskRepo, UserRepo};

async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            name: Some("Seed".to_string()),
        },
    )
    .await
    .expect("user should insert")
    .id
}

async fn seed_project(pool: &PgPool, owner: DbId) -> DbId {
    ProjectRepo::create(
        pool,
        owner,
        &CreateProject {
            name: "Ordering".to_string(),
            description: None,
            color: "#10b981".to_string(),
        },
    )
    .await
    .expect("project should insert")
    .id
}

fn task_input(title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        description: None,
        category_id: None,
        assignee_id: None,
        assigned_users: None,
        parent_task_id: None,
        priority: TaskPriority::Low,
        due_at: None,
        tags: None,
        images: None,
    }
}

// ---------------------------------------------------------------------------
// Order assignment
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn first_category_gets_order_zero(pool: PgPool) {
    let user = seed_user(&pool, "cat-order@example.com").await;
    let project = seed_project(&pool, user).await;

    let input = CreateCategory {
        name: "Backlog".to_string(),
        color: "#6366f1".to_string(),
    };
    let first = CategoryRepo::create(&pool, project, &input).await.unwrap();
    let second = CategoryRepo::create(&pool, project, &input).await.unwrap();

    assert_eq!(first.sort_order, 0);
    assert_eq!(second.sort_order, 1);
}

#[sqlx::test]
async fn category_order_is_scoped_per_project(pool: PgPool) {
    let user = seed_user(&pool, "scoped@example.com").await;
    let project_a = seed_project(&pool, user).await;
    let project_b = seed_project(&pool, user).await;

    let input = CreateCategory {
        name: "Todo".to_string(),
        color: "#6366f1".to_string(),
    };
    CategoryRepo::create(&pool, project_a, &input).await.unwrap();
    let in_b = CategoryRepo::create(&pool, project_b, &input).await.unwrap();

    // Sibling scope is the project, so project B starts from zero.
    assert_eq!(in_b.sort_order, 0);
}

#[sqlx::test]
async fn task_order_counts_all_project_tasks(pool: PgPool) {
    let user = seed_user(&pool, "task-order@example.com").await;
    let project = seed_project(&pool, user).await;

    let first = TaskRepo::create(&pool, project, user, &task_input("One"))
        .await
        .unwrap();
    let second = TaskRepo::create(&pool, project, user, &task_input("Two"))
        .await
        .unwrap();

    let mut sub = task_input("Sub");
    sub.parent_task_id = Some(first.id);
    let subtask = TaskRepo::create(&pool, project, user, &sub).await.unwrap();

    assert_eq!(first.sort_order, 0);
    assert_eq!(second.sort_order, 1);
    // Subtasks share the project-wide counter.
    assert_eq!(subtask.sort_order, 2);
}

#[sqlx::test]
async fn update_order_overwrites_and_clears_category(pool: PgPool) {
    let user = seed_user(&pool, "reorder@example.com").await;
    let project = seed_project(&pool, user).await;
    let category = CategoryRepo::create(
        &pool,
        project,
        &CreateCategory {
            name: "Doing".to_string(),
            color: "#ef4444".to_string(),
        },
    )
    .await
    .unwrap();

    let mut input = task_input("Movable");
    input.category_id = Some(category.id);
    let task = TaskRepo::create(&pool, project, user, &input).await.unwrap();
    assert_eq!(task.category_id, Some(category.id));

    // Reorder without a category: the category reference is cleared, and no
    // renormalization of siblings happens.
    let moved = TaskRepo::update_order(&pool, task.id, 17, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.sort_order, 17);
    assert_eq!(moved.category_id, None);

    // Reorder into the category again.
    let back = TaskRepo::update_order(&pool, task.id, 2, Some(category.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(back.category_id, Some(category.id));
}

// ---------------------------------------------------------------------------
// Partial update semantics
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn update_only_touches_supplied_fields(pool: PgPool) {
    let user = seed_user(&pool, "patch@example.com").await;
    let project = seed_project(&pool, user).await;

    let mut input = task_input("Original title");
    input.description = Some("Original description".to_string());
    input.tags = Some(vec!["alpha".to_string()]);
    let task = TaskRepo::create(&pool, project, user, &input).await.unwrap();

    let patch = UpdateTask {
        title: Some("New title".to_string()),
        description: None,
        category_id: None,
        assignee_id: None,
        assigned_users: None,
        status: Some(TaskStatus::InProgress),
        priority: None,
        due_at: None,
        tags: None,
        images: None,
    };
    let updated = TaskRepo::update(&pool, task.id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "New title");
    assert_eq!(updated.status, TaskStatus::InProgress);
    // Omitted fields are untouched.
    assert_eq!(updated.description.as_deref(), Some("Original description"));
    assert_eq!(updated.tags, vec!["alpha".to_string()]);
    assert_eq!(updated.priority, TaskPriority::Low);
}

// ---------------------------------------------------------------------------
// Personal task queries
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn personal_queries_do_not_overlap(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com").await;
    let me = seed_user(&pool, "me@example.com").await;
    let project = seed_project(&pool, owner).await;

    // I am both the primary assignee and in assigned_users.
    let mut both = task_input("Both roles");
    both.assignee_id = Some(me);
    both.assigned_users = Some(vec![me]);
    TaskRepo::create(&pool, project, owner, &both).await.unwrap();

    // Only in assigned_users.
    let mut member_only = task_input("Member only");
    member_only.assigned_users = Some(vec![me]);
    TaskRepo::create(&pool, project, owner, &member_only)
        .await
        .unwrap();

    let primary = TaskRepo::list_for_assignee(&pool, me).await.unwrap();
    let secondary = TaskRepo::list_assigned_not_primary(&pool, me).await.unwrap();

    assert_eq!(primary.len(), 1, "one task as primary assignee");
    assert_eq!(secondary.len(), 1, "one task as plain member");

    // The doubly-matching task appears in exactly one of the two sets.
    assert_ne!(primary[0].id, secondary[0].id);
}
