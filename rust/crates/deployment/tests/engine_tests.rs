//! Engine-level tests: step ordering, rollback semantics, failure handling.

mod support;

use schemaflow_deployment::{MigrationEngine, StepApplier};
use schemaflow_error_handling::DeployError;
use schemaflow_persistence::{
    ClientDatabase, Field, FieldType, Migration, MigrationStep, Model, Schema,
};
use std::sync::Arc;
use support::{engine_over, IrreversibleStepMapper, RecordingClientDatabase};

fn blog_schema() -> Schema {
    Schema::with_models(vec![Model::new(
        "posts",
        vec![
            Field::new("title", FieldType::Text),
            Field::new("body", FieldType::Text),
        ],
    )])
}

fn blog_steps() -> Vec<MigrationStep> {
    vec![
        MigrationStep::CreateModel { name: "posts".into() },
        MigrationStep::CreateField {
            model: "posts".into(),
            field: "title".into(),
            column_type: FieldType::Text,
        },
        MigrationStep::CreateField {
            model: "posts".into(),
            field: "body".into(),
            column_type: FieldType::Text,
        },
    ]
}

fn blog_migration() -> Migration {
    Migration::pending("blog", blog_schema(), blog_steps())
}

#[tokio::test]
async fn forward_steps_execute_in_the_given_order() {
    let database = Arc::new(RecordingClientDatabase::new());
    let engine = engine_over(Arc::clone(&database));

    let result = engine.apply(&Schema::empty(), &blog_migration()).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(
        database.executed(),
        [
            "CREATE TABLE \"posts\" (id VARCHAR(25) PRIMARY KEY)",
            "ALTER TABLE \"posts\" ADD COLUMN \"title\" TEXT",
            "ALTER TABLE \"posts\" ADD COLUMN \"body\" TEXT",
        ]
    );
}

#[tokio::test]
async fn failure_rolls_back_the_applied_prefix_in_reverse_order() {
    let database = Arc::new(RecordingClientDatabase::new());
    database.fail_on("ADD COLUMN \"title\"");
    let engine = engine_over(Arc::clone(&database));

    let result = engine.apply(&Schema::empty(), &blog_migration()).await.unwrap();

    assert!(!result.succeeded);
    assert!(result.clean_rollback);
    // The failing step counts as applied, so its reverse runs first; the
    // third step is never attempted.
    assert_eq!(
        database.executed(),
        [
            "CREATE TABLE \"posts\" (id VARCHAR(25) PRIMARY KEY)",
            "ALTER TABLE \"posts\" DROP COLUMN \"title\"",
            "DROP TABLE \"posts\"",
        ]
    );
}

#[tokio::test]
async fn reverse_errors_are_swallowed_and_reported_as_dirty() {
    let database = Arc::new(RecordingClientDatabase::new());
    database.fail_on("ADD COLUMN \"title\"");
    database.fail_on("DROP COLUMN \"title\"");
    let engine = engine_over(Arc::clone(&database));

    let result = engine.apply(&Schema::empty(), &blog_migration()).await.unwrap();

    assert!(!result.succeeded);
    assert!(!result.clean_rollback);
    // Rollback reaches the bottom of the applied stack despite the failed
    // reverse step.
    assert_eq!(
        database.executed(),
        [
            "CREATE TABLE \"posts\" (id VARCHAR(25) PRIMARY KEY)",
            "DROP TABLE \"posts\"",
        ]
    );
}

#[tokio::test]
async fn metadata_steps_are_applied_and_reversed_as_noops() {
    let database = Arc::new(RecordingClientDatabase::new());
    database.fail_on("ADD COLUMN \"title\"");
    let engine = engine_over(Arc::clone(&database));

    let steps = vec![
        MigrationStep::CreateModel { name: "posts".into() },
        MigrationStep::UpdateModelDescription {
            model: "posts".into(),
            description: "User-facing articles".into(),
        },
        MigrationStep::CreateField {
            model: "posts".into(),
            field: "title".into(),
            column_type: FieldType::Text,
        },
    ];
    let migration = Migration::pending("blog", blog_schema(), steps);

    let result = engine.apply(&Schema::empty(), &migration).await.unwrap();

    assert!(!result.succeeded);
    assert!(result.clean_rollback);
    // The metadata step leaves no trace in either direction but still moves
    // through the applied stack.
    assert_eq!(
        database.executed(),
        [
            "CREATE TABLE \"posts\" (id VARCHAR(25) PRIMARY KEY)",
            "ALTER TABLE \"posts\" DROP COLUMN \"title\"",
            "DROP TABLE \"posts\"",
        ]
    );
}

#[tokio::test]
async fn missing_rollback_mutation_is_fatal() {
    let database = Arc::new(RecordingClientDatabase::new());
    database.fail_on("CreateField(posts.title)");
    let applier = StepApplier::new(Arc::new(IrreversibleStepMapper), Arc::clone(&database) as Arc<dyn ClientDatabase>);
    let engine = MigrationEngine::new(applier);

    let error = engine
        .apply(&Schema::empty(), &blog_migration())
        .await
        .expect_err("a mapper without reverse mutations must abort the rollback");

    assert!(matches!(error, DeployError::MissingRollbackMutation { .. }));
}

#[tokio::test]
async fn empty_migrations_succeed_without_touching_the_database() {
    let database = Arc::new(RecordingClientDatabase::new());
    let engine = engine_over(Arc::clone(&database));

    let migration = Migration::pending("blog", Schema::empty(), vec![]);
    let result = engine.apply(&Schema::empty(), &migration).await.unwrap();

    assert!(result.succeeded);
    assert!(database.executed().is_empty());
}
