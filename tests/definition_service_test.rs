//! Tests for DefinitionService and definition loading through the ServiceContainer

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use headertree::application::services::DefinitionService;
use headertree::application::ApplicationError;
use headertree::config::Settings;
use headertree::domain::{ColumnId, Pinned};
use headertree::infrastructure::traits::{InMemoryFileSystem, RealFileSystem};
use headertree::infrastructure::ServiceContainer;

const OLYMPIC_TOML: &str = r#"
[[columns]]
group_id = "athlete"
header_name = "Athlete"

[[columns.children]]
col_id = "name"
header_name = "Name"

[[columns.children]]
field = "age"
pinned = "left"

[[columns]]
field = "country"

[[columns]]
group_id = "medals"
children = [{ field = "gold" }, { field = "silver", hide = true }]
"#;

fn in_memory_service(path: &str, content: &str) -> DefinitionService {
    DefinitionService::new(Arc::new(InMemoryFileSystem::new().with_file(path, content)))
}

/// Helper to create a definition file for testing
fn create_definition_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write definition file");
    path
}

#[test]
fn given_nested_definitions_when_loading_then_builds_provided_tree() {
    // Arrange
    let service = in_memory_service("defs.toml", OLYMPIC_TOML);

    // Act
    let tree = service.load(Path::new("defs.toml"), false).unwrap();

    // Assert
    let ids: Vec<&str> = tree.columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["name", "age", "country", "gold", "silver"]);

    let athlete = tree.group_by_key("athlete").unwrap();
    assert_eq!(athlete.display_name(), "Athlete");
    assert_eq!(
        tree.leaf_columns(athlete.id),
        vec![ColumnId::from("name"), ColumnId::from("age")]
    );

    let age = tree.column(&ColumnId::from("age")).unwrap();
    assert_eq!(age.pinned, Some(Pinned::Left));
    assert_eq!(age.original_parent, Some(athlete.id));
    assert!(tree.column(&ColumnId::from("silver")).unwrap().hide);
    assert_eq!(
        tree.column(&ColumnId::from("country")).unwrap().original_parent,
        None
    );
}

#[test]
fn given_balancing_when_loading_then_shallow_columns_get_padding() {
    // Arrange
    let service = in_memory_service("defs.toml", OLYMPIC_TOML);

    // Act
    let tree = service.load(Path::new("defs.toml"), true).unwrap();

    // Assert
    let country = tree.column(&ColumnId::from("country")).unwrap();
    let padding = tree.group(country.original_parent.unwrap()).unwrap();
    assert!(padding.padding);
    assert_eq!(padding.original_parent, None);
    assert_eq!(tree.depth(), 1);
}

#[test]
fn given_missing_file_when_reading_then_operation_fails() {
    // Arrange
    let service = DefinitionService::new(Arc::new(InMemoryFileSystem::new()));

    // Act
    let result = service.read(Path::new("missing.toml"));

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::OperationFailed { .. })
    ));
}

#[test]
fn given_invalid_toml_when_reading_then_definition_error() {
    // Arrange
    let service = in_memory_service("bad.toml", "[[columns]\nfield = ");

    // Act
    let result = service.read(Path::new("bad.toml"));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Definition { .. })));
}

#[test]
fn given_file_without_columns_when_loading_then_definition_error() {
    // Arrange
    let service = in_memory_service("empty.toml", "# nothing here\n");

    // Act
    let result = service.load(Path::new("empty.toml"), true);

    // Assert
    match result {
        Err(ApplicationError::Definition { path, message }) => {
            assert_eq!(path, PathBuf::from("empty.toml"));
            assert!(message.contains("no columns"));
        }
        other => panic!("expected definition error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn given_directory_path_when_reading_then_definition_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let service = DefinitionService::new(Arc::new(RealFileSystem));

    // Act
    let result = service.read(temp.path());

    // Assert
    assert!(matches!(result, Err(ApplicationError::Definition { .. })));
}

#[test]
fn given_definition_file_on_disk_when_container_loads_then_honors_balance_setting() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_definition_file(&temp, "defs.toml", OLYMPIC_TOML);
    let mut settings = Settings::default();
    settings.definitions.balance = false;
    let container = ServiceContainer::new(settings);

    // Act
    let tree = container.load_tree(Some(&path), true).unwrap();

    // Assert: setting disables balancing even when the caller asks for it
    assert!(tree.groups().all(|g| !g.padding));
    assert_eq!(
        tree.column(&ColumnId::from("country")).unwrap().original_parent,
        None
    );
}

#[test]
fn given_configured_path_when_no_file_given_then_container_uses_setting() {
    // Arrange
    let mut settings = Settings::default();
    settings.definitions.path = Some(PathBuf::from("/defs/grid.toml"));
    let fs = InMemoryFileSystem::new().with_file("/defs/grid.toml", OLYMPIC_TOML);
    let container = ServiceContainer::with_deps(settings, Arc::new(fs));

    // Act
    let tree = container.load_tree(None, true).unwrap();
    let mut service = container.header_service(tree);
    let stats = service
        .refresh(&mut headertree::domain::NoopLifecycle)
        .unwrap();

    // Assert
    assert_eq!(stats.created.len(), 4);
    assert_eq!(service.header_row_count(), 2);
}

#[test]
fn given_no_path_anywhere_when_loading_then_config_error() {
    // Arrange
    let container = ServiceContainer::with_deps(
        Settings::default(),
        Arc::new(InMemoryFileSystem::new()),
    );

    // Act
    let result = container.load_tree(None, true);

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}
