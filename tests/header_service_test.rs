//! Tests for HeaderService

use headertree::application::services::{HeaderService, Section};
use headertree::application::ApplicationError;
use headertree::domain::{
    ColumnDef, ColumnId, ColumnTree, DisplayItem, DomainError, NoopLifecycle, Pinned,
    RecordingLifecycle,
};
use headertree::util::testing::{init_test_setup, olympic_defs, pinned_olympic_defs};

fn id(s: &str) -> ColumnId {
    ColumnId::from(s)
}

/// Render one section as `athlete_0{name,age},country`
fn section_shape(service: &HeaderService, section: Section) -> String {
    fn shape(service: &HeaderService, items: &[DisplayItem]) -> String {
        items
            .iter()
            .map(|item| match item {
                DisplayItem::Column(id) => id.to_string(),
                DisplayItem::Group(handle) => {
                    let group = service.group(*handle).unwrap();
                    format!("{}{{{}}}", group.unique_id(), shape(service, group.children()))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
    shape(service, service.roots(section))
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

#[test]
fn given_pinned_columns_when_refreshing_then_sections_get_distinct_instances() {
    // Arrange
    init_test_setup();
    let mut service = HeaderService::new(ColumnTree::from_defs(&pinned_olympic_defs(), false));

    // Act
    let stats = service.refresh(&mut NoopLifecycle).unwrap();

    // Assert: left and right are built before center
    assert_eq!(section_shape(&service, Section::Left), "athlete_0{name}");
    assert_eq!(section_shape(&service, Section::Right), "medals_0{silver}");
    assert_eq!(
        section_shape(&service, Section::Center),
        "athlete_1{age},country,medals_1{gold}"
    );
    assert_eq!(
        stats.created,
        vec!["athlete_0", "medals_0", "athlete_1", "medals_1"]
    );
    assert!(stats.destroyed.is_empty());
}

#[test]
fn given_unchanged_state_when_refreshing_again_then_all_groups_are_reused() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&pinned_olympic_defs(), false));
    let mut lifecycle = RecordingLifecycle::new();
    service.refresh(&mut lifecycle).unwrap();
    let handle = service.find_group("athlete", 1).unwrap();

    // Act
    let stats = service.refresh(&mut lifecycle).unwrap();

    // Assert
    assert!(stats.created.is_empty());
    assert!(stats.destroyed.is_empty());
    assert_eq!(stats.reused.len(), 4);
    assert_eq!(lifecycle.created.len(), 4);
    assert_eq!(service.find_group("athlete", 1), Some(handle));
    assert_eq!(service.arena().len(), 4);
}

#[test]
fn given_hidden_column_when_refreshing_then_unreferenced_groups_are_destroyed() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&pinned_olympic_defs(), false));
    let mut lifecycle = RecordingLifecycle::new();
    service.refresh(&mut lifecycle).unwrap();
    lifecycle.clear();

    // Act
    service.state_mut().set_visible(&id("name"), false).unwrap();
    let stats = service.refresh(&mut lifecycle).unwrap();

    // Assert: center athlete is now instance 0, a new occurrence for that section
    assert!(service.roots(Section::Left).is_empty());
    assert_eq!(
        section_shape(&service, Section::Center),
        "athlete_0{age},country,medals_1{gold}"
    );
    assert_eq!(stats.created, vec!["athlete_0"]);
    assert_eq!(sorted(stats.reused), vec!["medals_0", "medals_1"]);
    assert_eq!(sorted(stats.destroyed.clone()), vec!["athlete_0", "athlete_1"]);
    assert_eq!(sorted(lifecycle.destroyed), sorted(stats.destroyed));
    assert_eq!(service.arena().len(), 3);
}

#[test]
fn given_reloaded_definitions_when_refreshing_then_groups_are_recreated() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), false));
    service.refresh(&mut NoopLifecycle).unwrap();
    let old = service.find_group("athlete", 0).unwrap();

    // Act
    service.reload(ColumnTree::from_defs(&olympic_defs(), false));
    let stats = service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    assert!(stats.reused.is_empty());
    assert_eq!(sorted(stats.created), vec!["athlete_0", "medals_0"]);
    assert_eq!(sorted(stats.destroyed), vec!["athlete_0", "medals_0"]);
    assert_ne!(service.find_group("athlete", 0), Some(old));
    assert!(service.group(old).is_none());
    assert_eq!(service.arena().len(), 2);
}

#[test]
fn given_reload_keeping_column_state_when_refreshing_then_state_survives() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), false));
    service.state_mut().set_visible(&id("age"), false).unwrap();

    // Act: reload drops `silver`, keeps the rest
    service.reload(ColumnTree::from_defs(
        &[
            ColumnDef::group(
                "athlete",
                vec![ColumnDef::leaf("name"), ColumnDef::leaf("age")],
            ),
            ColumnDef::leaf("country"),
            ColumnDef::group("medals", vec![ColumnDef::leaf("gold")]),
        ],
        false,
    ));
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    assert!(!service.state().is_visible(&id("age")));
    assert_eq!(
        section_shape(&service, Section::Center),
        "athlete_0{name},country,medals_0{gold}"
    );
}

#[test]
fn given_moved_column_when_refreshing_then_group_is_split() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), false));
    service.refresh(&mut NoopLifecycle).unwrap();

    // Act
    service.state_mut().move_column(&id("gold"), 0).unwrap();
    let stats = service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    assert_eq!(
        section_shape(&service, Section::Center),
        "medals_0{gold},athlete_0{name,age},country,medals_1{silver}"
    );
    assert_eq!(stats.created, vec!["medals_1"]);
    assert_eq!(sorted(stats.reused), vec!["athlete_0", "medals_0"]);
}

#[test]
fn given_unbalanced_nesting_when_top_level_column_moves_inside_then_columns_follow_state_order() {
    // Arrange
    let tree = ColumnTree::from_defs(
        &[
            ColumnDef::group(
                "outer",
                vec![ColumnDef::group(
                    "inner",
                    vec![ColumnDef::leaf("a"), ColumnDef::leaf("b")],
                )],
            ),
            ColumnDef::leaf("x"),
        ],
        false,
    );
    let mut service = HeaderService::new(tree);
    service.refresh(&mut NoopLifecycle).unwrap();

    // Act
    service.state_mut().move_column(&id("x"), 1).unwrap();
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    assert_eq!(service.displayed_columns(), service.state().order().to_vec());
    assert_eq!(
        section_shape(&service, Section::Center),
        "outer_0{inner_0{a}},x,outer_1{inner_1{b}}"
    );
}

#[test]
fn given_too_deep_reload_when_refresh_fails_then_previous_header_is_kept() {
    // Arrange
    let shallow = ColumnTree::from_defs(
        &[ColumnDef::group("inner", vec![ColumnDef::leaf("a")])],
        false,
    );
    let deep = ColumnTree::from_defs(
        &[ColumnDef::group(
            "outer",
            vec![ColumnDef::group("inner", vec![ColumnDef::leaf("a")])],
        )],
        false,
    );
    let mut service = HeaderService::new(shallow).with_max_passes(2);
    service.refresh(&mut NoopLifecycle).unwrap();
    let before = service.find_group("inner", 0).unwrap();
    service.reload(deep);
    let mut lifecycle = RecordingLifecycle::new();

    // Act
    let result = service.refresh(&mut lifecycle);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::PassLimitExceeded { limit: 2 }))
    ));
    assert_eq!(service.roots(Section::Center), &[DisplayItem::Group(before)]);
    assert_eq!(
        service.group(before).unwrap().children(),
        &[DisplayItem::Column(id("a"))]
    );
    assert_eq!(service.arena().len(), 1);
    assert_eq!(service.find_group("inner", 0), Some(before));
    assert_eq!(service.leaf_parent(&id("a")), Some(before));
    assert_eq!(service.displayed_columns(), vec![id("a")]);
    assert_eq!(
        sorted(lifecycle.destroyed.clone()),
        sorted(lifecycle.created.clone())
    );
    assert_eq!(sorted(lifecycle.destroyed), vec!["inner_0", "outer_0"]);
}

#[test]
fn given_column_id_equal_to_group_unique_id_when_querying_then_both_resolve() {
    // Arrange
    let tree = ColumnTree::from_defs(
        &[
            ColumnDef::group("athlete", vec![ColumnDef::leaf("name")]),
            ColumnDef::leaf("athlete_0"),
        ],
        false,
    );
    let mut service = HeaderService::new(tree);

    // Act
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    let athlete = service.find_group("athlete", 0).unwrap();
    assert_eq!(service.displayed_group("athlete_0"), Some(athlete));
    assert_eq!(service.displayed_leaves(athlete), &[id("name")]);
    assert!(service.is_column_displayed(&id("athlete_0")));
    assert!(service.is_column_displayed(&id("name")));
}

#[test]
fn given_pinned_column_when_refreshing_then_it_moves_to_its_section() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), false));

    // Act
    service
        .state_mut()
        .set_pinned(&id("silver"), Some(Pinned::Left))
        .unwrap();
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    assert_eq!(section_shape(&service, Section::Left), "medals_0{silver}");
    assert_eq!(
        section_shape(&service, Section::Center),
        "athlete_0{name,age},country,medals_1{gold}"
    );
    let left = service.find_group("medals", 0).unwrap();
    assert_eq!(service.group(left).unwrap().pinned(), Some(Pinned::Left));
}

#[test]
fn given_built_header_when_querying_then_lookups_resolve() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), false));

    // Act
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    let athlete = service.find_group("athlete", 0).unwrap();
    assert_eq!(service.displayed_leaves(athlete), &[id("name"), id("age")]);
    assert_eq!(service.leaf_parent(&id("name")), Some(athlete));
    assert_eq!(service.leaf_parent(&id("country")), None);
    assert!(service.is_column_displayed(&id("country")));
    assert!(!service.is_column_displayed(&id("athlete_0")));
    assert_eq!(service.displayed_group("athlete_0"), Some(athlete));
    assert_eq!(service.displayed_group("country"), None);
    assert!(service.find_group("athlete", 1).is_none());
}

#[test]
fn given_sections_when_listing_displayed_columns_then_left_center_right_order() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&pinned_olympic_defs(), false));

    // Act
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    let columns: Vec<String> = service
        .displayed_columns()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(columns, vec!["name", "age", "country", "gold", "silver"]);
}

#[test]
fn given_balanced_tree_when_refreshing_then_header_rows_line_up() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), true));

    // Act
    service.refresh(&mut NoopLifecycle).unwrap();

    // Assert: country sits under a padding group
    assert_eq!(service.header_row_count(), 2);
    let padding = service.leaf_parent(&id("country")).unwrap();
    assert!(service.group(padding).unwrap().is_padding());
    assert!(service
        .roots(Section::Center)
        .iter()
        .all(|item| matches!(item, DisplayItem::Group(_))));
}

#[test]
fn given_layouts_when_counting_header_rows_then_counts_group_levels_plus_one() {
    // Arrange
    let nested = ColumnTree::from_defs(
        &[ColumnDef::group(
            "outer",
            vec![ColumnDef::group("inner", vec![ColumnDef::leaf("a")])],
        )],
        false,
    );
    let flat = ColumnTree::from_defs(&[ColumnDef::leaf("a"), ColumnDef::leaf("b")], false);
    let mut nested_service = HeaderService::new(nested);
    let mut flat_service = HeaderService::new(flat);
    let mut hidden_service = HeaderService::new(ColumnTree::from_defs(
        &[ColumnDef::leaf("a")],
        false,
    ));
    hidden_service
        .state_mut()
        .set_visible(&id("a"), false)
        .unwrap();

    // Act
    nested_service.refresh(&mut NoopLifecycle).unwrap();
    flat_service.refresh(&mut NoopLifecycle).unwrap();
    hidden_service.refresh(&mut NoopLifecycle).unwrap();

    // Assert
    assert_eq!(nested_service.header_row_count(), 3);
    assert_eq!(flat_service.header_row_count(), 1);
    assert_eq!(hidden_service.header_row_count(), 0);
}

#[test]
fn given_unknown_column_when_changing_state_then_errors() {
    // Arrange
    let mut service = HeaderService::new(ColumnTree::from_defs(&olympic_defs(), false));

    // Act
    let result = service.state_mut().set_visible(&id("nope"), false);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::UnknownColumn(_)))
    ));
}

#[test]
fn given_pass_limit_too_low_when_refreshing_then_errors() {
    // Arrange
    let nested = ColumnTree::from_defs(
        &[ColumnDef::group(
            "outer",
            vec![ColumnDef::group("inner", vec![ColumnDef::leaf("a")])],
        )],
        false,
    );
    let mut service = HeaderService::new(nested).with_max_passes(1);

    // Act
    let result = service.refresh(&mut NoopLifecycle);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::PassLimitExceeded { limit: 1 }))
    ));
}
