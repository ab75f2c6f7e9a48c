//! Integration tests for the taxonomy forest.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use ghuim::domain::{DomainError, Taxonomy};

/// Two-level grocery tree plus a third level above Food.
#[fixture]
fn taxonomy() -> Taxonomy {
    let mut tax = Taxonomy::new();
    for (child, parent) in [
        ("Coke", "Beverage"),
        ("Water", "Beverage"),
        ("Bread", "Food"),
        ("Pasta", "Food"),
        ("Steak", "Food"),
        ("Food", "Groceries"),
    ] {
        tax.add_relation(child, parent).unwrap();
    }
    tax
}

fn leaves() -> BTreeSet<&'static str> {
    ["Coke", "Water", "Bread", "Pasta", "Steak"].into()
}

#[rstest]
#[case("Coke", Some(0))]
#[case("Beverage", Some(1))]
#[case("Food", Some(1))]
#[case("Groceries", Some(2))]
#[case("Unknown", None)]
fn given_taxonomy_when_computing_level_then_shortest_distance_to_leaf(
    taxonomy: Taxonomy,
    #[case] node: &str,
    #[case] expected: Option<usize>,
) {
    assert_eq!(taxonomy.level(node, &leaves()), expected);
}

#[rstest]
fn given_category_without_occurring_leaf_when_computing_level_then_none(taxonomy: Taxonomy) {
    let only_food: BTreeSet<&str> = ["Bread", "Pasta", "Steak"].into();
    assert_eq!(taxonomy.level("Beverage", &only_food), None);
    assert_eq!(taxonomy.level("Groceries", &only_food), Some(2));
}

#[rstest]
fn given_leaf_when_listing_ancestors_then_nearest_first(taxonomy: Taxonomy) {
    assert_eq!(taxonomy.ancestors("Steak"), vec!["Food", "Groceries"]);
    assert!(taxonomy.ancestors("Groceries").is_empty());
    assert!(taxonomy.ancestors("Unknown").is_empty());
}

#[rstest]
fn given_category_when_listing_descendants_then_returns_leaf_items(taxonomy: Taxonomy) {
    let below = taxonomy.descendants("Groceries", &leaves());
    assert_eq!(below, BTreeSet::from(["Bread", "Pasta", "Steak"]));
}

#[rstest]
fn given_taxonomy_when_querying_structure_then_consistent(taxonomy: Taxonomy) {
    assert_eq!(taxonomy.len(), 8);
    assert!(taxonomy.contains("Groceries"));
    assert!(taxonomy.has_parent("Food"));
    assert!(!taxonomy.has_parent("Beverage"));
    assert_eq!(taxonomy.roots(), vec!["Beverage", "Groceries"]);
    assert_eq!(
        taxonomy.children("Food"),
        BTreeSet::from(["Bread", "Pasta", "Steak"])
    );
}

#[rstest]
fn given_relation_closing_a_loop_when_adding_then_cycle_detected(mut taxonomy: Taxonomy) {
    let err = taxonomy.add_relation("Groceries", "Steak").unwrap_err();
    assert_eq!(
        err,
        DomainError::CycleDetected {
            child: "Groceries".into(),
            parent: "Steak".into(),
        }
    );
    // rejected edge leaves the forest untouched
    assert!(!taxonomy.has_parent("Groceries"));
}

#[rstest]
fn given_new_parent_when_reparenting_then_edge_replaced(mut taxonomy: Taxonomy) {
    taxonomy.add_relation("Coke", "Food").unwrap();

    assert_eq!(taxonomy.parent("Coke"), Some("Food"));
    assert_eq!(taxonomy.children("Beverage"), BTreeSet::from(["Water"]));
    assert!(taxonomy.children("Food").contains("Coke"));
}

#[rstest]
fn given_forest_when_rendering_then_one_tree_per_root(taxonomy: Taxonomy) {
    let rendered: Vec<String> = taxonomy.to_forest().iter().map(|t| t.to_string()).collect();

    assert_eq!(rendered.len(), 2);
    assert!(rendered[0].starts_with("Beverage"));
    assert!(rendered[0].contains("Coke"));
    assert!(rendered[1].starts_with("Groceries"));
    assert!(rendered[1].contains("Steak"));
}
