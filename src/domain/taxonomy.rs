//! Arena-based item taxonomy (is-a forest).
//!
//! Every name has at most one parent. Traversals are explicit queue/stack walks over
//! arena indices, so deep taxonomies never grow the call stack.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{instrument, warn};

use crate::domain::error::{DomainError, DomainResult};

/// Taxonomy node in the arena.
#[derive(Debug, Clone)]
pub struct TaxonomyNode {
    /// Item or category name
    pub name: String,
    /// Index of the parent category, None for roots
    pub parent: Option<Index>,
    /// Indices of direct children
    pub children: Vec<Index>,
}

/// Single-parent hierarchy over item and category names.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    arena: Arena<TaxonomyNode>,
    index: HashMap<String, Index>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl Taxonomy {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
        }
    }

    /// Record `child` is-a `parent`.
    ///
    /// Re-registering a child under a different parent moves it (the old edge is dropped).
    /// An edge that would close a cycle is rejected and leaves the taxonomy unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn add_relation(&mut self, child: &str, parent: &str) -> DomainResult<()> {
        if child.is_empty() || parent.is_empty() {
            return Err(DomainError::EmptyName {
                context: "taxonomy relation",
            });
        }
        if child == parent || self.ancestors(parent).contains(&child) {
            return Err(DomainError::CycleDetected {
                child: child.to_string(),
                parent: parent.to_string(),
            });
        }

        let child_idx = self.ensure_node(child);
        let parent_idx = self.ensure_node(parent);

        let old_parent = self.arena.get(child_idx).and_then(|n| n.parent);
        match old_parent {
            Some(old) if old == parent_idx => return Ok(()),
            Some(old) => {
                if let Some(old_node) = self.arena.get_mut(old) {
                    warn!(
                        "Re-parenting {} from {} to {}",
                        child, old_node.name, parent
                    );
                    old_node.children.retain(|&c| c != child_idx);
                }
            }
            None => {}
        }

        if let Some(node) = self.arena.get_mut(child_idx) {
            node.parent = Some(parent_idx);
        }
        if let Some(node) = self.arena.get_mut(parent_idx) {
            node.children.push(child_idx);
        }
        Ok(())
    }

    fn ensure_node(&mut self, name: &str) -> Index {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.arena.insert(TaxonomyNode {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn node(&self, name: &str) -> Option<&TaxonomyNode> {
        self.index.get(name).and_then(|&idx| self.arena.get(idx))
    }

    fn name_of(&self, idx: Index) -> Option<&str> {
        self.arena.get(idx).map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn has_parent(&self, item: &str) -> bool {
        self.parent(item).is_some()
    }

    pub fn parent(&self, item: &str) -> Option<&str> {
        self.node(item)
            .and_then(|n| n.parent)
            .and_then(|p| self.name_of(p))
    }

    /// Ancestors of `item` from the immediate parent up to the root.
    pub fn ancestors(&self, item: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self.node(item).and_then(|n| n.parent);
        while let Some(idx) = current {
            match self.arena.get(idx) {
                Some(node) => {
                    out.push(node.name.as_str());
                    current = node.parent;
                }
                None => break,
            }
        }
        out
    }

    /// Direct children of `node`, empty if none.
    pub fn children(&self, node: &str) -> BTreeSet<&str> {
        self.node(node)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|&c| self.name_of(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All registered names (items and categories).
    pub fn nodes(&self) -> BTreeSet<&str> {
        self.index.keys().map(String::as_str).collect()
    }

    /// Names without a parent, sorted.
    pub fn roots(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = self
            .arena
            .iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(_, n)| n.name.as_str())
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Shortest downward distance from `node` to any name in `leaf_items`.
    ///
    /// Leaf items are level 0. Returns None when no leaf item is reachable below `node`.
    #[instrument(level = "trace", skip(self, leaf_items))]
    pub fn level(&self, node: &str, leaf_items: &BTreeSet<&str>) -> Option<usize> {
        if leaf_items.contains(node) {
            return Some(0);
        }
        let start = *self.index.get(node)?;

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        while let Some((idx, depth)) = queue.pop_front() {
            let Some(current) = self.arena.get(idx) else {
                continue;
            };
            for &child_idx in &current.children {
                let Some(child) = self.arena.get(child_idx) else {
                    continue;
                };
                if leaf_items.contains(child.name.as_str()) {
                    return Some(depth + 1);
                }
                if visited.insert(child_idx) {
                    queue.push_back((child_idx, depth + 1));
                }
            }
        }
        None
    }

    /// Leaf items below `node`, collected breadth-first.
    ///
    /// The walk stops descending at the first leaf item on each path.
    #[instrument(level = "trace", skip(self, leaf_items))]
    pub fn descendants<'a>(
        &'a self,
        node: &'a str,
        leaf_items: &BTreeSet<&str>,
    ) -> BTreeSet<&'a str> {
        let mut out = BTreeSet::new();
        if leaf_items.contains(node) {
            out.insert(node);
            return out;
        }
        let Some(&start) = self.index.get(node) else {
            return out;
        };

        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            let Some(current) = self.arena.get(idx) else {
                continue;
            };
            for &child_idx in &current.children {
                let Some(child) = self.arena.get(child_idx) else {
                    continue;
                };
                if leaf_items.contains(child.name.as_str()) {
                    out.insert(child.name.as_str());
                } else {
                    queue.push_back(child_idx);
                }
            }
        }
        out
    }

    /// Render the forest, one tree per root, children sorted by name.
    ///
    /// Built bottom-up from a post-order walk.
    pub fn to_forest(&self) -> Vec<Tree<String>> {
        let mut built: HashMap<Index, Tree<String>> = HashMap::new();
        let mut roots = Vec::new();

        for root_name in self.roots() {
            let Some(&root) = self.index.get(root_name) else {
                continue;
            };
            let mut stack = vec![(root, false)];
            while let Some((idx, visited)) = stack.pop() {
                let Some(node) = self.arena.get(idx) else {
                    continue;
                };
                let children = self.sorted_children(node);
                if !visited {
                    stack.push((idx, true));
                    for &child in children.iter().rev() {
                        stack.push((child, false));
                    }
                } else {
                    let leaves: Vec<Tree<String>> = children
                        .iter()
                        .filter_map(|c| built.remove(c))
                        .collect();
                    built.insert(idx, Tree::new(node.name.clone()).with_leaves(leaves));
                }
            }
            if let Some(tree) = built.remove(&root) {
                roots.push(tree);
            }
        }
        roots
    }

    fn sorted_children(&self, node: &TaxonomyNode) -> Vec<Index> {
        let mut children = node.children.clone();
        children.sort_by(|a, b| self.name_of(*a).cmp(&self.name_of(*b)));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grocery() -> Taxonomy {
        let mut tax = Taxonomy::new();
        tax.add_relation("Coke", "Beverage").unwrap();
        tax.add_relation("Water", "Beverage").unwrap();
        tax.add_relation("Bread", "Food").unwrap();
        tax.add_relation("Pasta", "Food").unwrap();
        tax.add_relation("Steak", "Food").unwrap();
        tax
    }

    fn leaves<'a>(names: &[&'a str]) -> BTreeSet<&'a str> {
        names.iter().copied().collect()
    }

    #[test]
    fn given_relations_when_querying_parent_then_returns_registered_edge() {
        let tax = grocery();
        assert_eq!(tax.parent("Coke"), Some("Beverage"));
        assert!(tax.has_parent("Steak"));
        assert!(!tax.has_parent("Food"));
        assert_eq!(tax.parent("Unknown"), None);
        assert_eq!(tax.len(), 7);
    }

    #[test]
    fn given_chain_when_getting_ancestors_then_ordered_from_parent_to_root() {
        let mut tax = Taxonomy::new();
        tax.add_relation("Cola", "Soda").unwrap();
        tax.add_relation("Soda", "Beverage").unwrap();
        tax.add_relation("Beverage", "Grocery").unwrap();

        assert_eq!(tax.ancestors("Cola"), vec!["Soda", "Beverage", "Grocery"]);
        assert!(tax.ancestors("Grocery").is_empty());
        assert!(tax.ancestors("Unknown").is_empty());
    }

    #[test]
    fn given_self_relation_when_adding_then_rejects_cycle() {
        let mut tax = Taxonomy::new();
        let result = tax.add_relation("A", "A");
        assert!(matches!(result, Err(DomainError::CycleDetected { .. })));
    }

    #[test]
    fn given_closing_edge_when_adding_then_rejects_and_keeps_taxonomy() {
        let mut tax = Taxonomy::new();
        tax.add_relation("A", "B").unwrap();
        tax.add_relation("B", "C").unwrap();

        let result = tax.add_relation("C", "A");

        assert_eq!(
            result,
            Err(DomainError::CycleDetected {
                child: "C".into(),
                parent: "A".into()
            })
        );
        assert!(!tax.has_parent("C"));
        assert_eq!(tax.ancestors("A"), vec!["B", "C"]);
    }

    #[test]
    fn given_second_parent_when_adding_then_replaces_edge() {
        let mut tax = Taxonomy::new();
        tax.add_relation("Tomato", "Vegetable").unwrap();
        tax.add_relation("Tomato", "Fruit").unwrap();

        assert_eq!(tax.parent("Tomato"), Some("Fruit"));
        assert!(tax.children("Vegetable").is_empty());
        assert_eq!(tax.children("Fruit"), leaves(&["Tomato"]));
    }

    #[test]
    fn given_same_parent_twice_when_adding_then_no_duplicate_child() {
        let mut tax = Taxonomy::new();
        tax.add_relation("Coke", "Beverage").unwrap();
        tax.add_relation("Coke", "Beverage").unwrap();
        assert_eq!(tax.children("Beverage").len(), 1);
    }

    #[test]
    fn given_empty_name_when_adding_then_errors() {
        let mut tax = Taxonomy::new();
        assert!(matches!(
            tax.add_relation("", "Food"),
            Err(DomainError::EmptyName { .. })
        ));
    }

    #[test]
    fn given_grocery_when_getting_children_then_returns_direct_children() {
        let tax = grocery();
        assert_eq!(tax.children("Food"), leaves(&["Bread", "Pasta", "Steak"]));
        assert!(tax.children("Steak").is_empty());
        assert!(tax.children("Unknown").is_empty());
    }

    #[test]
    fn given_multi_level_when_computing_level_then_uses_shortest_path_to_leaf() {
        let mut tax = Taxonomy::new();
        tax.add_relation("Cola", "Soda").unwrap();
        tax.add_relation("Soda", "Beverage").unwrap();
        tax.add_relation("Water", "Beverage").unwrap();
        let leaf_items = leaves(&["Cola", "Water"]);

        assert_eq!(tax.level("Cola", &leaf_items), Some(0));
        assert_eq!(tax.level("Soda", &leaf_items), Some(1));
        // Water is a direct child, so the shortest path wins over Soda -> Cola
        assert_eq!(tax.level("Beverage", &leaf_items), Some(1));
    }

    #[test]
    fn given_disconnected_fragment_when_computing_level_then_none() {
        let mut tax = grocery();
        tax.add_relation("Caviar", "Luxury").unwrap();
        let leaf_items = leaves(&["Coke", "Water", "Bread", "Pasta", "Steak"]);

        assert_eq!(tax.level("Luxury", &leaf_items), None);
        assert_eq!(tax.level("Nowhere", &leaf_items), None);
        assert_eq!(tax.level("Food", &leaf_items), Some(1));
    }

    #[test]
    fn given_nested_categories_when_collecting_descendants_then_returns_leaf_items() {
        let mut tax = Taxonomy::new();
        tax.add_relation("Cola", "Soda").unwrap();
        tax.add_relation("Lemonade", "Soda").unwrap();
        tax.add_relation("Soda", "Beverage").unwrap();
        tax.add_relation("Water", "Beverage").unwrap();
        let leaf_items = leaves(&["Cola", "Lemonade", "Water"]);

        assert_eq!(
            tax.descendants("Beverage", &leaf_items),
            leaves(&["Cola", "Lemonade", "Water"])
        );
        assert_eq!(tax.descendants("Cola", &leaf_items), leaves(&["Cola"]));
        assert!(tax.descendants("Unknown", &leaf_items).is_empty());
    }

    #[test]
    fn given_forest_when_rendering_then_one_tree_per_root() {
        let tax = grocery();
        let forest = tax.to_forest();
        assert_eq!(forest.len(), 2);

        let rendered = forest[1].to_string();
        assert!(rendered.starts_with("Food"));
        assert!(rendered.contains("Bread"));
        assert!(rendered.contains("Steak"));
        assert_eq!(tax.roots(), vec!["Beverage", "Food"]);
    }

    #[test]
    fn given_deep_chain_when_walking_then_does_not_overflow_stack() {
        let mut tax = Taxonomy::new();
        for i in 0..10_000 {
            tax.add_relation(&format!("n{}", i), &format!("n{}", i + 1))
                .unwrap();
        }
        let leaf_items = leaves(&["n0"]);
        assert_eq!(tax.level("n10000", &leaf_items), Some(10_000));
        assert_eq!(tax.ancestors("n0").len(), 10_000);
        assert_eq!(tax.descendants("n10000", &leaf_items), leaves(&["n0"]));
    }
}
