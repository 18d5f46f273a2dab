//! Reading annotation-source and metadata-source documents.
//!
//! Sources are decoded from their configured legacy encoding, lightly
//! repaired (bare `&`), and parsed as XML.
//!
//! Divisions are opened by `div` and `poem` elements in document order. A
//! `poem` closes the division it appears in and opens a new one that lasts
//! until the enclosing `div` ends, so text following a poem inside the same
//! `div` belongs to the poem's division:
//!
//! ```text
//! <div> a <poem> b </poem> c </div>   =>   [a] [b c]
//! ```

pub mod annotation;
pub mod metadata;
pub mod reader;

use std::collections::HashMap;

use roxmltree::{Node, NodeId};

/// Local names that open a division.
const DIVISION_TAGS: [&str; 2] = ["div", "poem"];

fn is_division(node: &Node<'_, '_>) -> bool {
    node.is_element() && DIVISION_TAGS.contains(&node.tag_name().name())
}

pub(crate) fn local_name_eq(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(name)
}

/// Division membership of every node below a document root.
#[derive(Debug, Default)]
pub(crate) struct DivisionMap {
    owner: HashMap<NodeId, usize>,
    count: usize,
}

impl DivisionMap {
    pub(crate) fn build(root: Node<'_, '_>) -> Self {
        let mut map = DivisionMap::default();
        map.visit(root, &mut None);
        map
    }

    fn visit(&mut self, node: Node<'_, '_>, current: &mut Option<usize>) {
        let restore = *current;
        if is_division(&node) {
            *current = Some(self.count);
            self.count += 1;
        }
        if let Some(index) = *current {
            self.owner.insert(node.id(), index);
        }

        for child in node.children() {
            self.visit(child, current);
        }

        // a closing `div` ends whatever division is open; a closing `poem` does not
        if local_name_eq(&node, "div") {
            *current = restore;
        }
    }

    /// Number of divisions, including empty ones.
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// Index of the division `node` belongs to.
    pub(crate) fn owner(&self, node: Node<'_, '_>) -> Option<usize> {
        self.owner.get(&node.id()).copied()
    }
}
