use crate::declarations::{classify, Classified};
use crate::document::SyntaxTree;
use crate::types::ElementKind;
use std::collections::HashMap;

/// Identifier-like leaf tokens counted as name usages
const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "field_identifier",
    "property_identifier",
    "shorthand_property_identifier",
];

/// Per-document symbol information derived from a full tree scan
///
/// Building it visits every node of the tree, so it is only computed for
/// documents whose outline needs it.
#[derive(Debug, Default, Clone)]
pub struct SemanticModel {
    declared: HashMap<String, Vec<ElementKind>>,
    usages: HashMap<String, usize>,
}

impl SemanticModel {
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut model = Self::default();

        let mut cursor = tree.root().walk();
        'walk: loop {
            let node = cursor.node();
            match classify(node, tree) {
                Classified::Composite(decl) | Classified::Leaf(decl) => {
                    model
                        .declared
                        .entry(decl.name().to_string())
                        .or_default()
                        .push(decl.kind());
                }
                Classified::Unrecognized => {}
            }
            if node.child_count() == 0 && IDENTIFIER_KINDS.contains(&node.kind()) {
                *model
                    .usages
                    .entry(tree.text_of(node).to_string())
                    .or_default() += 1;
            }

            if cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        model
    }

    /// Kinds of every declaration with this name in the document
    pub fn declared(&self, name: &str) -> &[ElementKind] {
        self.declared.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Occurrences of `name` that are not the declaring token itself
    pub fn reference_count(&self, name: &str) -> usize {
        let total = self.usages.get(name).copied().unwrap_or(0);
        total.saturating_sub(self.declared(name).len())
    }
}
