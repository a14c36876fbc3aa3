use crate::declarations::{classify, Classified};
use crate::discover::{FeatureDiscoverer, NodeFactory};
use crate::document::{Document, SyntaxTree};
use crate::merge::merge_into;
use crate::semantic::SemanticModel;
use crate::types::OutlineElement;
use tree_sitter::Node;

/// Accumulates the merged outline forest across documents
pub struct StructureWalker<'a> {
    factory: NodeFactory<'a>,
    needs_semantic_model: bool,
    roots: Vec<OutlineElement>,
}

/// Read-only state for one document's traversal
struct Pass<'p> {
    tree: &'p SyntaxTree,
    model: Option<&'p SemanticModel>,
    project: &'p str,
}

impl<'a> StructureWalker<'a> {
    pub fn new(discoverers: &'a [Box<dyn FeatureDiscoverer>]) -> Self {
        let factory = NodeFactory::new(discoverers);
        let needs_semantic_model = factory.needs_semantic_model();
        Self {
            factory,
            needs_semantic_model,
            roots: Vec::new(),
        }
    }

    /// Merge one document's declarations into the forest.
    ///
    /// The semantic model is requested first, and only when a discoverer
    /// needs it; the syntax tree second. Documents without a syntax tree
    /// contribute nothing.
    pub async fn walk_document(&mut self, document: &dyn Document) {
        let project = document.project();

        let model = if self.needs_semantic_model {
            document.semantic_model().await
        } else {
            None
        };

        let Some(tree) = document.syntax_tree().await else {
            log::debug!("Skipping document in project '{project}': no syntax tree");
            return;
        };

        let pass = Pass {
            tree: &tree,
            model: model.as_deref(),
            project,
        };
        let mut roots = std::mem::take(&mut self.roots);
        self.visit(&pass, tree.root(), &mut roots);
        self.roots = roots;
    }

    /// The merged forest, in source order
    pub fn finish(self) -> Vec<OutlineElement> {
        self.roots
    }

    fn visit(&self, pass: &Pass<'_>, node: Node<'_>, siblings: &mut Vec<OutlineElement>) {
        match classify(node, pass.tree) {
            Classified::Composite(declaration) => {
                let mut element = self.factory.build(&declaration, pass.model);
                self.visit_children(pass, node, &mut element.children);
                merge_into(siblings, element, pass.project);
            }
            Classified::Leaf(declaration) => {
                let element = self.factory.build(&declaration, pass.model);
                merge_into(siblings, element, pass.project);
            }
            // Declarations under unrecognized constructs attach to the
            // nearest recognized ancestor, or to the forest root.
            Classified::Unrecognized => self.visit_children(pass, node, siblings),
        }
    }

    fn visit_children(&self, pass: &Pass<'_>, node: Node<'_>, siblings: &mut Vec<OutlineElement>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(pass, child, siblings);
        }
    }
}
