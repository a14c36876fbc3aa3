use crate::declarations::Declaration;
use crate::semantic::SemanticModel;
use crate::types::{OutlineElement, SyntaxFeature};

/// Pluggable source of feature tags for outline elements
pub trait FeatureDiscoverer: Send + Sync {
    /// Name used in logs and configuration
    fn name(&self) -> &str;

    /// Whether [`discover`](Self::discover) needs a semantic model.
    /// Read once, before any document is processed.
    fn needs_semantic_model(&self) -> bool {
        false
    }

    /// Tags for `declaration`. Must not depend on anything but its inputs.
    fn discover(
        &self,
        declaration: &Declaration<'_>,
        model: Option<&SemanticModel>,
    ) -> anyhow::Result<Vec<SyntaxFeature>>;
}

/// Builds unattributed outline elements from declarations
pub struct NodeFactory<'a> {
    discoverers: &'a [Box<dyn FeatureDiscoverer>],
}

impl<'a> NodeFactory<'a> {
    pub fn new(discoverers: &'a [Box<dyn FeatureDiscoverer>]) -> Self {
        Self { discoverers }
    }

    /// True if any registered discoverer needs a semantic model
    pub fn needs_semantic_model(&self) -> bool {
        self.discoverers.iter().any(|d| d.needs_semantic_model())
    }

    /// Element for `declaration` with features from every discoverer, in
    /// registration order. A failing discoverer contributes nothing.
    pub fn build(
        &self,
        declaration: &Declaration<'_>,
        model: Option<&SemanticModel>,
    ) -> OutlineElement {
        let mut element = OutlineElement::new(
            declaration.kind(),
            declaration.display_text(),
            declaration.span(),
        );

        for discoverer in self.discoverers {
            if discoverer.needs_semantic_model() && model.is_none() {
                continue;
            }
            match discoverer.discover(declaration, model) {
                Ok(features) => element.features.extend(features),
                Err(e) => log::warn!(
                    "Feature discoverer '{}' failed on {} '{}': {e:#}",
                    discoverer.name(),
                    declaration.kind().as_str(),
                    element.display_text()
                ),
            }
        }

        element
    }
}
