use crate::discover::FeatureDiscoverer;
use crate::document::Document;
use crate::types::OutlineElement;
use crate::walker::StructureWalker;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for building a merged outline over many documents
pub struct StructureComputer;

impl StructureComputer {
    /// Walk `documents` in order and return the merged, ordered forest.
    ///
    /// Semantic models are requested only when some discoverer needs one.
    pub async fn compute(
        documents: &[Arc<dyn Document>],
        discoverers: &[Box<dyn FeatureDiscoverer>],
    ) -> Vec<OutlineElement> {
        let started = Instant::now();
        let mut walker = StructureWalker::new(discoverers);

        for document in documents {
            walker.walk_document(document.as_ref()).await;
        }

        let roots = walker.finish();
        log::info!(
            "Computed structure: {} documents, {} root elements in {:?}",
            documents.len(),
            roots.len(),
            started.elapsed()
        );
        roots
    }

    /// [`compute`](Self::compute) with no feature discoverers
    pub async fn compute_without_features(documents: &[Arc<dyn Document>]) -> Vec<OutlineElement> {
        Self::compute(documents, &[]).await
    }
}
