//! # Context Outline
//!
//! Merged, ordered structure outlines for source files seen through several
//! projects at once.
//!
//! ## Architecture
//!
//! ```text
//! Documents (project + file)
//!     │
//!     ├──> Tree-sitter Parsing → syntax tree
//!     │      └─> Semantic model (only if a discoverer asks for it)
//!     │
//!     ├──> Structure Walker
//!     │    ├─> Classify nodes: composite / leaf / unrecognized
//!     │    ├─> Node Factory → element + feature tags
//!     │    └─> Ordered merge into the parent's children
//!     │
//!     └──> OutlineElement[] (one node per declaration site,
//!          carrying every owning project)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_outline::{Document, SourceDocument, StructureComputer};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let code = "class Foo { Bar() {} }";
//! let documents: Vec<Arc<dyn Document>> = vec![
//!     Arc::new(SourceDocument::new("web", "foo.ts", code)),
//!     Arc::new(SourceDocument::new("mobile", "foo.ts", code)),
//! ];
//!
//! let outline = StructureComputer::compute_without_features(&documents).await;
//! assert_eq!(outline.len(), 1);
//! assert_eq!(outline[0].projects.to_vec(), vec!["web", "mobile"]);
//! # }
//! ```

mod computer;
mod config;
mod declarations;
mod discover;
mod document;
mod error;
mod features;
mod language;
mod merge;
mod semantic;
mod types;
mod walker;

pub use computer::StructureComputer;
pub use config::{FeatureKind, MarkerRule, OutlineConfig};
pub use declarations::{classify, Classified, Declaration};
pub use discover::{FeatureDiscoverer, NodeFactory};
pub use document::{Document, SourceDocument, SyntaxTree};
pub use error::{OutlineError, Result};
pub use features::{
    AsyncFeatureDiscoverer, MarkerFeatureDiscoverer, ReferenceCountDiscoverer,
    TestFeatureDiscoverer,
};
pub use language::Language;
pub use merge::{is_sorted, merge_into};
pub use semantic::SemanticModel;
pub use types::{
    find_element, ElementKind, Location, OrderKey, OutlineElement, ProjectSet, Span,
    SyntaxFeature,
};
pub use walker::StructureWalker;
