use async_trait::async_trait;
use context_outline::{
    find_element, is_sorted, Declaration, Document, ElementKind, FeatureDiscoverer,
    MarkerFeatureDiscoverer, OutlineElement, ReferenceCountDiscoverer, SemanticModel,
    SourceDocument, StructureComputer, SyntaxFeature, SyntaxTree, TestFeatureDiscoverer,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const FOO_TS: &str = "class Foo {\n    Bar() {}\n}\n";

fn doc(project: &str, path: &str, code: &str) -> Arc<dyn Document> {
    Arc::new(SourceDocument::new(project, path, code))
}

/// Wraps a source document and counts semantic model requests
struct CountingDocument {
    inner: SourceDocument,
    semantic_fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl Document for CountingDocument {
    fn project(&self) -> &str {
        self.inner.project()
    }

    async fn syntax_tree(&self) -> Option<Arc<SyntaxTree>> {
        self.inner.syntax_tree().await
    }

    async fn semantic_model(&self) -> Option<Arc<SemanticModel>> {
        self.semantic_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.semantic_model().await
    }
}

fn counting(project: &str, path: &str, code: &str, counter: &Arc<AtomicUsize>) -> Arc<dyn Document> {
    Arc::new(CountingDocument {
        inner: SourceDocument::new(project, path, code),
        semantic_fetches: counter.clone(),
    })
}

fn projects(element: &OutlineElement) -> Vec<String> {
    element.projects.to_vec()
}

fn feature_names(element: &OutlineElement) -> Vec<&str> {
    element.features.iter().map(|f| f.name.as_str()).collect()
}

fn assert_ordered(roots: &[OutlineElement]) {
    assert!(is_sorted(roots), "roots out of order");
    for root in roots {
        for element in root.walk() {
            assert!(
                is_sorted(&element.children),
                "children of {} out of order",
                element.display_text()
            );
            assert!(!element.projects.is_empty(), "{} has no project", element.display_text());
        }
    }
}

#[tokio::test]
async fn single_document_type_with_method() {
    let roots = StructureComputer::compute_without_features(&[doc("P1", "foo.ts", FOO_TS)]).await;

    assert_eq!(roots.len(), 1);
    let foo = &roots[0];
    assert_eq!(foo.kind, ElementKind::Class);
    assert_eq!(foo.display_text(), "Foo");
    assert_eq!(projects(foo), vec!["P1"]);
    assert_eq!(foo.span().start_line, 0);
    assert_eq!(foo.span().start_column, 6);

    assert_eq!(foo.children.len(), 1);
    let bar = &foo.children[0];
    assert_eq!(bar.kind, ElementKind::Method);
    assert_eq!(bar.display_text(), "Bar");
    assert_eq!(projects(bar), vec!["P1"]);
    assert!(bar.children.is_empty());
    assert!(bar.features.is_empty());
}

#[tokio::test]
async fn same_file_in_two_projects_collapses() {
    let documents = [doc("P1", "foo.ts", FOO_TS), doc("P2", "foo.ts", FOO_TS)];
    let roots = StructureComputer::compute_without_features(&documents).await;

    assert_eq!(roots.len(), 1);
    let foo = &roots[0];
    assert_eq!(projects(foo), vec!["P1", "P2"]);
    assert_eq!(foo.children.len(), 1);
    assert_eq!(projects(&foo.children[0]), vec!["P1", "P2"]);
}

#[tokio::test]
async fn project_order_follows_document_order() {
    let documents = [
        doc("P2", "foo.ts", FOO_TS),
        doc("P1", "foo.ts", FOO_TS),
        doc("P2", "foo.ts", FOO_TS),
    ];
    let roots = StructureComputer::compute_without_features(&documents).await;
    assert_eq!(projects(&roots[0]), vec!["P2", "P1"]);
}

#[tokio::test]
async fn diverging_views_keep_shared_and_unique_members() {
    let debug_view = "class Foo {\n    Bar() {}\n}\n";
    let release_view = "class Foo {\n    Bar() {}\n    Baz() {}\n}\n";
    let documents = [
        doc("Debug", "foo.ts", debug_view),
        doc("Release", "foo.ts", release_view),
    ];
    let roots = StructureComputer::compute_without_features(&documents).await;

    assert_eq!(roots.len(), 1);
    let foo = &roots[0];
    let children: Vec<_> = foo.children.iter().map(OutlineElement::display_text).collect();
    assert_eq!(children, vec!["Bar", "Baz"]);
    assert_eq!(projects(foo), vec!["Debug", "Release"]);
    assert_eq!(projects(&foo.children[0]), vec!["Debug", "Release"]);
    assert_eq!(projects(&foo.children[1]), vec!["Release"]);
    assert_ordered(&roots);
}

#[tokio::test]
async fn marker_features_follow_registration_order() {
    let code = r#"
class Loader {
    async fetch() { await this.load(); }
    load() { return 1; }
    async retry() { await this.fetch(); }
}
"#;
    let discoverers: Vec<Box<dyn FeatureDiscoverer>> = vec![
        Box::new(MarkerFeatureDiscoverer::new("await", "async").for_kinds([ElementKind::Method])),
        Box::new(MarkerFeatureDiscoverer::new("fetch", "fetches").for_kinds([ElementKind::Method])),
    ];
    let roots = StructureComputer::compute(&[doc("P1", "loader.ts", code)], &discoverers).await;

    let loader = &roots[0];
    assert!(loader.features.is_empty());
    let fetch = loader.child("fetch").unwrap();
    let load = loader.child("load").unwrap();
    let retry = loader.child("retry").unwrap();

    assert_eq!(feature_names(fetch), vec!["async", "fetches"]);
    assert!(feature_names(load).is_empty());
    assert_eq!(feature_names(retry), vec!["async", "fetches"]);
}

#[tokio::test]
async fn semantic_model_is_not_fetched_without_need() {
    let counter = Arc::new(AtomicUsize::new(0));
    let documents = [
        counting("P1", "foo.ts", FOO_TS, &counter),
        counting("P2", "foo.ts", FOO_TS, &counter),
    ];

    let syntax_only: Vec<Box<dyn FeatureDiscoverer>> = vec![
        Box::new(TestFeatureDiscoverer),
        Box::new(MarkerFeatureDiscoverer::new("Bar", "bar")),
    ];
    let roots = StructureComputer::compute(&documents, &syntax_only).await;
    assert_eq!(roots.len(), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    StructureComputer::compute_without_features(&documents).await;
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn semantic_model_is_fetched_once_per_document_when_needed() {
    let counter = Arc::new(AtomicUsize::new(0));
    let code = "struct Point;\n\nfn origin() -> Point { Point }\n";
    let documents = [
        counting("P1", "geo.rs", code, &counter),
        counting("P2", "geo.rs", code, &counter),
    ];
    let discoverers: Vec<Box<dyn FeatureDiscoverer>> = vec![Box::new(ReferenceCountDiscoverer)];

    let roots = StructureComputer::compute(&documents, &discoverers).await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    let point = find_element(&roots, &["Point"]).unwrap();
    assert_eq!(point.features, vec![SyntaxFeature::with_data("references", "2")]);
    assert_eq!(projects(point), vec!["P1", "P2"]);
    let origin = find_element(&roots, &["origin"]).unwrap();
    assert!(origin.features.is_empty());
}

#[tokio::test]
async fn documents_without_syntax_tree_contribute_nothing() {
    let documents = [
        doc("Go", "main.go", "package main\nfunc main() {}\n"),
        doc("P1", "foo.ts", FOO_TS),
        doc("Blank", "empty.py", ""),
    ];
    let roots = StructureComputer::compute_without_features(&documents).await;

    assert_eq!(roots.len(), 1);
    assert_eq!(projects(&roots[0]), vec!["P1"]);
}

/// Records the order in which the walker asks for syntax and semantics
struct RecordingDocument {
    inner: SourceDocument,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Document for RecordingDocument {
    fn project(&self) -> &str {
        self.inner.project()
    }

    async fn syntax_tree(&self) -> Option<Arc<SyntaxTree>> {
        self.calls.lock().unwrap().push("syntax");
        self.inner.syntax_tree().await
    }

    async fn semantic_model(&self) -> Option<Arc<SemanticModel>> {
        self.calls.lock().unwrap().push("semantic");
        self.inner.semantic_model().await
    }
}

#[tokio::test]
async fn semantic_model_is_requested_before_syntax_tree() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let documents: [Arc<dyn Document>; 1] = [Arc::new(RecordingDocument {
        inner: SourceDocument::new("P1", "geo.rs", "struct Point;\n"),
        calls: calls.clone(),
    })];
    let discoverers: Vec<Box<dyn FeatureDiscoverer>> = vec![Box::new(ReferenceCountDiscoverer)];

    StructureComputer::compute(&documents, &discoverers).await;
    assert_eq!(*calls.lock().unwrap(), vec!["semantic", "syntax"]);

    calls.lock().unwrap().clear();
    StructureComputer::compute_without_features(&documents).await;
    assert_eq!(*calls.lock().unwrap(), vec!["syntax"]);
}

#[tokio::test]
async fn csharp_outline_with_event_field() {
    let code = "class Foo { public event System.EventHandler Changed; void Bar() {} }";
    let roots = StructureComputer::compute_without_features(&[
        doc("P1", "Foo.cs", code),
        doc("P2", "Foo.cs", code),
    ])
    .await;

    assert_eq!(roots.len(), 1);
    let foo = &roots[0];
    assert_eq!(foo.kind, ElementKind::Class);
    assert_eq!(projects(foo), vec!["P1", "P2"]);
    let children: Vec<_> = foo
        .children
        .iter()
        .map(|c| (c.kind, c.display_text()))
        .collect();
    assert_eq!(
        children,
        vec![(ElementKind::Event, "Changed"), (ElementKind::Method, "Bar")]
    );
    assert_ordered(&roots);
}

#[tokio::test]
async fn type_literal_members_stay_out_of_the_forest() {
    let code = "type Opts = { a: string; b(): void };\nclass C { m() {} }\n";
    let roots = StructureComputer::compute_without_features(&[doc("P1", "opts.ts", code)]).await;

    let names: Vec<_> = roots.iter().map(|r| (r.kind, r.display_text())).collect();
    assert_eq!(names, vec![(ElementKind::Class, "C")]);
}

#[tokio::test]
async fn tsx_documents_are_outlined() {
    let code = "export class Foo {\n  render() { return <div />; }\n}\n";
    let roots = StructureComputer::compute_without_features(&[doc("P1", "Foo.tsx", code)]).await;

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].display_text(), "Foo");
    assert_eq!(roots[0].children[0].display_text(), "render");
}

#[tokio::test]
async fn empty_input_yields_empty_forest() {
    let roots = StructureComputer::compute_without_features(&[]).await;
    assert!(roots.is_empty());
}

#[tokio::test]
async fn declarations_under_unrecognized_constructs_attach_to_nearest_recognized_parent() {
    let code = r#"
class Settings:
    if TYPE_CHECKING:
        cache = None
        def typed(self):
            pass

    def load(self):
        pass
"#;
    let roots = StructureComputer::compute_without_features(&[doc("P1", "settings.py", code)]).await;

    assert_eq!(roots.len(), 1);
    let settings = &roots[0];
    let children: Vec<_> = settings
        .children
        .iter()
        .map(|c| (c.kind, c.display_text()))
        .collect();
    assert_eq!(
        children,
        vec![
            (ElementKind::Field, "cache"),
            (ElementKind::Method, "typed"),
            (ElementKind::Method, "load"),
        ]
    );
}

#[tokio::test]
async fn declarations_with_no_recognized_ancestor_attach_to_root() {
    let code = r#"
describe("suite", () => {
    class Fixture {
        setup() {}
    }
});
class Top {}
"#;
    let roots = StructureComputer::compute_without_features(&[doc("P1", "suite.js", code)]).await;

    let names: Vec<_> = roots.iter().map(OutlineElement::display_text).collect();
    assert_eq!(names, vec!["Fixture", "Top"]);
    assert_eq!(roots[0].children[0].display_text(), "setup");
}

#[tokio::test]
async fn method_bodies_are_not_indexed() {
    let code = r#"
fn outer() {
    struct Hidden;
    fn inner() {}
}
"#;
    let roots = StructureComputer::compute_without_features(&[doc("P1", "lib.rs", code)]).await;

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].kind, ElementKind::Function);
    assert!(roots[0].children.is_empty());
}

#[tokio::test]
async fn rust_outline_shape() {
    let code = r#"
pub mod geometry {
    pub struct Point {
        x: f64,
        y: f64,
    }

    impl Point {
        pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
    }

    impl std::fmt::Display for Point {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "({}, {})", self.x, self.y)
        }
    }

    pub enum Axis { X, Y }
}
"#;
    let roots = StructureComputer::compute_without_features(&[doc("core", "geometry.rs", code)]).await;
    assert_ordered(&roots);

    let geometry = find_element(&roots, &["geometry"]).unwrap();
    assert_eq!(geometry.kind, ElementKind::Module);
    let members: Vec<_> = geometry
        .children
        .iter()
        .map(|c| (c.kind, c.display_text()))
        .collect();
    assert_eq!(
        members,
        vec![
            (ElementKind::Struct, "Point"),
            (ElementKind::Impl, "Point"),
            (ElementKind::Impl, "std::fmt::Display for Point"),
            (ElementKind::Enum, "Axis"),
        ]
    );

    let fields: Vec<_> = geometry.children[0]
        .children
        .iter()
        .map(OutlineElement::display_text)
        .collect();
    assert_eq!(fields, vec!["x", "y"]);
    assert_eq!(geometry.children[1].children[0].kind, ElementKind::Method);
    assert_eq!(geometry.children[2].children[0].display_text(), "fmt");
    let variants: Vec<_> = geometry.children[3]
        .children
        .iter()
        .map(|c| (c.kind, c.display_text()))
        .collect();
    assert_eq!(
        variants,
        vec![(ElementKind::EnumMember, "X"), (ElementKind::EnumMember, "Y")]
    );
}

#[tokio::test]
async fn documents_from_different_files_interleave_by_position() {
    let a = "class Alpha {}\n\n\nclass Gamma {}\n";
    let b = "\nclass Beta {}\n";
    let roots = StructureComputer::compute_without_features(&[
        doc("P1", "a.ts", a),
        doc("P1", "b.ts", b),
    ])
    .await;

    let names: Vec<_> = roots.iter().map(OutlineElement::display_text).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    assert_ordered(&roots);
}

#[tokio::test]
async fn compute_is_deterministic() {
    let code = r#"
import os

class Service:
    retries = 3

    def __init__(self):
        pass

    async def test_start(self):
        await self.run()

    def run(self):
        pass
"#;
    let documents = [
        doc("api", "service.py", code),
        doc("worker", "service.py", code),
    ];
    let discoverers: Vec<Box<dyn FeatureDiscoverer>> = vec![
        Box::new(TestFeatureDiscoverer),
        Box::new(ReferenceCountDiscoverer),
    ];

    let first = StructureComputer::compute(&documents, &discoverers).await;
    let second = StructureComputer::compute(&documents, &discoverers).await;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let service = find_element(&first, &["Service"]).unwrap();
    let start = service.child("test_start").unwrap();
    assert_eq!(feature_names(start), vec!["test"]);
    let run = service.child("run").unwrap();
    assert_eq!(run.features, vec![SyntaxFeature::with_data("references", "1")]);
    assert_eq!(service.child("__init__").unwrap().kind, ElementKind::Constructor);
    assert_eq!(service.child("retries").unwrap().kind, ElementKind::Field);
}

struct Exploding;

impl FeatureDiscoverer for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn discover(
        &self,
        declaration: &Declaration<'_>,
        _model: Option<&SemanticModel>,
    ) -> anyhow::Result<Vec<SyntaxFeature>> {
        if declaration.name() == "Bar" {
            anyhow::bail!("cannot inspect {}", declaration.name());
        }
        Ok(vec![SyntaxFeature::new("seen")])
    }
}

#[tokio::test]
async fn failing_discoverer_does_not_abort_the_pass() {
    let discoverers: Vec<Box<dyn FeatureDiscoverer>> = vec![
        Box::new(Exploding),
        Box::new(MarkerFeatureDiscoverer::new("Bar", "bar")),
    ];
    let roots = StructureComputer::compute(&[doc("P1", "foo.ts", FOO_TS)], &discoverers).await;

    let foo = &roots[0];
    assert_eq!(feature_names(foo), vec!["seen", "bar"]);
    assert_eq!(feature_names(&foo.children[0]), vec!["bar"]);
}

#[tokio::test]
async fn serialized_outline_shape() {
    let roots = StructureComputer::compute_without_features(&[doc("P1", "foo.ts", FOO_TS)]).await;
    let json = serde_json::to_value(&roots).unwrap();

    assert_eq!(
        json,
        serde_json::json!([{
            "kind": "Class",
            "span": {
                "startLine": 0,
                "startColumn": 6,
                "endLine": 0,
                "endColumn": 9,
                "displayText": "Foo"
            },
            "children": [{
                "kind": "Method",
                "span": {
                    "startLine": 1,
                    "startColumn": 4,
                    "endLine": 1,
                    "endColumn": 7,
                    "displayText": "Bar"
                },
                "children": [],
                "owningProjects": ["P1"],
                "features": []
            }],
            "owningProjects": ["P1"],
            "features": []
        }])
    );
}
