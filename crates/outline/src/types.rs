use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Category of a declaration site in the outline
///
/// Variant order is significant: it is the tie-break between declarations
/// that start at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Class definition
    Class,
    /// Struct or union definition
    Struct,
    /// Interface or trait definition
    Interface,
    /// Enum definition
    Enum,
    /// Module or namespace
    Module,
    /// Implementation block
    Impl,
    /// Enum variant / member
    EnumMember,
    /// Property or accessor
    Property,
    /// Method inside a type
    Method,
    /// Free-standing function
    Function,
    /// Field or class-level attribute
    Field,
    /// Event field
    Event,
    /// Constructor / initializer
    Constructor,
    /// Constant or static item
    Constant,
}

impl ElementKind {
    /// Composite kinds own nested declarations; leaves do not.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Struct | Self::Interface | Self::Enum | Self::Module | Self::Impl
        )
    }

    /// Functions, methods and constructors
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Method | Self::Function | Self::Constructor)
    }

    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Module => "module",
            Self::Impl => "impl",
            Self::EnumMember => "enum-member",
            Self::Property => "property",
            Self::Method => "method",
            Self::Function => "function",
            Self::Field => "field",
            Self::Event => "event",
            Self::Constructor => "constructor",
            Self::Constant => "constant",
        }
    }
}

/// Source range of a declaration (zero-based lines, byte columns)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Span of a tree-sitter node
    #[must_use]
    pub fn of_node(node: tree_sitter::Node<'_>) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self::new(start.row, start.column, end.row, end.column)
    }
}

/// Display text plus position, serialized together as the `span` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(flatten)]
    pub span: Span,
    pub display_text: String,
}

/// Analysis-derived metadata attached to an element by a discoverer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxFeature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl SyntaxFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    pub fn with_data(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Some(data.into()),
        }
    }
}

/// Insertion-ordered set of project names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSet(IndexSet<String>);

impl ProjectSet {
    /// Append `project` unless it is already present. Returns true when added.
    pub fn insert(&mut self, project: &str) -> bool {
        if self.0.contains(project) {
            return false;
        }
        self.0.insert(project.to_string())
    }

    #[must_use]
    pub fn contains(&self, project: &str) -> bool {
        self.0.contains(project)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Key that totally orders siblings: start position, then kind, then name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderKey<'a> {
    pub line: usize,
    pub column: usize,
    pub kind: ElementKind,
    pub display_text: &'a str,
}

/// One declaration site in the merged outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineElement {
    pub kind: ElementKind,

    #[serde(rename = "span")]
    pub location: Location,

    /// Nested declarations, sorted by [`OrderKey`]
    #[serde(default)]
    pub children: Vec<OutlineElement>,

    /// Projects that contributed this declaration
    #[serde(rename = "owningProjects", default)]
    pub projects: ProjectSet,

    #[serde(default)]
    pub features: Vec<SyntaxFeature>,
}

impl OutlineElement {
    /// Create an unattributed element with no children or features
    pub fn new(kind: ElementKind, display_text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            location: Location {
                span,
                display_text: display_text.into(),
            },
            children: Vec::new(),
            projects: ProjectSet::default(),
            features: Vec::new(),
        }
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.location.display_text
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.location.span
    }

    /// Sibling ordering and identity key. Elements with equal keys are the
    /// same site even when their projects or children differ.
    #[must_use]
    pub fn order_key(&self) -> OrderKey<'_> {
        OrderKey {
            line: self.location.span.start_line,
            column: self.location.span.start_column,
            kind: self.kind,
            display_text: &self.location.display_text,
        }
    }

    /// First direct child with the given display text
    #[must_use]
    pub fn child(&self, display_text: &str) -> Option<&OutlineElement> {
        self.children
            .iter()
            .find(|child| child.display_text() == display_text)
    }

    #[must_use]
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|feature| feature.name == name)
    }

    /// Pre-order traversal of this element and all descendants
    pub fn walk(&self) -> impl Iterator<Item = &OutlineElement> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Follow `path` by display text from the forest roots
#[must_use]
pub fn find_element<'a>(roots: &'a [OutlineElement], path: &[&str]) -> Option<&'a OutlineElement> {
    let (first, rest) = path.split_first()?;
    let mut current = roots.iter().find(|root| root.display_text() == *first)?;
    for segment in rest {
        current = current.child(segment)?;
    }
    Some(current)
}
