use crate::error::{OutlineError, Result};
use crate::language::Language;
use crate::semantic::SemanticModel;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tree_sitter::{Node, Parser, Tree};

/// A parsed source file: tree-sitter tree plus the text it was parsed from
#[derive(Debug)]
pub struct SyntaxTree {
    tree: Tree,
    source: Arc<str>,
    language: Language,
}

impl SyntaxTree {
    /// Parse `source` with the grammar for `language`
    pub fn parse(source: impl Into<Arc<str>>, language: Language) -> Result<Self> {
        let source = source.into();
        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| OutlineError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| OutlineError::parse("Failed to parse source code"))?;

        Ok(Self {
            tree,
            source,
            language,
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Source text covered by `node` (empty if the range is not valid UTF-8)
    pub fn text_of(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }
}

/// A source file seen through one project
///
/// Both the syntax tree and the semantic model are computed on demand and
/// may be expensive; callers await them only when needed.
#[async_trait]
pub trait Document: Send + Sync {
    /// Name of the project this view of the file belongs to
    fn project(&self) -> &str;

    /// Syntax tree, or `None` when the file cannot be parsed
    async fn syntax_tree(&self) -> Option<Arc<SyntaxTree>>;

    /// Semantic model, or `None` when it is unavailable
    async fn semantic_model(&self) -> Option<Arc<SemanticModel>>;
}

/// In-memory source file parsed with tree-sitter
pub struct SourceDocument {
    project: String,
    path: PathBuf,
    language: Language,
    source: Arc<str>,
    tree: OnceCell<Option<Arc<SyntaxTree>>>,
    model: OnceCell<Option<Arc<SemanticModel>>>,
}

impl SourceDocument {
    /// Create a document, detecting the language from `path`
    pub fn new(project: impl Into<String>, path: impl Into<PathBuf>, source: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        let language = Language::from_path(&path);
        Self::with_language(project, path, language, source)
    }

    pub fn with_language(
        project: impl Into<String>,
        path: impl Into<PathBuf>,
        language: Language,
        source: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            project: project.into(),
            path: path.into(),
            language,
            source: source.into(),
            tree: OnceCell::new(),
            model: OnceCell::new(),
        }
    }

    /// Read a document from disk
    pub async fn load(project: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(project, path, source))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[async_trait]
impl Document for SourceDocument {
    fn project(&self) -> &str {
        &self.project
    }

    async fn syntax_tree(&self) -> Option<Arc<SyntaxTree>> {
        self.tree
            .get_or_init(|| async {
                if !self.language.supports_ast() {
                    log::debug!(
                        "No grammar for {} ({})",
                        self.path.display(),
                        self.language.as_str()
                    );
                    return None;
                }
                match SyntaxTree::parse(self.source.clone(), self.language) {
                    Ok(tree) => Some(Arc::new(tree)),
                    Err(e) => {
                        log::warn!("Failed to parse {}: {e}", self.path.display());
                        None
                    }
                }
            })
            .await
            .clone()
    }

    async fn semantic_model(&self) -> Option<Arc<SemanticModel>> {
        self.model
            .get_or_init(|| async {
                let tree = self.syntax_tree().await?;
                log::debug!("Building semantic model for {}", self.path.display());
                Some(Arc::new(SemanticModel::build(&tree)))
            })
            .await
            .clone()
    }
}
