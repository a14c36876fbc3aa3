//! Built-in feature discoverers.

use crate::declarations::Declaration;
use crate::discover::FeatureDiscoverer;
use crate::language::Language;
use crate::semantic::SemanticModel;
use crate::types::{ElementKind, SyntaxFeature};

/// Tags functions and methods declared `async`
pub struct AsyncFeatureDiscoverer;

impl FeatureDiscoverer for AsyncFeatureDiscoverer {
    fn name(&self) -> &str {
        "async"
    }

    fn discover(
        &self,
        declaration: &Declaration<'_>,
        _model: Option<&SemanticModel>,
    ) -> anyhow::Result<Vec<SyntaxFeature>> {
        if declaration.kind().is_callable() && declaration.has_modifier("async") {
            Ok(vec![SyntaxFeature::new("async")])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Tags declarations whose source text contains a marker string
pub struct MarkerFeatureDiscoverer {
    marker: String,
    feature: String,
    kinds: Vec<ElementKind>,
}

impl MarkerFeatureDiscoverer {
    pub fn new(marker: impl Into<String>, feature: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            feature: feature.into(),
            kinds: Vec::new(),
        }
    }

    /// Restrict tagging to these kinds (empty = every kind)
    #[must_use]
    pub fn for_kinds(mut self, kinds: impl IntoIterator<Item = ElementKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }
}

impl FeatureDiscoverer for MarkerFeatureDiscoverer {
    fn name(&self) -> &str {
        &self.feature
    }

    fn discover(
        &self,
        declaration: &Declaration<'_>,
        _model: Option<&SemanticModel>,
    ) -> anyhow::Result<Vec<SyntaxFeature>> {
        let kind_matches = self.kinds.is_empty() || self.kinds.contains(&declaration.kind());
        if kind_matches && declaration.text().contains(&self.marker) {
            Ok(vec![SyntaxFeature::new(self.feature.clone())])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Tags test functions and test modules
pub struct TestFeatureDiscoverer;

impl TestFeatureDiscoverer {
    fn is_test_attribute(attribute: &str) -> bool {
        let inner = attribute
            .trim_start_matches("#[")
            .trim_end_matches(']')
            .trim();
        let path = inner.split('(').next().unwrap_or(inner).trim();
        if path == "cfg" {
            return inner.replace(' ', "") == "cfg(test)";
        }
        matches!(path.rsplit("::").next(), Some("test" | "rstest"))
    }

    /// `[Fact]`, `[TestMethod, Timeout(10)]`, `[NUnit.Framework.Test]`
    fn is_test_attribute_list(list: &str) -> bool {
        list.trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .filter_map(|attribute| attribute.split('(').next())
            .filter_map(|path| path.trim().rsplit('.').next())
            .map(|name| name.strip_suffix("Attribute").unwrap_or(name))
            .any(|name| matches!(name, "Fact" | "Theory" | "Test" | "TestCase" | "TestMethod"))
    }
}

impl FeatureDiscoverer for TestFeatureDiscoverer {
    fn name(&self) -> &str {
        "test"
    }

    fn discover(
        &self,
        declaration: &Declaration<'_>,
        _model: Option<&SemanticModel>,
    ) -> anyhow::Result<Vec<SyntaxFeature>> {
        let kind = declaration.kind();
        let is_test = match declaration.language() {
            Language::Rust => {
                (kind.is_callable() || kind == ElementKind::Module)
                    && declaration
                        .attributes()
                        .iter()
                        .any(|attr| Self::is_test_attribute(attr))
            }
            Language::Python => kind.is_callable() && declaration.name().starts_with("test"),
            Language::CSharp => {
                kind == ElementKind::Method
                    && declaration
                        .attributes()
                        .iter()
                        .any(|list| Self::is_test_attribute_list(list))
            }
            language if language.is_script() => {
                kind == ElementKind::Method && declaration.name().starts_with("test")
            }
            _ => false,
        };

        Ok(if is_test {
            vec![SyntaxFeature::new("test")]
        } else {
            Vec::new()
        })
    }
}

/// Tags declarations with the number of times their name is used
pub struct ReferenceCountDiscoverer;

impl FeatureDiscoverer for ReferenceCountDiscoverer {
    fn name(&self) -> &str {
        "references"
    }

    fn needs_semantic_model(&self) -> bool {
        true
    }

    fn discover(
        &self,
        declaration: &Declaration<'_>,
        model: Option<&SemanticModel>,
    ) -> anyhow::Result<Vec<SyntaxFeature>> {
        let Some(model) = model else {
            return Ok(Vec::new());
        };
        let count = model.reference_count(declaration.name());
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![SyntaxFeature::with_data("references", count.to_string())])
    }
}
