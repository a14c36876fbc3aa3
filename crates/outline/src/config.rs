use crate::discover::FeatureDiscoverer;
use crate::error::{OutlineError, Result};
use crate::features::{
    AsyncFeatureDiscoverer, MarkerFeatureDiscoverer, ReferenceCountDiscoverer,
    TestFeatureDiscoverer,
};
use crate::language::Language;
use crate::types::ElementKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Configuration for an outline pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Built-in discoverers to run, in this order
    pub features: Vec<FeatureKind>,

    /// Marker discoverers, run after the built-in ones
    pub markers: Vec<MarkerRule>,

    /// Languages to outline (empty = all supported languages)
    pub languages: Vec<Language>,

    /// Files larger than this are skipped by loaders
    pub max_file_bytes: u64,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            features: vec![FeatureKind::Async, FeatureKind::Test],
            markers: Vec::new(),
            languages: Vec::new(),
            max_file_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Built-in discoverer selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Async,
    Test,
    References,
}

impl FeatureKind {
    pub fn discoverer(self) -> Box<dyn FeatureDiscoverer> {
        match self {
            Self::Async => Box::new(AsyncFeatureDiscoverer),
            Self::Test => Box::new(TestFeatureDiscoverer),
            Self::References => Box::new(ReferenceCountDiscoverer),
        }
    }
}

impl FromStr for FeatureKind {
    type Err = OutlineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "async" => Ok(Self::Async),
            "test" => Ok(Self::Test),
            "references" | "refs" => Ok(Self::References),
            other => Err(OutlineError::invalid_config(format!(
                "unknown feature '{other}' (expected async, test or references)"
            ))),
        }
    }
}

/// Tag declarations whose text contains `marker` with `feature`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule {
    pub marker: String,
    pub feature: String,
    /// Restrict to these kinds (empty = all)
    #[serde(default)]
    pub kinds: Vec<ElementKind>,
}

impl OutlineConfig {
    /// Config with no discoverers at all
    pub fn without_features() -> Self {
        Self {
            features: Vec::new(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_file_bytes == 0 {
            return Err(OutlineError::invalid_config("max_file_bytes must be > 0"));
        }

        for (idx, kind) in self.features.iter().enumerate() {
            if self.features[..idx].contains(kind) {
                return Err(OutlineError::invalid_config(format!(
                    "feature {kind:?} listed more than once"
                )));
            }
        }

        for rule in &self.markers {
            if rule.marker.is_empty() || rule.feature.trim().is_empty() {
                return Err(OutlineError::invalid_config(
                    "marker rules need a non-empty marker and feature",
                ));
            }
        }

        if let Some(lang) = self.languages.iter().find(|lang| !lang.supports_ast()) {
            return Err(OutlineError::unsupported_language(lang.as_str()));
        }

        Ok(())
    }

    /// Instantiate the configured discoverers in registration order
    pub fn discoverers(&self) -> Vec<Box<dyn FeatureDiscoverer>> {
        let mut discoverers: Vec<Box<dyn FeatureDiscoverer>> =
            self.features.iter().map(|kind| kind.discoverer()).collect();
        discoverers.extend(self.markers.iter().map(|rule| {
            Box::new(
                MarkerFeatureDiscoverer::new(&rule.marker, &rule.feature)
                    .for_kinds(rule.kinds.iter().copied()),
            ) as Box<dyn FeatureDiscoverer>
        }));
        discoverers
    }

    pub fn allows_language(&self, language: Language) -> bool {
        language.supports_ast() && (self.languages.is_empty() || self.languages.contains(&language))
    }
}
