//! Document configuration
//!
//! Settings are read from TOML. A default configuration binding the `lmnl`,
//! `xml` and `tei` prefixes is embedded in the crate and parsed once on
//! first use.

use crate::error::{LomError, Result};
use crate::factory::{AnnotationFactory, DefaultAnnotationFactory, KindRestrictedFactory};
use crate::namespace::{NamespaceContext, LMNL_NS_URI, LMNL_PREFIX};
use crate::node::AnnotationKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

static EMBEDDED_CONFIG: OnceLock<LomConfig> = OnceLock::new();

const EMBEDDED_TOML: &str = include_str!("../configs/lom.toml");

/// Complete document configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LomConfig {
    /// Root node settings
    #[serde(default)]
    pub document: DocumentSettings,
    /// Prefix bindings of the root namespace context
    #[serde(default)]
    pub namespaces: Vec<NamespaceBinding>,
    /// Annotation factory settings
    #[serde(default)]
    pub factory: FactorySettings,
}

/// Settings of the document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Base URI node URIs are resolved against
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    /// Prefix of the root's name
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Local part of the root's name
    #[serde(default = "default_local_name")]
    pub local_name: String,
}

/// One prefix binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBinding {
    /// Namespace prefix
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

/// Which annotation factory a document gets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorySettings {
    /// Restrict the factory to these kinds (all kinds when absent)
    #[serde(default)]
    pub kinds: Option<Vec<AnnotationKind>>,
}

fn default_base_uri() -> String {
    "urn:lmnl:document".to_string()
}

fn default_prefix() -> String {
    LMNL_PREFIX.to_string()
}

fn default_local_name() -> String {
    "document".to_string()
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            prefix: default_prefix(),
            local_name: default_local_name(),
        }
    }
}

impl Default for LomConfig {
    fn default() -> Self {
        Self {
            document: DocumentSettings::default(),
            namespaces: vec![NamespaceBinding {
                prefix: LMNL_PREFIX.to_string(),
                uri: LMNL_NS_URI.to_string(),
            }],
            factory: FactorySettings::default(),
        }
    }
}

impl LomConfig {
    /// The configuration embedded in the crate
    pub fn embedded() -> Result<&'static LomConfig> {
        if let Some(config) = EMBEDDED_CONFIG.get() {
            return Ok(config);
        }
        let parsed = Self::from_toml_str(EMBEDDED_TOML)
            .map_err(|e| LomError::Config(format!("embedded configuration: {e}")))?;
        Ok(EMBEDDED_CONFIG.get_or_init(|| parsed))
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LomConfig = toml::from_str(content)
            .map_err(|e| LomError::Config(format!("failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LomError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
            .map_err(|e| LomError::Config(format!("{}: {e}", path.display())))
    }

    /// Add a prefix binding
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceBinding {
            prefix: prefix.into(),
            uri: uri.into(),
        });
        self
    }

    /// Replace the base URI
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.document.base_uri = base_uri.into();
        self
    }

    /// Restrict the annotation factory to `kinds`
    pub fn with_factory_kinds(mut self, kinds: impl IntoIterator<Item = AnnotationKind>) -> Self {
        self.factory.kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Check the settings for consistency
    pub fn validate(&self) -> Result<()> {
        if self.document.base_uri.is_empty() {
            return Err(LomError::Config("document base URI must not be empty".into()));
        }
        if self.document.local_name.is_empty() {
            return Err(LomError::Config(
                "document local name must not be empty".into(),
            ));
        }

        let context = self.namespace_context()?;
        if !self.document.prefix.is_empty() && context.resolve(&self.document.prefix).is_none() {
            return Err(LomError::Config(format!(
                "document prefix '{}' is not bound",
                self.document.prefix
            )));
        }
        Ok(())
    }

    /// Root namespace context described by the bindings
    pub fn namespace_context(&self) -> Result<NamespaceContext> {
        let mut context = NamespaceContext::new();
        for binding in &self.namespaces {
            if binding.prefix.is_empty() || binding.uri.is_empty() {
                return Err(LomError::Config(format!(
                    "namespace binding '{}' = '{}' has an empty part",
                    binding.prefix, binding.uri
                )));
            }
            context
                .bind(binding.prefix.as_str(), binding.uri.as_str())
                .map_err(|e| LomError::Config(e.to_string()))?;
        }
        Ok(context)
    }

    /// Annotation factory described by the factory settings
    pub fn annotation_factory(&self) -> Box<dyn AnnotationFactory> {
        match &self.factory.kinds {
            Some(kinds) => Box::new(KindRestrictedFactory::new(kinds.iter().copied())),
            None => Box::new(DefaultAnnotationFactory::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config() {
        let config = LomConfig::embedded().expect("embedded config should parse");
        let context = config.namespace_context().unwrap();
        assert_eq!(context.resolve("lmnl"), Some(LMNL_NS_URI));
        assert_eq!(context.resolve("tei"), Some("http://www.tei-c.org/ns/1.0"));
        assert_eq!(
            context.resolve("xml"),
            Some("http://www.w3.org/XML/1998/namespace")
        );
        assert_eq!(config.document.local_name, "document");
    }

    #[test]
    fn test_embedded_config_is_parsed_once() {
        let first = LomConfig::embedded().unwrap();
        let second = LomConfig::embedded().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = LomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.namespaces.len(), 1);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = LomConfig::from_toml_str(
            r#"
            [[namespaces]]
            prefix = "lmnl"
            uri = "http://lmnl.net/namespaces/lmnl"
            "#,
        )
        .unwrap();
        assert_eq!(config.document, DocumentSettings::default());
        assert_eq!(config.factory.kinds, None);
    }

    #[test]
    fn test_factory_kinds() {
        let config = LomConfig::from_toml_str(
            r#"
            [document]
            prefix = ""

            [factory]
            kinds = ["element", "processing-instruction"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.factory.kinds,
            Some(vec![
                AnnotationKind::Element,
                AnnotationKind::ProcessingInstruction
            ])
        );
    }

    #[test]
    fn test_conflicting_bindings_rejected() {
        let config = LomConfig::default().with_namespace("lmnl", "urn:not-lmnl");
        assert!(matches!(config.validate(), Err(LomError::Config(_))));
    }

    #[test]
    fn test_duplicate_identical_bindings_accepted() {
        let config = LomConfig::default().with_namespace("lmnl", LMNL_NS_URI);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert!(LomConfig::default().with_namespace("", "urn:a").validate().is_err());
        assert!(LomConfig::default().with_namespace("a", "").validate().is_err());
        assert!(LomConfig::default().with_base_uri("").validate().is_err());
    }

    #[test]
    fn test_unbound_document_prefix_rejected() {
        let mut config = LomConfig::default();
        config.document.prefix = "tei".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = LomConfig::from_toml_str("[document\nprefix = 1").unwrap_err();
        assert!(err.to_string().contains("failed to parse configuration"));
    }
}
