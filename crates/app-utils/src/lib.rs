//! # app-utils
//!
//! Non-core helpers around the claim engine:
//! - Model parsers for TOML and YAML documents
//! - Loading a model file by extension
//!
//! Every parser goes through `ModelDocument`, so a model loaded here passes the
//! same checks as one built in code.

#![forbid(unsafe_code)]

pub mod error;

pub mod format {
    //! Model document parsing and serialization
    use crate::error::{Error, Result};
    use core_claims::{ModelDocument, PermissionsModel};
    use std::path::Path;

    /// Trait for model parsers (extensible to other formats)
    pub trait ModelParser {
        /// Parse a model from a string
        fn parse(&self, input: &str) -> Result<PermissionsModel>;
    }

    /// TOML parser implementation
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TomlParser;

    impl ModelParser for TomlParser {
        fn parse(&self, input: &str) -> Result<PermissionsModel> {
            Ok(PermissionsModel::from_toml(input)?)
        }
    }

    /// YAML parser implementation
    #[derive(Debug, Clone, Copy, Default)]
    pub struct YamlParser;

    impl ModelParser for YamlParser {
        fn parse(&self, input: &str) -> Result<PermissionsModel> {
            let document: ModelDocument = serde_yaml::from_str(input)
                .map_err(|e| Error::YamlParseError(e.to_string()))?;
            Ok(PermissionsModel::try_from(document)?)
        }
    }

    /// Supported model file formats
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ModelFormat {
        /// `.toml`
        Toml,
        /// `.yaml` / `.yml`
        Yaml,
    }

    impl ModelFormat {
        /// Pick the format from a file extension (case-insensitive)
        pub fn from_path(path: &Path) -> Result<Self> {
            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();

            match extension.as_str() {
                "toml" => Ok(Self::Toml),
                "yaml" | "yml" => Ok(Self::Yaml),
                _ => Err(Error::UnsupportedFormat(path.display().to_string())),
            }
        }

        /// Parser for this format
        pub fn parser(self) -> &'static dyn ModelParser {
            match self {
                Self::Toml => &TomlParser,
                Self::Yaml => &YamlParser,
            }
        }
    }

    /// Serialize a model to YAML
    pub fn to_yaml(model: &PermissionsModel) -> Result<String> {
        serde_yaml::to_string(&model.to_document())
            .map_err(|e| Error::YamlParseError(format!("YAML serialization error: {}", e)))
    }
}

pub mod loader {
    //! Model file loading

    use crate::error::{Error, Result};
    use crate::format::ModelFormat;
    use core_claims::PermissionsModel;
    use std::path::Path;
    use tracing::info;

    /// Load a model file, choosing the parser by extension
    pub fn load_model(path: impl AsRef<Path>) -> Result<PermissionsModel> {
        let path = path.as_ref();
        let format = ModelFormat::from_path(path)?;
        let input = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let model = format.parser().parse(&input)?;
        info!(
            path = %path.display(),
            ?format,
            definitions = model.len(),
            "permissions model loaded"
        );
        Ok(model)
    }
}

/// Re-export commonly used types
pub use error::{Error, Result};
pub use format::{ModelFormat, ModelParser, TomlParser, YamlParser};
pub use loader::load_model;
