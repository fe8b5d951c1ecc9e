//! Integration tests for model file loading

use app_utils::format::to_yaml;
use app_utils::{load_model, Error, ModelFormat, ModelParser, TomlParser, YamlParser};
use core_claims::{ClaimsError, PermissionsChecker};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const YAML_MODEL: &str = r#"
case_sensitive: false
tokens:
  - name: admin
    aliases: [root]
    includes: ["role:editor"]
  - name: banned
composites:
  - name: role
    tokens:
      - name: editor
        includes: ["role:viewer"]
      - name: viewer
"#;

const TOML_MODEL: &str = r#"
[[tokens]]
name = "admin"
aliases = ["root"]
includes = ["role:editor"]

[[tokens]]
name = "banned"

[[composites]]
name = "role"

[[composites.tokens]]
name = "editor"
includes = ["role:viewer"]

[[composites.tokens]]
name = "viewer"
"#;

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_yaml_and_toml_agree() {
    let from_yaml = YamlParser.parse(YAML_MODEL).unwrap();
    let from_toml = TomlParser.parse(TOML_MODEL).unwrap();
    assert_eq!(from_yaml, from_toml);
}

#[test]
fn test_load_by_extension() {
    for (suffix, content) in [(".toml", TOML_MODEL), (".yaml", YAML_MODEL), (".YML", YAML_MODEL)] {
        let file = write_temp(suffix, content);
        let model = load_model(file.path()).unwrap();

        let checker = PermissionsChecker::new(model);
        assert!(checker.can("root", "role:viewer").unwrap(), "{suffix}");
    }
}

#[test]
fn test_unsupported_extension() {
    let file = write_temp(".json", "{}");
    assert!(matches!(
        load_model(file.path()),
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(ModelFormat::from_path(Path::new("model")).is_err());
}

#[test]
fn test_missing_file() {
    let result = load_model("/nonexistent/dir/model.toml");
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_schema_errors_surface() {
    let file = write_temp(
        ".yaml",
        "tokens:\n  - name: a\n    includes: [b]\n  - name: b\n    includes: [a]\n",
    );
    assert!(matches!(
        load_model(file.path()),
        Err(Error::Model(ClaimsError::IncludeCycle(_)))
    ));
}

#[test]
fn test_malformed_yaml() {
    assert!(matches!(
        YamlParser.parse("tokens: [[["),
        Err(Error::YamlParseError(_))
    ));
}

#[test]
fn test_yaml_round_trip() {
    let model = TomlParser.parse(TOML_MODEL).unwrap();
    let yaml = to_yaml(&model).unwrap();
    assert_eq!(YamlParser.parse(&yaml).unwrap(), model);
}
