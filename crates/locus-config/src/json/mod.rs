//! package.json descriptor parsing
//!
//! Only the fields module resolution reads are modelled; everything else in
//! a descriptor is ignored during deserialization.

use camino::Utf8Path;
use locus_core::error::LocusError;
use locus_core::fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigResult;

/// The resolution-relevant subset of a package.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Declared package name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared package version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// CommonJS entry point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// TypeScript types entry point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,

    /// TypeScript typings entry point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typings: Option<String>,

    /// Module type (commonjs or module)
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub module_type: Option<String>,

    /// Conditional / subpath exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exports: Option<Value>,
}

impl PackageJson {
    /// Declared (name, version), when both are present
    pub fn name_and_version(&self) -> Option<(&str, &str)> {
        Some((self.name.as_deref()?, self.version.as_deref()?))
    }

    /// `types`, falling back to `typings`
    pub fn types_entry(&self) -> Option<&str> {
        self.types.as_deref().or(self.typings.as_deref())
    }

    /// Resolve the `"."` export target for the given condition names
    ///
    /// Conditions are matched in the order the descriptor declares them, as
    /// Node does; `default` always matches.
    pub fn root_export(&self, conditions: &[&str]) -> Option<&str> {
        let exports = self.exports.as_ref()?;
        match exports {
            Value::Object(map) if map.keys().any(|k| k.starts_with('.')) => {
                resolve_export_target(map.get(".")?, conditions)
            },
            other => resolve_export_target(other, conditions),
        }
    }
}

fn resolve_export_target<'a>(target: &'a Value, conditions: &[&str]) -> Option<&'a str> {
    match target {
        Value::String(path) => Some(path.as_str()),
        Value::Array(candidates) => candidates
            .iter()
            .find_map(|candidate| resolve_export_target(candidate, conditions)),
        Value::Object(map) => map
            .iter()
            .filter(|(condition, _)| {
                condition.as_str() == "default" || conditions.contains(&condition.as_str())
            })
            .find_map(|(_, value)| resolve_export_target(value, conditions)),
        _ => None,
    }
}

/// Parse JSON string to a PackageJson descriptor
pub fn parse_package_json(content: &str) -> ConfigResult<PackageJson> {
    serde_json::from_str(content).map_err(|e| LocusError::json("package.json", e))
}

/// Read and parse a package.json through the given filesystem
pub fn read_package_json(fs: &dyn FileSystem, path: &Utf8Path) -> ConfigResult<PackageJson> {
    let content = fs.read_to_string(path)?;

    serde_json::from_str(&content).map_err(|e| LocusError::json(path.as_str(), e))
}


#[cfg(all(test, feature = "property-tests"))]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Descriptors round-trip through serialization unchanged
        #[test]
        fn json_round_trip(
            name in "[a-z][a-z0-9-]{0,20}",
            version in "[0-9]+\\.[0-9]+\\.[0-9]+",
            main in prop::option::of("[a-z]{1,8}\\.js"),
        ) {
            let pkg = PackageJson {
                name: Some(name),
                version: Some(version),
                main,
                ..PackageJson::default()
            };
            let serialized = serde_json::to_string(&pkg).unwrap();
            let parsed = parse_package_json(&serialized).unwrap();
            prop_assert_eq!(pkg, parsed);
        }
    }
}
