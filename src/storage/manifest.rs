//! Corpus manifest: the list of indexed packages per namespace

use crate::types::Namespace;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Package lists of both namespaces, each sorted lexically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLists {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

/// Written once per build. The query layer only ever learns which packages
/// exist from here; it never scans the index directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusManifest {
    pub corpus_version: String,
    pub secondary_corpus_version: Option<String>,
    /// RFC 3339 timestamp of the build
    pub generated_at: String,
    pub packages: PackageLists,
}

impl CorpusManifest {
    /// Create a manifest stamped with the current time. Package lists are
    /// sorted and deduplicated.
    pub fn new(
        corpus_version: impl Into<String>,
        secondary_corpus_version: Option<String>,
        mut primary: Vec<String>,
        mut secondary: Vec<String>,
    ) -> Self {
        primary.sort();
        primary.dedup();
        secondary.sort();
        secondary.dedup();

        Self {
            corpus_version: corpus_version.into(),
            secondary_corpus_version,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            packages: PackageLists { primary, secondary },
        }
    }

    pub fn packages(&self, namespace: Namespace) -> &[String] {
        match namespace {
            Namespace::Primary => &self.packages.primary,
            Namespace::Secondary => &self.packages.secondary,
        }
    }

    /// `(namespace, package)` pairs, primary first, each in manifest order
    pub fn all_packages(&self) -> impl Iterator<Item = (Namespace, &str)> {
        Namespace::ALL.into_iter().flat_map(move |namespace| {
            self.packages(namespace)
                .iter()
                .map(move |package| (namespace, package.as_str()))
        })
    }

    pub fn package_count(&self) -> usize {
        self.packages.primary.len() + self.packages.secondary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_sorts_packages() {
        let manifest = CorpusManifest::new(
            "1.21",
            None,
            vec!["net.b".to_string(), "net.a".to_string(), "net.a".to_string()],
            vec![],
        );
        assert_eq!(manifest.packages(Namespace::Primary), ["net.a", "net.b"]);
        assert_eq!(manifest.package_count(), 2);
        assert!(chrono::DateTime::parse_from_rfc3339(&manifest.generated_at).is_ok());
    }

    #[test]
    fn test_manifest_json_shape() {
        let manifest = CorpusManifest::new(
            "1.21",
            Some("0.16".to_string()),
            vec!["net.minecraft".to_string()],
            vec!["net.fabricmc.api".to_string()],
        );
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["corpusVersion"], "1.21");
        assert_eq!(json["secondaryCorpusVersion"], "0.16");
        assert_eq!(json["packages"]["primary"][0], "net.minecraft");
        assert_eq!(json["packages"]["secondary"][0], "net.fabricmc.api");

        let order: Vec<_> = manifest.all_packages().collect();
        assert_eq!(
            order,
            vec![
                (Namespace::Primary, "net.minecraft"),
                (Namespace::Secondary, "net.fabricmc.api")
            ]
        );
    }

    #[test]
    fn test_missing_secondary_version_is_null() {
        let manifest = CorpusManifest::new("1.20", None, vec![], vec![]);
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json["secondaryCorpusVersion"].is_null());
    }
}
