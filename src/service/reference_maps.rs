use crate::error::InsightError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct MapRow {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: String,
}

/// A single code-to-label map backed by a `Key,Value` CSV file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeMap {
    entries: HashMap<String, String>,
}

impl CodeMap {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Label for a code; unknown codes pass through unchanged.
    pub fn label(&self, code: &str) -> String {
        self.entries
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn load(path: &Path) -> Result<Self, InsightError> {
        if !path.exists() {
            warn!(path = %path.display(), "reference map not found; codes will pass through unmapped");
            return Ok(Self::default());
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut entries = HashMap::new();
        for row in reader.deserialize::<MapRow>() {
            let row = row?;
            entries.insert(row.key, row.value);
        }
        Ok(Self { entries })
    }
}

/// The five code-to-label maps used to render analytics output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceMaps {
    pub sex: CodeMap,
    pub age: CodeMap,
    pub region: CodeMap,
    pub prescriber: CodeMap,
    pub product: CodeMap,
}

impl ReferenceMaps {
    /// Load all maps from a data directory. Individual missing files degrade
    /// to identity mapping; malformed files are an error.
    pub fn load_from_dir(dir: &Path) -> Result<Self, InsightError> {
        let maps = Self {
            sex: CodeMap::load(&dir.join("sex.csv"))?,
            age: CodeMap::load(&dir.join("age.csv"))?,
            region: CodeMap::load(&dir.join("ben_reg.csv"))?,
            prescriber: CodeMap::load(&dir.join("prescribers.csv"))?,
            product: CodeMap::load(&dir.join("cpi.csv"))?,
        };
        info!(
            path = %dir.display(),
            sex = maps.sex.len(),
            age = maps.age.len(),
            region = maps.region.len(),
            prescriber = maps.prescriber.len(),
            product = maps.product.len(),
            "reference maps loaded"
        );
        Ok(maps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("pharma-insight-maps-{}-{}", std::process::id(), tag));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn loads_key_value_csv() {
        let dir = temp_dir("load");
        fs::write(dir.join("sex.csv"), "Key,Value\n1,Male\n2,Female\n").unwrap();

        let maps = ReferenceMaps::load_from_dir(&dir).expect("maps should load");
        assert_eq!(maps.sex.label("1"), "Male");
        assert_eq!(maps.sex.label("2"), "Female");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_codes_pass_through() {
        let maps = ReferenceMaps::default();
        assert_eq!(maps.region.label("93"), "93");
    }

    #[test]
    fn missing_directory_degrades_to_identity() {
        let mut dir = std::env::temp_dir();
        dir.push("pharma-insight-maps-does-not-exist");
        let maps = ReferenceMaps::load_from_dir(&dir).expect("missing files are not an error");
        assert!(maps.sex.is_empty());
        assert!(maps.product.is_empty());
    }
}
