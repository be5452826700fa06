//! Per-column chunk options, loadable from YAML text.
//!
//! ```yaml
//! columns:
//!   - name: zip
//!     force_categorical: true
//!   - name: amount
//!     capacity_hint: 65536
//! ```
//!
//! Columns missing from the list get [`ColumnConfig::new`] defaults.

use std::collections::HashSet;

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::chunk::ColumnChunk;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub name: String,
    /// Treat every value as text from the first row on, e.g. zip codes or
    /// identifiers that only look numeric.
    pub force_categorical: bool,
    /// Slots reserved in the numeric store before the first append.
    pub capacity_hint: usize,
}

impl ColumnConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl ChunkConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: ChunkConfig =
            serde_yaml::from_str(text).context("Parsing chunk configuration YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing chunk configuration to YAML")
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (idx, column) in self.columns.iter().enumerate() {
            ensure!(
                !column.name.trim().is_empty(),
                "Column configuration at position {} has an empty name",
                idx + 1
            );
            if !seen.insert(column.name.as_str()) {
                bail!("Duplicate column configuration for '{}'", column.name);
            }
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> ColumnConfig {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .cloned()
            .unwrap_or_else(|| ColumnConfig::new(name))
    }

    /// One fresh chunk per header, in header order.
    pub fn build_chunks(&self, headers: &[String]) -> Vec<ColumnChunk> {
        headers
            .iter()
            .map(|header| ColumnChunk::from_config(&self.column(header)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_falls_back_to_defaults() {
        let config = ChunkConfig::default();
        let column = config.column("price");
        assert_eq!(column.name, "price");
        assert!(!column.force_categorical);
        assert_eq!(column.capacity_hint, 0);
    }

    #[test]
    fn validate_rejects_blank_names() {
        let config = ChunkConfig {
            columns: vec![ColumnConfig::new(" ")],
        };
        let err = config.validate().expect_err("blank name should fail");
        assert!(err.to_string().contains("position 1"));
    }
}
