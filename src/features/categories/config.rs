//! YAML override for the category table.
//!
//! ```yaml
//! default_label: Другое
//! categories:
//!   - label: Работа
//!     roots: [код, проект, встреч]
//!   - label: Спорт
//!     roots: [зал, бег, трениров]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::classifier::{default_categories, DEFAULT_LABEL};

/// A category label with the roots that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub roots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default = "default_label")]
    pub default_label: String,

    /// Tested in order, first match wins
    pub categories: Vec<CategoryRule>,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            default_label: default_label(),
            categories: default_categories(),
        }
    }
}

impl CategoryConfig {
    /// Load and validate a table from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: CategoryConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config.normalized())
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_label.trim().is_empty() {
            return Err(anyhow::anyhow!("Default category label must not be empty"));
        }

        for rule in &self.categories {
            if rule.label.trim().is_empty() {
                return Err(anyhow::anyhow!("Category label must not be empty"));
            }
            if rule.roots.is_empty() {
                return Err(anyhow::anyhow!("Category '{}' has no roots", rule.label));
            }
            if let Some(root) = rule.roots.iter().find(|root| root.trim().is_empty()) {
                return Err(anyhow::anyhow!(
                    "Category '{}' has an empty root: {:?}",
                    rule.label,
                    root
                ));
            }
        }
        Ok(())
    }

    /// Roots are compared against lowercased words
    fn normalized(mut self) -> Self {
        for rule in &mut self.categories {
            for root in &mut rule.roots {
                *root = root.trim().to_lowercase();
            }
        }
        self
    }
}
