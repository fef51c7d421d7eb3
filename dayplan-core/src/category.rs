//! Coarse project categories used to keep a focus slate balanced.
//!
//! Deterministic exact-match rules over the project label, no LLM. Anything
//! unmapped (or no project at all) lands in `Work`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::task::squash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Project,
}

impl Category {
    /// Rotation order for the balancer.
    pub const ROTATION: [Category; 3] = [Category::Work, Category::Personal, Category::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Project => "Project",
        }
    }
}

/// Project label -> category lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    rules: BTreeMap<String, Category>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for p in ["CRM Dashboard", "Stem Sales", "Business Development"] {
            map.insert(p, Category::Work);
        }
        for p in ["Personal", "Home Improvement", "Learning", "Health"] {
            map.insert(p, Category::Personal);
        }
        map.insert("Command Center", Category::Project);
        map
    }
}

impl CategoryMap {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Add or override a rule. Later inserts win.
    pub fn insert(&mut self, project: &str, category: Category) {
        self.rules.insert(squash(project), category);
    }

    pub fn with(mut self, project: &str, category: Category) -> Self {
        self.insert(project, category);
        self
    }

    pub fn categorize(&self, project: Option<&str>) -> Category {
        project
            .and_then(|p| self.rules.get(&squash(p)).copied())
            .unwrap_or(Category::Work)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
