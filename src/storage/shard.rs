//! One persisted package: every class of that package in scan order

use crate::types::ClassDeclaration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageShard {
    pub package: String,
    /// Simple name to declaration; JSON key order is scan order
    pub classes: IndexMap<String, ClassDeclaration>,
}

impl PackageShard {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            classes: IndexMap::new(),
        }
    }

    /// Insert a class. A repeated simple name replaces the earlier
    /// declaration but keeps its position.
    pub fn insert(&mut self, simple_name: String, declaration: ClassDeclaration) {
        self.classes.insert(simple_name, declaration);
    }

    pub fn get(&self, simple_name: &str) -> Option<&ClassDeclaration> {
        self.classes.get(simple_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
