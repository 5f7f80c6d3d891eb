//! Registry of the configured approval types.

use std::collections::HashMap;

use reviewhub_core::config::ReviewConfig;
use reviewhub_entity::{ApprovalCategoryId, ApprovalType};

/// The approval types this server accepts votes in, in configured order.
#[derive(Debug, Clone, Default)]
pub struct ApprovalTypes {
    types: Vec<ApprovalType>,
    by_id: HashMap<ApprovalCategoryId, usize>,
}

impl ApprovalTypes {
    /// Creates a registry from already built approval types.
    pub fn new(types: Vec<ApprovalType>) -> Self {
        let by_id = types
            .iter()
            .enumerate()
            .map(|(i, at)| (at.id().clone(), i))
            .collect();
        Self { types, by_id }
    }

    /// Builds the registry from the `review` configuration section.
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self::new(
            config
                .approval_types
                .iter()
                .enumerate()
                .map(|(position, at)| ApprovalType::from_config(position, at))
                .collect(),
        )
    }

    /// Iterates the types in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &ApprovalType> {
        self.types.iter()
    }

    /// Looks up a type by category id.
    pub fn get(&self, id: &ApprovalCategoryId) -> Option<&ApprovalType> {
        self.by_id.get(id).and_then(|&i| self.types.get(i))
    }

    /// Number of configured types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are configured.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let types = ApprovalTypes::from_config(&ReviewConfig::default());
        assert_eq!(types.len(), 2);

        let ids: Vec<&str> = types.iter().map(|at| at.id().as_str()).collect();
        assert_eq!(ids, vec!["VRIF", "CRVW"]);

        let crvw = types
            .get(&ApprovalCategoryId::new("CRVW"))
            .expect("CRVW configured");
        assert_eq!(crvw.category.name, "Code Review");
        assert_eq!(crvw.category.position, 1);
        assert!(types.get(&ApprovalCategoryId::new("SUBM")).is_none());
    }
}
