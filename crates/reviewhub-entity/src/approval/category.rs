//! Approval categories and their allowed values.
//!
//! Categories are not stored in the database; they are built from the
//! `review.approval_types` configuration section at startup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use reviewhub_core::AppError;
use reviewhub_core::config::ApprovalTypeConfig;

use super::model::ApprovalCategoryId;

/// A voting dimension such as "Code Review".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCategory {
    /// Short identifier stored with votes.
    pub id: ApprovalCategoryId,
    /// Human-readable name.
    pub name: String,
    /// Display order.
    pub position: usize,
}

/// An allowed vote within a category, with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCategoryValue {
    /// Category the value belongs to.
    pub category_id: ApprovalCategoryId,
    /// Numeric vote.
    pub value: i16,
    /// Description used in change messages.
    pub name: String,
}

/// A requested vote: a category plus a value in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalCategoryValueId {
    /// Category voted in.
    pub category_id: ApprovalCategoryId,
    /// Requested vote.
    pub value: i16,
}

impl ApprovalCategoryValueId {
    /// Create a vote selection.
    pub fn new(category_id: ApprovalCategoryId, value: i16) -> Self {
        Self { category_id, value }
    }
}

impl fmt::Display for ApprovalCategoryValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:+}", self.category_id, self.value)
    }
}

impl FromStr for ApprovalCategoryValueId {
    type Err = AppError;

    /// Parse `CATEGORY=VALUE`, e.g. `CRVW=+2` or `VRIF=-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AppError::validation(format!(
                "Invalid approval '{s}'. Expected CATEGORY=VALUE, e.g. CRVW=+2"
            ))
        };
        let (category, value) = s.split_once('=').ok_or_else(invalid)?;
        let category = category.trim();
        if category.is_empty() {
            return Err(invalid());
        }
        let value = value.trim().parse::<i16>().map_err(|_| invalid())?;
        Ok(Self::new(ApprovalCategoryId::new(category), value))
    }
}

/// A configured category together with the values it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalType {
    /// The category.
    pub category: ApprovalCategory,
    /// Allowed values, highest first.
    pub values: Vec<ApprovalCategoryValue>,
}

impl ApprovalType {
    /// Build an approval type from its configuration entry.
    pub fn from_config(position: usize, config: &ApprovalTypeConfig) -> Self {
        let id = ApprovalCategoryId::new(config.id.trim());
        let mut values: Vec<ApprovalCategoryValue> = config
            .values
            .iter()
            .map(|v| ApprovalCategoryValue {
                category_id: id.clone(),
                value: v.value,
                name: v.name.clone(),
            })
            .collect();
        values.sort_by(|a, b| b.value.cmp(&a.value));

        Self {
            category: ApprovalCategory {
                id,
                name: config.name.clone(),
                position,
            },
            values,
        }
    }

    /// Category identifier.
    pub fn id(&self) -> &ApprovalCategoryId {
        &self.category.id
    }

    /// Look up an allowed value, returning `None` if the vote is not permitted.
    pub fn value(&self, value: i16) -> Option<&ApprovalCategoryValue> {
        self.values.iter().find(|v| v.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewhub_core::config::ReviewConfig;

    fn code_review() -> ApprovalType {
        let cfg = ReviewConfig::default();
        ApprovalType::from_config(1, &cfg.approval_types[1])
    }

    #[test]
    fn test_from_config_orders_values() {
        let at = code_review();
        assert_eq!(at.id().as_str(), "CRVW");
        assert_eq!(at.category.position, 1);
        let votes: Vec<i16> = at.values.iter().map(|v| v.value).collect();
        assert_eq!(votes, vec![2, 1, 0, -1, -2]);
    }

    #[test]
    fn test_value_lookup() {
        let at = code_review();
        assert_eq!(
            at.value(2).map(|v| v.name.as_str()),
            Some("Looks good to me, approved")
        );
        assert!(at.value(3).is_none());
    }

    #[test]
    fn test_parse_selection() {
        let sel: ApprovalCategoryValueId = "CRVW=+2".parse().expect("parse");
        assert_eq!(sel.category_id.as_str(), "CRVW");
        assert_eq!(sel.value, 2);
        assert_eq!(sel.to_string(), "CRVW=+2");

        let sel: ApprovalCategoryValueId = "VRIF=-1".parse().expect("parse");
        assert_eq!(sel.value, -1);

        assert!("CRVW".parse::<ApprovalCategoryValueId>().is_err());
        assert!("=1".parse::<ApprovalCategoryValueId>().is_err());
        assert!("CRVW=yes".parse::<ApprovalCategoryValueId>().is_err());
    }
}
