//! Review workflow configuration: approval categories and transaction policy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Review workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Extra attempts made when a review transaction hits a conflict.
    #[serde(default = "default_transaction_retries")]
    pub transaction_retries: u32,
    /// Configured approval categories, in display (and reconciliation) order.
    #[serde(default = "default_approval_types")]
    pub approval_types: Vec<ApprovalTypeConfig>,
}

/// One approval category and the votes it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct ApprovalTypeConfig {
    /// Short category identifier stored with each vote, e.g. `"CRVW"`.
    /// At most four characters, the width of `change_approvals.category_id`.
    #[validate(length(min = 1, max = 4))]
    pub id: String,
    /// Human-readable category name.
    pub name: String,
    /// Allowed votes.
    #[validate(length(min = 1))]
    pub values: Vec<ApprovalValueConfig>,
}

/// A single allowed vote within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalValueConfig {
    /// Numeric vote.
    pub value: i16,
    /// Description recorded in change messages when this vote is cast.
    pub name: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            transaction_retries: default_transaction_retries(),
            approval_types: default_approval_types(),
        }
    }
}

impl ReviewConfig {
    /// Check that approval categories are well formed and uniquely named.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for at in &self.approval_types {
            Validate::validate(at).map_err(|e| {
                AppError::configuration(format!("Invalid approval category '{}': {e}", at.id))
            })?;
            if at.id.trim() != at.id {
                return Err(AppError::configuration(format!(
                    "Approval category id '{}' has surrounding whitespace",
                    at.id
                )));
            }
            if !seen.insert(at.id.as_str()) {
                return Err(AppError::configuration(format!(
                    "Duplicate approval category '{}'",
                    at.id
                )));
            }
            let mut values = HashSet::new();
            for v in &at.values {
                if !values.insert(v.value) {
                    return Err(AppError::configuration(format!(
                        "Approval category '{}' defines value {} twice",
                        at.id, v.value
                    )));
                }
            }
        }
        Ok(())
    }
}

fn default_transaction_retries() -> u32 {
    3
}

fn value(value: i16, name: &str) -> ApprovalValueConfig {
    ApprovalValueConfig {
        value,
        name: name.to_string(),
    }
}

fn default_approval_types() -> Vec<ApprovalTypeConfig> {
    vec![
        ApprovalTypeConfig {
            id: "VRIF".to_string(),
            name: "Verified".to_string(),
            values: vec![
                value(1, "Verified"),
                value(0, "No score"),
                value(-1, "Fails"),
            ],
        },
        ApprovalTypeConfig {
            id: "CRVW".to_string(),
            name: "Code Review".to_string(),
            values: vec![
                value(2, "Looks good to me, approved"),
                value(1, "Looks good to me, but someone else must approve"),
                value(0, "No score"),
                value(-1, "I would prefer that you didn't submit this"),
                value(-2, "Do not submit"),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ReviewConfig::default();
        assert_eq!(cfg.transaction_retries, 3);
        assert_eq!(cfg.approval_types.len(), 2);
        assert_eq!(cfg.approval_types[0].id, "VRIF");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut cfg = ReviewConfig::default();
        let dup = cfg.approval_types[0].clone();
        cfg.approval_types.push(dup);
        let err = cfg.validate().expect_err("duplicate must fail");
        assert!(err.message.contains("Duplicate approval category 'VRIF'"));
    }

    #[test]
    fn test_duplicate_value_rejected() {
        let mut cfg = ReviewConfig::default();
        cfg.approval_types[1].values.push(value(2, "Again"));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_values_rejected() {
        let mut cfg = ReviewConfig::default();
        cfg.approval_types[0].values.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_category_id_longer_than_column_rejected() {
        let mut cfg = ReviewConfig::default();
        let mut review = cfg.approval_types[1].clone();
        review.id = "REVIEW".to_string();
        cfg.approval_types.push(review);
        let err = cfg.validate().expect_err("six-character id must fail");
        assert!(err.message.contains("'REVIEW'"));
    }

    #[test]
    fn test_empty_category_id_rejected() {
        let mut cfg = ReviewConfig::default();
        cfg.approval_types[0].id.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_padded_duplicate_category_rejected() {
        let mut cfg = ReviewConfig::default();
        let mut padded = cfg.approval_types[1].clone();
        padded.id = " CRV".to_string();
        cfg.approval_types[1].id = "CRV".to_string();
        cfg.approval_types.push(padded);
        let err = cfg.validate().expect_err("padded id must fail");
        assert!(err.message.contains("surrounding whitespace"));

        let mut cfg = ReviewConfig::default();
        let mut padded = cfg.approval_types[1].clone();
        padded.id = " CRVW".to_string();
        cfg.approval_types.push(padded);
        assert!(cfg.validate().is_err());
    }
}
