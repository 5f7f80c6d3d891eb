//! Reconciliation of a reviewer's requested votes with their recorded ones.

use std::collections::{BTreeMap, HashMap};

use reviewhub_core::types::AccountId;
use reviewhub_entity::{ApprovalCategoryId, ApprovalCategoryValueId, Change, ChangeApproval};

use super::types::ApprovalTypes;

/// Writes and message fragments produced by [`plan_approvals`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalPlan {
    /// Names of the newly selected values, in configured category order.
    pub deltas: Vec<String>,
    /// Votes to insert.
    pub inserts: Vec<ChangeApproval>,
    /// Votes whose value changed.
    pub updates: Vec<ChangeApproval>,
    /// Votes not re-selected this time.
    pub deletes: Vec<ChangeApproval>,
}

impl ApprovalPlan {
    /// Whether the plan writes nothing.
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Compute how `account`'s votes on `change` must change to match `desired`.
///
/// `existing` must hold only `account`'s votes on `change`. Selections are
/// keyed by category and the last selection for a category wins. Categories
/// that are not configured, and values a category does not allow, are
/// ignored; any vote already recorded in such a category is left unconsumed.
///
/// Deltas are recorded whether or not the change is open. Writes are only
/// planned while it is open, in which case every unconsumed existing vote is
/// deleted.
pub fn plan_approvals(
    types: &ApprovalTypes,
    change: &Change,
    account: AccountId,
    existing: Vec<ChangeApproval>,
    desired: &[ApprovalCategoryValueId],
) -> ApprovalPlan {
    let open = change.is_open();
    let want: HashMap<&ApprovalCategoryId, i16> = desired
        .iter()
        .map(|sel| (&sel.category_id, sel.value))
        .collect();
    let mut have: BTreeMap<ApprovalCategoryId, ChangeApproval> = existing
        .into_iter()
        .map(|a| (a.category_id.clone(), a))
        .collect();

    let mut plan = ApprovalPlan::default();
    for at in types.iter() {
        let Some(&value) = want.get(at.id()) else {
            continue;
        };
        let Some(allowed) = at.value(value) else {
            continue;
        };

        match have.remove(at.id()) {
            None => {
                plan.deltas.push(allowed.name.clone());
                if open {
                    plan.inserts.push(ChangeApproval::new(
                        change.change_id,
                        account,
                        at.id().clone(),
                        value,
                    ));
                }
            }
            Some(mut mine) if mine.value != value => {
                plan.deltas.push(allowed.name.clone());
                if open {
                    mine.set_value(value);
                    mine.set_granted();
                    plan.updates.push(mine);
                }
            }
            Some(_) => {}
        }
    }

    if open {
        plan.deletes = have.into_values().collect();
    }
    plan
}

#[cfg(test)]
mod tests {
    use reviewhub_core::config::ReviewConfig;
    use reviewhub_core::types::ChangeId;
    use reviewhub_entity::ChangeStatus;

    use super::*;

    const ME: AccountId = AccountId::new(1000);

    fn types() -> ApprovalTypes {
        ApprovalTypes::from_config(&ReviewConfig::default())
    }

    fn open_change() -> Change {
        Change::new(ChangeId::new(42), AccountId::new(1), "master", "Add parser")
    }

    fn vote(category: &str, value: i16) -> ChangeApproval {
        ChangeApproval::new(ChangeId::new(42), ME, ApprovalCategoryId::new(category), value)
    }

    fn sel(s: &str) -> ApprovalCategoryValueId {
        s.parse().expect("valid selection")
    }

    #[test]
    fn test_new_votes_are_inserted_in_configured_order() {
        let plan = plan_approvals(
            &types(),
            &open_change(),
            ME,
            vec![],
            &[sel("CRVW=+2"), sel("VRIF=+1")],
        );

        assert_eq!(
            plan.deltas,
            vec!["Verified".to_string(), "Looks good to me, approved".to_string()]
        );
        assert_eq!(plan.inserts.len(), 2);
        assert_eq!(plan.inserts[0].category_id.as_str(), "VRIF");
        assert_eq!(plan.inserts[1].value, 2);
        assert!(plan.inserts.iter().all(|a| a.account_id == ME));
        assert!(plan.updates.is_empty());
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn test_changed_vote_is_updated() {
        let plan = plan_approvals(
            &types(),
            &open_change(),
            ME,
            vec![vote("CRVW", 1)],
            &[sel("CRVW=-1")],
        );

        assert_eq!(
            plan.deltas,
            vec!["I would prefer that you didn't submit this".to_string()]
        );
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].value, -1);
        assert!(plan.inserts.is_empty());
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn test_unchanged_vote_is_consumed_silently() {
        let plan = plan_approvals(
            &types(),
            &open_change(),
            ME,
            vec![vote("CRVW", 2)],
            &[sel("CRVW=+2")],
        );

        assert!(plan.deltas.is_empty());
        assert!(plan.is_noop());
    }

    #[test]
    fn test_unselected_vote_is_deleted_on_open_change() {
        let plan = plan_approvals(
            &types(),
            &open_change(),
            ME,
            vec![vote("VRIF", 1), vote("CRVW", 2)],
            &[sel("CRVW=+2")],
        );

        assert!(plan.deltas.is_empty());
        assert_eq!(plan.deletes.len(), 1);
        assert_eq!(plan.deletes[0].category_id.as_str(), "VRIF");
    }

    #[test]
    fn test_invalid_value_leaves_existing_vote_unconsumed() {
        let plan = plan_approvals(
            &types(),
            &open_change(),
            ME,
            vec![vote("CRVW", 1)],
            &[sel("CRVW=+3")],
        );

        assert!(plan.deltas.is_empty());
        assert!(plan.updates.is_empty());
        assert_eq!(plan.deletes.len(), 1);
        assert_eq!(plan.deletes[0].value, 1);
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let plan = plan_approvals(&types(), &open_change(), ME, vec![], &[sel("SUBM=+1")]);
        assert_eq!(plan, ApprovalPlan::default());
    }

    #[test]
    fn test_vote_in_unconfigured_category_is_deleted_on_open_change() {
        let plan = plan_approvals(&types(), &open_change(), ME, vec![vote("SUBM", 1)], &[]);

        assert!(plan.deltas.is_empty());
        assert!(plan.inserts.is_empty());
        assert!(plan.updates.is_empty());
        assert_eq!(plan.deletes.len(), 1);
        assert_eq!(plan.deletes[0].category_id.as_str(), "SUBM");
        assert_eq!(plan.deletes[0].value, 1);
    }

    #[test]
    fn test_last_selection_per_category_wins() {
        let plan = plan_approvals(
            &types(),
            &open_change(),
            ME,
            vec![],
            &[sel("CRVW=-2"), sel("CRVW=+1")],
        );

        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].value, 1);
    }

    #[test]
    fn test_closed_change_records_deltas_without_writes() {
        let mut change = open_change();
        change.status = ChangeStatus::Merged;

        let plan = plan_approvals(
            &types(),
            &change,
            ME,
            vec![vote("VRIF", 1), vote("CRVW", 1)],
            &[sel("CRVW=+2")],
        );

        assert_eq!(plan.deltas, vec!["Looks good to me, approved".to_string()]);
        assert!(plan.is_noop());
    }
}
