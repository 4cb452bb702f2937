//! Assignment recipient computation for notification fan-out.
//!
//! A task's assignment set is the union of its `assigned_users` list and its
//! single primary assignee. Fan-out never notifies the acting user, and on
//! reassignment only users NEW to the set are notified -- users who merely
//! remain assigned are not renotified.

use crate::types::DbId;

/// The deduplicated assignment set of a task: `assigned_users` plus the
/// primary assignee, preserving first-seen order.
pub fn assignment_set(assigned_users: &[DbId], assignee: Option<DbId>) -> Vec<DbId> {
    let mut set = Vec::with_capacity(assigned_users.len() + 1);
    for &id in assigned_users.iter().chain(assignee.iter()) {
        if !set.contains(&id) {
            set.push(id);
        }
    }
    set
}

/// Recipients of a creation or comment fan-out: the assignment set minus
/// the acting user.
pub fn assignment_recipients(
    assigned_users: &[DbId],
    assignee: Option<DbId>,
    actor: DbId,
) -> Vec<DbId> {
    let mut set = assignment_set(assigned_users, assignee);
    set.retain(|&id| id != actor);
    set
}

/// Recipients of a reassignment fan-out: users in the new assignment set
/// that were absent from the old one, minus the acting user.
pub fn newly_assigned(
    old_users: &[DbId],
    old_assignee: Option<DbId>,
    new_users: &[DbId],
    new_assignee: Option<DbId>,
    actor: DbId,
) -> Vec<DbId> {
    let old = assignment_set(old_users, old_assignee);
    let mut added = assignment_recipients(new_users, new_assignee, actor);
    added.retain(|id| !old.contains(id));
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_dedupes_primary_assignee() {
        // Assignee also listed in assigned_users appears once.
        assert_eq!(assignment_set(&[1, 2], Some(2)), vec![1, 2]);
        assert_eq!(assignment_set(&[1, 2], Some(3)), vec![1, 2, 3]);
        assert_eq!(assignment_set(&[], None), Vec::<DbId>::new());
    }

    #[test]
    fn actor_is_never_a_recipient() {
        assert_eq!(assignment_recipients(&[1, 2], Some(3), 2), vec![1, 3]);
        assert_eq!(assignment_recipients(&[5], Some(5), 5), Vec::<DbId>::new());
    }

    #[test]
    fn only_new_members_are_notified() {
        // {A, B} -> {A, B, C}: only C.
        assert_eq!(newly_assigned(&[1, 2], None, &[1, 2, 3], None, 9), vec![3]);
    }

    #[test]
    fn promoting_an_existing_member_notifies_nobody() {
        // B was already in the set; making B the primary assignee adds no one.
        assert_eq!(
            newly_assigned(&[1, 2], None, &[1, 2], Some(2), 9),
            Vec::<DbId>::new()
        );
    }

    #[test]
    fn new_primary_assignee_is_notified() {
        assert_eq!(newly_assigned(&[1], None, &[1], Some(4), 9), vec![4]);
    }

    #[test]
    fn actor_adding_themselves_is_not_notified() {
        assert_eq!(
            newly_assigned(&[1], None, &[1, 7], None, 7),
            Vec::<DbId>::new()
        );
    }
}
