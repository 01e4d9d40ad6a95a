//! Ordering and sibling lookup within resource sets.
//!
//! Members of a set are listed by `(order, link id)`. `order` alone may tie or
//! leave gaps. Navigation only moves to a strictly smaller or larger `order`;
//! when several members share that neighbouring `order`, the lowest link id wins.

use std::collections::HashMap;

use crate::models::{LinkId, SetId};

/// One membership row joined with the titles needed for navigation.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MemberRow {
    pub set_id: SetId,
    pub set_title: String,
    pub link_id: LinkId,
    pub link_title: String,
    pub order: i64,
}

impl MemberRow {
    pub fn sort_key(&self) -> (i64, LinkId) {
        (self.order, self.link_id)
    }
}

/// Where a link sits inside its set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    pub set_id: SetId,
    pub set_title: &'a str,
    pub previous: Option<&'a MemberRow>,
    pub next: Option<&'a MemberRow>,
}

/// Memberships grouped per set, each group sorted in navigation order.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    by_set: HashMap<SetId, Vec<MemberRow>>,
    // link -> (order, set) of every membership of that link
    by_link: HashMap<LinkId, Vec<(i64, SetId)>>,
}

impl MembershipIndex {
    pub fn new(rows: Vec<MemberRow>) -> Self {
        let mut by_set: HashMap<SetId, Vec<MemberRow>> = HashMap::new();
        let mut by_link: HashMap<LinkId, Vec<(i64, SetId)>> = HashMap::new();
        for row in rows {
            by_link.entry(row.link_id).or_default().push((row.order, row.set_id));
            by_set.entry(row.set_id).or_default().push(row);
        }
        for members in by_set.values_mut() {
            members.sort_by_key(MemberRow::sort_key);
        }
        Self { by_set, by_link }
    }

    /// Members of `set_id` in navigation order (empty if unknown).
    pub fn members(&self, set_id: SetId) -> &[MemberRow] {
        self.by_set.get(&set_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The membership used for navigation when a link is in several sets:
    /// lowest `order`, then lowest set id.
    pub fn primary_membership(&self, link_id: LinkId) -> Option<&MemberRow> {
        let (order, set_id) = self.by_link.get(&link_id)?.iter().min().copied()?;
        let members = self.by_set.get(&set_id)?;
        let pos = members.binary_search_by_key(&(order, link_id), MemberRow::sort_key).ok()?;
        members.get(pos)
    }

    /// Set and neighbours of `link_id`, or `None` if it belongs to no set.
    pub fn placement(&self, link_id: LinkId) -> Option<Placement<'_>> {
        let current = self.primary_membership(link_id)?;
        let members = self.members(current.set_id);
        let order = current.order;

        // Sorted by (order, link id): the first hit is the smallest greater order, lowest id
        let next = members.iter().find(|m| m.order > order);
        let previous = members
            .iter()
            .rev()
            .find(|m| m.order < order)
            .map(|m| m.order)
            .and_then(|prev| members.iter().find(|m| m.order == prev));

        Some(Placement { set_id: current.set_id, set_title: current.set_title.as_str(), previous, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(set_id: SetId, link_id: LinkId, order: i64) -> MemberRow {
        MemberRow {
            set_id,
            set_title: format!("Set {}", set_id),
            link_id,
            link_title: format!("Link {}", link_id),
            order,
        }
    }

    fn ids(p: &Placement<'_>) -> (Option<LinkId>, Option<LinkId>) {
        (p.previous.map(|m| m.link_id), p.next.map(|m| m.link_id))
    }

    #[test]
    fn test_neighbours_follow_order_not_insertion() {
        let index = MembershipIndex::new(vec![row(1, 30, 30), row(1, 10, 10), row(1, 20, 20)]);

        let middle = index.placement(20).unwrap();
        assert_eq!(middle.set_id, 1);
        assert_eq!(middle.set_title, "Set 1");
        assert_eq!(ids(&middle), (Some(10), Some(30)));

        assert_eq!(ids(&index.placement(10).unwrap()), (None, Some(20)));
        assert_eq!(ids(&index.placement(30).unwrap()), (Some(20), None));
    }

    #[test]
    fn test_link_without_membership() {
        let index = MembershipIndex::new(vec![row(1, 10, 1)]);
        assert!(index.placement(99).is_none());
        assert!(index.primary_membership(99).is_none());
    }

    #[test]
    fn test_gaps_are_tolerated() {
        let index = MembershipIndex::new(vec![row(1, 1, 0), row(1, 2, 500), row(1, 3, 100_000)]);
        assert_eq!(ids(&index.placement(2).unwrap()), (Some(1), Some(3)));
    }

    #[test]
    fn test_duplicate_orders_listed_by_link_id() {
        // 7 and 5 share order 2; link id decides: 5 before 7
        let index = MembershipIndex::new(vec![row(1, 7, 2), row(1, 5, 2), row(1, 9, 1), row(1, 3, 4)]);
        let order: Vec<LinkId> = index.members(1).iter().map(|m| m.link_id).collect();
        assert_eq!(order, vec![9, 5, 7, 3]);
    }

    #[test]
    fn test_tied_members_skip_each_other() {
        let index = MembershipIndex::new(vec![row(1, 7, 2), row(1, 5, 2), row(1, 9, 1), row(1, 3, 4)]);
        // Neighbours need a strictly different order
        assert_eq!(ids(&index.placement(5).unwrap()), (Some(9), Some(3)));
        assert_eq!(ids(&index.placement(7).unwrap()), (Some(9), Some(3)));
    }

    #[test]
    fn test_tied_neighbour_candidates_pick_lowest_link_id() {
        // 8 and 4 share order 1, 6 and 2 share order 9
        let index = MembershipIndex::new(vec![row(1, 8, 1), row(1, 4, 1), row(1, 10, 5), row(1, 6, 9), row(1, 2, 9)]);
        assert_eq!(ids(&index.placement(10).unwrap()), (Some(4), Some(2)));
        assert_eq!(ids(&index.placement(4).unwrap()), (None, Some(10)));
        assert_eq!(ids(&index.placement(6).unwrap()), (Some(10), None));
    }

    #[test]
    fn test_all_members_tied_have_no_neighbours() {
        let index = MembershipIndex::new(vec![row(1, 1, 5), row(1, 2, 5), row(1, 3, 5)]);
        for link in [1, 2, 3] {
            assert_eq!(ids(&index.placement(link).unwrap()), (None, None));
        }
    }

    #[test]
    fn test_sets_do_not_leak_into_each_other() {
        let index = MembershipIndex::new(vec![row(1, 1, 1), row(2, 2, 2), row(1, 3, 3)]);
        assert_eq!(ids(&index.placement(1).unwrap()), (None, Some(3)));
        assert_eq!(ids(&index.placement(2).unwrap()), (None, None));
    }

    #[test]
    fn test_primary_membership_for_link_in_two_sets() {
        // Link 4 is at order 5 in set 2 and order 3 in set 8: set 8 wins (lower order)
        let index = MembershipIndex::new(vec![row(2, 4, 5), row(8, 4, 3), row(8, 6, 9)]);
        let p = index.placement(4).unwrap();
        assert_eq!(p.set_id, 8);
        assert_eq!(ids(&p), (None, Some(6)));

        // Same order in both sets: lower set id wins
        let index = MembershipIndex::new(vec![row(5, 4, 1), row(3, 4, 1)]);
        assert_eq!(index.placement(4).unwrap().set_id, 3);
    }

    #[test]
    fn test_members_of_unknown_set_is_empty() {
        let index = MembershipIndex::new(Vec::new());
        assert!(index.members(42).is_empty());
    }
}
