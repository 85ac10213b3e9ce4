//! Equivalence groups and the compiled substitution table
//!
//! An [`EquivalenceGroup`] is a declared set of interchangeable strings.
//! An [`EquivalenceTable`] compiles an ordered list of groups into a
//! substitution index: every member maps to one representative.
//!
//! # Collapse rule
//!
//! Groups that share a member describe the same class, so they are merged
//! at build time. The representative of a class is its earliest-declared
//! member: the first member of the first group that touches the class.
//! For disjoint groups this is simply the group's first member.
//!
//! ```
//! use nickguard_core::{EquivalenceGroup, EquivalenceTable};
//!
//! let table = EquivalenceTable::new(
//!     vec![
//!         EquivalenceGroup::parse("a, b").unwrap(),
//!         EquivalenceGroup::parse("c, b").unwrap(),
//!     ],
//!     16,
//! );
//! assert_eq!(table.representative_of("c"), Some("a"));
//! ```

use crate::error::GroupError;
use std::collections::HashMap;

/// A declared set of mutually interchangeable strings
///
/// Invariant: at least two members, all non-empty and distinct,
/// in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EquivalenceGroup {
    members: Vec<String>,
}

impl EquivalenceGroup {
    /// Create a validated group
    ///
    /// # Errors
    /// Returns [`GroupError`] for empty groups, single-member groups,
    /// empty members and repeated members.
    pub fn new<I, S>(members: I) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();

        match members.as_slice() {
            [] => return Err(GroupError::Empty),
            [only] if !only.is_empty() => {
                return Err(GroupError::SingleMember {
                    member: only.clone(),
                })
            }
            _ => {}
        }

        for (i, member) in members.iter().enumerate() {
            if member.is_empty() {
                return Err(GroupError::EmptyMember);
            }
            if members[..i].contains(member) {
                return Err(GroupError::DuplicateMember {
                    member: member.clone(),
                });
            }
        }

        Ok(Self { members })
    }

    /// Parse the inline form `"0, O, o"`
    ///
    /// Tokens are separated by any run of commas and spaces, so members
    /// themselves cannot contain either character.
    ///
    /// # Errors
    /// Same as [`EquivalenceGroup::new`].
    pub fn parse(spec: &str) -> Result<Self, GroupError> {
        Self::new(
            spec.split([',', ' '])
                .filter(|token| !token.is_empty()),
        )
    }

    /// Members in declaration order
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// First declared member
    #[inline]
    #[must_use]
    pub fn first(&self) -> &str {
        &self.members[0]
    }

    /// Number of members (always at least two)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; present for API symmetry with `len`
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One directed substitution `from -> representatives[to]`
#[derive(Debug, Clone)]
pub(crate) struct Substitution {
    pub(crate) from: String,
    /// Char length of `from`
    pub(crate) from_len: usize,
    pub(crate) to: usize,
}

/// Compiled, immutable substitution table
///
/// Built once per configuration generation and never mutated; a reload
/// builds a fresh table.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceTable {
    /// Groups as declared
    groups: Vec<EquivalenceGroup>,

    /// Class representatives, indexed by `Substitution::to`
    representatives: Vec<String>,

    /// Char length of each representative
    representative_lens: Vec<usize>,

    /// First char of `from` -> substitutions, longest `from` first
    by_first_char: HashMap<char, Vec<Substitution>>,

    /// Total number of substitutions in the index
    substitution_count: usize,
}

impl EquivalenceTable {
    /// Empty table: canonicalization is the identity
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile groups into a substitution index
    ///
    /// Members longer than `max_member_len` characters are skipped with a
    /// warning and take no part in folding; the rest of their group still
    /// applies. A substitution whose representative contains its own source
    /// would grow without bound and is skipped the same way.
    #[must_use]
    pub fn new(groups: Vec<EquivalenceGroup>, max_member_len: usize) -> Self {
        // Distinct usable members in order of first appearance
        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut strings: Vec<String> = Vec::new();
        let mut classes = UnionFind::default();

        for (index, group) in groups.iter().enumerate() {
            let mut anchor: Option<usize> = None;
            for member in group.members() {
                let len = member.chars().count();
                if len > max_member_len {
                    tracing::warn!(
                        group = index,
                        member = %member,
                        len,
                        max_member_len,
                        "skipping equivalence member longer than limit"
                    );
                    continue;
                }

                let id = match ids.get(member) {
                    Some(&id) => id,
                    None => {
                        let id = classes.push();
                        ids.insert(member.clone(), id);
                        strings.push(member.clone());
                        id
                    }
                };

                match anchor {
                    Some(first) => classes.union(first, id),
                    None => anchor = Some(id),
                }
            }
        }

        let mut representatives = Vec::new();
        let mut representative_lens = Vec::new();
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut by_first_char: HashMap<char, Vec<Substitution>> = HashMap::new();
        let mut substitution_count = 0;

        for (id, member) in strings.iter().enumerate() {
            let root = classes.find(id);
            if root == id {
                continue;
            }
            let representative = &strings[root];

            if representative.contains(member.as_str()) {
                tracing::warn!(
                    member = %member,
                    representative = %representative,
                    "skipping substitution whose representative contains its source"
                );
                continue;
            }

            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                representatives.push(representative.clone());
                representative_lens.push(representative.chars().count());
                representatives.len() - 1
            });

            // Members are non-empty by construction
            let Some(first) = member.chars().next() else {
                continue;
            };
            by_first_char.entry(first).or_default().push(Substitution {
                from: member.clone(),
                from_len: member.chars().count(),
                to: slot,
            });
            substitution_count += 1;
        }

        for bucket in by_first_char.values_mut() {
            bucket.sort_by(|a, b| b.from.len().cmp(&a.from.len()));
        }

        Self {
            groups,
            representatives,
            representative_lens,
            by_first_char,
            substitution_count,
        }
    }

    /// Declared groups, in order
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[EquivalenceGroup] {
        &self.groups
    }

    /// Number of active substitutions
    #[inline]
    #[must_use]
    pub fn substitution_count(&self) -> usize {
        self.substitution_count
    }

    /// True when no substitution is active
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.substitution_count == 0
    }

    /// Representative a member folds to, `None` if the string is not a
    /// folded member (including when it is itself a representative)
    #[must_use]
    pub fn representative_of(&self, member: &str) -> Option<&str> {
        let first = member.chars().next()?;
        self.by_first_char
            .get(&first)?
            .iter()
            .find(|sub| sub.from == member)
            .map(|sub| self.representatives[sub.to].as_str())
    }

    /// Longest substitution applicable at the start of `rest` that grows
    /// the working string by at most `slack` characters
    #[inline]
    pub(crate) fn longest_match(&self, first: char, rest: &str, slack: usize) -> Option<&Substitution> {
        self.by_first_char.get(&first)?.iter().find(|sub| {
            self.representative_lens[sub.to] <= sub.from_len + slack
                && rest.starts_with(sub.from.as_str())
        })
    }

    #[inline]
    pub(crate) fn representative(&self, slot: usize) -> (&str, usize) {
        (&self.representatives[slot], self.representative_lens[slot])
    }
}

/// Disjoint sets over member ids; the smallest id is always the root
#[derive(Debug, Default)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn push(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.parent.len() - 1
    }

    fn find(&mut self, mut id: usize) -> usize {
        while self.parent[id] != id {
            self.parent[id] = self.parent[self.parent[id]];
            id = self.parent[id];
        }
        id
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        match ra.cmp(&rb) {
            std::cmp::Ordering::Less => self.parent[rb] = ra,
            std::cmp::Ordering::Greater => self.parent[ra] = rb,
            std::cmp::Ordering::Equal => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(members: &[&str]) -> EquivalenceGroup {
        EquivalenceGroup::new(members.iter().copied()).unwrap()
    }

    #[test]
    fn group_rejects_empty() {
        let result = EquivalenceGroup::new(Vec::<String>::new());
        assert_eq!(result, Err(GroupError::Empty));
    }

    #[test]
    fn group_rejects_single_member() {
        let result = EquivalenceGroup::new(["O"]);
        assert_eq!(
            result,
            Err(GroupError::SingleMember {
                member: "O".to_string()
            })
        );
    }

    #[test]
    fn group_rejects_empty_member() {
        assert_eq!(EquivalenceGroup::new(["a", ""]), Err(GroupError::EmptyMember));
        assert_eq!(EquivalenceGroup::new([""]), Err(GroupError::EmptyMember));
    }

    #[test]
    fn group_rejects_duplicates() {
        let result = EquivalenceGroup::new(["a", "b", "a"]);
        assert!(matches!(result, Err(GroupError::DuplicateMember { member }) if member == "a"));
    }

    #[test]
    fn parse_splits_on_commas_and_spaces() {
        let g = EquivalenceGroup::parse("0, O ,o").unwrap();
        assert_eq!(g.members(), ["0", "O", "o"]);
        assert_eq!(g.first(), "0");
    }

    #[test]
    fn parse_of_blank_is_empty_group() {
        assert_eq!(EquivalenceGroup::parse(" , ,"), Err(GroupError::Empty));
    }

    #[test]
    fn disjoint_groups_fold_to_first_member() {
        let table = EquivalenceTable::new(vec![group(&["0", "O", "o"]), group(&["1", "l", "I"])], 16);

        assert_eq!(table.representative_of("O"), Some("0"));
        assert_eq!(table.representative_of("o"), Some("0"));
        assert_eq!(table.representative_of("I"), Some("1"));
        assert_eq!(table.representative_of("0"), None);
        assert_eq!(table.substitution_count(), 4);
    }

    #[test]
    fn overlapping_groups_merge_into_one_class() {
        let table = EquivalenceTable::new(vec![group(&["a", "b"]), group(&["c", "b"]), group(&["d", "c"])], 16);

        assert_eq!(table.representative_of("b"), Some("a"));
        assert_eq!(table.representative_of("c"), Some("a"));
        assert_eq!(table.representative_of("d"), Some("a"));
    }

    #[test]
    fn overlong_members_are_skipped() {
        let table = EquivalenceTable::new(vec![group(&["m", "rn", "rrrrnnnn"])], 3);

        assert_eq!(table.representative_of("rn"), Some("m"));
        assert_eq!(table.representative_of("rrrrnnnn"), None);
        assert_eq!(table.substitution_count(), 1);
    }

    #[test]
    fn group_with_one_usable_member_contributes_nothing() {
        let table = EquivalenceTable::new(vec![group(&["x", "toolong"])], 2);
        assert!(table.is_identity());
    }

    #[test]
    fn self_expanding_substitution_is_skipped() {
        let table = EquivalenceTable::new(vec![group(&["ab", "b", "c"])], 16);

        assert_eq!(table.representative_of("b"), None);
        assert_eq!(table.representative_of("c"), Some("ab"));
    }

    #[test]
    fn longest_member_wins_at_same_position() {
        let table = EquivalenceTable::new(vec![group(&["m", "rn"]), group(&["n", "r"])], 16);

        let hit = table.longest_match('r', "rn", 0).unwrap();
        assert_eq!(hit.from, "rn");
        let hit = table.longest_match('r', "rx", 0).unwrap();
        assert_eq!(hit.from, "r");
    }

    #[test]
    fn growing_match_needs_slack() {
        let table = EquivalenceTable::new(vec![group(&["rn", "m"]), group(&["w", "vv"])], 16);

        assert!(table.longest_match('m', "m", 0).is_none());
        assert_eq!(table.longest_match('m', "m", 1).unwrap().from, "m");
        // A shrinking match is always available
        assert_eq!(table.longest_match('v', "vv", 0).unwrap().from, "vv");
    }

    #[test]
    fn empty_table_is_identity() {
        assert!(EquivalenceTable::empty().is_identity());
        assert!(EquivalenceTable::new(Vec::new(), 16).is_identity());
    }
}
