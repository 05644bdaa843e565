//! Capability grants carried by a credential.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single capability bit within a credential.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Grant {
    /// Join the named room.
    RoomJoin,
    /// Publish audio tracks into the room.
    Publish,
    /// Subscribe to other participants' tracks.
    Subscribe,
}

/// The set of capabilities granted to one participant.
///
/// Every credential minted today carries [`GrantSet::full`], but grants
/// can be configured individually.
///
/// # Examples
///
/// ```
/// use heydoc_models::{Grant, GrantSet};
///
/// let mut grants = GrantSet::full();
/// grants.remove(Grant::Publish);
/// assert!(grants.contains(Grant::Subscribe));
/// assert!(!grants.contains(Grant::Publish));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct GrantSet(BTreeSet<Grant>);

impl GrantSet {
    /// An empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// `{ roomJoin, publish, subscribe }`.
    pub fn full() -> Self {
        [Grant::RoomJoin, Grant::Publish, Grant::Subscribe]
            .into_iter()
            .collect()
    }

    /// Add a grant. Returns `false` if it was already present.
    pub fn insert(&mut self, grant: Grant) -> bool {
        self.0.insert(grant)
    }

    /// Remove a grant. Returns `false` if it was not present.
    pub fn remove(&mut self, grant: Grant) -> bool {
        self.0.remove(&grant)
    }

    /// Whether the set holds `grant`.
    pub fn contains(&self, grant: Grant) -> bool {
        self.0.contains(&grant)
    }

    /// Iterate grants in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Grant> + '_ {
        self.0.iter().copied()
    }

    /// Number of grants in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set grants nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Grant> for GrantSet {
    fn from_iter<T: IntoIterator<Item = Grant>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn full_contains_every_grant() {
        let full = GrantSet::full();
        for grant in Grant::iter() {
            assert!(full.contains(grant), "{grant} missing from full set");
        }
        assert_eq!(full.len(), 3);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = GrantSet::new();
        assert!(set.insert(Grant::RoomJoin));
        assert!(!set.insert(Grant::RoomJoin));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_single_grant() {
        let mut set = GrantSet::full();
        assert!(set.remove(Grant::Publish));
        assert!(!set.remove(Grant::Publish));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Grant::RoomJoin, Grant::Subscribe]
        );
    }

    #[test]
    fn grant_names_round_trip() {
        assert_eq!(Grant::RoomJoin.to_string(), "roomJoin");
        assert_eq!(Grant::from_str("subscribe").unwrap(), Grant::Subscribe);
        assert!(Grant::from_str("admin").is_err());
    }

    #[test]
    fn serialises_as_list() {
        let json = serde_json::to_string(&GrantSet::full()).unwrap();
        assert_eq!(json, r#"["roomJoin","publish","subscribe"]"#);
    }
}
