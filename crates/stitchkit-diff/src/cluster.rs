//! Clustering diff between two partitions of the same identifiers
//!
//! Both partitions are cut into fragments: the nonempty intersections of a
//! set from each side, plus items found on one side only. Fragments are
//! ranked by size, then by a preference flag, then by their smallest item,
//! which is a total order since fragments are disjoint. Each set picks a
//! core fragment; a fragment stays put only when it is the core of both the
//! set it came from and the set it went to. Everything else moved. The rule
//! treats both sides alike, so swapping the inputs inverts every move.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};

/// Fragment number, in order of discovery.
pub type FragmentId = usize;

/// A fragment that changed sets. `None` on either end means the items were
/// absent from that partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move<L> {
    pub from: Option<L>,
    pub to: Option<L>,
    pub items: BTreeSet<String>,
}

/// Highest ranked key: largest fragment, then one for which `preferred`
/// holds, then the one with the smallest item.
pub fn tie_max(
    keys: &[FragmentId],
    fragments: &[BTreeSet<String>],
    preferred: impl Fn(FragmentId) -> bool,
) -> Option<FragmentId> {
    keys.iter().copied().max_by_key(|&k| {
        (
            fragments[k].len(),
            preferred(k),
            Reverse(fragments[k].first()),
        )
    })
}

/// Per set, the fragments it shares with a set on the other side.
fn shared_by_set(
    owners: &[Option<usize>],
    others: &[Option<usize>],
    n: usize,
) -> Vec<Vec<FragmentId>> {
    let mut keys = vec![Vec::new(); n];
    for (key, (owner, other)) in owners.iter().zip(others).enumerate() {
        if let (Some(set), Some(_)) = (owner, other) {
            keys[*set].push(key);
        }
    }
    keys
}

/// Diff two labelled partitions. Returns every moved fragment by id.
pub fn clustering_diff<L: Clone>(
    p1: &[(L, BTreeSet<String>)],
    p2: &[(L, BTreeSet<String>)],
) -> BTreeMap<FragmentId, Move<L>> {
    // item -> p2 sets containing it
    let mut in_p2: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (j, (_, set)) in p2.iter().enumerate() {
        for item in set {
            in_p2.entry(item.as_str()).or_default().push(j);
        }
    }

    let mut fragments: Vec<BTreeSet<String>> = Vec::new();
    let mut owner1: Vec<Option<usize>> = Vec::new();
    let mut owner2: Vec<Option<usize>> = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    let mut add = |items: BTreeSet<String>, i: Option<usize>, j: Option<usize>| {
        fragments.push(items);
        owner1.push(i);
        owner2.push(j);
    };

    for (i, (_, set1)) in p1.iter().enumerate() {
        let mut only1 = BTreeSet::new();
        for item in set1 {
            for &j in in_p2.get(item.as_str()).map(Vec::as_slice).unwrap_or(&[]) {
                let mut shared = BTreeSet::new();
                for elem in set1.intersection(&p2[j].1) {
                    if seen.insert(elem.as_str()) {
                        shared.insert(elem.clone());
                    }
                }
                if !shared.is_empty() {
                    add(shared, Some(i), Some(j));
                }
            }
            if seen.insert(item.as_str()) {
                only1.insert(item.clone());
            }
        }
        if !only1.is_empty() {
            add(only1, Some(i), None);
        }
    }
    for (j, (_, set2)) in p2.iter().enumerate() {
        let only2: BTreeSet<String> = set2
            .iter()
            .filter(|item| seen.insert(item.as_str()))
            .cloned()
            .collect();
        if !only2.is_empty() {
            add(only2, None, Some(j));
        }
    }

    let keys1 = shared_by_set(&owner1, &owner2, p1.len());
    let keys2 = shared_by_set(&owner2, &owner1, p2.len());
    let best1: Vec<Option<FragmentId>> =
        keys1.iter().map(|keys| tie_max(keys, &fragments, |_| false)).collect();
    let best2: Vec<Option<FragmentId>> =
        keys2.iter().map(|keys| tie_max(keys, &fragments, |_| false)).collect();
    // a set's core leans towards fragments the other side also ranks first
    let core1: Vec<Option<FragmentId>> = keys1
        .iter()
        .map(|keys| {
            tie_max(keys, &fragments, |k| {
                owner2[k].is_some_and(|j| best2[j] == Some(k))
            })
        })
        .collect();
    let core2: Vec<Option<FragmentId>> = keys2
        .iter()
        .map(|keys| {
            tie_max(keys, &fragments, |k| {
                owner1[k].is_some_and(|i| best1[i] == Some(k))
            })
        })
        .collect();

    let stays = |key: FragmentId| match (owner1[key], owner2[key]) {
        (Some(i), Some(j)) => core1[i] == Some(key) && core2[j] == Some(key),
        _ => false,
    };

    let moved: Vec<FragmentId> = (0..fragments.len()).filter(|&k| !stays(k)).collect();
    moved
        .into_iter()
        .map(|key| {
            let from = owner1[key].map(|i| p1[i].0.clone());
            let to = owner2[key].map(|j| p2[j].0.clone());
            let items = std::mem::take(&mut fragments[key]);
            (key, Move { from, to, items })
        })
        .collect()
}
