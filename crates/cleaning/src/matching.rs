//! Key-based anti-join helpers shared by the regime cleaners.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use trace_core::{Error, Result, TradeMessage};

/// Fail when any removal key addresses more than one candidate.
pub(crate) fn ensure_unique_targets<K, F>(
    stage: &'static str,
    candidates: &[TradeMessage],
    keys: &HashSet<K>,
    key_of: F,
) -> Result<()>
where
    K: Eq + Hash + std::fmt::Debug,
    F: Fn(&TradeMessage) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for msg in candidates {
        let key = key_of(msg);
        if keys.contains(&key) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    match counts.into_iter().find(|(_, n)| *n > 1) {
        Some((key, n)) => Err(Error::ambiguous(stage, key, n)),
        None => Ok(()),
    }
}

/// Drop every candidate whose key is in `keys`. Returns the number removed.
pub(crate) fn anti_join<K, F>(candidates: &mut Vec<TradeMessage>, keys: &HashSet<K>, key_of: F) -> usize
where
    K: Eq + Hash,
    F: Fn(&TradeMessage) -> K,
{
    let before = candidates.len();
    candidates.retain(|msg| !keys.contains(&key_of(msg)));
    before - candidates.len()
}
