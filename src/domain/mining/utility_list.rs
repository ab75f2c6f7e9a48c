//! Utility lists: per-node `(tid, iutil, rutil)` sequences, strictly increasing by tid.

use crate::domain::entities::Tid;
use crate::domain::mining::preprocess::TransactionProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilityListElement {
    pub tid: Tid,
    /// Utility of the itemset in this transaction
    pub iutil: u64,
    /// Utility of all later-ordered candidates in this transaction
    pub rutil: u64,
}

/// Utility list of an itemset, labelled with its last-ordered member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityList<'a> {
    item: &'a str,
    elements: Vec<UtilityListElement>,
}

impl<'a> UtilityList<'a> {
    pub fn new(item: &'a str) -> Self {
        Self {
            item,
            elements: Vec::new(),
        }
    }

    pub fn item(&self) -> &'a str {
        self.item
    }

    pub fn elements(&self) -> &[UtilityListElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append an element. Callers must push in strictly increasing tid order.
    pub fn push(&mut self, element: UtilityListElement) {
        debug_assert!(
            self.elements.last().map_or(true, |last| last.tid < element.tid),
            "utility list tids must be strictly increasing"
        );
        self.elements.push(element);
    }

    pub fn sum_iutil(&self) -> u64 {
        self.elements
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.iutil))
    }

    pub fn sum_rutil(&self) -> u64 {
        self.elements
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.rutil))
    }

    /// Sorted-merge join with a later-ordered extension.
    ///
    /// Keeps only tids present in both lists; `iutil` adds up and `rutil` comes from `ext`.
    pub fn join(&self, ext: &UtilityList<'a>) -> UtilityList<'a> {
        let mut out = UtilityList::new(ext.item);
        let (mut i, mut j) = (0, 0);
        while i < self.elements.len() && j < ext.elements.len() {
            let p = self.elements[i];
            let x = ext.elements[j];
            match p.tid.cmp(&x.tid) {
                std::cmp::Ordering::Equal => {
                    out.elements.push(UtilityListElement {
                        tid: p.tid,
                        iutil: p.iutil.saturating_add(x.iutil),
                        rutil: x.rutil,
                    });
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        out
    }
}

/// Build one utility list per node of `order`, aligned with `order`.
///
/// `profiles` must be sorted by ascending tid. For each transaction the order is walked
/// backwards with a running suffix sum, so a node's `rutil` is the utility of every
/// later-ordered node in that transaction.
pub fn build_utility_lists<'a>(
    order: &[&'a str],
    profiles: &[TransactionProfile<'a>],
) -> Vec<UtilityList<'a>> {
    let mut lists: Vec<UtilityList<'a>> = order.iter().map(|&n| UtilityList::new(n)).collect();
    for profile in profiles {
        let mut suffix = 0u64;
        for (pos, name) in order.iter().enumerate().rev() {
            let iutil = profile.node_utilities.get(name).copied().unwrap_or(0);
            if iutil > 0 {
                lists[pos].push(UtilityListElement {
                    tid: profile.tid,
                    iutil,
                    rutil: suffix,
                });
            }
            suffix = suffix.saturating_add(iutil);
        }
    }
    lists
}
