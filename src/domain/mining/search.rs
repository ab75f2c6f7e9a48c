//! Depth-first branch-and-bound enumeration over utility lists.

use tracing::trace;

use crate::domain::entities::HighUtilityItemset;
use crate::domain::mining::utility_list::UtilityList;

/// Level and acceptance threshold shared by one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext {
    pub level: usize,
    pub threshold: u64,
}

/// Enumerate every itemset over `lists` (given in the fixed candidate order) whose
/// utility reaches the context threshold. Results come in DFS pre-order.
pub fn search(ctx: SearchContext, lists: &[UtilityList<'_>]) -> Vec<HighUtilityItemset> {
    let mut out = Vec::new();
    let mut prefix = Vec::new();
    dfs(ctx, &mut prefix, None, lists, &mut out);
    out
}

/// Explore `prefix ∪ {x}` for every extension `x`, then recurse on the extensions after `x`.
///
/// `sum_iutil + sum_rutil` of the joined list bounds every superset reachable from the
/// branch, so a branch whose bound is below the threshold is cut.
fn dfs<'a>(
    ctx: SearchContext,
    prefix: &mut Vec<&'a str>,
    prefix_list: Option<&UtilityList<'a>>,
    extensions: &[UtilityList<'a>],
    out: &mut Vec<HighUtilityItemset>,
) {
    for (idx, ext) in extensions.iter().enumerate() {
        let joined;
        let current = match prefix_list {
            Some(p) => {
                joined = p.join(ext);
                &joined
            }
            None => ext,
        };
        if current.is_empty() {
            continue;
        }

        prefix.push(ext.item());

        let sum_i = current.sum_iutil();
        if sum_i >= ctx.threshold {
            out.push(HighUtilityItemset {
                items: prefix.iter().map(|s| s.to_string()).collect(),
                utility: sum_i,
                level: ctx.level,
                threshold: ctx.threshold,
            });
        }

        let bound = sum_i.saturating_add(current.sum_rutil());
        if bound >= ctx.threshold {
            dfs(ctx, prefix, Some(current), &extensions[idx + 1..], out);
        } else {
            trace!(prefix = ?prefix, bound, "pruned");
        }

        prefix.pop();
    }
}
