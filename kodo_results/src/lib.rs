#![deny(unsafe_op_in_unsafe_fn)]

/*!
Tabular benchmark results for the Kodo plotting tools.

Results come from the throughput and storage benchmarks as CSV files (or a JSON export of the
nightly benchmark store). They are loaded into a [`dataset::ResultSet`], patched, grouped by the
fixed parameters of a plot and pivoted along the varying parameter.
*/

pub mod dataset;
pub mod error;
pub mod grouping;
pub mod nightly;
pub mod pivot;
pub mod value;

pub use error::ResultsError;

use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

/**
Projects every item to a key, accumulates items sharing a key, then finalizes each accumulator.

Key projection and finalization run on the rayon pool, accumulation is sequential so that items
reach `accumulate` in their original order.
*/
pub fn reduce<T, RK, A, R>(
    items: Vec<T>,
    key: impl Sync + Fn(&T) -> RK,
    init: impl Fn() -> A,
    accumulate: impl Fn(&mut A, T, &RK),
    finalize: impl Sync + Fn(A, &RK) -> R,
) -> HashMap<RK, R>
where
    T: Send + Sync,
    RK: Send + Eq + Hash + Clone,
    A: Send,
    R: Send,
{
    let keys: Vec<RK> = items.par_iter().map(|item| key(item)).collect();

    let mut accumulators: HashMap<RK, A> = HashMap::new();
    for (rk, item) in keys.into_iter().zip(items) {
        let acc = accumulators.entry(rk.clone()).or_insert_with(&init);
        accumulate(acc, item, &rk);
    }

    accumulators
        .into_par_iter()
        .map(|(rk, acc)| {
            let r = finalize(acc, &rk);
            (rk, r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::reduce;

    #[test]
    fn reduce_keeps_item_order_within_keys() {
        let items: Vec<u32> = (0..100).collect();
        let reduced = reduce(
            items,
            |i| i % 3,
            Vec::new,
            |acc: &mut Vec<u32>, i, _k| acc.push(i),
            |acc, _k| acc,
        );
        assert_eq!(reduced.len(), 3);
        for (k, v) in reduced {
            assert!(v.windows(2).all(|w| w[0] < w[1]));
            assert!(v.iter().all(|i| i % 3 == k));
        }
    }

    #[test]
    fn reduce_finalizes_with_key() {
        let items = vec!["a", "bb", "cc", "ddd"];
        let reduced = reduce(
            items,
            |s| s.len(),
            || 0usize,
            |acc, _s, _k| *acc += 1,
            |acc, k| acc * k,
        );
        assert_eq!(reduced[&1], 1);
        assert_eq!(reduced[&2], 4);
        assert_eq!(reduced[&3], 3);
    }
}
