//! Concurrency helper: run fetch tasks with at most `limit` in flight, keeping input order.

use rayon::prelude::*;

/// Map `f` over `items`, at most `limit` at a time. Output order matches input order.
pub fn map_limited<T, R, F>(items: &[T], limit: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Sync + Fn(&T) -> R,
{
    if limit <= 1 {
        return items.iter().map(&f).collect();
    }
    let mut out = Vec::with_capacity(items.len());
    for chunk in items.chunks(limit) {
        let part: Vec<R> = chunk.par_iter().map(&f).collect();
        out.extend(part);
    }
    out
}
