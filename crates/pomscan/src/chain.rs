//! Cycle-safe chain walking.
//!
//! Parent links between pom.xml files are weak references that may dangle
//! or form cycles, so every walk over them goes through this bounded
//! utility instead of an ad hoc loop.

use std::collections::HashSet;

/// Walks the chain starting at `start`, following `next` until it yields no
/// neighbor or a node whose id was already visited (cycle guard). The
/// returned sequence begins with `start` itself and preserves walk order.
pub fn walk<'a, T, I, N>(start: &'a T, mut id_of: I, mut next: N) -> Vec<&'a T>
where
    I: FnMut(&T) -> &str,
    N: FnMut(&'a T) -> Option<&'a T>,
{
    let mut visited: HashSet<String> = HashSet::new();
    let mut chain = Vec::new();
    let mut current = start;

    loop {
        if !visited.insert(id_of(current).to_string()) {
            break;
        }
        chain.push(current);
        match next(current) {
            Some(neighbor) => current = neighbor,
            None => break,
        }
    }

    chain
}
