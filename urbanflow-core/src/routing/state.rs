use std::cmp::Ordering;

use crate::NodeId;

/// Priority queue entry. `cost` is whatever key the search orders by
/// (tentative distance for Dijkstra, estimated total for A*).
#[derive(Copy, Clone, Debug)]
pub(crate) struct State {
    pub(crate) cost: f64,
    pub(crate) node: NodeId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap),
        // lower node handle first on equal cost
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn heap_pops_cheapest_first() {
        let mut heap = BinaryHeap::new();
        heap.push(State { cost: 4.0, node: 0 });
        heap.push(State { cost: 1.5, node: 3 });
        heap.push(State { cost: 1.5, node: 1 });
        heap.push(State { cost: 2.0, node: 2 });

        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop().map(|s| s.node)).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }
}
