//! APTED-style ordered tree edit distance with kind-weighted rename costs.
//!
//! The recursion is memoized on node ID pairs; the children alignment runs a
//! two-row dynamic program whose rows live in a grow-on-demand arena with
//! stack-discipline reuse. Memo tables can be pooled across calls.

use crate::kind::kind_distance;
use crate::tree::SyntaxNode;
use std::collections::HashMap;
use std::sync::Mutex;

/// Edit operation costs for the distance computation.
#[derive(Debug, Clone, Copy)]
pub struct AptedCosts {
    /// Cost of relabeling a node whose kind matches but whose value differs.
    /// Zero makes identifier renames free.
    pub rename: f64,
    /// Cost per deleted node.
    pub delete: f64,
    /// Cost per inserted node.
    pub insert: f64,
    /// Weight applied to the category distance when kinds differ.
    pub kind_weight: f64,
}

impl Default for AptedCosts {
    fn default() -> Self {
        Self {
            rename: 0.3,
            delete: 1.0,
            insert: 1.0,
            kind_weight: 0.5,
        }
    }
}

/// Contiguous row storage for the children DP.
///
/// `allocate`/`deallocate` follow stack discipline: nested forest alignments
/// allocate on top and must free exactly what they took. Underflow is an
/// internal invariant violation and aborts.
#[derive(Debug, Default)]
struct RowArena {
    buf: Vec<f64>,
    top: usize,
}

impl RowArena {
    /// Reserve `n` slots and return their base offset. Offsets stay valid
    /// across later growth because access is index-based.
    fn allocate(&mut self, n: usize) -> usize {
        let base = self.top;
        self.top += n;
        if self.buf.len() < self.top {
            self.buf.resize(self.top, 0.0);
        }
        base
    }

    fn deallocate(&mut self, n: usize) {
        assert!(self.top >= n, "row arena underflow");
        self.top -= n;
    }

    fn get(&self, index: usize) -> f64 {
        self.buf[index]
    }

    fn set(&mut self, index: usize, value: f64) {
        self.buf[index] = value;
    }
}

/// Shared free-list of memoization tables.
///
/// Scoring tasks acquire a table per pair and return it cleared, so steady
/// state allocates no new maps regardless of how many pairs are scored.
#[derive(Debug, Default)]
pub struct MemoPool {
    tables: Mutex<Vec<HashMap<(u64, u64), f64>>>,
}

impl MemoPool {
    pub fn acquire(&self) -> HashMap<(u64, u64), f64> {
        self.tables
            .lock()
            .expect("memo pool poisoned")
            .pop()
            .unwrap_or_default()
    }

    pub fn release(&self, mut table: HashMap<(u64, u64), f64>) {
        table.clear();
        self.tables.lock().expect("memo pool poisoned").push(table);
    }
}

/// Tree edit distance engine. One instance per pair computation; the memo
/// table is keyed by node ID pairs and is only meaningful within one pair.
pub struct TreeDistance {
    costs: AptedCosts,
    memo: HashMap<(u64, u64), f64>,
    arena: RowArena,
}

impl TreeDistance {
    pub fn new(costs: AptedCosts) -> Self {
        Self::with_memo(costs, HashMap::new())
    }

    /// Build an engine around a pooled memo table.
    pub fn with_memo(costs: AptedCosts, memo: HashMap<(u64, u64), f64>) -> Self {
        Self {
            costs,
            memo,
            arena: RowArena::default(),
        }
    }

    /// Recover the memo table for return to a [`MemoPool`].
    pub fn into_memo(self) -> HashMap<(u64, u64), f64> {
        self.memo
    }

    /// Minimum edit cost to transform `a` into `b`.
    pub fn distance(&mut self, a: &SyntaxNode, b: &SyntaxNode) -> f64 {
        let key = (a.id(), b.id());
        if let Some(&d) = self.memo.get(&key) {
            return d;
        }
        let d = match (a.is_leaf(), b.is_leaf()) {
            (true, true) => self.node_cost(a, b),
            // Leaf vs subtree: relabel the root, pay for the rest of the subtree.
            (true, false) => {
                self.costs.delete * b.size() as f64 - self.costs.delete + self.node_cost(a, b)
            }
            (false, true) => {
                self.costs.insert * a.size() as f64 - self.costs.insert + self.node_cost(a, b)
            }
            (false, false) => self.node_cost(a, b) + self.forest_distance(a.children(), b.children()),
        };
        self.memo.insert(key, d);
        d
    }

    /// Cost of matching two nodes directly.
    fn node_cost(&self, a: &SyntaxNode, b: &SyntaxNode) -> f64 {
        if a.kind() != b.kind() {
            1.0 + self.costs.kind_weight * kind_distance(a.kind(), b.kind())
        } else if self.costs.rename > 0.0 && a.value() != b.value() {
            self.costs.rename
        } else {
            0.0
        }
    }

    /// Two-row DP over ordered child sequences. The shorter sequence indexes
    /// the rows; delete/insert swap roles when the sides swap.
    fn forest_distance(&mut self, a: &[SyntaxNode], b: &[SyntaxNode]) -> f64 {
        let (a, b, delete, insert) = if b.len() > a.len() {
            (b, a, self.costs.insert, self.costs.delete)
        } else {
            (a, b, self.costs.delete, self.costs.insert)
        };
        let (m, n) = (a.len(), b.len());
        let width = n + 1;

        let base = self.arena.allocate(2 * width);
        let (mut prev, mut curr) = (base, base + width);

        for j in 0..=n {
            self.arena.set(prev + j, j as f64 * insert);
        }
        for i in 1..=m {
            self.arena.set(curr, i as f64 * delete);
            for j in 1..=n {
                let del = self.arena.get(prev + j) + delete * a[i - 1].size() as f64;
                let ins = self.arena.get(curr + j - 1) + insert * b[j - 1].size() as f64;
                let rep = self.arena.get(prev + j - 1) + self.distance(&a[i - 1], &b[j - 1]);
                self.arena.set(curr + j, del.min(ins).min(rep));
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let result = self.arena.get(prev + n);
        self.arena.deallocate(2 * width);
        result
    }
}
