//! Weighted LRU engine
//!
//! Entries live in an arena of slots linked into a recency list, so
//! promotion and eviction are O(1) and no entry is referenced after its
//! slot is freed. Not synchronised; see [`crate::WeightedCache`].

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use ahash::RandomState;

use crate::error::{Error, Result};

/// Slot in the recency list. `prev` points towards the most recent end.
struct Node<K, V> {
    key: K,
    value: V,
    weight: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Entry removed by the eviction loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evicted<K, V> {
    /// Key of the evicted entry
    pub key: K,
    /// Value handed back to the caller
    pub value: V,
    /// Weight the entry was inserted with
    pub weight: u64,
}

/// LRU list bounded by total weight instead of entry count
pub struct WeightedLru<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    weight: u64,
    budget: i64,
}

impl<K, V> WeightedLru<K, V>
where
    K: Hash + Eq + Clone + fmt::Display,
{
    /// Create an empty engine with the given weight budget.
    ///
    /// Zero or negative budgets are accepted; such an engine keeps at most
    /// one entry at a time.
    pub fn new(budget: i64) -> Self {
        Self {
            map: HashMap::with_hasher(RandomState::new()),
            nodes: Vec::new(),
            head: None,
            tail: None,
            free_list: Vec::new(),
            weight: 0,
            budget,
        }
    }

    /// Link a new entry at the most recent end.
    ///
    /// Does not evict; drive [`pop_lru_if_over_budget`](Self::pop_lru_if_over_budget)
    /// afterwards to restore the budget.
    pub fn insert(&mut self, key: K, value: V, weight: u64) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(Error::AlreadyExists(key.to_string()));
        }

        let total = self
            .weight
            .checked_add(weight)
            .ok_or_else(|| Error::WeightOverflow {
                key: key.to_string(),
                weight,
            })?;

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            weight,
            prev: None,
            next: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }

        self.map.insert(key, idx);
        self.weight = total;
        Ok(())
    }

    /// Evict the least recently used entry if the budget is exceeded.
    ///
    /// The last resident entry is never evicted, even when it alone
    /// outweighs the budget.
    pub fn pop_lru_if_over_budget(&mut self) -> Option<Evicted<K, V>> {
        if self.map.len() <= 1 || !self.is_over_budget() {
            return None;
        }

        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        let node = self.nodes[tail_idx].take()?;
        self.free_node(tail_idx);
        self.map.remove(&node.key);
        self.weight -= node.weight;

        Some(Evicted {
            key: node.key,
            value: node.value,
            weight: node.weight,
        })
    }

    /// Get a value and promote it to most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(&idx) = self.map.get(key) {
            self.move_to_front(idx);
            self.nodes[idx].as_ref().map(|node| &node.value)
        } else {
            None
        }
    }

    /// Get a value without touching recency order
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map
            .get(key)
            .and_then(|&idx| self.nodes[idx].as_ref())
            .map(|node| &node.value)
    }

    /// Check residency without touching recency order
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.nodes[cursor?].as_ref()?;
            cursor = node.next;
            Some(&node.key)
        })
    }

    /// Number of resident entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if no entries are resident
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of resident weights
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Configured budget
    pub fn budget(&self) -> i64 {
        self.budget
    }

    /// `budget - weight`, saturating at `i64::MIN`
    pub fn spare_weight(&self) -> i64 {
        self.budget.saturating_sub_unsigned(self.weight)
    }

    /// Check if resident weight exceeds the budget
    pub fn is_over_budget(&self) -> bool {
        self.spare_weight() < 0
    }

    /// Drop every entry and reset the weight to zero
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.weight = 0;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}
