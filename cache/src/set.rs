use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use generational_arena::{Arena, Index};

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
  pub(crate) key: K,
  pub(crate) value: Arc<V>,
  // Neighbour used immediately less recently than this entry.
  pub(crate) next: Option<Index>,
  // Neighbour used immediately more recently than this entry.
  pub(crate) prev: Option<Index>,
}

/// One partition of the cache together with its recency list.
///
/// Entries live in an arena and are linked by arena handles, so moving an
/// entry to the head is a pointer patch rather than a copy. A set is owned
/// by exactly one worker thread and is never shared, hence no locking here.
#[derive(Debug)]
pub(crate) struct CacheSet<K, V> {
  index: usize,
  capacity: usize,
  nodes: Arena<Entry<K, V>>,
  lookup: HashMap<K, Index>,
  // Most recently used.
  head: Option<Index>,
  // Least recently used.
  tail: Option<Index>,
}

impl<K: Eq + Hash + Clone, V> CacheSet<K, V> {
  pub fn new(index: usize, capacity: usize) -> Self {
    Self {
      index,
      capacity,
      nodes: Arena::with_capacity(capacity),
      lookup: HashMap::with_capacity(capacity),
      head: None,
      tail: None,
    }
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn len(&self) -> usize {
    self.lookup.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lookup.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.lookup.len() >= self.capacity
  }

  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.lookup.contains_key(key)
  }

  pub fn head_key(&self) -> Option<&K> {
    self.head.map(|index| &self.nodes[index].key)
  }

  pub fn tail_key(&self) -> Option<&K> {
    self.tail.map(|index| &self.nodes[index].key)
  }

  /// Iterates keys from most to least recently used.
  pub fn keys(&self) -> Keys<'_, K, V> {
    Keys {
      nodes: &self.nodes,
      current: self.head,
    }
  }

  // Unlinks a node, patching its neighbours and the head/tail handles.
  // The node itself stays in the arena.
  fn unlink(&mut self, index: Index) {
    let node = &self.nodes[index];
    let prev_node_idx = node.prev;
    let next_node_idx = node.next;

    if let Some(prev_idx) = prev_node_idx {
      self.nodes[prev_idx].next = next_node_idx;
    } else {
      self.head = next_node_idx;
    }

    if let Some(next_idx) = next_node_idx {
      self.nodes[next_idx].prev = prev_node_idx;
    } else {
      self.tail = prev_node_idx;
    }
  }

  fn link_at_head(&mut self, index: Index) {
    let old_head_idx = self.head;
    self.nodes[index].next = old_head_idx;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old_head) = old_head_idx {
      self.nodes[old_head].prev = Some(index);
    }

    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  /// Links a brand new entry as the most recently used one.
  ///
  /// The caller is responsible for making room first; a set never grows past
  /// its capacity.
  pub fn insert_at_head(&mut self, key: K, value: Arc<V>) {
    debug_assert!(!self.lookup.contains_key(&key), "key already resident");
    debug_assert!(!self.is_full(), "insert into a full set");

    let index = self.nodes.insert(Entry {
      key: key.clone(),
      value,
      next: None,
      prev: None,
    });
    self.lookup.insert(key, index);
    self.link_at_head(index);
  }

  /// Re-links the entry for `key` as the head and returns its value.
  pub fn move_to_head<Q>(&mut self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let index = *self.lookup.get(key)?;
    if self.head != Some(index) {
      self.unlink(index);
      self.link_at_head(index);
    }
    Some(self.nodes[index].value.clone())
  }

  /// Replaces the value of a resident key and makes it the head.
  /// Returns the previous value.
  pub fn update<Q>(&mut self, key: &Q, value: Arc<V>) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let index = *self.lookup.get(key)?;
    if self.head != Some(index) {
      self.unlink(index);
      self.link_at_head(index);
    }
    Some(std::mem::replace(&mut self.nodes[index].value, value))
  }

  /// Unlinks and returns the least recently used entry.
  pub fn evict_tail(&mut self) -> Option<(K, Arc<V>)> {
    let tail_index = self.tail?;
    let key = self.nodes[tail_index].key.clone();
    self.remove(&key)
  }

  /// Unlinks and returns the entry for `key`, wherever it sits in the list.
  pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, Arc<V>)>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let index = self.lookup.remove(key)?;
    self.unlink(index);
    let node = self.nodes.remove(index)?;
    Some((node.key, node.value))
  }
}

/// Iterator over a set's keys, most recently used first.
pub struct Keys<'a, K, V> {
  nodes: &'a Arena<Entry<K, V>>,
  current: Option<Index>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
  type Item = &'a K;

  fn next(&mut self) -> Option<Self::Item> {
    let node = &self.nodes[self.current?];
    self.current = node.next;
    Some(&node.key)
  }
}
