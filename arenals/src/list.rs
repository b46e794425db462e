use core::{cell::Cell, fmt, iter::FusedIterator};

use crate::{Arena, Flat, buf::Buf};

/// A singly linked list whose nodes live in an [`Arena`].
///
/// The list is append-only: [`push_back`](Self::push_back) allocates one
/// [`Node`] per item and links it after the current tail. Nodes are never
/// removed or reordered, and the chain always ends in `None`.
///
/// Every node borrows the arena for `'a`, so the list cannot outlive the next
/// [`reset`](Arena::reset). Within that window it can be traversed any number
/// of times.
///
/// ```
/// use arenals::{Arena, ArenaList, FixedBuf};
///
/// let arena = Arena::new(FixedBuf::<128>::new());
/// let mut list = ArenaList::new();
/// for n in [1u32, 2, 3] {
///   list.push_back(n, &arena).unwrap();
/// }
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert_eq!(list.iter().sum::<u32>(), 6);
/// ```
pub struct ArenaList<'a, T> {
  head: Option<&'a Node<'a, T>>,
  tail: Option<&'a Node<'a, T>>,
  len: usize,
}

/// One arena-allocated link of an [`ArenaList`].
pub struct Node<'a, T> {
  item: T,
  next: Cell<Option<&'a Node<'a, T>>>,
}

// SAFETY: A node is an item plus a Cell around a shared reference; it needs
// Drop only if T does, and T is Flat.
unsafe impl<T: Flat> Flat for Node<'_, T> {}

impl<'a, T> Node<'a, T> {
  /// The stored item.
  #[must_use]
  pub const fn item(&self) -> &T {
    &self.item
  }

  /// The following node, if any.
  #[must_use]
  pub fn next(&self) -> Option<&'a Self> {
    self.next.get()
  }
}

impl<'a, T> ArenaList<'a, T> {
  /// An empty list. Allocates nothing.
  #[must_use]
  pub const fn new() -> Self {
    Self { head: None, tail: None, len: 0 }
  }

  /// Number of items.
  #[must_use]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if the list has no items.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  /// The first node, if any.
  #[must_use]
  pub const fn head(&self) -> Option<&'a Node<'a, T>> {
    self.head
  }

  /// The first item, if any.
  #[must_use]
  pub fn first(&self) -> Option<&'a T> {
    self.head.map(|node| &node.item)
  }

  /// The last item, if any.
  #[must_use]
  pub fn last(&self) -> Option<&'a T> {
    self.tail.map(|node| &node.item)
  }

  /// Iterate from head to tail.
  ///
  /// The iterator covers the items present when it was created; nodes pushed
  /// afterwards are not visited.
  #[must_use]
  pub const fn iter(&self) -> Iter<'a, T> {
    Iter { next: self.head, remaining: self.len }
  }
}

impl<'a, T: Flat> ArenaList<'a, T> {
  /// Allocate a node for `item` in `arena` and link it as the new tail.
  ///
  /// Returns `None` if the arena cannot fit the node. The list is unchanged
  /// in that case; callers treat it as the arena being exhausted for this
  /// workload and stop adding items.
  pub fn push_back<B: Buf>(&mut self, item: T, arena: &'a Arena<B>) -> Option<&'a Node<'a, T>> {
    let node: &'a Node<'a, T> = arena.alloc(Node { item, next: Cell::new(None) })?;
    match self.tail {
      Some(tail) => tail.next.set(Some(node)),
      None => self.head = Some(node),
    }
    self.tail = Some(node);
    self.len += 1;
    Some(node)
  }
}

impl<T> Default for ArenaList<'_, T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: fmt::Debug> fmt::Debug for ArenaList<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<'a, T> IntoIterator for &ArenaList<'a, T> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Forward iterator over an [`ArenaList`], bounded by the list's length at
/// creation.
pub struct Iter<'a, T> {
  next: Option<&'a Node<'a, T>>,
  remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
  fn clone(&self) -> Self {
    Self { next: self.next, remaining: self.remaining }
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  fn next(&mut self) -> Option<&'a T> {
    if self.remaining == 0 {
      return None;
    }
    let node = self.next?;
    self.next = node.next.get();
    self.remaining -= 1;
    Some(&node.item)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
