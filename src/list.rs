use std::ops::{
    Index,
    IndexMut,
};

use crate::arena::{
    Arena,
    Ptr,
};

/// A doubly-linked list that hands out its links.
///
/// Every insertion returns the [`Ptr`] of the new node, and that token is the
/// only way to remove the node again: [`unlink`](HandleList::unlink) patches
/// the neighbors (or the list endpoints) in O(1) with no traversal. Tokens are
/// validated against the backing arena, so unlinking a stale token is a no-op
/// instead of corrupting the chain.
///
/// Traversal is available in insertion order ([`iter`](HandleList::iter)) and
/// its exact reverse ([`iter_rev`](HandleList::iter_rev)). To remove elements
/// while walking, step manually with [`head`](HandleList::head) /
/// [`next`](HandleList::next) and unlink the token you just visited:
///
/// ```
/// use zbuckets::HandleList;
///
/// let mut list = HandleList::new();
/// for i in 0..5 {
///     list.append(i);
/// }
///
/// let mut cur = list.head();
/// while !cur.is_null() {
///     let next = list.next(cur);
///     if list[cur] % 2 == 0 {
///         list.unlink(cur);
///     }
///     cur = next;
/// }
///
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct HandleList<T> {
    arena: Arena<T>,
    head: Ptr,
    tail: Ptr,
    len: usize,
}

impl<T> Default for HandleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        HandleList {
            arena: Arena::new(),
            head: Ptr::null(),
            tail: Ptr::null(),
            len: 0,
        }
    }

    /// Number of elements currently linked.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Token of the first node, or a null token when empty.
    pub fn head(&self) -> Ptr {
        self.head
    }

    /// Token of the last node, or a null token when empty.
    pub fn tail(&self) -> Ptr {
        self.tail
    }

    /// Token of the node after `at`, or a null token at the end.
    pub fn next(&self, at: Ptr) -> Ptr {
        self.arena.links(at).next
    }

    /// Token of the node before `at`, or a null token at the start.
    pub fn prev(&self, at: Ptr) -> Ptr {
        self.arena.links(at).prev
    }

    /// Returns the value at `at` if the token names a live node.
    pub fn get(&self, at: Ptr) -> Option<&T> {
        if self.arena.is_occupied(at) {
            Some(&self.arena[at])
        } else {
            None
        }
    }

    /// Mutable counterpart of [`get`](HandleList::get).
    pub fn get_mut(&mut self, at: Ptr) -> Option<&mut T> {
        if self.arena.is_occupied(at) {
            Some(&mut self.arena[at])
        } else {
            None
        }
    }

    /// Appends `value` at the tail. O(1). Returns the removal token.
    pub fn append(&mut self, value: T) -> Ptr {
        let node = self.arena.alloc(value);
        self.splice_between(node, self.tail, Ptr::null());
        node
    }

    /// Inserts `value` immediately before the live node `at`. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `at` does not name a live node.
    pub fn insert_before(&mut self, at: Ptr, value: T) -> Ptr {
        assert!(self.arena.is_occupied(at), "insert_before: stale token");
        let prev = self.arena.links(at).prev;
        let node = self.arena.alloc(value);
        self.splice_between(node, prev, at);
        node
    }

    /// Inserts `value` immediately after the live node `at`. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `at` does not name a live node.
    pub fn insert_after(&mut self, at: Ptr, value: T) -> Ptr {
        assert!(self.arena.is_occupied(at), "insert_after: stale token");
        let next = self.arena.links(at).next;
        let node = self.arena.alloc(value);
        self.splice_between(node, at, next);
        node
    }

    /// Unlinks the node named by `at` and returns its value.
    ///
    /// Returns `None` when the token is null or stale; the chain is never
    /// touched in that case. O(1), no traversal.
    pub fn unlink(&mut self, at: Ptr) -> Option<T> {
        if !self.arena.is_occupied(at) {
            return None;
        }

        let links = self.arena.links(at);
        let (prev, next) = (links.prev, links.next);

        if prev.is_null() {
            self.head = next;
        } else {
            self.arena.links_mut(prev).next = next;
        }

        if next.is_null() {
            self.tail = prev;
        } else {
            self.arena.links_mut(next).prev = prev;
        }

        self.len -= 1;
        Some(self.arena.free(at))
    }

    /// Lazy traversal in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            cur: self.head,
        }
    }

    /// Lazy traversal in exact reverse of insertion order.
    pub fn iter_rev(&self) -> RevIter<'_, T> {
        RevIter {
            arena: &self.arena,
            cur: self.tail,
        }
    }

    /// Chains the freshly allocated `node` between `prev` and `next`.
    ///
    /// Either neighbor may be null, in which case the corresponding list
    /// endpoint is updated instead. This is the single place the four-pointer
    /// update happens; every insertion path goes through it.
    fn splice_between(&mut self, node: Ptr, prev: Ptr, next: Ptr) {
        {
            let links = self.arena.links_mut(node);
            links.prev = prev;
            links.next = next;
        }

        if prev.is_null() {
            self.head = node;
        } else {
            self.arena.links_mut(prev).next = node;
        }

        if next.is_null() {
            self.tail = node;
        } else {
            self.arena.links_mut(next).prev = node;
        }

        self.len += 1;
    }
}

impl<T> Index<Ptr> for HandleList<T> {
    type Output = T;

    fn index(&self, index: Ptr) -> &Self::Output {
        &self.arena[index]
    }
}

impl<T> IndexMut<Ptr> for HandleList<T> {
    fn index_mut(&mut self, index: Ptr) -> &mut Self::Output {
        &mut self.arena[index]
    }
}

/// Forward iterator over a [`HandleList`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    cur: Ptr,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur.optional()?;
        let node = self.arena.links(cur);
        self.cur = node.next;
        Some(node.value())
    }
}

/// Reverse iterator over a [`HandleList`].
#[derive(Debug)]
pub struct RevIter<'a, T> {
    arena: &'a Arena<T>,
    cur: Ptr,
}

impl<'a, T> Iterator for RevIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur.optional()?;
        let node = self.arena.links(cur);
        self.cur = node.prev;
        Some(node.value())
    }
}
