use std::{
    num::NonZeroU32,
    ops::{
        Index,
        IndexMut,
    },
};

/// An opaque index token into an [`Arena`].
///
/// `Ptr` is the raw material of every removal handle in this crate: instead of
/// handing out aliasable references to list nodes, lists hand out a `Ptr` and
/// validate it against the arena before mutating anything. A `Ptr` is either
/// null or names a slot; whether that slot is currently occupied is checked at
/// use time.
///
/// Niche-packed so that `Option<Ptr>`-shaped data stays four bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Ptr(NonZeroU32);

impl std::fmt::Debug for Ptr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Ptr::null() {
            write!(f, "Ptr(null)")
        } else {
            write!(f, "Ptr({})", self.0.get() - 1)
        }
    }
}

impl Default for Ptr {
    fn default() -> Self {
        Ptr::null()
    }
}

impl Ptr {
    pub(crate) fn null() -> Self {
        Ptr(NonZeroU32::new(u32::MAX).unwrap())
    }

    /// Whether this token names no slot at all.
    pub fn is_null(&self) -> bool {
        *self == Ptr::null()
    }

    pub(crate) fn unchecked_from(index: usize) -> Self {
        debug_assert!(
            index < u32::MAX as usize - 1,
            "Index too large to fit in Ptr: {index}"
        );
        Ptr(NonZeroU32::new((index as u32).wrapping_add(1)).unwrap())
    }

    pub(crate) fn unchecked_get(self) -> usize {
        self.0.get() as usize - 1
    }

    pub(crate) fn get(self) -> Option<usize> {
        if self.is_null() {
            None
        } else {
            Some(self.0.get() as usize - 1)
        }
    }

    pub(crate) fn optional(self) -> Option<Ptr> {
        if self.is_null() { None } else { Some(self) }
    }
}

#[derive(Debug, Clone)]
enum ValueOrFree<T> {
    Free,
    Value(T),
}

/// A chained slot: neighbor links plus the payload, or a free-list entry.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) prev: Ptr,
    pub(crate) next: Ptr,
    state: ValueOrFree<T>,
}

impl<T> Node<T> {
    pub(crate) fn value(&self) -> &T {
        match &self.state {
            ValueOrFree::Value(value) => value,
            ValueOrFree::Free => unreachable!("Attempted to read the value of a free slot"),
        }
    }

    pub(crate) fn value_mut(&mut self) -> &mut T {
        match &mut self.state {
            ValueOrFree::Value(value) => value,
            ValueOrFree::Free => unreachable!("Attempted to read the value of a free slot"),
        }
    }

    fn into_value(self) -> T {
        match self.state {
            ValueOrFree::Value(value) => value,
            ValueOrFree::Free => unreachable!("Attempted to take the value of a free slot"),
        }
    }
}

/// Slot storage for linked-list nodes.
///
/// Freed slots are threaded through an intrusive free list (reusing the `next`
/// link) and recycled on the next allocation, so a collection that churns at a
/// steady size stops allocating entirely.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    nodes: Vec<Node<T>>,
    free_head: Ptr,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Arena {
            nodes: Vec::new(),
            free_head: Ptr::null(),
        }
    }

    pub(crate) fn links(&self, ptr: Ptr) -> &Node<T> {
        &self.nodes[ptr.unchecked_get()]
    }

    pub(crate) fn links_mut(&mut self, ptr: Ptr) -> &mut Node<T> {
        &mut self.nodes[ptr.unchecked_get()]
    }

    pub(crate) fn is_occupied(&self, ptr: Ptr) -> bool {
        match ptr.get() {
            Some(index) => matches!(
                self.nodes.get(index),
                Some(Node {
                    state: ValueOrFree::Value(_),
                    ..
                })
            ),
            None => false,
        }
    }

    #[inline]
    pub(crate) fn alloc(&mut self, value: T) -> Ptr {
        if !self.free_head.is_null() {
            let ptr = self.free_head;
            self.free_head = self.nodes[ptr.unchecked_get()].next;
            self.nodes[ptr.unchecked_get()] = Node {
                prev: Ptr::null(),
                next: Ptr::null(),
                state: ValueOrFree::Value(value),
            };
            ptr
        } else {
            let ptr = Ptr::unchecked_from(self.nodes.len());
            self.nodes.push(Node {
                prev: Ptr::null(),
                next: Ptr::null(),
                state: ValueOrFree::Value(value),
            });
            ptr
        }
    }

    /// Returns the slot to the free list and hands back its payload.
    ///
    /// The caller is responsible for unchaining the node first; the neighbor
    /// links are discarded here.
    #[inline]
    pub(crate) fn free(&mut self, ptr: Ptr) -> T {
        debug_assert!(
            self.is_occupied(ptr),
            "Pointer to free must name an occupied slot: {ptr:?}"
        );
        let node = std::mem::replace(
            &mut self.nodes[ptr.unchecked_get()],
            Node {
                prev: Ptr::null(),
                next: self.free_head,
                state: ValueOrFree::Free,
            },
        );
        self.free_head = ptr;
        node.into_value()
    }
}

impl<T> Index<Ptr> for Arena<T> {
    type Output = T;

    fn index(&self, index: Ptr) -> &Self::Output {
        self.nodes[index.unchecked_get()].value()
    }
}

impl<T> IndexMut<Ptr> for Arena<T> {
    fn index_mut(&mut self, index: Ptr) -> &mut Self::Output {
        self.nodes[index.unchecked_get()].value_mut()
    }
}
