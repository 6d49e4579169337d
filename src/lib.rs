#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

mod arena;
mod fixed;
mod list;
mod multi;
mod simple;

pub use arena::Ptr;
pub use fixed::FixedPointZBuckets;
pub use list::{
    HandleList,
    Iter,
    RevIter,
};
pub use multi::MultiBucketIter;
pub use simple::SimpleZBuckets;
use thiserror::Error;

/// Fixed-point scale factor between whole Z "levels" and Z-orders.
///
/// Level `L` has Z-order `L * PIVOT`; the values in between are legal
/// Z-orders too (an item tweening from level 3 to 4 can sit at `3_500`).
/// Fixed-point rather than floating-point so depth stays exactly comparable
/// integer arithmetic.
pub const PIVOT: i32 = 1000;

/// Sentinel Z-order meaning "topmost".
///
/// [`FixedPointZBuckets`] routes this value to a permanent bucket after every
/// other Z-order, making it a cheap default for freshly spawned items.
pub const TOPMOST: i32 = i32::MAX;

/// Opaque storage handle held by an item while it is inside a collection.
///
/// A `Slot` names the item's bucket and its node within that bucket, which is
/// what makes removal O(1): no search ever happens. Items hold at most one
/// `Slot` at a time — a set slot means the item is registered in exactly one
/// collection, and the collection clears it again on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub(crate) bucket: Ptr,
    pub(crate) node: Ptr,
}

/// Errors reported by [`ZCollection`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ZOrderError {
    /// The item already holds a [`Slot`], i.e. it is still registered in a
    /// collection. Remove it first, or use [`ZCollection::change`].
    #[error("object is already present in a z-order collection")]
    AlreadyInCollection,

    /// The item's Z-order is outside the admissible range of a bounded
    /// collection.
    #[error("invalid z-order {z}: this collection only admits 0..={max_z}")]
    InvalidZOrder {
        /// The offending Z-order.
        z: i32,
        /// The collection's inclusive upper bound.
        max_z: i32,
    },
}

/// Capability every orderable item must expose.
///
/// The collection reads the item's Z-order on add, and stores/clears the
/// item's [`Slot`] as it enters and leaves. The item is responsible for
/// keeping the slot it was handed until the collection clears it; tampering
/// with it breaks the one-item-one-slot invariant.
pub trait ZSortable {
    /// Value yielded during traversal — typically a cheap entity id the
    /// render loop resolves back to the item.
    type Id: Copy;

    /// The traversal id of this item.
    fn id(&self) -> Self::Id;

    /// Current Z-order. Higher sorts in front; [`TOPMOST`] sorts after
    /// everything.
    fn z_order(&self) -> i32;

    /// The storage handle, if the item is currently in a collection.
    fn slot(&self) -> Option<Slot>;

    /// Stores or clears the storage handle. Called by collections only.
    fn set_slot(&mut self, slot: Option<Slot>);
}

/// An always-sorted O(1) collection of [`ZSortable`]s.
///
/// Implemented by [`FixedPointZBuckets`] (arbitrary `i32` Z-orders) and
/// [`SimpleZBuckets`] (whole levels in a bounded range only). All operations
/// run in constant time; see the implementors for what "constant" costs when
/// a Z-order misses the fast paths.
pub trait ZCollection<I: Copy> {
    /// Adds an item under its current Z-order and stores the resulting
    /// [`Slot`] on it.
    ///
    /// Fails with [`ZOrderError::AlreadyInCollection`] if the item already
    /// holds a slot — an item lives in at most one collection at a time.
    /// Bounded implementations fail with [`ZOrderError::InvalidZOrder`] for
    /// Z-orders outside their range.
    fn add<S: ZSortable<Id = I>>(&mut self, item: &mut S) -> Result<(), ZOrderError>;

    /// Removes an item via its stored slot and clears the slot. O(1), never
    /// searches.
    ///
    /// A no-op when the item holds no slot: "remove what might already be
    /// gone" is a legitimate render-loop pattern, not an error.
    fn remove<S: ZSortable<Id = I>>(&mut self, item: &mut S);

    /// Re-files an item after the caller updated its Z-order.
    ///
    /// Equivalent to remove-then-add. Never surfaces
    /// [`ZOrderError::AlreadyInCollection`].
    fn change<S: ZSortable<Id = I>>(&mut self, item: &mut S) -> Result<(), ZOrderError>;

    /// Lazy one-shot traversal in ascending Z-order.
    ///
    /// Items sharing a Z-order come out in insertion order.
    fn front_to_back(&self) -> impl Iterator<Item = I> + '_;

    /// Lazy one-shot traversal in descending Z-order.
    ///
    /// Items sharing a Z-order still come out in insertion order, so equal-Z
    /// items keep the same relative order in both directions.
    fn back_to_front(&self) -> impl Iterator<Item = I> + '_;

    /// Number of items currently registered.
    fn len(&self) -> usize;

    /// Whether no items are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
