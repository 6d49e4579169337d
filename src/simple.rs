use crate::{
    Slot,
    ZCollection,
    ZOrderError,
    ZSortable,
    arena::Ptr,
    list::HandleList,
    multi::MultiBucketIter,
};

/// The naive [`ZCollection`], supporting bounded, whole-level Z-orders only.
///
/// One bucket per admissible Z-order in `[0, max_z]`, held in a plain vector:
/// placement is an array index, which is the whole trick. Any other Z-order —
/// negative, above `max_z`, including [`TOPMOST`](crate::TOPMOST) — fails
/// with [`ZOrderError::InvalidZOrder`].
///
/// Prefer [`FixedPointZBuckets`](crate::FixedPointZBuckets) unless the Z
/// range really is this small and fixed.
#[derive(Debug, Clone)]
pub struct SimpleZBuckets<I> {
    /// `buckets[z]` holds the items currently at Z-order `z`.
    buckets: Vec<HandleList<I>>,
    len: usize,
}

impl<I> SimpleZBuckets<I> {
    /// Initializes an empty collection admitting Z-orders `0..=max_z`.
    pub fn new(max_z: usize) -> Self {
        let mut buckets = Vec::with_capacity(max_z + 1);
        buckets.resize_with(max_z + 1, HandleList::new);
        SimpleZBuckets { buckets, len: 0 }
    }

    /// Inclusive upper bound on admissible Z-orders.
    pub fn max_z(&self) -> i32 {
        self.buckets.len() as i32 - 1
    }

    fn check_z(&self, z: i32) -> Result<usize, ZOrderError> {
        if z < 0 || z > self.max_z() {
            return Err(ZOrderError::InvalidZOrder {
                z,
                max_z: self.max_z(),
            });
        }
        Ok(z as usize)
    }
}

impl<I: Copy> ZCollection<I> for SimpleZBuckets<I> {
    fn add<S: ZSortable<Id = I>>(&mut self, item: &mut S) -> Result<(), ZOrderError> {
        if item.slot().is_some() {
            return Err(ZOrderError::AlreadyInCollection);
        }

        let index = self.check_z(item.z_order())?;
        let node = self.buckets[index].append(item.id());
        item.set_slot(Some(Slot {
            bucket: Ptr::unchecked_from(index),
            node,
        }));
        self.len += 1;
        Ok(())
    }

    fn remove<S: ZSortable<Id = I>>(&mut self, item: &mut S) {
        let Some(slot) = item.slot() else {
            return;
        };

        if let Some(bucket) = slot.bucket.get().and_then(|index| self.buckets.get_mut(index)) {
            if bucket.unlink(slot.node).is_some() {
                self.len -= 1;
            }
        }
        item.set_slot(None);
    }

    /// Validates the new Z-order up front: a failed change leaves the item
    /// registered where it was.
    fn change<S: ZSortable<Id = I>>(&mut self, item: &mut S) -> Result<(), ZOrderError> {
        self.check_z(item.z_order())?;
        self.remove(item);
        match self.add(item) {
            Err(ZOrderError::AlreadyInCollection) => {
                unreachable!("slot was cleared by the preceding remove")
            }
            result => result,
        }
    }

    fn front_to_back(&self) -> impl Iterator<Item = I> + '_ {
        MultiBucketIter::new(self.buckets.iter()).copied()
    }

    fn back_to_front(&self) -> impl Iterator<Item = I> + '_ {
        MultiBucketIter::new(self.buckets.iter().rev()).copied()
    }

    fn len(&self) -> usize {
        self.len
    }
}
