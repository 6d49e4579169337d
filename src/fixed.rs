use crate::{
    PIVOT,
    Slot,
    TOPMOST,
    ZCollection,
    ZOrderError,
    ZSortable,
    arena::Ptr,
    list::HandleList,
    multi::MultiBucketIter,
};

/// All items sharing one exact Z-order, in insertion order.
#[derive(Debug, Clone)]
struct Bucket<I> {
    z: i32,
    items: HandleList<I>,
}

impl<I> Bucket<I> {
    fn new(z: i32) -> Self {
        Bucket {
            z,
            items: HandleList::new(),
        }
    }
}

/// Which side of the probe's stopping bucket a new bucket is opened on.
#[derive(Debug, Clone, Copy)]
enum Open {
    Before,
    After,
}

/// The fixed-point [`ZCollection`], imposing no limitation on legal Z-orders.
///
/// Buckets live in a [`HandleList`] kept in strictly ascending Z at all
/// times, fenced by two permanent sentinels at `i32::MIN` and `i32::MAX`
/// (the latter is home to [`TOPMOST`] items). Anchor buckets for whole levels
/// `0..=max_level` are created up front and indexed densely, so the expected
/// Z-orders resolve with one array lookup.
///
/// Any other Z-order — negative, between levels, or past `max_level` — is
/// placed by probing bucket-by-bucket from the nearest anchor and splicing a
/// fresh bucket where the probe stops. That costs O(distance in buckets from
/// the anchor), independent of how many items the collection holds, which is
/// why dense anchors for the *common* levels matter.
///
/// ```
/// use zbuckets::{
///     FixedPointZBuckets,
///     ZCollection,
/// };
///
/// // Optimized for levels 0..=10; everything else still works.
/// let collection = FixedPointZBuckets::<u32>::new(10);
/// assert!(collection.is_empty());
/// assert!(collection.front_to_back().next().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FixedPointZBuckets<I> {
    /// Open buckets, strictly ascending in Z.
    buckets: HandleList<Bucket<I>>,
    /// Anchor bucket for level `i` at `quick[i]`; never unlinked.
    quick: Vec<Ptr>,
    /// The permanent `i32::MAX` bucket.
    top: Ptr,
    len: usize,
}

impl<I> FixedPointZBuckets<I> {
    /// Initializes an empty collection with anchor buckets for the whole
    /// levels `0..=max_level` (Z-orders `0`, `PIVOT`, ... `max_level *
    /// PIVOT`).
    ///
    /// # Panics
    ///
    /// Panics if `max_level * PIVOT` does not fit below [`TOPMOST`].
    pub fn new(max_level: usize) -> Self {
        assert!(
            (max_level as i64) * (PIVOT as i64) < i32::MAX as i64,
            "max_level {max_level} too large: anchors must stay below TOPMOST"
        );

        let mut buckets = HandleList::new();

        // One permanently empty bucket at either end of the admissible range
        // spares the probe every endpoint special case.
        buckets.append(Bucket::new(i32::MIN));

        let mut quick = Vec::with_capacity(max_level + 1);
        for level in 0..=max_level {
            quick.push(buckets.append(Bucket::new(level as i32 * PIVOT)));
        }

        let top = buckets.append(Bucket::new(i32::MAX));

        FixedPointZBuckets {
            buckets,
            quick,
            top,
            len: 0,
        }
    }

    /// Resolves `z` to its bucket, opening and splicing a new one if no
    /// bucket with that exact Z exists yet.
    fn bucket_for(&mut self, z: i32) -> Ptr {
        if z == TOPMOST {
            // Default for freshly spawned items; the bucket already exists.
            return self.top;
        }

        if z >= 0 {
            let level = (z / PIVOT) as usize;
            if z % PIVOT == 0 && level < self.quick.len() {
                return self.quick[level];
            }

            // Probe forward from the nearest anchor at or below z. The top
            // sentinel bounds the walk: its Z is never < z here.
            let mut cur = self.quick[level.min(self.quick.len() - 1)];
            loop {
                if self.buckets[cur].z >= z {
                    break;
                }
                let next = self.buckets.next(cur);
                if self.buckets[next].z > z {
                    break;
                }
                cur = next;
            }
            self.find_or_open(cur, z, Open::After)
        } else {
            // Negative: probe backward from the zero anchor. The floor
            // sentinel bounds the walk symmetrically.
            let mut cur = self.quick[0];
            loop {
                if self.buckets[cur].z <= z {
                    break;
                }
                let prev = self.buckets.prev(cur);
                if self.buckets[prev].z < z {
                    break;
                }
                cur = prev;
            }
            self.find_or_open(cur, z, Open::Before)
        }
    }

    /// Returns `at` on an exact Z match, otherwise splices a new bucket for
    /// `z` right before/after it, preserving strict ascending order.
    fn find_or_open(&mut self, at: Ptr, z: i32, side: Open) -> Ptr {
        if self.buckets[at].z == z {
            return at;
        }
        match side {
            Open::Before => self.buckets.insert_before(at, Bucket::new(z)),
            Open::After => self.buckets.insert_after(at, Bucket::new(z)),
        }
    }

    /// Walks the whole structure and panics on any broken invariant.
    #[cfg(any(test, feature = "internal-debugging"))]
    #[doc(hidden)]
    pub fn debug_validate(&self) {
        let mut prev_z: Option<i32> = None;
        let mut items = 0;
        for bucket in self.buckets.iter() {
            if let Some(prev_z) = prev_z {
                assert!(
                    prev_z < bucket.z,
                    "bucket order violated: {prev_z} before {}",
                    bucket.z
                );
            }
            prev_z = Some(bucket.z);
            items += bucket.items.len();
        }
        assert_eq!(items, self.len, "item count out of sync");

        let first = self.buckets.head();
        assert_eq!(self.buckets[first].z, i32::MIN, "floor sentinel missing");
        assert_eq!(self.buckets[self.top].z, i32::MAX, "top sentinel missing");
        assert_eq!(self.buckets.tail(), self.top, "top sentinel not last");

        for (level, &anchor) in self.quick.iter().enumerate() {
            let bucket = self.buckets.get(anchor).expect("anchor unlinked");
            assert_eq!(bucket.z, level as i32 * PIVOT, "anchor z drifted");
        }
    }
}

impl<I: Copy> ZCollection<I> for FixedPointZBuckets<I> {
    fn add<S: ZSortable<Id = I>>(&mut self, item: &mut S) -> Result<(), ZOrderError> {
        if item.slot().is_some() {
            return Err(ZOrderError::AlreadyInCollection);
        }

        let bucket = self.bucket_for(item.z_order());
        let node = self.buckets[bucket].items.append(item.id());
        item.set_slot(Some(Slot { bucket, node }));
        self.len += 1;
        Ok(())
    }

    fn remove<S: ZSortable<Id = I>>(&mut self, item: &mut S) {
        let Some(slot) = item.slot() else {
            return;
        };

        if let Some(bucket) = self.buckets.get_mut(slot.bucket) {
            if bucket.items.unlink(slot.node).is_some() {
                self.len -= 1;
            }
        }
        item.set_slot(None);
    }

    fn change<S: ZSortable<Id = I>>(&mut self, item: &mut S) -> Result<(), ZOrderError> {
        self.remove(item);
        match self.add(item) {
            Err(ZOrderError::AlreadyInCollection) => {
                unreachable!("slot was cleared by the preceding remove")
            }
            result => result,
        }
    }

    fn front_to_back(&self) -> impl Iterator<Item = I> + '_ {
        MultiBucketIter::new(self.buckets.iter().map(|bucket| &bucket.items)).copied()
    }

    fn back_to_front(&self) -> impl Iterator<Item = I> + '_ {
        MultiBucketIter::new(self.buckets.iter_rev().map(|bucket| &bucket.items)).copied()
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestItem {
        id: u32,
        z: i32,
        slot: Option<Slot>,
    }

    impl TestItem {
        fn new(id: u32, z: i32) -> Self {
            TestItem { id, z, slot: None }
        }
    }

    impl ZSortable for TestItem {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn z_order(&self) -> i32 {
            self.z
        }

        fn slot(&self) -> Option<Slot> {
            self.slot
        }

        fn set_slot(&mut self, slot: Option<Slot>) {
            self.slot = slot;
        }
    }

    fn bucket_zs<I>(collection: &FixedPointZBuckets<I>) -> Vec<i32> {
        collection.buckets.iter().map(|bucket| bucket.z).collect()
    }

    #[test]
    fn test_new_opens_sentinels_and_anchors() {
        let collection = FixedPointZBuckets::<u32>::new(3);
        assert_eq!(
            bucket_zs(&collection),
            vec![i32::MIN, 0, PIVOT, 2 * PIVOT, 3 * PIVOT, i32::MAX]
        );
        collection.debug_validate();
    }

    #[test]
    fn test_anchor_add_opens_no_bucket() {
        let mut collection = FixedPointZBuckets::new(10);
        let before = bucket_zs(&collection).len();

        for (id, level) in [0, 5, 10].into_iter().enumerate() {
            let mut item = TestItem::new(id as u32, level * PIVOT);
            collection.add(&mut item).unwrap();
        }

        assert_eq!(bucket_zs(&collection).len(), before);
        collection.debug_validate();
    }

    #[test]
    fn test_mid_level_z_opens_exactly_one_bucket() {
        let mut collection = FixedPointZBuckets::new(10);
        let mid = 3 * PIVOT + PIVOT / 2;

        let mut item = TestItem::new(0, mid);
        collection.add(&mut item).unwrap();

        let zs = bucket_zs(&collection);
        let at = zs.iter().position(|&z| z == mid).unwrap();
        assert_eq!(zs[at - 1], 3 * PIVOT);
        assert_eq!(zs[at + 1], 4 * PIVOT);
        collection.debug_validate();

        // A second item at the same non-anchor Z reuses the bucket.
        let mut other = TestItem::new(1, mid);
        collection.add(&mut other).unwrap();
        assert_eq!(bucket_zs(&collection), zs);
        assert_eq!(
            collection.front_to_back().collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_beyond_max_level_probes_from_last_anchor() {
        let mut collection = FixedPointZBuckets::new(4);

        let mut far = TestItem::new(0, 1000 * PIVOT);
        let mut farther = TestItem::new(1, 2000 * PIVOT);
        let mut between = TestItem::new(2, 1500 * PIVOT);
        collection.add(&mut far).unwrap();
        collection.add(&mut farther).unwrap();
        collection.add(&mut between).unwrap();

        assert_eq!(
            collection.front_to_back().collect::<Vec<_>>(),
            vec![0, 2, 1]
        );
        collection.debug_validate();
    }

    #[test]
    fn test_negative_buckets_splice_below_zero() {
        let mut collection = FixedPointZBuckets::new(2);

        let mut a = TestItem::new(0, -10 * PIVOT);
        let mut b = TestItem::new(1, -20 * PIVOT);
        let mut c = TestItem::new(2, -15 * PIVOT);
        collection.add(&mut a).unwrap();
        collection.add(&mut b).unwrap();
        collection.add(&mut c).unwrap();

        let zs = bucket_zs(&collection);
        assert_eq!(
            &zs[..5],
            &[i32::MIN, -20 * PIVOT, -15 * PIVOT, -10 * PIVOT, 0]
        );
        assert_eq!(
            collection.front_to_back().collect::<Vec<_>>(),
            vec![1, 2, 0]
        );
        collection.debug_validate();
    }

    #[test]
    fn test_topmost_goes_to_permanent_top_bucket() {
        let mut collection = FixedPointZBuckets::new(2);
        let before = bucket_zs(&collection).len();

        let mut item = TestItem::new(0, TOPMOST);
        collection.add(&mut item).unwrap();

        assert_eq!(bucket_zs(&collection).len(), before);
        assert_eq!(collection.front_to_back().last(), Some(0));
        collection.debug_validate();
    }

    #[test]
    fn test_churn_never_duplicates_buckets() {
        let mut collection = FixedPointZBuckets::new(5);
        let mut items: Vec<TestItem> = (0..20)
            .map(|id| TestItem::new(id, (id as i32 % 7) * PIVOT / 2))
            .collect();

        for item in &mut items {
            collection.add(item).unwrap();
        }
        for item in items.iter_mut().step_by(2) {
            collection.remove(item);
        }
        for item in items.iter_mut().step_by(2) {
            item.z = -item.z;
            collection.add(item).unwrap();
        }

        collection.debug_validate();

        let mut zs = bucket_zs(&collection);
        zs.dedup();
        assert_eq!(zs, bucket_zs(&collection), "duplicate bucket opened");
    }

    #[test]
    fn test_len_tracks_operations() {
        let mut collection = FixedPointZBuckets::new(2);
        assert!(collection.is_empty());

        let mut a = TestItem::new(0, 0);
        let mut b = TestItem::new(1, PIVOT);
        collection.add(&mut a).unwrap();
        collection.add(&mut b).unwrap();
        assert_eq!(collection.len(), 2);

        b.z = 3 * PIVOT;
        collection.change(&mut b).unwrap();
        assert_eq!(collection.len(), 2);

        collection.remove(&mut a);
        assert_eq!(collection.len(), 1);
        collection.remove(&mut a);
        assert_eq!(collection.len(), 1);
    }
}
