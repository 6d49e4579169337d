use crate::list::{
    self,
    HandleList,
};

/// Flattens an ordered sequence of buckets into one lazy item sequence.
///
/// The outer iterator decides the direction: hand in the bucket sequence
/// forward for ascending Z, reversed for descending Z. Within a bucket, items
/// always come out in insertion order, so two items sharing a Z-order keep
/// their relative order no matter which way the buckets are walked.
///
/// Empty buckets are skipped; any number of consecutive empties is fine. The
/// iterator is read-only: removal goes through the item's own stored handle,
/// never through traversal.
#[derive(Debug)]
pub struct MultiBucketIter<'a, T, B>
where
    B: Iterator<Item = &'a HandleList<T>>,
    T: 'a,
{
    buckets: B,
    current: Option<list::Iter<'a, T>>,
}

impl<'a, T, B> MultiBucketIter<'a, T, B>
where
    B: Iterator<Item = &'a HandleList<T>>,
{
    /// Wraps an ordered bucket sequence.
    pub fn new(buckets: B) -> Self {
        MultiBucketIter {
            buckets,
            current: None,
        }
    }
}

impl<'a, T, B> Iterator for MultiBucketIter<'a, T, B>
where
    B: Iterator<Item = &'a HandleList<T>>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(inner) = &mut self.current {
                if let Some(value) = inner.next() {
                    return Some(value);
                }
            }

            // Current bucket exhausted (or we haven't started); move on to
            // the next bucket in the requested direction.
            self.current = Some(self.buckets.next()?.iter());
        }
    }
}
