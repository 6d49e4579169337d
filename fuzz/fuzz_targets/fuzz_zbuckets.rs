#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use zbuckets::{
    FixedPointZBuckets,
    PIVOT,
    Slot,
    TOPMOST,
    ZCollection,
    ZOrderError,
    ZSortable,
};

const SPRITES: usize = 16;

#[derive(Debug)]
struct Sprite {
    id: u32,
    z: i32,
    slot: Option<Slot>,
}

impl ZSortable for Sprite {
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

#[derive(Debug)]
enum Operation {
    Add(u8, i32),
    Remove(u8),
    Change(u8, i32),
    Traverse,
}

/// Biases z-orders toward the interesting spots: anchors, between-anchor
/// values, negatives, and the topmost sentinel.
fn arbitrary_z(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<i32> {
    Ok(match u.int_in_range(0..=4)? {
        0 => i32::from(u.int_in_range(-8i8..=8)?) * PIVOT,
        1 => i32::from(u.int_in_range(-8i8..=8)?) * PIVOT + PIVOT / 2,
        2 => i32::from(u.int_in_range(-3i8..=3)?) * 100 * PIVOT,
        3 => TOPMOST,
        4 => u.arbitrary()?,
        _ => unreachable!(),
    })
}

impl<'a> arbitrary::Arbitrary<'a> for Operation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match u.int_in_range(0..=3)? {
            0 => Ok(Operation::Add(u.arbitrary()?, arbitrary_z(u)?)),
            1 => Ok(Operation::Remove(u.arbitrary()?)),
            2 => Ok(Operation::Change(u.arbitrary()?, arbitrary_z(u)?)),
            3 => Ok(Operation::Traverse),
            _ => unreachable!(),
        }
    }
}

/// Insertion-ordered ids per z, the dumb-but-obviously-correct way.
#[derive(Default)]
struct Model {
    buckets: BTreeMap<i32, Vec<u32>>,
}

impl Model {
    fn add(&mut self, z: i32, id: u32) {
        self.buckets.entry(z).or_default().push(id);
    }

    fn remove(&mut self, z: i32, id: u32) {
        let bucket = self.buckets.get_mut(&z).unwrap();
        let at = bucket.iter().position(|&other| other == id).unwrap();
        bucket.remove(at);
    }

    fn ascending(&self) -> Vec<u32> {
        self.buckets.values().flatten().copied().collect()
    }

    fn descending(&self) -> Vec<u32> {
        self.buckets.values().rev().flatten().copied().collect()
    }

    fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

fuzz_target!(|operations: Vec<Operation>| {
    let mut collection = FixedPointZBuckets::new(8);
    let mut sprites: Vec<Sprite> = (0..SPRITES)
        .map(|id| Sprite {
            id: id as u32,
            z: 0,
            slot: None,
        })
        .collect();
    let mut model = Model::default();

    for op in operations {
        match op {
            Operation::Add(index, z) => {
                let sprite = &mut sprites[index as usize % SPRITES];
                let registered = sprite.slot.is_some();
                if !registered {
                    sprite.z = z;
                }
                match collection.add(sprite) {
                    Ok(()) => {
                        assert!(!registered);
                        assert!(sprite.slot.is_some());
                        model.add(sprite.z, sprite.id);
                    }
                    Err(ZOrderError::AlreadyInCollection) => assert!(registered),
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
            Operation::Remove(index) => {
                let sprite = &mut sprites[index as usize % SPRITES];
                let registered = sprite.slot.is_some();
                collection.remove(sprite);
                assert!(sprite.slot.is_none());
                if registered {
                    model.remove(sprite.z, sprite.id);
                }
            }
            Operation::Change(index, z) => {
                let sprite = &mut sprites[index as usize % SPRITES];
                let registered = sprite.slot.is_some();
                if registered {
                    model.remove(sprite.z, sprite.id);
                }
                sprite.z = z;
                collection.change(sprite).unwrap();
                assert!(sprite.slot.is_some());
                model.add(sprite.z, sprite.id);
            }
            Operation::Traverse => {
                let ascending: Vec<u32> = collection.front_to_back().collect();
                let descending: Vec<u32> = collection.back_to_front().collect();
                assert_eq!(ascending, model.ascending());
                assert_eq!(descending, model.descending());
            }
        }

        assert_eq!(collection.len(), model.len());
        collection.debug_validate();
    }

    let ascending: Vec<u32> = collection.front_to_back().collect();
    assert_eq!(ascending, model.ascending());
});
