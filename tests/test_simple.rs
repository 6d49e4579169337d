use zbuckets::{
    SimpleZBuckets,
    Slot,
    TOPMOST,
    ZCollection,
    ZOrderError,
    ZSortable,
};

#[derive(Debug)]
struct Sprite {
    id: u32,
    z: i32,
    slot: Option<Slot>,
}

impl Sprite {
    fn new(id: u32, z: i32) -> Self {
        Sprite { id, z, slot: None }
    }
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

fn ascending(collection: &SimpleZBuckets<u32>) -> Vec<u32> {
    collection.front_to_back().collect()
}

fn descending(collection: &SimpleZBuckets<u32>) -> Vec<u32> {
    collection.back_to_front().collect()
}

#[test]
fn test_new_is_empty() {
    let collection = SimpleZBuckets::<u32>::new(10);
    assert_eq!(collection.len(), 0);
    assert!(collection.is_empty());
    assert_eq!(collection.max_z(), 10);
    assert_eq!(ascending(&collection), vec![]);
    assert_eq!(descending(&collection), vec![]);
}

#[test]
fn test_add_and_iterate_both_directions() {
    let mut collection = SimpleZBuckets::new(10);
    let mut low = Sprite::new(0, 1);
    let mut high = Sprite::new(1, 9);
    let mut mid = Sprite::new(2, 5);

    collection.add(&mut high).unwrap();
    collection.add(&mut low).unwrap();
    collection.add(&mut mid).unwrap();

    assert_eq!(ascending(&collection), vec![0, 2, 1]);
    assert_eq!(descending(&collection), vec![1, 2, 0]);
}

#[test]
fn test_same_bucket_fifo_in_both_directions() {
    let mut collection = SimpleZBuckets::new(5);
    let mut first = Sprite::new(0, 3);
    let mut second = Sprite::new(1, 3);

    collection.add(&mut first).unwrap();
    collection.add(&mut second).unwrap();

    assert_eq!(ascending(&collection), vec![0, 1]);
    assert_eq!(descending(&collection), vec![0, 1]);
}

#[test]
fn test_bounds_are_validated() {
    let mut collection = SimpleZBuckets::new(10);

    let mut negative = Sprite::new(0, -1);
    assert_eq!(
        collection.add(&mut negative),
        Err(ZOrderError::InvalidZOrder { z: -1, max_z: 10 })
    );
    assert!(negative.slot.is_none());

    let mut too_high = Sprite::new(1, 11);
    assert_eq!(
        collection.add(&mut too_high),
        Err(ZOrderError::InvalidZOrder { z: 11, max_z: 10 })
    );

    // The topmost sentinel is a fixed-point-collection feature.
    let mut topmost = Sprite::new(2, TOPMOST);
    assert_eq!(
        collection.add(&mut topmost),
        Err(ZOrderError::InvalidZOrder {
            z: TOPMOST,
            max_z: 10
        })
    );

    assert!(collection.is_empty());

    let mut edge = Sprite::new(3, 10);
    collection.add(&mut edge).unwrap();
    let mut floor = Sprite::new(4, 0);
    collection.add(&mut floor).unwrap();
    assert_eq!(ascending(&collection), vec![4, 3]);
}

#[test]
fn test_add_twice_fails() {
    let mut collection = SimpleZBuckets::new(5);
    let mut sprite = Sprite::new(0, 2);

    collection.add(&mut sprite).unwrap();
    assert_eq!(
        collection.add(&mut sprite),
        Err(ZOrderError::AlreadyInCollection)
    );
}

#[test]
fn test_remove_is_total() {
    let mut collection = SimpleZBuckets::new(5);
    let mut sprite = Sprite::new(0, 2);

    collection.remove(&mut sprite);

    collection.add(&mut sprite).unwrap();
    collection.remove(&mut sprite);
    assert!(sprite.slot.is_none());
    collection.remove(&mut sprite);

    assert_eq!(collection.len(), 0);
    assert_eq!(ascending(&collection), vec![]);
}

#[test]
fn test_change_moves_and_preserves_fifo() {
    let mut collection = SimpleZBuckets::new(5);
    let mut a = Sprite::new(0, 2);
    let mut b = Sprite::new(1, 2);

    collection.add(&mut a).unwrap();
    collection.add(&mut b).unwrap();

    a.z = 4;
    collection.change(&mut a).unwrap();
    assert_eq!(ascending(&collection), vec![1, 0]);

    a.z = 2;
    collection.change(&mut a).unwrap();
    assert_eq!(ascending(&collection), vec![1, 0]);
    assert_eq!(descending(&collection), vec![1, 0]);
}

#[test]
fn test_failed_change_leaves_item_in_place() {
    let mut collection = SimpleZBuckets::new(5);
    let mut sprite = Sprite::new(0, 2);
    collection.add(&mut sprite).unwrap();

    sprite.z = 99;
    assert_eq!(
        collection.change(&mut sprite),
        Err(ZOrderError::InvalidZOrder { z: 99, max_z: 5 })
    );

    // Still registered under its old bucket.
    assert!(sprite.slot.is_some());
    assert_eq!(ascending(&collection), vec![0]);
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_readd_after_remove() {
    let mut collection = SimpleZBuckets::new(5);
    let mut sprite = Sprite::new(0, 3);

    collection.add(&mut sprite).unwrap();
    collection.remove(&mut sprite);
    collection.add(&mut sprite).unwrap();

    assert_eq!(ascending(&collection), vec![0]);
}
