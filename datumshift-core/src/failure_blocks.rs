//! Fixed-capacity record of already-reported failure locations
//!
//! Soft failures are deduplicated by rounding the failing coordinate to a
//! coarse block. The set never grows past its capacity; what happens once it
//! is full is decided by the error policy, not here.

/// Default number of blocks remembered per bridge
pub const DEFAULT_BLOCK_CAPACITY: usize = 10;

/// A coordinate rounded down to a whole-degree block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockKey {
    /// Floor of the longitude
    pub lng: i32,
    /// Floor of the latitude
    pub lat: i32,
}

impl BlockKey {
    /// Round a coordinate down to its block
    pub fn from_degrees(lng: f64, lat: f64) -> Self {
        Self {
            lng: clamp_floor(lng),
            lat: clamp_floor(lat),
        }
    }
}

fn clamp_floor(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Result of offering a block to the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockInsert {
    /// First time this block was seen; it is now recorded
    Inserted,
    /// The block was already recorded
    AlreadySeen,
    /// The block is new but every slot is taken
    Full,
}

/// Fixed-capacity set of failure blocks
#[derive(Debug, Clone, PartialEq)]
pub struct FailureBlocks<const N: usize = DEFAULT_BLOCK_CAPACITY> {
    slots: [Option<BlockKey>; N],
    len: usize,
}

impl<const N: usize> FailureBlocks<N> {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            len: 0,
        }
    }

    /// Record `key` unless already present or the set is full
    pub fn insert(&mut self, key: BlockKey) -> BlockInsert {
        if self.contains(key) {
            return BlockInsert::AlreadySeen;
        }
        if self.len == N {
            return BlockInsert::Full;
        }
        self.slots[self.len] = Some(key);
        self.len += 1;
        BlockInsert::Inserted
    }

    /// True when the block has been recorded
    pub fn contains(&self, key: BlockKey) -> bool {
        self.slots[..self.len].contains(&Some(key))
    }

    /// Number of recorded blocks
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once every slot is taken
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Capacity of the set
    pub const fn capacity() -> usize {
        N
    }

    /// Forget every recorded block
    pub fn clear(&mut self) {
        self.slots = [None; N];
        self.len = 0;
    }

    /// Iterate over recorded blocks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.slots[..self.len].iter().flatten().copied()
    }
}

impl<const N: usize> Default for FailureBlocks<N> {
    fn default() -> Self {
        Self::new()
    }
}
