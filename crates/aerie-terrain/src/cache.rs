//! Growable rectangular chunk cache.
//!
//! Slots live in one flat row-major array covering the inclusive rectangle
//! `west..=east` by `north..=south` in chunk coordinates. The rectangle only
//! grows; nothing is evicted until [`ChunkCache::clear`]. Entries are boxed
//! so a chunk keeps its address when the array is rebuilt.

use tracing::debug;

/// Inclusive chunk-coordinate rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheBounds {
    pub west: i32,
    pub east: i32,
    pub north: i32,
    pub south: i32,
}

impl CacheBounds {
    pub fn point(x: i32, z: i32) -> Self {
        Self {
            west: x,
            east: x,
            north: z,
            south: z,
        }
    }

    pub fn width(&self) -> usize {
        span(self.west, self.east)
    }

    pub fn depth(&self) -> usize {
        span(self.north, self.south)
    }

    pub fn area(&self) -> usize {
        self.width().saturating_mul(self.depth())
    }

    pub fn contains(&self, x: i32, z: i32) -> bool {
        (self.west..=self.east).contains(&x) && (self.north..=self.south).contains(&z)
    }

    pub fn union(&self, other: &CacheBounds) -> Self {
        Self {
            west: self.west.min(other.west),
            east: self.east.max(other.east),
            north: self.north.min(other.north),
            south: self.south.max(other.south),
        }
    }

    /// Flat slot index of `(x, z)`, which must be inside.
    pub fn index(&self, x: i32, z: i32) -> usize {
        x.abs_diff(self.west) as usize + z.abs_diff(self.north) as usize * self.width()
    }

    /// Coordinates of flat slot `i`, the inverse of [`CacheBounds::index`].
    pub fn cell(&self, i: usize) -> (i32, i32) {
        let width = self.width();
        (
            self.west.wrapping_add_unsigned((i % width) as u32),
            self.north.wrapping_add_unsigned((i / width) as u32),
        )
    }
}

/// Cells in `lo..=hi`. Spans the whole `i32` range without overflowing.
fn span(lo: i32, hi: i32) -> usize {
    hi.abs_diff(lo) as usize + 1
}

pub struct ChunkCache<T> {
    bounds: Option<CacheBounds>,
    slots: Vec<Option<Box<T>>>,
}

impl<T> Default for ChunkCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChunkCache<T> {
    pub fn new() -> Self {
        Self {
            bounds: None,
            slots: Vec::new(),
        }
    }

    /// Current rectangle, `None` before the first insertion.
    pub fn bounds(&self) -> Option<CacheBounds> {
        self.bounds
    }

    /// Number of slots, occupied or not.
    pub fn area(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn contains(&self, x: i32, z: i32) -> bool {
        self.get(x, z).is_some()
    }

    pub fn get(&self, x: i32, z: i32) -> Option<&T> {
        let b = self.bounds?;
        if !b.contains(x, z) {
            return None;
        }
        self.slots[b.index(x, z)].as_deref()
    }

    /// Grow the rectangle to cover `target` as well and return the result.
    /// Existing entries keep their coordinates; new slots start empty.
    pub fn grow_to(&mut self, target: CacheBounds) -> CacheBounds {
        let Some(old) = self.bounds else {
            self.bounds = Some(target);
            self.slots = std::iter::repeat_with(|| None).take(target.area()).collect();
            return target;
        };
        let new = old.union(&target);
        if new == old {
            return old;
        }

        let mut slots: Vec<Option<Box<T>>> =
            std::iter::repeat_with(|| None).take(new.area()).collect();
        for (i, slot) in std::mem::take(&mut self.slots).into_iter().enumerate() {
            if slot.is_some() {
                let (x, z) = old.cell(i);
                slots[new.index(x, z)] = slot;
            }
        }
        debug!(
            "Chunk cache grew from {}x{} to {}x{}",
            old.width(),
            old.depth(),
            new.width(),
            new.depth()
        );
        self.slots = slots;
        self.bounds = Some(new);
        new
    }

    /// The entry at `(x, z)`, created with `make` if the slot is empty.
    pub fn get_or_insert_with(&mut self, x: i32, z: i32, make: impl FnOnce() -> T) -> &mut T {
        let bounds = self.grow_to(CacheBounds::point(x, z));
        self.slots[bounds.index(x, z)].get_or_insert_with(|| Box::new(make()))
    }

    /// Occupied entries with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), &T)> {
        let bounds = self.bounds;
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            let b = bounds?;
            let chunk = slot.as_deref()?;
            Some((b.cell(i), chunk))
        })
    }

    /// Drop every entry and forget the rectangle.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.bounds = None;
    }
}
