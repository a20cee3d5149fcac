//! Bounded FIFO collections for user-spawned objects and lights
//!
//! The capacity is part of the type, so a pool can never hold more than `N`
//! entries. Pushing into a full pool evicts the oldest entry first; there is no
//! other removal path besides [`FifoPool::clear`].

use std::collections::{vec_deque, VecDeque};

use cgmath::Vector3;

/// Maximum number of spawned cubes kept alive at once
pub const MAX_OBJECTS: usize = 12;

/// Maximum number of point lights; also the WGSL `array<PointLight, N>` length
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone)]
pub struct FifoPool<T, const N: usize> {
    entries: VecDeque<T>,
}

impl<T, const N: usize> FifoPool<T, N> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(N),
        }
    }

    /// Appends an entry, returning the evicted oldest entry if the pool was full
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() == N {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Entries in insertion order, oldest first
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn newest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T, const N: usize> Default for FifoPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a FifoPool<T, N> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A cube placed by clicking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedObject {
    pub position: Vector3<f32>,
}

/// A point light placed by clicking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    /// Linear RGB in `[0, 1]`
    pub color: Vector3<f32>,
}

pub type ObjectPool = FifoPool<SpawnedObject, MAX_OBJECTS>;
pub type LightPool = FifoPool<PointLight, MAX_POINT_LIGHTS>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut pool: FifoPool<u32, 3> = FifoPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.push(1), None);
        assert_eq!(pool.push(2), None);
        assert_eq!(pool.push(3), None);
        assert!(pool.is_full());
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut pool = ObjectPool::new();
        for i in 0..=MAX_OBJECTS {
            pool.push(SpawnedObject {
                position: Vector3::new(i as f32, 0.0, 0.0),
            });
        }

        assert_eq!(pool.len(), MAX_OBJECTS);
        let xs: Vec<f32> = pool.iter().map(|o| o.position.x).collect();
        let expected: Vec<f32> = (1..=MAX_OBJECTS).map(|i| i as f32).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn test_light_pool_eviction_returns_entry() {
        let mut pool = LightPool::new();
        let light = |x: f32| PointLight {
            position: Vector3::new(x, 1.0, 0.0),
            color: Vector3::new(1.0, 1.0, 1.0),
        };

        for i in 0..MAX_POINT_LIGHTS {
            assert!(pool.push(light(i as f32)).is_none());
        }
        let evicted = pool.push(light(99.0));
        assert_eq!(evicted, Some(light(0.0)));
        assert_eq!(pool.newest(), Some(&light(99.0)));
        assert_eq!(pool.get(0), Some(&light(1.0)));
        assert_eq!(pool.capacity(), 4);
    }
}
