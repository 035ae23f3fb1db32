//! Memoized sine/cosine tables for blob outlines
//!
//! Outline samples sit at fixed angles, so only the time-varying noise has to
//! be evaluated per frame.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Angles and their sines/cosines for `n` evenly spaced samples
#[derive(Debug, Clone, PartialEq)]
pub struct TrigTables {
    pub angles: Vec<f32>,
    pub sin: Vec<f32>,
    pub cos: Vec<f32>,
}

impl TrigTables {
    /// Compute tables for `points` samples; index `i` maps to `2π·i/points`
    pub fn compute(points: usize) -> Self {
        let mut angles = Vec::with_capacity(points);
        let mut sin = Vec::with_capacity(points);
        let mut cos = Vec::with_capacity(points);
        for i in 0..points {
            let angle = TAU * i as f32 / points as f32;
            angles.push(angle);
            sin.push(angle.sin());
            cos.push(angle.cos());
        }
        Self { angles, sin, cos }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }
}

/// Per-engine table cache. Entries are immutable and never evicted.
#[derive(Debug, Default)]
pub struct TrigCache {
    tables: HashMap<usize, Arc<TrigTables>>,
}

impl TrigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables for `points` samples, computed on first use
    pub fn tables(&mut self, points: usize) -> Arc<TrigTables> {
        self.tables
            .entry(points)
            .or_insert_with(|| {
                log::debug!("Computing trig tables for {} points", points);
                Arc::new(TrigTables::compute(points))
            })
            .clone()
    }

    /// Number of resolutions cached so far
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_object_per_point_count() {
        let mut cache = TrigCache::new();
        let a = cache.tables(64);
        let b = cache.tables(64);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.tables(128);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_quarter_turn_entries() {
        let tables = TrigTables::compute(4);
        assert_eq!(tables.len(), 4);
        assert!((tables.cos[0] - 1.0).abs() < 1e-6);
        assert!((tables.sin[1] - 1.0).abs() < 1e-6);
        assert!((tables.cos[2] + 1.0).abs() < 1e-6);
        assert!((tables.sin[3] + 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_tables_are_unit_and_repeatable(points in 1usize..512) {
            let mut cache = TrigCache::new();
            let first = cache.tables(points);
            let second = cache.tables(points);
            prop_assert_eq!(first.len(), points);
            prop_assert_eq!(&*first, &*second);
            for i in 0..points {
                let norm = first.sin[i] * first.sin[i] + first.cos[i] * first.cos[i];
                prop_assert!((norm - 1.0).abs() < 1e-5);
                let expected = TAU * i as f32 / points as f32;
                prop_assert!((first.angles[i] - expected).abs() < 1e-6);
            }
        }
    }
}
