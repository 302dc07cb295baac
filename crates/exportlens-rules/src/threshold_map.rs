//! Threshold map — catalog chips on the PD (x) / TPP (y) plane.
//!
//! Only chips with both TPP and PD are plotted. Points that round to the same
//! position (TPP to the integer, PD to two decimals) form a stack and are
//! drawn once.

use crate::catalog::ChipCatalog;
use crate::classification::ClassificationEngine;
use crate::rule_history::RuleVersion;
use exportlens_models::{ControlStatus, DerivedMetrics};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Region of the datacenter threshold map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapRegion {
    A1,
    A2,
    B1,
    B2,
    NotControlled,
}

impl MapRegion {
    pub fn status(&self) -> ControlStatus {
        match self {
            MapRegion::A1 | MapRegion::A2 => ControlStatus::Controlled,
            MapRegion::B1 | MapRegion::B2 => ControlStatus::ControlledEligibleForException,
            MapRegion::NotControlled => ControlStatus::NotControlled,
        }
    }

    fn from_tier(tier: Option<&str>) -> MapRegion {
        match tier {
            Some("A1") => MapRegion::A1,
            Some("A2") => MapRegion::A2,
            Some("B1") => MapRegion::B1,
            Some("B2") => MapRegion::B2,
            _ => MapRegion::NotControlled,
        }
    }
}

/// One plotted chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub name: String,
    pub tpp: f64,
    pub pd: f64,
    pub region: MapRegion,
}

impl MapPoint {
    /// Position key used for stacking.
    pub fn stack_key(&self) -> (i64, i64) {
        stack_key(self.tpp, self.pd)
    }
}

fn stack_key(tpp: f64, pd: f64) -> (i64, i64) {
    (tpp.round() as i64, (pd * 100.0).round() as i64)
}

/// Plottable chips of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdMap {
    pub points: Vec<MapPoint>,
}

impl ThresholdMap {
    /// Region for a (TPP, PD) point under the current datacenter table.
    pub fn region(tpp: f64, pd: f64) -> MapRegion {
        let c = ClassificationEngine::classify(
            &DerivedMetrics::new(tpp, Some(pd)),
            true,
            RuleVersion::current(),
        );
        MapRegion::from_tier(c.matched_tier.as_deref())
    }

    /// Chips with both TPP and PD, in catalog order.
    pub fn from_catalog(catalog: &ChipCatalog) -> Self {
        let points = catalog
            .chips
            .iter()
            .filter_map(|chip| {
                let metrics = chip.metrics();
                let (tpp, pd) = (metrics.tpp()?, metrics.pd()?);
                Some(MapPoint {
                    name: chip.name.clone(),
                    tpp,
                    pd,
                    region: Self::region(tpp, pd),
                })
            })
            .collect();
        Self { points }
    }

    /// Coincident points grouped, groups in first-seen order.
    pub fn stacks(&self) -> Vec<Vec<&MapPoint>> {
        group_stacks(&self.points, MapPoint::stack_key)
    }

    /// Points inside the view window `[0, max_tpp] x [0, max_pd]`.
    pub fn visible(&self, max_tpp: f64, max_pd: f64) -> usize {
        self.points
            .iter()
            .filter(|p| p.tpp <= max_tpp && p.pd <= max_pd)
            .count()
    }
}

/// Group items sharing a position key, groups in first-seen order.
pub(crate) fn group_stacks<T, K, F>(items: &[T], key: F) -> Vec<Vec<&T>>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<&T>> = Vec::new();

    for item in items {
        let slot = *index.entry(key(item)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, tpp: f64, pd: f64) -> MapPoint {
        MapPoint {
            name: name.to_string(),
            tpp,
            pd,
            region: ThresholdMap::region(tpp, pd),
        }
    }

    #[test]
    fn test_regions() {
        assert_eq!(ThresholdMap::region(5000.0, 1.0), MapRegion::A1);
        assert_eq!(ThresholdMap::region(2000.0, 6.0), MapRegion::A2);
        assert_eq!(ThresholdMap::region(3000.0, 2.0), MapRegion::B1);
        assert_eq!(ThresholdMap::region(2000.0, 4.0), MapRegion::B2);
        assert_eq!(ThresholdMap::region(1000.0, 4.0), MapRegion::NotControlled);
        assert_eq!(MapRegion::B2.status(), ControlStatus::ControlledEligibleForException);
    }

    #[test]
    fn test_stacking_rounds_position() {
        let map = ThresholdMap {
            points: vec![
                point("a", 4992.0, 6.0),
                point("b", 15832.0, 19.45),
                point("c", 4992.2, 6.001),
                point("d", 15831.0, 19.4),
            ],
        };
        let stacks = map.stacks();
        assert_eq!(stacks.len(), 3);
        let names: Vec<&str> = stacks[0].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(stacks[1].len(), 1);
    }

    #[test]
    fn test_visible_window() {
        let map = ThresholdMap {
            points: vec![point("a", 4992.0, 6.0), point("b", 36000.0, 22.3)],
        };
        assert_eq!(map.visible(6000.0, 10.0), 1);
        assert_eq!(map.visible(110_000.0, 70.0), 2);
    }
}
