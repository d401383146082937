//! Severity-weighted grid of accident locations.
//!
//! Each accident is snapped to the square cell of `cell_size` degrees that
//! contains it, and the cell accumulates the accident's severity weight
//! (slight 1, serious 2, fatal 3). Lookups answer "how dangerous is the
//! area around this point", which is what a cycle route planner charges
//! for passing through it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::accidents::FilteredAccident;
use crate::geo::haversine_km;

/// Default cell edge in degrees, roughly 550 m of latitude in London.
pub const DEFAULT_CELL_SIZE: f64 = 0.005;

/// Grid coordinates of a cell: `floor(lat / size)`, `floor(lon / size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: i64,
    pub col: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellWeight {
    pub weight: u32,
    pub accidents: usize,
}

/// Result of [`WeightIndex::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestCell {
    pub key: CellKey,
    pub cell: CellWeight,
    pub distance_km: f64,
}

#[derive(Debug, Clone)]
pub struct WeightIndex {
    cell_size: f64,
    cells: HashMap<CellKey, CellWeight>,
}

impl WeightIndex {
    /// # Panics
    ///
    /// Panics if `cell_size` is not a positive finite number.
    pub fn from_accidents(accidents: &[FilteredAccident], cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell size must be positive"
        );

        let mut index = WeightIndex {
            cell_size,
            cells: HashMap::new(),
        };
        for accident in accidents {
            let key = index.key_for(accident.latitude, accident.longitude);
            let cell = index.cells.entry(key).or_default();
            cell.weight += accident.severity_class().weight();
            cell.accidents += 1;
        }
        index
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.cells.values().map(|c| u64::from(c.weight)).sum()
    }

    pub fn key_for(&self, lat: f64, lon: f64) -> CellKey {
        CellKey {
            row: (lat / self.cell_size).floor() as i64,
            col: (lon / self.cell_size).floor() as i64,
        }
    }

    /// `(lat, lon)` of the centre of `key`.
    pub fn centre(&self, key: CellKey) -> (f64, f64) {
        (
            (key.row as f64 + 0.5) * self.cell_size,
            (key.col as f64 + 0.5) * self.cell_size,
        )
    }

    /// Summed weight of the cell containing the point, 0 when no accident
    /// fell there.
    pub fn weight_at(&self, lat: f64, lon: f64) -> u32 {
        self.cells
            .get(&self.key_for(lat, lon))
            .map_or(0, |cell| cell.weight)
    }

    /// The occupied cell whose centre is closest to the point, measured in
    /// degrees, provided it lies within `max_distance` degrees.
    pub fn nearest(&self, lat: f64, lon: f64, max_distance: f64) -> Option<NearestCell> {
        let origin = self.key_for(lat, lon);
        let reach = ((max_distance / self.cell_size).ceil() as i64).saturating_add(1);
        let side = reach.saturating_mul(2).saturating_add(1);

        // Full scan once the search window outnumbers the occupied cells.
        let candidates: Vec<(CellKey, CellWeight)> = if side.saturating_mul(side) as usize
            > self.cells.len()
        {
            self.cells.iter().map(|(k, c)| (*k, *c)).collect()
        } else {
            (-reach..=reach)
                .flat_map(|dr| (-reach..=reach).map(move |dc| (dr, dc)))
                .filter_map(|(dr, dc)| {
                    let key = CellKey {
                        row: origin.row.checked_add(dr)?,
                        col: origin.col.checked_add(dc)?,
                    };
                    self.cells.get(&key).map(|c| (key, *c))
                })
                .collect()
        };

        candidates
            .into_iter()
            .map(|(key, cell)| {
                let (c_lat, c_lon) = self.centre(key);
                let degrees = ((c_lat - lat).powi(2) + (c_lon - lon).powi(2)).sqrt();
                (degrees, key, cell)
            })
            .filter(|(degrees, _, _)| *degrees <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, key, cell)| NearestCell {
                key,
                cell,
                distance_km: haversine_km((lat, lon), self.centre(key)),
            })
    }

    /// The `n` heaviest cells, heaviest first; equal weights are ordered by
    /// cell key.
    pub fn hottest(&self, n: usize) -> Vec<(CellKey, CellWeight)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(k, c)| (*k, *c)).collect();
        cells.sort_by(|a, b| b.1.weight.cmp(&a.1.weight).then(a.0.cmp(&b.0)));
        cells.truncate(n);
        cells
    }

    pub fn report(&self) -> WeightReport {
        let cells = self
            .hottest(self.cells.len())
            .into_iter()
            .map(|(key, cell)| {
                let (lat, lon) = self.centre(key);
                CellSummary {
                    lat,
                    lon,
                    weight: cell.weight,
                    accidents: cell.accidents,
                }
            })
            .collect();

        WeightReport {
            generated_at: Utc::now(),
            cell_size: self.cell_size,
            total_weight: self.total_weight(),
            cells,
        }
    }

    /// Logs the `n` heaviest cells.
    pub fn log_hottest(&self, n: usize) {
        for (rank, (key, cell)) in self.hottest(n).into_iter().enumerate() {
            let (lat, lon) = self.centre(key);
            info!(
                rank = rank + 1,
                lat,
                lon,
                weight = cell.weight,
                accidents = cell.accidents,
                "Accident hotspot"
            );
        }
    }
}

/// One cell in `weights.json`.
#[derive(Debug, Clone, Serialize)]
pub struct CellSummary {
    pub lat: f64,
    pub lon: f64,
    pub weight: u32,
    pub accidents: usize,
}

/// Contents of `weights.json`, cells sorted heaviest first.
#[derive(Debug, Clone, Serialize)]
pub struct WeightReport {
    pub generated_at: DateTime<Utc>,
    pub cell_size: f64,
    pub total_weight: u64,
    pub cells: Vec<CellSummary>,
}
