//! Panel containers — raw observations and the joined raw ∪ derived view.
//!
//! All entities share one date axis (the sorted union of their dates).
//! A (date, entity) cell with no observation holds a void row (all NaN),
//! so downstream operators see gaps as NaN rather than as shifted indices.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::features::FeatureFrame;

use super::observation::Observation;

/// Raw observations for many entities, aligned to a common date axis.
#[derive(Debug, Clone, Default)]
pub struct RawPanel {
    dates: Vec<NaiveDate>,
    rows: BTreeMap<String, Vec<Observation>>,
}

impl RawPanel {
    /// Build a panel from unaligned rows.
    ///
    /// The date axis is the sorted union of all row dates. Every entity gets
    /// one slot per axis date; dates the entity did not trade are void rows.
    /// Duplicate (date, entity) pairs must be rejected upstream (the loader
    /// enforces uniqueness); here the last row wins.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        let mut all_dates = BTreeSet::new();
        for row in &rows {
            all_dates.insert(row.date);
        }
        let dates: Vec<NaiveDate> = all_dates.into_iter().collect();
        let index: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut by_entity: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for row in rows {
            let entity = row.entity.clone();
            let slots = by_entity
                .entry(entity.clone())
                .or_insert_with(|| dates.iter().map(|d| Observation::void(&entity, *d)).collect());
            let slot = index[&row.date];
            slots[slot] = row;
        }

        Self {
            dates,
            rows: by_entity,
        }
    }

    /// The common date axis, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Entity identifiers, sorted.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn n_entities(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.rows.is_empty()
    }

    /// One entity's observations, aligned to the date axis.
    pub fn entity_rows(&self, entity: &str) -> Option<&[Observation]> {
        self.rows.get(entity).map(Vec::as_slice)
    }

    /// One numeric raw field for an entity, aligned to the date axis.
    pub fn raw_column(&self, entity: &str, field: &str) -> Option<Vec<f64>> {
        let rows = self.rows.get(entity)?;
        let extract: fn(&Observation) -> f64 = match field {
            "open" => |o| o.open,
            "high" => |o| o.high,
            "low" => |o| o.low,
            "close" => |o| o.close,
            "volume" => |o| o.volume,
            "amount" => |o| o.amount,
            _ => return None,
        };
        Some(rows.iter().map(extract).collect())
    }

    /// Restrict the panel to an entity subset and/or a date range (inclusive).
    ///
    /// Entities requested but absent from the panel are simply not present in
    /// the result; the join step later NaN-fills entities with incomplete
    /// coverage rather than dropping them.
    pub fn restrict(
        &self,
        entities: Option<&[String]>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> RawPanel {
        let lo = match start {
            Some(s) => self.dates.partition_point(|d| *d < s),
            None => 0,
        };
        let hi = match end {
            Some(e) => self.dates.partition_point(|d| *d <= e),
            None => self.dates.len(),
        };
        let dates = self.dates[lo..hi].to_vec();

        let keep = |name: &str| match entities {
            Some(subset) => subset.iter().any(|e| e.as_str() == name),
            None => true,
        };

        let rows = self
            .rows
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, obs)| (name.clone(), obs[lo..hi].to_vec()))
            .collect();

        RawPanel { dates, rows }
    }
}

// ─── Joined panel ────────────────────────────────────────────────────

/// Raw ∪ derived columns per entity, on the shared date axis.
///
/// This is the input contract of a factor unit: column access by field name
/// (`"close"`, `"returns"`, `"adv20"`, …). An entity whose feature frame is
/// missing or misaligned keeps NaN-filled derived columns — incomplete
/// coverage never drops an entity from the join.
#[derive(Debug, Clone)]
pub struct JoinedPanel {
    dates: Vec<NaiveDate>,
    entities: Vec<String>,
    /// field → entity → values (axis-aligned).
    columns: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

const RAW_FIELDS: [&str; 6] = ["open", "high", "low", "close", "volume", "amount"];

impl JoinedPanel {
    /// Join raw observations with derived features on the date axis.
    pub fn build(panel: &RawPanel, features: &FeatureFrame) -> Self {
        let dates = panel.dates().to_vec();
        let n = dates.len();
        let entities: Vec<String> = panel.entities().map(str::to_string).collect();

        let mut columns: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();

        for field in RAW_FIELDS {
            let per_entity: BTreeMap<String, Vec<f64>> = entities
                .iter()
                .map(|e| {
                    let col = panel.raw_column(e, field).unwrap_or_else(|| vec![f64::NAN; n]);
                    (e.clone(), col)
                })
                .collect();
            columns.insert(field.to_string(), per_entity);
        }

        // Derived field names come from the union of per-entity frames so
        // every entity carries every derived column, NaN-filled when absent.
        let mut derived_fields = BTreeSet::new();
        for frame in features.values() {
            derived_fields.insert("returns".to_string());
            derived_fields.insert("vwap".to_string());
            for w in frame.adv.keys() {
                derived_fields.insert(format!("adv{w}"));
            }
        }

        for field in derived_fields {
            let per_entity: BTreeMap<String, Vec<f64>> = entities
                .iter()
                .map(|e| {
                    let col = features
                        .get(e)
                        .and_then(|frame| frame.column(&field))
                        .filter(|col| col.len() == n)
                        .map(<[f64]>::to_vec)
                        .unwrap_or_else(|| vec![f64::NAN; n]);
                    (e.clone(), col)
                })
                .collect();
            columns.insert(field, per_entity);
        }

        Self {
            dates,
            entities,
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    /// Available field names, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// One field's series for one entity, aligned to the date axis.
    pub fn column(&self, field: &str, entity: &str) -> Option<&[f64]> {
        self.columns
            .get(field)
            .and_then(|per_entity| per_entity.get(entity))
            .map(Vec::as_slice)
    }
}
