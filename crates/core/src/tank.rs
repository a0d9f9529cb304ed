//! Ballast tank data model.
//!
//! A [`Tank`] is an adjustable weight compartment with a fixed position and a
//! fill level expressed in percent of capacity. A [`TankSet`] is an ordered
//! collection of tanks with aggregate read-outs (total weight, center of
//! gravity) derived on demand from the current fill state.
//!
//! The fill level is the only quantity a solver mutates; positions and
//! capacities are fixed at construction. Frozen tanks keep their level across
//! a solve.

use crate::error::{Error, Result};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fill level of an empty tank, in percent.
pub const EMPTY_LEVEL: f64 = 0.0;

/// Fill level of a full tank, in percent.
pub const FULL_LEVEL: f64 = 100.0;

/// An adjustable ballast tank.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tank {
    id: String,
    capacity: f64,
    position: Point3<f64>,
    level: f64,
    frozen: bool,
}

impl Tank {
    /// Creates a new, empty, unfrozen tank.
    pub fn new(id: impl Into<String>, capacity: f64, position: Point3<f64>) -> Self {
        Self {
            id: id.into(),
            capacity,
            position,
            level: EMPTY_LEVEL,
            frozen: false,
        }
    }

    /// Sets the initial fill level (percent of capacity).
    pub fn with_level(mut self, level: f64) -> Self {
        self.set_level(level);
        self
    }

    /// Marks the tank as frozen or free.
    pub fn with_frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    /// Tank identifier, used in diagnostics.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Maximum fillable weight.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Fixed position of the tank.
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Current fill level in percent, within `[0, 100]`.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Sets the fill level, clamped to `[0, 100]`.
    pub fn set_level(&mut self, level: f64) {
        self.level = level.clamp(EMPTY_LEVEL, FULL_LEVEL);
    }

    /// Whether the tank is excluded from solver mutation.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Excludes the tank from solver mutation.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Makes the tank adjustable again.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Current ballast weight: `capacity * level / 100`.
    pub fn weight(&self) -> f64 {
        self.capacity * self.level / FULL_LEVEL
    }

    /// True if the fill level is exactly 0.
    pub fn is_empty(&self) -> bool {
        self.level == EMPTY_LEVEL
    }

    /// True if the fill level is exactly 100.
    pub fn is_full(&self) -> bool {
        self.level == FULL_LEVEL
    }

    /// True if the fill level is strictly between 0 and 100.
    pub fn is_partial(&self) -> bool {
        self.level > EMPTY_LEVEL && self.level < FULL_LEVEL
    }

    /// Validates the construction invariants.
    pub fn validate(&self) -> Result<()> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(self.invalid(format!("capacity must be positive, got {}", self.capacity)));
        }
        if !self.level.is_finite() || !(EMPTY_LEVEL..=FULL_LEVEL).contains(&self.level) {
            return Err(self.invalid(format!(
                "fill level must be within [0, 100], got {}",
                self.level
            )));
        }
        if !(self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.position.z.is_finite())
        {
            return Err(self.invalid("position must be finite".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidTank {
            id: self.id.clone(),
            reason,
        }
    }
}

/// An ordered collection of ballast tanks.
///
/// Order is stable and determines iteration order everywhere a solver walks
/// the set; it carries no other meaning.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TankSet {
    tanks: Vec<Tank>,
}

impl TankSet {
    /// Creates an empty tank set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tank to the end of the set.
    pub fn push(&mut self, tank: Tank) {
        self.tanks.push(tank);
    }

    /// Number of tanks in the set.
    pub fn len(&self) -> usize {
        self.tanks.len()
    }

    /// True if the set contains no tanks.
    pub fn is_empty(&self) -> bool {
        self.tanks.is_empty()
    }

    /// Tank at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Tank> {
        self.tanks.get(index)
    }

    /// Mutable tank at `index`, if present.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tank> {
        self.tanks.get_mut(index)
    }

    /// Iterates over the tanks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tank> {
        self.tanks.iter()
    }

    /// Iterates mutably over the tanks in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Tank> {
        self.tanks.iter_mut()
    }

    /// Combined capacity of all tanks.
    pub fn total_capacity(&self) -> f64 {
        self.tanks.iter().map(Tank::capacity).sum()
    }

    /// Combined ballast weight at the current fill state.
    pub fn total_weight(&self) -> f64 {
        self.tanks.iter().map(Tank::weight).sum()
    }

    /// Weight-averaged position of the ballast.
    ///
    /// A set with zero total weight has no defined center of gravity; the
    /// origin is returned in that case.
    pub fn center_of_gravity(&self) -> Point3<f64> {
        let total = self.total_weight();
        if total == 0.0 {
            return Point3::origin();
        }
        let mut sum: Point3<f64> = Point3::origin();
        for tank in &self.tanks {
            let w = tank.weight();
            sum.x += w * tank.position.x;
            sum.y += w * tank.position.y;
            sum.z += w * tank.position.z;
        }
        Point3::new(sum.x / total, sum.y / total, sum.z / total)
    }

    /// Indices of all unfrozen tanks, in set order.
    pub fn free_indices(&self) -> Vec<usize> {
        self.tanks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_frozen())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of all unfrozen, partially filled tanks, in set order.
    pub fn partial_indices(&self) -> Vec<usize> {
        self.tanks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_frozen() && t.is_partial())
            .map(|(i, _)| i)
            .collect()
    }

    /// Snapshot of every tank's fill level, in set order.
    pub fn levels(&self) -> Vec<f64> {
        self.tanks.iter().map(Tank::level).collect()
    }

    /// Restores fill levels from a snapshot taken with [`TankSet::levels`].
    ///
    /// # Panics
    ///
    /// Panics if the snapshot length does not match the set size.
    pub fn restore_levels(&mut self, levels: &[f64]) {
        assert_eq!(
            levels.len(),
            self.tanks.len(),
            "level snapshot does not match tank set size"
        );
        for (tank, &level) in self.tanks.iter_mut().zip(levels) {
            tank.level = level;
        }
    }

    /// Validates every tank in the set.
    pub fn validate(&self) -> Result<()> {
        for tank in &self.tanks {
            tank.validate()?;
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for TankSet {
    type Output = Tank;

    fn index(&self, index: usize) -> &Tank {
        &self.tanks[index]
    }
}

impl std::ops::IndexMut<usize> for TankSet {
    fn index_mut(&mut self, index: usize) -> &mut Tank {
        &mut self.tanks[index]
    }
}

impl FromIterator<Tank> for TankSet {
    fn from_iter<I: IntoIterator<Item = Tank>>(iter: I) -> Self {
        Self {
            tanks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TankSet {
    type Item = &'a Tank;
    type IntoIter = std::slice::Iter<'a, Tank>;

    fn into_iter(self) -> Self::IntoIter {
        self.tanks.iter()
    }
}
