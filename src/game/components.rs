//! Game Components
//!
//! Small value types shared by entity records. Both are normalized fractions so
//! the HUD can draw them directly as bars.

use serde::{Deserialize, Serialize};

// =============================================================================
// Health
// =============================================================================

/// Player health, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health(f32);

impl Health {
    pub fn new(value: f32) -> Self {
        Self(clamp_unit(value))
    }

    pub fn full() -> Self {
        Self(1.0)
    }

    /// Apply damage. Returns true if this hit depleted the health.
    pub fn damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_depleted();
        self.0 = clamp_unit(self.0 - amount.max(0.0));
        was_alive && self.is_depleted()
    }

    pub fn heal(&mut self, amount: f32) {
        self.0 = clamp_unit(self.0 + amount.max(0.0));
    }

    pub fn is_depleted(&self) -> bool {
        self.0 <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        self.0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::full()
    }
}

// =============================================================================
// Extinguisher charge
// =============================================================================

/// Remaining retardant in an extinguisher, within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charge(f32);

impl Charge {
    pub fn new(value: f32) -> Self {
        Self(clamp_unit(value))
    }

    pub fn full() -> Self {
        Self(1.0)
    }

    /// Drain some charge. Returns the amount actually removed.
    pub fn drain(&mut self, amount: f32) -> f32 {
        let before = self.0;
        self.0 = clamp_unit(self.0 - amount.max(0.0));
        before - self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        self.0
    }
}

impl Default for Charge {
    fn default() -> Self {
        Self::full()
    }
}

/// Clamp to [0, 1], mapping NaN to 0
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_stays_in_unit_range() {
        let mut h = Health::full();
        assert!(!h.damage(0.4));
        assert!((h.fraction() - 0.6).abs() < 1e-6);
        h.heal(5.0);
        assert_eq!(h.fraction(), 1.0);
        assert!(h.damage(3.0));
        assert_eq!(h.fraction(), 0.0);
        // Already depleted: further damage does not report a second death
        assert!(!h.damage(1.0));
        assert_eq!(Health::new(-2.0).fraction(), 0.0);
        assert_eq!(Health::new(f32::NAN).fraction(), 0.0);
    }

    #[test]
    fn test_negative_damage_does_not_heal() {
        let mut h = Health::new(0.5);
        h.damage(-1.0);
        assert_eq!(h.fraction(), 0.5);
    }

    #[test]
    fn test_charge_drain_reports_removed_amount() {
        let mut c = Charge::new(0.25);
        assert!((c.drain(0.1) - 0.1).abs() < 1e-6);
        assert!((c.drain(1.0) - 0.15).abs() < 1e-6);
        assert!(c.is_empty());
        assert_eq!(c.drain(1.0), 0.0);
    }
}
