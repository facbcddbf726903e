use serde::{Deserialize, Serialize};

use crate::model::geometry::SNAP_TOLERANCE;

/// Network-wide operating point of the heating network
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParameters {
    pub supply_temp_c: f64,
    pub return_temp_c: f64,
    pub supply_pressure_bar: f64,
}

impl Default for NetworkParameters {
    fn default() -> Self {
        Self {
            supply_temp_c: 70.0,
            return_temp_c: 40.0,
            supply_pressure_bar: 5.0,
        }
    }
}

/// Domain constants used while assembling a topology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Pressure drop of the return main relative to supply
    pub return_pressure_drop_bar: f64,
    /// Lower bound for the return main pressure
    pub min_return_pressure_bar: f64,
    /// Full-load hours used to turn a design load into annual demand
    pub hours_per_year: f64,
    /// Distance under which a point is snapped onto an existing node
    pub snap_tolerance: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            return_pressure_drop_bar: 0.3,
            min_return_pressure_bar: 1.0,
            hours_per_year: 8760.0,
            snap_tolerance: SNAP_TOLERANCE,
        }
    }
}

impl TopologyConfig {
    pub fn return_pressure_bar(&self, supply_pressure_bar: f64) -> f64 {
        (supply_pressure_bar - self.return_pressure_drop_bar).max(self.min_return_pressure_bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_pressure_is_clamped() {
        let config = TopologyConfig::default();
        assert!((config.return_pressure_bar(5.0) - 4.7).abs() < 1e-12);
        assert!((config.return_pressure_bar(1.1) - 1.0).abs() < 1e-12);
    }
}
