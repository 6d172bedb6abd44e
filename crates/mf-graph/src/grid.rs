//! Carriers and per-grid physical parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy carrier of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    Electricity,
    Gas,
    Water,
}

impl Carrier {
    pub const ALL: [Carrier; 3] = [Carrier::Electricity, Carrier::Gas, Carrier::Water];
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Carrier::Electricity => write!(f, "electricity"),
            Carrier::Gas => write!(f, "gas"),
            Carrier::Water => write!(f, "water"),
        }
    }
}

/// Electrical grid parameters.
#[derive(Clone, Debug)]
pub struct PowerGridParams {
    /// Base apparent power for the per-unit system (MVA).
    pub sn_mva: f64,
}

impl Default for PowerGridParams {
    fn default() -> Self {
        Self { sn_mva: 1.0 }
    }
}

/// Gas grid parameters. Junction pressures are per-unit against
/// `pressure_ref_pa`.
#[derive(Clone, Debug)]
pub struct GasGridParams {
    pub compressibility: f64,
    pub molar_mass_kg_per_mol: f64,
    pub temperature_k: f64,
    pub dynamic_visc_pa_s: f64,
    pub pressure_ref_pa: f64,
    pub higher_heating_value_kwh_per_kg: f64,
}

impl Default for GasGridParams {
    fn default() -> Self {
        // Methane-like defaults.
        Self {
            compressibility: 1.0,
            molar_mass_kg_per_mol: 0.016,
            temperature_k: 300.0,
            dynamic_visc_pa_s: 1.1e-5,
            pressure_ref_pa: 1_000_000.0,
            higher_heating_value_kwh_per_kg: 15.4,
        }
    }
}

/// District heating (water) grid parameters. Junction pressures are
/// per-unit against `pressure_ref_pa`.
#[derive(Clone, Debug)]
pub struct WaterGridParams {
    pub density_kg_per_m3: f64,
    pub dynamic_visc_pa_s: f64,
    pub pressure_ref_pa: f64,
}

impl Default for WaterGridParams {
    fn default() -> Self {
        Self {
            density_kg_per_m3: 998.0,
            dynamic_visc_pa_s: 1.0e-3,
            pressure_ref_pa: 1_000_000.0,
        }
    }
}

#[derive(Clone, Debug)]
pub enum GridKind {
    Power(PowerGridParams),
    Gas(GasGridParams),
    Water(WaterGridParams),
}

/// A carrier parameter set; every single-carrier node and branch belongs to
/// exactly one grid.
#[derive(Clone, Debug)]
pub struct Grid {
    pub name: String,
    pub kind: GridKind,
}

impl Grid {
    pub fn power(name: impl Into<String>, params: PowerGridParams) -> Self {
        Self {
            name: name.into(),
            kind: GridKind::Power(params),
        }
    }

    pub fn gas(name: impl Into<String>, params: GasGridParams) -> Self {
        Self {
            name: name.into(),
            kind: GridKind::Gas(params),
        }
    }

    pub fn water(name: impl Into<String>, params: WaterGridParams) -> Self {
        Self {
            name: name.into(),
            kind: GridKind::Water(params),
        }
    }

    pub fn carrier(&self) -> Carrier {
        match &self.kind {
            GridKind::Power(_) => Carrier::Electricity,
            GridKind::Gas(_) => Carrier::Gas,
            GridKind::Water(_) => Carrier::Water,
        }
    }

    pub fn as_power(&self) -> Option<&PowerGridParams> {
        match &self.kind {
            GridKind::Power(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_gas(&self) -> Option<&GasGridParams> {
        match &self.kind {
            GridKind::Gas(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_water(&self) -> Option<&WaterGridParams> {
        match &self.kind {
            GridKind::Water(p) => Some(p),
            _ => None,
        }
    }

    /// Reference pressure for hydraulic carriers, None for electricity.
    pub fn pressure_ref_pa(&self) -> Option<f64> {
        match &self.kind {
            GridKind::Power(_) => None,
            GridKind::Gas(p) => Some(p.pressure_ref_pa),
            GridKind::Water(p) => Some(p.pressure_ref_pa),
        }
    }
}
