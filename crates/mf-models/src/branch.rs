//! Branch models.

use mf_core::{Attr, VarSpec, impl_var_set};
use mf_graph::{BranchModel, model_common};

/// AC line. Per-length impedance is converted into per-unit series
/// admittance by the formulation using the from-bus base voltage and the
/// grid base power.
#[derive(Clone, Debug)]
pub struct PowerLine {
    pub length_m: f64,
    pub r_ohm_per_m: f64,
    pub x_ohm_per_m: f64,
    pub parallel: f64,
    pub p_from_mw: Attr,
    pub q_from_mvar: Attr,
    pub p_to_mw: Attr,
    pub q_to_mvar: Attr,
    pub on_off: Attr,
}

impl PowerLine {
    pub fn new(length_m: f64, r_ohm_per_m: f64, x_ohm_per_m: f64, parallel: f64) -> Self {
        Self {
            length_m,
            r_ohm_per_m,
            x_ohm_per_m,
            parallel,
            p_from_mw: Attr::var(0.0),
            q_from_mvar: Attr::var(0.0),
            p_to_mw: Attr::var(0.0),
            q_to_mvar: Attr::var(0.0),
            on_off: Attr::con(1.0),
        }
    }

    /// Makes the switching state a solver decision (used with islanding).
    pub fn switchable(mut self) -> Self {
        self.on_off = Attr::Var(VarSpec::binary(1.0));
        self
    }
}

impl_var_set!(PowerLine {
    p_from_mw,
    q_from_mvar,
    p_to_mw,
    q_to_mvar,
    on_off
});
model_common!(PowerLine);

impl BranchModel for PowerLine {
    fn clone_branch(&self) -> Box<dyn BranchModel> {
        Box::new(self.clone())
    }
}

/// Gas pipe solved with a Weymouth-type pressure-flow relation.
#[derive(Clone, Debug)]
pub struct GasPipe {
    pub diameter_m: f64,
    pub length_m: f64,
    pub roughness_m: f64,
    pub mass_flow: Attr,
    pub on_off: Attr,
}

impl GasPipe {
    pub fn new(diameter_m: f64, length_m: f64) -> Self {
        Self {
            diameter_m,
            length_m,
            roughness_m: 1.0e-3,
            mass_flow: Attr::var(0.1),
            on_off: Attr::con(1.0),
        }
    }

    pub fn with_roughness(mut self, roughness_m: f64) -> Self {
        self.roughness_m = roughness_m;
        self
    }
}

impl_var_set!(GasPipe { mass_flow, on_off });
model_common!(GasPipe);

impl BranchModel for GasPipe {
    fn clone_branch(&self) -> Box<dyn BranchModel> {
        Box::new(self.clone())
    }
}

/// Insulated water pipe: Darcy-Weisbach hydraulics plus heat loss to the
/// environment and temperature transport.
#[derive(Clone, Debug)]
pub struct WaterPipe {
    pub diameter_m: f64,
    pub length_m: f64,
    pub roughness_m: f64,
    pub insulation_w_per_mk: f64,
    pub insulation_thickness_m: f64,
    pub ext_t_k: f64,
    pub mass_flow: Attr,
    pub reynolds: Attr,
    pub q_w: Attr,
    pub t_average_k: Attr,
    pub t_from_k: Attr,
    pub t_to_k: Attr,
    pub on_off: Attr,
}

impl WaterPipe {
    pub fn new(diameter_m: f64, length_m: f64) -> Self {
        Self {
            diameter_m,
            length_m,
            roughness_m: 1.0e-3,
            insulation_w_per_mk: 0.035,
            insulation_thickness_m: 0.035,
            ext_t_k: 293.0,
            mass_flow: Attr::var(0.1),
            reynolds: Attr::var(100.0),
            q_w: Attr::var(0.0),
            t_average_k: Attr::var(350.0),
            t_from_k: Attr::var(350.0),
            t_to_k: Attr::var(350.0),
            on_off: Attr::con(1.0),
        }
    }
}

impl_var_set!(WaterPipe {
    mass_flow,
    reynolds,
    q_w,
    t_average_k,
    t_from_k,
    t_to_k,
    on_off
});
model_common!(WaterPipe);

impl BranchModel for WaterPipe {
    fn clone_branch(&self) -> Box<dyn BranchModel> {
        Box::new(self.clone())
    }
}

/// Heat exchanger branch: moves `q_w` watts between its endpoints without a
/// pressure drop. Positive `q_w` withdraws heat (a load), negative injects.
#[derive(Clone, Debug)]
pub struct HeatExchanger {
    pub q_w: Attr,
    pub mass_flow: Attr,
    pub t_from_k: Attr,
    pub t_to_k: Attr,
    pub on_off: Attr,
}

impl HeatExchanger {
    fn with_q(q_w: Attr) -> Self {
        Self {
            q_w,
            mass_flow: Attr::var(0.1),
            t_from_k: Attr::var(350.0),
            t_to_k: Attr::var(350.0),
            on_off: Attr::con(1.0),
        }
    }

    /// Fixed heat withdrawal (consumer).
    pub fn load(q_w: f64) -> Self {
        Self::with_q(Attr::con(q_w))
    }

    /// Fixed heat injection (producer).
    pub fn generator(q_w: f64) -> Self {
        Self::with_q(Attr::con(-q_w))
    }

    /// Free heat flow, coupled by a compound formulation.
    pub fn coupling() -> Self {
        Self::with_q(Attr::var(0.0))
    }
}

impl_var_set!(HeatExchanger {
    q_w,
    mass_flow,
    t_from_k,
    t_to_k,
    on_off
});
model_common!(HeatExchanger);

impl BranchModel for HeatExchanger {
    fn clone_branch(&self) -> Box<dyn BranchModel> {
        Box::new(self.clone())
    }
}

/// Direct cross-carrier link: lossless antisymmetric power transfer plus a
/// shared mass flow. Implements the multi-carrier branch contract, so it
/// never appears in per-carrier connectivity analysis.
#[derive(Clone, Debug)]
pub struct TransferBranch {
    pub p_from_mw: Attr,
    pub q_from_mvar: Attr,
    pub p_to_mw: Attr,
    pub q_to_mvar: Attr,
    pub mass_flow: Attr,
}

impl TransferBranch {
    pub fn new() -> Self {
        Self {
            p_from_mw: Attr::var(0.0),
            q_from_mvar: Attr::var(0.0),
            p_to_mw: Attr::var(0.0),
            q_to_mvar: Attr::var(0.0),
            mass_flow: Attr::var(0.0),
        }
    }
}

impl Default for TransferBranch {
    fn default() -> Self {
        Self::new()
    }
}

impl_var_set!(TransferBranch {
    p_from_mw,
    q_from_mvar,
    p_to_mw,
    q_to_mvar,
    mass_flow
});
model_common!(TransferBranch);

impl BranchModel for TransferBranch {
    fn clone_branch(&self) -> Box<dyn BranchModel> {
        Box::new(self.clone())
    }

    fn multi_carrier(&self) -> bool {
        true
    }
}
