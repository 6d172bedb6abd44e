//! Physics equation building blocks.
//!
//! Pure helpers shared by the standard formulations; everything numeric
//! that does not depend on solver variables is folded into constants at
//! assembly time.

use mf_core::Expr;
use std::f64::consts::PI;

/// Universal gas constant, J/(mol K).
pub const GAS_CONSTANT: f64 = 8.314;

pub fn pipe_area(diameter_m: f64) -> f64 {
    PI * diameter_m * diameter_m / 4.0
}

/// Nikuradse rough-pipe friction factor.
pub fn nikuradse_friction(diameter_m: f64, roughness_m: f64) -> f64 {
    let denominator = 2.0 * (diameter_m / roughness_m).log10() + 1.14;
    1.0 / (denominator * denominator)
}

/// Reynolds number as an expression of the mass flow.
pub fn reynolds_expr(mass_flow: Expr, diameter_m: f64, dynamic_visc_pa_s: f64, area_m2: f64) -> Expr {
    mass_flow.abs() * (diameter_m / (dynamic_visc_pa_s * area_m2))
}

/// Blended laminar/rough friction factor. The +1 in the laminar term keeps
/// the expression finite at zero flow.
pub fn friction_expr(reynolds: Expr, nikuradse: f64) -> Expr {
    64.0 / (reynolds + 1.0) + nikuradse
}

/// Squared isothermal sound speed of the gas, m²/s².
pub fn sound_speed_sq(compressibility: f64, temperature_k: f64, molar_mass_kg_per_mol: f64) -> f64 {
    compressibility * GAS_CONSTANT * temperature_k / molar_mass_kg_per_mol
}

/// Weymouth resistance coefficient, scaled so the pressure difference is
/// per-unit against `pressure_ref_pa`:
/// `p_from_pu - p_to_pu == friction * w * |f| * f`.
pub fn weymouth_coefficient(
    length_m: f64,
    diameter_m: f64,
    area_m2: f64,
    sound_speed_sq_m2_s2: f64,
    pressure_ref_pa: f64,
) -> f64 {
    (length_m / diameter_m) * sound_speed_sq_m2_s2 / (area_m2 * area_m2 * pressure_ref_pa)
}

/// Darcy-Weisbach resistance, per-unit against `pressure_ref_pa`:
/// `p_from_pu - p_to_pu == friction * w * |f| * f` (pressure drops along
/// positive flow).
pub fn darcy_coefficient(
    length_m: f64,
    diameter_m: f64,
    density_kg_per_m3: f64,
    pressure_ref_pa: f64,
) -> f64 {
    length_m * (density_kg_per_m3 / 2.0) / (diameter_m * pressure_ref_pa)
}

/// Heat loss coefficient of an insulated pipe, W/K:
/// `q_w == coefficient * (t_average - t_ext)`.
pub fn heat_loss_coefficient(
    insulation_w_per_mk: f64,
    length_m: f64,
    diameter_m: f64,
    insulation_thickness_m: f64,
) -> f64 {
    let r_inner = diameter_m / 2.0;
    let r_outer = r_inner + insulation_thickness_m;
    2.0 * PI * insulation_w_per_mk * length_m / (r_outer / r_inner).ln()
}

/// Per-unit AC branch flows of a π-less series element with off-nominal tap
/// and phase shift.
pub struct AcFlow {
    pub p_from: Expr,
    pub q_from: Expr,
    pub p_to: Expr,
    pub q_to: Expr,
}

#[allow(clippy::too_many_arguments)]
pub fn ac_flow(
    g: f64,
    b: f64,
    tap: f64,
    shift_rad: f64,
    vm_from: Expr,
    va_from: Expr,
    vm_to: Expr,
    va_to: Expr,
) -> AcFlow {
    let theta = va_from.clone() - va_to.clone() - shift_rad;
    let theta_rev = va_to.clone() - va_from.clone() + shift_rad;
    let vv = vm_from.clone() * vm_to.clone() * (1.0 / tap);

    let p_from = (g / (tap * tap)) * vm_from.clone().squared()
        - vv.clone() * (g * theta.clone().cos() + b * theta.clone().sin());
    let q_from = (-b / (tap * tap)) * vm_from.squared()
        - vv.clone() * (g * theta.clone().sin() - b * theta.cos());
    let p_to = g * vm_to.clone().squared()
        - vv.clone() * (g * theta_rev.clone().cos() + b * theta_rev.clone().sin());
    let q_to =
        -b * vm_to.squared() - vv * (g * theta_rev.clone().sin() - b * theta_rev.cos());

    AcFlow {
        p_from,
        q_from,
        p_to,
        q_to,
    }
}
