//! Node models.

use mf_core::{Attr, impl_var_set};
use mf_graph::{NodeModel, model_common};

/// Electrical bus. Voltage magnitude is per-unit, angle in radians; `p_mw`
/// and `q_mvar` are the net branch injections made visible as attributes.
#[derive(Clone, Debug)]
pub struct Bus {
    pub base_kv: f64,
    pub vm_pu: Attr,
    pub va_rad: Attr,
    pub p_mw: Attr,
    pub q_mvar: Attr,
}

impl Bus {
    pub fn new(base_kv: f64) -> Self {
        Self {
            base_kv,
            vm_pu: Attr::var(1.0),
            va_rad: Attr::var(0.0),
            p_mw: Attr::var(0.0),
            q_mvar: Attr::var(0.0),
        }
    }
}

impl_var_set!(Bus {
    vm_pu,
    va_rad,
    p_mw,
    q_mvar
});
model_common!(Bus);

impl NodeModel for Bus {
    fn clone_node(&self) -> Box<dyn NodeModel> {
        Box::new(self.clone())
    }
}

/// Gas junction. Pressure is per-unit against the grid reference pressure.
#[derive(Clone, Debug)]
pub struct GasJunction {
    pub pressure_pu: Attr,
}

impl GasJunction {
    pub fn new() -> Self {
        Self {
            pressure_pu: Attr::var(1.0),
        }
    }
}

impl Default for GasJunction {
    fn default() -> Self {
        Self::new()
    }
}

impl_var_set!(GasJunction { pressure_pu });
model_common!(GasJunction);

impl NodeModel for GasJunction {
    fn clone_node(&self) -> Box<dyn NodeModel> {
        Box::new(self.clone())
    }
}

/// Heating-water junction: per-unit pressure plus water temperature.
#[derive(Clone, Debug)]
pub struct WaterJunction {
    pub pressure_pu: Attr,
    pub t_k: Attr,
}

impl WaterJunction {
    pub fn new() -> Self {
        Self {
            pressure_pu: Attr::var(1.0),
            t_k: Attr::var(350.0),
        }
    }
}

impl Default for WaterJunction {
    fn default() -> Self {
        Self::new()
    }
}

impl_var_set!(WaterJunction { pressure_pu, t_k });
model_common!(WaterJunction);

impl NodeModel for WaterJunction {
    fn clone_node(&self) -> Box<dyn NodeModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::VarSet;
    use mf_graph::ModelCommon;

    #[test]
    fn bus_attrs() {
        let bus = Bus::new(10.0);
        assert!(bus.attr("vm_pu").is_some_and(|a| a.is_var()));
        assert_eq!(bus.attr("vm_pu").unwrap().value(), 1.0);
        assert_eq!(bus.type_name(), "Bus");
    }

    #[test]
    fn gas_junction_has_no_temperature() {
        let j = GasJunction::new();
        assert!(!j.has_attr("t_k"));
        assert!(j.has_attr("pressure_pu"));
    }
}
