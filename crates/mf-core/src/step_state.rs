//! Inter-step state for sequential timeseries runs.

use crate::ids::Eid;
use std::collections::HashMap;

/// Scalar values carried from one successfully solved step to the next,
/// keyed by component and attribute name.
///
/// A missing entry is the "no previous value" sentinel: on the first step
/// (and after failed steps, which never contribute) lookups return `None`
/// and inter-step couplings must degrade to their unconstrained form.
#[derive(Clone, Debug, Default)]
pub struct StepState {
    values: HashMap<(Eid, &'static str), f64>,
}

impl StepState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, eid: Eid, attr: &'static str) -> Option<f64> {
        self.values.get(&(eid, attr)).copied()
    }

    pub fn set(&mut self, eid: Eid, attr: &'static str, value: f64) {
        self.values.insert((eid, attr), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Eid, &'static str, f64)> + '_ {
        self.values.iter().map(|(&(eid, attr), &v)| (eid, attr, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChildId;

    #[test]
    fn missing_entry_is_none() {
        let state = StepState::new();
        assert_eq!(state.get(Eid::Child(ChildId::from_index(0)), "p_mw"), None);
    }

    #[test]
    fn set_overwrites() {
        let mut state = StepState::new();
        let key = Eid::Child(ChildId::from_index(1));
        state.set(key, "p_mw", 1.0);
        state.set(key, "p_mw", 2.0);
        assert_eq!(state.get(key, "p_mw"), Some(2.0));
        assert_eq!(state.len(), 1);
    }
}
