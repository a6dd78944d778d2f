//! Ties the capability matrix to the locally discovered adapter bundles:
//! `supported_applications` is their intersection, per §4.3.

use std::collections::HashMap;
use std::collections::HashSet;

use gc_core::{ApplicationId, MachineId};

use crate::discovery::AdapterBundle;
use crate::matrix::CapabilityMatrix;

pub struct CapabilityIndex {
    machine: MachineId,
    matrix: CapabilityMatrix,
    bundles: HashMap<ApplicationId, AdapterBundle>,
}

impl CapabilityIndex {
    pub fn new(
        machine: MachineId,
        matrix: CapabilityMatrix,
        bundles: HashMap<ApplicationId, AdapterBundle>,
    ) -> Self {
        Self { machine, matrix, bundles }
    }

    /// Intersection of (matrix row for this machine) ∩ (locally present
    /// adapter ids).
    pub fn supported_applications(&self) -> HashSet<ApplicationId> {
        let row = self.matrix.row(&self.machine);
        row.into_iter().filter(|app| self.bundles.contains_key(app)).collect()
    }

    pub fn bundle(&self, application: &ApplicationId) -> Option<&AdapterBundle> {
        self.bundles.get(application)
    }
}
