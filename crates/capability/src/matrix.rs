//! The machine/application capability matrix: `Settings/Software_Per_Machine.csv`.
//! Header row `Machine name, <application id>, …`; subsequent rows
//! `<machine>, 0|1, …`. Loaded once at startup — a reload is a restart-level
//! event.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use gc_core::{ApplicationId, MachineId};

use crate::error::CapabilityError;

#[derive(Clone, Debug, Default)]
pub struct CapabilityMatrix {
    /// machine -> set of application ids it may process.
    rows: HashMap<MachineId, HashSet<ApplicationId>>,
}

impl CapabilityMatrix {
    pub fn from_csv_str(csv_text: &str) -> Result<Self, CapabilityError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| CapabilityError::MalformedMatrix(e.to_string()))?
            .clone();
        if headers.len() < 2 {
            return Err(CapabilityError::MalformedMatrix(
                "expected a machine name column plus at least one application column".into(),
            ));
        }
        let applications: Vec<ApplicationId> = headers
            .iter()
            .skip(1)
            .map(|h| ApplicationId::from(h.trim()))
            .collect();

        let mut rows = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| CapabilityError::MalformedMatrix(e.to_string()))?;
            let mut fields = record.iter();
            let machine = MachineId::from(
                fields
                    .next()
                    .ok_or_else(|| CapabilityError::MalformedMatrix("missing machine name".into()))?
                    .trim(),
            );
            let mut supported = HashSet::new();
            for (application, flag) in applications.iter().zip(fields) {
                if flag.trim() == "1" {
                    supported.insert(application.clone());
                }
            }
            rows.insert(machine, supported);
        }

        Ok(Self { rows })
    }

    pub async fn load(path: &Path) -> Result<Self, CapabilityError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CapabilityError::Io { path: path.to_path_buf(), source })?;
        Self::from_csv_str(&text)
    }

    /// The matrix row for `machine`: applications it is configured to
    /// process, regardless of whether an adapter is locally present.
    pub fn row(&self, machine: &MachineId) -> HashSet<ApplicationId> {
        self.rows.get(machine).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_flag_rows() {
        let csv = "Machine name,render,encode\nm1,1,0\nm2,0,1\n";
        let matrix = CapabilityMatrix::from_csv_str(csv).expect("parse");

        let m1 = matrix.row(&MachineId::from("m1"));
        assert!(m1.contains(&ApplicationId::from("render")));
        assert!(!m1.contains(&ApplicationId::from("encode")));

        let m2 = matrix.row(&MachineId::from("m2"));
        assert!(m2.contains(&ApplicationId::from("encode")));
    }

    #[test]
    fn unknown_machine_has_no_capabilities() {
        let matrix = CapabilityMatrix::from_csv_str("Machine name,render\nm1,1\n").expect("parse");
        assert!(matrix.row(&MachineId::from("ghost")).is_empty());
    }

    #[test]
    fn rejects_matrix_with_no_application_columns() {
        let err = CapabilityMatrix::from_csv_str("Machine name\n").unwrap_err();
        assert!(matches!(err, CapabilityError::MalformedMatrix(_)));
    }
}
