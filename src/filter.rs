use serde::{Deserialize, Serialize};

use crate::models::ProcessedRow;

fn default_excluded_status() -> String {
    "Cerrado".to_string()
}

fn default_allowed_groups() -> Vec<String> {
    ["MAYORISTAS B", "MAYORISTAS C", "MAYORISTAS D", "MAYORISTAS E"]
        .iter()
        .map(|g| g.to_string())
        .collect()
}

/// Inclusion rules applied before every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Rows whose status contains this text are dropped.
    #[serde(default = "default_excluded_status")]
    pub excluded_status: String,
    /// Exact, case-sensitive group names that are kept.
    #[serde(default = "default_allowed_groups")]
    pub allowed_groups: Vec<String>,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            excluded_status: default_excluded_status(),
            allowed_groups: default_allowed_groups(),
        }
    }
}

impl RowFilter {
    pub fn keeps(&self, row: &ProcessedRow) -> bool {
        let status_open =
            self.excluded_status.is_empty() || !row.status.contains(&self.excluded_status);
        status_open && self.allowed_groups.iter().any(|g| *g == row.group_name)
    }

    pub fn apply(&self, rows: &[ProcessedRow]) -> Vec<ProcessedRow> {
        rows.iter().filter(|r| self.keeps(r)).cloned().collect()
    }
}

/// Case-insensitive substring search on the client name. An empty term matches everything.
pub fn search_clients(rows: &[ProcessedRow], term: &str) -> Vec<ProcessedRow> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| r.client_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
