use std::collections::BTreeMap;

/// One normalized transaction line from the sales export.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRow {
    pub doc_id: String,
    pub status: String,
    pub group_name: String,
    pub district: String,
    pub sales_rep: String,
    /// Gross amount, tax included.
    pub total_amount: f64,
    pub item_id: String,
    pub item_desc: String,
    pub quantity: f64,
    pub client_name: String,
    pub destination: String,
}

/// One output row of a pivot report.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotData {
    pub row_key: String,
    pub row_label: String,
    pub total: f64,
    /// Per sales rep; only reps that contributed to this row are present.
    pub values: BTreeMap<String, f64>,
}

impl PivotData {
    pub fn value(&self, rep: &str) -> f64 {
        self.values.get(rep).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportResult {
    pub columns: Vec<String>,
    pub data: Vec<PivotData>,
    pub grand_total: f64,
}

impl ReportResult {
    /// Sum of one rep's cells across all rows.
    pub fn column_total(&self, rep: &str) -> f64 {
        self.data.iter().map(|d| d.value(rep)).sum()
    }
}

// ---------------------------------------------------------------------------
// Report kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    ProductList,
    OrderCount,
    NetAmount,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [Self::ProductList, Self::OrderCount, Self::NetAmount];

    pub fn key(&self) -> &'static str {
        match self {
            Self::ProductList => "products",
            Self::OrderCount => "orders",
            Self::NetAmount => "net",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ProductList => "LISTADO DE PRODUCTOS",
            Self::OrderCount => "CANTIDAD DE PEDIDOS",
            Self::NetAmount => "VENTA NETA SIN IGV",
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::ProductList => "Productos",
            Self::OrderCount => "Pedidos",
            Self::NetAmount => "Venta Neta",
        }
    }

    /// Whether cell values are currency rather than counts.
    pub fn is_money(&self) -> bool {
        matches!(self, Self::NetAmount)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().find(|k| k.key() == key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_from_key() {
        assert_eq!(ReportKind::from_key("products"), Some(ReportKind::ProductList));
        assert_eq!(ReportKind::from_key("orders"), Some(ReportKind::OrderCount));
        assert_eq!(ReportKind::from_key("net"), Some(ReportKind::NetAmount));
        assert_eq!(ReportKind::from_key("Net"), None);
    }

    #[test]
    fn test_column_total_treats_missing_as_zero() {
        let mut a = BTreeMap::new();
        a.insert("Ana".to_string(), 2.0);
        let mut b = BTreeMap::new();
        b.insert("Juan".to_string(), 5.0);
        let report = ReportResult {
            columns: vec!["Ana".into(), "Juan".into()],
            data: vec![
                PivotData { row_key: "a".into(), row_label: "a".into(), total: 2.0, values: a },
                PivotData { row_key: "b".into(), row_label: "b".into(), total: 5.0, values: b },
            ],
            grand_total: 7.0,
        };
        assert_eq!(report.column_total("Ana"), 2.0);
        assert_eq!(report.column_total("Juan"), 5.0);
        assert_eq!(report.column_total("Nadie"), 0.0);
    }
}
