use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::filter::RowFilter;
use crate::models::{PivotData, ProcessedRow, ReportKind, ReportResult};

/// Inputs to every aggregation run besides the rows themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotConfig {
    pub filter: RowFilter,
    /// Gross amounts are divided by this to get the net (pre-tax) amount.
    pub net_divisor: f64,
}

pub const DEFAULT_NET_DIVISOR: f64 = 1.18;

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            filter: RowFilter::default(),
            net_divisor: DEFAULT_NET_DIVISOR,
        }
    }
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

struct Bucket {
    key: String,
    label: String,
    values: BTreeMap<String, f64>,
    total: f64,
    row_docs: HashSet<String>,
    cell_docs: HashMap<String, HashSet<String>>,
}

impl Bucket {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            values: BTreeMap::new(),
            total: 0.0,
            row_docs: HashSet::new(),
            cell_docs: HashMap::new(),
        }
    }

    fn add(&mut self, rep: &str, amount: f64) {
        *self.values.entry(rep.to_string()).or_default() += amount;
        self.total += amount;
    }

    fn add_doc(&mut self, rep: &str, doc_id: &str) {
        self.row_docs.insert(doc_id.to_string());
        self.cell_docs
            .entry(rep.to_string())
            .or_default()
            .insert(doc_id.to_string());
    }

    fn finish(self, kind: ReportKind) -> PivotData {
        let (values, total) = match kind {
            ReportKind::OrderCount => (
                self.cell_docs
                    .into_iter()
                    .map(|(rep, docs)| (rep, docs.len() as f64))
                    .collect(),
                self.row_docs.len() as f64,
            ),
            ReportKind::ProductList | ReportKind::NetAmount => (self.values, self.total),
        };
        PivotData {
            row_key: self.key,
            row_label: self.label,
            total,
            values,
        }
    }
}

fn row_key(row: &ProcessedRow, kind: ReportKind) -> (&str, &str) {
    match kind {
        ReportKind::ProductList => (&row.item_id, &row.item_desc),
        ReportKind::OrderCount | ReportKind::NetAmount => (&row.district, &row.district),
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Filter `rows` and pivot them by row key (item or district) against sales rep.
///
/// - `ProductList` sums quantities.
/// - `OrderCount` counts distinct documents per cell and per row; a document
///   seen under two reps counts once in the row total.
/// - `NetAmount` sums `total_amount / net_divisor`, counting each document
///   only for the first line encountered in the whole run.
///
/// Rows come out sorted by label (stable, case-sensitive); columns are the
/// sorted distinct reps of the filtered rows.
pub fn aggregate(rows: &[ProcessedRow], kind: ReportKind, config: &PivotConfig) -> ReportResult {
    let filtered: Vec<&ProcessedRow> = rows.iter().filter(|r| config.filter.keeps(r)).collect();

    let columns: Vec<String> = filtered
        .iter()
        .map(|r| r.sales_rep.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counted_docs: HashSet<&str> = HashSet::new();

    for &row in &filtered {
        let (key, label) = row_key(row, kind);
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Bucket::new(key, label));
            buckets.len() - 1
        });
        let bucket = &mut buckets[slot];

        match kind {
            ReportKind::ProductList => bucket.add(&row.sales_rep, row.quantity),
            ReportKind::OrderCount => bucket.add_doc(&row.sales_rep, &row.doc_id),
            ReportKind::NetAmount => {
                if counted_docs.insert(row.doc_id.as_str()) {
                    bucket.add(&row.sales_rep, row.total_amount / config.net_divisor);
                }
            }
        }
    }

    let mut data: Vec<PivotData> = buckets.into_iter().map(|b| b.finish(kind)).collect();
    data.sort_by(|a, b| a.row_label.cmp(&b.row_label));
    let grand_total: f64 = data.iter().map(|d| d.total).sum();

    tracing::debug!(
        "{} report: {} of {} rows kept, {} pivot rows, {} reps",
        kind.key(),
        filtered.len(),
        rows.len(),
        data.len(),
        columns.len()
    );

    ReportResult {
        columns,
        data,
        grand_total,
    }
}

/// Rows for the client lookup view: filtered, then searched by client name.
pub fn client_lookup(rows: &[ProcessedRow], filter: &RowFilter, term: &str) -> Vec<ProcessedRow> {
    crate::filter::search_clients(&filter.apply(rows), term)
}
