use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{PivotError, Result};
use crate::models::ProcessedRow;

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// One sheet row keyed by its column header, in column order. Empty cells are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: RawValue) {
        self.fields.push((header.into(), value));
    }

    #[cfg(test)]
    pub fn with(mut self, header: &str, value: RawValue) -> Self {
        self.push(header, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field, in column order, whose trimmed lowercase header is one of `aliases`.
    pub fn lookup(&self, aliases: &[&str]) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(header, _)| {
                let h = header.trim().to_lowercase();
                aliases.iter().any(|a| *a == h)
            })
            .map(|(_, v)| v)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a loosely formatted amount: thousands separators, `S/` or `$`, `(x)` for negatives.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw
        .replace(',', "")
        .replace('"', "")
        .replace("S/", "")
        .replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        inner.trim().parse::<f64>().ok().map(|v| -v)
    } else if let Some(rest) = s.strip_prefix('-') {
        rest.trim().parse::<f64>().ok().map(|v| -v)
    } else {
        s.parse::<f64>().ok()
    };
    value.filter(|v| v.is_finite())
}

/// Render a number the way a spreadsheet shows it: no trailing `.0` for integers.
pub fn number_to_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn as_text(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.clone(),
        RawValue::Number(n) => number_to_text(*n),
        RawValue::Bool(true) => "TRUE".to_string(),
        RawValue::Bool(false) => "FALSE".to_string(),
    }
}

fn as_number(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Text(s) => parse_amount(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

const DOC_ID: &[&str] = &[
    "numero documento", "número documento", "nro documento", "nro. documento",
    "n° documento", "documento", "doc id", "docid", "document id", "document number",
];
const STATUS: &[&str] = &["estado", "estado documento", "status", "document status"];
const GROUP_NAME: &[&str] = &[
    "grupo", "grupo cliente", "grupo de clientes", "group", "group name", "customer group",
];
const DISTRICT: &[&str] = &["distrito", "condado", "district", "county"];
const SALES_REP: &[&str] = &[
    "vendedor", "empleado de ventas", "representante", "sales rep", "sales employee",
    "salesperson",
];
const TOTAL_AMOUNT: &[&str] = &[
    "total", "total documento", "importe total", "monto total", "total amount", "doc total",
];
const ITEM_ID: &[&str] = &[
    "codigo", "código", "codigo articulo", "código artículo", "numero de articulo",
    "número de artículo", "item id", "item code", "item",
];
const ITEM_DESC: &[&str] = &[
    "descripcion", "descripción", "descripcion articulo", "descripción artículo",
    "item description", "description",
];
const QUANTITY: &[&str] = &["cantidad", "quantity", "qty"];
const CLIENT_NAME: &[&str] = &[
    "cliente", "nombre cliente", "nombre de cliente", "razon social", "razón social",
    "client", "customer", "customer name",
];
const DESTINATION: &[&str] = &[
    "destino", "direccion", "dirección", "direccion destino", "destination", "ship to",
];

pub const DEFAULT_DISTRICT: &str = "Sin Condado";
pub const DEFAULT_SALES_REP: &str = "Desconocido";
pub const DEFAULT_CLIENT: &str = "Cliente Desconocido";

fn text_field(record: &RawRecord, aliases: &[&str], default: &str) -> String {
    record
        .lookup(aliases)
        .map(as_text)
        .unwrap_or_else(|| default.to_string())
}

fn number_field(record: &RawRecord, aliases: &[&str], default: f64) -> f64 {
    record.lookup(aliases).and_then(as_number).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

pub fn normalize_record(record: &RawRecord) -> ProcessedRow {
    ProcessedRow {
        doc_id: text_field(record, DOC_ID, ""),
        status: text_field(record, STATUS, ""),
        group_name: text_field(record, GROUP_NAME, ""),
        district: text_field(record, DISTRICT, DEFAULT_DISTRICT),
        sales_rep: text_field(record, SALES_REP, DEFAULT_SALES_REP),
        total_amount: number_field(record, TOTAL_AMOUNT, 0.0),
        item_id: text_field(record, ITEM_ID, ""),
        item_desc: text_field(record, ITEM_DESC, ""),
        quantity: number_field(record, QUANTITY, 1.0),
        client_name: text_field(record, CLIENT_NAME, DEFAULT_CLIENT),
        destination: text_field(record, DESTINATION, ""),
    }
}

pub fn normalize(records: &[RawRecord]) -> Vec<ProcessedRow> {
    records.iter().map(normalize_record).collect()
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Workbook,
        }
    }
}

fn cell_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(RawValue::Text(s.clone())),
        Data::Float(f) => Some(RawValue::Number(*f)),
        Data::Int(i) => Some(RawValue::Number(*i as f64)),
        Data::Bool(b) => Some(RawValue::Bool(*b)),
        Data::DateTime(dt) => Some(RawValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(RawValue::Text(s.clone())),
    }
}

fn header_text(cell: &Data) -> String {
    cell_value(cell).map(|v| as_text(&v)).unwrap_or_default()
}

/// Decode the first worksheet of an xlsx/xls/xlsb/ods container.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| PivotError::Parse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PivotError::Parse("workbook contains no sheets".to_string()))?
        .map_err(|e| PivotError::Parse(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    let mut records = Vec::new();
    for row in rows {
        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.trim().is_empty() {
                continue;
            }
            if let Some(value) = cell_value(cell) {
                record.push(header.clone(), value);
            }
        }
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Decode a CSV export; the first line holds the headers.
pub fn read_csv(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = rdr
        .headers()
        .map_err(|e| PivotError::Parse(e.to_string()))?
        .clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| PivotError::Parse(e.to_string()))?;
        let mut record = RawRecord::new();
        for (header, field) in headers.iter().zip(row.iter()) {
            if header.trim().is_empty() || field.is_empty() {
                continue;
            }
            record.push(header, RawValue::Text(field.to_string()));
        }
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn read_records(bytes: &[u8], format: SourceFormat) -> Result<Vec<RawRecord>> {
    match format {
        SourceFormat::Workbook => read_workbook(bytes),
        SourceFormat::Csv => read_csv(bytes),
    }
}

/// Decode and normalize bytes. Zero data rows is an `EmptyDataset` error.
pub fn parse_bytes(bytes: &[u8], format: SourceFormat) -> Result<Vec<ProcessedRow>> {
    let records = read_records(bytes, format)?;
    tracing::debug!("decoded {} raw records ({:?})", records.len(), format);
    if records.is_empty() {
        return Err(PivotError::EmptyDataset);
    }
    Ok(normalize(&records))
}

pub fn parse_file(path: &Path) -> Result<Vec<ProcessedRow>> {
    let bytes = std::fs::read(path)?;
    parse_bytes(&bytes, SourceFormat::from_path(path))
}
