use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::models::{PivotData, ProcessedRow, ReportKind, ReportResult};

pub const REPS_HEADER: &str = "VENDEDORES";
pub const TOTALS_LABEL: &str = "TOTALES";
pub const LOOKUP_SHEET: &str = "Clientes";
pub const PRODUCT_HEADERS: [&str; 3] = ["item id", "description", "total"];
pub const LOOKUP_HEADERS: [&str; 6] = ["item id", "description", "quantity", "district", "destination", "client"];
const LOOKUP_WIDTHS: [f64; 6] = [12.0, 40.0, 10.0, 20.0, 30.0, 35.0];

// ---------------------------------------------------------------------------
// Layout model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
}

impl CellValue {
    fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Inclusive merged region; its text is the value of the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl Merge {
    fn row_span(row: u32, first_col: u16, last_col: u16) -> Self {
        Self {
            first_row: row,
            first_col,
            last_row: row,
            last_col,
        }
    }

    fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }
}

/// A worksheet described as plain data, before any xlsx encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    pub merges: Vec<Merge>,
    /// Leading rows rendered as headers.
    pub header_rows: usize,
    /// Whether the last row is a totals footer.
    pub has_footer: bool,
    pub column_widths: Vec<f64>,
    pub number_format: Option<&'static str>,
}

impl SheetLayout {
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Blank)
    }

    /// Only regions covering more than one cell are kept; xlsx rejects one-cell merges.
    fn merge(&mut self, merge: Merge) {
        if merge.first_col != merge.last_col || merge.first_row != merge.last_row {
            self.merges.push(merge);
        }
    }
}

// ---------------------------------------------------------------------------
// Report layouts
// ---------------------------------------------------------------------------

pub fn report_layout(report: &ReportResult, kind: ReportKind) -> SheetLayout {
    let reps = &report.columns;
    let n = reps.len() as u16;
    let column_sums: Vec<CellValue> = reps
        .iter()
        .map(|rep| CellValue::Number(report.column_total(rep)))
        .collect();
    let rep_cells = |d: &PivotData| -> Vec<CellValue> {
        reps.iter().map(|rep| CellValue::Number(d.value(rep))).collect()
    };

    let mut layout = SheetLayout {
        name: kind.sheet_name().to_string(),
        rows: Vec::new(),
        merges: Vec::new(),
        header_rows: 2,
        has_footer: true,
        column_widths: Vec::new(),
        number_format: match kind {
            ReportKind::NetAmount => Some("#,##0.00"),
            ReportKind::OrderCount => Some("0"),
            ReportKind::ProductList => None,
        },
    };

    match kind {
        ReportKind::ProductList => {
            let mut title = vec![
                CellValue::text(kind.title()),
                CellValue::Blank,
                CellValue::Blank,
            ];
            if n > 0 {
                title.push(CellValue::text(REPS_HEADER));
                title.extend((1..n).map(|_| CellValue::Blank));
            }
            layout.rows.push(title);
            layout.merge(Merge::row_span(0, 0, 1));
            if n > 0 {
                layout.merge(Merge::row_span(0, 3, 3 + n - 1));
            }

            let mut header: Vec<CellValue> = PRODUCT_HEADERS.iter().map(|h| CellValue::text(h)).collect();
            header.extend(reps.iter().map(|r| CellValue::text(r)));
            layout.rows.push(header);

            for d in &report.data {
                let mut row = vec![
                    CellValue::text(&d.row_key),
                    CellValue::text(&d.row_label),
                    CellValue::Number(d.total),
                ];
                row.extend(rep_cells(d));
                layout.rows.push(row);
            }

            let mut footer = vec![
                CellValue::text(TOTALS_LABEL),
                CellValue::Blank,
                CellValue::Number(report.grand_total),
            ];
            footer.extend(column_sums);
            layout.rows.push(footer);

            layout.column_widths = vec![12.0, 40.0, 12.0];
            layout.column_widths.extend(reps.iter().map(|_| 14.0));
        }
        ReportKind::OrderCount | ReportKind::NetAmount => {
            let mut title = vec![CellValue::text(kind.title())];
            if n > 0 {
                title.push(CellValue::text(REPS_HEADER));
                title.extend((1..n).map(|_| CellValue::Blank));
            }
            layout.rows.push(title);
            layout.merge(Merge::row_span(0, 0, 0));
            if n > 0 {
                layout.merge(Merge::row_span(0, 1, n));
            }

            let mut header = vec![CellValue::text("DISTRITO")];
            header.extend(reps.iter().map(|r| CellValue::text(r)));
            header.push(CellValue::text("Total general"));
            layout.rows.push(header);

            for d in &report.data {
                let mut row = vec![CellValue::text(&d.row_label)];
                row.extend(rep_cells(d));
                row.push(CellValue::Number(d.total));
                layout.rows.push(row);
            }

            let mut footer = vec![CellValue::text(TOTALS_LABEL)];
            footer.extend(column_sums);
            footer.push(CellValue::Number(report.grand_total));
            layout.rows.push(footer);

            layout.column_widths = vec![24.0];
            layout.column_widths.extend(reps.iter().map(|_| 14.0));
            layout.column_widths.push(14.0);
        }
    }
    layout
}

pub fn lookup_layout(rows: &[ProcessedRow]) -> SheetLayout {
    let mut sheet_rows: Vec<Vec<CellValue>> = vec![LOOKUP_HEADERS.iter().map(|h| CellValue::text(h)).collect()];
    for r in rows {
        sheet_rows.push(vec![
            CellValue::text(&r.item_id),
            CellValue::text(&r.item_desc),
            CellValue::Number(r.quantity),
            CellValue::text(&r.district),
            CellValue::text(&r.destination),
            CellValue::text(&r.client_name),
        ]);
    }
    SheetLayout {
        name: LOOKUP_SHEET.to_string(),
        rows: sheet_rows,
        merges: Vec::new(),
        header_rows: 1,
        has_footer: false,
        column_widths: LOOKUP_WIDTHS.to_vec(),
        number_format: None,
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_border(FormatBorder::Thin)
}

fn body_format(number_format: Option<&str>, bold: bool) -> Format {
    let mut format = Format::new();
    if let Some(nf) = number_format {
        format = format.set_num_format(nf);
    }
    if bold {
        format = format.set_bold();
    }
    format
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, value: &CellValue, format: &Format) -> Result<()> {
    match value {
        CellValue::Blank => {}
        CellValue::Text(s) => {
            ws.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Number(n) => {
            ws.write_number_with_format(row, col, *n, format)?;
        }
    }
    Ok(())
}

pub fn to_xlsx(layout: &SheetLayout) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(&layout.name)?;

    for (col, width) in layout.column_widths.iter().enumerate() {
        ws.set_column_width(col as u16, *width)?;
    }

    let header = header_format();
    let body = body_format(layout.number_format, false);
    let footer = body_format(layout.number_format, true);

    for m in &layout.merges {
        let text = match layout.cell(m.first_row as usize, m.first_col as usize) {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Blank => String::new(),
        };
        ws.merge_range(m.first_row, m.first_col, m.last_row, m.last_col, &text, &header)?;
    }

    let last = layout.rows.len().saturating_sub(1);
    for (r, row) in layout.rows.iter().enumerate() {
        let format = if r < layout.header_rows {
            &header
        } else if layout.has_footer && r == last {
            &footer
        } else {
            &body
        };
        for (c, value) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            if layout.merges.iter().any(|m| m.contains(r, c)) {
                continue;
            }
            write_cell(ws, r, c, value, format)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!("encoded sheet '{}' ({} bytes)", layout.name, bytes.len());
    Ok(bytes)
}

pub fn render_report(report: &ReportResult, kind: ReportKind) -> Result<Vec<u8>> {
    to_xlsx(&report_layout(report, kind))
}

pub fn render_lookup(rows: &[ProcessedRow]) -> Result<Vec<u8>> {
    to_xlsx(&lookup_layout(rows))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Cursor;

    use calamine::{Data, Reader};

    use super::*;

    fn pivot(key: &str, label: &str, values: &[(&str, f64)]) -> PivotData {
        let values: BTreeMap<String, f64> =
            values.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        PivotData {
            row_key: key.to_string(),
            row_label: label.to_string(),
            total: values.values().sum(),
            values,
        }
    }

    fn sample_report() -> ReportResult {
        let data = vec![
            pivot("Callao", "Callao", &[("Ana", 2.0)]),
            pivot("Lima", "Lima", &[("Ana", 1.0), ("Juan", 4.0)]),
        ];
        ReportResult {
            columns: vec!["Ana".into(), "Juan".into()],
            grand_total: data.iter().map(|d| d.total).sum(),
            data,
        }
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn test_district_layout() {
        let layout = report_layout(&sample_report(), ReportKind::OrderCount);
        assert_eq!(layout.name, "Pedidos");
        assert_eq!(layout.rows[0], vec![t("CANTIDAD DE PEDIDOS"), t(REPS_HEADER), CellValue::Blank]);
        assert_eq!(layout.rows[1], vec![t("DISTRITO"), t("Ana"), t("Juan"), t("Total general")]);
        assert_eq!(layout.rows[2], vec![t("Callao"), n(2.0), n(0.0), n(2.0)]);
        assert_eq!(layout.rows[3], vec![t("Lima"), n(1.0), n(4.0), n(5.0)]);
        assert_eq!(layout.rows[4], vec![t(TOTALS_LABEL), n(3.0), n(4.0), n(7.0)]);
        assert_eq!(layout.merges, vec![Merge::row_span(0, 1, 2)]);
    }

    #[test]
    fn test_product_layout() {
        let report = ReportResult {
            columns: vec!["Ana".into(), "Juan".into()],
            data: vec![pivot("P1", "Arroz", &[("Juan", 3.0)])],
            grand_total: 3.0,
        };
        let layout = report_layout(&report, ReportKind::ProductList);
        assert_eq!(
            layout.rows[0],
            vec![t("LISTADO DE PRODUCTOS"), CellValue::Blank, CellValue::Blank, t(REPS_HEADER), CellValue::Blank]
        );
        assert_eq!(layout.rows[1], vec![t("item id"), t("description"), t("total"), t("Ana"), t("Juan")]);
        assert_eq!(layout.rows[2], vec![t("P1"), t("Arroz"), n(3.0), n(0.0), n(3.0)]);
        assert_eq!(layout.rows[3], vec![t(TOTALS_LABEL), CellValue::Blank, n(3.0), n(0.0), n(3.0)]);
        assert_eq!(layout.merges, vec![Merge::row_span(0, 0, 1), Merge::row_span(0, 3, 4)]);
    }

    #[test]
    fn test_single_rep_has_no_rep_merge() {
        let report = ReportResult {
            columns: vec!["Juan".into()],
            data: vec![pivot("Lima", "Lima", &[("Juan", 100.0)])],
            grand_total: 100.0,
        };
        let layout = report_layout(&report, ReportKind::NetAmount);
        assert!(layout.merges.is_empty());
        assert_eq!(layout.number_format, Some("#,##0.00"));
        assert!(to_xlsx(&layout).is_ok());
    }

    #[test]
    fn test_footer_recomputes_column_sums() {
        let mut report = sample_report();
        report.grand_total = 99.0;
        let layout = report_layout(&report, ReportKind::NetAmount);
        let footer = layout.rows.last().unwrap();
        assert_eq!(footer[1], n(3.0));
        assert_eq!(footer[2], n(4.0));
        assert_eq!(footer[3], n(99.0));
    }

    #[test]
    fn test_empty_report_layout() {
        let layout = report_layout(&ReportResult::default(), ReportKind::OrderCount);
        assert_eq!(layout.rows.len(), 3);
        assert_eq!(layout.rows[2], vec![t(TOTALS_LABEL), n(0.0)]);
        assert!(to_xlsx(&layout).is_ok());
    }

    #[test]
    fn test_lookup_layout() {
        let row = ProcessedRow {
            doc_id: "1".into(),
            status: "Abierto".into(),
            group_name: "MAYORISTAS B".into(),
            district: "Lima".into(),
            sales_rep: "Juan".into(),
            total_amount: 118.0,
            item_id: "P1".into(),
            item_desc: "Arroz".into(),
            quantity: 2.0,
            client_name: "Bodega Sol".into(),
            destination: "Av. Grau 123".into(),
        };
        let layout = lookup_layout(&[row]);
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(
            layout.rows[0],
            vec![t("item id"), t("description"), t("quantity"), t("district"), t("destination"), t("client")]
        );
        assert_eq!(
            layout.rows[1],
            vec![t("P1"), t("Arroz"), n(2.0), t("Lima"), t("Av. Grau 123"), t("Bodega Sol")]
        );
        assert_eq!(layout.column_widths.len(), 6);
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let bytes = render_report(&sample_report(), ReportKind::OrderCount).unwrap();
        let mut wb = calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Pedidos".to_string()]);
        let range = wb.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("CANTIDAD DE PEDIDOS".into())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String(REPS_HEADER.into())));
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("Total general".into())));
        assert_eq!(range.get_value((4, 0)), Some(&Data::String(TOTALS_LABEL.into())));
        assert_eq!(range.get_value((4, 3)), Some(&Data::Float(7.0)));
    }
}
