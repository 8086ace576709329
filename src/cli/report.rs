use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::export::{destination, write_xlsx};
use crate::cli::OutputArgs;
use crate::error::{PivotError, Result};
use crate::fmt::report_value;
use crate::importer::parse_file;
use crate::models::{ReportKind, ReportResult};
use crate::reports::aggregate;
use crate::settings::load_settings;
use crate::xlsx::{self, PRODUCT_HEADERS, TOTALS_LABEL};

pub fn run(kind: &str, file: &str, out: OutputArgs) -> Result<()> {
    let kind = ReportKind::from_key(kind).ok_or_else(|| PivotError::UnknownReport(kind.to_string()))?;
    let rows = parse_file(Path::new(file))?;
    let report = aggregate(&rows, kind, &load_settings().pivot_config());

    match destination(&out, kind.key()) {
        Some(path) => write_xlsx(&xlsx::render_report(&report, kind)?, &path),
        None => {
            println!("{}", format_report(&report, kind));
            Ok(())
        }
    }
}

fn num(val: f64, kind: ReportKind) -> Cell {
    Cell::new(report_value(val, kind)).set_alignment(CellAlignment::Right)
}

// ---------------------------------------------------------------------------
// Pure formatting (report → String)
// ---------------------------------------------------------------------------

pub fn format_report(report: &ReportResult, kind: ReportKind) -> String {
    let mut table = Table::new();
    let reps = &report.columns;

    match kind {
        ReportKind::ProductList => {
            let mut header: Vec<String> = PRODUCT_HEADERS.iter().map(|h| h.to_string()).collect();
            header.extend(reps.iter().cloned());
            table.set_header(header);

            for d in &report.data {
                let mut row = vec![Cell::new(&d.row_key), Cell::new(&d.row_label), num(d.total, kind)];
                row.extend(reps.iter().map(|rep| num(d.value(rep), kind)));
                table.add_row(row);
            }

            let mut footer = vec![
                Cell::new(TOTALS_LABEL.bold()),
                Cell::new(""),
                num(report.grand_total, kind),
            ];
            footer.extend(reps.iter().map(|rep| num(report.column_total(rep), kind)));
            table.add_row(footer);
        }
        ReportKind::OrderCount | ReportKind::NetAmount => {
            let mut header = vec!["DISTRITO".to_string()];
            header.extend(reps.iter().cloned());
            header.push("Total general".to_string());
            table.set_header(header);

            for d in &report.data {
                let mut row = vec![Cell::new(&d.row_label)];
                row.extend(reps.iter().map(|rep| num(d.value(rep), kind)));
                row.push(num(d.total, kind));
                table.add_row(row);
            }

            let mut footer = vec![Cell::new(TOTALS_LABEL.bold())];
            footer.extend(reps.iter().map(|rep| num(report.column_total(rep), kind)));
            footer.push(num(report.grand_total, kind));
            table.add_row(footer);
        }
    }

    format!("{}\n{table}", kind.title().bold())
}
