use std::path::Path;

use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::export::{destination, write_xlsx};
use crate::cli::OutputArgs;
use crate::error::Result;
use crate::fmt::quantity;
use crate::importer::parse_file;
use crate::models::ProcessedRow;
use crate::reports::client_lookup;
use crate::settings::load_settings;
use crate::xlsx;

pub fn run(file: &str, search: Option<&str>, out: OutputArgs) -> Result<()> {
    let rows = parse_file(Path::new(file))?;
    let settings = load_settings();
    let found = client_lookup(&rows, &settings.filter, search.unwrap_or(""));

    match destination(&out, "clients") {
        Some(path) => write_xlsx(&xlsx::render_lookup(&found)?, &path),
        None => {
            println!("{}", format_lookup(&found));
            Ok(())
        }
    }
}

pub fn format_lookup(rows: &[ProcessedRow]) -> String {
    let mut table = Table::new();
    table.set_header(xlsx::LOOKUP_HEADERS);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.item_id),
            Cell::new(&r.item_desc),
            Cell::new(quantity(r.quantity)).set_alignment(CellAlignment::Right),
            Cell::new(&r.district),
            Cell::new(&r.destination),
            Cell::new(&r.client_name),
        ]);
    }
    let noun = if rows.len() == 1 { "línea" } else { "líneas" };
    format!("{table}\n{} {noun}", rows.len())
}
