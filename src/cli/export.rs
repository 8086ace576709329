use std::path::{Path, PathBuf};

use crate::cli::OutputArgs;
use crate::error::Result;
use crate::importer::parse_file;
use crate::models::ReportKind;
use crate::reports::{aggregate, client_lookup};
use crate::settings::{export_dir, load_settings};
use crate::xlsx;

fn dated_name(name: &str) -> String {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    format!("{name}-{date}.xlsx")
}

/// Where an export should go, or `None` to print instead.
pub(crate) fn destination(out: &OutputArgs, name: &str) -> Option<PathBuf> {
    if let Some(path) = &out.output {
        return Some(PathBuf::from(path));
    }
    out.export.then(|| export_dir().join(dated_name(name)))
}

pub(crate) fn write_xlsx(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn all(file: &str, output_dir: Option<String>) -> Result<()> {
    let rows = parse_file(Path::new(file))?;
    let settings = load_settings();
    let config = settings.pivot_config();

    let dir = output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&settings.export_dir));
    std::fs::create_dir_all(&dir)?;

    for kind in ReportKind::ALL {
        let report = aggregate(&rows, kind, &config);
        let bytes = xlsx::render_report(&report, kind)?;
        write_xlsx(&bytes, &dir.join(dated_name(kind.key())))?;
    }

    let lookup = client_lookup(&rows, &config.filter, "");
    write_xlsx(&xlsx::render_lookup(&lookup)?, &dir.join(dated_name("clients")))?;

    println!("All reports exported to {}", dir.display());
    Ok(())
}
