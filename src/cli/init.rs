use crate::error::{PivotError, Result};
use crate::settings::{load_settings, save_settings, settings_file_exists, settings_path, Settings};

pub fn run() -> Result<()> {
    if settings_file_exists() {
        println!("Settings already exist at {}", settings_path().display());
        return Ok(());
    }
    let path = save_settings(&Settings::default())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

pub fn show() -> Result<()> {
    let settings = load_settings();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| PivotError::Settings(e.to_string()))?;
    println!("# {}", settings_path().display());
    println!("{json}");
    Ok(())
}
