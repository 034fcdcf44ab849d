use crate::error::Result;
use crate::settings::{read_settings_file, save_settings, settings_path, Settings};

pub fn run(force: bool) -> Result<()> {
    let path = settings_path();
    if force || !path.exists() {
        save_settings(&Settings::default())?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }
    // Rewrite through serde so fields added since the file was written
    // appear. A file that does not parse is left for the user to fix.
    let current = read_settings_file(&path)?;
    save_settings(&current)?;
    println!("Settings already at {} (use --force to reset)", path.display());
    Ok(())
}
