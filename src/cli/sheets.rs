use std::path::Path;

use crate::error::Result;
use crate::importer::list_sheets;

pub fn run(file: &str) -> Result<()> {
    for (i, name) in list_sheets(Path::new(file))?.iter().enumerate() {
        println!("{:>3}  {name}", i + 1);
    }
    Ok(())
}
