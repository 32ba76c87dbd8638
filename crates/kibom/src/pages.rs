use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;

#[derive(Args, Debug, Clone)]
#[command(about = "Show the resolved page tree")]
pub struct PagesArgs {
    /// Zip archive, directory, or single .kicad_sch file
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::AnyPath)]
    pub input: PathBuf,
}

pub fn execute(args: PagesArgs) -> Result<()> {
    let hierarchy = crate::sources::load_project(&args.input)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Page", "Name", "File", "Project path"]);

    for page in hierarchy.pages() {
        table.add_row(vec![
            page.page.clone().unwrap_or_default(),
            page.name.clone().unwrap_or_default(),
            page.filename.clone(),
            page.project_path(),
        ]);
    }

    let mut writer = io::stdout().lock();
    writeln!(writer, "{table}")?;
    Ok(())
}
