use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use kibom_sch::BomGroup;

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum BomFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFormat::Table => write!(f, "table"),
            BomFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Generate the grouped Bill of Materials (BOM)")]
pub struct BomArgs {
    /// Zip archive, directory, or single .kicad_sch file
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::AnyPath)]
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = BomFormat::Table)]
    pub format: BomFormat,
}

pub fn execute(args: BomArgs) -> Result<()> {
    let hierarchy = crate::sources::load_project(&args.input)?;

    let mut writer = io::stdout().lock();
    match args.format {
        BomFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, hierarchy.bom())?;
            writeln!(writer)?;
        }
        BomFormat::Table => write_bom_table(hierarchy.bom(), writer)?,
    }
    Ok(())
}

fn write_bom_table<W: Write>(bom: &[BomGroup], mut writer: W) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);
    table.set_header(vec![
        "Designators",
        "Name",
        "Footprint",
        "Datasheet",
        "Description",
        "DNP",
        "Qty",
    ]);

    for group in bom {
        table.add_row(vec![
            group.references().join(","),
            group.name.clone(),
            group.footprint.clone(),
            group.datasheet.clone(),
            group.description.clone(),
            if group.dnp { "Yes" } else { "No" }.to_string(),
            group.quantity().to_string(),
        ]);
    }

    writeln!(writer, "{table}")
}
