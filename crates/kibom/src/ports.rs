use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kibom_sch::Document;
use serde::Serialize;

#[derive(Args, Debug, Clone)]
#[command(about = "Extract root-sheet ports (hierarchical labels and power symbols)")]
pub struct PortsArgs {
    /// Zip archive, directory, or single .kicad_sch file
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::AnyPath)]
    pub input: PathBuf,
}

/// Ports of a design: the root sheet's hierarchical labels plus its global
/// power connections.
#[derive(Serialize)]
struct PortsReport<'a> {
    hierarchical_labels: Vec<LabelPort<'a>>,
    global_power_ports: Vec<PowerPort<'a>>,
}

#[derive(Serialize)]
struct LabelPort<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    uuid: Option<&'a str>,
}

#[derive(Serialize)]
struct PowerPort<'a> {
    reference: &'a str,
    net: &'a str,
    uuid: &'a str,
}

pub fn execute(args: PortsArgs) -> Result<()> {
    let hierarchy = crate::sources::load_project(&args.input)?;
    let root = hierarchy
        .root_document()
        .context("ports are keyed off the root schematic")?;

    let mut writer = io::stdout().lock();
    serde_json::to_writer_pretty(&mut writer, &ports_report(root))?;
    writeln!(writer)?;
    Ok(())
}

fn ports_report(root: &Document) -> PortsReport<'_> {
    PortsReport {
        hierarchical_labels: root
            .hierarchical_labels()
            .into_iter()
            .map(|label| LabelPort {
                name: &label.text,
                uuid: label.uuid.as_deref(),
            })
            .collect(),
        global_power_ports: root
            .power_symbols()
            .into_iter()
            .map(|symbol| PowerPort {
                reference: &symbol.reference,
                net: &symbol.value,
                uuid: &symbol.uuid,
            })
            .collect(),
    }
}
