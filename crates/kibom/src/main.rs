use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod bom;
mod pages;
mod ports;
mod sources;

#[derive(Parser)]
#[command(name = "kibom")]
#[command(about = "Hierarchy and BOM extraction for KiCad schematic sets", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the grouped Bill of Materials (BOM)
    #[command(alias = "b")]
    Bom(bom::BomArgs),

    /// Extract root-sheet ports (hierarchical labels and power symbols)
    Ports(ports::PortsArgs),

    /// Show the resolved page tree
    Pages(pages::PagesArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG still overrides.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Bom(args) => bom::execute(args),
        Commands::Ports(args) => ports::execute(args),
        Commands::Pages(args) => pages::execute(args),
    }
}
