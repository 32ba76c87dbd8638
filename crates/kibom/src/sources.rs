//! Turning CLI inputs (zip archive, directory, single file) into the raw
//! source set the hierarchy loads.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use kibom_kicad::{KicadParser, is_schematic_filename};
use kibom_sch::{SchematicHierarchy, SchematicSource};

/// Collect schematic sources from `input` and load them into a hierarchy.
pub fn load_project(input: &Path) -> Result<SchematicHierarchy> {
    let sources = collect_sources(input)?;
    if sources.is_empty() {
        bail!("no .kicad_sch files found in {}", input.display());
    }
    log::debug!(
        "collected {} schematic files from {}",
        sources.len(),
        input.display()
    );

    let mut hierarchy = SchematicHierarchy::new();
    hierarchy.load(&sources, &KicadParser)?;
    Ok(hierarchy)
}

/// Gather `.kicad_sch` sources in deterministic (name-sorted) order.
pub fn collect_sources(input: &Path) -> Result<Vec<SchematicSource>> {
    if input.is_dir() {
        collect_from_dir(input)
    } else if input.extension().and_then(|ext| ext.to_str()) == Some("zip") {
        collect_from_zip(input)
    } else {
        collect_single_file(input)
    }
}

fn collect_single_file(path: &Path) -> Result<Vec<SchematicSource>> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    if !is_schematic_filename(&name) {
        bail!("{} is not a .kicad_sch file", path.display());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(vec![SchematicSource::new(name.into_owned(), content)])
}

fn collect_from_dir(dir: &Path) -> Result<Vec<SchematicSource>> {
    let mut sources = Vec::new();
    let walker = walkdir::WalkDir::new(dir).sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !is_schematic_filename(&name) {
            continue;
        }
        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        sources.push(SchematicSource::new(name.into_owned(), content));
    }
    Ok(sources)
}

fn collect_from_zip(path: &Path) -> Result<Vec<SchematicSource>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut archive =
        zip::ZipArchive::new(file).with_context(|| format!("reading {}", path.display()))?;

    let mut sources = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("reading entry {index} of {}", path.display()))?;
        if !entry.is_file() || !is_schematic_filename(entry.name()) {
            continue;
        }
        let name = entry.name().to_string();
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .with_context(|| format!("reading {name} from {}", path.display()))?;
        sources.push(SchematicSource::new(name, content));
    }

    // Zip entry order is whatever the archiver produced; sort for
    // deterministic load order.
    sources.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(sources)
}
