//! KiCad schematic (`.kicad_sch`) parsing.
//!
//! Turns schematic file text into [`kibom_sch::Document`] values. Only the
//! fields the hierarchy and BOM care about are extracted: placed symbols with
//! their BOM properties, sheet references with their instantiation paths, and
//! net labels. Graphics, wires and library definitions are ignored.

use anyhow::{Context, Result, bail};
use kibom_sch::{
    Document, LabelKind, NetLabel, SchematicNode, SchematicParser, SchematicSheet,
    SchematicSymbol, SheetInstance,
};
use kibom_sexpr::{Sexpr, find_all_child_lists, find_child_list};

/// File extension of KiCad schematic documents.
pub const SCHEMATIC_EXTENSION: &str = "kicad_sch";

/// Whether a filename names a KiCad schematic. Callers use this to validate a
/// resolved root before trusting it.
pub fn is_schematic_filename(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        == Some(SCHEMATIC_EXTENSION)
}

/// [`SchematicParser`] implementation for `.kicad_sch` text.
#[derive(Debug, Default, Clone, Copy)]
pub struct KicadParser;

impl SchematicParser for KicadParser {
    fn parse_document(&self, filename: &str, content: &str) -> Result<Document> {
        parse_schematic(filename, content)
    }
}

/// Parse one `.kicad_sch` document.
pub fn parse_schematic(filename: &str, content: &str) -> Result<Document> {
    let root = kibom_sexpr::parse(content)
        .with_context(|| format!("malformed s-expression in {filename}"))?;
    let Some(items) = root.as_list() else {
        bail!("{filename}: expected a (kicad_sch ...) document, found an atom");
    };
    if items.first().and_then(Sexpr::as_sym) != Some("kicad_sch") {
        bail!("{filename}: not a kicad_sch document");
    }

    // Old files may omit the document uuid; an empty identity still loads,
    // it just cannot anchor a hierarchy.
    let uuid = atom_prop(items, "uuid").unwrap_or_default();

    let mut nodes = Vec::new();
    for item in items.iter().skip(1) {
        let Some(list) = item.as_list() else {
            continue;
        };
        match list.first().and_then(Sexpr::as_sym) {
            Some("symbol") => nodes.push(SchematicNode::Symbol(parse_symbol(list))),
            Some("sheet") => nodes.push(SchematicNode::Sheet(parse_sheet(list))),
            Some("label") => nodes.push(SchematicNode::Label(parse_label(list, LabelKind::Local))),
            Some("global_label") => {
                nodes.push(SchematicNode::Label(parse_label(list, LabelKind::Global)))
            }
            Some("hierarchical_label") => nodes.push(SchematicNode::Label(parse_label(
                list,
                LabelKind::Hierarchical,
            ))),
            _ => {}
        }
    }

    log::debug!("parsed {filename}: {} nodes", nodes.len());
    Ok(Document::new(filename, uuid, nodes))
}

fn parse_symbol(items: &[Sexpr]) -> SchematicSymbol {
    SchematicSymbol {
        uuid: atom_prop(items, "uuid").unwrap_or_default(),
        lib_id: atom_prop(items, "lib_id").unwrap_or_default(),
        reference: property(items, "Reference").unwrap_or_default(),
        value: property(items, "Value").unwrap_or_default(),
        footprint: property(items, "Footprint").unwrap_or_default(),
        datasheet: property(items, "Datasheet").unwrap_or_default(),
        description: property(items, "Description").unwrap_or_default(),
        dnp: yes_no_prop(items, "dnp").unwrap_or(false),
        in_bom: yes_no_prop(items, "in_bom").unwrap_or(true),
    }
}

fn parse_sheet(items: &[Sexpr]) -> SchematicSheet {
    let mut instances = Vec::new();
    if let Some(instance_items) = find_child_list(items, "instances") {
        for project in find_all_child_lists(instance_items, "project") {
            for path in find_all_child_lists(project, "path") {
                let Some(instance_path) = path.get(1).and_then(Sexpr::as_atom) else {
                    continue;
                };
                instances.push(SheetInstance {
                    path: instance_path.to_string(),
                    page: atom_prop(path, "page"),
                });
            }
        }
    }

    SchematicSheet {
        uuid: atom_prop(items, "uuid").unwrap_or_default(),
        // KiCad 7 writes "Sheetfile"/"Sheetname"; older exports use the
        // spaced spelling.
        sheetfile: property(items, "Sheetfile").or_else(|| property(items, "Sheet file")),
        sheetname: property(items, "Sheetname").or_else(|| property(items, "Sheet name")),
        instances,
    }
}

fn parse_label(items: &[Sexpr], kind: LabelKind) -> NetLabel {
    NetLabel {
        kind,
        text: items
            .get(1)
            .and_then(Sexpr::as_atom)
            .unwrap_or_default()
            .to_string(),
        uuid: atom_prop(items, "uuid"),
    }
}

/// `(tag value)` where the value may be a quoted string or a bare atom.
fn atom_prop(items: &[Sexpr], tag: &str) -> Option<String> {
    find_child_list(items, tag)?
        .get(1)?
        .as_atom()
        .map(str::to_string)
}

/// `(tag yes)` / `(tag no)` flags.
fn yes_no_prop(items: &[Sexpr], tag: &str) -> Option<bool> {
    match find_child_list(items, tag)?.get(1)?.as_atom()? {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

/// `(property "NAME" "VALUE" ...)` lookup by property name.
fn property(items: &[Sexpr], name: &str) -> Option<String> {
    find_all_child_lists(items, "property")
        .into_iter()
        .find(|prop| prop.get(1).and_then(Sexpr::as_str) == Some(name))
        .and_then(|prop| prop.get(2).and_then(Sexpr::as_str))
        .map(str::to_string)
}
