//! Schematic hierarchy resolution and BOM aggregation.
//!
//! A multi-sheet schematic arrives as a flat, unordered set of parsed
//! documents with no parent pointers; the only nesting evidence is the opaque
//! instantiation path carried by each sheet instance. This crate owns the
//! in-memory document model and the [`SchematicHierarchy`] aggregate that
//! discovers the root document, rebuilds the ordered page tree and groups
//! every electrical symbol into a deduplicated bill of materials.
//!
//! Parsing file text into [`Document`] values is a collaborator's job: any
//! [`SchematicParser`] implementation can feed `load`, which keeps this crate
//! free of file-format knowledge.

pub mod bom;
pub mod hierarchy;
pub mod numeric_sort;

use serde::Serialize;

pub use bom::{BomGroup, BomItem, BomVisitor};
pub use hierarchy::{
    HierarchyError, NetRef, SchematicHierarchy, SchematicParser, SchematicSource, SheetPage,
};

/// One parsed schematic file, immutable once loaded into a hierarchy.
#[derive(Debug, Clone)]
pub struct Document {
    filename: String,
    uuid: String,
    nodes: Vec<SchematicNode>,
}

impl Document {
    pub fn new(
        filename: impl Into<String>,
        uuid: impl Into<String>,
        nodes: Vec<SchematicNode>,
    ) -> Self {
        Self {
            filename: filename.into(),
            uuid: uuid.into(),
            nodes,
        }
    }

    /// Base filename, the document's key within one loaded set.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Stable identity taken from the file itself.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn nodes(&self) -> &[SchematicNode] {
        &self.nodes
    }

    /// Walk the node tree, dispatching each node to the visitor.
    pub fn visit<V: SchematicVisitor + ?Sized>(&self, visitor: &mut V) {
        walk_nodes(&self.nodes, visitor);
    }

    /// Sheet references in document order.
    pub fn sheets(&self) -> Vec<&SchematicSheet> {
        let mut out = Vec::new();
        collect_sheets(&self.nodes, &mut out);
        out
    }

    /// Net labels of every kind in document order.
    pub fn labels(&self) -> Vec<&NetLabel> {
        let mut out = Vec::new();
        collect_labels(&self.nodes, &mut out);
        out
    }

    /// Labels that cross sheet boundaries upward.
    pub fn hierarchical_labels(&self) -> Vec<&NetLabel> {
        self.labels()
            .into_iter()
            .filter(|label| label.kind == LabelKind::Hierarchical)
            .collect()
    }

    /// Power symbols placed on this document.
    pub fn power_symbols(&self) -> Vec<&SchematicSymbol> {
        let mut out = Vec::new();
        collect_symbols(&self.nodes, &mut out);
        out.retain(|symbol| symbol.is_power());
        out
    }
}

/// One node of a document's content tree.
///
/// The variants are closed on purpose: every consumer matches exhaustively,
/// so adding a node kind is a compile-visible change.
#[derive(Debug, Clone)]
pub enum SchematicNode {
    Symbol(SchematicSymbol),
    Sheet(SchematicSheet),
    Label(NetLabel),
    /// Structural grouping with no electrical meaning of its own.
    Other(Vec<SchematicNode>),
}

/// Visitor over a document's node tree. Methods default to no-ops so
/// implementations only handle the node kinds they care about.
pub trait SchematicVisitor {
    fn visit_symbol(&mut self, _symbol: &SchematicSymbol) {}
    fn visit_sheet(&mut self, _sheet: &SchematicSheet) {}
    fn visit_label(&mut self, _label: &NetLabel) {}
}

/// Dispatch every node in `nodes` to `visitor`, recursing through groupings.
pub fn walk_nodes<V: SchematicVisitor + ?Sized>(nodes: &[SchematicNode], visitor: &mut V) {
    for node in nodes {
        match node {
            SchematicNode::Symbol(symbol) => visitor.visit_symbol(symbol),
            SchematicNode::Sheet(sheet) => visitor.visit_sheet(sheet),
            SchematicNode::Label(label) => visitor.visit_label(label),
            SchematicNode::Other(children) => walk_nodes(children, visitor),
        }
    }
}

fn collect_sheets<'a>(nodes: &'a [SchematicNode], out: &mut Vec<&'a SchematicSheet>) {
    for node in nodes {
        match node {
            SchematicNode::Sheet(sheet) => out.push(sheet),
            SchematicNode::Other(children) => collect_sheets(children, out),
            SchematicNode::Symbol(_) | SchematicNode::Label(_) => {}
        }
    }
}

fn collect_labels<'a>(nodes: &'a [SchematicNode], out: &mut Vec<&'a NetLabel>) {
    for node in nodes {
        match node {
            SchematicNode::Label(label) => out.push(label),
            SchematicNode::Other(children) => collect_labels(children, out),
            SchematicNode::Symbol(_) | SchematicNode::Sheet(_) => {}
        }
    }
}

fn collect_symbols<'a>(nodes: &'a [SchematicNode], out: &mut Vec<&'a SchematicSymbol>) {
    for node in nodes {
        match node {
            SchematicNode::Symbol(symbol) => out.push(symbol),
            SchematicNode::Other(children) => collect_symbols(children, out),
            SchematicNode::Sheet(_) | SchematicNode::Label(_) => {}
        }
    }
}

/// One placed electrical symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchematicSymbol {
    pub uuid: String,
    pub lib_id: String,
    /// Reference designator, e.g. `R1`.
    pub reference: String,
    pub value: String,
    pub footprint: String,
    pub datasheet: String,
    pub description: String,
    pub dnp: bool,
    pub in_bom: bool,
}

impl SchematicSymbol {
    /// Power symbols carry a net, not a physical part: KiCad places them in
    /// the `power:` library and gives them `#`-prefixed references.
    pub fn is_power(&self) -> bool {
        self.lib_id.starts_with("power:") || self.reference.starts_with('#')
    }
}

/// A reference inside a document to a child document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchematicSheet {
    /// Identity of this sheet placement (not of the child document).
    pub uuid: String,
    /// Child document filename; `None` when the reference is unresolved.
    pub sheetfile: Option<String>,
    pub sheetname: Option<String>,
    /// Concrete placements of this sheet, keyed by instantiation path.
    pub instances: Vec<SheetInstance>,
}

/// One concrete placement of a sheet within the design.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetInstance {
    /// Opaque instantiation path, e.g. `/root-uuid/sheet-uuid`.
    pub path: String,
    /// Printed page label, used only for display and ordering.
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Local,
    Global,
    Hierarchical,
}

/// One net-label occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetLabel {
    pub kind: LabelKind,
    pub text: String,
    /// Labels without a uuid exist in older files; they are never indexed.
    pub uuid: Option<String>,
}
