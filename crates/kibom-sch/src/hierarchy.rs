//! Root discovery, page-tree reconstruction and the loaded-project facade.
//!
//! Sheets carry no parent pointers. Each sheet *instance* records an opaque
//! instantiation path, and a document's own identity path is `/<uuid>`, so
//! the parent of an occurrence can be recovered by dropping the last path
//! segment and looking the remainder up among document identity paths. The
//! occurrence with the shortest path whose parent resolves pins the root.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use anyhow::Context;

use crate::bom::{self, BomGroup, BomVisitor};
use crate::{Document, NetLabel, numeric_sort};

/// Raw input to [`SchematicHierarchy::load`]: one file's name and text.
#[derive(Debug, Clone)]
pub struct SchematicSource {
    /// May carry directory prefixes (zip entries); only the base name keys
    /// the document.
    pub filename: String,
    pub content: String,
}

impl SchematicSource {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// The external parser collaborator: turns file text into a [`Document`].
pub trait SchematicParser {
    /// `filename` is the base name the document will be keyed by; the
    /// returned document must carry it.
    fn parse_document(&self, filename: &str, content: &str) -> anyhow::Result<Document>;
}

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// Zero or several candidate documents and no resolvable hierarchy.
    #[error("no root schematic found")]
    NoRoot,
}

/// A reference to one label occurrence, the unit of the label index.
#[derive(Debug, Clone, PartialEq)]
pub struct NetRef {
    /// Filename of the owning document.
    pub filename: String,
    /// Label text; many refs may share it.
    pub name: String,
    pub uuid: String,
}

/// A resolved node of the page tree: a document plus the instantiation path
/// that reached it.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPage {
    pub filename: String,
    /// Instantiation path that produced this page; empty for the root page.
    pub sheet_path: String,
    pub name: Option<String>,
    /// Printed page label; orphan pages have none.
    pub page: Option<String>,
}

impl SheetPage {
    /// Unique identity of this page within the loaded project.
    pub fn project_path(&self) -> String {
        if self.sheet_path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}:{}", self.filename, self.sheet_path)
        }
    }
}

/// One sheet instance whose child document is loaded, keyed by
/// `instance_path + "/" + sheet_uuid`.
#[derive(Debug, Clone)]
struct SheetOccurrence {
    key: String,
    sheetfile: String,
    sheetname: Option<String>,
    page: Option<String>,
}

/// The loaded project: owns every document, the reference indices, the
/// resolved page tree and the grouped BOM.
///
/// Constructed empty, populated by a single [`load`](Self::load) call,
/// queried read-only thereafter. Re-invoking `load` re-adds new filenames
/// only; partial reset is unsupported.
#[derive(Debug, Default)]
pub struct SchematicHierarchy {
    documents: Vec<Document>,
    index_by_name: HashMap<String, usize>,
    label_name_refs: HashMap<String, Vec<NetRef>>,
    net_item_refs: HashMap<String, NetRef>,
    designator_refs: HashMap<String, String>,
    root_index: Option<usize>,
    pages: Vec<SheetPage>,
    page_index: HashMap<String, usize>,
    bom: Vec<BomGroup>,
}

impl SchematicHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a full set of sources, then resolve the page tree and the BOM.
    ///
    /// Sources whose base filename is already present are skipped without
    /// parsing (first write wins). A parser failure aborts the load and
    /// leaves previously registered documents in place.
    pub fn load<P>(&mut self, sources: &[SchematicSource], parser: &P) -> anyhow::Result<()>
    where
        P: SchematicParser + ?Sized,
    {
        log::debug!("loading {} schematic sources", sources.len());
        for source in sources {
            self.load_source(source, parser)
                .with_context(|| format!("failed to load {}", source.filename))?;
        }

        let found_root = self.resolve_hierarchy();
        self.rebuild_bom(found_root);
        Ok(())
    }

    fn load_source<P>(&mut self, source: &SchematicSource, parser: &P) -> anyhow::Result<()>
    where
        P: SchematicParser + ?Sized,
    {
        let filename = source
            .filename
            .rsplit('/')
            .next()
            .unwrap_or(&source.filename);
        if self.index_by_name.contains_key(filename) {
            log::debug!("duplicate schematic file {filename}, keeping the first occurrence");
            return Ok(());
        }

        let document = parser.parse_document(filename, &source.content)?;
        self.index_labels(&document);
        self.index_by_name
            .insert(filename.to_string(), self.documents.len());
        self.documents.push(document);
        Ok(())
    }

    /// Index every uuid-carrying label of a newly loaded document.
    fn index_labels(&mut self, document: &Document) {
        for label in document.labels() {
            let NetLabel {
                text,
                uuid: Some(uuid),
                ..
            } = label
            else {
                continue;
            };
            let net_ref = NetRef {
                filename: document.filename().to_string(),
                name: text.clone(),
                uuid: uuid.clone(),
            };
            // Cross-document uuid collisions are not expected; last write wins.
            self.net_item_refs.insert(uuid.clone(), net_ref.clone());
            self.label_name_refs
                .entry(text.clone())
                .or_default()
                .push(net_ref);
        }
    }

    /// Discover the root document and rebuild the page list. Returns whether
    /// a true hierarchical root was found.
    fn resolve_hierarchy(&mut self) -> bool {
        log::debug!("resolving hierarchy over {} documents", self.documents.len());
        self.root_index = None;
        self.pages.clear();
        self.page_index.clear();

        // Every document is a candidate ancestor keyed by its identity path.
        let mut doc_by_self_path: HashMap<String, usize> = HashMap::new();
        for (idx, document) in self.documents.iter().enumerate() {
            doc_by_self_path.insert(format!("/{}", document.uuid()), idx);
        }

        // Collect resolvable sheet occurrences, insertion-ordered by key.
        let mut occurrence_slots: HashMap<String, usize> = HashMap::new();
        let mut occurrences: Vec<SheetOccurrence> = Vec::new();
        for document in &self.documents {
            for sheet in document.sheets() {
                let Some(sheetfile) = sheet.sheetfile.as_deref() else {
                    continue;
                };
                if !self.index_by_name.contains_key(sheetfile) {
                    // Recoverable: the occurrence simply never becomes a page.
                    log::debug!(
                        "sheet {} in {} references missing file {sheetfile}, skipping",
                        sheet.uuid,
                        document.filename()
                    );
                    continue;
                }
                for instance in &sheet.instances {
                    let occurrence = SheetOccurrence {
                        key: format!("{}/{}", instance.path, sheet.uuid),
                        sheetfile: sheetfile.to_string(),
                        sheetname: sheet.sheetname.clone(),
                        page: instance.page.clone(),
                    };
                    match occurrence_slots.entry(occurrence.key.clone()) {
                        Entry::Occupied(slot) => occurrences[*slot.get()] = occurrence,
                        Entry::Vacant(slot) => {
                            slot.insert(occurrences.len());
                            occurrences.push(occurrence);
                        }
                    }
                }
            }
        }

        // Shortest path first: raw string length stands in for tree depth, so
        // the first occurrence whose parent path resolves to a document pins
        // the common ancestor. Kept as a length sort for compatibility.
        let mut ordered: Vec<&SheetOccurrence> = occurrences.iter().collect();
        ordered.sort_by_key(|occurrence| occurrence.key.len());

        let mut found_root = false;
        for occurrence in ordered {
            let parent_path = match occurrence.key.rfind('/') {
                Some(cut) => &occurrence.key[..cut],
                None => "",
            };
            if parent_path.is_empty() {
                continue;
            }
            if let Some(&idx) = doc_by_self_path.get(parent_path) {
                log::debug!(
                    "root schematic: {} (parent of {})",
                    self.documents[idx].filename(),
                    occurrence.key
                );
                self.root_index = Some(idx);
                found_root = true;
                break;
            }
        }

        // With a root in hand, every recorded occurrence becomes a page.
        let mut pages: Vec<SheetPage> = Vec::new();
        if let Some(root_idx) = self.root_index {
            let root = &self.documents[root_idx];
            pages.push(SheetPage {
                filename: root.filename().to_string(),
                sheet_path: String::new(),
                name: Some("Root".to_string()),
                page: Some("1".to_string()),
            });
            for occurrence in &occurrences {
                pages.push(SheetPage {
                    filename: occurrence.sheetfile.clone(),
                    sheet_path: occurrence.key.clone(),
                    name: occurrence
                        .sheetname
                        .clone()
                        .or_else(|| Some(occurrence.sheetfile.clone())),
                    page: Some(occurrence.page.clone().unwrap_or_default()),
                });
            }
        }

        pages.sort_by(|a, b| {
            numeric_sort::compare(
                a.page.as_deref().unwrap_or_default(),
                b.page.as_deref().unwrap_or_default(),
            )
        });
        for page in pages {
            self.insert_page(page);
        }

        // Orphan pass: documents never reached by a sheet instance still get
        // one synthetic page each, after the hierarchical ones.
        let referenced: Vec<String> = self.pages.iter().map(|p| p.filename.clone()).collect();
        let orphans: Vec<SheetPage> = self
            .documents
            .iter()
            .filter(|document| !referenced.iter().any(|f| f == document.filename()))
            .map(|document| SheetPage {
                filename: document.filename().to_string(),
                sheet_path: format!("/{}", document.uuid()),
                name: Some(document.filename().to_string()),
                page: None,
            })
            .collect();
        for page in orphans {
            self.insert_page(page);
        }

        found_root
    }

    fn insert_page(&mut self, page: SheetPage) {
        match self.page_index.entry(page.project_path()) {
            Entry::Occupied(slot) => self.pages[*slot.get()] = page,
            Entry::Vacant(slot) => {
                slot.insert(self.pages.len());
                self.pages.push(page);
            }
        }
    }

    /// Collect and group BOM items. With a true root, documents are visited
    /// per page (each physical sheet instantiation counts); without one,
    /// every loaded document is visited once in load order.
    fn rebuild_bom(&mut self, found_root: bool) {
        if self.documents.is_empty() {
            self.designator_refs.clear();
            self.bom.clear();
            return;
        }

        let mut visitor = BomVisitor::new();
        if found_root {
            for page in &self.pages {
                if let Some(&idx) = self.index_by_name.get(&page.filename) {
                    self.documents[idx].visit(&mut visitor);
                }
            }
        } else {
            for document in &self.documents {
                document.visit(&mut visitor);
            }
        }

        let (items, designators) = visitor.into_parts();
        log::debug!("collected {} raw BOM items", items.len());
        self.designator_refs = designators;
        self.bom = bom::group_bom_items(items);
    }

    /// The resolved root document.
    ///
    /// With no discovered root, a single loaded document is the trivial
    /// root; anything else is ambiguous and fails.
    pub fn root_document(&self) -> Result<&Document, HierarchyError> {
        if let Some(idx) = self.root_index {
            return Ok(&self.documents[idx]);
        }
        match self.documents.as_slice() {
            [only] => Ok(only),
            _ => Err(HierarchyError::NoRoot),
        }
    }

    /// The first page in insertion order; the de facto root page even when
    /// no hierarchical root was discoverable.
    pub fn root_page(&self) -> Option<&SheetPage> {
        self.pages.first()
    }

    /// All pages in resolved order.
    pub fn pages(&self) -> impl Iterator<Item = &SheetPage> {
        self.pages.iter()
    }

    pub fn page_by_path(&self, project_path: &str) -> Option<&SheetPage> {
        self.page_index
            .get(project_path)
            .map(|&idx| &self.pages[idx])
    }

    pub fn document(&self, filename: &str) -> Option<&Document> {
        self.index_by_name
            .get(filename)
            .map(|&idx| &self.documents[idx])
    }

    /// All documents in load order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// The grouped BOM, in first-seen-key order.
    pub fn bom(&self) -> &[BomGroup] {
        &self.bom
    }

    /// All references to a label text, in index insertion order.
    pub fn labels_by_name(&self, name: &str) -> &[NetRef] {
        self.label_name_refs
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn net_item(&self, uuid: &str) -> Option<&NetRef> {
        self.net_item_refs.get(uuid)
    }

    /// Uuid of the symbol owning a reference designator.
    pub fn designator(&self, reference: &str) -> Option<&str> {
        self.designator_refs.get(reference).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
