//! BOM collection and grouping.
//!
//! The visitor records one raw [`BomItem`] per electrical symbol; grouping
//! then folds items that share the same (footprint, name, DNP) triple into a
//! single [`BomGroup`] row, keeping the first-seen order of keys.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::{SchematicSymbol, SchematicVisitor};

/// One raw symbol occurrence, before grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct BomItem {
    pub name: String,
    pub datasheet: String,
    pub description: String,
    pub footprint: String,
    pub dnp: bool,
    /// Reference designator of this single occurrence.
    pub reference: String,
}

impl BomItem {
    pub fn from_symbol(symbol: &SchematicSymbol) -> Self {
        Self {
            name: symbol.value.clone(),
            datasheet: symbol.datasheet.clone(),
            description: symbol.description.clone(),
            footprint: symbol.footprint.clone(),
            dnp: symbol.dnp,
            reference: symbol.reference.clone(),
        }
    }
}

/// One deduplicated BOM row: all occurrences of one physical part.
#[derive(Debug, Clone, PartialEq)]
pub struct BomGroup {
    pub name: String,
    pub datasheet: String,
    pub description: String,
    pub footprint: String,
    pub dnp: bool,
    references: Vec<String>,
}

impl BomGroup {
    fn seeded_from(item: &BomItem) -> Self {
        Self {
            name: item.name.clone(),
            datasheet: item.datasheet.clone(),
            description: item.description.clone(),
            footprint: item.footprint.clone(),
            dnp: item.dnp,
            references: Vec::new(),
        }
    }

    fn add_reference(&mut self, reference: String) {
        self.references.push(reference);
    }

    /// Designators in visitation order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Number of physical occurrences of this part.
    pub fn quantity(&self) -> usize {
        self.references.len()
    }

    /// All designators joined for display, empty ones filtered out.
    pub fn reference(&self) -> String {
        self.references
            .iter()
            .filter(|reference| !reference.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(",\n")
    }

    /// Placeholder: pricing is resolved downstream, never here.
    pub fn price(&self) -> u32 {
        0
    }
}

impl Serialize for BomGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("BomGroup", 8)?;
        row.serialize_field("Name", &self.name)?;
        row.serialize_field("Datasheet", &self.datasheet)?;
        row.serialize_field("Description", &self.description)?;
        row.serialize_field("Footprint", &self.footprint)?;
        row.serialize_field("DNP", &self.dnp)?;
        row.serialize_field("Price", &self.price())?;
        row.serialize_field("Quantity", &self.quantity())?;
        row.serialize_field("Designators", &self.references)?;
        row.end()
    }
}

/// Collects raw BOM items and the designator index from visited documents.
#[derive(Debug, Default)]
pub struct BomVisitor {
    items: Vec<BomItem>,
    designators: HashMap<String, String>,
}

impl BomVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[BomItem] {
        &self.items
    }

    /// Consume the visitor: raw items in visitation order plus the
    /// designator → symbol uuid index.
    pub fn into_parts(self) -> (Vec<BomItem>, HashMap<String, String>) {
        (self.items, self.designators)
    }
}

impl SchematicVisitor for BomVisitor {
    fn visit_symbol(&mut self, symbol: &SchematicSymbol) {
        // Power symbols carry nets, not parts; in_bom=no is an explicit
        // author opt-out. Neither contributes a designator entry.
        if symbol.is_power() || !symbol.in_bom {
            return;
        }
        self.designators
            .insert(symbol.reference.clone(), symbol.uuid.clone());
        self.items.push(BomItem::from_symbol(symbol));
    }
}

/// Fold raw items into groups keyed by (footprint, name, DNP).
///
/// Group order is first-seen-key order, a determinism contract callers rely
/// on given a fixed visitation order.
pub fn group_bom_items<I>(items: I) -> Vec<BomGroup>
where
    I: IntoIterator<Item = BomItem>,
{
    let mut slots: HashMap<(String, String, bool), usize> = HashMap::new();
    let mut groups: Vec<BomGroup> = Vec::new();

    for item in items {
        let key = (item.footprint.clone(), item.name.clone(), item.dnp);
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(BomGroup::seeded_from(&item));
                slots.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].add_reference(item.reference);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, SchematicNode};

    fn item(name: &str, footprint: &str, dnp: bool, reference: &str) -> BomItem {
        BomItem {
            name: name.to_string(),
            datasheet: String::new(),
            description: String::new(),
            footprint: footprint.to_string(),
            dnp,
            reference: reference.to_string(),
        }
    }

    #[test]
    fn equal_keys_share_a_group() {
        let groups = group_bom_items(vec![
            item("10k", "R_0603", false, "R1"),
            item("100n", "C_0603", false, "C1"),
            item("10k", "R_0603", false, "R2"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].quantity(), 2);
        assert_eq!(groups[0].references(), ["R1", "R2"]);
        assert_eq!(groups[1].references(), ["C1"]);
    }

    #[test]
    fn dnp_splits_otherwise_equal_keys() {
        let groups = group_bom_items(vec![
            item("10k", "R_0603", false, "R1"),
            item("10k", "R_0603", true, "R2"),
        ]);
        assert_eq!(groups.len(), 2);
        assert!(!groups[0].dnp);
        assert!(groups[1].dnp);
    }

    #[test]
    fn group_order_is_first_seen() {
        let groups = group_bom_items(vec![
            item("ESP32", "QFN", false, "U1"),
            item("10k", "R_0603", false, "R1"),
            item("ESP32", "QFN", false, "U2"),
        ]);
        assert_eq!(groups[0].name, "ESP32");
        assert_eq!(groups[1].name, "10k");
    }

    #[test]
    fn grouping_is_deterministic_for_fixed_input() {
        let items = vec![
            item("10k", "R_0603", false, "R1"),
            item("10k", "R_0603", false, "R2"),
            item("100n", "C_0603", false, "C1"),
        ];
        let first = group_bom_items(items.clone());
        let second = group_bom_items(items);
        assert_eq!(first, second);
    }

    #[test]
    fn quantity_matches_reference_count() {
        let groups = group_bom_items(vec![
            item("10k", "R_0603", false, "R1"),
            item("10k", "R_0603", false, "R2"),
            item("10k", "R_0603", false, "R3"),
        ]);
        assert_eq!(groups[0].quantity(), groups[0].references().len());
        assert_eq!(groups[0].quantity(), 3);
    }

    #[test]
    fn display_reference_filters_empty_designators() {
        let groups = group_bom_items(vec![
            item("10k", "R_0603", false, "R1"),
            item("10k", "R_0603", false, ""),
            item("10k", "R_0603", false, "R2"),
        ]);
        assert_eq!(groups[0].reference(), "R1,\nR2");
        // The empty designator still counts as an occurrence.
        assert_eq!(groups[0].quantity(), 3);
    }

    #[test]
    fn serializes_to_the_wire_shape() {
        let groups = group_bom_items(vec![item("10k", "R_0603", false, "R1")]);
        let json = serde_json::to_value(&groups[0]).unwrap();
        assert_eq!(json["Name"], "10k");
        assert_eq!(json["Footprint"], "R_0603");
        assert_eq!(json["DNP"], false);
        assert_eq!(json["Price"], 0);
        assert_eq!(json["Quantity"], 1);
        assert_eq!(json["Designators"], serde_json::json!(["R1"]));
    }

    #[test]
    fn visitor_skips_power_and_excluded_symbols() {
        let doc = Document::new(
            "top.kicad_sch",
            "u1",
            vec![
                SchematicNode::Symbol(SchematicSymbol {
                    uuid: "s1".to_string(),
                    lib_id: "Device:R".to_string(),
                    reference: "R1".to_string(),
                    value: "10k".to_string(),
                    in_bom: true,
                    ..Default::default()
                }),
                SchematicNode::Symbol(SchematicSymbol {
                    uuid: "s2".to_string(),
                    lib_id: "power:GND".to_string(),
                    reference: "#PWR01".to_string(),
                    in_bom: true,
                    ..Default::default()
                }),
                SchematicNode::Symbol(SchematicSymbol {
                    uuid: "s3".to_string(),
                    lib_id: "Mechanical:Hole".to_string(),
                    reference: "H1".to_string(),
                    in_bom: false,
                    ..Default::default()
                }),
            ],
        );

        let mut visitor = BomVisitor::new();
        doc.visit(&mut visitor);
        let (items, designators) = visitor.into_parts();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].reference, "R1");
        assert_eq!(designators.get("R1").map(String::as_str), Some("s1"));
        assert!(!designators.contains_key("#PWR01"));
        assert!(!designators.contains_key("H1"));
    }
}
