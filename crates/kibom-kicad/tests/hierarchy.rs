//! End-to-end: parse a three-file design, resolve the hierarchy, check the
//! page tree, BOM and root-document queries the CLI relies on.

use kibom_kicad::KicadParser;
use kibom_sch::{SchematicHierarchy, SchematicSource};

const TOP: &str = r#"
    (kicad_sch (version 20231120) (generator "eeschema")
      (uuid "root-uuid")
      (symbol (lib_id "MCU_Module:ESP32") (at 10 10 0)
        (in_bom yes) (dnp no)
        (uuid "mcu-1")
        (property "Reference" "U1")
        (property "Value" "ESP32-WROOM")
        (property "Footprint" "Module:ESP32")
        (property "Datasheet" "https://example.com/esp32.pdf"))
      (hierarchical_label "EN" (at 0 0 0) (uuid "hl-en"))
      (sheet (at 50 50)
        (uuid "sheet-power")
        (property "Sheetname" "Power")
        (property "Sheetfile" "power.kicad_sch")
        (instances (project "demo" (path "/root-uuid" (page "2")))))
      (sheet (at 80 50)
        (uuid "sheet-io")
        (property "Sheetname" "IO")
        (property "Sheetfile" "io.kicad_sch")
        (instances (project "demo" (path "/root-uuid" (page "3")))))
    )
"#;

const POWER: &str = r##"
    (kicad_sch (uuid "power-uuid")
      (symbol (lib_id "Device:R") (uuid "p-r1")
        (in_bom yes) (dnp no)
        (property "Reference" "R1")
        (property "Value" "10k")
        (property "Footprint" "Resistor_SMD:R_0603_1608Metric"))
      (symbol (lib_id "power:GND") (uuid "p-gnd")
        (in_bom yes)
        (property "Reference" "#PWR01")
        (property "Value" "GND"))
      (global_label "VBUS" (at 0 0 0) (uuid "gl-vbus"))
    )
"##;

const IO: &str = r#"
    (kicad_sch (uuid "io-uuid")
      (symbol (lib_id "Device:R") (uuid "i-r2")
        (in_bom yes) (dnp no)
        (property "Reference" "R2")
        (property "Value" "10k")
        (property "Footprint" "Resistor_SMD:R_0603_1608Metric"))
      (symbol (lib_id "Device:C") (uuid "i-c1")
        (in_bom yes) (dnp yes)
        (property "Reference" "C1")
        (property "Value" "100n")
        (property "Footprint" "Capacitor_SMD:C_0603_1608Metric"))
    )
"#;

fn load_design() -> SchematicHierarchy {
    // Shuffled on purpose: load order must not decide the root.
    let sources = vec![
        SchematicSource::new("archive/io.kicad_sch", IO),
        SchematicSource::new("archive/top.kicad_sch", TOP),
        SchematicSource::new("archive/power.kicad_sch", POWER),
    ];
    let mut hierarchy = SchematicHierarchy::new();
    hierarchy.load(&sources, &KicadParser).unwrap();
    hierarchy
}

#[test]
fn resolves_the_root_document() {
    let hierarchy = load_design();
    let root = hierarchy.root_document().unwrap();
    assert_eq!(root.filename(), "top.kicad_sch");
    assert!(kibom_kicad::is_schematic_filename(root.filename()));
}

#[test]
fn builds_the_page_tree_in_page_order() {
    let hierarchy = load_design();
    let pages: Vec<_> = hierarchy.pages().collect();
    assert_eq!(pages.len(), 3);

    assert_eq!(pages[0].filename, "top.kicad_sch");
    assert_eq!(pages[0].sheet_path, "");
    assert_eq!(pages[0].name.as_deref(), Some("Root"));

    assert_eq!(pages[1].filename, "power.kicad_sch");
    assert_eq!(pages[1].sheet_path, "/root-uuid/sheet-power");
    assert_eq!(pages[1].page.as_deref(), Some("2"));

    assert_eq!(pages[2].filename, "io.kicad_sch");
    assert_eq!(pages[2].project_path(), "io.kicad_sch:/root-uuid/sheet-io");
}

#[test]
fn aggregates_the_bom_across_pages() {
    let hierarchy = load_design();
    let bom = hierarchy.bom();

    // ESP32, the shared 10k/0603 resistor, and the DNP capacitor; the power
    // flag symbol never shows up.
    assert_eq!(bom.len(), 3);
    assert_eq!(bom[0].name, "ESP32-WROOM");
    assert_eq!(bom[1].name, "10k");
    assert_eq!(bom[1].quantity(), 2);
    assert_eq!(bom[1].references(), ["R1", "R2"]);
    assert_eq!(bom[2].name, "100n");
    assert!(bom[2].dnp);

    assert_eq!(hierarchy.designator("R1"), Some("p-r1"));
    assert!(hierarchy.designator("#PWR01").is_none());
}

#[test]
fn exposes_root_ports() {
    let hierarchy = load_design();
    let root = hierarchy.root_document().unwrap();

    let labels = root.hierarchical_labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "EN");

    let power = hierarchy.document("power.kicad_sch").unwrap();
    let ports = power.power_symbols();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].reference, "#PWR01");
}

#[test]
fn indexes_labels_across_documents() {
    let hierarchy = load_design();
    assert_eq!(hierarchy.labels_by_name("EN").len(), 1);
    assert_eq!(hierarchy.net_item("gl-vbus").unwrap().filename, "power.kicad_sch");
}
