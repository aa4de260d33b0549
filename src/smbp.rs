//! `.smbp` project export for EcoStruxure Machine Expert - Basic.
//!
//! The document skeleton and its metadata are fixed; only the rung and memory-bit
//! collections come from the [`LogicResponse`]. All text goes through the writer's
//! escaping, so comments and symbols may contain markup characters.

use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use crate::constants::{
    SMBP_CPU_REFERENCE, SMBP_HARDWARE_ID, SMBP_MANAGEMENT_LEVEL, SMBP_POU_NAME,
    SMBP_PROJECT_NAME, SMBP_PROJECT_VERSION, SMBP_SECTION_NUMBER,
};
use crate::schema::{LadderElement, LogicResponse, Rung, Variable};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serializes `logic` into the vendor XML document.
pub fn serialize(logic: &LogicResponse) -> String {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut writer, logic).expect("writing XML into a Vec cannot fail");
    String::from_utf8(writer.into_inner()).expect("XML built from UTF-8 strings is UTF-8")
}

/// The file body offered for download: a UTF-8 byte-order mark followed by the document.
pub fn to_download_bytes(logic: &LogicResponse) -> Vec<u8> {
    let xml = serialize(logic);
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + xml.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(xml.as_bytes());
    bytes
}

fn write_document<W: Write>(w: &mut Writer<W>, logic: &LogicResponse) -> io::Result<()> {
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    w.create_element("ProjectDescriptor")
        .with_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"))
        .with_attribute(("xmlns:xsd", "http://www.w3.org/2001/XMLSchema"))
        .write_inner_content(|w| {
            text_element(w, "ProjectVersion", SMBP_PROJECT_VERSION)?;
            text_element(w, "ManagementLevel", SMBP_MANAGEMENT_LEVEL)?;
            text_element(w, "Name", SMBP_PROJECT_NAME)?;
            w.create_element("SoftwareConfiguration")
                .write_inner_content(|w| {
                    write_program(w, &logic.rungs)?;
                    write_memory_bits(w, &logic.variables)
                })?;
            write_hardware(w)
        })?;
    Ok(())
}

fn write_program<W: Write>(w: &mut Writer<W>, rungs: &[Rung]) -> io::Result<()> {
    w.create_element("Pous").write_inner_content(|w| {
        w.create_element("ProgramOrganizationUnits")
            .write_inner_content(|w| {
                text_element(w, "Name", SMBP_POU_NAME)?;
                text_element(w, "SectionNumber", SMBP_SECTION_NUMBER)?;
                w.create_element("Rungs").write_inner_content(|w| {
                    rungs.iter().try_for_each(|rung| write_rung(w, rung))
                })?;
                Ok(())
            })?;
        Ok(())
    })?;
    Ok(())
}

fn write_rung<W: Write>(w: &mut Writer<W>, rung: &Rung) -> io::Result<()> {
    w.create_element("RungEntity").write_inner_content(|w| {
        w.create_element("LadderElements").write_inner_content(|w| {
            rung.elements.iter().try_for_each(|el| write_ladder_entity(w, el))
        })?;
        w.create_element("InstructionLines")
            .write_inner_content(|w| {
                for line in &rung.instruction_lines {
                    w.create_element("InstructionLineEntity")
                        .write_inner_content(|w| text_element(w, "InstructionLine", line))?;
                }
                Ok(())
            })?;
        text_element(w, "Name", &rung.name)?;
        text_element(w, "MainComment", &rung.comment)?;
        text_element(w, "IsLadderSelected", "true")
    })?;
    Ok(())
}

fn write_ladder_entity<W: Write>(w: &mut Writer<W>, el: &LadderElement) -> io::Result<()> {
    w.create_element("LadderEntity").write_inner_content(|w| {
        text_element(w, "ElementType", el.kind.as_str())?;
        text_element(w, "Descriptor", &el.descriptor)?;
        text_element(w, "Symbol", &el.symbol)?;
        text_element(w, "Row", &el.row.to_string())?;
        text_element(w, "Column", &el.column.to_string())?;
        text_element(w, "ChosenConnection", el.connection.as_str())
    })?;
    Ok(())
}

// The variable type has no slot in the MemoryBit record.
fn write_memory_bits<W: Write>(w: &mut Writer<W>, variables: &[Variable]) -> io::Result<()> {
    w.create_element("MemoryBits").write_inner_content(|w| {
        for variable in variables {
            w.create_element("MemoryBit").write_inner_content(|w| {
                text_element(w, "Address", &variable.address)?;
                text_element(w, "Symbol", &variable.symbol)?;
                text_element(w, "Comment", &variable.comment)
            })?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_hardware<W: Write>(w: &mut Writer<W>) -> io::Result<()> {
    w.create_element("HardwareConfiguration")
        .write_inner_content(|w| {
            w.create_element("Plc").write_inner_content(|w| {
                w.create_element("Cpu").write_inner_content(|w| {
                    text_element(w, "Reference", SMBP_CPU_REFERENCE)?;
                    text_element(w, "HardwareId", SMBP_HARDWARE_ID)
                })?;
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(())
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    w.create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Connection, ElementKind};

    fn coil(descriptor: &str) -> LadderElement {
        LadderElement {
            kind: ElementKind::Coil,
            descriptor: descriptor.to_string(),
            symbol: String::new(),
            row: 0,
            column: 10,
            connection: Connection::Left,
        }
    }

    fn example_logic() -> LogicResponse {
        LogicResponse {
            description: "init".to_string(),
            variables: vec![Variable {
                id: String::new(),
                address: "%M0".to_string(),
                symbol: "Start".to_string(),
                data_type: "BOOL".to_string(),
                comment: "start bit".to_string(),
            }],
            rungs: vec![Rung {
                name: "R1".to_string(),
                comment: "init".to_string(),
                elements: vec![coil("Start")],
                instruction_lines: vec!["LD %I0.0".to_string(), "ST %M0".to_string()],
            }],
            instruction_list: "LD %I0.0\nST %M0".to_string(),
            ladder_logic_steps: vec![],
        }
    }

    #[test]
    fn test_example_scenario() {
        let xml = serialize(&example_logic());

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert_eq!(xml.matches("<MemoryBit>").count(), 1);
        assert!(xml.contains("<Address>%M0</Address>"));
        assert!(xml.contains("<Comment>start bit</Comment>"));
        assert_eq!(xml.matches("<RungEntity>").count(), 1);
        assert!(xml.contains("<Name>R1</Name>"));
        assert!(xml.contains("<MainComment>init</MainComment>"));
        assert_eq!(xml.matches("<LadderEntity>").count(), 1);
        assert!(xml.contains("<ElementType>Coil</ElementType>"));
        assert!(xml.contains("<Column>10</Column>"));
        assert!(xml.contains("<ChosenConnection>Left</ChosenConnection>"));
        assert_eq!(xml.matches("<InstructionLineEntity>").count(), 2);
        assert!(xml.contains("<InstructionLine>LD %I0.0</InstructionLine>"));
        assert!(xml.contains("<IsLadderSelected>true</IsLadderSelected>"));
    }

    #[test]
    fn test_static_metadata() {
        let xml = serialize(&example_logic());
        assert!(xml.contains(r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#));
        assert!(xml.contains("<ProjectVersion>3.0.0.0</ProjectVersion>"));
        assert!(xml.contains("<ManagementLevel>FunctLevelMan21_0</ManagementLevel>"));
        assert!(xml.contains("<Name>AI_Generated_M221</Name>"));
        assert!(xml.contains("<Name>MainProgram</Name>"));
        assert!(xml.contains("<SectionNumber>1</SectionNumber>"));
        assert!(xml.contains("<Reference>TM221CE16T</Reference>"));
        assert!(xml.contains("<HardwareId>1929</HardwareId>"));
    }

    #[test]
    fn test_variable_type_is_not_emitted() {
        let xml = serialize(&example_logic());
        assert!(!xml.contains("BOOL"));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let logic = example_logic();
        assert_eq!(serialize(&logic), serialize(&logic));
    }

    #[test]
    fn test_counts_and_order_follow_input() {
        let mut logic = example_logic();
        for name in ["R2", "R3"] {
            logic.rungs.push(Rung {
                name: name.to_string(),
                comment: String::new(),
                elements: vec![coil(name), coil(name)],
                instruction_lines: vec![],
            });
        }
        for address in ["%M1", "%M2", "%M3"] {
            logic.variables.push(Variable {
                id: String::new(),
                address: address.to_string(),
                symbol: format!("Bit{}", address),
                data_type: "BOOL".to_string(),
                comment: String::new(),
            });
        }

        let xml = serialize(&logic);
        assert_eq!(xml.matches("<RungEntity>").count(), 3);
        assert_eq!(xml.matches("<MemoryBit>").count(), 4);
        assert_eq!(xml.matches("<LadderEntity>").count(), 5);

        let r1 = xml.find("<Name>R1</Name>").unwrap();
        let r2 = xml.find("<Name>R2</Name>").unwrap();
        let r3 = xml.find("<Name>R3</Name>").unwrap();
        assert!(r1 < r2 && r2 < r3);
        let m0 = xml.find("<Address>%M0</Address>").unwrap();
        let m3 = xml.find("<Address>%M3</Address>").unwrap();
        assert!(m0 < m3);
    }

    #[test]
    fn test_empty_rung_keeps_its_block() {
        let mut logic = example_logic();
        logic.rungs = vec![Rung {
            name: "Empty".to_string(),
            comment: String::new(),
            elements: vec![],
            instruction_lines: vec![],
        }];

        let xml = serialize(&logic);
        assert_eq!(xml.matches("<RungEntity>").count(), 1);
        assert_eq!(xml.matches("<LadderElements>").count(), 1);
        assert_eq!(xml.matches("<InstructionLines>").count(), 1);
        assert_eq!(xml.matches("<LadderEntity>").count(), 0);
        assert_eq!(xml.matches("<InstructionLineEntity>").count(), 0);
        assert!(xml.contains("<Name>Empty</Name>"));
    }

    #[test]
    fn test_empty_logic_keeps_skeleton() {
        let mut logic = example_logic();
        logic.rungs.clear();
        logic.variables.clear();

        let xml = serialize(&logic);
        assert!(xml.contains("<Rungs>"));
        assert!(xml.contains("<MemoryBits>"));
        assert_eq!(xml.matches("<RungEntity>").count(), 0);
        assert!(xml.trim_end().ends_with("</ProjectDescriptor>"));
    }

    #[test]
    fn test_markup_in_text_is_escaped() {
        let mut logic = example_logic();
        logic.rungs[0].comment = r#"if a < b & "c""#.to_string();
        logic.rungs[0].elements[0].descriptor = "<Coil>".to_string();
        logic.variables[0].comment = "</Comment><Evil>".to_string();

        let xml = serialize(&logic);
        // Quotes are legal in text content; only their surroundings matter here.
        assert!(xml.contains("<MainComment>if a &lt; b &amp; "));
        assert_eq!(xml.matches("</MainComment>").count(), 1);
        assert!(xml.contains("<Descriptor>&lt;Coil&gt;</Descriptor>"));
        assert!(!xml.contains("<Evil>"));
        assert_eq!(xml.matches("<Comment>").count(), 1);
        assert_eq!(xml.matches("</Comment>").count(), 1);
    }

    #[test]
    fn test_download_bytes_start_with_bom() {
        let logic = example_logic();
        let bytes = to_download_bytes(&logic);
        assert_eq!(&bytes[..3], UTF8_BOM);
        assert_eq!(&bytes[3..], serialize(&logic).as_bytes());
    }
}
