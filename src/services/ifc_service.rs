//! End-to-end IFC processing.
//!
//! Runs the full pipeline over one file: levels, elements, quantity table,
//! project info, geometry, then maps element keys and level assignments onto
//! the geometry elements for the viewer.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::ifc::geometry::{GeometryExtractor, GeometryModel};
use crate::ifc::processor::{ElementRecord, Level, Processor, ProjectInfo, QuantityTable};
use crate::ifc::{IfcError, IfcFile};

/// Everything the upload endpoint returns for one processed file.
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    pub levels: Vec<Level>,
    pub elements: Vec<ElementRecord>,
    pub quantity_table: QuantityTable,
    pub geometry: GeometryModel,
    pub project_info: ProjectInfo,
}

/// Open and process an IFC file from disk.
pub fn process_file(path: &Path) -> Result<ProcessReport, IfcError> {
    tracing::info!(path = %path.display(), "processing IFC file");
    let file = IfcFile::open(path)?;
    Ok(process(&file))
}

/// Process an already opened model.
pub fn process(file: &IfcFile) -> ProcessReport {
    let mut processor = Processor::new(file);
    let levels = processor.levels().to_vec();
    let elements = processor.process_elements();
    let quantity_table = processor.quantity_table();
    let project_info = processor.project_info();

    let mut geometry = GeometryExtractor::new(file).extract();
    enhance_geometry(&mut geometry, &elements);

    tracing::info!(
        levels = levels.len(),
        elements = elements.len(),
        "processing complete"
    );

    ProcessReport {
        levels,
        elements,
        quantity_table,
        geometry,
        project_info,
    }
}

/// Attach `element_key` and `level_id` from the processed element records to
/// the geometry elements, matched by GlobalId. Elements outside the relevant
/// classes get a `<IfcType>_default` key and no level.
fn enhance_geometry(geometry: &mut GeometryModel, elements: &[ElementRecord]) {
    let mapping: HashMap<&str, (&str, Option<u64>)> = elements
        .iter()
        .filter(|e| !e.global_id.is_empty())
        .map(|e| (e.global_id.as_str(), (e.element_key.as_str(), e.level_id)))
        .collect();

    for element in &mut geometry.elements {
        match mapping.get(element.id.as_str()) {
            Some((element_key, level_id)) => {
                element.element_key = Some((*element_key).to_string());
                element.level_id = *level_id;
            }
            None => {
                element.element_key = Some(format!("{}_default", element.ifc_type));
                element.level_id = None;
            }
        }
    }
    tracing::info!(count = geometry.elements.len(), "enhanced geometry elements");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DEMO: &str = include_str!("../../tests/fixtures/demo.ifc");

    #[test]
    fn report_links_geometry_to_element_records() {
        let file = IfcFile::from_source(DEMO).unwrap();
        let report = process(&file);

        let wall_record = report
            .elements
            .iter()
            .find(|e| e.element_type == "IfcWall")
            .unwrap();
        let wall_geometry = report
            .geometry
            .elements
            .iter()
            .find(|e| e.ifc_type == "IfcWall")
            .unwrap();
        assert_eq!(
            wall_geometry.element_key.as_deref(),
            Some(wall_record.element_key.as_str())
        );
        assert_eq!(wall_geometry.level_id, wall_record.level_id);
    }

    #[test]
    fn unmatched_geometry_gets_default_key() {
        let file = IfcFile::from_source(DEMO).unwrap();
        let report = process(&file);

        let footing = report
            .geometry
            .elements
            .iter()
            .find(|e| e.ifc_type == "IfcFooting")
            .unwrap();
        assert_eq!(footing.element_key.as_deref(), Some("IfcFooting_default"));
        assert_eq!(footing.level_id, None);
    }

    #[test]
    fn report_serializes_expected_sections() {
        let file = IfcFile::from_source(DEMO).unwrap();
        let json = serde_json::to_value(process(&file)).unwrap();
        for section in [
            "levels",
            "elements",
            "quantity_table",
            "geometry",
            "project_info",
        ] {
            assert!(json.get(section).is_some(), "missing section {section}");
        }
        assert_eq!(json["project_info"]["name"], "Demo Tower");
        assert_eq!(json["quantity_table"]["table_data"][1]["unit_of_measure"], "m²");
    }

    #[test]
    fn process_file_reads_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(DEMO.as_bytes()).unwrap();
        let report = process_file(tmp.path()).unwrap();
        assert_eq!(report.levels.len(), 2);
    }

    #[test]
    fn process_file_rejects_non_step_content() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"definitely not an IFC file").unwrap();
        assert!(matches!(
            process_file(tmp.path()),
            Err(IfcError::Parse(_))
        ));
    }

    #[test]
    fn process_file_surfaces_io_errors() {
        assert!(matches!(
            process_file(Path::new("/nonexistent/model.ifc")),
            Err(IfcError::Io(_))
        ));
    }
}
