//! Building levels, element records, and the quantity take-off table.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog;
use super::file::{IfcFile, GLOBAL_ID_ATTR, NAME_ATTR, OBJECT_PLACEMENT_ATTR};
use super::geometry::GeometryExtractor;
use super::parser::Entity;

/// Property and quantity names that count as element dimensions.
const DIMENSION_PROPERTIES: &[&str] = &[
    "Length",
    "Width",
    "Height",
    "Thickness",
    "Area",
    "Volume",
    "Depth",
];

/// A building storey, ordered by elevation.
#[derive(Debug, Clone, Serialize)]
pub struct Level {
    pub id: u64,
    pub name: String,
    pub elevation: f64,
    pub global_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementQuantities {
    #[serde(rename = "Count")]
    pub count: f64,
}

/// One processed building element.
#[derive(Debug, Clone, Serialize)]
pub struct ElementRecord {
    pub id: u64,
    pub global_id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub level_id: Option<u64>,
    /// Positive dimension values, rounded to 2 decimals, keyed by name.
    pub dimensions: BTreeMap<String, f64>,
    pub quantities: ElementQuantities,
    /// Grouping key: element type plus its sorted dimensions.
    pub element_key: String,
}

/// One row of the quantity take-off table.
#[derive(Debug, Clone, Serialize)]
pub struct QuantityRow {
    pub element_key: String,
    pub element_type: String,
    pub unit_of_measure: String,
    pub total_quantity: u64,
    pub level_quantities: BTreeMap<u64, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuantityTable {
    pub table_data: Vec<QuantityRow>,
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: Option<String>,
    pub schema: String,
}

#[derive(Debug, Default)]
struct RowAccumulator {
    element_type: String,
    total: u64,
    per_level: BTreeMap<u64, u64>,
}

/// Walks the model once: levels first, then elements, accumulating the
/// quantity table as a side effect of element processing.
#[derive(Debug)]
pub struct Processor<'a> {
    file: &'a IfcFile,
    extractor: GeometryExtractor<'a>,
    levels: Vec<Level>,
    rows: BTreeMap<String, RowAccumulator>,
}

impl<'a> Processor<'a> {
    pub fn new(file: &'a IfcFile) -> Self {
        let extractor = GeometryExtractor::new(file);

        let mut levels: Vec<Level> = file
            .by_type("IFCBUILDINGSTOREY")
            .into_iter()
            .map(|storey| {
                let elevation = extractor
                    .placement_matrix(storey.reference(OBJECT_PLACEMENT_ATTR))
                    .translation_z();
                Level {
                    id: storey.id,
                    name: storey
                        .string(NAME_ATTR)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Level {}", storey.id)),
                    elevation,
                    global_id: storey
                        .string(GLOBAL_ID_ATTR)
                        .unwrap_or_default()
                        .to_string(),
                }
            })
            .collect();
        levels.sort_by(|a, b| {
            a.elevation
                .partial_cmp(&b.elevation)
                .unwrap_or(Ordering::Equal)
        });
        tracing::info!(count = levels.len(), "found building levels");

        Self {
            file,
            extractor,
            levels,
            rows: BTreeMap::new(),
        }
    }

    /// Building storeys sorted by elevation.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Process every relevant element that carries geometry.
    ///
    /// Also feeds the quantity accumulator, so [`Self::quantity_table`] is
    /// meaningful only after this has run.
    pub fn process_elements(&mut self) -> Vec<ElementRecord> {
        let products = self.file.products_with_geometry();
        let relevant: Vec<&Entity> = products
            .into_iter()
            .filter(|e| catalog::is_relevant(&e.ty))
            .collect();
        tracing::info!(count = relevant.len(), "processing relevant elements");

        let mut records = Vec::with_capacity(relevant.len());
        for element in relevant {
            let record = self.process_single(element);
            let row = self
                .rows
                .entry(record.element_key.clone())
                .or_default();
            row.element_type = record.element_type.clone();
            row.total += 1;
            if let Some(level_id) = record.level_id {
                *row.per_level.entry(level_id).or_insert(0) += 1;
            }
            records.push(record);
        }

        tracing::info!(count = records.len(), "elements processed");
        records
    }

    fn process_single(&self, element: &Entity) -> ElementRecord {
        let element_type = catalog::display_name(&element.ty);
        let dimensions = self.dimensions(element);
        let element_key = element_key(&element_type, &dimensions);

        ElementRecord {
            id: element.id,
            global_id: element
                .string(GLOBAL_ID_ATTR)
                .unwrap_or_default()
                .to_string(),
            name: element
                .string(NAME_ATTR)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}_{}", element_type, element.id)),
            level_id: self.element_level(element),
            dimensions,
            quantities: ElementQuantities { count: 1.0 },
            element_key,
            element_type,
        }
    }

    /// Storey assignment: explicit containment first, then the closest
    /// level by placement height.
    fn element_level(&self, element: &Entity) -> Option<u64> {
        if let Some(storey) = self.file.containing_storey(element.id) {
            return Some(storey);
        }
        let placement = element.reference(OBJECT_PLACEMENT_ATTR)?;
        let z = self
            .extractor
            .placement_matrix(Some(placement))
            .translation_z();
        self.closest_level(z)
    }

    fn closest_level(&self, z: f64) -> Option<u64> {
        self.levels
            .iter()
            .min_by(|a, b| {
                (z - a.elevation)
                    .abs()
                    .partial_cmp(&(z - b.elevation).abs())
                    .unwrap_or(Ordering::Equal)
            })
            .map(|level| level.id)
    }

    /// Dimension values from attached property sets and element quantities.
    fn dimensions(&self, element: &Entity) -> BTreeMap<String, f64> {
        let mut dimensions = BTreeMap::new();
        for definition_id in self.file.property_definition_ids(element.id) {
            let Some(definition) = self.file.entity(*definition_id) else {
                continue;
            };
            match definition.ty.as_str() {
                // (GlobalId, OwnerHistory, Name, Description, HasProperties)
                "IFCPROPERTYSET" => {
                    for property in definition.list(4).unwrap_or_default() {
                        let Some(property) = self.file.resolve(property) else {
                            continue;
                        };
                        if property.ty != "IFCPROPERTYSINGLEVALUE" {
                            continue;
                        }
                        // (Name, Description, NominalValue, Unit)
                        record_dimension(
                            &mut dimensions,
                            property.string(0),
                            property.real(2),
                        );
                    }
                }
                // (GlobalId, OwnerHistory, Name, Description,
                //  MethodOfMeasurement, Quantities)
                "IFCELEMENTQUANTITY" => {
                    for quantity in definition.list(5).unwrap_or_default() {
                        let Some(quantity) = self.file.resolve(quantity) else {
                            continue;
                        };
                        // IFCQUANTITYLENGTH/AREA/VOLUME:
                        // (Name, Description, Unit, Value)
                        record_dimension(
                            &mut dimensions,
                            quantity.string(0),
                            quantity.real(3),
                        );
                    }
                }
                _ => {}
            }
        }
        dimensions
    }

    /// Final quantity table; run [`Self::process_elements`] first.
    pub fn quantity_table(&self) -> QuantityTable {
        if self.rows.is_empty() {
            tracing::warn!("no quantity data available");
        }
        let mut table_data: Vec<QuantityRow> = self
            .rows
            .iter()
            .map(|(element_key, row)| QuantityRow {
                element_key: element_key.clone(),
                element_type: row.element_type.clone(),
                unit_of_measure: catalog::unit_of_measure(&row.element_type).to_string(),
                total_quantity: row.total,
                level_quantities: row.per_level.clone(),
            })
            .collect();
        table_data.sort_by(|a, b| a.element_type.cmp(&b.element_type));

        tracing::info!(rows = table_data.len(), "generated quantity table");
        QuantityTable {
            table_data,
            levels: self.levels.clone(),
        }
    }

    pub fn project_info(&self) -> ProjectInfo {
        let project = self.file.by_type("IFCPROJECT").into_iter().next();
        ProjectInfo {
            name: project
                .and_then(|p| p.string(NAME_ATTR))
                .filter(|n| !n.is_empty())
                .unwrap_or("Unnamed Project")
                .to_string(),
            description: project
                .and_then(|p| p.string(3))
                .map(str::to_string),
            schema: self.file.schema().to_string(),
        }
    }
}

fn record_dimension(
    dimensions: &mut BTreeMap<String, f64>,
    name: Option<&str>,
    value: Option<f64>,
) {
    let (Some(name), Some(value)) = (name, value) else {
        return;
    };
    if value > 0.0 && DIMENSION_PROPERTIES.contains(&name) {
        dimensions.insert(name.to_string(), round2(value));
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `IfcWall_Height:2.7-Length:4`, or `IfcWall_default` without dimensions.
pub fn element_key(element_type: &str, dimensions: &BTreeMap<String, f64>) -> String {
    if dimensions.is_empty() {
        return format!("{element_type}_default");
    }
    let parts: Vec<String> = dimensions
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect();
    format!("{element_type}_{}", parts.join("-"))
}
