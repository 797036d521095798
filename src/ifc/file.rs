//! Parsed IFC file with the derived indexes element processing relies on.

use std::collections::HashMap;
use std::path::Path;

use super::parser::{self, Attr, Entity, ParseError, StepData};
use super::IfcError;

// Attribute positions shared by IfcProduct subtypes.
pub const GLOBAL_ID_ATTR: usize = 0;
pub const NAME_ATTR: usize = 2;
pub const OBJECT_PLACEMENT_ATTR: usize = 5;
pub const REPRESENTATION_ATTR: usize = 6;

/// An opened IFC model.
///
/// Wraps the raw STEP data with reverse indexes for spatial containment
/// (`IFCRELCONTAINEDINSPATIALSTRUCTURE`) and property definitions
/// (`IFCRELDEFINESBYPROPERTIES`), both built once at open time.
#[derive(Debug)]
pub struct IfcFile {
    step: StepData,
    containment: HashMap<u64, u64>,
    property_definitions: HashMap<u64, Vec<u64>>,
}

impl IfcFile {
    /// Read and parse an IFC file from disk.
    ///
    /// STEP files are nominally ISO 8859-1; anything outside ASCII is read
    /// lossily since non-ASCII content only occurs inside string attributes
    /// that modern exporters encode with escape directives anyway.
    pub fn open(path: &Path) -> Result<Self, IfcError> {
        let bytes = std::fs::read(path)?;
        let source = String::from_utf8_lossy(&bytes);
        Ok(Self::from_source(&source)?)
    }

    /// Parse an IFC model from in-memory source text.
    pub fn from_source(source: &str) -> Result<Self, ParseError> {
        let step = parser::parse(source)?;

        let mut containment = HashMap::new();
        for rel in ids_of(&step, "IFCRELCONTAINEDINSPATIALSTRUCTURE") {
            let Some(rel) = step.entities.get(&rel) else {
                continue;
            };
            let storey = rel
                .reference(5)
                .and_then(|id| step.entities.get(&id))
                .filter(|e| e.ty == "IFCBUILDINGSTOREY");
            let Some(storey) = storey else { continue };
            for related in rel.list(4).unwrap_or_default() {
                if let Some(element_id) = related.as_ref_id() {
                    containment.insert(element_id, storey.id);
                }
            }
        }

        let mut property_definitions: HashMap<u64, Vec<u64>> = HashMap::new();
        for rel in ids_of(&step, "IFCRELDEFINESBYPROPERTIES") {
            let Some(rel) = step.entities.get(&rel) else {
                continue;
            };
            let Some(definition) = rel.reference(5) else {
                continue;
            };
            for related in rel.list(4).unwrap_or_default() {
                if let Some(element_id) = related.as_ref_id() {
                    property_definitions
                        .entry(element_id)
                        .or_default()
                        .push(definition);
                }
            }
        }

        Ok(Self {
            step,
            containment,
            property_definitions,
        })
    }

    /// Schema identifier from the file header, e.g. `IFC4`.
    pub fn schema(&self) -> &str {
        &self.step.header.schema
    }

    pub fn header(&self) -> &parser::Header {
        &self.step.header
    }

    pub fn entity(&self, id: u64) -> Option<&Entity> {
        self.step.entities.get(&id)
    }

    /// Resolve an attribute to the entity it references.
    pub fn resolve(&self, attr: &Attr) -> Option<&Entity> {
        attr.as_ref_id().and_then(|id| self.entity(id))
    }

    /// All instances of an exact uppercase type name, in file order.
    pub fn by_type(&self, ty: &str) -> Vec<&Entity> {
        self.step
            .by_type
            .get(ty)
            .map(|ids| ids.iter().filter_map(|id| self.entity(*id)).collect())
            .unwrap_or_default()
    }

    /// Whether an entity is an `IfcProduct` subtype instance.
    ///
    /// The parser carries no schema, so this checks the shared product
    /// attribute layout: the placement slot referencing an
    /// `IFCLOCALPLACEMENT`.
    pub fn is_product(&self, entity: &Entity) -> bool {
        entity
            .reference(OBJECT_PLACEMENT_ATTR)
            .and_then(|id| self.entity(id))
            .is_some_and(|p| p.ty == "IFCLOCALPLACEMENT" || p.ty == "IFCGRIDPLACEMENT")
    }

    /// Whether a product carries a shape representation.
    pub fn has_geometry(&self, entity: &Entity) -> bool {
        entity
            .reference(REPRESENTATION_ATTR)
            .and_then(|id| self.entity(id))
            .is_some_and(|s| s.ty == "IFCPRODUCTDEFINITIONSHAPE")
    }

    /// All product instances, ordered by instance id.
    pub fn products(&self) -> Vec<&Entity> {
        let mut products: Vec<&Entity> = self
            .step
            .entities
            .values()
            .filter(|e| self.is_product(e))
            .collect();
        products.sort_by_key(|e| e.id);
        products
    }

    /// Products that carry geometry, ordered by instance id.
    pub fn products_with_geometry(&self) -> Vec<&Entity> {
        self.products()
            .into_iter()
            .filter(|e| self.has_geometry(e))
            .collect()
    }

    /// The `IFCBUILDINGSTOREY` id an element is assigned to, if any.
    pub fn containing_storey(&self, element_id: u64) -> Option<u64> {
        self.containment.get(&element_id).copied()
    }

    /// Property set / element quantity ids attached to an element.
    pub fn property_definition_ids(&self, element_id: u64) -> &[u64] {
        self.property_definitions
            .get(&element_id)
            .map_or(&[], Vec::as_slice)
    }
}

fn ids_of(step: &StepData, ty: &str) -> Vec<u64> {
    step.by_type.get(ty).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../tests/fixtures/demo.ifc");

    #[test]
    fn open_builds_containment_index() {
        let file = IfcFile::from_source(DEMO).unwrap();
        // Wall #39 and footing #56 are contained in storey #20.
        assert_eq!(file.containing_storey(39), Some(20));
        assert_eq!(file.containing_storey(56), Some(20));
        // Door #47 is placed but never assigned to a storey.
        assert_eq!(file.containing_storey(47), None);
    }

    #[test]
    fn open_builds_property_index() {
        let file = IfcFile::from_source(DEMO).unwrap();
        // The wall carries one property set and one quantity set.
        assert_eq!(file.property_definition_ids(39), &[73, 76]);
        assert!(file.property_definition_ids(47).is_empty());
    }

    #[test]
    fn distinguishes_products_and_geometry_carriers() {
        let file = IfcFile::from_source(DEMO).unwrap();
        let products: Vec<u64> = file.products().iter().map(|e| e.id).collect();
        // Storeys, wall, door, footing. The project has no placement.
        assert_eq!(products, vec![20, 21, 39, 47, 56]);

        let with_geometry: Vec<u64> = file
            .products_with_geometry()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(with_geometry, vec![39, 47, 56]);
    }

    #[test]
    fn exposes_schema_and_type_lookup() {
        let file = IfcFile::from_source(DEMO).unwrap();
        assert_eq!(file.schema(), "IFC4");
        assert_eq!(file.by_type("IFCBUILDINGSTOREY").len(), 2);
        assert!(file.by_type("IFCWINDOW").is_empty());
    }
}
