//! Bounding-box geometry extraction for 3D visualization.
//!
//! Instead of tessellating solids, this walks the representation graph of
//! each product: extruded area solids, bounding boxes, and mapped items are
//! handled structurally, and anything else degrades to collecting every
//! reachable cartesian point. The resulting world-space bounding boxes are
//! what the viewer renders.
//!
//! Output coordinates follow the viewer convention: the IFC Z-up axes are
//! swapped to Y-up (Y and Z exchanged).

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::catalog;
use super::file::{IfcFile, GLOBAL_ID_ATTR, NAME_ATTR, OBJECT_PLACEMENT_ATTR, REPRESENTATION_ATTR};
use super::parser::{Attr, Entity};

/// Geometry smaller than 1mm in any axis is treated as degenerate.
pub const MIN_SIZE_THRESHOLD: f64 = 0.001;

/// Stand-in box edge length (1cm) when no usable geometry is found.
const DEFAULT_BOX_SIZE: f64 = MIN_SIZE_THRESHOLD * 10.0;

// Recursion guards for malformed placement chains and entity graphs.
const MAX_PLACEMENT_DEPTH: usize = 64;
const MAX_GRAPH_DEPTH: usize = 24;

/// Axis-aligned bounding box in viewer coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub center: [f64; 3],
    pub size: [f64; 3],
}

impl BoundingBox {
    fn from_points(points: &[[f64; 3]]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        let mut size = [0.0; 3];
        let mut center = [0.0; 3];
        for axis in 0..3 {
            size[axis] = (max[axis] - min[axis]).max(MIN_SIZE_THRESHOLD);
            center[axis] = (min[axis] + max[axis]) / 2.0;
        }
        Some(Self {
            min,
            max,
            center,
            size,
        })
    }

    /// Default box used when bounding-box computation fails entirely.
    pub fn fallback() -> Self {
        let half = DEFAULT_BOX_SIZE / 2.0;
        Self {
            min: [0.0; 3],
            max: [DEFAULT_BOX_SIZE; 3],
            center: [half; 3],
            size: [DEFAULT_BOX_SIZE; 3],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.size.iter().all(|s| *s >= MIN_SIZE_THRESHOLD)
    }
}

/// One renderable element of the simplified model.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryElement {
    /// Lowercased type without the `ifc` prefix, e.g. `wall`.
    #[serde(rename = "type")]
    pub kind: String,
    /// IFC GlobalId.
    pub id: String,
    pub name: String,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
    #[serde(rename = "ifcType")]
    pub ifc_type: String,
    pub color: String,
    /// Filled in from the processed element records.
    pub element_key: Option<String>,
    pub level_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeometryMetadata {
    #[serde(rename = "totalInFile")]
    pub total_in_file: usize,
    #[serde(rename = "withGeometry")]
    pub with_geometry: usize,
    pub processed: usize,
    #[serde(rename = "elementTypes")]
    pub element_types: BTreeMap<String, usize>,
    #[serde(rename = "projectName")]
    pub project_name: String,
}

/// The simplified model shipped to the 3D viewer.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryModel {
    #[serde(rename = "type")]
    pub model_type: &'static str,
    pub elements: Vec<GeometryElement>,
    #[serde(rename = "totalElements")]
    pub total_elements: usize,
    pub metadata: GeometryMetadata,
}

/// Row-indexed 4x4 transform: `m.0[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [[f64; 4]; 4]);

impl Mat4 {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Build from orthonormal axes and a translation.
    fn from_axes(x: [f64; 3], y: [f64; 3], z: [f64; 3], t: [f64; 3]) -> Self {
        Self([
            [x[0], y[0], z[0], t[0]],
            [x[1], y[1], z[1], t[1]],
            [x[2], y[2], z[2], t[2]],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn multiply(&self, other: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[row][k] * other.0[k][col]).sum();
            }
        }
        Self(out)
    }

    pub fn transform(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (row, value) in out.iter_mut().enumerate() {
            *value = self.0[row][0] * p[0]
                + self.0[row][1] * p[1]
                + self.0[row][2] * p[2]
                + self.0[row][3];
        }
        out
    }

    /// Z component of the translation, the storey elevation source.
    pub fn translation_z(&self) -> f64 {
        self.0[2][3]
    }
}

/// Extracts the simplified geometry model from a parsed file.
#[derive(Debug)]
pub struct GeometryExtractor<'a> {
    file: &'a IfcFile,
}

impl<'a> GeometryExtractor<'a> {
    pub fn new(file: &'a IfcFile) -> Self {
        Self { file }
    }

    pub fn extract(&self) -> GeometryModel {
        let products = self.file.products();
        let with_geometry: Vec<&Entity> = products
            .iter()
            .copied()
            .filter(|e| self.file.has_geometry(e))
            .collect();

        tracing::info!(
            total = products.len(),
            with_geometry = with_geometry.len(),
            "extracting geometry"
        );

        let mut elements = Vec::new();
        let mut element_types: BTreeMap<String, usize> = BTreeMap::new();

        for product in &with_geometry {
            let bounding_box = self.element_bounding_box(product).unwrap_or_else(|| {
                tracing::debug!(id = product.id, ty = %product.ty, "no usable geometry");
                BoundingBox::fallback()
            });
            if !bounding_box.is_valid() {
                continue;
            }

            let ifc_type = catalog::display_name(&product.ty);
            let kind = ifc_type.to_lowercase().replacen("ifc", "", 1);
            let global_id = product
                .string(GLOBAL_ID_ATTR)
                .map(str::to_string)
                .unwrap_or_else(|| product.id.to_string());
            let name = product
                .string(NAME_ATTR)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}_{}", ifc_type, product.id));

            *element_types.entry(ifc_type.clone()).or_insert(0) += 1;
            elements.push(GeometryElement {
                kind,
                id: global_id,
                name,
                bounding_box,
                color: catalog::material_color(&ifc_type).to_string(),
                ifc_type,
                element_key: None,
                level_id: None,
            });
        }

        for (ty, count) in &element_types {
            tracing::debug!(ty = %ty, count, "element type extracted");
        }
        tracing::info!(processed = elements.len(), "geometry extraction complete");

        GeometryModel {
            model_type: "SimpleIFCModel",
            total_elements: elements.len(),
            metadata: GeometryMetadata {
                total_in_file: products.len(),
                with_geometry: with_geometry.len(),
                processed: elements.len(),
                element_types,
                project_name: self.project_name(),
            },
            elements,
        }
    }

    /// World-space bounding box of one product, in viewer axes.
    fn element_bounding_box(&self, product: &Entity) -> Option<BoundingBox> {
        let placement = self.placement_matrix(product.reference(OBJECT_PLACEMENT_ATTR));
        let shape = product
            .reference(REPRESENTATION_ATTR)
            .and_then(|id| self.file.entity(id))?;

        let mut points = Vec::new();
        let mut visited = HashSet::new();
        // IFCPRODUCTDEFINITIONSHAPE.Representations -> IFCSHAPEREPRESENTATION.Items
        for representation in shape.list(2).unwrap_or_default() {
            let Some(representation) = self.file.resolve(representation) else {
                continue;
            };
            for item in representation.list(3).unwrap_or_default() {
                if let Some(item) = self.file.resolve(item) {
                    self.collect_item_points(item, &mut points, &mut visited, 0);
                }
            }
        }
        if points.is_empty() {
            return None;
        }

        let world: Vec<[f64; 3]> = points
            .into_iter()
            .map(|p| swap_yz(placement.transform(p)))
            .collect();
        BoundingBox::from_points(&world)
    }

    /// Compose the `IFCLOCALPLACEMENT` chain into a single matrix.
    pub fn placement_matrix(&self, placement_id: Option<u64>) -> Mat4 {
        self.placement_matrix_at(placement_id, 0)
    }

    fn placement_matrix_at(&self, placement_id: Option<u64>, depth: usize) -> Mat4 {
        if depth > MAX_PLACEMENT_DEPTH {
            return Mat4::IDENTITY;
        }
        let Some(placement) = placement_id.and_then(|id| self.file.entity(id)) else {
            return Mat4::IDENTITY;
        };
        if placement.ty != "IFCLOCALPLACEMENT" {
            return Mat4::IDENTITY;
        }
        // (PlacementRelTo, RelativePlacement)
        let parent = self.placement_matrix_at(placement.reference(0), depth + 1);
        let local = placement
            .reference(1)
            .and_then(|id| self.file.entity(id))
            .map_or(Mat4::IDENTITY, |axis| self.axis_placement_matrix(axis));
        parent.multiply(&local)
    }

    /// Matrix for `IFCAXIS2PLACEMENT3D` / `IFCAXIS2PLACEMENT2D`.
    fn axis_placement_matrix(&self, placement: &Entity) -> Mat4 {
        let location = placement
            .reference(0)
            .and_then(|id| self.file.entity(id))
            .and_then(|p| self.cartesian_point(p))
            .unwrap_or([0.0; 3]);

        match placement.ty.as_str() {
            "IFCAXIS2PLACEMENT3D" => {
                let z = self
                    .direction(placement.attr(1))
                    .unwrap_or([0.0, 0.0, 1.0]);
                let z = normalize(z).unwrap_or([0.0, 0.0, 1.0]);
                let reference = self
                    .direction(placement.attr(2))
                    .unwrap_or([1.0, 0.0, 0.0]);
                // Gram-Schmidt: project the reference direction off Z.
                let proj = dot(reference, z);
                let x_raw = [
                    reference[0] - proj * z[0],
                    reference[1] - proj * z[1],
                    reference[2] - proj * z[2],
                ];
                let x = normalize(x_raw)
                    .or_else(|| normalize(cross([0.0, 1.0, 0.0], z)))
                    .or_else(|| normalize(cross([1.0, 0.0, 0.0], z)))
                    .unwrap_or([1.0, 0.0, 0.0]);
                let y = cross(z, x);
                Mat4::from_axes(x, y, z, location)
            }
            "IFCAXIS2PLACEMENT2D" => {
                let x = self
                    .direction(placement.attr(1))
                    .and_then(normalize)
                    .unwrap_or([1.0, 0.0, 0.0]);
                let y = [-x[1], x[0], 0.0];
                Mat4::from_axes([x[0], x[1], 0.0], y, [0.0, 0.0, 1.0], location)
            }
            _ => Mat4::IDENTITY,
        }
    }

    /// Collect local-space points for one representation item.
    fn collect_item_points(
        &self,
        item: &Entity,
        out: &mut Vec<[f64; 3]>,
        visited: &mut HashSet<u64>,
        depth: usize,
    ) {
        if depth > MAX_GRAPH_DEPTH || !visited.insert(item.id) {
            return;
        }
        match item.ty.as_str() {
            // (SweptArea, Position, ExtrudedDirection, Depth)
            "IFCEXTRUDEDAREASOLID" => {
                let profile_points = item
                    .reference(0)
                    .and_then(|id| self.file.entity(id))
                    .map(|profile| self.profile_points(profile, visited, depth + 1))
                    .unwrap_or_default();
                if profile_points.is_empty() {
                    return;
                }
                let position = item
                    .reference(1)
                    .and_then(|id| self.file.entity(id))
                    .map_or(Mat4::IDENTITY, |axis| self.axis_placement_matrix(axis));
                let direction = self
                    .direction(item.attr(2))
                    .and_then(normalize)
                    .unwrap_or([0.0, 0.0, 1.0]);
                let extrusion_depth = item.real(3).unwrap_or(0.0);
                for p in profile_points {
                    out.push(position.transform(p));
                    out.push(position.transform([
                        p[0] + direction[0] * extrusion_depth,
                        p[1] + direction[1] * extrusion_depth,
                        p[2] + direction[2] * extrusion_depth,
                    ]));
                }
            }
            // (Corner, XDim, YDim, ZDim)
            "IFCBOUNDINGBOX" => {
                let corner = item
                    .reference(0)
                    .and_then(|id| self.file.entity(id))
                    .and_then(|p| self.cartesian_point(p))
                    .unwrap_or([0.0; 3]);
                let dx = item.real(1).unwrap_or(0.0);
                let dy = item.real(2).unwrap_or(0.0);
                let dz = item.real(3).unwrap_or(0.0);
                for ix in [0.0, dx] {
                    for iy in [0.0, dy] {
                        for iz in [0.0, dz] {
                            out.push([corner[0] + ix, corner[1] + iy, corner[2] + iz]);
                        }
                    }
                }
            }
            // (MappingSource, MappingTarget)
            "IFCMAPPEDITEM" => {
                let mut source_points = Vec::new();
                if let Some(map) = item.reference(0).and_then(|id| self.file.entity(id)) {
                    // IFCREPRESENTATIONMAP: (MappingOrigin, MappedRepresentation)
                    if let Some(representation) =
                        map.reference(1).and_then(|id| self.file.entity(id))
                    {
                        for mapped in representation.list(3).unwrap_or_default() {
                            if let Some(mapped) = self.file.resolve(mapped) {
                                self.collect_item_points(
                                    mapped,
                                    &mut source_points,
                                    visited,
                                    depth + 1,
                                );
                            }
                        }
                    }
                }
                // IFCCARTESIANTRANSFORMATIONOPERATOR3D:
                // (Axis1, Axis2, LocalOrigin, Scale, Axis3)
                let (origin, scale) = item
                    .reference(1)
                    .and_then(|id| self.file.entity(id))
                    .map_or(([0.0; 3], 1.0), |op| {
                        let origin = op
                            .reference(2)
                            .and_then(|id| self.file.entity(id))
                            .and_then(|p| self.cartesian_point(p))
                            .unwrap_or([0.0; 3]);
                        (origin, op.real(3).unwrap_or(1.0))
                    });
                for p in source_points {
                    out.push([
                        p[0] * scale + origin[0],
                        p[1] * scale + origin[1],
                        p[2] * scale + origin[2],
                    ]);
                }
            }
            "IFCCARTESIANPOINT" => {
                if let Some(p) = self.cartesian_point(item) {
                    out.push(p);
                }
            }
            // Breps, shell models, polylines and the rest: every cartesian
            // point reachable from the item contributes to the box.
            _ => {
                for attr in &item.attrs {
                    self.collect_attr_points(attr, out, visited, depth + 1);
                }
            }
        }
    }

    fn collect_attr_points(
        &self,
        attr: &Attr,
        out: &mut Vec<[f64; 3]>,
        visited: &mut HashSet<u64>,
        depth: usize,
    ) {
        if depth > MAX_GRAPH_DEPTH {
            return;
        }
        match attr {
            Attr::Ref(id) => {
                if let Some(entity) = self.file.entity(*id) {
                    self.collect_item_points(entity, out, visited, depth);
                }
            }
            Attr::List(items) => {
                for item in items {
                    self.collect_attr_points(item, out, visited, depth);
                }
            }
            _ => {}
        }
    }

    /// Corner points of a swept profile, in the profile's XY plane.
    fn profile_points(
        &self,
        profile: &Entity,
        visited: &mut HashSet<u64>,
        depth: usize,
    ) -> Vec<[f64; 3]> {
        match profile.ty.as_str() {
            // (ProfileType, ProfileName, Position, XDim, YDim)
            "IFCRECTANGLEPROFILEDEF" => {
                let position = profile
                    .reference(2)
                    .and_then(|id| self.file.entity(id))
                    .map_or(Mat4::IDENTITY, |axis| self.axis_placement_matrix(axis));
                let hx = profile.real(3).unwrap_or(0.0) / 2.0;
                let hy = profile.real(4).unwrap_or(0.0) / 2.0;
                [[-hx, -hy], [-hx, hy], [hx, -hy], [hx, hy]]
                    .into_iter()
                    .map(|[x, y]| position.transform([x, y, 0.0]))
                    .collect()
            }
            // (ProfileType, ProfileName, Position, Radius)
            "IFCCIRCLEPROFILEDEF" => {
                let position = profile
                    .reference(2)
                    .and_then(|id| self.file.entity(id))
                    .map_or(Mat4::IDENTITY, |axis| self.axis_placement_matrix(axis));
                let r = profile.real(3).unwrap_or(0.0);
                [[-r, -r], [-r, r], [r, -r], [r, r]]
                    .into_iter()
                    .map(|[x, y]| position.transform([x, y, 0.0]))
                    .collect()
            }
            // (ProfileType, ProfileName, OuterCurve) and anything else:
            // gather the curve's cartesian points.
            _ => {
                let mut points = Vec::new();
                for attr in &profile.attrs {
                    self.collect_attr_points(attr, &mut points, visited, depth);
                }
                points
            }
        }
    }

    fn cartesian_point(&self, entity: &Entity) -> Option<[f64; 3]> {
        if entity.ty != "IFCCARTESIANPOINT" {
            return None;
        }
        let coords = entity.list(0)?;
        let mut point = [0.0; 3];
        for (axis, value) in coords.iter().take(3).enumerate() {
            point[axis] = value.as_f64()?;
        }
        Some(point)
    }

    fn direction(&self, attr: Option<&Attr>) -> Option<[f64; 3]> {
        let entity = attr.and_then(|a| self.file.resolve(a))?;
        if entity.ty != "IFCDIRECTION" {
            return None;
        }
        let ratios = entity.list(0)?;
        let mut direction = [0.0; 3];
        for (axis, value) in ratios.iter().take(3).enumerate() {
            direction[axis] = value.as_f64()?;
        }
        Some(direction)
    }

    fn project_name(&self) -> String {
        self.file
            .by_type("IFCPROJECT")
            .first()
            .and_then(|p| p.string(NAME_ATTR))
            .filter(|name| !name.is_empty())
            .unwrap_or("IFC Project")
            .to_string()
    }
}

/// IFC is Z-up, the viewer is Y-up.
fn swap_yz(p: [f64; 3]) -> [f64; 3] {
    [p[0], p[2], p[1]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f64; 3]) -> Option<[f64; 3]> {
    let len = dot(v, v).sqrt();
    if len < 1e-9 {
        None
    } else {
        Some([v[0] / len, v[1] / len, v[2] / len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifc::IfcFile;

    const DEMO: &str = include_str!("../../tests/fixtures/demo.ifc");

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    fn extract_demo() -> GeometryModel {
        let file = IfcFile::from_source(DEMO).unwrap();
        GeometryExtractor::new(&file).extract()
    }

    #[test]
    fn placement_chain_composes_translations() {
        let file = IfcFile::from_source(DEMO).unwrap();
        let extractor = GeometryExtractor::new(&file);
        // #13 = ground placement (origin) relative to #11, offset (0,0,3).
        let matrix = extractor.placement_matrix(Some(13));
        assert!(close(matrix.transform([0.0; 3]), [0.0, 0.0, 3.0]));
        assert_eq!(matrix.translation_z(), 3.0);
    }

    #[test]
    fn extracts_wall_box_from_extruded_rectangle() {
        let model = extract_demo();
        let wall = model.elements.iter().find(|e| e.ifc_type == "IfcWall").unwrap();
        // 4.0 x 0.3 profile extruded 2.7 up, placed at (1,1,0), Y/Z swapped.
        assert!(close(wall.bounding_box.min, [-1.0, 0.0, 0.85]));
        assert!(close(wall.bounding_box.max, [3.0, 2.7, 1.15]));
        assert!(close(wall.bounding_box.size, [4.0, 2.7, 0.3]));
        assert!(close(wall.bounding_box.center, [1.0, 1.35, 1.0]));
        assert_eq!(wall.kind, "wall");
        assert_eq!(wall.id, "3Wall00000000000000001");
        assert_eq!(wall.color, "#cccccc");
    }

    #[test]
    fn extracts_door_box_from_bounding_box_item() {
        let model = extract_demo();
        let door = model.elements.iter().find(|e| e.ifc_type == "IfcDoor").unwrap();
        assert!(close(door.bounding_box.min, [2.0, 3.1, 0.5]));
        assert!(close(door.bounding_box.max, [2.9, 5.2, 0.7]));
    }

    #[test]
    fn falls_back_to_reachable_points_for_curves() {
        let model = extract_demo();
        let footing = model
            .elements
            .iter()
            .find(|e| e.ifc_type == "IfcFooting")
            .unwrap();
        assert!(close(footing.bounding_box.min, [0.0, -0.5, 0.0]));
        assert!(close(footing.bounding_box.max, [6.0, 0.0, 4.0]));
        // Footing color comes from the catalog default.
        assert_eq!(footing.color, catalog::DEFAULT_COLOR);
    }

    #[test]
    fn metadata_counts_products_and_types() {
        let model = extract_demo();
        assert_eq!(model.total_elements, 3);
        assert_eq!(model.metadata.total_in_file, 5);
        assert_eq!(model.metadata.with_geometry, 3);
        assert_eq!(model.metadata.processed, 3);
        assert_eq!(model.metadata.element_types["IfcWall"], 1);
        assert_eq!(model.metadata.element_types["IfcDoor"], 1);
        assert_eq!(model.metadata.element_types["IfcFooting"], 1);
        assert_eq!(model.metadata.project_name, "Demo Tower");
    }

    #[test]
    fn degenerate_sizes_are_clamped_to_threshold() {
        let bbox = BoundingBox::from_points(&[[1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(bbox.size, [MIN_SIZE_THRESHOLD; 3]);
        assert!(bbox.is_valid());
        assert_eq!(bbox.min, [1.0, 2.0, 3.0]);
        assert_eq!(bbox.max, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn fallback_box_is_one_centimeter() {
        let bbox = BoundingBox::fallback();
        assert_eq!(bbox.size, [0.01; 3]);
        assert_eq!(bbox.center, [0.005; 3]);
        assert!(bbox.is_valid());
    }

    #[test]
    fn unresolvable_representation_gets_fallback_box() {
        // The extruded solid has no profile, so no points can be collected.
        let source = "ISO-10303-21;\n\
            HEADER;\n\
            FILE_DESCRIPTION((''),'2;1');\n\
            FILE_NAME('','',(''),(''),'','','');\n\
            FILE_SCHEMA(('IFC4'));\n\
            ENDSEC;\n\
            DATA;\n\
            #5=IFCCARTESIANPOINT((0.,0.,0.));\n\
            #10=IFCAXIS2PLACEMENT3D(#5,$,$);\n\
            #11=IFCLOCALPLACEMENT($,#10);\n\
            #36=IFCEXTRUDEDAREASOLID($,#10,$,2.7);\n\
            #37=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#36));\n\
            #38=IFCPRODUCTDEFINITIONSHAPE($,$,(#37));\n\
            #39=IFCWALL('2NoProfileWall00000001',$,'Wall',$,$,#11,#38,$);\n\
            ENDSEC;\n\
            END-ISO-10303-21;\n";
        let file = IfcFile::from_source(source).unwrap();
        let model = GeometryExtractor::new(&file).extract();

        // The wall must still appear in the model, not silently vanish.
        assert_eq!(model.total_elements, 1);
        assert_eq!(model.metadata.with_geometry, 1);
        assert_eq!(model.metadata.processed, 1);
        let wall = &model.elements[0];
        assert_eq!(wall.ifc_type, "IfcWall");
        assert_eq!(wall.bounding_box, BoundingBox::fallback());
    }

    #[test]
    fn serializes_with_viewer_field_names() {
        let model = extract_demo();
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["type"], "SimpleIFCModel");
        assert!(json["totalElements"].is_number());
        assert!(json["metadata"]["projectName"].is_string());
        let element = &json["elements"][0];
        assert!(element["boundingBox"]["min"].is_array());
        assert!(element["ifcType"].is_string());
    }
}
