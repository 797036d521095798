//! Static catalog of IFC element classes.
//!
//! Merges the quantity-relevant class list, the unit of measure per class,
//! the viewer material colors, and the STEP-name to display-name mapping.

/// One IFC element class the processor knows about.
#[derive(Debug, Clone, Copy)]
pub struct ElementClass {
    /// Uppercase STEP type name as it appears in the file.
    pub step_name: &'static str,
    /// Canonical schema spelling, e.g. `IfcWall`.
    pub ifc_name: &'static str,
    /// Unit of measure used in the quantity table.
    pub unit: &'static str,
    /// Viewer material color as a hex string.
    pub color: &'static str,
}

/// Classes included in element processing and the quantity take-off.
pub const ELEMENT_CLASSES: &[ElementClass] = &[
    ElementClass { step_name: "IFCWALL", ifc_name: "IfcWall", unit: "m²", color: "#cccccc" },
    ElementClass { step_name: "IFCSLAB", ifc_name: "IfcSlab", unit: "m²", color: "#e0e0e0" },
    ElementClass { step_name: "IFCCOLUMN", ifc_name: "IfcColumn", unit: "units", color: "#888888" },
    ElementClass { step_name: "IFCBEAM", ifc_name: "IfcBeam", unit: "m", color: "#996633" },
    ElementClass { step_name: "IFCDOOR", ifc_name: "IfcDoor", unit: "units", color: "#8B4513" },
    ElementClass { step_name: "IFCWINDOW", ifc_name: "IfcWindow", unit: "units", color: "#87CEEB" },
    ElementClass { step_name: "IFCSTAIR", ifc_name: "IfcStair", unit: "units", color: "#696969" },
    ElementClass { step_name: "IFCSTAIRFLIGHT", ifc_name: "IfcStairFlight", unit: "units", color: "#556B2F" },
    ElementClass { step_name: "IFCRAILING", ifc_name: "IfcRailing", unit: "m", color: "#CD853F" },
    ElementClass { step_name: "IFCRAMP", ifc_name: "IfcRamp", unit: "m²", color: "#808080" },
    ElementClass { step_name: "IFCROOF", ifc_name: "IfcRoof", unit: "m²", color: "#654321" },
    ElementClass { step_name: "IFCCURTAINWALL", ifc_name: "IfcCurtainWall", unit: "m²", color: "#B0C4DE" },
    ElementClass { step_name: "IFCMEMBER", ifc_name: "IfcMember", unit: "m", color: "#778899" },
    ElementClass { step_name: "IFCPLATE", ifc_name: "IfcPlate", unit: "m²", color: "#A0A0A0" },
    ElementClass { step_name: "IFCCOVERING", ifc_name: "IfcCovering", unit: "m²", color: "#F5F5DC" },
    ElementClass { step_name: "IFCFLOWTERMINAL", ifc_name: "IfcFlowTerminal", unit: "units", color: "#FF6347" },
    ElementClass { step_name: "IFCBUILDINGELEMENTPROXY", ifc_name: "IfcBuildingElementProxy", unit: "units", color: "#DDA0DD" },
    ElementClass { step_name: "IFCFURNISHINGELEMENT", ifc_name: "IfcFurnishingElement", unit: "units", color: "#F0E68C" },
    ElementClass { step_name: "IFCSPACE", ifc_name: "IfcSpace", unit: "m³", color: "#E6E6FA" },
];

/// Display names for product classes that carry geometry but are not part
/// of the quantity take-off.
const EXTRA_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("IFCWALLSTANDARDCASE", "IfcWallStandardCase"),
    ("IFCSLABSTANDARDCASE", "IfcSlabStandardCase"),
    ("IFCFOOTING", "IfcFooting"),
    ("IFCPILE", "IfcPile"),
    ("IFCBUILDINGELEMENTPART", "IfcBuildingElementPart"),
    ("IFCDISTRIBUTIONELEMENT", "IfcDistributionElement"),
    ("IFCFLOWSEGMENT", "IfcFlowSegment"),
    ("IFCFLOWFITTING", "IfcFlowFitting"),
    ("IFCFLOWCONTROLLER", "IfcFlowController"),
    ("IFCOPENINGELEMENT", "IfcOpeningElement"),
    ("IFCANNOTATION", "IfcAnnotation"),
    ("IFCSITE", "IfcSite"),
    ("IFCTRANSPORTELEMENT", "IfcTransportElement"),
];

pub const DEFAULT_UNIT: &str = "units";
pub const DEFAULT_COLOR: &str = "#999999";

/// Look up a quantity-relevant class by its uppercase STEP name.
pub fn lookup(step_name: &str) -> Option<&'static ElementClass> {
    ELEMENT_CLASSES.iter().find(|c| c.step_name == step_name)
}

/// Whether a STEP type participates in element processing.
pub fn is_relevant(step_name: &str) -> bool {
    lookup(step_name).is_some()
}

/// Unit of measure for a canonical class name, e.g. `IfcWall` → `m²`.
pub fn unit_of_measure(ifc_name: &str) -> &'static str {
    ELEMENT_CLASSES
        .iter()
        .find(|c| c.ifc_name == ifc_name)
        .map_or(DEFAULT_UNIT, |c| c.unit)
}

/// Viewer material color for a canonical class name.
pub fn material_color(ifc_name: &str) -> &'static str {
    ELEMENT_CLASSES
        .iter()
        .find(|c| c.ifc_name == ifc_name)
        .map_or(DEFAULT_COLOR, |c| c.color)
}

/// Canonical display name for any STEP type name.
///
/// Falls back to `Ifc` plus the capitalized remainder for types outside the
/// catalog, e.g. `IFCSENSOR` → `IfcSensor`.
pub fn display_name(step_name: &str) -> String {
    if let Some(class) = lookup(step_name) {
        return class.ifc_name.to_string();
    }
    if let Some(&(_, name)) = EXTRA_DISPLAY_NAMES.iter().find(|(s, _)| *s == step_name) {
        return name.to_string();
    }
    match step_name.strip_prefix("IFC") {
        Some(rest) if !rest.is_empty() => {
            let mut name = String::with_capacity(step_name.len());
            name.push_str("Ifc");
            let mut chars = rest.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
            }
            name.push_str(&chars.as_str().to_ascii_lowercase());
            name
        }
        _ => step_name.to_string(),
    }
}
