//! Schema registry — what each research domain extracts.
//!
//! A schema is an ordered, static list of field descriptors. It determines
//! both what the prompt asks the LLM for and how the final answer is
//! validated, so adding a domain means adding a schema here plus a matching
//! tool set and prompt template.

use crate::record::ExtractionRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Marker for a field the pipeline could not populate.
pub const NOT_FOUND: &str = "Not found";

/// A research category with its own schema, tool set, and prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    BasicInfo,
    TechnicalSpecs,
    #[serde(alias = "launch_cost_info")]
    LaunchCost,
}

impl Domain {
    /// Every domain, in display order.
    pub const ALL: [Domain; 3] = [Domain::BasicInfo, Domain::TechnicalSpecs, Domain::LaunchCost];

    /// Stable key used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::BasicInfo => "basic_info",
            Domain::TechnicalSpecs => "technical_specs",
            Domain::LaunchCost => "launch_cost",
        }
    }

    /// Human-readable title.
    pub fn label(&self) -> &'static str {
        match self {
            Domain::BasicInfo => "Basic Information",
            Domain::TechnicalSpecs => "Technical Specifications",
            Domain::LaunchCost => "Launch & Cost",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown domain '{0}' (expected basic_info, technical_specs, or launch_cost)")]
pub struct ParseDomainError(pub String);

impl FromStr for Domain {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "basic_info" | "basic" => Ok(Domain::BasicInfo),
            "technical_specs" | "technical" | "tech_specs" => Ok(Domain::TechnicalSpecs),
            "launch_cost" | "launch_cost_info" | "launch" => Ok(Domain::LaunchCost),
            _ => Err(ParseDomainError(s.to_string())),
        }
    }
}

/// A named, documented slot to be filled.
///
/// A descriptor with children is a group: its value is a nested sub-record
/// holding one entry per child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub children: &'static [FieldDescriptor],
}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            children: &[],
        }
    }

    pub const fn group(
        name: &'static str,
        description: &'static str,
        children: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            description,
            children,
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// The value this field takes when nothing was found.
    pub fn sentinel_value(&self) -> Value {
        if self.is_group() {
            let map = self
                .children
                .iter()
                .map(|c| (c.name.to_string(), c.sentinel_value()))
                .collect();
            Value::Object(map)
        } else {
            Value::String(NOT_FOUND.to_string())
        }
    }

    fn placeholder(&self) -> &'static str {
        if self.name.ends_with("_source") {
            "source URL or 'Not found'"
        } else {
            "value or 'Not found'"
        }
    }
}

/// The ordered field set for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    domain: Domain,
    fields: &'static [FieldDescriptor],
}

impl Schema {
    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Top-level field names, in order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A record with every field set to the sentinel.
    pub fn sentinel_record(&self) -> ExtractionRecord {
        let mut record = ExtractionRecord::new();
        for field in self.fields {
            record.insert(field.name, field.sentinel_value());
        }
        record
    }

    /// The JSON skeleton the LLM is asked to fill in.
    pub fn json_skeleton(&self) -> String {
        let mut out = String::from("{\n");
        write_skeleton_fields(&mut out, self.fields, 1);
        out.push('}');
        out
    }

    /// Machine-checkable output instructions listing every key with its type
    /// and description.
    pub fn format_instructions(&self) -> String {
        let mut out = String::from(
            "The output should be a markdown code snippet formatted in the following schema, \
             including the leading and trailing \"```json\" and \"```\":\n\n```json\n{\n",
        );
        for field in self.fields {
            let kind = if field.is_group() { "object" } else { "string" };
            out.push_str(&format!(
                "\t\"{}\": {}  // {}\n",
                field.name, kind, field.description
            ));
        }
        out.push_str("}\n```");
        out
    }
}

fn write_skeleton_fields(out: &mut String, fields: &[FieldDescriptor], depth: usize) {
    let indent = "    ".repeat(depth);
    for (i, field) in fields.iter().enumerate() {
        let comma = if i + 1 < fields.len() { "," } else { "" };
        if field.is_group() {
            out.push_str(&format!("{indent}\"{}\": {{\n", field.name));
            write_skeleton_fields(out, field.children, depth + 1);
            out.push_str(&format!("{indent}}}{comma}\n"));
        } else {
            out.push_str(&format!(
                "{indent}\"{}\": \"{}\"{comma}\n",
                field.name,
                field.placeholder()
            ));
        }
    }
}

/// Look up the schema for a domain.
pub fn define_schema(domain: Domain) -> Schema {
    let fields = match domain {
        Domain::BasicInfo => BASIC_INFO_FIELDS,
        Domain::TechnicalSpecs => TECHNICAL_SPECS_FIELDS,
        Domain::LaunchCost => LAUNCH_COST_FIELDS,
    };
    Schema { domain, fields }
}

// ── Field tables ──────────────────────────────────────────────────────────

const BASIC_INFO_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("altitude", "Satellite altitude in kilometers"),
    FieldDescriptor::scalar("altitude_source", "Source URL for altitude data"),
    FieldDescriptor::scalar("orbital_life_years", "Orbital life in years"),
    FieldDescriptor::scalar("orbital_life_source", "Source URL for orbital life data"),
    FieldDescriptor::scalar(
        "launch_orbit_classification",
        "ISRO orbit classification (GTO, LEO, or SSO)",
    ),
    FieldDescriptor::scalar(
        "orbit_classification_source",
        "Source URL for orbit classification",
    ),
    FieldDescriptor::scalar("number_of_payloads", "Number of payloads on the satellite"),
    FieldDescriptor::scalar("payloads_source", "Source URL for payload information"),
];

const SENSOR_SPECS: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("spectral_bands", "Spectral bands of the sensors"),
    FieldDescriptor::scalar("spatial_resolution", "Spatial resolution of the sensors"),
];

const TECHNICAL_SPECS_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::scalar(
        "satellite_type",
        "Type of satellite (Communication/ Earth Observation / Experimental / Navigation / Science & Exploration)",
    ),
    FieldDescriptor::scalar("satellite_type_source", "Source URL for satellite type"),
    FieldDescriptor::scalar(
        "satellite_application",
        "Detailed description of satellite application",
    ),
    FieldDescriptor::scalar("application_source", "Source URL for satellite application"),
    FieldDescriptor::group(
        "sensor_specs",
        "JSON object containing spectral_bands and spatial_resolution",
        SENSOR_SPECS,
    ),
    FieldDescriptor::scalar("sensor_specs_source", "Source URL for sensor specifications"),
    FieldDescriptor::scalar(
        "technological_breakthroughs",
        "Notable technological breakthroughs",
    ),
    FieldDescriptor::scalar("breakthrough_source", "Source URL for breakthrough information"),
];

const LAUNCH_MASS: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("max_leo", "Maximum launch mass to LEO"),
    FieldDescriptor::scalar("actual_mass", "Actual launch mass of the satellite"),
];

const MISSION_COST: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("overall_cost", "Overall mission cost"),
    FieldDescriptor::scalar("vehicle_cost", "Launch vehicle cost"),
    FieldDescriptor::scalar("development_cost", "Development cost"),
    FieldDescriptor::scalar("approved_cost", "Approved budget"),
    FieldDescriptor::scalar("operational_cost", "Operational cost"),
];

const LAUNCH_COST_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::scalar("launch_cost", "Launch cost in USD"),
    FieldDescriptor::scalar("launch_cost_source", "Source URL for launch cost data"),
    FieldDescriptor::scalar("launch_vehicle", "Launch vehicle used"),
    FieldDescriptor::scalar(
        "launch_vehicle_source",
        "Source URL for launch vehicle information",
    ),
    FieldDescriptor::scalar("launch_date", "Launch date"),
    FieldDescriptor::scalar("launch_date_source", "Source URL for launch date information"),
    FieldDescriptor::scalar("launch_site", "Launch site"),
    FieldDescriptor::scalar("launch_site_source", "Source URL for launch site information"),
    FieldDescriptor::group(
        "launch_mass",
        "JSON object containing max_leo and actual_mass",
        LAUNCH_MASS,
    ),
    FieldDescriptor::scalar("launch_mass_source", "Source URL for launch mass information"),
    FieldDescriptor::scalar(
        "launch_success",
        "Launch success status (1 for success, 0 for failure)",
    ),
    FieldDescriptor::scalar(
        "launch_success_source",
        "Source URL for launch success information",
    ),
    FieldDescriptor::scalar(
        "vehicle_reusability",
        "Vehicle reusability status (1 for reusable, 0 for not)",
    ),
    FieldDescriptor::scalar("reusability_details", "Details about vehicle reusability"),
    FieldDescriptor::scalar("reusability_source", "Source URL for reusability information"),
    FieldDescriptor::group(
        "mission_cost",
        "JSON object containing all cost components",
        MISSION_COST,
    ),
    FieldDescriptor::scalar(
        "mission_cost_source",
        "Source URL for mission cost information",
    ),
];
