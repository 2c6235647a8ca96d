//! JSON Schema validation of generated rows.
//!
//! The Rosetta schema carries per-column constraints (`required`,
//! `pattern`). They are turned into a JSON Schema Draft 7 document
//! describing one row as an object keyed by field name, and every
//! generated row is checked against it.
//!
//! Validation only reports; it never changes or blocks the output.
//!
//! # Example
//!
//! ```
//! use rosetta_csv::schema::RosettaSchema;
//! use rosetta_csv::validation::{row_schema, is_valid};
//! use serde_json::json;
//!
//! let schema = RosettaSchema::from_json(r#"{"fields": [
//!     {"name": "Object Type", "constraints": {"required": true, "pattern": "^(SIP|IE)$"}}
//! ]}"#).unwrap();
//!
//! let json_schema = row_schema(&schema);
//! assert!(is_valid(&json_schema, &json!({"Object Type": "IE"})));
//! assert!(!is_valid(&json_schema, &json!({"Object Type": "FILE"})));
//! ```

use serde_json::{json, Map, Value};

use crate::models::OutputRow;
use crate::schema::RosettaSchema;
use crate::transform::serializer::clean_cell;

/// Validate a JSON value against a JSON Schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Simpler variant: just true/false.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Draft 7 schema for one row.
///
/// A non-empty pattern constrains the column. Required columns must be
/// non-empty; optional columns may always be empty.
pub fn row_schema(schema: &RosettaSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in &schema.fields {
        let constraints = &field.constraints;
        let mut property = json!({ "type": "string" });

        match (constraints.required, constraints.pattern()) {
            (true, Some(pattern)) => {
                property["minLength"] = json!(1);
                property["pattern"] = json!(pattern);
            }
            (true, None) => {
                property["minLength"] = json!(1);
            }
            (false, Some(pattern)) => {
                property["anyOf"] = json!([{ "maxLength": 0 }, { "pattern": pattern }]);
            }
            (false, None) => {}
        }

        if constraints.required {
            required.push(Value::String(field.name.clone()));
        }
        properties.insert(field.name.clone(), property);
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": schema.title,
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// A row as a JSON object keyed by field name, cells as written.
///
/// When two fields share a name the later column wins.
pub fn row_to_json(schema: &RosettaSchema, row: &OutputRow) -> Value {
    let object: Map<String, Value> = schema
        .field_names()
        .zip(row.cells())
        .map(|(name, cell)| (name.to_string(), Value::String(clean_cell(cell))))
        .collect();
    Value::Object(object)
}

/// Constraint violations of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowViolation {
    /// 1-based position among the validated rows
    pub row: usize,
    pub object_type: String,
    pub errors: Vec<String>,
}

/// Check every row against the schema's column constraints.
pub fn validate_rows(schema: &RosettaSchema, rows: &[OutputRow]) -> Vec<RowViolation> {
    let json_schema = row_schema(schema);

    let validator = match jsonschema::draft7::new(&json_schema) {
        Ok(v) => v,
        Err(e) => {
            return vec![RowViolation {
                row: 0,
                object_type: String::new(),
                errors: vec![format!("Invalid schema: {}", e)],
            }]
        }
    };

    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let instance = row_to_json(schema, row);
            let errors: Vec<String> = validator
                .iter_errors(&instance)
                .map(|e| e.to_string())
                .collect();

            if errors.is_empty() {
                None
            } else {
                Some(RowViolation {
                    row: i + 1,
                    object_type: row.object_type().to_string(),
                    errors,
                })
            }
        })
        .collect()
}
