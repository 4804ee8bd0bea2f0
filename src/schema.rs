//! JSON-Schema validation of competition documents against the bundled
//! schema resource.

use crate::error::CompetitionError;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::Value;

const SCHEMA_JSON: &str = include_str!("../schema/competition.json");

// Schema violations reported before truncation.
const MAX_REPORTED: usize = 20;

static SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let value: Value =
        serde_json::from_str(SCHEMA_JSON).expect("bundled competition schema is valid JSON");
    JSONSchema::compile(&value).expect("bundled competition schema compiles")
});

/// Validate a raw document against the competition schema, aggregating the
/// first violations with their JSON-pointer locations.
pub fn validate_document(document: &Value) -> Result<(), CompetitionError> {
    if let Err(violations) = SCHEMA.validate(document) {
        let mut errors = Vec::new();
        for violation in violations {
            if errors.len() == MAX_REPORTED {
                errors.push("further schema violations omitted".to_string());
                break;
            }
            let location = violation.instance_path.to_string();
            let location = if location.is_empty() { "/".to_string() } else { location };
            errors.push(format!("{}: {}", location, violation));
        }
        return Err(CompetitionError::Document {
            message: "document does not match the competition schema".to_string(),
            errors,
        });
    }
    Ok(())
}
