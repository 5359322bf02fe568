//! Patient admission queue
//!
//! Admitted patients are appended to a flat JSON file together with a queue
//! number one higher than the highest number handed out so far.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{CollectionError, Result};
use crate::files::JsonFileStore;
use crate::schema::{CompiledSchema, DocumentValidator};

/// Default data file for the queue
pub const DEFAULT_DATA_FILE: &str = "patients.json";

const QUEUE_NUMBER: &str = "queueNumber";

fn patient_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "firstName": { "type": "string" },
            "lastName": { "type": "string" },
            "emailAddress": { "type": "string" },
            "phoneNumber": { "type": "string" },
            "sex": { "type": "string", "enum": ["female", "male"] }
        },
        "required": ["firstName", "lastName", "emailAddress", "phoneNumber", "sex"]
    })
}

/// Position handed out on admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub queue_number: u64,
}

/// Next queue number after everything in `patients`
fn next_queue_number(patients: &[Value]) -> u64 {
    patients
        .iter()
        .filter_map(|p| p.get(QUEUE_NUMBER).and_then(Value::as_u64))
        .max()
        .map_or(1, |max| max + 1)
}

/// The admission queue
#[derive(Debug)]
pub struct PatientQueue {
    file: JsonFileStore,
    validator: CompiledSchema,
}

impl PatientQueue {
    pub fn new(file: JsonFileStore) -> Result<Self> {
        Ok(Self {
            file,
            validator: CompiledSchema::from_value(patient_schema())?,
        })
    }

    /// Validate `patient`, assign the next queue number and persist the record
    pub async fn admit(&self, mut patient: Value) -> Result<QueueEntry> {
        if let Err(issues) = self.validator.validate(&patient) {
            warn!(issues = issues.len(), "Rejected patient admission");
            return Err(CollectionError::ValidationFailed(issues));
        }

        let entry = self
            .file
            .modify(move |patients| {
                let queue_number = next_queue_number(patients);
                if let Value::Object(fields) = &mut patient {
                    fields.insert(QUEUE_NUMBER.to_string(), Value::from(queue_number));
                }
                patients.push(patient);
                Ok(QueueEntry { queue_number })
            })
            .await?;

        info!(queue_number = entry.queue_number, "Admitted patient");
        Ok(entry)
    }

    /// Every admitted patient in admission order
    pub async fn list(&self) -> Result<Vec<Value>> {
        self.file.read().await
    }
}
