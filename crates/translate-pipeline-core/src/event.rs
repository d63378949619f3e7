//! Storage notification payloads and pipeline responses.
//!
//! Two payload shapes are accepted:
//!
//! ```text
//! {"records":[{"storageEvent":{"location":{"name":..},"object":{"key":..}}}]}
//! {"Records":[{"s3":{"bucket":{"name":..},"object":{"key":..}}}]}
//! ```
//!
//! Only the first record is ever consulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::keys::decode_event_key;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageNotification {
    #[serde(alias = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(rename = "storageEvent", alias = "s3")]
    pub storage_event: StorageEventDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEventDetail {
    #[serde(alias = "bucket")]
    pub location: NamedLocation,
    pub object: ObjectDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedLocation {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDetail {
    pub key: String,
}

/// Location and (decoded) key of the object a notification points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub location: String,
    pub key: String,
}

impl StorageNotification {
    /// Build a single-record notification, as the storage service would emit
    /// for one new object.
    pub fn for_object(location: impl Into<String>, key: &str) -> Self {
        Self {
            records: vec![NotificationRecord {
                storage_event: StorageEventDetail {
                    location: NamedLocation {
                        name: location.into(),
                    },
                    object: ObjectDetail {
                        key: urlencoding::encode(key).into_owned(),
                    },
                },
            }],
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Extract the object referenced by the first record of a payload.
///
/// Fails with [`Error::NoRecords`] when the record list is absent or empty,
/// and [`Error::MalformedEvent`] when the first record lacks its fields.
pub fn first_object(event: &Value) -> Result<ObjectRef> {
    let records = event
        .get("records")
        .or_else(|| event.get("Records"))
        .and_then(Value::as_array)
        .filter(|records| !records.is_empty())
        .ok_or(Error::NoRecords)?;

    if records.len() > 1 {
        tracing::debug!(
            "Notification carries {} records; only the first is processed",
            records.len()
        );
    }

    let record: NotificationRecord = serde_json::from_value(records[0].clone())
        .map_err(|e| Error::MalformedEvent(e.to_string()))?;

    let detail = record.storage_event;
    Ok(ObjectRef {
        location: detail.location.name,
        key: decode_event_key(&detail.object.key),
    })
}

/// Body of a pipeline response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Success {
        message: String,
        output_location: String,
    },
    Failure {
        message: String,
        error: String,
    },
}

/// Structured response returned by every pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl PipelineResponse {
    pub fn success(output_location: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Success {
                message: "Translation successful".to_string(),
                output_location: output_location.into(),
            },
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            status_code: 500,
            body: ResponseBody::Failure {
                message: "Error processing request".to_string(),
                error: error.to_string(),
            },
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Error message of a failure response.
    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Failure { error, .. } => Some(error),
            ResponseBody::Success { .. } => None,
        }
    }
}
