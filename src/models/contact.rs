use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{as_object, text_field, ValidationError};
use crate::database::{Document, ObjectId};

/// Which of the two sub-records a contact carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Address,
    Others,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Address => "address",
            ContactKind::Others => "others",
        }
    }
}

/// Postal address sub-record. Every field is optional at the storage level so
/// that a cleared sub-record round-trips as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Any other contact channel (phone, email, chat handle, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Others {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Others {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub others: Others,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document for Contact {
    const COLLECTION: &'static str = "contacts";

    fn id(&self) -> &ObjectId {
        &self.id
    }
}

impl Contact {
    pub fn with_address(address: Address) -> Self {
        Self::new(ContactKind::Address, address, Others::default())
    }

    pub fn with_others(others: Others) -> Self {
        Self::new(ContactKind::Others, Address::default(), others)
    }

    fn new(kind: ContactKind, address: Address, others: Others) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            kind,
            address,
            others,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

const ADDRESS_REQUIRED: [&str; 6] = ["addressLine1", "addressType", "city", "state", "postalCode", "country"];
const OTHERS_REQUIRED: [&str; 3] = ["contactType", "channelType", "value"];

/// Validated body of a contact PUT/PATCH. Exactly one sub-record is set; the
/// other is cleared when the update is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactUpdate {
    Address(Address),
    Others(Others),
}

/// Fields written to the store for a contact update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactChanges {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub address: Address,
    pub others: Others,
    pub updated_at: DateTime<Utc>,
}

impl ContactUpdate {
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        let object = as_object(body)?;

        let kind = text_field(object, "type").ok_or(ValidationError::MissingFields {
            message: "Type is required.",
            fields: vec!["type"],
        })?;

        match kind.as_str() {
            "address" => {
                let sub = sub_record(object, "address");
                require(&sub, &ADDRESS_REQUIRED, "Please provide all required fields for address.")?;
                Ok(ContactUpdate::Address(Address {
                    address_line1: text_field(&sub, "addressLine1"),
                    address_line2: text_field(&sub, "addressLine2"),
                    address_type: text_field(&sub, "addressType"),
                    city: text_field(&sub, "city"),
                    state: text_field(&sub, "state"),
                    postal_code: text_field(&sub, "postalCode"),
                    country: text_field(&sub, "country"),
                }))
            }
            "others" => {
                let sub = sub_record(object, "others");
                require(&sub, &OTHERS_REQUIRED, "Please provide all required fields for others type.")?;
                Ok(ContactUpdate::Others(Others {
                    contact_type: text_field(&sub, "contactType"),
                    channel_type: text_field(&sub, "channelType"),
                    value: text_field(&sub, "value"),
                }))
            }
            _ => Err(ValidationError::InvalidType(kind)),
        }
    }

    pub fn kind(&self) -> ContactKind {
        match self {
            ContactUpdate::Address(_) => ContactKind::Address,
            ContactUpdate::Others(_) => ContactKind::Others,
        }
    }

    pub fn into_changes(self, now: DateTime<Utc>) -> ContactChanges {
        let kind = self.kind();
        let (address, others) = match self {
            ContactUpdate::Address(address) => (address, Others::default()),
            ContactUpdate::Others(others) => (Address::default(), others),
        };
        ContactChanges {
            kind,
            address,
            others,
            updated_at: now,
        }
    }
}

/// The nested object under `key`, or an empty one when it is absent or not an object
fn sub_record(object: &Map<String, Value>, key: &str) -> Map<String, Value> {
    object
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn require(
    sub: &Map<String, Value>,
    required: &[&'static str],
    message: &'static str,
) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = required
        .iter()
        .copied()
        .filter(|field| text_field(sub, field).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields { message, fields: missing })
    }
}
