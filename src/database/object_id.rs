use std::fmt;
use std::str::FromStr;

use bson::oid;
use serde::{Deserialize, Serialize};

/// Document identifier backed by a BSON object id.
///
/// On the wire and in storage it is the 24-character lowercase hex form, not
/// bson's extended-JSON `{"$oid": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(oid::ObjectId);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid object id")]
pub struct InvalidObjectId(pub String);

impl ObjectId {
    pub fn new() -> Self {
        Self(oid::ObjectId::new())
    }

    /// Parse a 24-character hex string (either case)
    pub fn parse(raw: &str) -> Result<Self, InvalidObjectId> {
        oid::ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| InvalidObjectId(raw.to_string()))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = InvalidObjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}
