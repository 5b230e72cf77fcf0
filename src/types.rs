//! Domain records served by the certification API and the payloads used to
//! create them.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DeskError, Result};

/// Stable identifier of a remote record.
///
/// The API hands out both numeric and string ids; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => EntityId(n.to_string()),
            RawId::Text(s) => EntityId(s),
        })
    }
}

/// Common surface of every record the desk lists
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> &EntityId;

    /// Creation instant, used for recency bucketing
    fn created_at(&self) -> Option<Timestamp>;

    /// Short human label used in prompts and notices
    fn label(&self) -> String;

    /// Text the fuzzy row filter matches against
    fn search_text(&self) -> String;
}

/// A registered ship or shipping company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: EntityId,
    pub name: String,
    pub imo: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "flexible::timestamp"
    )]
    pub created_at: Option<Timestamp>,
}

impl Entity for Ship {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn label(&self) -> String {
        format!("{} (IMO {})", self.name, self.imo)
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.imo,
            self.kind,
            self.flag.as_deref().unwrap_or("")
        )
    }
}

/// A certificate type offered by the office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub abbreviations: Option<String>,
    #[serde(default, deserialize_with = "flexible::amount")]
    pub price: Option<f64>,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "flexible::timestamp"
    )]
    pub created_at: Option<Timestamp>,
    #[serde(
        rename = "updatedAt",
        default,
        deserialize_with = "flexible::timestamp"
    )]
    pub updated_at: Option<Timestamp>,
}

impl Entity for Certificate {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.abbreviations.as_deref().unwrap_or(""),
            self.certificate_number.as_deref().unwrap_or("")
        )
    }
}

/// Ship details embedded in a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportShip {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub imo: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
}

/// A quotation report: one certificate issued (or quoted) for one ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub imo: String,
    #[serde(default)]
    pub certificate: String,
    #[serde(default, alias = "certificate_number")]
    pub certificate_number: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default, deserialize_with = "flexible::amount")]
    pub price: Option<f64>,
    #[serde(
        default,
        alias = "date_issuance",
        deserialize_with = "flexible::timestamp"
    )]
    pub date_issuance: Option<Timestamp>,
    #[serde(default, alias = "date_expire", deserialize_with = "flexible::timestamp")]
    pub date_expire: Option<Timestamp>,
    #[serde(
        default,
        alias = "date_endorsement",
        deserialize_with = "flexible::timestamp"
    )]
    pub date_endorsement: Option<Timestamp>,
    #[serde(
        default,
        alias = "date_plan_approval",
        deserialize_with = "flexible::timestamp"
    )]
    pub date_plan_approval: Option<Timestamp>,
    #[serde(default, alias = "date_create", deserialize_with = "flexible::timestamp")]
    pub date_create: Option<Timestamp>,
    #[serde(default, deserialize_with = "flexible::timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub ship: Option<ReportShip>,
}

impl Report {
    /// Flag of the ship the report was issued for
    pub fn ship_flag(&self) -> Option<&str> {
        self.ship
            .as_ref()
            .and_then(|s| s.flag.as_deref())
            .or(self.flag.as_deref())
    }

    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

impl Entity for Report {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> Option<Timestamp> {
        self.created_at.or(self.date_create)
    }

    fn label(&self) -> String {
        format!("{} for {}", self.certificate, self.name)
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name,
            self.imo,
            self.certificate,
            self.certificate_number.as_deref().unwrap_or(""),
            self.kind
        )
    }
}

/// Accepted spellings of [`ShipKind`]
pub const VALID_SHIP_KINDS: &[&str] = &["Ship", "Company"];

/// Registration type of a ship record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipKind {
    #[default]
    Ship,
    Company,
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipKind::Ship => write!(f, "Ship"),
            ShipKind::Company => write!(f, "Company"),
        }
    }
}

impl FromStr for ShipKind {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ship" => Ok(ShipKind::Ship),
            "company" => Ok(ShipKind::Company),
            _ => Err(DeskError::Validation(format!(
                "invalid type '{s}', expected 'ship' or 'company'"
            ))),
        }
    }
}

/// Payload for `POST /api/ships/new`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewShip {
    pub imo: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShipKind,
    pub flag: String,
}

/// Payload for `POST /api/certificates/new`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCertificate {
    pub name: String,
}

/// Payload for `POST /api/reports/new`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    pub name: String,
    pub imo: String,
    pub certificate: String,
    pub certificate_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
    pub date_issuance: Option<Date>,
    pub date_expire: Option<Date>,
    pub date_endorsement: Option<Date>,
    pub date_plan_approval: Option<Date>,
}

/// Lenient decoders for loosely typed API fields
mod flexible {
    use jiff::Timestamp;
    use jiff::civil::Date;
    use jiff::tz::TimeZone;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    /// Accept RFC 3339 instants, bare `YYYY-MM-DD` dates (midnight UTC), or null
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(ts) = raw.parse::<Timestamp>() {
            return Ok(Some(ts));
        }
        let date: Date = raw
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid date '{raw}': {e}")))?;
        date.to_zoned(TimeZone::UTC)
            .map(|z| Some(z.timestamp()))
            .map_err(D::Error::custom)
    }

    /// Accept a number, a numeric string (optionally with `$` and `,`), or null
    pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Number(f64),
            Text(String),
        }

        match Option::<RawAmount>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawAmount::Number(n)) => Ok(Some(n)),
            Some(RawAmount::Text(s)) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| !matches!(c, '$' | ',' | ' '))
                    .collect();
                if cleaned.is_empty() {
                    return Ok(None);
                }
                cleaned
                    .parse()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid amount '{s}'")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let ship: Ship = serde_json::from_value(json!({
            "id": 42, "name": "MV Test", "imo": "9074729", "type": "Ship"
        }))
        .unwrap();
        assert_eq!(ship.id.as_str(), "42");

        let ship: Ship = serde_json::from_value(json!({
            "id": "a1b2", "name": "MV Test", "imo": "9074729", "type": "Ship"
        }))
        .unwrap();
        assert_eq!(ship.id.as_str(), "a1b2");
    }

    #[test]
    fn test_certificate_price_as_string() {
        let cert: Certificate = serde_json::from_value(json!({
            "id": "c1",
            "name": "International Load Line",
            "certificate_number": null,
            "abbreviations": "ILL",
            "price": "1,250.00",
            "createdAt": "2024-03-01T12:00:00.000Z",
            "updatedAt": "2024-03-01T12:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(cert.price, Some(1250.0));
        assert!(cert.created_at.is_some());
    }

    #[test]
    fn test_report_decodes_camel_and_snake_case() {
        let camel: Report = serde_json::from_value(json!({
            "id": "r1",
            "name": "MV Test",
            "imo": "9074729",
            "certificate": "Safety Radio",
            "certificateNumber": "SR-01",
            "type": "Full Term",
            "price": 300,
            "dateIssuance": "2024-01-15T00:00:00.000Z",
            "dateExpire": null,
            "createdAt": "2024-01-15T10:30:00Z",
            "ship": {"flag": "Panama", "name": "MV Test"}
        }))
        .unwrap();
        assert_eq!(camel.certificate_number.as_deref(), Some("SR-01"));
        assert_eq!(camel.ship_flag(), Some("Panama"));
        assert!(camel.date_expire.is_none());

        let snake: Report = serde_json::from_value(json!({
            "id": 7,
            "name": "MV Test",
            "imo": "9074729",
            "certificate": "Safety Radio",
            "certificate_number": "SR-02",
            "type": "Full Term",
            "price": "300",
            "date_issuance": "2024-01-15"
        }))
        .unwrap();
        assert_eq!(snake.certificate_number.as_deref(), Some("SR-02"));
        assert_eq!(snake.price, Some(300.0));
        assert_eq!(
            snake.date_issuance.unwrap().to_string(),
            "2024-01-15T00:00:00Z"
        );
    }

    #[test]
    fn test_report_created_at_falls_back_to_date_create() {
        let report: Report = serde_json::from_value(json!({
            "id": "r2",
            "name": "MV Test",
            "dateCreate": "2024-02-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(
            report.created_at().unwrap().to_string(),
            "2024-02-01T08:00:00Z"
        );
    }

    #[test]
    fn test_ship_kind_parsing() {
        assert_eq!("ship".parse::<ShipKind>().unwrap(), ShipKind::Ship);
        assert_eq!("Company".parse::<ShipKind>().unwrap(), ShipKind::Company);
        assert!("barge".parse::<ShipKind>().is_err());
    }

    #[test]
    fn test_new_ship_wire_shape() {
        let draft = NewShip {
            imo: "9074729".to_string(),
            name: "MV Test".to_string(),
            kind: ShipKind::Ship,
            flag: "Panama".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"imo": "9074729", "name": "MV Test", "type": "Ship", "flag": "Panama"})
        );
    }
}
