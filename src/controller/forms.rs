//! Form models backing the create actions.
//!
//! A form holds raw user text. `draft()` validates it into a create payload
//! before any request is made, so a missing required field is a validation
//! failure, never a round trip.

use jiff::civil::Date;

use crate::error::{DeskError, Result};
use crate::types::{NewCertificate, NewReport, NewShip, Ship, ShipKind};

use super::search::{SearchSession, Suggestion};

/// Report types offered by the quotation form
pub const REPORT_TYPES: &[&str] = &["Full Term", "Interim"];

/// Editable state of one create form
pub trait Form {
    type Draft;

    /// Validate the fields into a create payload
    fn draft(&self) -> Result<Self::Draft>;

    /// Clear every field, including dependent search state
    fn reset(&mut self);
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DeskError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_date(field: &str, value: &str) -> Result<Option<Date>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| {
        DeskError::Validation(format!("{field} must be a date (YYYY-MM-DD), got '{value}'"))
    })
}

fn parse_price(value: &str) -> Result<f64> {
    let cleaned: String = required("price", value)?
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(DeskError::Validation(format!(
            "price must be a non-negative number, got '{}'",
            value.trim()
        ))),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShipForm {
    pub imo: String,
    pub name: String,
    pub kind: String,
    pub flag: String,
}

impl Form for ShipForm {
    type Draft = NewShip;

    fn draft(&self) -> Result<NewShip> {
        let kind = match optional(&self.kind) {
            Some(kind) => kind.parse()?,
            None => ShipKind::default(),
        };
        Ok(NewShip {
            imo: required("IMO", &self.imo)?,
            name: required("name", &self.name)?,
            kind,
            flag: required("flag", &self.flag)?,
        })
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct CertificateForm {
    pub name: String,
}

impl Form for CertificateForm {
    type Draft = NewCertificate;

    fn draft(&self) -> Result<NewCertificate> {
        Ok(NewCertificate {
            name: required("certificate name", &self.name)?,
        })
    }

    fn reset(&mut self) {
        self.name.clear();
    }
}

/// Quotation form.
///
/// The IMO field doubles as the ship search box. Picking a suggestion fills
/// in the ship name, and on submit the picked ship's IMO replaces whatever
/// was typed.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub ship_search: SearchSession<Ship>,
    pub ship_name: String,
    pub certificate: String,
    pub certificate_number: String,
    pub kind: String,
    pub price: String,
    pub date_issuance: String,
    pub date_expire: String,
    pub date_endorsement: String,
    pub date_plan_approval: String,
}

impl ReportForm {
    /// Commit the ship suggestion at `index`, mirroring its name
    pub fn select_ship(&mut self, index: usize) -> Option<&Ship> {
        let name = self.ship_search.select(index)?.display_name().to_string();
        self.ship_name = name;
        self.ship_search.selection()
    }

    /// IMO that will be submitted
    pub fn effective_imo(&self) -> &str {
        self.ship_search
            .selected_id()
            .unwrap_or_else(|| self.ship_search.query())
    }

    fn report_kind(&self) -> Result<String> {
        let Some(kind) = optional(&self.kind) else {
            return Ok(REPORT_TYPES[0].to_string());
        };
        REPORT_TYPES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(&kind))
            .map(|known| known.to_string())
            .ok_or_else(|| {
                DeskError::Validation(format!(
                    "invalid report type '{kind}', expected one of: {}",
                    REPORT_TYPES.join(", ")
                ))
            })
    }
}

impl Form for ReportForm {
    type Draft = NewReport;

    fn draft(&self) -> Result<NewReport> {
        Ok(NewReport {
            name: required("ship name", &self.ship_name)?,
            imo: required("IMO", self.effective_imo())?,
            certificate: required("certificate", &self.certificate)?,
            certificate_number: optional(&self.certificate_number),
            kind: self.report_kind()?,
            price: parse_price(&self.price)?,
            date_issuance: optional_date("issuance date", &self.date_issuance)?,
            date_expire: optional_date("expiry date", &self.date_expire)?,
            date_endorsement: optional_date("endorsement date", &self.date_endorsement)?,
            date_plan_approval: optional_date("plan approval date", &self.date_plan_approval)?,
        })
    }

    fn reset(&mut self) {
        // Clearing, not replacing, the session keeps late suggestions stale
        self.ship_search.clear();
        for field in [
            &mut self.ship_name,
            &mut self.certificate,
            &mut self.certificate_number,
            &mut self.kind,
            &mut self.price,
            &mut self.date_issuance,
            &mut self.date_expire,
            &mut self.date_endorsement,
            &mut self.date_plan_approval,
        ] {
            field.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;
    use jiff::civil::date;

    fn ship(name: &str, imo: &str) -> Ship {
        Ship {
            id: EntityId::from(imo),
            name: name.to_string(),
            imo: imo.to_string(),
            kind: "Ship".to_string(),
            flag: Some("Panama".to_string()),
            created_at: None,
        }
    }

    fn filled_report_form() -> ReportForm {
        ReportForm {
            ship_name: "Ocean Star".to_string(),
            certificate: "Safety Radio".to_string(),
            price: "$1,250.50".to_string(),
            date_issuance: "2024-01-15".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ship_form_defaults_kind() {
        let form = ShipForm {
            imo: " 9074729 ".to_string(),
            name: "MV Test".to_string(),
            kind: String::new(),
            flag: "Panama".to_string(),
        };
        let draft = form.draft().unwrap();
        assert_eq!(draft.imo, "9074729");
        assert_eq!(draft.kind, ShipKind::Ship);
    }

    #[test]
    fn test_ship_form_requires_fields() {
        let form = ShipForm {
            name: "MV Test".to_string(),
            flag: "Panama".to_string(),
            ..Default::default()
        };
        let err = form.draft().unwrap_err();
        assert_eq!(err.to_string(), "IMO is required");

        let form = ShipForm {
            imo: "9074729".to_string(),
            name: "MV Test".to_string(),
            kind: "barge".to_string(),
            flag: "Panama".to_string(),
        };
        assert!(matches!(form.draft(), Err(DeskError::Validation(_))));
    }

    #[test]
    fn test_certificate_form() {
        let mut form = CertificateForm {
            name: "International Load Line".to_string(),
        };
        assert_eq!(form.draft().unwrap().name, "International Load Line");
        form.reset();
        assert!(form.draft().is_err());
    }

    #[test]
    fn test_report_form_uses_typed_imo_without_selection() {
        let mut form = filled_report_form();
        form.ship_search.input("9074729");
        let draft = form.draft().unwrap();
        assert_eq!(draft.imo, "9074729");
        assert_eq!(draft.price, 1250.5);
        assert_eq!(draft.kind, "Full Term");
        assert_eq!(draft.date_issuance, Some(date(2024, 1, 15)));
        assert_eq!(draft.date_expire, None);
    }

    #[test]
    fn test_report_form_selection_overrides_typed_imo() {
        let mut form = filled_report_form();
        let ticket = form.ship_search.input("ocean").unwrap();
        form.ship_search
            .finish(ticket, Ok(vec![ship("Ocean Pearl", "9175834")]))
            .unwrap();
        form.select_ship(0).unwrap();
        assert_eq!(form.ship_name, "Ocean Pearl");

        // Editing the IMO box afterwards does not replace the selection
        form.ship_search.input("12");
        form.ship_search.dismiss();
        assert_eq!(form.draft().unwrap().imo, "9175834");
    }

    #[test]
    fn test_report_form_validation() {
        let mut form = filled_report_form();
        assert_eq!(form.draft().unwrap_err().to_string(), "IMO is required");

        form.ship_search.input("9074729");
        form.price = "abc".to_string();
        assert!(form.draft().unwrap_err().to_string().contains("price"));

        form.price = "100".to_string();
        form.date_expire = "15/01/2025".to_string();
        assert!(form.draft().unwrap_err().to_string().contains("expiry date"));

        form.date_expire.clear();
        form.kind = "interim".to_string();
        assert_eq!(form.draft().unwrap().kind, "Interim");

        form.kind = "provisional".to_string();
        assert!(form.draft().is_err());
    }

    #[test]
    fn test_report_form_reset_clears_search() {
        let mut form = filled_report_form();
        let ticket = form.ship_search.input("ocean").unwrap();
        form.ship_search
            .finish(ticket, Ok(vec![ship("Ocean Pearl", "9175834")]))
            .unwrap();
        form.select_ship(0);

        form.reset();
        assert!(form.ship_search.selection().is_none());
        assert_eq!(form.ship_search.query(), "");
        assert!(form.ship_name.is_empty());
    }
}
