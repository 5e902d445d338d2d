use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::billing_agreements::AgreementDetails, value_objects::iam::GeoLocation,
};

/// Countries whose tax location is derived from a billing postal code.
pub const ADDRESS_LOOKUP_COUNTRIES: [&str; 2] = ["US", "CA"];

pub fn is_address_lookup_country(country: &str) -> bool {
    ADDRESS_LOOKUP_COUNTRIES
        .iter()
        .any(|code| code.eq_ignore_ascii_case(country))
}

const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

const CA_PROVINCES: &[(&str, &str)] = &[
    ("Alberta", "AB"),
    ("British Columbia", "BC"),
    ("Manitoba", "MB"),
    ("New Brunswick", "NB"),
    ("Newfoundland and Labrador", "NL"),
    ("Northwest Territories", "NT"),
    ("Nova Scotia", "NS"),
    ("Nunavut", "NU"),
    ("Ontario", "ON"),
    ("Prince Edward Island", "PE"),
    ("Quebec", "QC"),
    ("Saskatchewan", "SK"),
    ("Yukon", "YT"),
];

/// Short code for a state or province long name, e.g. `("US", "California")` -> `CA`.
pub fn state_short_code(country: &str, state_long_name: &str) -> Option<&'static str> {
    let table = match country.to_ascii_uppercase().as_str() {
        "US" => US_STATES,
        "CA" => CA_PROVINCES,
        _ => return None,
    };

    table
        .iter()
        .find(|(long_name, _)| long_name.eq_ignore_ascii_case(state_long_name))
        .map(|(_, short)| *short)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillingAddressUpdate {
    pub name: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl BillingAddressUpdate {
    /// Builds the bill-to address from agreement details. When the request was
    /// geolocated to the agreement's country the geo state replaces the
    /// agreement state, as its short code.
    pub fn from_agreement(details: &AgreementDetails, location: Option<&GeoLocation>) -> Self {
        let geo_state = location
            .filter(|location| {
                location.country_code.is_some()
                    && location.country_code.as_deref() == details.country_code.as_deref()
            })
            .and_then(|location| {
                let country = details.country_code.as_deref()?;
                let state = location.state.as_deref()?;
                state_short_code(country, state)
            });

        let name = match (&details.first_name, &details.last_name) {
            (None, None) => None,
            (first, last) => Some(
                format!(
                    "{} {}",
                    first.as_deref().unwrap_or_default(),
                    last.as_deref().unwrap_or_default()
                )
                .trim()
                .to_string(),
            ),
        };

        Self {
            name,
            line1: details.street.clone(),
            line2: details.street2.clone(),
            city: details.city.clone(),
            state: geo_state
                .map(|state| state.to_string())
                .or_else(|| details.state.clone()),
            postal_code: details.zip.clone(),
            country: details.country_code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> AgreementDetails {
        AgreementDetails {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            street: Some("1 Market St".to_string()),
            city: Some("San Francisco".to_string()),
            state: Some("Calif.".to_string()),
            zip: Some("94105".to_string()),
            country_code: Some("US".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn maps_state_names_for_lookup_countries() {
        assert_eq!(state_short_code("US", "California"), Some("CA"));
        assert_eq!(state_short_code("ca", "quebec"), Some("QC"));
        assert_eq!(state_short_code("DE", "Bavaria"), None);
        assert!(is_address_lookup_country("ca"));
        assert!(!is_address_lookup_country("GB"));
    }

    #[test]
    fn geo_state_wins_when_countries_match() {
        let location = GeoLocation {
            country: Some("United States".to_string()),
            country_code: Some("US".to_string()),
            state: Some("California".to_string()),
            state_code: None,
            postal_code: None,
        };

        let update = BillingAddressUpdate::from_agreement(&details(), Some(&location));

        assert_eq!(update.state.as_deref(), Some("CA"));
        assert_eq!(update.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(update.country.as_deref(), Some("US"));
    }

    #[test]
    fn agreement_state_kept_for_foreign_geo() {
        let location = GeoLocation {
            country_code: Some("CA".to_string()),
            state: Some("Ontario".to_string()),
            ..Default::default()
        };

        let update = BillingAddressUpdate::from_agreement(&details(), Some(&location));

        assert_eq!(update.state.as_deref(), Some("Calif."));
    }
}
