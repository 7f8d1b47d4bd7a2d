//! Structured address formatting

use serde::{Deserialize, Serialize};

/// Address parts as returned by a reverse lookup with address details
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub street: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

fn present(part: Option<&String>) -> Option<&str> {
    part.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Build a short label such as `"1500 SW Jefferson Way, Corvallis, Oregon, 97331, United States"`.
///
/// Returns `None` when no usable part is present.
#[must_use]
pub fn format_clean_address(address: &StructuredAddress) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    let street: Vec<&str> = [
        present(address.house_number.as_ref()),
        present(address.road.as_ref()).or_else(|| present(address.street.as_ref())),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !street.is_empty() {
        parts.push(street.join(" "));
    }

    let locality = present(address.city.as_ref())
        .or_else(|| present(address.town.as_ref()))
        .or_else(|| present(address.village.as_ref()))
        .or_else(|| present(address.suburb.as_ref()));

    parts.extend(
        [
            locality,
            present(address.state.as_ref()),
            present(address.postcode.as_ref()),
            present(address.country.as_ref()),
        ]
        .into_iter()
        .flatten()
        .map(str::to_string),
    );

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
