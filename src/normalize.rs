//! Field normalization for raw listing rows.
//!
//! Turns the scraper's free-text fields into typed values, tagging every
//! rejected row with a [`DropReason`] so drop rates stay diagnosable.

use thiserror::Error;
use tracing::{debug, info};

use crate::loader::RawListing;

/// Why a raw row was excluded from the normalized record set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    /// The price is quoted in a foreign currency (EUR/USD marker).
    #[error("price quoted in a foreign currency")]
    ForeignCurrency,
    /// A field required downstream is blank.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A field is present but could not be parsed.
    #[error("unparseable field `{0}`")]
    Unparseable(&'static str),
    /// Price divided by size is not a finite number (e.g. zero size).
    #[error("price per square meter is not finite")]
    NonFinitePricePerSqm,
}

/// A listing after normalization: numeric fields, WGS84 coordinates, and the
/// derived price-per-square-meter statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub price: f64,
    pub size_sqm: f64,
    pub rooms: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_sqm: f64,
}

/// Parses a local-currency price string like `"1 234 567 DH"` into a float.
///
/// Rejects foreign-currency listings outright, strips the `DH` suffix and
/// any grouping whitespace, and converts a decimal comma to a decimal point.
pub fn parse_price(raw: &str) -> Result<f64, DropReason> {
    let upper = raw.to_uppercase();
    if upper.contains("EUR") || upper.contains("USD") {
        return Err(DropReason::ForeignCurrency);
    }

    let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.to_uppercase().ends_with("DH") {
        cleaned.truncate(cleaned.len() - 2);
    }
    let cleaned = cleaned.replace(',', ".");

    cleaned
        .parse::<f64>()
        .map_err(|_| DropReason::Unparseable("Price"))
}

/// Extracts the first run of ASCII digits from a free-text field
/// (`"3 Pièces"` → `3`). Returns `None` when the text carries no digits.
pub fn parse_leading_int(raw: &str) -> Option<u32> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parses a stringified coordinate pair `"[lat, lon]"` into `(lat, lon)`.
pub fn parse_location(raw: &str) -> Result<(f64, f64), DropReason> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(DropReason::Unparseable("Location"))?;

    let mut parts = inner.split(',');
    let lat = parts
        .next()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or(DropReason::Unparseable("Location"))?;
    let lon = parts
        .next()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or(DropReason::Unparseable("Location"))?;
    if parts.next().is_some() {
        return Err(DropReason::Unparseable("Location"));
    }

    Ok((lat, lon))
}

/// Normalizes one raw row into a [`Listing`], or explains why it was dropped.
///
/// Price, size, and location are required here; room counts stay optional
/// and are only enforced by the quality filter.
pub fn normalize_record(raw: &RawListing) -> Result<Listing, DropReason> {
    let price_text = non_blank(&raw.price).ok_or(DropReason::MissingField("Price"))?;
    let price = parse_price(price_text)?;

    let size_sqm = non_blank(&raw.size)
        .and_then(parse_leading_int)
        .ok_or(DropReason::MissingField("Size"))? as f64;

    let location_text = non_blank(&raw.location).ok_or(DropReason::MissingField("Location"))?;
    let (latitude, longitude) = parse_location(location_text)?;

    let price_per_sqm = price / size_sqm;
    if !price_per_sqm.is_finite() {
        return Err(DropReason::NonFinitePricePerSqm);
    }

    Ok(Listing {
        price,
        size_sqm,
        rooms: non_blank(&raw.rooms).and_then(parse_leading_int),
        bedrooms: non_blank(&raw.bedrooms).and_then(parse_leading_int),
        bathrooms: non_blank(&raw.bathrooms).and_then(parse_leading_int),
        latitude,
        longitude,
        price_per_sqm,
    })
}

/// Normalizes a whole record set, dropping rows that fail and logging the
/// tallies.
pub fn normalize_all(records: &[RawListing]) -> Vec<Listing> {
    let mut dropped = 0usize;

    let listings: Vec<Listing> = records
        .iter()
        .filter_map(|raw| match normalize_record(raw) {
            Ok(listing) => Some(listing),
            Err(reason) => {
                dropped += 1;
                debug!(title = ?raw.title, %reason, "Dropping listing row");
                None
            }
        })
        .collect();

    info!(
        kept = listings.len(),
        dropped,
        total = records.len(),
        "Normalization complete"
    );
    listings
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
