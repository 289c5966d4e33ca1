//! CSV loading for real-estate listing extracts.
//!
//! Extracts come from the scraper with every column as free text; parsing
//! into numeric fields happens later, in [`crate::normalize`].

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, warn};

/// A single row as it appears in a scraper extract. All fields are raw text;
/// any of them may be blank for a given listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Price")]
    pub price: Option<String>,
    #[serde(rename = "Neighborhood")]
    pub neighborhood: Option<String>,
    #[serde(rename = "Size")]
    pub size: Option<String>,
    #[serde(rename = "Rooms")]
    pub rooms: Option<String>,
    #[serde(rename = "Bedrooms")]
    pub bedrooms: Option<String>,
    #[serde(rename = "Bathrooms")]
    pub bathrooms: Option<String>,
    #[serde(rename = "Floors")]
    pub floors: Option<String>,
    #[serde(rename = "Additional Information")]
    pub additional_information: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
}

/// Decodes listing rows from one CSV extract.
///
/// Rows that fail to decode are skipped with a warning; an unreadable source
/// is the caller's problem, but a mangled row should never sink a whole
/// extract.
///
/// # Errors
///
/// Returns an error if the byte stream is not a readable CSV with headers.
pub fn load_records(bytes: &[u8]) -> Result<Vec<RawListing>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut records = Vec::new();

    for (i, row) in reader.deserialize::<RawListing>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => warn!(row = i, error = %e, "Skipping undecodable CSV row"),
        }
    }

    debug!(rows = records.len(), "Extract decoded");
    Ok(records)
}

/// Decodes and concatenates several extracts into one record set.
///
/// # Errors
///
/// Returns an error if any source is not a readable CSV with headers.
pub fn load_all<'a, I>(sources: I) -> Result<Vec<RawListing>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut records = Vec::new();
    for bytes in sources {
        records.extend(load_records(bytes)?);
    }
    Ok(records)
}
