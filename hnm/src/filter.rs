use anyhow::Result;
use hnmapped::prelude::*;

/// Parses `key=value` filter arguments. The value may be empty.
pub fn parse_filters(filters: &[String]) -> Result<Vec<(FilterKey, String)>> {
    filters.iter().map(|f| parse_filter(f)).collect()
}

pub fn parse_filter(input: &str) -> Result<(FilterKey, String)> {
    let Some((key, value)) = input.split_once('=') else {
        return Err(HnMappedError::InvalidFilter {
            key: input.trim().to_string(),
            value: String::new(),
            message: "expected key=value".to_string(),
        }
        .into());
    };
    let key = FilterKey::parse(key.trim())?;
    let value = if key.is_text() { value } else { value.trim() };
    Ok((key, value.to_string()))
}
