//! Line codec for the delimited inventory format.
//!
//! A resource is a header line `name|address|phone` followed by one line per
//! vehicle: `vin|year|make|model|vehicle_type|color|odometer|price`.
//! Free-text fields are written verbatim; a `|` inside one of them cannot be
//! represented and will make the line unreadable on the next load.
//! Prices are written with two decimals, rounding half-cents up.

use std::borrow::Cow;

use crate::models::{DealershipHeader, VehicleRecord};

/// Separator between fields on every line.
pub const DELIMITER: char = '|';

const RECORD_FIELDS: usize = 8;
const HEADER_FIELDS: usize = 3;

/// Serialize a vehicle as a single line, without a line terminator.
pub fn serialize(vehicle: &VehicleRecord) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        vehicle.vin,
        vehicle.year,
        vehicle.make,
        vehicle.model,
        vehicle.vehicle_type,
        vehicle.color,
        vehicle.odometer,
        format_price(vehicle.price)
    )
}

/// Format a price with exactly two decimals.
///
/// Rounds the shortest decimal form of the value half-up, so `0.125` and
/// `1.005` become `0.13` and `1.01` rather than following the binary value.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return price.to_string();
    }
    let shortest = price.abs().to_string();
    let (whole, fraction) = shortest
        .split_once('.')
        .unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2))
        .collect();
    if fraction.as_bytes().get(2).is_some_and(|digit| *digit >= b'5') {
        let mut index = digits.len();
        loop {
            if index == 0 {
                digits.insert(0, b'1');
                break;
            }
            index -= 1;
            if digits[index] == b'9' {
                digits[index] = b'0';
            } else {
                digits[index] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let sign = if price < 0.0 && digits.iter().any(|digit| *digit != b'0') {
        "-"
    } else {
        ""
    };
    format!(
        "{sign}{}.{}",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

/// Decode one raw line, dropping a trailing `\r`.
///
/// Invalid UTF-8 is replaced rather than rejected so a damaged line can only
/// spoil itself.
pub fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// Parse a vehicle line. Returns `None` for anything malformed.
pub fn parse(line: &str) -> Option<VehicleRecord> {
    let fields = split_fields(line);
    if fields.len() != RECORD_FIELDS {
        return None;
    }

    let vin = fields[0].parse().ok()?;
    let year = fields[1].parse().ok()?;
    let odometer = fields[6].parse().ok()?;
    let price: f64 = fields[7].trim().parse().ok()?;
    if !price.is_finite() {
        return None;
    }

    Some(VehicleRecord {
        vin,
        year,
        make: fields[2].to_string(),
        model: fields[3].to_string(),
        vehicle_type: fields[4].to_string(),
        color: fields[5].to_string(),
        odometer,
        price,
    })
}

/// Serialize the dealership header line.
pub fn serialize_header(header: &DealershipHeader) -> String {
    format!("{}|{}|{}", header.display_name, header.address, header.phone)
}

/// Parse a header line. Any three fields are accepted as-is.
pub fn parse_header(line: &str) -> Option<DealershipHeader> {
    let fields = split_fields(line);
    if fields.len() != HEADER_FIELDS {
        return None;
    }
    Some(DealershipHeader::new(fields[0], fields[1], fields[2]))
}

/// Split on the delimiter, dropping trailing empty fields so that
/// `a|b|` counts as two fields.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(DELIMITER).collect();
    while fields.len() > 1 && fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}
