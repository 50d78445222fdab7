//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single vehicle held in the dealership inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Vehicle identification number. Treated as an identifier, not enforced unique.
    pub vin: i64,
    /// Model year.
    pub year: i32,
    /// Manufacturer (e.g. `Honda`).
    pub make: String,
    /// Model name (e.g. `Civic`).
    pub model: String,
    /// Body type (e.g. `SUV` or `Truck`).
    pub vehicle_type: String,
    /// Exterior color.
    pub color: String,
    /// Odometer reading.
    pub odometer: u32,
    /// Asking price.
    pub price: f64,
}

impl fmt::Display for VehicleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {} ({}, {}) · {} mi · ${:.2}",
            self.vin,
            self.year,
            self.make,
            self.model,
            self.vehicle_type,
            self.color,
            self.odometer,
            self.price
        )
    }
}

/// Name, address and phone number identifying the dealership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealershipHeader {
    /// Human readable dealership name.
    pub display_name: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
}

impl DealershipHeader {
    /// Build a header from its three parts.
    pub fn new(
        display_name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            address: address.into(),
            phone: phone.into(),
        }
    }

    /// Whether every field is non-empty, which is required of a fallback header.
    pub fn is_complete(&self) -> bool {
        !self.display_name.is_empty() && !self.address.is_empty() && !self.phone.is_empty()
    }
}
