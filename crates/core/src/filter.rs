//! Predicates used to search the inventory.

use crate::models::VehicleRecord;

/// A single search criterion.
///
/// Text criteria are case-insensitive substring matches; an empty term
/// matches every vehicle. Range bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleFilter {
    /// Every vehicle.
    All,
    /// Price between `min` and `max`.
    PriceRange {
        /// Lowest accepted price.
        min: f64,
        /// Highest accepted price.
        max: f64,
    },
    /// Make and model both contain the given terms.
    MakeModel {
        /// Term searched for in the make.
        make: String,
        /// Term searched for in the model.
        model: String,
    },
    /// Model year between `min` and `max`.
    YearRange {
        /// Earliest accepted year.
        min: i32,
        /// Latest accepted year.
        max: i32,
    },
    /// Color contains the given term.
    Color(String),
    /// Odometer reading between `min` and `max`.
    OdometerRange {
        /// Lowest accepted reading.
        min: u32,
        /// Highest accepted reading.
        max: u32,
    },
    /// Vehicle type contains the given term.
    VehicleType(String),
}

impl VehicleFilter {
    /// Whether `vehicle` satisfies this filter.
    pub fn matches(&self, vehicle: &VehicleRecord) -> bool {
        match self {
            VehicleFilter::All => true,
            VehicleFilter::PriceRange { min, max } => *min <= vehicle.price && vehicle.price <= *max,
            VehicleFilter::MakeModel { make, model } => {
                contains_ignore_case(&vehicle.make, make)
                    && contains_ignore_case(&vehicle.model, model)
            }
            VehicleFilter::YearRange { min, max } => (*min..=*max).contains(&vehicle.year),
            VehicleFilter::Color(color) => contains_ignore_case(&vehicle.color, color),
            VehicleFilter::OdometerRange { min, max } => (*min..=*max).contains(&vehicle.odometer),
            VehicleFilter::VehicleType(kind) => contains_ignore_case(&vehicle.vehicle_type, kind),
        }
    }

    /// Matching vehicles, in inventory order.
    pub fn apply<'a>(&self, vehicles: &'a [VehicleRecord]) -> Vec<&'a VehicleRecord> {
        vehicles
            .iter()
            .filter(|vehicle| self.matches(vehicle))
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystack.to_lowercase().contains(&needle)
}
