use std::{
    fs,
    io::{BufRead, Write},
    str::FromStr,
};

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dealership_core::{
    codec, InventoryStore, Resource, StoreResult, VehicleFilter, VehicleRecord,
};
use tracing::{error, info};

const MENU: &str = "\
--SEARCH--
1 - By price
2 - By make/model
3 - By year
4 - By color
5 - By odometer
6 - By type
7 - Show all
--OTHER--
8 - Add vehicle
9 - Remove vehicle
10 - Import vehicles from file
99 - Exit
";

/// Line-oriented menu over an inventory store.
pub struct ConsoleApp<R: Resource, I, O> {
    store: InventoryStore<R>,
    input: I,
    output: O,
}

impl<R, I, O> ConsoleApp<R, I, O>
where
    R: Resource,
    I: BufRead,
    O: Write,
{
    pub fn new(store: InventoryStore<R>, input: I, output: O) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Run the menu until the user exits or input ends.
    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Welcome to {}!",
            self.store.display_name().bold().cyan()
        )?;
        writeln!(
            self.output,
            "{} · {}",
            self.store.address(),
            self.store.phone()
        )?;

        loop {
            write!(self.output, "\n{MENU}Choose an option: ")?;
            self.output.flush()?;
            let Some(choice) = self.read_line()? else {
                break;
            };

            match choice.as_str() {
                "1" | "2" | "3" | "4" | "5" | "6" | "7" => {
                    if let Some(filter) = self.ask_filter(&choice)? {
                        self.show_vehicles(&filter)?;
                    }
                }
                "8" => self.add_vehicle()?,
                "9" => self.remove_vehicle()?,
                "10" => self.import_vehicles()?,
                "99" => break,
                other => self.warn(&format!("Unknown option {other}! Please try again."))?,
            }
        }

        writeln!(self.output, "Thanks for stopping by!")?;
        Ok(())
    }

    /// Consume the app and return the store.
    #[cfg(test)]
    pub fn into_store(self) -> InventoryStore<R> {
        self.store
    }

    fn ask_filter(&mut self, choice: &str) -> Result<Option<VehicleFilter>> {
        let filter = match choice {
            "1" => {
                let Some(min) = self.ask_value::<f64>("Minimum price", Some(0.0))? else {
                    return Ok(None);
                };
                let Some(max) = self.ask_value("Maximum price", Some(f64::INFINITY))? else {
                    return Ok(None);
                };
                VehicleFilter::PriceRange { min, max }
            }
            "2" => {
                let Some(make) = self.ask_text("Make", false)? else {
                    return Ok(None);
                };
                let Some(model) = self.ask_text("Model", false)? else {
                    return Ok(None);
                };
                VehicleFilter::MakeModel { make, model }
            }
            "3" => {
                let Some(min) = self.ask_value::<i32>("Earliest year", Some(i32::MIN))? else {
                    return Ok(None);
                };
                let Some(max) = self.ask_value("Latest year", Some(i32::MAX))? else {
                    return Ok(None);
                };
                VehicleFilter::YearRange { min, max }
            }
            "4" => match self.ask_text("Color", false)? {
                Some(color) => VehicleFilter::Color(color),
                None => return Ok(None),
            },
            "5" => {
                let Some(min) = self.ask_value::<u32>("Minimum odometer", Some(0))? else {
                    return Ok(None);
                };
                let Some(max) = self.ask_value("Maximum odometer", Some(u32::MAX))? else {
                    return Ok(None);
                };
                VehicleFilter::OdometerRange { min, max }
            }
            "6" => match self.ask_text("Type", false)? {
                Some(kind) => VehicleFilter::VehicleType(kind),
                None => return Ok(None),
            },
            _ => VehicleFilter::All,
        };
        Ok(Some(filter))
    }

    fn show_vehicles(&mut self, filter: &VehicleFilter) -> Result<()> {
        let matches = filter.apply(self.store.vehicles());
        if matches.is_empty() {
            writeln!(self.output, "{}", "No vehicles found.".dark_grey())?;
            return Ok(());
        }
        for vehicle in &matches {
            writeln!(self.output, "{vehicle}")?;
        }
        writeln!(self.output, "{} vehicle(s) shown.", matches.len())?;
        Ok(())
    }

    fn add_vehicle(&mut self) -> Result<()> {
        let Some(vehicle) = self.ask_vehicle()? else {
            return Ok(());
        };
        let vin = vehicle.vin;
        let result = self.store.add(vehicle);
        self.report(result, &format!("Added vehicle #{vin}."))
    }

    fn ask_vehicle(&mut self) -> Result<Option<VehicleRecord>> {
        let Some(vin) = self.ask_value::<i64>("VIN", None)? else {
            return Ok(None);
        };
        let Some(year) = self.ask_value::<i32>("Year", None)? else {
            return Ok(None);
        };
        let Some(make) = self.ask_text("Make", true)? else {
            return Ok(None);
        };
        let Some(model) = self.ask_text("Model", true)? else {
            return Ok(None);
        };
        let Some(vehicle_type) = self.ask_text("Type", true)? else {
            return Ok(None);
        };
        let Some(color) = self.ask_text("Color", true)? else {
            return Ok(None);
        };
        let Some(odometer) = self.ask_value::<u32>("Odometer", None)? else {
            return Ok(None);
        };
        let Some(price) = self.ask_value::<f64>("Price", None)? else {
            return Ok(None);
        };
        if !price.is_finite() || price < 0.0 {
            self.warn("Price must be a non-negative amount.")?;
            return Ok(None);
        }

        Ok(Some(VehicleRecord {
            vin,
            year,
            make,
            model,
            vehicle_type,
            color,
            odometer,
            price,
        }))
    }

    fn remove_vehicle(&mut self) -> Result<()> {
        let Some(vin) = self.ask_value::<i64>("VIN of vehicle to remove", None)? else {
            return Ok(());
        };
        let Some(vehicle) = self
            .store
            .vehicles()
            .iter()
            .find(|vehicle| vehicle.vin == vin)
            .cloned()
        else {
            return self.warn(&format!("No vehicle with VIN {vin}."));
        };

        let result = self.store.remove(&vehicle).map(|_| ());
        self.report(result, &format!("Removed {vehicle}."))
    }

    fn import_vehicles(&mut self) -> Result<()> {
        let Some(path) = self.ask_text("File to import", true)? else {
            return Ok(());
        };
        let content = match fs::read(&path).with_context(|| format!("failed to read {path}")) {
            Ok(content) => content,
            Err(err) => return self.warn(&format!("{err:#}")),
        };

        let mut skipped = 0usize;
        let vehicles: Vec<VehicleRecord> = content
            .split(|byte| *byte == b'\n')
            .map(codec::decode_line)
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = codec::parse(&line);
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();
        let count = vehicles.len();
        info!("importing {count} vehicles from {path} ({skipped} lines skipped)");

        let result = self.store.add_all(vehicles);
        self.report(
            result,
            &format!("Imported {count} vehicle(s), skipped {skipped} line(s)."),
        )
    }

    fn report(&mut self, result: StoreResult<()>, success: &str) -> Result<()> {
        match result {
            Ok(()) => {
                writeln!(self.output, "{}", success.green())?;
                Ok(())
            }
            Err(err) => {
                error!("inventory update failed: {err}");
                self.warn(&format!("Could not save the inventory: {err}"))
            }
        }
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message.red())?;
        Ok(())
    }

    /// Prompt for a number. Blank input takes `default` when one is given.
    /// Returns `None` when input ended or the answer was rejected.
    fn ask_value<T: FromStr>(&mut self, label: &str, default: Option<T>) -> Result<Option<T>> {
        let Some(answer) = self.prompt(label)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            if default.is_none() {
                self.warn(&format!("{label} is required."))?;
            }
            return Ok(default);
        }
        match answer.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                self.warn(&format!("'{answer}' is not a valid {}.", label.to_lowercase()))?;
                Ok(None)
            }
        }
    }

    /// Prompt for free text, which may not contain the field delimiter.
    fn ask_text(&mut self, label: &str, required: bool) -> Result<Option<String>> {
        let Some(answer) = self.prompt(label)? else {
            return Ok(None);
        };
        if answer.contains(codec::DELIMITER) {
            self.warn(&format!("{label} may not contain '{}'.", codec::DELIMITER))?;
            return Ok(None);
        }
        if required && answer.is_empty() {
            self.warn(&format!("{label} is required."))?;
            return Ok(None);
        }
        Ok(Some(answer))
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", label.bold())?;
        self.output.flush()?;
        self.read_line()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read console input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
