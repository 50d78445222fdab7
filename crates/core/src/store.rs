//! Inventory kept in memory and mirrored to a durable resource.

use std::io::{BufRead, BufReader, Write};

use tracing::{debug, info};

use crate::{
    codec,
    error::{StoreError, StoreResult},
    models::{DealershipHeader, VehicleRecord},
    resource::{Resource, WriteMode},
};

/// Ordered vehicle inventory backed by a [`Resource`].
///
/// Every mutating call writes to the resource before it returns. Additions
/// append to the end of the resource; removals rewrite it from scratch.
/// Memory is only updated once the write has been committed, so a failed
/// write leaves the inventory as it was.
#[derive(Debug)]
pub struct InventoryStore<R: Resource> {
    header: DealershipHeader,
    inventory: Vec<VehicleRecord>,
    resource: R,
}

impl<R: Resource> InventoryStore<R> {
    /// Load the inventory from `resource`.
    ///
    /// The first line of the resource is the header. When it is missing or
    /// malformed, `fallback` is adopted instead (provided all of its fields
    /// are non-empty) and the resource is rewritten so the header persists.
    /// Malformed vehicle lines are skipped.
    pub fn open(fallback: DealershipHeader, mut resource: R) -> StoreResult<Self> {
        let (header, inventory, needs_rewrite) = {
            let reader = BufReader::new(resource.open_reader()?);
            let mut lines = reader.split(b'\n');

            let first = lines.next().transpose()?;
            let loaded = first
                .as_deref()
                .and_then(|raw| codec::parse_header(&codec::decode_line(raw)));
            let (header, needs_rewrite) = match loaded {
                Some(header) => (header, false),
                None if fallback.is_complete() => {
                    info!(
                        "inventory header missing or malformed; adopting fallback {:?}",
                        fallback.display_name
                    );
                    (fallback, true)
                }
                None => return Err(StoreError::MissingHeader),
            };

            let mut inventory = Vec::new();
            let mut skipped = 0usize;
            for (index, line) in lines.enumerate() {
                let line = line?;
                match codec::parse(&codec::decode_line(&line)) {
                    Some(vehicle) => inventory.push(vehicle),
                    None => {
                        skipped += 1;
                        debug!(line = index + 2, "skipping malformed inventory line");
                    }
                }
            }
            info!(
                "loaded {} vehicles for {} ({} lines skipped)",
                inventory.len(),
                header.display_name,
                skipped
            );
            (header, inventory, needs_rewrite)
        };

        if needs_rewrite {
            rewrite(&mut resource, &header, &inventory)?;
        }

        Ok(Self {
            header,
            inventory,
            resource,
        })
    }

    /// Effective dealership header.
    pub fn header(&self) -> &DealershipHeader {
        &self.header
    }

    /// Dealership name.
    pub fn display_name(&self) -> &str {
        &self.header.display_name
    }

    /// Dealership street address.
    pub fn address(&self) -> &str {
        &self.header.address
    }

    /// Dealership phone number.
    pub fn phone(&self) -> &str {
        &self.header.phone
    }

    /// Every vehicle, in insertion order.
    pub fn vehicles(&self) -> &[VehicleRecord] {
        &self.inventory
    }

    /// Number of vehicles in the inventory.
    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    /// Whether the inventory holds no vehicles.
    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    /// Borrow the backing resource.
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Consume the store and return the backing resource.
    pub fn into_resource(self) -> R {
        self.resource
    }

    /// Add a vehicle, appending a single line to the resource.
    pub fn add(&mut self, vehicle: VehicleRecord) -> StoreResult<()> {
        append(&mut self.resource, std::slice::from_ref(&vehicle))?;
        debug!(vin = vehicle.vin, "added vehicle");
        self.inventory.push(vehicle);
        Ok(())
    }

    /// Add several vehicles with a single append, preserving their order.
    pub fn add_all(&mut self, vehicles: impl IntoIterator<Item = VehicleRecord>) -> StoreResult<()> {
        let vehicles: Vec<VehicleRecord> = vehicles.into_iter().collect();
        if vehicles.is_empty() {
            return Ok(());
        }
        append(&mut self.resource, &vehicles)?;
        debug!(count = vehicles.len(), "added vehicles");
        self.inventory.extend(vehicles);
        Ok(())
    }

    /// Remove the first vehicle equal to `vehicle` and rewrite the resource.
    ///
    /// Returns `false` without touching the resource when nothing matched.
    pub fn remove(&mut self, vehicle: &VehicleRecord) -> StoreResult<bool> {
        let Some(index) = self
            .inventory
            .iter()
            .position(|candidate| candidate == vehicle)
        else {
            return Ok(false);
        };

        let remaining = self
            .inventory
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, candidate)| candidate);
        rewrite(&mut self.resource, &self.header, remaining)?;

        self.inventory.remove(index);
        debug!(vin = vehicle.vin, "removed vehicle");
        Ok(true)
    }

    /// Remove every vehicle, leaving only the header in the resource.
    pub fn clear(&mut self) -> StoreResult<()> {
        rewrite(&mut self.resource, &self.header, std::iter::empty())?;
        self.inventory.clear();
        debug!("cleared inventory");
        Ok(())
    }
}

fn append<R: Resource>(resource: &mut R, vehicles: &[VehicleRecord]) -> StoreResult<()> {
    let mut writer = resource.open_writer(WriteMode::Append)?;
    for vehicle in vehicles {
        write!(writer, "\n{}", codec::serialize(vehicle))?;
    }
    resource.commit(writer)?;
    Ok(())
}

fn rewrite<'a, R: Resource>(
    resource: &mut R,
    header: &DealershipHeader,
    vehicles: impl IntoIterator<Item = &'a VehicleRecord>,
) -> StoreResult<()> {
    let mut writer = resource.open_writer(WriteMode::Overwrite)?;
    writer.write_all(codec::serialize_header(header).as_bytes())?;
    for vehicle in vehicles {
        write!(writer, "\n{}", codec::serialize(vehicle))?;
    }
    resource.commit(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FileResource, MemoryResource};
    use anyhow::Result;
    use std::{fs, io};
    use tempfile::tempdir;

    const HEADER_LINE: &str = "Joe's Autos|1 Main St|555-0100";

    fn joes() -> DealershipHeader {
        DealershipHeader::new("Joe's Autos", "1 Main St", "555-0100")
    }

    fn vehicle(vin: i64, make: &str, model: &str, price: f64) -> VehicleRecord {
        VehicleRecord {
            vin,
            year: 2018,
            make: make.to_string(),
            model: model.to_string(),
            vehicle_type: "Sedan".to_string(),
            color: "Gray".to_string(),
            odometer: 42000,
            price,
        }
    }

    fn resource_with(records: &[VehicleRecord]) -> MemoryResource {
        let mut text = HEADER_LINE.to_string();
        for record in records {
            text.push('\n');
            text.push_str(&codec::serialize(record));
        }
        MemoryResource::new(text)
    }

    #[test]
    fn empty_resource_adopts_fallback_and_persists_it() -> Result<()> {
        let store = InventoryStore::open(joes(), MemoryResource::default())?;
        assert_eq!(store.display_name(), "Joe's Autos");
        assert_eq!(store.address(), "1 Main St");
        assert_eq!(store.phone(), "555-0100");
        assert!(store.is_empty());
        assert_eq!(store.resource().contents(), HEADER_LINE);
        Ok(())
    }

    #[test]
    fn incomplete_fallback_on_empty_resource_fails() {
        let fallback = DealershipHeader::new("Joe's Autos", "", "555-0100");
        let result = InventoryStore::open(fallback, MemoryResource::default());
        assert!(matches!(result, Err(StoreError::MissingHeader)));
    }

    #[test]
    fn valid_header_is_kept_without_rewrite() -> Result<()> {
        let original = "Lot 9|9 Side Rd|555-0199\n1|2001|Ford|Focus|Hatch|Red|90000|2500.00\n";
        let fallback = DealershipHeader::new("", "", "");
        let store = InventoryStore::open(fallback, MemoryResource::new(original))?;
        assert_eq!(store.display_name(), "Lot 9");
        assert_eq!(store.len(), 1);
        assert_eq!(store.resource().contents(), original);
        Ok(())
    }

    #[test]
    fn loaded_header_is_trusted_even_with_empty_field() -> Result<()> {
        let store = InventoryStore::open(joes(), MemoryResource::new("|1 Main St|555-0100"))?;
        assert_eq!(store.display_name(), "");
        assert_eq!(store.resource().contents(), "|1 Main St|555-0100");
        Ok(())
    }

    #[test]
    fn malformed_header_is_replaced_by_fallback() -> Result<()> {
        let resource = MemoryResource::new("not a header\n5|2015|Kia|Soul|Wagon|Green|30000|9000.00");
        let store = InventoryStore::open(joes(), resource)?;
        assert_eq!(store.header(), &joes());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.resource().contents(),
            "Joe's Autos|1 Main St|555-0100\n5|2015|Kia|Soul|Wagon|Green|30000|9000.00"
        );
        Ok(())
    }

    #[test]
    fn skips_malformed_lines_and_keeps_order() -> Result<()> {
        let text = [
            HEADER_LINE,
            "1|2010|Toyota|Corolla|Sedan|White|120000|4500.00",
            "garbage",
            "2|2011|Honda|Fit|Hatch|Blue|80000",
            "",
            "3|20x2|Mazda|3|Sedan|Red|50000|7000.00",
            "4|2013|Subaru|Outback|Wagon|Green|70000|8000.00",
            "5|2014|VW|Golf|Hatch|Black|60000|price",
            "6|2016|Tesla|Model 3|Sedan|White|20000|35000.00\r",
        ]
        .join("\n");
        let store = InventoryStore::open(joes(), MemoryResource::new(text))?;
        let vins: Vec<i64> = store.vehicles().iter().map(|v| v.vin).collect();
        assert_eq!(vins, vec![1, 4, 6]);
        Ok(())
    }

    #[test]
    fn damaged_bytes_only_spoil_their_own_line() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.csv");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"Joe's Autos|1 Main St|555-0100\n");
        bytes.extend_from_slice(b"1|2010|Toyota|Corolla|Sedan|White|120000|4500.00\n");
        bytes.extend_from_slice(b"2|2011|\xffonda|Fit|Hatch|Blue|80000|3900.00\n");
        bytes.extend_from_slice(b"\xfe3|2012|Mazda|3|Sedan|Red|50000|7000.00\n");
        bytes.extend_from_slice(b"4|2013|Subaru|Outback|Wagon|Green|70000|8000.00");
        fs::write(&path, bytes)?;

        let store = InventoryStore::open(joes(), FileResource::new(&path))?;
        let vins: Vec<i64> = store.vehicles().iter().map(|v| v.vin).collect();
        assert_eq!(vins, vec![1, 2, 4]);
        assert_eq!(store.vehicles()[1].make, "\u{FFFD}onda");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn remove_keeps_inventory_file_mode() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let path = dir.path().join("inventory.csv");
        let records = vec![vehicle(1, "Ford", "Focus", 2500.0), vehicle(2, "Kia", "Rio", 3000.0)];
        fs::write(&path, resource_with(&records).contents())?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;

        let mut store = InventoryStore::open(joes(), FileResource::new(&path))?;
        assert!(store.remove(&records[0])?);

        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o644);
        Ok(())
    }

    #[test]
    fn add_appends_without_rewriting_prior_lines() -> Result<()> {
        let existing = vec![vehicle(1, "Ford", "Focus", 2500.0), vehicle(2, "Kia", "Rio", 3000.0)];
        let resource = resource_with(&existing);
        let before = resource.contents().to_string();
        let mut store = InventoryStore::open(joes(), resource)?;

        let added = vehicle(3, "Mazda", "CX-5", 21000.0);
        store.add(added.clone())?;

        assert_eq!(
            store.resource().contents(),
            format!("{before}\n{}", codec::serialize(&added))
        );
        assert_eq!(store.vehicles().last(), Some(&added));
        Ok(())
    }

    #[test]
    fn add_all_appends_in_input_order() -> Result<()> {
        let mut store = InventoryStore::open(joes(), MemoryResource::default())?;
        let batch = vec![vehicle(10, "BMW", "X3", 30000.0), vehicle(11, "Audi", "A4", 28000.0)];
        store.add_all(batch.clone())?;

        assert_eq!(store.vehicles(), batch.as_slice());
        assert_eq!(
            store.resource().contents(),
            format!(
                "{HEADER_LINE}\n{}\n{}",
                codec::serialize(&batch[0]),
                codec::serialize(&batch[1])
            )
        );

        store.add_all(Vec::new())?;
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[test]
    fn remove_rewrites_remaining_vehicles() -> Result<()> {
        let records = vec![
            vehicle(1, "Ford", "Focus", 2500.0),
            vehicle(2, "Kia", "Rio", 3000.0),
            vehicle(3, "Mazda", "CX-5", 21000.0),
        ];
        let mut store = InventoryStore::open(joes(), resource_with(&records))?;

        assert!(store.remove(&records[1])?);
        assert_eq!(store.vehicles(), &[records[0].clone(), records[2].clone()]);
        assert_eq!(
            store.resource().contents(),
            format!(
                "{HEADER_LINE}\n{}\n{}",
                codec::serialize(&records[0]),
                codec::serialize(&records[2])
            )
        );
        assert!(!store.resource().contents().contains("Rio"));
        Ok(())
    }

    #[test]
    fn remove_only_drops_first_duplicate() -> Result<()> {
        let twin = vehicle(7, "Jeep", "Wrangler", 15000.0);
        let records = vec![twin.clone(), vehicle(8, "Fiat", "500", 6000.0), twin.clone()];
        let mut store = InventoryStore::open(joes(), resource_with(&records))?;

        assert!(store.remove(&twin)?);
        let vins: Vec<i64> = store.vehicles().iter().map(|v| v.vin).collect();
        assert_eq!(vins, vec![8, 7]);
        Ok(())
    }

    #[test]
    fn remove_missing_vehicle_leaves_resource_untouched() -> Result<()> {
        let records = vec![vehicle(1, "Ford", "Focus", 2500.0)];
        let resource = resource_with(&records);
        let before = resource.contents().to_string();
        let mut store = InventoryStore::open(joes(), resource)?;

        let mut stranger = records[0].clone();
        stranger.price = 2600.0;
        assert!(!store.remove(&stranger)?);
        assert_eq!(store.len(), 1);
        assert_eq!(store.resource().contents(), before);
        Ok(())
    }

    #[test]
    fn clear_leaves_header_only() -> Result<()> {
        let records = vec![vehicle(1, "Ford", "Focus", 2500.0), vehicle(2, "Kia", "Rio", 3000.0)];
        let mut store = InventoryStore::open(joes(), resource_with(&records))?;

        store.clear()?;
        assert!(store.vehicles().is_empty());
        assert_eq!(store.resource().contents(), HEADER_LINE);

        store.clear()?;
        assert!(store.vehicles().is_empty());
        assert_eq!(store.resource().contents(), HEADER_LINE);
        Ok(())
    }

    #[test]
    fn dealership_walkthrough() -> Result<()> {
        let mut store = InventoryStore::open(joes(), MemoryResource::default())?;
        assert_eq!(store.resource().contents(), "Joe's Autos|1 Main St|555-0100");

        store.add(VehicleRecord {
            vin: 123,
            year: 2020,
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            vehicle_type: "Sedan".to_string(),
            color: "Blue".to_string(),
            odometer: 15000,
            price: 18999.99,
        })?;

        let lines: Vec<&str> = store.resource().contents().lines().collect();
        assert_eq!(
            lines,
            vec![
                "Joe's Autos|1 Main St|555-0100",
                "123|2020|Honda|Civic|Sedan|Blue|15000|18999.99"
            ]
        );
        Ok(())
    }

    #[test]
    fn reopening_file_sees_every_mutation() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inventory.csv");

        let mut store = InventoryStore::open(joes(), FileResource::new(&path))?;
        let kept = vehicle(1, "Ford", "Focus", 2500.0);
        let dropped = vehicle(2, "Kia", "Rio", 3000.0);
        store.add(kept.clone())?;
        store.add_all(vec![dropped.clone(), vehicle(3, "Mazda", "3", 7000.0)])?;
        assert!(store.remove(&dropped)?);
        drop(store);

        let fallback = DealershipHeader::new("Other", "Elsewhere", "000");
        let reopened = InventoryStore::open(fallback, FileResource::new(&path))?;
        assert_eq!(reopened.header(), &joes());
        let vins: Vec<i64> = reopened.vehicles().iter().map(|v| v.vin).collect();
        assert_eq!(vins, vec![1, 3]);
        assert_eq!(fs::read_to_string(&path)?.lines().count(), 3);
        Ok(())
    }

    /// Resource whose writes always fail once `fail_writes` is set.
    #[derive(Default)]
    struct FlakyResource {
        inner: MemoryResource,
        fail_writes: bool,
    }

    impl Resource for FlakyResource {
        type Reader = <MemoryResource as Resource>::Reader;
        type Writer = <MemoryResource as Resource>::Writer;

        fn open_reader(&mut self) -> io::Result<Self::Reader> {
            self.inner.open_reader()
        }

        fn open_writer(&mut self, mode: WriteMode) -> io::Result<Self::Writer> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.inner.open_writer(mode)
        }

        fn commit(&mut self, writer: Self::Writer) -> io::Result<()> {
            self.inner.commit(writer)
        }
    }

    #[test]
    fn failed_writes_leave_memory_unchanged() -> Result<()> {
        let resource = FlakyResource {
            inner: resource_with(&[vehicle(1, "Ford", "Focus", 2500.0)]),
            fail_writes: false,
        };
        let mut store = InventoryStore::open(joes(), resource)?;
        store.resource.fail_writes = true;

        assert!(matches!(
            store.add(vehicle(2, "Kia", "Rio", 3000.0)),
            Err(StoreError::Io(_))
        ));
        assert!(matches!(
            store.remove(&vehicle(1, "Ford", "Focus", 2500.0)),
            Err(StoreError::Io(_))
        ));
        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.vehicles()[0].vin, 1);
        Ok(())
    }

    #[test]
    fn fallback_rewrite_failure_aborts_open() {
        let resource = FlakyResource {
            inner: MemoryResource::default(),
            fail_writes: true,
        };
        let result = InventoryStore::open(joes(), resource);
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
