#![forbid(unsafe_code)]

//! Property tests for count-by-location totals and archiving.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shelfkit_core::AccessMode;
use shelfkit_forms::entities::Uom;
use shelfkit_forms::entities::physical_inventory::{
    CountLocation, CountStatus, PhysicalInventoryCount, archive_actual_count, location_total,
};
use shelfkit_forms::{FormOptions, FormRegistry, FormValue};

fn locations() -> impl Strategy<Value = Vec<CountLocation>> {
    prop::collection::btree_map("[A-E]", 0u32..1_000, 0..5).prop_map(|counts| {
        counts
            .into_iter()
            .map(|(location, count)| CountLocation::new(location, Decimal::from(count)))
            .collect()
    })
}

fn count_line(counts: Vec<CountLocation>) -> PhysicalInventoryCount {
    PhysicalInventoryCount {
        uom: Some(Uom::new("EACH")),
        counts_by_location: counts,
        status: CountStatus::Open,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn total_is_sum_of_locations(counts in locations(), current in "[A-F]") {
        let registry = FormRegistry::with_defaults();
        let options = FormOptions::new(AccessMode::Edit).counting_by_location(current.clone());
        let expected_total = location_total(&counts);
        let expected_actual = counts
            .iter()
            .find(|c| c.location == current)
            .map_or(Decimal::ZERO, |c| c.count);

        let line = count_line(counts);
        let row = registry.build((&line).into(), &options).unwrap();
        prop_assert_eq!(
            row.control("totalQuantity").unwrap().value().as_decimal(),
            Some(expected_total)
        );
        prop_assert_eq!(
            row.control("actualCount").unwrap().value().as_decimal(),
            Some(expected_actual)
        );
    }

    #[test]
    fn archive_keeps_total_consistent(
        counts in locations(),
        current in "[A-F]",
        entered in 0u32..1_000,
    ) {
        let registry = FormRegistry::with_defaults();
        let options = FormOptions::new(AccessMode::Edit).counting_by_location(current.clone());
        let others: Decimal = counts
            .iter()
            .filter(|c| c.location != current)
            .map(|c| c.count)
            .sum();

        let line = count_line(counts);
        let mut row = registry.build((&line).into(), &options).unwrap();
        row.patch_value("actualCount", Decimal::from(entered)).unwrap();
        let total = archive_actual_count(&mut row, &registry, &options).unwrap();

        prop_assert_eq!(total, others + Decimal::from(entered));
        let items = match row.array("countsByLocation").unwrap().raw_value() {
            FormValue::List(items) => items,
            other => panic!("expected a list, got {other:?}"),
        };
        let matching = items
            .iter()
            .filter(|item| item.get("location").and_then(|v| v.as_text()) == Some(current.as_str()))
            .count();
        prop_assert_eq!(matching, 1);
    }
}
