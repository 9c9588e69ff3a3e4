#![forbid(unsafe_code)]

//! End-to-end checks of the built-in entity forms through the public API.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shelfkit_core::{AccessMode, DestroySignal};
use shelfkit_forms::entities::Uom;
use shelfkit_forms::entities::inventory_order::{
    ERROR_CODE_MIN_ORDER_QUANTITY, ERROR_CODE_QUANTITY_PER_PACK, InventoryOrder,
    InventoryOrderField, InventoryOrderProduct, InventoryOrderProductField, order_disable_table,
    product_disable_table,
};
use shelfkit_forms::entities::physical_inventory::{
    CountLocation, CountStatus, PhysicalInventory, PhysicalInventoryCount,
    PhysicalInventoryCountField, PhysicalInventoryField, count_disable_table,
    inventory_disable_table,
};
use shelfkit_forms::validation::{
    ERROR_CODE_INVALID_INTEGER, ERROR_CODE_MIN, ERROR_CODE_REQUIRED, error_message,
};
use shelfkit_forms::{FieldKey, FormError, FormOptions, FormRegistry, FormValue, ModelRef};

fn product(uom: &str) -> InventoryOrderProduct {
    InventoryOrderProduct {
        id: Some(1),
        product_code: Some("SKU-1".into()),
        description: Some("Widget".into()),
        uom: Some(Uom::new(uom)),
        quantity: Some(dec!(10)),
        suggested_quantity: Some(dec!(20)),
        minimum_order_quantity: Some(dec!(10)),
        quantity_per_pack: Some(dec!(10)),
        ..Default::default()
    }
}

fn order_with(products: Vec<InventoryOrderProduct>) -> InventoryOrder {
    InventoryOrder {
        id: Some(100),
        order_number: Some("PO-100".into()),
        store: Some("S1".into()),
        vendor: Some("V1".into()),
        inventory_order_products: products,
        ..Default::default()
    }
}

fn quantity_codes(
    form: &shelfkit_forms::TypedFormArray<InventoryOrderProductField>,
) -> Vec<&'static str> {
    form.row_control(0, InventoryOrderProductField::Quantity)
        .unwrap()
        .errors()
        .codes()
        .collect()
}

// ---------------------------------------------------------------------------
// Validator composition
// ---------------------------------------------------------------------------

#[test]
fn each_quantity_validators_compose() {
    let registry = FormRegistry::with_defaults();
    let lines = [product("EACH")];
    let mut form = registry
        .array::<InventoryOrderProductField>(
            lines.iter().map(ModelRef::from),
            &DestroySignal::new(),
            &FormOptions::new(AccessMode::Edit),
        )
        .unwrap();
    use InventoryOrderProductField::Quantity;

    form.patch_row_value(0, Quantity, dec!(10.1)).unwrap();
    assert!(quantity_codes(&form).contains(&ERROR_CODE_INVALID_INTEGER));

    form.patch_row_value(0, Quantity, dec!(-10)).unwrap();
    assert!(quantity_codes(&form).contains(&ERROR_CODE_MIN));

    form.patch_row_value(0, Quantity, FormValue::Null).unwrap();
    assert!(quantity_codes(&form).contains(&ERROR_CODE_REQUIRED));
}

#[test]
fn cross_field_quantity_rule() {
    let registry = FormRegistry::with_defaults();
    let lines = [product("CASE")];
    let mut form = registry
        .array::<InventoryOrderProductField>(
            lines.iter().map(ModelRef::from),
            &DestroySignal::new(),
            &FormOptions::new(AccessMode::Edit),
        )
        .unwrap();
    use InventoryOrderProductField::Quantity;

    form.patch_row_value(0, Quantity, dec!(5)).unwrap();
    assert_eq!(quantity_codes(&form), vec![ERROR_CODE_MIN_ORDER_QUANTITY]);

    form.patch_row_value(0, Quantity, dec!(15)).unwrap();
    assert_eq!(quantity_codes(&form), vec![ERROR_CODE_QUANTITY_PER_PACK]);

    for ok in [dec!(10), dec!(20)] {
        form.patch_row_value(0, Quantity, ok).unwrap();
        assert!(quantity_codes(&form).is_empty(), "{ok}");
    }
}

#[test]
fn cross_field_rule_tracks_limit_changes() {
    let registry = FormRegistry::with_defaults();
    let order = order_with(vec![product("CASE")]);
    let mut form = registry
        .group::<InventoryOrderField>(
            (&order).into(),
            &DestroySignal::new(),
            &FormOptions::new(AccessMode::Edit),
        )
        .unwrap();
    assert!(form.is_valid());

    form.patch_path("inventoryOrderProducts.0.minimumOrderQuantity", dec!(30))
        .unwrap();
    let quantity = form
        .form()
        .control("inventoryOrderProducts.0.quantity")
        .unwrap();
    assert!(quantity.has_error(ERROR_CODE_MIN_ORDER_QUANTITY));
    assert_eq!(
        form.invalid_paths(),
        vec!["inventoryOrderProducts.0.quantity".to_string()]
    );
}

#[test]
fn error_messages_have_fallback() {
    assert_ne!(error_message(ERROR_CODE_MIN_ORDER_QUANTITY), "Invalid value");
    assert_ne!(error_message(ERROR_CODE_QUANTITY_PER_PACK), "Invalid value");
    assert_eq!(error_message("somethingElse"), "Invalid value");
}

// ---------------------------------------------------------------------------
// Access-mode disabling
// ---------------------------------------------------------------------------

#[test]
fn order_header_matches_disable_table() {
    let registry = FormRegistry::with_defaults();
    let order = order_with(vec![product("EACH")]);
    for mode in AccessMode::ALL {
        let form = registry
            .build((&order).into(), &FormOptions::new(mode))
            .unwrap();
        for (field, flags) in order_disable_table() {
            let node = form.node(field.key()).unwrap();
            assert_eq!(
                node.is_disabled(),
                flags[mode.table_index()],
                "{field:?} in {mode}"
            );
        }
    }
}

#[test]
fn order_lines_match_disable_table() {
    let registry = FormRegistry::with_defaults();
    let line = product("EACH");
    for mode in AccessMode::ALL {
        let form = registry
            .build((&line).into(), &FormOptions::new(mode))
            .unwrap();
        for (field, flags) in product_disable_table() {
            assert_eq!(
                form.node(field.key()).unwrap().is_disabled(),
                flags[mode.table_index()],
                "{field:?} in {mode}"
            );
        }
    }
}

#[test]
fn store_enabled_only_in_add() {
    let registry = FormRegistry::with_defaults();
    let order = order_with(vec![]);
    for mode in AccessMode::ALL {
        let form = registry
            .group::<InventoryOrderField>(
                (&order).into(),
                &DestroySignal::new(),
                &FormOptions::new(mode),
            )
            .unwrap();
        let store = form.control(InventoryOrderField::Store).unwrap();
        assert_eq!(store.is_enabled(), mode.is_add(), "{mode}");
    }
}

#[test]
fn inventory_forms_match_disable_tables() {
    let registry = FormRegistry::with_defaults();
    let count = PhysicalInventoryCount {
        uom: Some(Uom::new("EACH")),
        actual_count: Some(dec!(1)),
        status: CountStatus::Open,
        ..Default::default()
    };
    let inventory = PhysicalInventory {
        store: Some("S1".into()),
        inventory_date: Some("2026-10-01".into()),
        status: CountStatus::Open,
        physical_inventory_counts: vec![count.clone()],
        ..Default::default()
    };
    for mode in AccessMode::ALL {
        let options = FormOptions::new(mode);
        let header = registry.build((&inventory).into(), &options).unwrap();
        for (field, flags) in inventory_disable_table() {
            assert_eq!(
                header.node(field.key()).unwrap().is_disabled(),
                flags[mode.table_index()],
                "{field:?} in {mode}"
            );
        }
        let line = registry.build((&count).into(), &options).unwrap();
        for (field, flags) in count_disable_table() {
            assert_eq!(
                line.node(field.key()).unwrap().is_disabled(),
                flags[mode.table_index()],
                "{field:?} in {mode}"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn registry_fails_fast_on_unknown_name() {
    let registry = FormRegistry::with_defaults();
    let order = order_with(vec![]);
    let options = FormOptions::new(AccessMode::View);
    let err = registry
        .group_by_name("NotRegistered", (&order).into(), &options)
        .unwrap_err();
    assert_eq!(err.to_string(), "form creator not found: NotRegistered");

    let form = registry
        .group_by_name("InventoryOrder", (&order).into(), &options)
        .unwrap();
    for field in InventoryOrderField::ALL {
        assert!(form.contains(field.key()), "{field:?}");
    }
}

#[test]
fn every_registered_entity_builds() {
    let registry = FormRegistry::with_defaults();
    let options = FormOptions::new(AccessMode::Edit);
    let order = order_with(vec![product("EACH")]);
    let inventory = PhysicalInventory::default();
    let location = CountLocation::new("BAY", dec!(1));

    assert!(registry.build((&order).into(), &options).is_ok());
    assert!(registry.build((&order.inventory_order_products[0]).into(), &options).is_ok());
    assert!(registry.build((&inventory).into(), &options).is_ok());
    assert!(
        registry
            .build((&PhysicalInventoryCount::default()).into(), &options)
            .is_ok()
    );
    assert!(registry.build((&location).into(), &options).is_ok());
}

// ---------------------------------------------------------------------------
// Count by location
// ---------------------------------------------------------------------------

#[test]
fn count_by_location_totals() {
    let registry = FormRegistry::with_defaults();
    let count = PhysicalInventoryCount {
        uom: Some(Uom::new("EACH")),
        counts_by_location: vec![
            CountLocation::new("BAY", dec!(10)),
            CountLocation::new("DISPLAY", dec!(15)),
        ],
        status: CountStatus::Open,
        ..Default::default()
    };
    let options = FormOptions::new(AccessMode::Edit).counting_by_location("DISPLAY");
    let lines = [count];
    let form = registry
        .array::<PhysicalInventoryCountField>(
            lines.iter().map(ModelRef::from),
            &DestroySignal::new(),
            &options,
        )
        .unwrap();
    let total = form
        .row_control(0, PhysicalInventoryCountField::TotalQuantity)
        .unwrap();
    let actual = form
        .row_control(0, PhysicalInventoryCountField::ActualCount)
        .unwrap();
    assert_eq!(total.value().as_decimal(), Some(dec!(25)));
    assert_eq!(actual.value().as_decimal(), Some(dec!(15)));
}

// ---------------------------------------------------------------------------
// Typed form lifecycle
// ---------------------------------------------------------------------------

#[test]
fn typed_form_notifies_until_destroyed() {
    let registry = FormRegistry::with_defaults();
    let inventory = PhysicalInventory {
        status: CountStatus::Open,
        ..Default::default()
    };
    let destroy = DestroySignal::new();
    let mut form = registry
        .group::<PhysicalInventoryField>(
            (&inventory).into(),
            &destroy,
            &FormOptions::new(AccessMode::Edit),
        )
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    form.subscribe(move |change| sink.lock().unwrap().push(change.clone()))
        .unwrap();

    form.set_control_value(PhysicalInventoryField::Description, "Spring count")
        .unwrap();
    assert!(
        form.control(PhysicalInventoryField::Description)
            .unwrap()
            .is_dirty()
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(seen.lock().unwrap()[0].path, "description");

    assert!(destroy.fire());
    assert!(form.is_destroyed());
    assert_eq!(
        form.patch_control_value(PhysicalInventoryField::Description, "late"),
        Err(FormError::Destroyed)
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(form.subscribe(|_| {}).is_err());
}

#[test]
fn rebuilt_forms_do_not_pile_up_destroy_hooks() {
    let registry = FormRegistry::with_defaults();
    let order = InventoryOrder {
        id: Some(1),
        inventory_order_products: vec![product("EACH")],
        ..Default::default()
    };
    let destroy = DestroySignal::new();
    let options = FormOptions::new(AccessMode::Edit);
    for _ in 0..100 {
        let form = registry
            .group::<InventoryOrderField>((&order).into(), &destroy, &options)
            .unwrap();
        drop(form);
    }
    assert_eq!(destroy.pending_hooks(), 0);

    let form = registry
        .group::<InventoryOrderField>((&order).into(), &destroy, &options)
        .unwrap();
    assert_eq!(destroy.pending_hooks(), 1);
    assert!(destroy.fire());
    assert!(form.is_destroyed());
}

#[test]
fn typed_form_requires_every_field() {
    use shelfkit_forms::{FormControl, FormGroup, TypedForm};

    let partial = FormGroup::new().with("id", FormControl::new(1i64));
    let err = TypedForm::<InventoryOrderField>::new(partial, DestroySignal::new()).unwrap_err();
    assert_eq!(err, FormError::MissingControl("orderNumber".into()));
}

#[test]
fn add_mode_default_is_one_shot() {
    let registry = FormRegistry::with_defaults();
    let mut line = product("EACH");
    line.quantity = None;
    let lines = [line];
    let mut form = registry
        .array::<InventoryOrderProductField>(
            lines.iter().map(ModelRef::from),
            &DestroySignal::new(),
            &FormOptions::new(AccessMode::Add),
        )
        .unwrap();
    use InventoryOrderProductField::{Quantity, SuggestedQuantity};
    assert_eq!(
        form.row_control(0, Quantity).unwrap().value().as_decimal(),
        Some(dec!(20))
    );

    form.patch_row_value(0, SuggestedQuantity, dec!(40)).unwrap();
    assert_eq!(
        form.row_control(0, Quantity).unwrap().value().as_decimal(),
        Some(dec!(20))
    );
    assert_eq!(
        form.row_control(0, Quantity).unwrap().value(),
        &FormValue::Number(Decimal::from(20))
    );
}
