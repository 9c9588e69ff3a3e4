#![forbid(unsafe_code)]

//! Built-in entity forms.
//!
//! Each entity module owns its model structs, its field enum, its
//! access-mode disable table and its creator functions.
//! [`register_defaults`] wires every creator into a registry.

pub mod inventory_order;
pub mod physical_inventory;

use shelfkit_core::AccessMode;

use crate::control::{FormControl, FormGroup};
use crate::registry::{EntityKind, FormRegistry};
use crate::typed::FieldKey;
use crate::validation::{
    DecimalNumber, ERROR_CODE_INVALID_DECIMAL, IntegerNumber, ValidationContext, ValidationResult,
    Validator,
};

/// Unit-of-measure code whose quantities must be whole numbers.
pub const UOM_EACH: &str = "EACH";

/// Per-field disabled flags, indexed by [`AccessMode::table_index`]
/// (`[view, edit, add]`).
pub type DisableTable<F> = &'static [(F, [bool; 3])];

/// Register every built-in creator.
pub fn register_defaults(registry: &mut FormRegistry) {
    registry.register(EntityKind::InventoryOrder, inventory_order::create_inventory_order);
    registry.register(
        EntityKind::InventoryOrderProduct,
        inventory_order::create_inventory_order_product,
    );
    registry.register(
        EntityKind::PhysicalInventory,
        physical_inventory::create_physical_inventory,
    );
    registry.register(
        EntityKind::PhysicalInventoryCount,
        physical_inventory::create_physical_inventory_count,
    );
    registry.register(EntityKind::CountLocation, physical_inventory::create_count_location);
}

/// Disable every field the table marks for `mode`. Never enables: nested
/// arrays keep whatever their own creators decided.
pub(crate) fn apply_disable_table<F: FieldKey>(
    group: &mut FormGroup,
    table: &[(F, [bool; 3])],
    mode: AccessMode,
) {
    for (field, flags) in table {
        if flags[mode.table_index()] {
            if let Some(node) = group.node_mut(field.key()) {
                node.disable();
            }
        }
    }
}

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Uom {
    pub code: String,
    pub description: Option<String>,
}

impl Uom {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn is_each(&self) -> bool {
        self.code == UOM_EACH
    }
}

/// `{code, description}` group; both read-only.
pub(crate) fn uom_group(uom: Option<&Uom>) -> FormGroup {
    FormGroup::new()
        .with(
            "code",
            FormControl::new(uom.map(|u| u.code.clone())).disabled(),
        )
        .with(
            "description",
            FormControl::new(uom.and_then(|u| u.description.clone())).disabled(),
        )
}

/// Whole numbers for [`UOM_EACH`], otherwise up to `scale` decimals.
///
/// Reads the sibling `uom.code` on every run, so a UOM change applies on the
/// next validation pass.
#[derive(Debug, Clone, Copy)]
pub struct UomQuantity {
    pub scale: u32,
}

impl UomQuantity {
    #[must_use]
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }
}

impl Validator for UomQuantity {
    fn code(&self) -> &'static str {
        ERROR_CODE_INVALID_DECIMAL
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let each = ctx
            .sibling("uom.code")
            .and_then(|v| v.as_text())
            .is_some_and(|code| code == UOM_EACH);
        if each {
            IntegerNumber::check(ctx.value)
        } else {
            DecimalNumber::new(self.scale).check(ctx.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ERROR_CODE_INVALID_INTEGER, ErrorMap};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn line(uom: &str, qty: Decimal) -> FormGroup {
        let mut group = FormGroup::new()
            .with("uom", uom_group(Some(&Uom::new(uom))))
            .with("quantity", FormControl::new(qty).with_validator(UomQuantity::new(4)));
        group.validate();
        group
    }

    #[test]
    fn each_requires_whole_numbers() {
        let group = line(UOM_EACH, Decimal::new(15, 1));
        assert!(
            group
                .control("quantity")
                .unwrap()
                .has_error(ERROR_CODE_INVALID_INTEGER)
        );
        assert!(line(UOM_EACH, Decimal::from(2)).is_valid());
    }

    #[test]
    fn other_units_allow_scale() {
        assert!(line("KG", Decimal::new(15, 1)).is_valid());
        assert!(line("KG", Decimal::new(12345, 4)).is_valid());
        let group = line("KG", Decimal::new(123_456, 5));
        assert!(
            group
                .control("quantity")
                .unwrap()
                .has_error(ERROR_CODE_INVALID_DECIMAL)
        );
    }

    #[test]
    fn without_uom_falls_back_to_decimal() {
        let value = Decimal::new(15, 1).into();
        let validators: Vec<Arc<dyn Validator>> = vec![Arc::new(UomQuantity::new(4))];
        let errors = ErrorMap::collect(&validators, &ValidationContext::standalone(&value));
        assert!(errors.is_empty());
    }

    #[test]
    fn uom_group_is_read_only() {
        let group = uom_group(Some(&Uom::new("KG")));
        assert!(group.is_disabled());
        assert_eq!(
            group.control("code").unwrap().value().as_text(),
            Some("KG")
        );
    }
}
