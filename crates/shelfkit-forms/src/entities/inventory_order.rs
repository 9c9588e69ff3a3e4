#![forbid(unsafe_code)]

//! Inventory orders and their product lines.
//!
//! # Access modes
//!
//! | Field | View | Edit | Add |
//! |-------|------|------|-----|
//! | identity, status, audit | locked | locked | locked |
//! | `store`, `vendor` | locked | locked | required |
//! | `comments` | locked | open | open |
//! | line `quantity` | locked | open | open |
//! | other line fields | locked | locked | locked |
//!
//! In Add mode an empty `quantity` starts from `suggestedQuantity`. The
//! default is applied once, when the form is built.

use rust_decimal::Decimal;
use shelfkit_core::AccessMode;

use super::{DisableTable, Uom, UomQuantity, apply_disable_table, uom_group};
use crate::control::{FormControl, FormGroup};
use crate::error::{FormError, FormResult};
use crate::registry::{EntityKind, FormOptions, FormRegistry, ModelRef};
use crate::typed::FieldKey;
use crate::validation::{
    MaxLength, Min, Required, ValidationContext, ValidationError, ValidationResult, Validator,
};

/// Quantity below the vendor's minimum order quantity.
pub const ERROR_CODE_MIN_ORDER_QUANTITY: &str = "invalidForMinOrderQuantity";
/// Quantity not a multiple of the pack size.
pub const ERROR_CODE_QUANTITY_PER_PACK: &str = "invalidForQuantityPerPack";

const COMMENTS_MAX_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct InventoryOrder {
    pub id: Option<i64>,
    pub order_number: Option<String>,
    pub store: Option<String>,
    pub vendor: Option<String>,
    pub status: Option<String>,
    pub order_date: Option<String>,
    pub comments: Option<String>,
    pub created_by: Option<String>,
    pub created_date: Option<String>,
    pub updated_by: Option<String>,
    pub updated_date: Option<String>,
    pub inventory_order_products: Vec<InventoryOrderProduct>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct InventoryOrderProduct {
    pub id: Option<i64>,
    pub product_code: Option<String>,
    pub description: Option<String>,
    pub uom: Option<Uom>,
    pub quantity: Option<Decimal>,
    pub suggested_quantity: Option<Decimal>,
    pub minimum_order_quantity: Option<Decimal>,
    pub quantity_per_pack: Option<Decimal>,
    pub pack_size: Option<String>,
    pub unit_cost: Option<Decimal>,
}

impl InventoryOrder {
    /// Copy user-editable values from a built header form onto the model.
    ///
    /// Lines are matched by index; the form's line array must mirror
    /// `inventory_order_products`.
    pub fn merge_form(&mut self, form: &FormGroup) -> FormResult<()> {
        use InventoryOrderField as F;

        self.store = form.control(F::Store.key())?.value().to_opt_string();
        self.vendor = form.control(F::Vendor.key())?.value().to_opt_string();
        self.comments = form.control(F::Comments.key())?.value().to_opt_string();

        let key = F::InventoryOrderProducts.key();
        let lines = form.array(key)?;
        let len = lines.len();
        for (index, line) in self.inventory_order_products.iter_mut().enumerate() {
            let row = lines.group_at(index).ok_or_else(|| FormError::IndexOutOfRange {
                path: key.to_string(),
                index,
                len,
            })?;
            line.merge_form(row)?;
        }
        Ok(())
    }
}

impl InventoryOrderProduct {
    /// Copy the edited quantity from a built line form.
    pub fn merge_form(&mut self, row: &FormGroup) -> FormResult<()> {
        self.quantity = row
            .control(InventoryOrderProductField::Quantity.key())?
            .value()
            .as_decimal();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryOrderField {
    Id,
    OrderNumber,
    Store,
    Vendor,
    Status,
    OrderDate,
    Comments,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
    InventoryOrderProducts,
}

impl FieldKey for InventoryOrderField {
    const ENTITY: EntityKind = EntityKind::InventoryOrder;
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::OrderNumber,
        Self::Store,
        Self::Vendor,
        Self::Status,
        Self::OrderDate,
        Self::Comments,
        Self::CreatedBy,
        Self::CreatedDate,
        Self::UpdatedBy,
        Self::UpdatedDate,
        Self::InventoryOrderProducts,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::OrderNumber => "orderNumber",
            Self::Store => "store",
            Self::Vendor => "vendor",
            Self::Status => "status",
            Self::OrderDate => "orderDate",
            Self::Comments => "comments",
            Self::CreatedBy => "createdBy",
            Self::CreatedDate => "createdDate",
            Self::UpdatedBy => "updatedBy",
            Self::UpdatedDate => "updatedDate",
            Self::InventoryOrderProducts => "inventoryOrderProducts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryOrderProductField {
    Id,
    ProductCode,
    Description,
    Uom,
    Quantity,
    SuggestedQuantity,
    MinimumOrderQuantity,
    QuantityPerPack,
    PackSize,
    UnitCost,
}

impl FieldKey for InventoryOrderProductField {
    const ENTITY: EntityKind = EntityKind::InventoryOrderProduct;
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::ProductCode,
        Self::Description,
        Self::Uom,
        Self::Quantity,
        Self::SuggestedQuantity,
        Self::MinimumOrderQuantity,
        Self::QuantityPerPack,
        Self::PackSize,
        Self::UnitCost,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ProductCode => "productCode",
            Self::Description => "description",
            Self::Uom => "uom",
            Self::Quantity => "quantity",
            Self::SuggestedQuantity => "suggestedQuantity",
            Self::MinimumOrderQuantity => "minimumOrderQuantity",
            Self::QuantityPerPack => "quantityPerPack",
            Self::PackSize => "packSize",
            Self::UnitCost => "unitCost",
        }
    }
}

const ORDER_DISABLE_TABLE: DisableTable<InventoryOrderField> = {
    use InventoryOrderField as F;
    &[
        (F::Id, [true, true, true]),
        (F::OrderNumber, [true, true, true]),
        (F::Store, [true, true, false]),
        (F::Vendor, [true, true, false]),
        (F::Status, [true, true, true]),
        (F::OrderDate, [true, true, true]),
        (F::Comments, [true, false, false]),
        (F::CreatedBy, [true, true, true]),
        (F::CreatedDate, [true, true, true]),
        (F::UpdatedBy, [true, true, true]),
        (F::UpdatedDate, [true, true, true]),
        (F::InventoryOrderProducts, [true, false, false]),
    ]
};

const PRODUCT_DISABLE_TABLE: DisableTable<InventoryOrderProductField> = {
    use InventoryOrderProductField as F;
    &[
        (F::Id, [true, true, true]),
        (F::ProductCode, [true, true, true]),
        (F::Description, [true, true, true]),
        (F::Uom, [true, true, true]),
        (F::Quantity, [true, false, false]),
        (F::SuggestedQuantity, [true, true, true]),
        (F::MinimumOrderQuantity, [true, true, true]),
        (F::QuantityPerPack, [true, true, true]),
        (F::PackSize, [true, true, true]),
        (F::UnitCost, [true, true, true]),
    ]
};

/// Order header disable table, `[view, edit, add]` per field.
#[must_use]
pub fn order_disable_table() -> DisableTable<InventoryOrderField> {
    ORDER_DISABLE_TABLE
}

/// Product line disable table, `[view, edit, add]` per field.
#[must_use]
pub fn product_disable_table() -> DisableTable<InventoryOrderProductField> {
    PRODUCT_DISABLE_TABLE
}

// ---------------------------------------------------------------------------
// Quantity rules
// ---------------------------------------------------------------------------

/// Cross-field quantity rules against `minimumOrderQuantity` and
/// `quantityPerPack`.
///
/// A set minimum is checked first; the pack multiple is only reported when
/// the minimum is unset or satisfied. Zero limits count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityRules;

impl QuantityRules {
    fn limit(ctx: &ValidationContext<'_>, key: &str) -> Option<Decimal> {
        ctx.sibling(key)
            .filter(|v| v.is_truthy())
            .and_then(|v| v.as_decimal())
            .filter(|d| !d.is_zero())
    }
}

impl Validator for QuantityRules {
    fn code(&self) -> &'static str {
        ERROR_CODE_MIN_ORDER_QUANTITY
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let Some(quantity) = ctx.value.as_decimal() else {
            return Ok(());
        };
        let minimum = Self::limit(ctx, InventoryOrderProductField::MinimumOrderQuantity.key());
        if let Some(minimum) = minimum.filter(|m| quantity < *m) {
            return Err(
                ValidationError::new(ERROR_CODE_MIN_ORDER_QUANTITY)
                    .with("min", minimum),
            );
        }
        if let Some(per_pack) = Self::limit(ctx, InventoryOrderProductField::QuantityPerPack.key())
        {
            if !(quantity % per_pack).is_zero() {
                return Err(
                    ValidationError::new(ERROR_CODE_QUANTITY_PER_PACK)
                        .with("pack", per_pack),
                );
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

/// Creator for [`EntityKind::InventoryOrder`].
pub fn create_inventory_order(
    registry: &FormRegistry,
    model: ModelRef<'_>,
    options: &FormOptions,
) -> FormResult<FormGroup> {
    use InventoryOrderField as F;

    let order: &InventoryOrder = model.downcast()?;
    let mode = options.access_mode;

    let mut lines = registry.build_array(
        EntityKind::InventoryOrderProduct,
        order.inventory_order_products.iter().map(ModelRef::from),
        options,
    )?;
    if mode.is_add() {
        lines = lines.with_validator(Required);
    }

    let mut store = FormControl::new(order.store.clone());
    let mut vendor = FormControl::new(order.vendor.clone());
    if mode.is_add() {
        store = store.with_validator(Required);
        vendor = vendor.with_validator(Required);
    }

    let mut group = FormGroup::new()
        .with(F::Id.key(), FormControl::new(order.id))
        .with(F::OrderNumber.key(), FormControl::new(order.order_number.clone()))
        .with(F::Store.key(), store)
        .with(F::Vendor.key(), vendor)
        .with(F::Status.key(), FormControl::new(order.status.clone()))
        .with(F::OrderDate.key(), FormControl::new(order.order_date.clone()))
        .with(
            F::Comments.key(),
            FormControl::new(order.comments.clone())
                .with_validator(MaxLength::new(COMMENTS_MAX_LENGTH)),
        )
        .with(F::CreatedBy.key(), FormControl::new(order.created_by.clone()))
        .with(F::CreatedDate.key(), FormControl::new(order.created_date.clone()))
        .with(F::UpdatedBy.key(), FormControl::new(order.updated_by.clone()))
        .with(F::UpdatedDate.key(), FormControl::new(order.updated_date.clone()))
        .with(F::InventoryOrderProducts.key(), lines);

    apply_disable_table(&mut group, ORDER_DISABLE_TABLE, mode);
    if mode.is_view() {
        group.disable();
    }
    Ok(group)
}

/// Creator for [`EntityKind::InventoryOrderProduct`].
pub fn create_inventory_order_product(
    _registry: &FormRegistry,
    model: ModelRef<'_>,
    options: &FormOptions,
) -> FormResult<FormGroup> {
    use InventoryOrderProductField as F;

    let line: &InventoryOrderProduct = model.downcast()?;
    let mode = options.access_mode;

    let initial_quantity = match (mode, line.quantity) {
        (AccessMode::Add, None) => line.suggested_quantity,
        (_, quantity) => quantity,
    };
    let mut quantity = FormControl::new(initial_quantity);
    if !mode.is_view() {
        quantity = quantity
            .with_validator(Required)
            .with_validator(Min::new(Decimal::ZERO))
            .with_validator(UomQuantity::new(options.decimal_scale))
            .with_validator(QuantityRules);
    }

    let mut group = FormGroup::new()
        .with(F::Id.key(), FormControl::new(line.id))
        .with(F::ProductCode.key(), FormControl::new(line.product_code.clone()))
        .with(F::Description.key(), FormControl::new(line.description.clone()))
        .with(F::Uom.key(), uom_group(line.uom.as_ref()))
        .with(F::Quantity.key(), quantity)
        .with(F::SuggestedQuantity.key(), FormControl::new(line.suggested_quantity))
        .with(
            F::MinimumOrderQuantity.key(),
            FormControl::new(line.minimum_order_quantity),
        )
        .with(F::QuantityPerPack.key(), FormControl::new(line.quantity_per_pack))
        .with(F::PackSize.key(), FormControl::new(line.pack_size.clone()))
        .with(F::UnitCost.key(), FormControl::new(line.unit_cost));

    apply_disable_table(&mut group, PRODUCT_DISABLE_TABLE, mode);
    if mode.is_view() {
        group.disable();
    }
    Ok(group)
}
