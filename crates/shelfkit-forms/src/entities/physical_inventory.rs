#![forbid(unsafe_code)]

//! Physical inventories, their count lines and per-location counts.
//!
//! A count line's `actualCount` is the only field a counter edits, and only
//! while the line is open in Edit mode. When counting by location the form
//! shows the current location's count as `actualCount` and the sum over all
//! locations as `totalQuantity`; [`archive_actual_count`] writes an edited
//! count back into `countsByLocation`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::{DisableTable, Uom, UomQuantity, apply_disable_table, uom_group};
use crate::control::{FormControl, FormGroup};
use crate::error::{FormError, FormResult};
use crate::registry::{EntityKind, FormOptions, FormRegistry, ModelRef};
use crate::typed::FieldKey;
use crate::validation::{MaxLength, Min, Required};

const DESCRIPTION_MAX_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of an inventory header or a single count line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum CountStatus {
    #[default]
    Open,
    Closed,
}

impl CountStatus {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for CountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            other => Err(format!("unknown count status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct PhysicalInventory {
    pub id: Option<i64>,
    pub store: Option<String>,
    pub inventory_date: Option<String>,
    pub description: Option<String>,
    pub status: CountStatus,
    pub created_by: Option<String>,
    pub created_date: Option<String>,
    pub updated_by: Option<String>,
    pub updated_date: Option<String>,
    pub physical_inventory_counts: Vec<PhysicalInventoryCount>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct PhysicalInventoryCount {
    pub id: Option<i64>,
    pub product_code: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub uom: Option<Uom>,
    pub actual_count: Option<Decimal>,
    pub total_quantity: Option<Decimal>,
    pub counts_by_location: Vec<CountLocation>,
    pub status: CountStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CountLocation {
    pub location: String,
    pub count: Decimal,
}

impl CountLocation {
    #[must_use]
    pub fn new(location: impl Into<String>, count: Decimal) -> Self {
        Self {
            location: location.into(),
            count,
        }
    }
}

impl PhysicalInventory {
    /// Copy user-editable header values from a built form.
    pub fn merge_form(&mut self, form: &FormGroup) -> FormResult<()> {
        use PhysicalInventoryField as F;
        self.store = form.control(F::Store.key())?.value().to_opt_string();
        self.inventory_date = form.control(F::InventoryDate.key())?.value().to_opt_string();
        self.description = form.control(F::Description.key())?.value().to_opt_string();
        Ok(())
    }
}

impl PhysicalInventoryCount {
    /// Copy counts from a built count line form: `actualCount`,
    /// `totalQuantity` and the archived `countsByLocation`.
    pub fn merge_form(&mut self, row: &FormGroup) -> FormResult<()> {
        use PhysicalInventoryCountField as F;

        self.actual_count = row.control(F::ActualCount.key())?.value().as_decimal();
        self.total_quantity = row.control(F::TotalQuantity.key())?.value().as_decimal();

        let locations = row.array(F::CountsByLocation.key())?;
        let mut archived = Vec::with_capacity(locations.len());
        for index in 0..locations.len() {
            let entry = locations.group_at(index).ok_or_else(|| FormError::NotAGroup(format!(
                "{}.{index}",
                F::CountsByLocation.key()
            )))?;
            let location = entry
                .control(CountLocationField::Location.key())?
                .value()
                .to_opt_string()
                .unwrap_or_default();
            let count = entry
                .control(CountLocationField::Count.key())?
                .value()
                .as_decimal()
                .unwrap_or_default();
            archived.push(CountLocation { location, count });
        }
        self.counts_by_location = archived;
        Ok(())
    }
}

/// Sum of every location's count.
#[must_use]
pub fn location_total(counts: &[CountLocation]) -> Decimal {
    counts.iter().map(|c| c.count).sum()
}

/// Count recorded for `location`, or zero.
#[must_use]
pub fn count_for_location(counts: &[CountLocation], location: &str) -> Decimal {
    counts
        .iter()
        .find(|c| c.location == location)
        .map_or(Decimal::ZERO, |c| c.count)
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalInventoryField {
    Id,
    Store,
    InventoryDate,
    Description,
    Status,
    CreatedBy,
    CreatedDate,
    UpdatedBy,
    UpdatedDate,
    PhysicalInventoryCounts,
}

impl FieldKey for PhysicalInventoryField {
    const ENTITY: EntityKind = EntityKind::PhysicalInventory;
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Store,
        Self::InventoryDate,
        Self::Description,
        Self::Status,
        Self::CreatedBy,
        Self::CreatedDate,
        Self::UpdatedBy,
        Self::UpdatedDate,
        Self::PhysicalInventoryCounts,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Store => "store",
            Self::InventoryDate => "inventoryDate",
            Self::Description => "description",
            Self::Status => "status",
            Self::CreatedBy => "createdBy",
            Self::CreatedDate => "createdDate",
            Self::UpdatedBy => "updatedBy",
            Self::UpdatedDate => "updatedDate",
            Self::PhysicalInventoryCounts => "physicalInventoryCounts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalInventoryCountField {
    Id,
    ProductCode,
    Description,
    Category,
    Uom,
    ActualCount,
    TotalQuantity,
    CountsByLocation,
    Status,
}

impl FieldKey for PhysicalInventoryCountField {
    const ENTITY: EntityKind = EntityKind::PhysicalInventoryCount;
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::ProductCode,
        Self::Description,
        Self::Category,
        Self::Uom,
        Self::ActualCount,
        Self::TotalQuantity,
        Self::CountsByLocation,
        Self::Status,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ProductCode => "productCode",
            Self::Description => "description",
            Self::Category => "category",
            Self::Uom => "uom",
            Self::ActualCount => "actualCount",
            Self::TotalQuantity => "totalQuantity",
            Self::CountsByLocation => "countsByLocation",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountLocationField {
    Location,
    Count,
}

impl FieldKey for CountLocationField {
    const ENTITY: EntityKind = EntityKind::CountLocation;
    const ALL: &'static [Self] = &[Self::Location, Self::Count];

    fn key(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Count => "count",
        }
    }
}

const INVENTORY_DISABLE_TABLE: DisableTable<PhysicalInventoryField> = {
    use PhysicalInventoryField as F;
    &[
        (F::Id, [true, true, true]),
        (F::Store, [true, true, false]),
        (F::InventoryDate, [true, true, false]),
        (F::Description, [true, false, false]),
        (F::Status, [true, true, true]),
        (F::CreatedBy, [true, true, true]),
        (F::CreatedDate, [true, true, true]),
        (F::UpdatedBy, [true, true, true]),
        (F::UpdatedDate, [true, true, true]),
        (F::PhysicalInventoryCounts, [true, false, true]),
    ]
};

const COUNT_DISABLE_TABLE: DisableTable<PhysicalInventoryCountField> = {
    use PhysicalInventoryCountField as F;
    &[
        (F::Id, [true, true, true]),
        (F::ProductCode, [true, true, true]),
        (F::Description, [true, true, true]),
        (F::Category, [true, true, true]),
        (F::Uom, [true, true, true]),
        (F::ActualCount, [true, false, true]),
        (F::TotalQuantity, [true, true, true]),
        (F::CountsByLocation, [true, true, true]),
        (F::Status, [true, true, true]),
    ]
};

/// Inventory header disable table, `[view, edit, add]` per field.
#[must_use]
pub fn inventory_disable_table() -> DisableTable<PhysicalInventoryField> {
    INVENTORY_DISABLE_TABLE
}

/// Count line disable table, `[view, edit, add]` per field.
#[must_use]
pub fn count_disable_table() -> DisableTable<PhysicalInventoryCountField> {
    COUNT_DISABLE_TABLE
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

/// Creator for [`EntityKind::PhysicalInventory`]. A closed inventory opened
/// for editing is entirely read-only.
pub fn create_physical_inventory(
    registry: &FormRegistry,
    model: ModelRef<'_>,
    options: &FormOptions,
) -> FormResult<FormGroup> {
    use PhysicalInventoryField as F;

    let inventory: &PhysicalInventory = model.downcast()?;
    let mode = options.access_mode;

    let counts = registry.build_array(
        EntityKind::PhysicalInventoryCount,
        inventory.physical_inventory_counts.iter().map(ModelRef::from),
        options,
    )?;

    let mut store = FormControl::new(inventory.store.clone());
    let mut date = FormControl::new(inventory.inventory_date.clone());
    if mode.is_add() {
        store = store.with_validator(Required);
        date = date.with_validator(Required);
    }

    let mut group = FormGroup::new()
        .with(F::Id.key(), FormControl::new(inventory.id))
        .with(F::Store.key(), store)
        .with(F::InventoryDate.key(), date)
        .with(
            F::Description.key(),
            FormControl::new(inventory.description.clone())
                .with_validator(MaxLength::new(DESCRIPTION_MAX_LENGTH)),
        )
        .with(F::Status.key(), FormControl::new(inventory.status.code()))
        .with(F::CreatedBy.key(), FormControl::new(inventory.created_by.clone()))
        .with(F::CreatedDate.key(), FormControl::new(inventory.created_date.clone()))
        .with(F::UpdatedBy.key(), FormControl::new(inventory.updated_by.clone()))
        .with(F::UpdatedDate.key(), FormControl::new(inventory.updated_date.clone()))
        .with(F::PhysicalInventoryCounts.key(), counts);

    apply_disable_table(&mut group, INVENTORY_DISABLE_TABLE, mode);
    if mode.is_view() || (mode.is_edit() && !inventory.status.is_open()) {
        group.disable();
    }
    Ok(group)
}

/// Creator for [`EntityKind::PhysicalInventoryCount`].
pub fn create_physical_inventory_count(
    registry: &FormRegistry,
    model: ModelRef<'_>,
    options: &FormOptions,
) -> FormResult<FormGroup> {
    use PhysicalInventoryCountField as F;

    let count: &PhysicalInventoryCount = model.downcast()?;
    let mode = options.access_mode;
    let editable = mode.is_edit() && count.status.is_open();

    let locations = registry.build_array(
        EntityKind::CountLocation,
        count.counts_by_location.iter().map(ModelRef::from),
        options,
    )?;

    let (actual, total) = match (options.counting_by_location, &options.current_location) {
        (true, Some(location)) => (
            Some(count_for_location(&count.counts_by_location, location)),
            Some(location_total(&count.counts_by_location)),
        ),
        (true, None) => (
            Some(Decimal::ZERO),
            Some(location_total(&count.counts_by_location)),
        ),
        (false, _) => (count.actual_count, count.total_quantity),
    };

    let mut actual_count = FormControl::new(actual);
    if editable {
        actual_count = actual_count
            .with_validator(Required)
            .with_validator(Min::new(Decimal::ZERO))
            .with_validator(UomQuantity::new(options.decimal_scale));
    }

    let mut group = FormGroup::new()
        .with(F::Id.key(), FormControl::new(count.id))
        .with(F::ProductCode.key(), FormControl::new(count.product_code.clone()))
        .with(F::Description.key(), FormControl::new(count.description.clone()))
        .with(F::Category.key(), FormControl::new(count.category.clone()))
        .with(F::Uom.key(), uom_group(count.uom.as_ref()))
        .with(F::ActualCount.key(), actual_count)
        .with(F::TotalQuantity.key(), FormControl::new(total))
        .with(F::CountsByLocation.key(), locations)
        .with(F::Status.key(), FormControl::new(count.status.code()));

    apply_disable_table(&mut group, COUNT_DISABLE_TABLE, mode);
    if !editable {
        if let Some(node) = group.node_mut(F::ActualCount.key()) {
            node.disable();
        }
    }
    Ok(group)
}

/// Creator for [`EntityKind::CountLocation`]. Archived counts are read-only.
pub fn create_count_location(
    _registry: &FormRegistry,
    model: ModelRef<'_>,
    _options: &FormOptions,
) -> FormResult<FormGroup> {
    use CountLocationField as F;

    let location: &CountLocation = model.downcast()?;
    Ok(FormGroup::new()
        .with(
            F::Location.key(),
            FormControl::new(location.location.as_str()).disabled(),
        )
        .with(F::Count.key(), FormControl::new(location.count).disabled()))
}

// ---------------------------------------------------------------------------
// Location merge
// ---------------------------------------------------------------------------

/// Write a count line's `actualCount` into `countsByLocation` for the current
/// location and recompute `totalQuantity`. Returns the new total.
///
/// A location not yet counted gets a new archived entry. Without location
/// counting this is a no-op returning the current total.
pub fn archive_actual_count(
    row: &mut FormGroup,
    registry: &FormRegistry,
    options: &FormOptions,
) -> FormResult<Decimal> {
    use PhysicalInventoryCountField as F;

    let total_of = |row: &FormGroup| -> FormResult<Decimal> {
        Ok(row
            .control(F::TotalQuantity.key())?
            .value()
            .as_decimal()
            .unwrap_or_default())
    };

    let location = match (options.counting_by_location, &options.current_location) {
        (true, Some(location)) => location.clone(),
        _ => return total_of(row),
    };

    let actual = row
        .control(F::ActualCount.key())?
        .value()
        .as_decimal()
        .unwrap_or_default();

    let locations = row.array_mut(F::CountsByLocation.key())?;
    let existing = (0..locations.len()).find(|&i| {
        locations
            .group_at(i)
            .and_then(|g| g.control(CountLocationField::Location.key()).ok())
            .and_then(|c| c.value().as_text())
            == Some(location.as_str())
    });
    match existing {
        Some(index) => {
            let path = format!("{index}.{}", CountLocationField::Count.key());
            locations
                .group_at_mut(index)
                .ok_or_else(|| FormError::MissingControl(path.clone()))?
                .patch_value(CountLocationField::Count.key(), actual)?;
        }
        None => {
            let entry = CountLocation::new(location.as_str(), actual);
            let group = registry.build(ModelRef::from(&entry), options)?;
            locations.push(group);
        }
    }

    let total: Decimal = locations
        .iter()
        .filter_map(|node| node.as_group())
        .filter_map(|g| g.control(CountLocationField::Count.key()).ok())
        .filter_map(|c| c.value().as_decimal())
        .sum();
    row.patch_value(F::TotalQuantity.key(), total)?;
    tracing::debug!(location = %location, %actual, %total, "count archived to location");
    Ok(total)
}
