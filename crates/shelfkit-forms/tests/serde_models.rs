#![forbid(unsafe_code)]
#![cfg(feature = "serde")]

//! Models read the camelCase payloads the persistence layer sends.

use rust_decimal_macros::dec;
use shelfkit_forms::entities::inventory_order::InventoryOrder;
use shelfkit_forms::entities::physical_inventory::{CountStatus, PhysicalInventory};

#[test]
fn order_payload_deserializes() {
    let json = r#"{
        "id": 12,
        "store": "S-100",
        "vendor": "V-7",
        "inventoryOrderProducts": [
            {
                "productCode": "SKU-1",
                "uom": { "code": "EACH" },
                "quantity": "12",
                "minimumOrderQuantity": "6",
                "quantityPerPack": "6"
            }
        ]
    }"#;
    let order: InventoryOrder = serde_json::from_str(json).unwrap();
    assert_eq!(order.id, Some(12));
    let line = &order.inventory_order_products[0];
    assert!(line.uom.as_ref().is_some_and(|u| u.is_each()));
    assert_eq!(line.quantity, Some(dec!(12)));
    assert_eq!(line.suggested_quantity, None);
}

#[test]
fn count_status_uses_upper_case_codes() {
    let json = r#"{
        "id": 5,
        "status": "CLOSED",
        "physicalInventoryCounts": [
            { "id": 1, "countsByLocation": [ { "location": "BAY", "count": "10" } ] }
        ]
    }"#;
    let inventory: PhysicalInventory = serde_json::from_str(json).unwrap();
    assert_eq!(inventory.status, CountStatus::Closed);
    let count = &inventory.physical_inventory_counts[0];
    assert_eq!(count.status, CountStatus::Open);
    assert_eq!(count.counts_by_location[0].count, dec!(10));

    let back = serde_json::to_value(&inventory).unwrap();
    assert_eq!(back["status"], "CLOSED");
    assert!(back.get("physicalInventoryCounts").is_some());
}
