//! Serde tests for core types against live-API shaped payloads.

use serde_json::json;

use crate::{
    Drink, FailureKind, Location, LoginResponse, Paginated, StrategyUsed, UnifiedResult,
};

// ============================================================================
// Catalog Payloads
// ============================================================================

#[test]
fn test_drink_deserializes_camel_case() {
    let payload = json!({
        "id": 7,
        "name": "Apfel-Ingwer Mule",
        "description": "Wodka, Apfelsaft, Ginger Beer",
        "price": 9.5,
        "categoryId": 2,
        "categorySlug": "cocktails",
        "imageUrl": null,
        "ingredients": ["Wodka", "Apfelsaft"],
        "isAlcoholic": true,
        "isActive": true,
        "sortOrder": 3
    });

    let drink: Drink = serde_json::from_value(payload).unwrap();
    assert_eq!(drink.category_slug, "cocktails");
    assert_eq!(drink.ingredients.len(), 2);
    assert!(drink.is_alcoholic);
}

#[test]
fn test_drink_defaults_for_missing_fields() {
    let payload = json!({
        "id": 1,
        "name": "Wasser",
        "price": 2.0,
        "categoryId": 5,
        "categorySlug": "alkoholfrei"
    });

    let drink: Drink = serde_json::from_value(payload).unwrap();
    assert!(drink.is_active);
    assert!(drink.description.is_empty());
    assert!(drink.ingredients.is_empty());
}

#[test]
fn test_location_dates_parse() {
    let payload = json!({
        "id": 3,
        "name": "Sommerfest",
        "address": "Seestraße 4",
        "city": "Konstanz",
        "startsAt": "2026-07-01T16:00:00Z",
        "endsAt": "2026-07-03T23:00:00Z",
        "isCurrent": false
    });

    let location: Location = serde_json::from_value(payload).unwrap();
    assert!(location.ends_at.is_some());
}

#[test]
fn test_login_response() {
    let payload = json!({
        "token": "a.b.c",
        "user": {"id": 1, "email": "team@barkeep.example", "role": "admin"}
    });
    let login: LoginResponse = serde_json::from_value(payload).unwrap();
    assert_eq!(login.user.role.as_deref(), Some("admin"));
    assert!(login.user.name.is_none());
}

// ============================================================================
// Paging
// ============================================================================

#[test]
fn test_paginated_field_names() {
    let page = Paginated::from_filtered(vec![1, 2, 3], 1, 2);
    let value = serde_json::to_value(&page).unwrap();
    assert_eq!(value["pageSize"], 2);
    assert_eq!(value["totalPages"], 2);
    assert_eq!(value["total"], 3);
}

// ============================================================================
// Results
// ============================================================================

#[test]
fn test_unified_result_success_shape() {
    let result = UnifiedResult::ok("x", StrategyUsed::EdgeOptimized, 1);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["strategyUsed"], "edgeOptimized");
    assert_eq!(value["retryCount"], 1);
    assert!(value.get("error").is_none());
}

#[test]
fn test_unified_result_failure_shape() {
    let result: UnifiedResult<()> =
        UnifiedResult::failure("blocked", 2).with_failure_kind(FailureKind::BotProtection);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "blocked");
    assert_eq!(value["failureKind"], "botProtection");
    assert!(value.get("data").is_none());
}

#[test]
fn test_configuration_kind_label() {
    let result: UnifiedResult<()> = UnifiedResult::failure("Not logged in", 0)
        .with_failure_kind(FailureKind::Configuration);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["failureKind"], "configuration");
    assert_eq!(value["retryCount"], 0);
}

#[test]
fn test_failure_kind_roundtrip_all_variants() {
    for kind in FailureKind::all() {
        let json = serde_json::to_string(kind).unwrap();
        let back: FailureKind = serde_json::from_str(&json).unwrap();
        assert_eq!(*kind, back);
    }
}
