mod test_utils;

use locator_service::geo::GeoPoint;
use locator_service::{search_availability, AvailabilityQuery, LocatorStore, MemoryLocatorStore, StockStatus};
use test_utils::{lat_offset, medicine, pharmacy, stock};
use uuid::Uuid;

const ORIGIN_LON: f64 = 3.38;
const ORIGIN_LAT: f64 = 6.52;

struct Seeded {
    store: MemoryLocatorStore,
    paracetamol: Uuid,
    far: Uuid,
    near: Uuid,
    empty: Uuid,
}

/// Three pharmacies stocking Paracetamol: plenty 10 km north, a few 1 km south, none 2 km east.
async fn seed() -> Seeded {
    let store = MemoryLocatorStore::new();
    let para = medicine("Paracetamol");
    store.insert_medicine(&para).await.unwrap();

    let far = pharmacy("Alpha Pharmacy", Uuid::new_v4(), ORIGIN_LON, ORIGIN_LAT + lat_offset(10_000.0));
    let near = pharmacy("Bravo Pharmacy", Uuid::new_v4(), ORIGIN_LON, ORIGIN_LAT - lat_offset(1_000.0));
    let empty = pharmacy("Charlie Pharmacy", Uuid::new_v4(), ORIGIN_LON + lat_offset(2_000.0), ORIGIN_LAT);
    for p in [&far, &near, &empty] {
        store.insert_pharmacy(p).await.unwrap();
    }
    store.insert_inventory(&stock(far.id, para.id, 50, 5)).await.unwrap();
    store.insert_inventory(&stock(near.id, para.id, 3, 5)).await.unwrap();
    store.insert_inventory(&stock(empty.id, para.id, 0, 5)).await.unwrap();

    Seeded { store, paracetamol: para.id, far: far.id, near: near.id, empty: empty.id }
}

fn origin() -> GeoPoint {
    GeoPoint::new(ORIGIN_LON, ORIGIN_LAT).unwrap()
}

#[tokio::test]
async fn out_of_stock_rows_are_never_returned() {
    let s = seed().await;
    let page = search_availability(&s.store, &AvailabilityQuery::new(s.paracetamol)).await.unwrap();

    assert_eq!(page.pagination.total, 2);
    assert_eq!(page.pagination.pages, 1);
    let ids: Vec<Uuid> = page.data.iter().map(|hit| hit.pharmacy.id).collect();
    assert!(ids.contains(&s.far));
    assert!(ids.contains(&s.near));
    assert!(!ids.contains(&s.empty));

    let near_hit = page.data.iter().find(|hit| hit.pharmacy.id == s.near).unwrap();
    assert_eq!(near_hit.inventory.status, StockStatus::LowStock);
    assert!(near_hit.pharmacy.distance_meters.is_none());
    assert_eq!(near_hit.medicine.name, "Paracetamol");
}

#[tokio::test]
async fn page_size_splits_results() {
    let s = seed().await;
    let query = AvailabilityQuery::new(s.paracetamol).page(1, 1);
    let first = search_availability(&s.store, &query).await.unwrap();
    assert_eq!(first.data.len(), 1);
    assert_eq!(first.pagination.total, 2);
    assert_eq!(first.pagination.pages, 2);

    let second = search_availability(&s.store, &AvailabilityQuery::new(s.paracetamol).page(2, 1))
        .await
        .unwrap();
    assert_eq!(second.data.len(), 1);
    assert_ne!(first.data[0].pharmacy.id, second.data[0].pharmacy.id);

    let beyond = search_availability(&s.store, &AvailabilityQuery::new(s.paracetamol).page(3, 1))
        .await
        .unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.pagination.total, 2);
}

#[tokio::test]
async fn radius_limits_candidates() {
    let s = seed().await;
    let query = AvailabilityQuery::new(s.paracetamol).near(origin(), 5_000.0);
    let page = search_availability(&s.store, &query).await.unwrap();

    assert_eq!(page.pagination.total, 1);
    let hit = &page.data[0];
    assert_eq!(hit.pharmacy.id, s.near);
    let distance = hit.pharmacy.distance_meters.unwrap();
    assert!((distance - 1_000.0).abs() < 5.0, "distance was {distance}");
}

#[tokio::test]
async fn nearest_pharmacy_comes_first() {
    let s = seed().await;
    let query = AvailabilityQuery::new(s.paracetamol).near(origin(), 50_000.0);
    let page = search_availability(&s.store, &query).await.unwrap();

    let ids: Vec<Uuid> = page.data.iter().map(|hit| hit.pharmacy.id).collect();
    assert_eq!(ids, vec![s.near, s.far]);
}

#[tokio::test]
async fn unbounded_radius_matches_no_origin() {
    let s = seed().await;
    let unbounded = AvailabilityQuery::new(s.paracetamol).near(origin(), f64::INFINITY);
    let geo = search_availability(&s.store, &unbounded).await.unwrap();
    let plain = search_availability(&s.store, &AvailabilityQuery::new(s.paracetamol)).await.unwrap();
    assert_eq!(geo.pagination.total, plain.pagination.total);
}

#[tokio::test]
async fn no_pharmacy_in_range_is_an_empty_page() {
    let s = seed().await;
    let far_away = GeoPoint::new(-70.0, 40.0).unwrap();
    let page = search_availability(&s.store, &AvailabilityQuery::new(s.paracetamol).near(far_away, 1_000.0))
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.pages, 0);
}

#[tokio::test]
async fn deactivated_pharmacy_drops_out() {
    let s = seed().await;
    let mut near = s.store.pharmacy_by_id(s.near).await.unwrap().unwrap();
    near.is_active = false;
    assert!(s.store.update_pharmacy(&near).await.unwrap());

    let page = search_availability(&s.store, &AvailabilityQuery::new(s.paracetamol)).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.data[0].pharmacy.id, s.far);
}

#[tokio::test]
async fn query_errors_carry_codes() {
    let s = seed().await;

    let missing = AvailabilityQuery { medicine_id: None, ..AvailabilityQuery::new(Uuid::new_v4()) };
    let err = search_availability(&s.store, &missing).await.unwrap_err();
    assert_eq!(err.code(), "missing_medicine_id");

    let err = search_availability(&s.store, &AvailabilityQuery::new(Uuid::new_v4())).await.unwrap_err();
    assert_eq!(err.code(), "medicine_not_found");

    let bad_radius = AvailabilityQuery::new(s.paracetamol).near(origin(), 0.0);
    let err = search_availability(&s.store, &bad_radius).await.unwrap_err();
    assert_eq!(err.code(), "invalid_radius");

    let bad_page = AvailabilityQuery::new(s.paracetamol).page(0, 10);
    let err = search_availability(&s.store, &bad_page).await.unwrap_err();
    assert_eq!(err.code(), "invalid_page");
}
