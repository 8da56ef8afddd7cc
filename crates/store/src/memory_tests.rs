//! Behaviour tests for the store contract, run against `MemoryStore`.
//!
//! The Postgres implementation issues the equivalent SQL; its statement text
//! is covered in `db::search`, and live-database checks are `#[ignore]`d.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    MemoryStore, NewProperty, NewUser, Property, PropertySearch, PropertyStore, Reservation,
    StoreError, User,
};

fn property(id: i32, owner_id: i32, city: &str, cost_per_night: i32) -> Property {
    Property {
        id,
        owner_id,
        title: format!("Property {id}"),
        description: String::new(),
        thumbnail_photo_url: format!("https://images.example/{id}/thumb.jpg"),
        cover_photo_url: format!("https://images.example/{id}/cover.jpg"),
        cost_per_night,
        parking_spaces: 1,
        number_of_bathrooms: 1,
        number_of_bedrooms: 2,
        country: "Canada".into(),
        street: format!("{id} Main Street"),
        city: city.into(),
        province: "British Columbia".into(),
        post_code: "V5K 0A1".into(),
        active: true,
    }
}

fn new_property(owner_id: i32, city: &str) -> NewProperty {
    NewProperty {
        owner_id,
        title: "Cozy loft".into(),
        description: "Close to everything".into(),
        thumbnail_photo_url: "thumb.jpg".into(),
        cover_photo_url: "cover.jpg".into(),
        cost_per_night: 12_000,
        parking_spaces: 0,
        number_of_bathrooms: 1,
        number_of_bedrooms: 1,
        country: "Canada".into(),
        street: "1 Water Street".into(),
        city: city.into(),
        province: "British Columbia".into(),
        post_code: "V6B 1A1".into(),
        active: true,
    }
}

fn user(id: i32, email: &str) -> User {
    User {
        id,
        name: format!("User {id}"),
        email: email.into(),
        password: "$2a$10$FB/BOAVhpuLvpOREQVmvmezD4ED/.JBIDRh70tGevYzYzQgFId2u.".into(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn reservation(id: i32, guest_id: i32, property_id: i32, start: NaiveDate) -> Reservation {
    Reservation {
        id,
        guest_id,
        property_id,
        start_date: start,
        end_date: start + chrono::Duration::days(3),
    }
}

/// Six Vancouver-ish properties at different prices, one elsewhere, one
/// without reviews.
fn catalogue() -> MemoryStore {
    MemoryStore::new()
        .with_user(user(1, "owner@mail.com"))
        .with_user(user(2, "guest@mail.com"))
        .with_property(property(1, 1, "Vancouver", 25_000))
        .with_property(property(2, 1, "North Vancouver", 4_999))
        .with_property(property(3, 2, "Vancouver", 5_000))
        .with_property(property(4, 2, "Vancouver", 10_000))
        .with_property(property(5, 1, "Vancouver", 10_001))
        .with_property(property(6, 1, "West Vancouver", 7_500))
        .with_property(property(7, 2, "Calgary", 6_000))
        .with_property(property(8, 1, "Vancouver", 100))
        .with_review(1, 5)
        .with_review(1, 4)
        .with_review(2, 2)
        .with_review(3, 4)
        .with_review(3, 3)
        .with_review(4, 5)
        .with_review(5, 1)
        .with_review(6, 4)
        .with_review(7, 5)
}

fn assert_price_order(listings: &[crate::PropertyListing]) {
    assert!(listings
        .windows(2)
        .all(|w| w[0].property.cost_per_night <= w[1].property.cost_per_night));
}

// ============================================================
// Users
// ============================================================

#[tokio::test]
async fn unknown_email_is_absent() {
    let store = catalogue();
    let found = store
        .get_user_by_email("nobody@mail.com")
        .await
        .expect("lookup succeeds");
    assert!(found.is_none());
    assert!(store.get_user_by_id(999).await.expect("lookup succeeds").is_none());
}

#[tokio::test]
async fn added_user_is_found_by_email_and_id() {
    let store = catalogue();
    let created = store
        .add_user(NewUser {
            name: "Kira Lee".into(),
            email: "kira@mail.com".into(),
            password: "password".into(),
        })
        .await
        .expect("insert succeeds");
    assert_eq!(created.id, 3, "ids continue after seeded users");

    let by_email = store
        .get_user_by_email("kira@mail.com")
        .await
        .expect("lookup succeeds")
        .expect("user exists");
    let by_id = store
        .get_user_by_id(created.id)
        .await
        .expect("lookup succeeds")
        .expect("user exists");
    assert_eq!(by_email, created);
    assert_eq!(by_id, created);
    assert_eq!(by_id.name, "Kira Lee");
    assert_eq!(by_id.password, "password");
}

#[tokio::test]
async fn email_lookup_is_exact() {
    let store = catalogue();
    assert!(store
        .get_user_by_email("OWNER@mail.com")
        .await
        .expect("lookup succeeds")
        .is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_insert() {
    let store = catalogue();
    let before = store.user_count();
    let err = store
        .add_user(NewUser {
            name: "Impostor".into(),
            email: "guest@mail.com".into(),
            password: "x".into(),
        })
        .await
        .expect_err("duplicate email must fail");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    assert_eq!(store.user_count(), before);

    let original = store
        .get_user_by_email("guest@mail.com")
        .await
        .expect("lookup succeeds")
        .expect("user exists");
    assert_eq!(original.id, 2);
}

// ============================================================
// Property search
// ============================================================

#[tokio::test]
async fn city_search_respects_limit_and_price_order() {
    let store = catalogue();
    let search = PropertySearch {
        city: Some("Vancouver".into()),
        ..Default::default()
    };
    let listings = store
        .search_properties(Some(&search), Some(5))
        .await
        .expect("search succeeds");

    assert_eq!(listings.len(), 5);
    assert!(listings.iter().all(|l| l.property.city.contains("Vancouver")));
    assert_price_order(&listings);
    assert_eq!(listings[0].property.id, 2);
}

#[tokio::test]
async fn city_match_is_case_sensitive_substring() {
    let store = catalogue();
    let lower = PropertySearch {
        city: Some("vancouver".into()),
        ..Default::default()
    };
    assert!(store
        .search_properties(Some(&lower), None)
        .await
        .expect("search succeeds")
        .is_empty());

    let partial = PropertySearch {
        city: Some("couver".into()),
        ..Default::default()
    };
    let listings = store
        .search_properties(Some(&partial), None)
        .await
        .expect("search succeeds");
    assert_eq!(listings.len(), 6);
}

#[tokio::test]
async fn like_wildcards_in_the_city_match_literally() {
    let store = catalogue()
        .with_property(property(9, 1, "Port_Moody", 7_000))
        .with_review(9, 4);
    let search = |city: &str| PropertySearch {
        city: Some(city.into()),
        ..Default::default()
    };

    for city in ["V_ncouver", "North%", "%"] {
        assert!(
            store
                .search_properties(Some(&search(city)), None)
                .await
                .expect("search succeeds")
                .is_empty(),
            "{city} should not act as a pattern"
        );
    }

    let listings = store
        .search_properties(Some(&search("t_M")), None)
        .await
        .expect("search succeeds");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].property.id, 9);
}

#[tokio::test]
async fn unreviewed_properties_are_never_listed() {
    let store = catalogue();
    let listings = store.search_properties(None, Some(100)).await.expect("search succeeds");
    assert_eq!(listings.len(), 7);
    assert!(listings.iter().all(|l| l.property.id != 8));
    assert_price_order(&listings);
}

#[tokio::test]
async fn default_limit_is_ten() {
    let mut store = MemoryStore::new();
    for id in 1..=12 {
        store = store.with_property(property(id, 1, "Toronto", id * 1_000)).with_review(id, 3);
    }
    let listings = store.search_properties(None, None).await.expect("search succeeds");
    assert_eq!(listings.len(), 10);
    assert_eq!(listings[9].property.cost_per_night, 10_000);
}

#[tokio::test]
async fn minimum_rating_filters_on_the_average() {
    let store = catalogue();
    let search = PropertySearch {
        minimum_rating: Some(4.0),
        ..Default::default()
    };
    let listings = store
        .search_properties(Some(&search), None)
        .await
        .expect("search succeeds");

    let ids: Vec<i32> = listings.iter().map(|l| l.property.id).collect();
    // Property 3 averages 3.5 and is excluded.
    assert_eq!(ids, vec![7, 6, 4, 1]);
    assert!(listings.iter().all(|l| l.average_rating >= 4.0));
    assert!((listings[3].average_rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn price_bounds_are_compared_in_cents() {
    let store = catalogue();
    let search = PropertySearch {
        minimum_price_per_night: Some(50.0),
        maximum_price_per_night: Some(100.0),
        ..Default::default()
    };
    let listings = store
        .search_properties(Some(&search), None)
        .await
        .expect("search succeeds");

    let ids: Vec<i32> = listings.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![3, 7, 6, 4]);
    assert!(listings
        .iter()
        .all(|l| (5_000..=10_000).contains(&l.property.cost_per_night)));
}

#[tokio::test]
async fn owner_filter_combines_with_city() {
    let store = catalogue();
    let search = PropertySearch {
        city: Some("Vancouver".into()),
        owner_id: Some(2),
        ..Default::default()
    };
    let listings = store
        .search_properties(Some(&search), None)
        .await
        .expect("search succeeds");
    let ids: Vec<i32> = listings.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![3, 4]);
}

#[tokio::test]
async fn filter_set_without_city_does_not_filter_on_city() {
    let store = catalogue();
    let search = PropertySearch {
        owner_id: Some(2),
        ..Default::default()
    };
    let listings = store
        .search_properties(Some(&search), None)
        .await
        .expect("search succeeds");
    assert!(listings.iter().any(|l| l.property.city == "Calgary"));
}

// ============================================================
// Reservations
// ============================================================

#[tokio::test]
async fn guest_reservations_are_limited_and_ordered_by_start_date() {
    let store = catalogue()
        .with_reservation(reservation(1, 2, 4, date(2023, 9, 1)))
        .with_reservation(reservation(2, 2, 1, date(2018, 3, 15)))
        .with_reservation(reservation(3, 1, 3, date(2017, 1, 1)))
        .with_reservation(reservation(4, 2, 6, date(2020, 7, 4)))
        .with_reservation(reservation(5, 2, 8, date(2015, 1, 1)));

    let two = store
        .list_reservations_for_guest(2, Some(2))
        .await
        .expect("listing succeeds");
    assert_eq!(two.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 4]);

    let all = store
        .list_reservations_for_guest(2, None)
        .await
        .expect("listing succeeds");
    // Reservation 5 is for an unreviewed property and drops out of the join.
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 4, 1]);
    assert!(all.windows(2).all(|w| w[0].start_date <= w[1].start_date));

    let first = &all[0];
    assert_eq!(first.title, "Property 1");
    assert_eq!(first.cost_per_night, 25_000);
    assert_eq!(first.end_date, date(2018, 3, 18));
    assert!((first.average_rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn guest_without_reservations_gets_an_empty_list() {
    let store = catalogue();
    let rows = store
        .list_reservations_for_guest(42, None)
        .await
        .expect("listing succeeds");
    assert!(rows.is_empty());
}

// ============================================================
// Property creation
// ============================================================

#[tokio::test]
async fn added_property_gets_the_next_id() {
    let store = catalogue();
    let created = store
        .add_property(new_property(1, "Victoria"))
        .await
        .expect("insert succeeds");
    assert_eq!(created.id, 9);
    assert_eq!(created.city, "Victoria");
    assert_eq!(store.property_count(), 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_property_inserts_never_share_an_id() {
    let store = Arc::new(catalogue());

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .add_property(new_property(1 + i % 2, "Kelowna"))
                    .await
                    .expect("insert succeeds")
                    .id
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.expect("task panicked")));
    }
    assert_eq!(ids.len(), 64);
    assert_eq!(store.property_count(), 8 + 64);
    assert!(ids.iter().all(|id| *id > 8));
}

#[tokio::test]
async fn store_works_behind_a_trait_object() {
    let store: Arc<dyn PropertyStore> = Arc::new(catalogue());
    let user = store
        .get_user_by_id(1)
        .await
        .expect("lookup succeeds")
        .expect("user exists");
    assert_eq!(user.email, "owner@mail.com");
}

#[tokio::test]
async fn fixture_ids_seed_the_counters() {
    let fixtures = crate::Fixtures {
        users: vec![user(10, "a@mail.com"), user(4, "b@mail.com")],
        properties: vec![property(20, 10, "Banff", 9_000)],
        reservations: Vec::new(),
        reviews: Vec::new(),
    };
    let store = MemoryStore::from_fixtures(fixtures);

    let created = store
        .add_user(NewUser {
            name: "C".into(),
            email: "c@mail.com".into(),
            password: "pw".into(),
        })
        .await
        .expect("insert succeeds");
    assert_eq!(created.id, 11);

    let property = store
        .add_property(new_property(10, "Banff"))
        .await
        .expect("insert succeeds");
    assert_eq!(property.id, 21);
}

#[tokio::test]
async fn exhausted_user_ids_fail_instead_of_wrapping() {
    let store = MemoryStore::new().with_user(user(i32::MAX, "last@mail.com"));
    let err = store
        .add_user(NewUser {
            name: "Overflow".into(),
            email: "overflow@mail.com".into(),
            password: "pw".into(),
        })
        .await
        .expect_err("no ids left");
    assert!(matches!(err, StoreError::ConstraintViolation(ref msg) if msg.contains("users")));
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn last_property_id_is_used_before_exhaustion() {
    let store = MemoryStore::new().with_property(property(i32::MAX - 1, 1, "Nelson", 5_000));

    let last = store
        .add_property(new_property(1, "Nelson"))
        .await
        .expect("insert succeeds");
    assert_eq!(last.id, i32::MAX);

    let err = store
        .add_property(new_property(1, "Nelson"))
        .await
        .expect_err("no ids left");
    assert!(matches!(err, StoreError::ConstraintViolation(ref msg) if msg.contains("properties")));
    assert_eq!(store.property_count(), 2);

    // a failed allocation leaves the counter where it was
    assert!(store.add_property(new_property(1, "Nelson")).await.is_err());
    assert_eq!(store.property_count(), 2);
}
