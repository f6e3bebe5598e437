//! Integration tests for the embedded location store and composite queries.

mod common;

use std::collections::HashMap;

use propdb_core::pack::{decode_locations, FragmentRecord, PackWriter, Transform};
use propdb_core::{AttrValue, Error, FragmentLocation, LocationStore, ModelQuery};

use common::wall_model;

fn location(x: f32, y: f32, z: f32) -> FragmentLocation {
    FragmentLocation {
        x,
        y,
        z,
        min_x: x - 0.5,
        min_y: y - 0.5,
        min_z: z - 0.5,
        max_x: x + 0.5,
        max_y: y + 0.5,
        max_z: z + 0.5,
    }
}

#[tokio::test]
async fn test_feature_unavailable_before_embed() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();

    assert!(!locations.has_embedded_locations().await.unwrap());
    assert_eq!(locations.location_count().await.unwrap(), 0);
    assert!(matches!(
        locations.get_location(100).await,
        Err(Error::FeatureUnavailable)
    ));

    let query = ModelQuery::open(&model.store).unwrap();
    assert!(matches!(
        query.placed_element(100).await,
        Err(Error::FeatureUnavailable)
    ));
}

#[tokio::test]
async fn test_embed_round_trips_bit_for_bit() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();

    let mut batch = HashMap::new();
    batch.insert(100u64, location(5.0, 5.0, 5.0));
    batch.insert(300u64, location(0.125, -2.75, 9.0625));
    locations.embed(batch.clone()).await.unwrap();

    assert!(locations.has_embedded_locations().await.unwrap());
    assert_eq!(locations.location_count().await.unwrap(), 2);

    for (db_id, expected) in &batch {
        let read = locations
            .get_location(*db_id as i64)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read, *expected);
    }

    assert_eq!(locations.get_location(9999).await.unwrap(), None);
}

#[tokio::test]
async fn test_reembed_replaces_instead_of_duplicating() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();

    locations
        .embed(HashMap::from([(100u64, location(1.0, 1.0, 1.0))]))
        .await
        .unwrap();
    locations
        .embed(HashMap::from([(100u64, location(2.0, 2.0, 2.0))]))
        .await
        .unwrap();

    assert_eq!(locations.location_count().await.unwrap(), 1);
    let read = locations.get_location(100).await.unwrap().unwrap();
    assert_eq!(read.x, 2.0);
}

#[tokio::test]
async fn test_stream_count_matches_location_count() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();

    let batch: HashMap<u64, FragmentLocation> = (1..=25u64)
        .map(|id| (id, location(id as f32, 0.0, 0.0)))
        .collect();
    locations.embed(batch).await.unwrap();

    let count = locations.location_count().await.unwrap();
    let streamed = locations.stream_locations().try_collect().await.unwrap();
    assert_eq!(streamed.len() as i64, count);
}

#[tokio::test]
async fn test_stream_before_embed_reports_unavailable() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();

    let result = locations.stream_locations().try_collect().await;
    assert!(matches!(result, Err(Error::FeatureUnavailable)));
}

#[tokio::test]
async fn test_decode_then_embed_pipeline() {
    let model = wall_model();

    // One record per wall entity, version 4: world-space bounding boxes.
    let mut writer = PackWriter::new();
    for (db_id, x) in [(100u64, 5.0f32), (300u64, 20.0f32)] {
        writer.add_record(&FragmentRecord {
            version: 4,
            flags: 0,
            material_id: 3,
            geometry_id: 7,
            transform: Some(Transform::Translation([x, 0.0, 0.0])),
            bbox: [0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            db_id,
        });
    }
    let decoded = decode_locations(&writer.finish()).unwrap();

    let locations = LocationStore::new(model.store.clone()).unwrap();
    locations.embed(decoded).await.unwrap();

    let read = locations.get_location(100).await.unwrap().unwrap();
    assert_eq!(read.translation(), [5.0, 0.0, 0.0]);
    assert_eq!(read.bounds(), ([5.0, 0.0, 0.0], [6.0, 1.0, 1.0]));
}

#[tokio::test]
async fn test_placed_element_joins_properties_and_location() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();
    locations
        .embed(HashMap::from([(100u64, location(5.0, 5.0, 5.0))]))
        .await
        .unwrap();

    let query = ModelQuery::open(&model.store).unwrap();
    let placed = query.placed_element(100).await.unwrap();

    assert_eq!(placed.db_id, 100);
    assert_eq!(
        placed
            .properties
            .get(&propdb_core::AttrKey::new("Materials", "Material")),
        Some(&AttrValue::Text("Default Material".into()))
    );
    assert_eq!(placed.location.unwrap().x, 5.0);

    // The type entity has properties but no location.
    let type_elem = query.placed_element(300).await.unwrap();
    assert!(type_elem.location.is_none());
}

#[tokio::test]
async fn test_find_placed_intersects_property_and_location_sets() {
    let model = wall_model();
    // A second wall matching the property filter but with no location.
    model.add_entity(101, "ext-wall-101");
    model.set_prop(101, "Item", "Category", Some("Walls"));

    let locations = LocationStore::new(model.store.clone()).unwrap();
    locations
        .embed(HashMap::from([(100u64, location(5.0, 5.0, 5.0))]))
        .await
        .unwrap();

    let query = ModelQuery::open(&model.store).unwrap();
    let placed = query
        .find_placed_by_property("Item", "Category", &AttrValue::Text("Walls".into()))
        .await
        .unwrap();

    // Only entity 100 is in both the match set and the side table.
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].db_id, 100);
    assert!(placed[0].location.is_some());
}

#[tokio::test]
async fn test_placed_elements_batch() {
    let model = wall_model();
    let locations = LocationStore::new(model.store.clone()).unwrap();
    locations
        .embed(HashMap::from([
            (100u64, location(5.0, 5.0, 5.0)),
            (300u64, location(9.0, 9.0, 9.0)),
        ]))
        .await
        .unwrap();

    let query = ModelQuery::open(&model.store).unwrap();
    let placed = query.placed_elements(&[100, 300]).await.unwrap();

    assert_eq!(placed.len(), 2);
    assert!(placed.iter().all(|p| p.location.is_some()));
    // Both walls share the type's material through inheritance or directly.
    assert!(placed.iter().all(|p| p
        .properties
        .contains_key(&propdb_core::AttrKey::new("Materials", "Material"))));
}
