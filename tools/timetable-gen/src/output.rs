use anyhow::{Context, Result};
use geo::LineString;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use headway_transit::prelude::{Availability, Schedule, Trip};
use serde_json::json;
use std::path::Path;

fn availability_to_json(availability: &Availability) -> serde_json::Value {
    let weekdays: Vec<String> = availability
        .weekdays()
        .iter()
        .map(|day| day.to_string())
        .collect();

    json!({
        "start_date": availability.start_date(),
        "end_date": availability.end_date(),
        "weekdays": weekdays,
        "added_dates": availability.added_dates(),
        "removed_dates": availability.removed_dates(),
    })
}

fn trip_to_json(trip: &Trip) -> serde_json::Value {
    let stop_times: Vec<_> = trip
        .stop_times()
        .iter()
        .map(|st| {
            json!({
                "sequence": st.stop.sequence(),
                "station": st.stop.station().id(),
                "arrival": st.arrival,
                "departure": st.departure,
            })
        })
        .collect();

    json!({
        "id": trip.id(),
        "route": trip.route().id(),
        "direction": trip.direction(),
        "headsign": trip.headsign(),
        "vehicle": trip.vehicle_id(),
        "stop_times": stop_times,
    })
}

/// Convert a schedule to its JSON document
pub fn schedule_to_json(schedule: &Schedule) -> serde_json::Value {
    json!({
        "description": schedule.description(),
        "availability": availability_to_json(schedule.availability()),
        "vehicle_count": schedule.vehicle_count(),
        "trips": schedule.trips().iter().map(trip_to_json).collect::<Vec<_>>(),
    })
}

/// Write the schedule as pretty-printed JSON
pub fn write_schedule_json(schedule: &Schedule, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(&schedule_to_json(schedule))
        .context("Failed to serialize schedule")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    log::info!(
        "Wrote {} trips to {}",
        schedule.trips().len(),
        path.display()
    );

    Ok(())
}

fn line_string_to_geojson(line: &LineString<f64>) -> Value {
    Value::LineString(line.0.iter().map(|c| vec![c.x, c.y]).collect())
}

/// One feature per direction; every trip of a direction shares its shape
fn shape_features(schedule: &Schedule) -> Vec<Feature> {
    let mut features: Vec<Feature> = Vec::new();
    let mut seen = Vec::new();

    for trip in schedule.trips() {
        if seen.contains(&trip.direction()) {
            continue;
        }
        seen.push(trip.direction());

        let shape = trip.shape();
        let mut properties = serde_json::Map::new();
        properties.insert("route".to_string(), json!(trip.route().id()));
        properties.insert("direction".to_string(), json!(trip.direction()));
        properties.insert("length_m".to_string(), json!(shape.length()));
        properties.insert("points".to_string(), json!(shape.len()));

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(line_string_to_geojson(&shape.line_string()))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    features
}

/// Write the resolved shapes as a GeoJSON FeatureCollection
pub fn write_shapes_geojson(schedule: &Schedule, path: &Path) -> Result<()> {
    let features = shape_features(schedule);
    let count = features.len();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let geojson = GeoJson::FeatureCollection(collection);
    std::fs::write(path, geojson.to_string())
        .with_context(|| format!("Failed to write shapes file: {}", path.display()))?;

    log::info!("Wrote {} shapes to {}", count, path.display());

    Ok(())
}
