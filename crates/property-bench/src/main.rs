//! Benchmark for property creation, merge and migration using point data.
//!
//! Reads a JSON array of points (or synthesizes a grid when the file is
//! missing), turns each into a marker property and times the main
//! operations over several iterations.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use property_model::builtin::{self, marker, DEFAULT_GROUP};
use property_model::{
    create_property, merge, validate_property, GeometryKind, LatLngHeight, LinkableFields, Property,
    SceneId, Schema, SchemaDiff, SchemaField, SchemaGroup, SchemaGroupList, SchemaId, Value, ValueType,
};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_DATA_PATH: &str = "data/points.json";
const DEFAULT_ITERATIONS: usize = 5;
const GRID_SIZE: usize = 200;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct Point {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    height: Option<f64>,
    /// Style payload passed straight to the decoder.
    #[serde(default)]
    style: Option<serde_json::Value>,
}

fn synthesize_grid(size: usize) -> Vec<Point> {
    let mut points = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            let channel = ((i * 255) / size.max(1)) as i64;
            points.push(Point {
                latitude: -80.0 + 160.0 * i as f64 / size as f64,
                longitude: -170.0 + 340.0 * j as f64 / size as f64,
                height: (j % 2 == 0).then_some(j as f64),
                style: Some(serde_json::json!({
                    "color": [channel, 128, 255 - channel, 255],
                    "size": (i % 16) as f64,
                })),
            });
        }
    }
    points
}

fn load_points(path: &str) -> Vec<Point> {
    if !Path::new(path).exists() {
        println!("{} not found, synthesizing a {}x{} grid", path, GRID_SIZE, GRID_SIZE);
        return synthesize_grid(GRID_SIZE);
    }
    let json_data = fs::read_to_string(path).expect("Failed to read points file");
    serde_json::from_str(&json_data).expect("Failed to parse JSON")
}

/// The next marker release: `height` moves to its own group and
/// `pointSize` becomes a string.
fn marker_v2() -> Schema {
    let default = SchemaGroup::new(
        DEFAULT_GROUP,
        [
            SchemaField::new(marker::LOCATION, ValueType::LatLng),
            SchemaField::new(marker::POINT_COLOR, ValueType::String),
            SchemaField::new(marker::POINT_SIZE, ValueType::String),
            SchemaField::new(marker::IMAGE, ValueType::Url),
        ],
    )
    .expect("Invalid default group");
    let elevation = SchemaGroup::new("elevation", [SchemaField::new(marker::HEIGHT, ValueType::Number)])
        .expect("Invalid elevation group");
    Schema::new(
        SchemaId::parse("builtin~2/marker").expect("Invalid schema ID"),
        SchemaGroupList::new([default, elevation]).expect("Invalid group list"),
        LinkableFields::default(),
    )
    .expect("Invalid schema")
}

fn geometry(point: &Point) -> Value {
    match point.height {
        Some(height) => Value::LatLngHeight(LatLngHeight {
            lat: point.latitude,
            lng: point.longitude,
            height,
        }),
        None => Value::LatLng(property_model::LatLng {
            lat: point.latitude,
            lng: point.longitude,
        }),
    }
}

fn create_all(points: &[Point], scene: SceneId) -> Vec<Property> {
    points
        .iter()
        .map(|p| {
            create_property(GeometryKind::Point, geometry(p), scene, p.style.as_ref(), "")
                .expect("Failed to create property")
        })
        .collect()
}

fn report(label: &str, count: usize, times: &[Duration]) {
    let best = times.iter().min().copied().unwrap_or_default();
    let total: Duration = times.iter().sum();
    let mean = total / times.len().max(1) as u32;
    println!(
        "{:<10} best {:>10.2?}  mean {:>10.2?}  {:>12.0} props/s",
        label,
        best,
        mean,
        count as f64 / best.as_secs_f64().max(f64::EPSILON)
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let data_path = args.next().unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let iterations = args
        .next()
        .map(|s| s.parse::<usize>().expect("Iteration count must be a number"))
        .unwrap_or(DEFAULT_ITERATIONS)
        .max(1);

    println!("Loading points from: {}", data_path);
    let load_start = Instant::now();
    let points = load_points(&data_path);
    println!("Loaded {} points in {:?}", points.len(), load_start.elapsed());

    let scene = SceneId::new();
    let v1 = builtin::schema_by_extension(marker::EXTENSION).expect("Missing marker schema");
    let v2 = marker_v2();
    let diff = SchemaDiff::from_schemas(v1, &v2);
    let parent = create_property(
        GeometryKind::Point,
        Value::LatLng(property_model::LatLng::default()),
        scene,
        Some(&serde_json::json!({ "color": "#ffffffff", "size": 4 })),
        "",
    )
    .expect("Failed to create parent property");

    let mut create_times = Vec::with_capacity(iterations);
    let mut validate_times = Vec::with_capacity(iterations);
    let mut merge_times = Vec::with_capacity(iterations);
    let mut migrate_times = Vec::with_capacity(iterations);
    let mut overridden = 0;
    let mut changed = 0;

    for iteration in 0..iterations {
        let start = Instant::now();
        let mut properties = create_all(&points, scene);
        create_times.push(start.elapsed());

        let start = Instant::now();
        for p in &properties {
            validate_property(p, v1).expect("Invalid property");
        }
        validate_times.push(start.elapsed());

        let start = Instant::now();
        overridden = 0;
        for p in &properties {
            let merged = merge(Some(p), Some(&parent), None).expect("Schemas differ");
            overridden += merged
                .groups
                .iter()
                .flat_map(|g| &g.fields)
                .filter(|f| f.overridden)
                .count();
        }
        merge_times.push(start.elapsed());

        let start = Instant::now();
        changed = properties
            .iter_mut()
            .map(|p| diff.migrate(p))
            .filter(|&c| c)
            .count();
        migrate_times.push(start.elapsed());

        info!(iteration, "iteration finished");
    }

    println!("\n{} properties x {} iterations", points.len(), iterations);
    report("create", points.len(), &create_times);
    report("validate", points.len(), &validate_times);
    report("merge", points.len(), &merge_times);
    report("migrate", points.len(), &migrate_times);
    println!("\n  - {} overridden fields per merge pass", overridden);
    println!("  - {} properties changed by migration", changed);
}
