use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::{MultiPolygon, point, polygon};

use heatnet_core::prelude::*;

const SPACING: f64 = 100.0;

#[allow(clippy::cast_precision_loss)]
fn grid(size: usize) -> (Vec<Building>, Vec<Street>) {
    let mut streets = Vec::with_capacity(2 * (size + 1));
    for i in 0..=size {
        let offset = i as f64 * SPACING;
        let crossings = (0..=size).map(|j| j as f64 * SPACING);
        streets.push(Street {
            id: format!("h{i}"),
            name: None,
            highway: Some("residential".to_string()),
            geometry: crossings.clone().map(|x| (x, offset)).collect::<Vec<_>>().into(),
        });
        streets.push(Street {
            id: format!("v{i}"),
            name: None,
            highway: Some("residential".to_string()),
            geometry: crossings.map(|y| (offset, y)).collect::<Vec<_>>().into(),
        });
    }

    let mut buildings = Vec::with_capacity(size * size);
    for row in 0..size {
        for column in 0..size {
            let x = column as f64 * SPACING + 40.0;
            let y = row as f64 * SPACING + 20.0;
            buildings.push(Building {
                id: format!("b{row}_{column}"),
                geometry: MultiPolygon::new(vec![polygon![
                    (x: x - 5.0, y: y - 5.0),
                    (x: x + 5.0, y: y - 5.0),
                    (x: x + 5.0, y: y + 5.0),
                    (x: x - 5.0, y: y + 5.0),
                ]]),
                heating_load_kw: 15.0,
                annual_heat_demand_kwh: None,
            });
        }
    }

    (buildings, streets)
}

fn street_graph(c: &mut Criterion) {
    let (_, streets) = grid(30);
    c.bench_function("build_street_graph 30x30", |b| {
        b.iter(|| build_street_graph(black_box(&streets)));
    });
}

fn dual_pipe(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_dual_pipe_topology");
    group.sample_size(10);

    for size in [5, 10, 20] {
        let (buildings, streets) = grid(size);
        let connections = compute_connection_records(&buildings, &streets);
        let params = NetworkParameters::default();
        let config = TopologyConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                build_dual_pipe_topology(
                    black_box(&buildings),
                    black_box(&streets),
                    point!(x: 0.0, y: 0.0),
                    &params,
                    &connections,
                    &config,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, street_graph, dual_pipe);
criterion_main!(benches);
