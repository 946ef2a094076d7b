/// Benchmarks for the superobbing pass.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use obreduce::grid::{AnalyticGrid, GridDefinition};
use obreduce::models::{Observation, PassConfig};
use obreduce::pass;
use obreduce::projection::LambertConformal;

fn observation(i: i64, type_code: u16) -> Observation {
    // Pseudo-random but reproducible scatter over the grid domain.
    let lat = 30.0 + ((i * 7919) % 2000) as f64 / 100.0;
    let lon = -110.0 + ((i * 104729) % 3000) as f64 / 100.0;
    let vertical = 1000.0 - ((i * 13) % 900) as f64;
    let mut variables = hashbrown::HashMap::new();
    let mut quality = hashbrown::HashMap::new();
    variables.insert("POB".to_string(), vertical);
    if type_code == 136 {
        variables.insert("TOB".to_string(), ((i * 31) % 40) as f64 - 10.0);
        quality.insert("TQM".to_string(), ((i * 3) % 4) as f64);
    } else {
        variables.insert("UOB".to_string(), ((i * 17) % 60) as f64 - 30.0);
        variables.insert("VOB".to_string(), ((i * 19) % 60) as f64 - 30.0);
        quality.insert("WQM".to_string(), ((i * 5) % 4) as f64);
    }
    quality.insert("PQM".to_string(), 1.0);
    Observation {
        type_code,
        station_id: format!("ST{:04}", i % 200),
        message_id: (i / 50) as u32,
        lat,
        lon,
        vertical,
        time_offset: ((i % 12) as f64 - 6.0) / 4.0,
        variables,
        quality,
    }
}

fn test_config() -> PassConfig {
    serde_json::from_str(
        r#"{
            "types": {
                "136": {
                    "primary_quality_field": "TQM",
                    "variables": {
                        "TOB": {"method": "mean", "quality_field": "TQM", "quality_threshold": 2},
                        "POB": {"method": "mean", "quality_field": "PQM", "quality_threshold": 2}
                    }
                },
                "236": {
                    "primary_quality_field": "WQM",
                    "variables": {
                        "UOB": {
                            "method": "vertical_weighted",
                            "radius": "max_distance",
                            "quality_field": "WQM",
                            "quality_threshold": 2
                        },
                        "VOB": {
                            "method": "vertical_weighted",
                            "radius": "max_distance",
                            "quality_field": "WQM",
                            "quality_threshold": 2
                        }
                    }
                }
            }
        }"#,
    )
    .unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let projection = LambertConformal::new(25.0, 60.0, 40.0, -97.0);
    let grid =
        GridDefinition::Analytic(AnalyticGrid::new(projection, 50.0, (0, 0), None).unwrap());
    let config = test_config();
    for size in [1_000_i64, 10_000, 100_000] {
        let observations: Vec<Observation> = (0..size)
            .map(|i| observation(i, if i % 2 == 0 { 136 } else { 236 }))
            .collect();
        let name = format!("run_pass({})", size);
        c.bench_function(&name, |b| {
            b.iter(|| pass::run_pass(black_box(&observations), &config, &grid).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
