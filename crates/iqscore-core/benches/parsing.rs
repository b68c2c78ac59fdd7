use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use iqscore_core::parser::{parse_session_json_str, parse_session_str};

const DOMAINS: [&str; 5] = [
    "Verbal Comprehension",
    "Perceptual Reasoning",
    "Working Memory",
    "Processing Speed",
    "Fluid Reasoning",
];

fn toml_session(responses: usize) -> String {
    let mut s = String::from(
        "[session]\nid = \"0b6f2d4e-5c1a-4c8e-9a57-3f0d2b1c7e11\"\nage = 18\n",
    );
    for i in 0..responses {
        s.push_str(&format!(
            "\n[[responses]]\ndomain = \"{}\"\nis_correct = {}\nresponse_time_seconds = {}.5\n",
            DOMAINS[i % 5],
            i % 3 != 0,
            3 + i % 9
        ));
    }
    s
}

fn json_session(responses: usize) -> String {
    let items: Vec<String> = (0..responses)
        .map(|i| {
            format!(
                r#"{{"domain":"{}","is_correct":{},"response_time_seconds":{}.5}}"#,
                DOMAINS[i % 5],
                i % 3 != 0,
                3 + i % 9
            )
        })
        .collect();
    format!(
        r#"{{"id":"0b6f2d4e-5c1a-4c8e-9a57-3f0d2b1c7e11","age":18,"responses":[{}]}}"#,
        items.join(",")
    )
}

fn bench_parse_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_session");
    let path = PathBuf::from("bench.toml");

    let small = toml_session(5);
    let full = toml_session(75);
    let full_json = json_session(75);

    group.bench_function("toml_small", |b| {
        b.iter(|| parse_session_str(black_box(&small), &path))
    });

    group.bench_function("toml_full", |b| {
        b.iter(|| parse_session_str(black_box(&full), &path))
    });

    group.bench_function("json_full", |b| {
        b.iter(|| parse_session_json_str(black_box(&full_json), &path))
    });

    group.finish();
}

criterion_group!(benches, bench_parse_session);
criterion_main!(benches);
