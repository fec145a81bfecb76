use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use relumin_core::cluster::{decode_slot_list, encode_slots, parse_cluster_nodes};
use std::collections::BTreeSet;
use std::hint::black_box;

/// Build a report with `masters` masters, one replica each, slots split evenly
fn build_report(masters: u16) -> String {
    let per_node = 16384 / masters;
    let mut report = String::new();
    for i in 0..masters {
        let start = i * per_node;
        let end = if i == masters - 1 {
            16383
        } else {
            start + per_node - 1
        };
        let flags = if i == 0 { "myself,master" } else { "master" };
        report.push_str(&format!(
            "{:040x} 127.0.0.1:{} {} - 0 1426238316232 {} connected {}-{}\n",
            i,
            7000 + i,
            flags,
            i + 1,
            start,
            end
        ));
        report.push_str(&format!(
            "{:040x} 127.0.0.1:{} slave {:040x} 0 1426238317239 {} connected\n",
            1000 + u32::from(i),
            8000 + i,
            i,
            i + 1
        ));
    }
    report
}

/// Benchmark: CLUSTER NODES parsing by cluster size
fn bench_parse_cluster_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_cluster_nodes");

    for masters in [3u16, 16, 64] {
        let report = build_report(masters);
        group.bench_with_input(BenchmarkId::from_parameter(masters), &report, |b, report| {
            b.iter(|| parse_cluster_nodes(black_box(report), black_box("10.0.0.5:7000")).unwrap());
        });
    }

    group.finish();
}

/// Benchmark: slot codec on contiguous and fragmented sets
fn bench_slot_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_codec");

    let contiguous: BTreeSet<u16> = (0..16384).collect();
    let fragmented: BTreeSet<u16> = (0..16384).step_by(2).collect();

    group.bench_function("encode_contiguous", |b| {
        b.iter(|| encode_slots(black_box(&contiguous)));
    });

    group.bench_function("encode_fragmented", |b| {
        b.iter(|| encode_slots(black_box(&fragmented)));
    });

    let encoded = encode_slots(&fragmented);
    group.bench_function("decode_fragmented", |b| {
        b.iter(|| decode_slot_list(black_box(&encoded)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_parse_cluster_nodes, bench_slot_codec);
criterion_main!(benches);
