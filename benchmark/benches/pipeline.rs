// Per-frame cost of the two stages, run on the host.
//
// Each iteration processes the same buffer in place. Both swaps are their own
// inverse and non-matching frames are never written, so the buffer stays a
// valid frame across iterations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use echo_benchmark::workloads;
use echo_element::classifier::inspect;
use echo_element::mutator::mutate;
use echo_element::pipeline::Pipeline;
use echo_element::{EchoConfig, EchoDepth, FrameContext};

const VARIANTS: &[(&str, EchoConfig)] = &[("icmp-echo", EchoConfig::ICMP), ("udp-echo", EchoConfig::UDP)];

pub fn pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for (variant, config) in VARIANTS {
        let pipeline = match Pipeline::attached(*config) {
            Ok(pipeline) => pipeline,
            Err(e) => panic!("cannot populate {variant}: {e}"),
        };

        for mut workload in workloads() {
            group.throughput(Throughput::Bytes(workload.frame.len() as u64));
            group.bench_function(BenchmarkId::new(*variant, workload.name), |b| {
                b.iter(|| pipeline.process(black_box(&mut workload.frame)))
            });
        }

        eprintln!("{variant}: {}", pipeline.stats());
    }

    group.finish();
}

pub fn stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    for (variant, config) in VARIANTS {
        for mut workload in workloads() {
            group.bench_function(BenchmarkId::new(format!("{variant}/classify"), workload.name), |b| {
                b.iter(|| inspect(&FrameContext::new(black_box(&mut workload.frame)), config.target))
            });
        }

        let matching = match config.depth {
            EchoDepth::Link => "icmp",
            EchoDepth::Transport => "udp",
        };
        let Some(mut workload) = workloads().into_iter().find(|w| w.name == matching) else {
            continue;
        };
        group.bench_function(BenchmarkId::new(format!("{variant}/mutate"), workload.name), |b| {
            b.iter(|| mutate(&mut FrameContext::new(black_box(&mut workload.frame)), config.depth))
        });
    }

    group.finish();
}

criterion_group!(benches, pipeline, stages);
criterion_main!(benches);
