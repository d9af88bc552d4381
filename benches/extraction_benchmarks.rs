//! Benchmarks for planning, batching, and extraction runs.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features
//!
//! The FFmpeg benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh` and are skipped without them.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use criterion::{BenchmarkId, Criterion};
use framesnap::{
    ExtractOptions, ExtractionRequest, FfmpegFrameDecoder, FfmpegLogLevel, FrameDecoder,
    FrameExtractor, FrameImageFormat, FrameSnapError, SamplingMode, partition_batches,
    plan_timestamps,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// Decoder that produces nothing, isolating orchestration overhead.
struct NullDecoder;

impl FrameDecoder for NullDecoder {
    fn extract_frames(
        &self,
        _video_reference: &str,
        _timestamps_ms: &[u64],
        _output_directory: &Path,
        _quality: f64,
    ) -> Result<Vec<PathBuf>, FrameSnapError> {
        Ok(Vec::new())
    }
}

fn benchmark_planning(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("plan timestamps");

    for (label, duration) in [("1 minute", 60.0), ("1 hour", 3600.0)] {
        group.bench_with_input(BenchmarkId::new("dense", label), &duration, |bencher, &duration| {
            bencher.iter(|| plan_timestamps(duration, SamplingMode::Dense).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("1 fps", label), &duration, |bencher, &duration| {
            bencher.iter(|| plan_timestamps(duration, SamplingMode::Rate(1.0)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_partitioning(criterion: &mut Criterion) {
    let timestamps = plan_timestamps(3600.0, SamplingMode::Dense).unwrap();

    criterion.bench_function("partition 108k timestamps into batches of 10", |bencher| {
        bencher.iter(|| partition_batches(&timestamps, 10).map(<[u64]>::len).sum::<usize>());
    });
}

fn benchmark_orchestration(criterion: &mut Criterion) {
    let temporary_directory = tempfile::tempdir().unwrap();
    let extractor = FrameExtractor::new(NullDecoder)
        .with_options(ExtractOptions::new().with_output_root(temporary_directory.path()));
    let request = ExtractionRequest::new("null.mp4", 600.0, SamplingMode::Dense);
    let timestamps = plan_timestamps(request.duration_seconds, request.sampling).unwrap();
    let output_directory = temporary_directory.path().join("run");

    criterion.bench_function("extract 10 minutes dense (null decoder)", |bencher| {
        bencher.iter(|| extractor.extract(&request, &output_directory, &timestamps));
    });
}

fn benchmark_ffmpeg_extraction(criterion: &mut Criterion) {
    framesnap::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let mut group = criterion.benchmark_group("ffmpeg batch");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for format in [FrameImageFormat::Png, FrameImageFormat::Jpeg] {
        group.bench_function(format!("10 frames as {format}"), |bencher| {
            let temporary_directory = tempfile::tempdir().unwrap();
            let decoder = FfmpegFrameDecoder::new().with_format(format);
            let batch: Vec<u64> = (0..10).map(|index| index * 100).collect();
            bencher.iter(|| {
                decoder
                    .extract_frames(SAMPLE_VIDEO, &batch, temporary_directory.path(), 0.9)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_full_run(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let duration = framesnap::probe_duration(SAMPLE_VIDEO).unwrap().min(3.0);

    let mut group = criterion.benchmark_group("full run");
    group.sample_size(10);

    group.bench_function("2 fps over up to 3 seconds", |bencher| {
        let temporary_directory = tempfile::tempdir().unwrap();
        let extractor = FrameExtractor::new(FfmpegFrameDecoder::new())
            .with_options(ExtractOptions::new().with_output_root(temporary_directory.path()));
        let request = ExtractionRequest::new(SAMPLE_VIDEO, duration, SamplingMode::Rate(2.0));
        bencher.iter(|| extractor.run(&request));
    });

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_planning,
    benchmark_partitioning,
    benchmark_orchestration,
    benchmark_ffmpeg_extraction,
    benchmark_full_run,
);
criterion::criterion_main!(benches);
