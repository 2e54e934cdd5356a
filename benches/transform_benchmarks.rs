use clipaug::{
    backends::{FrameRate, MemoryBackend, VideoMetadata},
    processor::FrameTransformer,
    transform::AUGMENTATION_VARIANTS,
    VideoCodec,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, RgbImage};
use std::path::Path;

/// Common clip resolutions in the dataset
const RESOLUTIONS: [(u32, u32); 3] = [(320, 240), (640, 360), (1280, 720)];

fn test_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn bench_frame_warp(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_warp");

    for (width, height) in RESOLUTIONS {
        let frame = test_frame(width, height);
        for variant in AUGMENTATION_VARIANTS {
            let affine = variant.affine(width, height);
            group.bench_with_input(
                BenchmarkId::new(variant.suffix(), format!("{width}x{height}")),
                &frame,
                |b, frame| b.iter(|| affine.apply(black_box(frame)).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_clip_transform(c: &mut Criterion) {
    let (width, height) = (320, 240);
    let backend = MemoryBackend::new();
    backend.insert_clip(
        "bench/clip.mp4",
        VideoMetadata::new(width, height, FrameRate::new(30, 1)),
        vec![test_frame(width, height); 30],
    );
    let transformer = FrameTransformer::new(&backend, VideoCodec::Mpeg4);

    c.bench_function("clip_transform_30_frames", |b| {
        b.iter(|| {
            for variant in AUGMENTATION_VARIANTS {
                let destination = format!("bench/out/clip_{variant}.mp4");
                transformer
                    .transform(Path::new("bench/clip.mp4"), Path::new(&destination), variant)
                    .unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_frame_warp, bench_clip_transform);
criterion_main!(benches);
