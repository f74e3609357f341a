use criterion::{criterion_group, criterion_main, BatchSize, Criterion, black_box};

use glam::IVec3;

use voxvol::voxel::edit::{CuttingEngine, FilterEngine, FilterState, UndoLog};
use voxvol::voxel::VolumeData;

fn volume(size: i32) -> VolumeData {
    let mut data = VolumeData::new(size, size, size, 0.25, 16).unwrap();
    data.init_random(12345);
    data
}

fn bench_init_128(c: &mut Criterion) {
    let mut data = VolumeData::new(128, 128, 128, 0.25, 16).unwrap();

    c.bench_function("init_random_128", |b| {
        b.iter(|| data.init_random(black_box(7)));
    });
}

fn bench_cube_cut_128(c: &mut Criterion) {
    c.bench_function("remove_cube_parallel_128_r24", |b| {
        b.iter_batched(
            || (volume(128), UndoLog::default()),
            |(mut data, mut undo)| {
                CuttingEngine::new(&mut data, &mut undo)
                    .remove_cube_parallel(black_box(IVec3::splat(64)), black_box(24));
                data
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_sphere_cut_64(c: &mut Criterion) {
    c.bench_function("remove_sphere_64_r12", |b| {
        b.iter_batched(
            || (volume(64), UndoLog::default()),
            |(mut data, mut undo)| {
                CuttingEngine::new(&mut data, &mut undo)
                    .remove_sphere(black_box(IVec3::splat(32)), black_box(12));
                data
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_filter_128(c: &mut Criterion) {
    c.bench_function("filter_value_range_128", |b| {
        b.iter_batched(
            || volume(128),
            |mut data| {
                let mut state = FilterState::default();
                FilterEngine::new(&mut data, &mut state).filter_value_range(black_box(0), black_box(31));
                data
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_reconcile_after_cut(c: &mut Criterion) {
    c.bench_function("clean_dirty_data_after_cut_128", |b| {
        b.iter_batched(
            || {
                let mut data = volume(128);
                let mut undo = UndoLog::default();
                CuttingEngine::new(&mut data, &mut undo).remove_cube_parallel(IVec3::ZERO, 40);
                data
            },
            |mut data| {
                data.clean_dirty_data();
                data
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_init_128,
    bench_cube_cut_128,
    bench_sphere_cut_64,
    bench_filter_128,
    bench_reconcile_after_cut,
);
criterion_main!(benches);
