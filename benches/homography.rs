use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use perspective_overlay::warp::{compute_projective_transform, OverlaySize, Point, Quad, WarpMesh};
use perspective_overlay::{flatten, Homography};

fn bench_solve(c: &mut Criterion) {
    let src = OverlaySize::new(400.0, 800.0).corners();
    let dst = [
        Point::new(100.0, 120.0),
        Point::new(350.0, 150.0),
        Point::new(340.0, 560.0),
        Point::new(120.0, 530.0),
    ];

    c.bench_function("compute_projective_transform", |b| {
        b.iter(|| compute_projective_transform(black_box(&src), black_box(&dst)))
    });
}

fn bench_mesh(c: &mut Criterion) {
    let size = OverlaySize::new(400.0, 800.0);
    let quad = Quad::from_rect(Point::new(100.0, 100.0), Point::new(200.0, 400.0));
    let Ok(h) = Homography::from_rect(size, quad.corners()) else {
        return;
    };

    c.bench_function("warp_mesh_16", |b| {
        b.iter(|| WarpMesh::build(black_box(&h), size, 16))
    });
}

fn bench_flatten(c: &mut Criterion) {
    let background = RgbaImage::from_pixel(1920, 1080, Rgba([40, 80, 120, 255]));
    let overlay = RgbaImage::from_pixel(400, 800, Rgba([200, 150, 100, 255]));
    let quad = Quad::new([
        Point::new(600.0, 200.0),
        Point::new(1100.0, 260.0),
        Point::new(1080.0, 950.0),
        Point::new(620.0, 900.0),
    ])
    .unwrap_or_default();

    c.bench_function("flatten_1080p", |b| {
        b.iter(|| flatten(black_box(&background), black_box(&overlay), black_box(&quad)))
    });
}

criterion_group!(benches, bench_solve, bench_mesh, bench_flatten);
criterion_main!(benches);
