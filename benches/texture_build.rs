use bezlight::config::FilterConfig;
use bezlight::math::mat4::Mat4;
use bezlight::math::vec3::Vec3;
use bezlight::mesh::Mesh;
use bezlight::render::Renderer;
use bezlight::shape::{ShapeCatalog, ShapeId};
use bezlight::texture::{BoundaryClassifier, KernelBank, LightTexture, SourceImage};
use bezlight::BezierLight;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SOURCE_SIZE: u32 = 256;

/// A diagonal gradient, so filtering has something to blur.
fn gradient_source(size: u32) -> SourceImage {
    let texels = (0..size * size)
        .map(|i| {
            let (col, row) = (i % size, i / size);
            let t = (col + row) as f32 / (2 * size) as f32;
            [t, 1.0 - t, 0.5, 1.0]
        })
        .collect();
    SourceImage::from_texels(size, size, texels).unwrap()
}

fn benchmark_kernel_bank(c: &mut Criterion) {
    let filter = FilterConfig::default();
    c.bench_function("kernel_bank", |b| {
        b.iter(|| KernelBank::new(black_box(filter.overlap), black_box(filter.max_dist)));
    });
}

fn benchmark_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_texel");
    let catalog = ShapeCatalog::embedded().unwrap();

    for shape in [ShapeId::Quad, ShapeId::Rainbow, ShapeId::Char] {
        let classifier = BoundaryClassifier::new(&catalog.control_points(shape));
        group.bench_with_input(BenchmarkId::from_parameter(shape.name()), &classifier, |b, cls| {
            b.iter(|| {
                for row in (0..SOURCE_SIZE).step_by(16) {
                    for col in (0..SOURCE_SIZE).step_by(16) {
                        let uv = BoundaryClassifier::texel_uv(col, row, SOURCE_SIZE, SOURCE_SIZE);
                        black_box(cls.classify(uv, SOURCE_SIZE));
                    }
                }
            });
        });
    }

    group.finish();
}

fn benchmark_full_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("light_texture");
    group.sample_size(10);

    let catalog = ShapeCatalog::embedded().unwrap();
    let source = gradient_source(SOURCE_SIZE);
    let filter = FilterConfig::default();

    for shape in [ShapeId::Quad, ShapeId::Rainbow] {
        let points = catalog.control_points(shape);
        group.bench_with_input(BenchmarkId::from_parameter(shape.name()), &points, |b, cps| {
            b.iter(|| LightTexture::build(black_box(&source), cps, &filter));
        });
    }

    group.finish();
}

fn benchmark_stencil_render(c: &mut Criterion) {
    let catalog = ShapeCatalog::embedded().unwrap();
    let light = BezierLight::from_control_points(
        ShapeId::Rainbow,
        catalog.control_points(ShapeId::Rainbow),
    );
    let mesh = Mesh::unit_quad();
    let view_projection = Mat4::perspective_rh(50f32.to_radians(), 1.0, 1.0, 100.0)
        * Mat4::look_at_rh(
            Vec3::new(0.0, 1.0, 7.0),
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
        );

    c.bench_function("draw_light_512", |b| {
        let mut renderer = Renderer::new(512, 512);
        b.iter(|| {
            renderer.clear(0);
            renderer.draw_light(black_box(&light), &mesh, view_projection);
        });
    });
}

criterion_group!(
    benches,
    benchmark_kernel_bank,
    benchmark_classification,
    benchmark_full_build,
    benchmark_stencil_render
);
criterion_main!(benches);
