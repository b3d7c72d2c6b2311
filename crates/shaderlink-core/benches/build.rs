// Benchmarks for program building against the headless host

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shaderlink_core::prelude::*;
use shaderlink_core::HeadlessHost;

const VERTEX: &str = r#"
attribute vec2 aPosition;
varying vec2 vUv;
void main() {
    vUv = aPosition * 0.5 + 0.5;
    gl_Position = vec4(aPosition, 0.0, 1.0);
}
"#;

const FRAGMENT: &str = r#"
precision mediump float;
varying vec2 vUv;
void main() {
    gl_FragColor = vec4(vUv, 0.0, 1.0);
}
"#;

fn bench_build_success(c: &mut Criterion) {
    let host = HeadlessHost::new();
    let context = host.acquire_context("bench").expect("headless context");
    let builder = ShaderProgramBuilder::new(&host, context).cleanup(CleanupPolicy::DeleteAfterLink);

    c.bench_function("build_linked_program", |b| {
        b.iter(|| {
            let program = builder.build(black_box(VERTEX), black_box(FRAGMENT));
            host.clear_calls();
            black_box(program)
        })
    });
}

fn bench_build_vertex_failure(c: &mut Criterion) {
    let host = HeadlessHost::new();
    let context = host.acquire_context("bench").expect("headless context");

    c.bench_function("build_vertex_failure", |b| {
        b.iter(|| {
            let result = create_shader_program(&host, context, black_box("not valid glsl"), FRAGMENT);
            host.clear_calls();
            black_box(result)
        })
    });
}

criterion_group!(benches, bench_build_success, bench_build_vertex_failure);
criterion_main!(benches);
