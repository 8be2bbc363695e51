#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::{hint::black_box, sync::Arc};
use wiring::{params, Container, Injectable};

#[derive(Injectable)]
struct A {
    b: Arc<B>,
    c: Arc<C>,
}

#[derive(Injectable)]
struct B {
    #[inject(default = 1)]
    value: u16,
}

#[derive(Injectable)]
struct C {
    ca: Arc<CA>,
}

#[derive(Injectable)]
struct CA {
    caa: Arc<CAA>,
}

#[derive(Injectable)]
struct CAA {
    caaa: Arc<CAAA>,
}

#[derive(Injectable)]
struct CAAA;

fn container_make(container: &Container) {
    let _ = black_box(container.make("A").unwrap());
}

fn container_make_with_params(container: &Container) {
    let _ = black_box(container.make_with("B", params! { "value" => 2_u16 }).unwrap());
}

fn bench_container_new(c: &mut Criterion) {
    c.bench_function("container_new", |b| b.iter(Container::new));
}

fn bench_container_make(c: &mut Criterion) {
    c.bench_function("container_make_transient", |b| {
        let container = Container::new();
        b.iter(|| container_make(&container));
    })
    .bench_function("container_make_shared", |b| {
        let container = Container::new();
        container.share("A").unwrap();
        b.iter(|| container_make(&container));
    })
    .bench_function("container_make_shared_dependencies", |b| {
        let container = Container::new();
        for name in ["B", "C", "CA", "CAA", "CAAA"] {
            container.share(name).unwrap();
        }
        b.iter(|| container_make(&container));
    })
    .bench_function("container_make_with_params", |b| {
        let container = Container::new();
        b.iter(|| container_make_with_params(&container));
    });
}

criterion_group!(benches, bench_container_new, bench_container_make);
criterion_main!(benches);
