use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use remora::{Point, Rect, Router};
use std::hint::black_box;

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    cols: i32,
    rows: i32,
}

impl FieldSpec {
    fn build(&self) -> (Router, Point, Point) {
        let mut router = Router::new();
        let mut rects = Vec::new();
        for i in 0..self.cols {
            for j in 0..self.rows {
                rects.push(Rect::new(40 + 40 * i, 40 + 40 * j, 20, 20));
            }
        }
        router.set_obstacles(rects).unwrap();
        let end = Point::new(40 * (self.cols + 1), 40 * (self.rows + 1));
        (router, Point::new(0, 0), end)
    }
}

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    for (cols, rows) in [(3, 3), (6, 4), (10, 6)] {
        let spec = FieldSpec { cols, rows };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{cols}x{rows}")),
            &spec,
            |b, spec| {
                let (mut router, start, end) = spec.build();
                b.iter(|| black_box(router.route(start, end).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_incremental_reroute(c: &mut Criterion) {
    let mut group = c.benchmark_group("reroute");
    let spec = FieldSpec { cols: 6, rows: 4 };
    group.bench_function("drag_one_obstacle", |b| {
        let (mut router, start, end) = spec.build();
        let route = router.add_route(start, end).unwrap();
        router.solve();
        let id = router
            .graph()
            .obstacles()
            .map(|(id, _)| id)
            .next()
            .unwrap();
        let mut offset = 0;
        b.iter(|| {
            offset = (offset + 1) % 8;
            router
                .update_obstacle(id, Rect::new(40 + offset, 40, 20, 20))
                .unwrap();
            black_box(router.solve());
            black_box(router.path(route));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_route, bench_incremental_reroute);
criterion_main!(benches);
