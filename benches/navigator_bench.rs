use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gridnav::{BugNavigator, CacheLoc, MapEdges};

fn open_field_passable(_c: CacheLoc) -> [bool; 8] {
    [true; 8]
}

fn ring_passable(center: CacheLoc, radius: i32, gap: (i32, i32)) -> impl Fn(CacheLoc) -> [bool; 8] {
    move |from| {
        let mut out = [true; 8];
        for dir in gridnav::Dir8::ALL {
            let n = from.step(dir);
            let cheb = (n.x - center.x).abs().max((n.y - center.y).abs());
            if cheb == radius && (n.x, n.y) != gap {
                out[dir.index()] = false;
            }
        }
        out
    }
}

fn bench_open_field(c: &mut Criterion) {
    let edges = MapEdges::default();
    c.bench_function("open_field_march", |b| {
        b.iter(|| {
            let mut nav = BugNavigator::with_seed(7);
            nav.set_target(CacheLoc::new(200, 128));
            let mut cur = CacheLoc::new(128, 128);
            while let Some((dx, dy)) = nav.compute_step(cur, &open_field_passable(cur), &edges) {
                cur = CacheLoc::new(cur.x + dx, cur.y + dy);
            }
            black_box(cur)
        })
    });
}

fn bench_ring_trace(c: &mut Criterion) {
    let edges = MapEdges::default();
    let start = CacheLoc::new(128, 128);
    let passable = ring_passable(start, 5, (128, 123));
    c.bench_function("ring_trace_escape", |b| {
        b.iter(|| {
            let mut nav = BugNavigator::with_seed(7);
            let target = CacheLoc::new(160, 128);
            nav.set_target(target);
            let mut cur = start;
            for _ in 0..500 {
                if cur == target {
                    break;
                }
                match nav.compute_step(cur, &passable(cur), &edges) {
                    Some((dx, dy)) => cur = CacheLoc::new(cur.x + dx, cur.y + dy),
                    None => break,
                }
            }
            black_box(cur)
        })
    });
}

criterion_group!(benches, bench_open_field, bench_ring_trace);
criterion_main!(benches);
