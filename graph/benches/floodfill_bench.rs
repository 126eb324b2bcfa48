use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;
use papas_graph::{Cluster, EnergyHighWater, Layer, ObjectGraph};
use papas_id::{IdSequence, Identifier, Subtype};

fn build_graph(n: usize, degree: usize) -> ObjectGraph {
    let mut seq = IdSequence::new();
    let mut hw = EnergyHighWater::default();
    let mut g = ObjectGraph::new();
    let ids: Vec<Identifier> = (0..n)
        .map(|i| {
            let c = Cluster::create(
                &mut seq,
                &mut hw,
                Layer::EcalIn,
                Subtype::Smeared,
                Vector3::new(1.0, i as f64 * 1e-3, 0.0),
                1.0,
                0.01,
            )
            .unwrap();
            g.insert(c).unwrap()
        })
        .collect();

    let mut state: u64 = 42;
    for i in 0..n {
        for _ in 0..degree {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let j = (state >> 33) as usize % n;
            if i != j {
                g.link(ids[i], ids[j]).unwrap();
            }
        }
    }
    g
}

fn bench_partition(c: &mut Criterion) {
    c.bench_function("partition_2000_nodes_sparse", |b| {
        b.iter_with_setup(
            || build_graph(2000, 1),
            |mut g| {
                let _ = black_box(g.partition(&mut IdSequence::new()));
            },
        );
    });
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
