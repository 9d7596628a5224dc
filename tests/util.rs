#![allow(dead_code)]
use mesh_insitu::algs::communicator::ThreadComm;
use mesh_insitu::prelude::*;

/// Unit-spaced image block with one cell, shifted to `x` along the x axis.
pub fn image_at(x: f64) -> DataSet {
    DataSet::image([x, 0.0, 0.0], [1.0; 3], [0, 1, 0, 1, 0, 1])
}

/// x origin of a leaf, used as its identity in traversal tests.
pub fn origin_x(ds: &DataSet) -> f64 {
    ds.bounds().min()[0]
}

/// `n` block slots; slot `i` is present only on rank `i % size`.
pub fn round_robin(rank: usize, size: usize, n: usize) -> DataObject {
    let blocks = (0..n)
        .map(|i| (i % size == rank).then(|| image_at(i as f64).into()))
        .collect();
    MultiBlock::with_blocks(blocks).into()
}

/// Run `f` on every rank of a fresh `size`-rank thread world; results by rank.
pub fn run_world<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(ThreadComm) -> T + Sync,
{
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = ThreadComm::world(size)
            .into_iter()
            .map(|comm| s.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}
