//! Concurrent readers against a writing engine.
//!
//! Eight reader threads loop an exact search on a fixed query while one
//! writer appends batches. Every response must be internally consistent
//! (sorted results) and each reader must observe a non-decreasing store
//! size, since the engine's lock only ever exposes fully applied writes.

use lynx_core::{DistanceMetric, Engine, EngineConfig};
use std::sync::Arc;
use std::thread;

const DIM: usize = 8;

fn row(seed: usize) -> Vec<f32> {
    (0..DIM).map(|j| ((seed * 31 + j) as f32 * 0.17).sin()).collect()
}

#[test]
fn concurrent_readers_and_writer() {
    let mut config = EngineConfig::default();
    config.metric = DistanceMetric::L2;
    config.ivf.nlist = 4;
    config.ivf.nprobe = 4;
    config.snapshot.path = "unused.bin".into();

    let engine = Arc::new(Engine::new(&config).unwrap());
    engine
        .add_batch(&(0..16).map(row).collect::<Vec<_>>())
        .unwrap();

    let mut readers = Vec::new();
    for reader_id in 0..8 {
        let engine = Arc::clone(&engine);
        readers.push(thread::spawn(move || {
            let query = row(reader_id);
            let mut last_size = 0;

            for _ in 0..200 {
                let response = engine.bf_search(&query, 5).unwrap();

                for pair in response.results.windows(2) {
                    assert!(
                        pair[0].distance <= pair[1].distance,
                        "results out of order"
                    );
                }
                assert!(
                    response.index_size >= last_size,
                    "store size went backwards: {} -> {}",
                    last_size,
                    response.index_size
                );
                last_size = response.index_size;
            }
        }));
    }

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for wave in 0..50 {
                let batch: Vec<Vec<f32>> = (0..4).map(|i| row(1000 + wave * 4 + i)).collect();
                engine.add_batch(&batch).unwrap();
            }
        })
    };

    for reader in readers {
        reader.join().unwrap();
    }
    writer.join().unwrap();

    // All writes landed: 16 seeded + 50 waves of 4.
    assert_eq!(engine.info().size, 216);

    // Searches through both indexes still see a consistent snapshot.
    let final_bf = engine.bf_search(&row(3), 10).unwrap();
    let final_ivf = engine.ivf_search(&row(3), 10).unwrap();
    assert_eq!(final_bf.results.len(), 10);
    assert_eq!(final_ivf.index_size, 216);
}
