//! Cross-thread stress tests for the append-only store.

use std::collections::HashSet;
use std::thread;

use scree_core::StoreConfig;
use scree_store::BlockList;

#[test]
fn concurrent_appends_are_dense_and_unique() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 1000;

    let list = BlockList::<u64>::new();
    let indices: Vec<Vec<usize>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let list = &list;
                s.spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| list.append((t * PER_THREAD + i) as u64))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // The returned indices are exactly {0, ..., N-1}: no duplicates, no gaps.
    let all: HashSet<usize> = indices.iter().flatten().copied().collect();
    assert_eq!(list.len(), THREADS * PER_THREAD);
    assert_eq!(all.len(), THREADS * PER_THREAD);
    assert!(all.iter().all(|&i| i < THREADS * PER_THREAD));

    // Every value sits at the index its append returned.
    for (t, thread_indices) in indices.iter().enumerate() {
        for (i, &index) in thread_indices.iter().enumerate() {
            assert_eq!(*list.get(index), (t * PER_THREAD + i) as u64);
        }
    }

    // Iteration yields all N values with no omissions.
    let seen: HashSet<u64> = list.iter().copied().collect();
    assert_eq!(seen.len(), THREADS * PER_THREAD);
}

#[test]
fn growth_boundary_contention_allocates_each_block_once() {
    // 2-element first block: thousands of boundary crossings under load.
    let list = BlockList::<u32>::with_config(StoreConfig::with_block_bits(1)).unwrap();
    thread::scope(|s| {
        for _ in 0..8 {
            let list = &list;
            s.spawn(move || {
                for i in 0..2000u32 {
                    list.append(i);
                }
            });
        }
    });
    assert_eq!(list.len(), 16_000);
    // 16000 reservations with 2-element initial blocks need 13 blocks
    // (cumulative capacity 2 * (2^13 - 1) = 16382); a lost double-checked
    // re-check would overshoot this.
    assert_eq!(list.allocated_blocks(), 13);
    assert_eq!(list.capacity(), 16_382);
}

#[test]
fn reserve_then_set_partitions_the_index_space() {
    const THREADS: u64 = 4;
    const PER_THREAD: u64 = 500;

    let list = BlockList::<u64>::new();
    thread::scope(|s| {
        for t in 0..THREADS {
            let list = &list;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    let index = list.reserve();
                    list.set(index, t * 10_000 + i);
                }
            });
        }
    });

    assert_eq!(list.len(), (THREADS * PER_THREAD) as usize);
    let distinct: HashSet<u64> = list.iter().copied().collect();
    assert_eq!(
        distinct.len(),
        (THREADS * PER_THREAD) as usize,
        "every reserved slot was populated exactly once"
    );
}

#[test]
fn addresses_taken_early_survive_concurrent_growth() {
    let list = BlockList::<u64>::with_config(StoreConfig::with_block_bits(1)).unwrap();
    list.append(77);
    let before = list.get(0) as *const u64;

    thread::scope(|s| {
        for _ in 0..4 {
            let list = &list;
            s.spawn(move || {
                for i in 0..5000u64 {
                    list.append(i);
                }
            });
        }
    });

    assert_eq!(list.get(0) as *const u64, before);
    assert_eq!(*list.get(0), 77);
}
