use opflow::partition::{Partition, PARALLEL_BLOCK_SHIFT};

/// Reconstructs the element ranges a plan produces and checks they tile
/// `[0, n)` exactly: no gap, no overlap, nothing past the end.
fn assert_exact_coverage(n: usize, cores: usize) {
    let plan = Partition::plan(n, cores);
    plan.verify(n).unwrap();

    let mut next_start = 0;
    for task in 0..plan.task_count {
        let start = task * plan.chunk_size;
        let end = start + plan.chunk_size;
        assert_eq!(start, next_start, "gap or overlap before task {task} (n={n}, cores={cores})");
        next_start = end;
    }
    assert_eq!(next_start, plan.tail_start());
    assert_eq!(next_start + plan.remainder, n, "tail does not close the range");
}

#[test]
fn test_coverage_across_sizes_and_cores() {
    for n in [1, 255, 256, 257, 1000, 1_000_003] {
        for cores in [1, 2, 4, 8] {
            assert_exact_coverage(n, cores);
        }
    }
}

#[test]
fn test_small_inputs_never_parallelize() {
    // block = max(1, n >> 8) = 1 for anything under 256 elements.
    for n in [1, 10, 100, 255] {
        for cores in [1, 2, 8, 16] {
            let plan = Partition::plan(n, cores);
            assert_eq!(plan.task_count, 1, "n={n}, cores={cores}");
            assert_eq!(plan.chunk_size, n);
            assert_eq!(plan.remainder, 0);
        }
    }
}

#[test]
fn test_parallelism_starts_at_block_granularity() {
    assert_eq!(1 << PARALLEL_BLOCK_SHIFT, 256);

    // 256 elements allow one task; 512 allow two.
    assert_eq!(Partition::plan(256, 8).task_count, 1);
    assert_eq!(Partition::plan(512, 8).task_count, 2);
    // Cores cap the task count even when the block heuristic allows more.
    assert_eq!(Partition::plan(1_000_000, 4).task_count, 4);
}

#[test]
fn test_remainder_worked_example() {
    // 1000 >> 8 = 3, so three tasks of 333 elements cover [0, 999) and the
    // tail handles [999, 1000).
    let plan = Partition::plan(1000, 3);
    assert_eq!(plan.task_count, 3);
    assert_eq!(plan.chunk_size, 333);
    assert_eq!(plan.remainder, 1);
    assert_eq!(plan.tail_start(), 999);
}

#[test]
fn test_large_prime_element_count() {
    let plan = Partition::plan(1_000_003, 8);
    assert_eq!(plan.task_count, 8);
    assert_eq!(plan.chunk_size, 125_000);
    assert_eq!(plan.remainder, 3);
}

#[test]
fn test_plan_is_deterministic() {
    for n in [1, 257, 1000, 1_000_003] {
        for cores in [1, 3, 8] {
            assert_eq!(Partition::plan(n, cores), Partition::plan(n, cores));
        }
    }
}

#[test]
fn test_verify_rejects_bad_accounting() {
    let bad = Partition { task_count: 3, chunk_size: 333, remainder: 0 };
    assert!(matches!(bad.verify(1000), Err(opflow::Error::PartitionInvariant { .. })));

    let bad = Partition { task_count: 0, chunk_size: 1, remainder: 0 };
    assert!(bad.verify(1).is_err());
}
