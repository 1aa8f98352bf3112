use mcgt_core::rng::{derive_substream_seed, RngHandle};
use rand::RngCore;

#[test]
fn rng_emits_reproducible_sequence() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
}

#[test]
fn substreams_are_distinct_and_stable() {
    let a = derive_substream_seed(7, 0);
    let b = derive_substream_seed(7, 1);
    assert_ne!(a, b);
    assert_eq!(a, derive_substream_seed(7, 0));

    let mut left = RngHandle::substream(7, 1);
    let mut right = RngHandle::from_seed(b);
    assert_eq!(left.next_u64(), right.next_u64());
}

#[test]
fn unit_draws_stay_in_half_open_interval() {
    let mut rng = RngHandle::from_seed(99);
    let mut sum = 0.0;
    for _ in 0..10_000 {
        let u = rng.next_unit();
        assert!((0.0..1.0).contains(&u));
        sum += u;
    }
    let mean = sum / 10_000.0;
    assert!((mean - 0.5).abs() < 0.02, "mean {mean}");
}
