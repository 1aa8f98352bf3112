use mcgt_core::derive_substream_seed;

/// Derives the seed for one proposal of `lane` (chain or walker) at `step`.
pub fn move_seed(master_seed: u64, lane: usize, step: usize, move_slot: usize) -> u64 {
    let intermediate = derive_substream_seed(master_seed, (lane as u64) << 32 | step as u64);
    derive_substream_seed(intermediate, move_slot as u64)
}

/// Seed used to draw the starting point of walker `walker`.
pub fn init_seed(master_seed: u64, walker: usize) -> u64 {
    derive_substream_seed(master_seed ^ 0xA5A5_A5A5_A5A5_A5A5, walker as u64)
}
