use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic generator for the named stream `name` under `seed`.
///
/// The derivation depends only on its inputs, so the same stream comes back
/// regardless of how many other streams were created before it.
pub fn seeded(seed: u64, name: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(seed, name))
}

fn derive_seed(seed: u64, name: &str) -> u64 {
    let mut mixed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    for byte in name.bytes() {
        mixed ^= byte as u64;
        mixed = mixed.wrapping_mul(0x100000001b3);
    }
    mixed
}
