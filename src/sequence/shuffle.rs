//! The pinned random stream behind every shuffle.
//!
//! - generator: ChaCha8 (`rand_chacha`), `seed_from_u64(seed)`
//! - index: Fisher–Yates from the back; for `i` in `n-1..=1`,
//!   `j = (next_u64 * (i + 1)) >> 64` (128-bit product), then swap `i` and `j`
//! - `shuffle-groups` draws from one stream, shuffling a group's children
//!   before descending into them, depth first
//!
//! Changing any of these changes every seeded ordering.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::playlist::{Group, Grouplike, Occurrence, Pick};

pub(super) fn stream(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform index in `0..bound` by multiply-shift.
fn index_below(rng: &mut impl RngCore, bound: usize) -> usize {
    ((u128::from(rng.next_u64()) * bound as u128) >> 64) as usize
}

pub(super) fn fisher_yates<T>(items: &mut [T], rng: &mut impl RngCore) {
    for i in (1..items.len()).rev() {
        let j = index_below(rng, i + 1);
        items.swap(i, j);
    }
}

pub(super) fn shuffle_groups(tree: &Group, rng: &mut impl RngCore) -> Vec<Pick> {
    let mut out = Vec::new();
    walk(tree, &Occurrence::root(), rng, &mut out);
    out
}

fn walk(group: &Group, at: &Occurrence, rng: &mut impl RngCore, out: &mut Vec<Pick>) {
    let mut order: Vec<usize> = (0..group.items.len()).collect();
    let all_groups = group
        .items
        .iter()
        .all(|item| matches!(item, Grouplike::Group(_)));
    if all_groups {
        fisher_yates(&mut order, rng);
    }

    for i in order {
        match &group.items[i] {
            Grouplike::Group(child) => walk(child, &at.child(i), rng, out),
            Grouplike::Track(track) => out.push(Pick {
                occurrence: at.child(i),
                track: track.clone(),
            }),
        }
    }
}

/// Seed for the next pass of `loop-regenerate`.
pub fn derive_seed(seed: u64) -> u64 {
    stream(seed).next_u64()
}

/// Fresh seed for runs that did not configure one.
pub fn random_seed() -> u64 {
    rand::random()
}
