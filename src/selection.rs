//! Image Selector
//!
//! The pool is sorted first so the same directory always yields the same
//! pool; the sample drawn from it is random.

use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;

use crate::pipeline::MosaicError;

pub fn select<R: Rng + ?Sized>(
    candidates: &[PathBuf],
    count: usize,
    rng: &mut R,
) -> Result<Vec<PathBuf>, MosaicError> {
    let mut pool = candidates.to_vec();
    pool.sort();
    pool.dedup();

    if pool.len() < count {
        return Err(MosaicError::InsufficientInput {
            found: pool.len(),
            required: count,
        });
    }

    pool.shuffle(rng);
    pool.truncate(count);
    Ok(pool)
}

/// Select with the unseeded thread-local generator
pub fn select_random(candidates: &[PathBuf], count: usize) -> Result<Vec<PathBuf>, MosaicError> {
    select(candidates, count, &mut rand::thread_rng())
}
