//! Chunked, optionally parallel evaluation of a per-element kernel.

use super::config::BatchConfig;
use log::{trace, warn};
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluates `f(i)` for every `i < len`, in index order.
///
/// The index range is cut into chunks of at most
/// `config.chunk_len(element_bytes)` elements; each chunk runs on the rayon
/// pool when `config.parallel` is set and the chunk is long enough.
pub fn map_batch<O, F>(len: usize, element_bytes: usize, config: &BatchConfig, f: F) -> Vec<O>
where
    O: Send,
    F: Fn(usize) -> O + Sync + Send,
{
    let mut out = Vec::with_capacity(len);
    for range in chunks(len, config.chunk_len(element_bytes)) {
        trace!("map_batch chunk {:?}", range);
        run_chunk(range, config, &f, &mut out);
    }
    out
}

/// Like [`map_batch`] for fallible kernels.
///
/// A chunk is first evaluated fail-fast. If any element fails, the whole
/// chunk is evaluated again one element at a time so every index gets its own
/// result. Each index is retried at most once.
pub fn try_map_batch<O, E, F>(
    len: usize,
    element_bytes: usize,
    config: &BatchConfig,
    f: F,
) -> Vec<Result<O, E>>
where
    O: Send,
    E: Send,
    F: Fn(usize) -> Result<O, E> + Sync + Send,
{
    let mut out = Vec::with_capacity(len);
    for range in chunks(len, config.chunk_len(element_bytes)) {
        match run_chunk_fail_fast(range.clone(), config, &f) {
            Ok(values) => out.extend(values.into_iter().map(Ok)),
            Err(_) => {
                warn!(
                    "Batch chunk {:?} had a failing element; evaluating elements individually",
                    range
                );
                out.extend(range.map(&f));
            }
        }
    }
    out
}

fn chunks(len: usize, chunk_len: usize) -> impl Iterator<Item = Range<usize>> {
    (0..len)
        .step_by(chunk_len.max(1))
        .map(move |start| start..(start + chunk_len).min(len))
}

#[cfg(feature = "parallel")]
fn use_pool(range: &Range<usize>, config: &BatchConfig) -> bool {
    config.parallel && range.len() >= config.min_parallel_len
}

#[cfg(feature = "parallel")]
fn run_chunk<O, F>(range: Range<usize>, config: &BatchConfig, f: &F, out: &mut Vec<O>)
where
    O: Send,
    F: Fn(usize) -> O + Sync + Send,
{
    if use_pool(&range, config) {
        out.par_extend(range.into_par_iter().map(f));
    } else {
        out.extend(range.map(f));
    }
}

#[cfg(not(feature = "parallel"))]
fn run_chunk<O, F>(range: Range<usize>, _config: &BatchConfig, f: &F, out: &mut Vec<O>)
where
    F: Fn(usize) -> O,
{
    out.extend(range.map(f));
}

#[cfg(feature = "parallel")]
fn run_chunk_fail_fast<O, E, F>(range: Range<usize>, config: &BatchConfig, f: &F) -> Result<Vec<O>, E>
where
    O: Send,
    E: Send,
    F: Fn(usize) -> Result<O, E> + Sync + Send,
{
    if use_pool(&range, config) {
        range.into_par_iter().map(f).collect()
    } else {
        range.map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_chunk_fail_fast<O, E, F>(range: Range<usize>, _config: &BatchConfig, f: &F) -> Result<Vec<O>, E>
where
    F: Fn(usize) -> Result<O, E>,
{
    range.map(f).collect()
}
