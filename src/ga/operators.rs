//! Generic recombination over ordered gene sequences.
//!
//! Operators here work on plain slices and know nothing about the meaning of
//! a gene. The timetable layer stores one gene per assignment key in a fixed
//! order, so positional crossover is well defined.
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

use rand::Rng;

/// Single-point crossover.
///
/// Draws a cut point `k` uniformly in `[0, n)`. The first child takes
/// `parent1[..k]` followed by `parent2[k..]`; the second child is the
/// complement. With `k == 0` the children are swapped copies of the parents.
///
/// Returns the children and the cut point.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn single_point_crossover<T: Clone, R: Rng>(
    parent1: &[T],
    parent2: &[T],
    rng: &mut R,
) -> (Vec<T>, Vec<T>, usize) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    let point = rng.random_range(0..n);
    let (child1, child2) = split_at_point(parent1, parent2, point);
    (child1, child2, point)
}

/// Builds the two children for a given cut point.
pub fn split_at_point<T: Clone>(parent1: &[T], parent2: &[T], point: usize) -> (Vec<T>, Vec<T>) {
    let mut child1 = Vec::with_capacity(parent1.len());
    let mut child2 = Vec::with_capacity(parent1.len());
    child1.extend_from_slice(&parent1[..point]);
    child1.extend_from_slice(&parent2[point..]);
    child2.extend_from_slice(&parent2[..point]);
    child2.extend_from_slice(&parent1[point..]);
    (child1, child2)
}
