// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector math for the linear nearest-neighbour scan.

/// Cosine similarity `dot(a, b) / (|a| |b|)`.
///
/// Returns `None` when the lengths differ or either vector has zero norm,
/// so such chunks can be skipped instead of ranked with a bogus score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f32, 0.0_f32, 0.0_f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    sim.is_finite().then_some(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [3.0, 4.0, 0.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < f32::EPSILON);
    }

    #[test]
    fn magnitude_does_not_matter() {
        let sim = cosine_similarity(&[1.0, 1.0], &[10.0, 10.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_or_zero_vectors_are_unscored() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), None);
    }

    proptest! {
        #[test]
        fn similarity_is_bounded(
            a in proptest::collection::vec(-100.0f32..100.0, 4),
            b in proptest::collection::vec(-100.0f32..100.0, 4),
        ) {
            if let Some(sim) = cosine_similarity(&a, &b) {
                prop_assert!((-1.0001..=1.0001).contains(&sim));
            }
        }
    }
}
