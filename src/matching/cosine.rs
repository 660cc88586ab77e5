/// Cosine similarity of two dense vectors, clamped to `[-1, 1]`.
///
/// Returns 0 when either vector has zero norm or the lengths differ.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a * norm_b);
    if sim.is_nan() { 0.0 } else { sim.clamp(-1.0, 1.0) }
}

/// Scores `query` against every row, in row order.
pub fn cosine_scores<'a, I>(query: &[f32], rows: I) -> Vec<f32>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    rows.into_iter()
        .map(|row| cosine_similarity(query, row))
        .collect()
}
