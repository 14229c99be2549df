// src/core/identity/similarity.rs
//! Normalised 0..=100 similarity between templates and between names.

use tracing::debug;

use super::types::Template;

/// Similarity between two templates.
///
/// Vector templates score `max(0, (1 - euclidean distance) * 100)`; digests
/// score 100 on equality and 0 otherwise. Absent templates, mixed families and
/// mismatched dimensions all score 0.
pub fn template_similarity(a: Option<&Template>, b: Option<&Template>) -> f64 {
    match (a, b) {
        (Some(Template::Vector(a)), Some(Template::Vector(b))) => vector_similarity(a, b),
        (Some(Template::Hash(a)), Some(Template::Hash(b))) => {
            if a == b {
                100.0
            } else {
                0.0
            }
        }
        (Some(_), Some(_)) => {
            debug!("Template families differ, treating as no similarity");
            0.0
        }
        _ => 0.0,
    }
}

pub fn vector_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let distance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();

    let similarity = (1.0 - distance) * 100.0;
    if similarity.is_nan() || similarity < 0.0 {
        0.0
    } else {
        similarity
    }
}

/// Levenshtein-based similarity over lowercased, trimmed names.
///
/// An empty name on either side scores 0, including two empty names.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 100.0;
    }

    let distance = edit_distance(&a, &b);
    let max_len = a.len().max(b.len());
    (max_len - distance) as f64 / max_len as f64 * 100.0
}

fn edit_distance(a: &[char], b: &[char]) -> usize {
    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a.len()][b.len()]
}
