//! Latent semantic analysis sentence ranking.
//!
//! Sentences are ranked by their weight across the topic space of the
//! term-by-sentence matrix. The right singular vectors and singular values of
//! that matrix are obtained from the eigen decomposition of its Gram matrix.

use std::collections::{HashMap, HashSet};

use rust_stemmers::{Algorithm, Stemmer};

const MIN_DIMENSIONS: usize = 3;
const SMOOTHING: f64 = 0.4;
const MAX_SWEEPS: usize = 100;
/// Longer documents are ranked on their leading sentences only.
pub const MAX_RANKED_SENTENCES: usize = 250;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself",
    "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "shouldn't", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "wasn't", "we", "were", "weren't", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "won't", "would", "wouldn't",
    "you", "your", "yours", "yourself", "yourselves",
];

pub struct LsaSummarizer {
    stemmer: Stemmer,
    stop_words: HashSet<&'static str>,
    reduction_ratio: f64,
}

impl LsaSummarizer {
    pub fn new(reduction_ratio: f64) -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words: STOP_WORDS.iter().copied().collect(),
            reduction_ratio,
        }
    }

    /// Indices of the `count` best sentences, in document order.
    /// Empty when no sentence carries a content word.
    pub fn select(&self, sentences: &[String], count: usize) -> Vec<usize> {
        let sentences = &sentences[..sentences.len().min(MAX_RANKED_SENTENCES)];
        let ranks = match self.rank(sentences) {
            Some(ranks) => ranks,
            None => return Vec::new(),
        };

        let mut order: Vec<usize> = (0..ranks.len()).collect();
        order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]));
        order.truncate(count);
        order.sort_unstable();
        order
    }

    /// Alphabetic, non stop-word tokens, stemmed.
    pub fn terms(&self, sentence: &str) -> Vec<String> {
        sentence
            .split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '-'))
            .map(|token| token.trim_matches(|c| c == '\'' || c == '-').to_lowercase())
            .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-'))
            .filter(|token| !self.stop_words.contains(token.as_str()))
            .map(|token| self.stemmer.stem(&token).into_owned())
            .collect()
    }

    /// Per-sentence salience, or `None` when the vocabulary is empty.
    pub fn rank(&self, sentences: &[String]) -> Option<Vec<f64>> {
        let columns: Vec<Vec<String>> = sentences.iter().map(|s| self.terms(s)).collect();

        let mut dictionary: HashMap<&str, usize> = HashMap::new();
        for term in columns.iter().flatten() {
            let next = dictionary.len();
            dictionary.entry(term.as_str()).or_insert(next);
        }
        if dictionary.is_empty() || sentences.is_empty() {
            return None;
        }

        let n = sentences.len();
        let mut matrix = vec![vec![0.0_f64; n]; dictionary.len()];
        for (col, terms) in columns.iter().enumerate() {
            for term in terms {
                matrix[dictionary[term.as_str()]][col] += 1.0;
            }
        }
        smooth_term_frequencies(&mut matrix, n);

        let gram = gram_matrix(&matrix, n);
        let (values, vectors) = symmetric_eigen(gram);

        let mut topics: Vec<usize> = (0..n).collect();
        topics.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
        let available = dictionary.len().min(n);
        let dimensions = MIN_DIMENSIONS.max((available as f64 * self.reduction_ratio) as usize);
        topics.truncate(dimensions.min(n));

        let ranks = (0..n)
            .map(|j| {
                topics
                    .iter()
                    .map(|&k| values[k].max(0.0) * vectors[j][k] * vectors[j][k])
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();
        Some(ranks)
    }
}

/// `0.4 + 0.6 * count / max_count` for every cell of a sentence column with any term.
fn smooth_term_frequencies(matrix: &mut [Vec<f64>], columns: usize) {
    for col in 0..columns {
        let max = matrix.iter().map(|row| row[col]).fold(0.0, f64::max);
        if max == 0.0 {
            continue;
        }
        for row in matrix.iter_mut() {
            row[col] = SMOOTHING + (1.0 - SMOOTHING) * row[col] / max;
        }
    }
}

/// `AᵀA` for a terms-by-sentences matrix `A`.
fn gram_matrix(matrix: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    let mut gram = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let dot: f64 = matrix.iter().map(|row| row[i] * row[j]).sum();
            gram[i][j] = dot;
            gram[j][i] = dot;
        }
    }
    gram
}

/// Cyclic Jacobi eigen decomposition of a symmetric matrix.
/// Returns the eigenvalues and a matrix whose columns are the eigenvectors.
pub fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v = vec![vec![0.0; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);
    for _ in 0..MAX_SWEEPS {
        let off_diagonal: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off_diagonal <= scale * 1e-24 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = if theta.abs() > 1e150 {
                    0.5 / theta
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let values = (0..n).map(|i| a[i][i]).collect();
    (values, v)
}
