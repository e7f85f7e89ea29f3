//! Per-vector statistics shared by every transform family.

/// A sanitized input vector plus the statistics the families need, computed
/// once so that iterating the catalog never rescans the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedVector {
    raw: Vec<f64>,
    residues: Vec<u8>,
    ranks: Vec<usize>,
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
}

impl PreparedVector {
    pub fn new(raw: &[f64]) -> Self {
        let raw: Vec<f64> = raw.iter().copied().map(neutral).collect();
        let residues = raw.iter().copied().map(residue).collect();

        let (min, max) = if raw.is_empty() {
            (0.0, 0.0)
        } else {
            raw.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };

        let n = raw.len() as f64;
        let (mean, std_dev) = if raw.is_empty() {
            (0.0, 0.0)
        } else {
            let mean = raw.iter().sum::<f64>() / n;
            let variance = raw.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            (neutral(mean), neutral(variance.sqrt()))
        };

        // Stable: equal values keep their original relative order.
        let mut by_value: Vec<usize> = (0..raw.len()).collect();
        by_value.sort_by(|&a, &b| raw[a].total_cmp(&raw[b]));
        let mut ranks = vec![0; raw.len()];
        for (rank, &index) in by_value.iter().enumerate() {
            ranks[index] = rank;
        }

        Self {
            raw,
            residues,
            ranks,
            min,
            max,
            mean,
            std_dev,
        }
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    /// `trunc(v) mod 256`, wrapping negatives.
    pub fn residues(&self) -> &[u8] {
        &self.residues
    }

    /// 0-based stable rank of each element.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// The input moved into non-negative territory (only when it has negatives).
    pub fn shifted(&self) -> Vec<f64> {
        if self.min < 0.0 {
            self.raw.iter().map(|v| v - self.min).collect()
        } else {
            self.raw.clone()
        }
    }

    /// Z-scores, or `None` when the vector has no spread.
    pub fn standardized(&self) -> Option<Vec<f64>> {
        (self.std_dev > 0.0).then(|| {
            self.raw
                .iter()
                .map(|v| neutral((v - self.mean) / self.std_dev))
                .collect()
        })
    }
}

/// Non-finite values become 0 so every family stays total.
pub(crate) fn neutral(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn residue(value: f64) -> u8 {
    value.trunc().rem_euclid(256.0) as u8
}
