//! Per-feature standardization (zero mean, unit variance).

/// Fitted mean/std per feature column. Columns with zero variance keep a
/// std of 1 so transforming them is the identity minus the mean.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(samples: &[Vec<f64>]) -> Self {
        let dim = samples.first().map_or(0, Vec::len);
        let n = samples.len() as f64;

        let mut means = vec![0.0; dim];
        for sample in samples {
            for (acc, &v) in means.iter_mut().zip(sample) {
                *acc += v;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = vec![0.0; dim];
        for sample in samples {
            for ((acc, &v), &mean) in stds.iter_mut().zip(sample).zip(&means) {
                *acc += (v - mean).powi(2);
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
            if *std == 0.0 {
                *std = 1.0;
            }
        }

        Self { means, stds }
    }

    pub fn transform(&self, sample: &[f64]) -> Vec<f64> {
        sample
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(&v, (&mean, &std))| (v - mean) / std)
            .collect()
    }

    pub fn dim(&self) -> usize {
        self.means.len()
    }
}
