use statrs::distribution::{ContinuousCDF, Weibull};

use super::{ks_statistic, FamilyParams, FittedDistribution, SampleMoments, Sampler};

const TOLERANCE: f64 = 1e-10;
const MAX_BISECTIONS: usize = 200;

pub(super) fn fit(moments: &SampleMoments, sorted: &[f64]) -> Option<FittedDistribution> {
    let sd_ln = moments.var_ln.sqrt();
    // a constant sample has no spread to pin the shape down
    if !sd_ln.is_finite() || sd_ln <= 1e-12 {
        return None;
    }

    // moment start: pi / sqrt(6) over the log standard deviation
    let guess = 1.2825 / sd_ln;
    let shape = solve_shape(sorted, moments.mean_ln, guess)?;
    let scale = scale_at(sorted, shape);
    if !shape.is_finite() || !scale.is_finite() || shape <= 0.0 || scale <= 0.0 {
        return None;
    }

    let cdf = match Weibull::new(shape, scale) {
        Ok(dist) => dist,
        Err(_) => return None,
    };
    // rand_distr takes scale before shape
    let sampler = match rand_distr::Weibull::new(scale, shape) {
        Ok(dist) => dist,
        Err(_) => return None,
    };

    let ks = ks_statistic(sorted, |x| cdf.cdf(x));
    Some(FittedDistribution {
        params: FamilyParams::Weibull { shape, scale },
        ks,
        sampler: Sampler::Weibull(sampler),
    })
}

// Profile likelihood equation for the shape,
//   sum(x^k ln x) / sum(x^k) - 1/k - mean(ln x) = 0,
// strictly increasing in k. Powers are taken relative to the sample maximum
// so the sums stay finite for any shape.
fn residual(values: &[f64], mean_ln: f64, k: f64) -> f64 {
    let max_ln = values[values.len() - 1].ln();
    let mut weight_sum = 0.0;
    let mut weighted_ln_sum = 0.0;
    for &x in values {
        let ln_x = x.ln();
        let weight = (k * (ln_x - max_ln)).exp();
        weight_sum += weight;
        weighted_ln_sum += weight * ln_x;
    }
    weighted_ln_sum / weight_sum - 1.0 / k - mean_ln
}

// Profile maximum-likelihood scale at a fixed shape, in log space:
// scale = (sum(x^k) / n)^(1/k).
fn scale_at(values: &[f64], k: f64) -> f64 {
    let max_ln = values[values.len() - 1].ln();
    let mut weight_sum = 0.0;
    for &x in values {
        weight_sum += (k * (x.ln() - max_ln)).exp();
    }
    (max_ln + (weight_sum / values.len() as f64).ln() / k).exp()
}

fn solve_shape(values: &[f64], mean_ln: f64, guess: f64) -> Option<f64> {
    let mut lo = guess.max(1e-9);
    let mut steps = 0;
    while residual(values, mean_ln, lo) > 0.0 {
        lo /= 2.0;
        steps += 1;
        if steps > 200 || lo < 1e-300 {
            return None;
        }
    }
    let mut hi = lo.max(guess);
    steps = 0;
    while residual(values, mean_ln, hi) < 0.0 {
        hi *= 2.0;
        steps += 1;
        if steps > 200 || hi > 1e300 {
            return None;
        }
    }

    let mut mid = 0.5 * (lo + hi);
    for _ in 0..MAX_BISECTIONS {
        mid = 0.5 * (lo + hi);
        let value = residual(values, mean_ln, mid);
        if !value.is_finite() {
            return None;
        }
        if value.abs() < TOLERANCE || (hi - lo) < TOLERANCE * mid {
            return Some(mid);
        }
        if value < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(mid)
}
