use statrs::distribution::{ContinuousCDF, Gamma};
use statrs::function::gamma::digamma;

use super::{ks_statistic, FamilyParams, FittedDistribution, SampleMoments, Sampler};

const TOLERANCE: f64 = 1e-10;
const MAX_BISECTIONS: usize = 200;

pub(super) fn fit(moments: &SampleMoments, sorted: &[f64]) -> Option<FittedDistribution> {
    // s = ln(mean) - mean(ln x) is zero only for a constant sample, where
    // the shape equation has no root
    let s = moments.mean.ln() - moments.mean_ln;
    if !s.is_finite() || s <= 1e-12 {
        return None;
    }

    let guess = (3.0 - s + ((s - 3.0) * (s - 3.0) + 24.0 * s).sqrt()) / (12.0 * s);
    let shape = solve_shape(s, guess)?;
    let scale = moments.mean / shape;
    if !shape.is_finite() || !scale.is_finite() || shape <= 0.0 || scale <= 0.0 {
        return None;
    }

    // statrs parameterizes gamma by rate, the samplers by scale
    let cdf = match Gamma::new(shape, 1.0 / scale) {
        Ok(dist) => dist,
        Err(_) => return None,
    };
    let sampler = match rand_distr::Gamma::new(shape, scale) {
        Ok(dist) => dist,
        Err(_) => return None,
    };

    let ks = ks_statistic(sorted, |x| cdf.cdf(x));
    Some(FittedDistribution {
        params: FamilyParams::Gamma { shape, scale },
        ks,
        sampler: Sampler::Gamma(sampler),
    })
}

// ln(k) - digamma(k) falls strictly as k grows, so the likelihood equation
// ln(k) - digamma(k) = s has one root and a sign bracket around it can be
// bisected safely.
fn solve_shape(s: f64, guess: f64) -> Option<f64> {
    let residual = |k: f64| k.ln() - digamma(k) - s;

    let mut lo = guess.max(1e-9);
    let mut steps = 0;
    while residual(lo) < 0.0 {
        lo /= 2.0;
        steps += 1;
        if steps > 200 || lo < 1e-300 {
            return None;
        }
    }
    let mut hi = lo.max(guess);
    steps = 0;
    while residual(hi) > 0.0 {
        hi *= 2.0;
        steps += 1;
        if steps > 200 || hi > 1e300 {
            return None;
        }
    }

    let mut mid = 0.5 * (lo + hi);
    for _ in 0..MAX_BISECTIONS {
        mid = 0.5 * (lo + hi);
        let value = residual(mid);
        if !value.is_finite() {
            return None;
        }
        if value.abs() < TOLERANCE || (hi - lo) < TOLERANCE * mid {
            return Some(mid);
        }
        if value > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit_values(values: Vec<f64>) -> FittedDistribution {
        let moments = SampleMoments::of(&values);
        let mut sorted = values;
        sorted.sort_unstable_by(f64::total_cmp);
        fit(&moments, &sorted).expect("gamma should fit")
    }

    #[test]
    fn shape_satisfies_the_likelihood_equation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let moments = SampleMoments::of(&values);
        let s = moments.mean.ln() - moments.mean_ln;
        let fitted = fit_values(values);

        match fitted.params {
            FamilyParams::Gamma { shape, scale } => {
                assert!((shape.ln() - digamma(shape) - s).abs() < 1e-6);
                // scale is tied to the mean by construction
                assert!((shape * scale - moments.mean).abs() < 1e-9);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn spread_out_sample_fits_with_small_shape() {
        let fitted = fit_values(vec![0.1, 0.2, 0.5, 1.0, 5.0, 20.0]);
        match fitted.params {
            FamilyParams::Gamma { shape, scale } => {
                assert!(shape > 0.0 && shape < 2.0);
                assert!(scale > 0.0);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn constant_sample_is_degenerate() {
        let values = vec![3.0, 3.0, 3.0];
        let moments = SampleMoments::of(&values);
        assert!(fit(&moments, &values).is_none());
    }
}
