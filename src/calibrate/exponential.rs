use statrs::distribution::{ContinuousCDF, Exp};

use super::{ks_statistic, FamilyParams, FittedDistribution, SampleMoments, Sampler};

pub(super) fn fit(moments: &SampleMoments, sorted: &[f64]) -> Option<FittedDistribution> {
    let rate = 1.0 / moments.mean;
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }

    let cdf = match Exp::new(rate) {
        Ok(dist) => dist,
        Err(_) => return None,
    };
    let sampler = match rand_distr::Exp::new(rate) {
        Ok(dist) => dist,
        Err(_) => return None,
    };

    let ks = ks_statistic(sorted, |x| cdf.cdf(x));
    Some(FittedDistribution {
        params: FamilyParams::Exponential { rate },
        ks,
        sampler: Sampler::Exponential(sampler),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit_values(values: Vec<f64>) -> FittedDistribution {
        let moments = SampleMoments::of(&values);
        let mut sorted = values;
        sorted.sort_unstable_by(f64::total_cmp);
        fit(&moments, &sorted).expect("exponential should fit")
    }

    #[test]
    fn rate_is_inverse_mean() {
        let fitted = fit_values(vec![1.0, 2.0, 3.0, 4.0]);
        match fitted.params {
            FamilyParams::Exponential { rate } => assert!((rate - 0.4).abs() < 1e-12),
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn ks_matches_hand_computation() {
        // with rate 0.4 over [1, 2, 3, 4] the largest gap is at the first
        // point, where the empirical cdf is still zero
        let fitted = fit_values(vec![1.0, 2.0, 3.0, 4.0]);
        let expected = 1.0 - (-0.4_f64).exp();
        assert!((fitted.ks - expected).abs() < 1e-12);
    }

    #[test]
    fn constant_sample_still_fits() {
        let fitted = fit_values(vec![2.0, 2.0, 2.0]);
        match fitted.params {
            FamilyParams::Exponential { rate } => assert!((rate - 0.5).abs() < 1e-12),
            other => panic!("unexpected params {other:?}"),
        }
    }
}
