use statrs::distribution::{ContinuousCDF, LogNormal};

use super::{ks_statistic, FamilyParams, FittedDistribution, SampleMoments, Sampler};

pub(super) fn fit(moments: &SampleMoments, sorted: &[f64]) -> Option<FittedDistribution> {
    let mu = moments.mean_ln;
    let sigma = moments.var_ln.sqrt();
    // a constant sample has zero spread in log space and no usable fit
    if !mu.is_finite() || !sigma.is_finite() || sigma <= 1e-12 {
        return None;
    }

    let cdf = match LogNormal::new(mu, sigma) {
        Ok(dist) => dist,
        Err(_) => return None,
    };
    let sampler = match rand_distr::LogNormal::new(mu, sigma) {
        Ok(dist) => dist,
        Err(_) => return None,
    };

    let ks = ks_statistic(sorted, |x| cdf.cdf(x));
    Some(FittedDistribution {
        params: FamilyParams::LogNormal { mu, sigma },
        ks,
        sampler: Sampler::LogNormal(sampler),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_come_from_log_moments() {
        let values: Vec<f64> = vec![1.0_f64.exp(), 2.0_f64.exp(), 3.0_f64.exp()];
        let moments = SampleMoments::of(&values);
        let mut sorted = values;
        sorted.sort_unstable_by(f64::total_cmp);
        let fitted = fit(&moments, &sorted).expect("log-normal should fit");

        match fitted.params {
            FamilyParams::LogNormal { mu, sigma } => {
                assert!((mu - 2.0).abs() < 1e-9);
                assert!((sigma - (2.0_f64 / 3.0).sqrt()).abs() < 1e-9);
            }
            other => panic!("unexpected params {other:?}"),
        }
        assert!(fitted.ks > 0.0 && fitted.ks < 1.0);
    }

    #[test]
    fn constant_sample_is_degenerate() {
        let values = vec![5.0, 5.0, 5.0, 5.0];
        let moments = SampleMoments::of(&values);
        assert!(fit(&moments, &values).is_none());
    }
}
