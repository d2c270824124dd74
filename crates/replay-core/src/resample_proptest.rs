#[cfg(test)]
mod proptest_resample {
    use crate::resample::*;
    use proptest::prelude::*;

    fn config() -> ResampleConfig {
        ResampleConfig::default()
    }

    fn from_pairs(pairs: &[(f64, f64)]) -> Vec<Sample> {
        pairs.iter().map(|&(t, a)| Sample::new(t, a)).collect()
    }

    /// Strictly increasing timestamps built from positive gaps.
    fn accumulate(start: f64, gaps: &[f64], amps: &[f64]) -> Vec<Sample> {
        let mut t = start;
        gaps.iter()
            .zip(amps)
            .map(|(&gap, &a)| {
                let sample = Sample::new(t, a);
                t += gap;
                sample
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        // Property: a series already uniform at the grid step passes through
        // untouched.
        #[test]
        fn uniform_at_step_is_identity(amps in prop::collection::vec(-1.0f64..1.0, 2..50)) {
            let samples: Vec<Sample> = amps
                .iter()
                .enumerate()
                .map(|(i, &a)| Sample::new(i as f64 * 1e-3, a))
                .collect();
            let out = resample(&samples, &config()).unwrap();
            prop_assert_eq!(out.values(), &amps[..]);
        }

        // Property: every output value is one of the input values; the
        // aggregation never synthesizes data.
        #[test]
        fn output_values_come_from_input(
            mut pairs in prop::collection::vec((0.0f64..0.05, -1.0f64..1.0), 2..40),
        ) {
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
            let samples = from_pairs(&pairs);
            let out = resample(&samples, &config()).unwrap();
            let amps: Vec<f64> = samples.iter().map(|s| s.amps).collect();
            for value in out.values() {
                prop_assert!(amps.contains(value), "synthesized value {}", value);
            }
        }

        // Property: with strictly increasing timestamps no peak is lost, so
        // the global maximum survives, and the final sample always survives.
        #[test]
        fn peaks_and_tail_survive(
            start in 0.0f64..0.5,
            gaps in prop::collection::vec(1e-5f64..0.01, 2..40),
            seed in prop::collection::vec(-1.0f64..1.0, 2..40),
        ) {
            let len = gaps.len().min(seed.len());
            let samples = accumulate(start, &gaps[..len], &seed[..len]);
            let out = resample(&samples, &config()).unwrap();

            let max_in = samples.iter().map(|s| s.amps).fold(f64::NEG_INFINITY, f64::max);
            let max_out = out.values().iter().fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            prop_assert_eq!(max_in, max_out);
            prop_assert_eq!(out.values().last().copied(), Some(samples[len - 1].amps));
        }

        // Property: consecutive grid indices differ by one and map onto
        // timestamps k * step.
        #[test]
        fn grid_is_monotone_and_derived(
            mut pairs in prop::collection::vec((0.0f64..0.05, -1.0f64..1.0), 2..40),
        ) {
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
            let out = resample(&from_pairs(&pairs), &config()).unwrap();
            for (expected, point) in out.points().enumerate() {
                prop_assert_eq!(point.index, expected);
                prop_assert_eq!(out.timestamp(point.index), expected as f64 * out.step_s());
            }
        }

        // Property: a series with every gap at or above the step never
        // shrinks.
        #[test]
        fn wide_gaps_pass_through(
            start in 0.0f64..0.5,
            gaps in prop::collection::vec(2e-3f64..0.01, 2..40),
            seed in prop::collection::vec(-1.0f64..1.0, 2..40),
        ) {
            let len = gaps.len().min(seed.len());
            let samples = accumulate(start, &gaps[..len], &seed[..len]);
            let out = resample(&samples, &config()).unwrap();
            let amps: Vec<f64> = samples.iter().map(|s| s.amps).collect();
            prop_assert_eq!(out.values(), &amps[..]);
        }
    }
}
