// Weighted Distribution Sampler
//
// Maps uniform randoms in [0, 1) to skewed real values. Used to draw
// per-node channel deposits and target out-degrees so that a few rich,
// well-connected nodes coexist with many small ones.

use rand::rngs::StdRng;
use rand::Rng;

/// Tolerance for total-weight preservation checks after smoothing.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Errors rejected when constructing a distribution
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// No weighted values given
    Empty,

    /// A segment carries a negative weight
    NegativeWeight { weight: f64 },

    /// Upper bounds must be strictly increasing, starting above the minimum
    NonIncreasingBounds { lower: f64, upper: f64 },

    /// All weights are zero, nothing to sample from
    ZeroTotalWeight,
}

/// One contiguous slice of the sampling space: `weight` of the probability
/// mass maps linearly onto the value range `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    weight: f64,
    lower: f64,
    upper: f64,
}

/// A piecewise-linear weighted distribution.
///
/// Constructed from a minimum value and an ordered list of
/// `(upper_bound, weight)` pairs; segment `i` covers the value range from the
/// previous upper bound (or the minimum) up to `upper_bound_i`.
///
/// # Example
/// ```
/// use pcn_rust::pcn_distribution::WeightedDistribution;
///
/// let dist = WeightedDistribution::new(10.0, &[(100.0, 30.0), (1000.0, 20.0), (10000.0, 10.0)]).unwrap();
/// assert_eq!(dist.total_weight(), 60.0);
///
/// // u = 0 maps to the minimum value
/// assert_eq!(dist.sample(0.0), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDistribution {
    segments: Vec<Segment>,
    total_weight: f64,
}

impl WeightedDistribution {
    /// Build a distribution from `(upper_bound, weight)` pairs above `min`.
    pub fn new(min: f64, weighted_values: &[(f64, f64)]) -> Result<Self, DistributionError> {
        if weighted_values.is_empty() {
            return Err(DistributionError::Empty);
        }

        let mut segments = Vec::with_capacity(weighted_values.len());
        let mut lower = min;
        for &(upper, weight) in weighted_values {
            if weight < 0.0 {
                return Err(DistributionError::NegativeWeight { weight });
            }
            if upper <= lower {
                return Err(DistributionError::NonIncreasingBounds { lower, upper });
            }
            segments.push(Segment { weight, lower, upper });
            lower = upper;
        }

        let total_weight: f64 = segments.iter().map(|s| s.weight).sum();
        if total_weight <= 0.0 {
            return Err(DistributionError::ZeroTotalWeight);
        }

        Ok(Self {
            segments,
            total_weight,
        })
    }

    /// Total probability mass. Invariant under `smoothen`.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of segments (grows with smoothing).
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Map a uniform random `u` in `[0, 1)` to a value.
    ///
    /// Locates the segment containing `u * total_weight` by cumulative weight
    /// and interpolates linearly within its value range. Passing `u` outside
    /// `[0, 1)` is a contract violation: asserted in debug builds, clamped
    /// into range in release builds.
    pub fn sample(&self, u: f64) -> f64 {
        debug_assert!((0.0..1.0).contains(&u), "sample input {} outside [0, 1)", u);
        let u = u.clamp(0.0, 1.0 - f64::EPSILON);

        let mut scaled = u * self.total_weight;
        for segment in &self.segments {
            if segment.weight == 0.0 || scaled > segment.weight {
                scaled -= segment.weight;
                continue;
            }
            let part = scaled / segment.weight;
            return segment.lower + part * (segment.upper - segment.lower);
        }
        // float rounding pushed us past the last segment
        self.segments[self.segments.len() - 1].upper
    }

    /// Draw a value using the provided rng.
    pub fn sample_with(&self, rng: &mut StdRng) -> f64 {
        self.sample(rng.gen::<f64>())
    }

    /// Smoothen the distribution by bridging adjacent segments.
    ///
    /// Each pass replaces every neighbouring pair with three segments: the
    /// two originals squeezed to 75% of their weight and value range, plus a
    /// bridge spanning the boundary gap and carrying 25% of each neighbour's
    /// weight. Avoids sharp discontinuities at segment boundaries while
    /// keeping the total weight unchanged.
    pub fn smoothen(&mut self, passes: usize) {
        const CUT: f64 = 0.25;

        for _ in 0..passes {
            let mut i = 0;
            while i + 1 < self.segments.len() {
                let a = self.segments[i];
                let b = self.segments[i + 1];

                let bridge = Segment {
                    weight: a.weight * CUT + b.weight * CUT,
                    lower: a.lower + (a.upper - a.lower) * (1.0 - CUT),
                    upper: b.lower + (b.upper - b.lower) * CUT,
                };
                self.segments[i] = Segment {
                    weight: a.weight * (1.0 - CUT),
                    lower: a.lower,
                    upper: bridge.lower,
                };
                self.segments[i + 1] = Segment {
                    weight: b.weight * (1.0 - CUT),
                    lower: bridge.upper,
                    upper: b.upper,
                };
                self.segments.insert(i + 1, bridge);
                i += 2;
            }

            let sum: f64 = self.segments.iter().map(|s| s.weight).sum();
            debug_assert!(
                (sum - self.total_weight).abs() <= WEIGHT_EPSILON * self.total_weight,
                "total weight drifted: {} != {}",
                sum,
                self.total_weight
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn three_band() -> WeightedDistribution {
        WeightedDistribution::new(0.0, &[(50.0, 33.0), (200.0, 33.0), (400.0, 33.0)]).unwrap()
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            WeightedDistribution::new(0.0, &[]),
            Err(DistributionError::Empty)
        );
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = WeightedDistribution::new(0.0, &[(10.0, -1.0)]).unwrap_err();
        assert_eq!(err, DistributionError::NegativeWeight { weight: -1.0 });
    }

    #[test]
    fn test_rejects_non_increasing_bounds() {
        let err = WeightedDistribution::new(10.0, &[(100.0, 1.0), (100.0, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            DistributionError::NonIncreasingBounds {
                lower: 100.0,
                upper: 100.0
            }
        );
        // upper bound below the minimum
        assert!(WeightedDistribution::new(10.0, &[(5.0, 1.0)]).is_err());
    }

    #[test]
    fn test_rejects_zero_total_weight() {
        let err = WeightedDistribution::new(0.0, &[(10.0, 0.0), (20.0, 0.0)]).unwrap_err();
        assert_eq!(err, DistributionError::ZeroTotalWeight);
    }

    #[test]
    fn test_sample_interpolates() {
        let dist = three_band();
        assert_eq!(dist.sample(0.0), 0.0);
        // u = 0.5 lands halfway into the second band: 50 + 0.5 * 150
        assert!((dist.sample(0.5) - 125.0).abs() < 1e-6);
        // u -> 1 approaches the upper bound
        assert!(dist.sample(0.999999) < 400.0);
        assert!(dist.sample(0.999999) > 399.0);
    }

    #[test]
    fn test_sample_segment_boundaries() {
        let dist = three_band();
        // exactly one third of the mass ends band one
        let v = dist.sample(1.0 / 3.0);
        assert!((v - 50.0).abs() < 1e-6, "boundary value was {}", v);
    }

    #[test]
    fn test_smoothen_preserves_total_weight() {
        for passes in [0, 1, 2, 10] {
            let mut dist = three_band();
            let before = dist.total_weight();
            dist.smoothen(passes);
            let after: f64 = (0..dist.num_segments())
                .map(|i| dist.segments[i].weight)
                .sum();
            assert!(
                (after - before).abs() <= 1e-9 * before,
                "weight drifted after {} passes: {} != {}",
                passes,
                after,
                before
            );
        }
    }

    #[test]
    fn test_smoothen_grows_segments() {
        let mut dist = three_band();
        assert_eq!(dist.num_segments(), 3);
        dist.smoothen(1);
        assert_eq!(dist.num_segments(), 5);
    }

    #[test]
    fn test_smoothen_keeps_value_bounds() {
        let mut dist = three_band();
        dist.smoothen(10);
        assert_eq!(dist.segments.first().unwrap().lower, 0.0);
        assert_eq!(dist.segments.last().unwrap().upper, 400.0);
        // segments stay ordered and non-overlapping
        for pair in dist.segments.windows(2) {
            assert!(pair[0].upper <= pair[1].lower + 1e-9);
        }
    }

    #[test]
    fn test_sample_with_rng_stays_in_range() {
        let mut rng = StdRng::from_seed([0u8; 32]);
        let mut dist =
            WeightedDistribution::new(10.0, &[(100.0, 30.0), (1000.0, 20.0), (10000.0, 10.0)])
                .unwrap();
        dist.smoothen(10);
        for _ in 0..1000 {
            let v = dist.sample_with(&mut rng);
            assert!((10.0..10000.0).contains(&v), "sample {} out of range", v);
        }
    }
}
