//! Distribution sampling on top of [`RngManager`].
//!
//! The daily compartment flows are binomial draws over pools that range from
//! a handful of individuals up to an entire population, so a naive per-trial
//! sampler is unusable. The draws here switch between an exact per-trial
//! count, a Poisson approximation, and a Gaussian approximation depending on
//! the regime, keeping every draw O(1)-ish regardless of pool size while
//! staying within the source pool.
//!
//! All samplers consume randomness exclusively from the owning
//! [`RngManager`], so simulation runs stay reproducible per seed.

use super::RngManager;

/// Binomial draws switch to a Poisson approximation at or below this
/// success probability.
const POISSON_APPROX_CUTOFF: f64 = 0.1;

/// The Gaussian approximation applies when std dev <= mean * this factor.
const GAUSSIAN_APPROX_CUTOFF: f64 = 0.5;

/// Knuth's product-of-uniforms Poisson sampler is O(rate); above this rate
/// the acceptance-rejection sampler takes over.
const POISSON_DIRECT_LIMIT: f64 = 30.0;

impl RngManager {
    /// Sample from the standard normal distribution (Box-Muller transform).
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Sample from a Poisson distribution with the given rate.
    ///
    /// Rates up to [`POISSON_DIRECT_LIMIT`] use Knuth's product-of-uniforms
    /// method; larger rates use acceptance-rejection, which needs only a few
    /// iterations per draw independent of the rate.
    pub fn poisson(&mut self, rate: f64) -> u64 {
        if rate <= 0.0 {
            return 0;
        }

        if rate > POISSON_DIRECT_LIMIT {
            // Acceptance-rejection for large rates.
            let c = 0.767 - 3.36 / rate;
            let beta = std::f64::consts::PI / (3.0 * rate).sqrt();
            let alpha = beta * rate;
            let k = c.ln() - rate - beta.ln();

            loop {
                let u = self.next_f64();
                if u <= 0.0 {
                    continue;
                }
                let x = (alpha - ((1.0 - u) / u).ln()) / beta;
                let n = (x + 0.5).floor();
                if n < 0.0 {
                    continue;
                }
                let v = self.next_f64();
                if v <= 0.0 {
                    continue;
                }
                let y = alpha - beta * x;
                let denom = 1.0 + y.exp();
                let lhs = y + (v / (denom * denom)).ln();
                let rhs = k + n * rate.ln() - ln_factorial(n);
                if lhs <= rhs {
                    return n as u64;
                }
            }
        } else {
            // Knuth: count uniform factors until the product drops below e^-rate.
            let limit = (-rate).exp();
            let mut count: u64 = 0;
            let mut product = 1.0;
            loop {
                product *= self.next_f64();
                if product <= limit {
                    return count;
                }
                count += 1;
            }
        }
    }

    /// Sample the number of successes in `n` independent trials with
    /// per-trial success probability `p`.
    ///
    /// The result is always in `[0, n]`. Approximation regimes:
    /// - `p <= 0.1`: Poisson with rate `n * p` (overshoots past `n` are
    ///   redrawn; at this cutoff they are vanishingly rare)
    /// - narrow spread (std <= 0.5 * mean): Gaussian, truncated to `[0, n]`
    /// - otherwise: exact per-trial count (the two conditions above bound
    ///   `n` below ~40 here, so this stays cheap)
    ///
    /// Probabilities above 0.5 are drawn through the complement so the
    /// approximations only ever see their accurate regime.
    pub fn binomial(&mut self, n: u64, p: f64) -> u64 {
        if n == 0 || p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        if p > 0.5 {
            return n - self.binomial(n, 1.0 - p);
        }

        let nf = n as f64;
        let mean = nf * p;
        let std_dev = (nf * p * (1.0 - p)).sqrt();

        if p <= POISSON_APPROX_CUTOFF {
            loop {
                let draw = self.poisson(mean);
                if draw <= n {
                    return draw;
                }
            }
        } else if std_dev <= GAUSSIAN_APPROX_CUTOFF * mean {
            loop {
                let draw = mean + std_dev * self.standard_normal();
                if draw >= 0.0 && draw <= nf {
                    return draw as u64;
                }
            }
        } else {
            let mut successes = 0;
            for _ in 0..n {
                if self.next_f64() < p {
                    successes += 1;
                }
            }
            successes
        }
    }

    /// Sample two competing outcomes from one pool of `n` individuals.
    ///
    /// Draws the combined event count first, then splits it, so the pair
    /// always satisfies `first + second <= n`. This is how a compartment
    /// with two exits (recover or worsen, recover or die) is drawn without
    /// ever overcommitting its population.
    ///
    /// # Panics
    /// Panics if either probability is negative or their sum exceeds 1.
    pub fn split_binomial(&mut self, n: u64, p_first: f64, p_second: f64) -> (u64, u64) {
        assert!(
            p_first >= 0.0 && p_second >= 0.0,
            "split probabilities must be nonnegative"
        );
        assert!(
            p_first + p_second <= 1.0,
            "combined split probability exceeds 1"
        );

        let combined = p_first + p_second;
        if n == 0 || combined <= 0.0 {
            return (0, 0);
        }

        let total = self.binomial(n, combined);
        let first = self.binomial(total, p_first / combined);
        (first, total - first)
    }
}

/// Natural log of n! for integer-valued n.
///
/// Exact summation below 10; Stirling's series with two correction terms
/// above, which is accurate to ~1e-9 in the range the Poisson sampler uses.
fn ln_factorial(n: f64) -> f64 {
    debug_assert!(n >= 0.0);
    if n < 10.0 {
        let mut acc = 0.0;
        let mut k = 2.0;
        while k <= n {
            acc += k.ln();
            k += 1.0;
        }
        acc
    } else {
        let inv = 1.0 / n;
        let inv3 = inv * inv * inv;
        n * n.ln() - n + 0.5 * (2.0 * std::f64::consts::PI * n).ln() + inv / 12.0 - inv3 / 360.0
    }
}
