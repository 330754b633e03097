//! Two-sided Fisher's exact test for 2x2 contingency tables.

use statrs::distribution::{Discrete, Hypergeometric};

/// Relative tolerance when comparing hypergeometric masses.
///
/// Tables whose probability is within this factor of the observed
/// table's probability count as "at least as extreme", which keeps the
/// test stable against floating-point noise in the mass function.
const MASS_TOLERANCE: f64 = 1e-7;

/// Two-sided Fisher's exact test on a 2x2 contingency table.
///
/// The table is `[[a, b], [c, d]]`. Under the null hypothesis of
/// independence, cell `a` follows a hypergeometric distribution with the
/// table's margins fixed. The two-sided p-value sums the probability of
/// every table whose probability does not exceed that of the observed
/// table.
///
/// # Arguments
/// * `table` - Joint occurrence counts `[[n12, n1_2], [n2_1, n_12]]`
///
/// # Returns
/// The two-sided p-value, in `[0, 1]`.
pub fn fisher_exact(table: [[u64; 2]; 2]) -> f64 {
    let [[a, b], [c, d]] = table;

    let population = a + b + c + d;
    let successes = a + b;
    let draws = a + c;

    // Degenerate margins admit only one table
    if population == 0
        || successes == 0
        || draws == 0
        || successes == population
        || draws == population
    {
        return 1.0;
    }

    // Margins are validated above, so construction cannot fail
    let dist = Hypergeometric::new(population, successes, draws).unwrap();

    let k_min = draws.saturating_sub(population - successes);
    let k_max = draws.min(successes);

    let observed_mass = dist.pmf(a);
    let cutoff = observed_mass * (1.0 + MASS_TOLERANCE);

    let p: f64 = (k_min..=k_max)
        .map(|k| dist.pmf(k))
        .filter(|&mass| mass <= cutoff)
        .sum();

    p.min(1.0)
}
