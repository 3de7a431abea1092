use glam::Vec3;

use super::FEATURES;

/// Number of entries in the packed triangle of an 11x11 symmetric matrix.
pub const TRI_ENTRIES: usize = FEATURES * (FEATURES + 1) / 2;

/// Pivots smaller than this fraction of the first pivot are treated as zero
/// and their features get dropped from the solution.
///
/// The threshold sits well above f32 cancellation noise of the elimination,
/// but well below the smallest pivot a genuinely independent feature produces
/// on real blocks.
const PIVOT_EPSILON: f32 = 1e-4;

/// Storage for a symmetric matrix; `get()` and `set()` address the logical
/// square matrix, leaving it up to the implementation whether the redundant
/// mirror half actually exists in memory.
pub trait SymMatrix {
    fn get(&self, row: usize, col: usize) -> f32;
    fn set(&mut self, row: usize, col: usize, value: f32);
}

/// Symmetric matrix packed into its upper triangle, row-major; this is the
/// storage the fitting kernel reduces across a workgroup, entry by entry.
#[derive(Clone, Copy)]
pub struct TriMatrix {
    entries: [f32; TRI_ENTRIES],
}

impl TriMatrix {
    pub fn zeroed() -> Self {
        Self {
            entries: [0.0; TRI_ENTRIES],
        }
    }

    pub fn entry(&self, idx: usize) -> f32 {
        self.entries[idx]
    }

    pub fn set_entry(&mut self, idx: usize, value: f32) {
        self.entries[idx] = value;
    }

    pub fn add_entry(&mut self, idx: usize, value: f32) {
        self.entries[idx] += value;
    }

    /// Maps logical coordinates onto the packed triangle; both mirror halves
    /// land on the same entry.
    pub fn entry_idx(row: usize, col: usize) -> usize {
        let (row, col) = if row <= col { (row, col) } else { (col, row) };

        row * FEATURES - row * (row + 1) / 2 + col
    }
}

impl SymMatrix for TriMatrix {
    fn get(&self, row: usize, col: usize) -> f32 {
        self.entries[Self::entry_idx(row, col)]
    }

    fn set(&mut self, row: usize, col: usize, value: f32) {
        self.entries[Self::entry_idx(row, col)] = value;
    }
}

/// Symmetric matrix stored in full; interchangeable with [`TriMatrix`], kept
/// around as the reference storage.
#[derive(Clone, Copy)]
pub struct FullMatrix {
    entries: [[f32; FEATURES]; FEATURES],
}

impl FullMatrix {
    pub fn zeroed() -> Self {
        Self {
            entries: [[0.0; FEATURES]; FEATURES],
        }
    }
}

impl SymMatrix for FullMatrix {
    fn get(&self, row: usize, col: usize) -> f32 {
        self.entries[row][col]
    }

    fn set(&mut self, row: usize, col: usize, value: f32) {
        self.entries[row][col] = value;
        self.entries[col][row] = value;
    }
}

/// Solves `A * x = b` in place for a symmetric positive semi-definite `A`,
/// with one right-hand side per color channel.
///
/// The factorization is an in-place LDL^T: after it, the matrix holds the
/// unit-triangular factor below the diagonal and the pivots on it. Pivots
/// that collapse to zero mean linearly dependent features (a flat wall has no
/// depth variation to regress against); such features are dropped by zeroing
/// their column, which makes the solution deterministic instead of dividing
/// by noise.
pub fn solve_normal_equations(
    matrix: &mut impl SymMatrix,
    rhs: &mut [Vec3; FEATURES],
) {
    let scale = matrix.get(0, 0).max(f32::MIN_POSITIVE);

    // Factorize, column by column
    let mut j = 0;

    while j < FEATURES {
        let mut d = matrix.get(j, j);
        let mut k = 0;

        while k < j {
            let l = matrix.get(j, k);

            d -= l * l * matrix.get(k, k);
            k += 1;
        }

        let d = if d <= scale * PIVOT_EPSILON { 0.0 } else { d };

        matrix.set(j, j, d);

        let mut i = j + 1;

        while i < FEATURES {
            let mut v = matrix.get(i, j);
            let mut k = 0;

            while k < j {
                v -= matrix.get(i, k) * matrix.get(j, k) * matrix.get(k, k);
                k += 1;
            }

            matrix.set(i, j, if d == 0.0 { 0.0 } else { v / d });
            i += 1;
        }

        j += 1;
    }

    // Forward-substitute through L
    let mut i = 0;

    while i < FEATURES {
        let mut z = rhs[i];
        let mut k = 0;

        while k < i {
            z -= rhs[k] * matrix.get(i, k);
            k += 1;
        }

        rhs[i] = z;
        i += 1;
    }

    // Scale by the pivots, dropping dead features
    let mut i = 0;

    while i < FEATURES {
        let d = matrix.get(i, i);

        rhs[i] = if d == 0.0 { Vec3::ZERO } else { rhs[i] / d };
        i += 1;
    }

    // Back-substitute through L^T
    let mut i = FEATURES;

    while i > 0 {
        i -= 1;

        let mut x = rhs[i];
        let mut k = i + 1;

        while k < FEATURES {
            x -= rhs[k] * matrix.get(k, i);
            k += 1;
        }

        rhs[i] = x;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec3;
    use rand::prelude::*;

    use super::*;

    fn build_system(
        matrix: &mut impl SymMatrix,
        rhs: &mut [Vec3; FEATURES],
        rows: &[[f32; FEATURES]],
        values: &[Vec3],
    ) {
        for (phi, value) in rows.iter().zip(values) {
            for i in 0..FEATURES {
                for j in i..FEATURES {
                    let sum = matrix.get(i, j) + phi[i] * phi[j];

                    matrix.set(i, j, sum);
                }

                rhs[i] += *value * phi[i];
            }
        }
    }

    fn random_rows(rng: &mut StdRng, n: usize) -> Vec<[f32; FEATURES]> {
        (0..n)
            .map(|_| {
                let mut phi = [0.0; FEATURES];

                phi[0] = 1.0;

                for f in phi.iter_mut().skip(1) {
                    *f = rng.gen_range(-1.0..1.0);
                }

                phi
            })
            .collect()
    }

    #[test]
    fn entry_idx_covers_the_triangle() {
        let mut seen = [false; TRI_ENTRIES];

        for i in 0..FEATURES {
            for j in i..FEATURES {
                let idx = TriMatrix::entry_idx(i, j);

                assert!(!seen[idx]);
                assert_eq!(idx, TriMatrix::entry_idx(j, i));

                seen[idx] = true;
            }
        }

        assert!(seen.iter().all(|seen| *seen));
    }

    #[test]
    fn storages_are_interchangeable() {
        let mut rng = StdRng::seed_from_u64(42);
        let rows = random_rows(&mut rng, 64);

        let values: Vec<_> = (0..rows.len())
            .map(|_| {
                Vec3::new(rng.gen(), rng.gen(), rng.gen())
            })
            .collect();

        let mut tri = TriMatrix::zeroed();
        let mut tri_rhs = [Vec3::ZERO; FEATURES];
        build_system(&mut tri, &mut tri_rhs, &rows, &values);

        let mut full = FullMatrix::zeroed();
        let mut full_rhs = [Vec3::ZERO; FEATURES];
        build_system(&mut full, &mut full_rhs, &rows, &values);

        solve_normal_equations(&mut tri, &mut tri_rhs);
        solve_normal_equations(&mut full, &mut full_rhs);

        for i in 0..FEATURES {
            assert_relative_eq!(
                tri_rhs[i].x,
                full_rhs[i].x,
                epsilon = 1e-5,
                max_relative = 1e-5
            );
            assert_relative_eq!(
                tri_rhs[i].y,
                full_rhs[i].y,
                epsilon = 1e-5,
                max_relative = 1e-5
            );
            assert_relative_eq!(
                tri_rhs[i].z,
                full_rhs[i].z,
                epsilon = 1e-5,
                max_relative = 1e-5
            );
        }
    }

    #[test]
    fn solves_a_known_linear_model() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = random_rows(&mut rng, 256);

        // y = 0.5 + 2*phi[1] - 3*phi[4]
        let values: Vec<_> = rows
            .iter()
            .map(|phi| Vec3::splat(0.5 + 2.0 * phi[1] - 3.0 * phi[4]))
            .collect();

        let mut matrix = FullMatrix::zeroed();
        let mut rhs = [Vec3::ZERO; FEATURES];
        build_system(&mut matrix, &mut rhs, &rows, &values);

        solve_normal_equations(&mut matrix, &mut rhs);

        assert_relative_eq!(0.5, rhs[0].x, epsilon = 1e-3);
        assert_relative_eq!(2.0, rhs[1].x, epsilon = 1e-3);
        assert_relative_eq!(-3.0, rhs[4].x, epsilon = 1e-3);

        for (i, coeff) in rhs.iter().enumerate() {
            if i != 0 && i != 1 && i != 4 {
                assert_relative_eq!(0.0, coeff.x, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn drops_linearly_dependent_features() {
        // Two features move in lockstep, so the normal equations are rank
        // deficient; the solver has to produce *a* valid least-squares answer
        // instead of NaNs
        let mut rng = StdRng::seed_from_u64(3);

        let rows: Vec<_> = random_rows(&mut rng, 64)
            .into_iter()
            .map(|mut phi| {
                phi[2] = phi[1];
                phi
            })
            .collect();

        let values: Vec<_> = rows
            .iter()
            .map(|phi| Vec3::splat(1.0 + phi[1]))
            .collect();

        let mut matrix = TriMatrix::zeroed();
        let mut rhs = [Vec3::ZERO; FEATURES];
        build_system(&mut matrix, &mut rhs, &rows, &values);

        solve_normal_equations(&mut matrix, &mut rhs);

        for (phi, value) in rows.iter().zip(&values) {
            let mut prediction = Vec3::ZERO;

            for i in 0..FEATURES {
                prediction += rhs[i] * phi[i];
            }

            assert!(prediction.is_finite());
            assert_relative_eq!(value.x, prediction.x, epsilon = 1e-3);
        }
    }

    #[test]
    fn constant_input_reproduces_the_constant() {
        let mut rng = StdRng::seed_from_u64(11);
        let rows = random_rows(&mut rng, 64);
        let values = vec![Vec3::splat(0.25); rows.len()];

        let mut matrix = TriMatrix::zeroed();
        let mut rhs = [Vec3::ZERO; FEATURES];
        build_system(&mut matrix, &mut rhs, &rows, &values);

        solve_normal_equations(&mut matrix, &mut rhs);

        for phi in &rows {
            let mut prediction = Vec3::ZERO;

            for i in 0..FEATURES {
                prediction += rhs[i] * phi[i];
            }

            assert_relative_eq!(0.25, prediction.x, epsilon = 1e-4);
        }
    }
}
