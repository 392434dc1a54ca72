//! Nelder–Mead simplex minimizer.
//!
//! Used for the ARCH likelihood, where the parameter count is small (ω plus a
//! few α's) and gradients are awkward because of the backcast. Objective values
//! that are not finite are treated as +∞ so the simplex moves away from them.

/// Stopping rules for [`minimize`].
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    pub max_iters: usize,
    /// Stop when the spread of objective values across the simplex falls below this.
    pub f_tol: f64,
    /// Initial step along each coordinate axis.
    pub step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iters: 5_000,
            f_tol: 1e-10,
            step: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimplexResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub converged: bool,
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `f` starting from `x0`.
pub fn minimize(f: impl Fn(&[f64]) -> f64, x0: &[f64], opts: SimplexOptions) -> SimplexResult {
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let n = x0.len();
    if n == 0 {
        return SimplexResult {
            x: Vec::new(),
            value: eval(x0),
            converged: true,
        };
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((x0.to_vec(), eval(x0)));
    for i in 0..n {
        let mut x = x0.to_vec();
        x[i] += opts.step;
        let v = eval(&x);
        simplex.push((x, v));
    }

    let mut iters = 0;
    let mut converged = false;
    while iters < opts.max_iters {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = simplex[0].1;
        let worst = simplex[n].1;
        if best.is_finite() && (worst - best).abs() <= opts.f_tol * (1.0 + best.abs()) {
            converged = true;
            break;
        }
        iters += 1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
            .collect();
        let towards = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&simplex[n].0)
                .map(|(c, w)| c + coef * (c - w))
                .collect()
        };

        let reflected = towards(REFLECT);
        let f_reflected = eval(&reflected);

        if f_reflected < simplex[0].1 {
            let expanded = towards(EXPAND);
            let f_expanded = eval(&expanded);
            simplex[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
        } else if f_reflected < simplex[n - 1].1 {
            simplex[n] = (reflected, f_reflected);
        } else {
            // Outside contraction if the reflection helped at all, inside otherwise.
            let coef = if f_reflected < simplex[n].1 { CONTRACT } else { -CONTRACT };
            let contracted = towards(coef);
            let f_contracted = eval(&contracted);
            if f_contracted < simplex[n].1.min(f_reflected) {
                simplex[n] = (contracted, f_contracted);
            } else {
                let best_x = simplex[0].0.clone();
                for (x, v) in simplex.iter_mut().skip(1) {
                    for (xi, bi) in x.iter_mut().zip(&best_x) {
                        *xi = bi + SHRINK * (*xi - bi);
                    }
                    *v = eval(x.as_slice());
                }
            }
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (x, value) = simplex.swap_remove(0);
    SimplexResult {
        x,
        value,
        converged,
    }
}
