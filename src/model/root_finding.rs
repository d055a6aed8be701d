/// Result of a bracketed root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootSearch {
    pub root: f64,
    pub iterations: u32,
    /// False when the iteration cap was hit before the bracket shrank below the tolerance
    pub converged: bool
}

/// # Illinois method
///
/// Regula falsi with the Illinois modification: when the same endpoint is kept
/// twice in a row its function value is halved, which keeps the bracket shrinking
/// from both sides.
///
/// `a` and `b` must bracket a sign change of `f`. Iteration stops when the bracket
/// is narrower than `tolerance` or after `max_iterations` steps, in which case the
/// endpoint with the smaller residual is returned and `converged` is false.
pub fn illinois<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, tolerance: f64, max_iterations: u32) -> RootSearch {
    let (mut a, mut b) = (a, b);
    let (mut fa, mut fb) = (f(a), f(b));

    if fa == 0.0 {
        return converged(a, 0);
    }
    if fb == 0.0 {
        return converged(b, 0);
    }

    let mut iterations = 0;
    while (b - a).abs() > tolerance {
        if iterations >= max_iterations || fb == fa {
            return stalled(a, fa, b, fb, iterations);
        }

        let c = a + (a - b) * fa / (fb - fa);
        let fc = f(c);
        iterations += 1;

        if fc == 0.0 {
            return converged(c, iterations);
        }

        if fc * fb < 0.0 {
            a = b;
            fa = fb;
        } else {
            fa /= 2.0;
        }

        b = c;
        fb = fc;
    }

    converged(a, iterations)
}

/// Plain bisection. Slower than [`illinois`] but immune to one-sided stalls.
pub fn bisection<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, tolerance: f64, max_iterations: u32) -> RootSearch {
    let (mut lo, mut hi) = (a, b);
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo == 0.0 {
        return converged(lo, 0);
    }
    if f_hi == 0.0 {
        return converged(hi, 0);
    }

    let mut iterations = 0;
    while (hi - lo).abs() > tolerance {
        if iterations >= max_iterations {
            return RootSearch {
                root: (lo + hi) / 2.0,
                iterations,
                converged: false
            };
        }

        let mid = (lo + hi) / 2.0;
        let f_mid = f(mid);
        iterations += 1;

        if f_mid == 0.0 {
            return converged(mid, iterations);
        }

        if f_mid * f_lo < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    converged((lo + hi) / 2.0, iterations)
}

fn converged(root: f64, iterations: u32) -> RootSearch {
    RootSearch {
        root,
        iterations,
        converged: true
    }
}

fn stalled(a: f64, fa: f64, b: f64, fb: f64, iterations: u32) -> RootSearch {
    let root = if fa.abs() <= fb.abs() { a } else { b };
    RootSearch {
        root,
        iterations,
        converged: false
    }
}
