// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scalar root finders over a bracketing interval.
//!
//! Both solvers expect `f(a)` and `f(b)` of opposite sign (or one of them
//! zero). Running out of iterations is not an error: the best available
//! estimate is returned with `converged == false`.

/// Outcome of a bracketed root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    /// Best estimate of the root.
    pub x: f64,
    /// Objective value at `x`.
    pub fx: f64,
    pub iterations: usize,
    /// Number of objective evaluations, including the two endpoints.
    pub evaluations: usize,
    pub converged: bool,
}

/// Halve `[a, b]` until its width is at most `tolerance`.
pub fn bisection<F>(mut f: F, mut a: f64, mut b: f64, tolerance: f64, max_iter: usize) -> RootEstimate
where
    F: FnMut(f64) -> f64,
{
    let mut fa = f(a);
    let fb = f(b);
    let mut evaluations = 2;

    if fa == 0.0 {
        return RootEstimate { x: a, fx: fa, iterations: 0, evaluations, converged: true };
    }
    if fb == 0.0 {
        return RootEstimate { x: b, fx: fb, iterations: 0, evaluations, converged: true };
    }

    for iteration in 1..=max_iter {
        let mid = 0.5 * (a + b);
        let fm = f(mid);
        evaluations += 1;

        if fm == 0.0 || (b - a).abs() <= tolerance {
            return RootEstimate { x: mid, fx: fm, iterations: iteration, evaluations, converged: true };
        }

        if fa * fm < 0.0 {
            b = mid;
        } else {
            a = mid;
            fa = fm;
        }
    }

    let mid = 0.5 * (a + b);
    let fm = f(mid);
    evaluations += 1;
    RootEstimate {
        x: mid,
        fx: fm,
        iterations: max_iter,
        evaluations,
        converged: (b - a).abs() <= tolerance,
    }
}

/// Brent's method: inverse quadratic interpolation or secant steps, guarded
/// by bisection whenever the interpolated point is not trustworthy.
pub fn brent<F>(mut f: F, mut a: f64, mut b: f64, tolerance: f64, max_iter: usize) -> RootEstimate
where
    F: FnMut(f64) -> f64,
{
    let mut fa = f(a);
    let mut fb = f(b);
    let mut evaluations = 2;

    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = c;
    let mut bisected = true;

    for iteration in 0..max_iter {
        if fb == 0.0 || (b - a).abs() <= tolerance {
            return RootEstimate { x: b, fx: fb, iterations: iteration, evaluations, converged: true };
        }

        let mut s = if fa != fc && fb != fc {
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            b - fb * (b - a) / (fb - fa)
        };

        let quarter = (3.0 * a + b) / 4.0;
        let outside = !((s > quarter.min(b)) && (s < quarter.max(b)));
        let slow_after_bisect = bisected && (s - b).abs() >= (b - c).abs() / 2.0;
        let slow_after_interp = !bisected && (s - b).abs() >= (c - d).abs() / 2.0;
        let tiny_after_bisect = bisected && (b - c).abs() < tolerance;
        let tiny_after_interp = !bisected && (c - d).abs() < tolerance;

        bisected = outside || slow_after_bisect || slow_after_interp || tiny_after_bisect || tiny_after_interp;
        if bisected {
            s = 0.5 * (a + b);
        }

        let fs = f(s);
        evaluations += 1;
        d = c;
        c = b;
        fc = fb;

        if fa * fs < 0.0 {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }

        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
    }

    RootEstimate {
        x: b,
        fx: fb,
        iterations: max_iter,
        evaluations,
        converged: fb == 0.0 || (b - a).abs() <= tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> f64 {
        (x + 3.0) * (x - 1.0).powi(2)
    }

    #[test]
    fn bisection_finds_sqrt_two() {
        let r = bisection(|x| x * x - 2.0, 0.0, 2.0, 1e-10, 100);
        assert!(r.converged);
        assert!((r.x - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn bisection_returns_best_midpoint_when_out_of_iterations() {
        let r = bisection(|x| x - 0.3, 0.0, 1.0, 1e-12, 3);
        assert!(!r.converged);
        assert_eq!(r.iterations, 3);
        assert!((r.x - 0.3).abs() < 0.125);
    }

    #[test]
    fn brent_finds_cubic_root() {
        // Classic Brent example: root at -3 inside [-4, 4/3].
        let r = brent(cubic, -4.0, 4.0 / 3.0, 1e-10, 100);
        assert!(r.converged);
        assert!((r.x + 3.0).abs() < 1e-8, "x = {}", r.x);
    }

    #[test]
    fn brent_uses_fewer_evaluations_than_bisection_on_smooth_functions() {
        let f = |x: f64| x.sin() - 0.5;
        let br = brent(f, 0.0, 1.5, 1e-10, 100);
        let bi = bisection(f, 0.0, 1.5, 1e-10, 100);
        assert!((br.x - std::f64::consts::FRAC_PI_6).abs() < 1e-9);
        assert!(br.evaluations < bi.evaluations);
    }

    #[test]
    fn endpoint_root_is_returned_immediately() {
        let r = bisection(|x| x, 0.0, 1.0, 1e-6, 10);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.evaluations, 2);
        let r = brent(|x| x - 1.0, 0.0, 1.0, 1e-6, 10);
        assert_eq!(r.x, 1.0);
    }
}
