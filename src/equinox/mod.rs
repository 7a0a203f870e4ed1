// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Equinox Root Finder
//!
//! Solves `angle_difference(λ☉(t), 0) = 0` for the March crossing of a given
//! year. The objective is bracketed over March 18–22 (widened once to
//! March 16–24) and refined with bisection or Brent's method on Unix
//! seconds. A bracket-free coarse search is available as a degraded variant.
//!
//! Failing to converge within the iteration cap is not an error; callers
//! that need a guarantee check the result with
//! [`validate_equinox_solution`].

mod finder;
pub mod solver;

pub use finder::{
    angle_difference, compute_vernal_equinox, validate_equinox_solution, EquinoxFinder,
    SolveMethod, SolveStats, SolverOptions,
};
