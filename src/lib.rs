// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Astronomical Watch core
//!
//! A global clock anchored to the vernal equinox. Every day starts at the
//! mean solar noon of the 168°58′30″ W meridian (23:15:54 UTC) and is split
//! into 1000 *milidies*; *dies* counts those days since the equinox.
//!
//! # Pipeline
//!
//! ```text
//! UTC instant ──► TimeScales (JD UTC, ΔT, JD TT)
//!                    └─► SolarModel: VSOP87D L,B,R ─► apparent λ☉
//!                           └─► EquinoxFinder: λ☉(t) = 0 in March
//!                                  └─► EquinoxService (cache / internet / analytic / approx)
//!                                         └─► AstroYear::reading(t) ─► AstroReading (dies, milidies)
//! ```
//!
//! # Core types
//!
//! - [`Time<S>`] — instant parameterised by a [`TimeScale`] marker
//!   ([`JD`], [`TT`], [`UT`]).
//! - [`TimeScales`] — the UTC/TT Julian days and ΔT of one instant.
//! - [`SolarModel`] / [`MeeusSun`] — solar theories behind [`SolarLongitude`].
//! - [`EquinoxFinder`] — bracketed root finder for the March equinox.
//! - [`AstroYear`] / [`AstroReading`] — the dies/milidies frame.
//! - [`EquinoxCache`] — schema-versioned JSON cache of resolved equinoxes.
//! - [`EquinoxService`] — precision-tier orchestration over the above.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use astrowatch::{EquinoxCache, EquinoxService};
//!
//! let cache = Arc::new(EquinoxCache::in_dir("/tmp/astrowatch"));
//! let service = EquinoxService::new(cache);
//! let now = chrono::Utc::now();
//! let mut year = service.astro_year(now)?;
//! println!("{}", year.reading(now));
//! # Ok::<(), astrowatch::Error>(())
//! ```
//!
//! The crate logs through the [`log`] facade and never installs a logger.

pub mod cache;
pub mod clock;
pub mod config;
mod delta_t;
pub mod equinox;
mod error;
pub mod frame;
pub(crate) mod instant;
mod julian_date_ext;
pub mod net;
pub(crate) mod scales;
pub mod service;
pub mod solar;
mod timescales;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use cache::{CacheStats, EquinoxCache, EquinoxEntry, Precision};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use delta_t::delta_t_seconds;
pub use equinox::{
    angle_difference, compute_vernal_equinox, validate_equinox_solution, EquinoxFinder,
    SolveMethod, SolveStats, SolverOptions,
};
pub use error::{Error, Result, TierError};
pub use frame::{AstroReading, AstroYear};
pub use instant::{Time, TimeScale};
pub use net::{EquinoxSource, HttpEquinoxSource};
pub use scales::{JD, TT, UT};
pub use service::{EquinoxResult, EquinoxService, ServiceStatus, TierComparison};
pub use solar::{apparent_solar_longitude, CoefficientProvider, MeeusSun, SolarLongitude, SolarModel};
pub use timescales::{
    datetime_to_jd, decimal_year, parse_utc, time_scales, utc_to_tt, TimeScales, DAY_SECONDS,
};

// ── Type aliases ──────────────────────────────────────────────────────────

/// Julian Date on the TT axis.
///
/// This is a type alias for [`Time<JD>`].
pub type JulianDate = Time<JD>;

/// Universal Time — Earth-rotation civil time scale.
///
/// This is a type alias for [`Time<UT>`].
pub type UniversalTime = Time<UT>;
