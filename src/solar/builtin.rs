// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Built-in truncated VSOP87D Earth table.
//!
//! Leading terms of Meeus, *Astronomical Algorithms* (2nd ed.), Appendix III.
//! Amplitudes in 1e-8 rad / 1e-8 AU, frequencies in rad per Julian millennium.

use std::borrow::Cow;

use super::series::{CoefficientSet, Term};

/// Conservative longitude error bound of the built-in table, in arcseconds.
pub const BUILTIN_ERROR_BOUND_ARCSEC: f64 = 10.0;

#[rustfmt::skip]
static L0: [Term; 30] = [
    (175_347_046.0, 0.0, 0.0),
    (3_341_656.0, 4.669_256_8, 6_283.075_85),
    (34_894.0, 4.6261, 12_566.1517),
    (3_497.0, 2.7441, 5_753.3849),
    (3_418.0, 2.8289, 3.5231),
    (3_136.0, 3.6277, 77_713.7715),
    (2_676.0, 4.4181, 7_860.4194),
    (2_343.0, 6.1352, 3_930.2097),
    (1_324.0, 0.7425, 11_506.7698),
    (1_273.0, 2.0371, 529.6910),
    (1_199.0, 1.1096, 1_577.3435),
    (990.0, 5.233, 5_884.927),
    (902.0, 2.045, 26.298),
    (857.0, 3.508, 398.149),
    (780.0, 1.179, 5_223.694),
    (753.0, 2.533, 5_507.553),
    (505.0, 4.583, 18_849.228),
    (492.0, 4.205, 775.523),
    (357.0, 2.920, 0.067),
    (317.0, 5.849, 11_790.629),
    (284.0, 1.899, 796.298),
    (271.0, 0.315, 10_977.079),
    (243.0, 0.345, 5_486.778),
    (206.0, 4.806, 2_544.314),
    (205.0, 1.869, 5_573.143),
    (202.0, 2.458, 6_069.777),
    (156.0, 0.833, 213.299),
    (132.0, 3.411, 2_942.463),
    (126.0, 1.083, 20.775),
    (115.0, 0.645, 0.980),
];

#[rustfmt::skip]
static L1: [Term; 10] = [
    (628_331_966_747.0, 0.0, 0.0),
    (206_059.0, 2.678_235, 6_283.075_85),
    (4_303.0, 2.6351, 12_566.1517),
    (425.0, 1.590, 3.523),
    (119.0, 5.796, 26.298),
    (109.0, 2.966, 1_577.344),
    (93.0, 2.59, 18_849.23),
    (72.0, 1.14, 529.69),
    (68.0, 1.87, 398.15),
    (67.0, 4.41, 5_507.55),
];

#[rustfmt::skip]
static L2: [Term; 10] = [
    (52_919.0, 0.0, 0.0),
    (8_720.0, 1.0721, 6_283.0758),
    (309.0, 0.867, 12_566.152),
    (27.0, 0.05, 3.52),
    (16.0, 5.19, 26.30),
    (16.0, 3.68, 155.42),
    (10.0, 0.76, 18_849.23),
    (9.0, 2.06, 77_713.77),
    (7.0, 0.83, 775.52),
    (5.0, 4.66, 1_577.34),
];

#[rustfmt::skip]
static L3: [Term; 7] = [
    (289.0, 5.844, 6_283.076),
    (35.0, 0.0, 0.0),
    (17.0, 5.49, 12_566.15),
    (3.0, 5.20, 155.42),
    (1.0, 4.72, 3.52),
    (1.0, 5.30, 18_849.23),
    (1.0, 5.97, 242.73),
];

#[rustfmt::skip]
static L4: [Term; 3] = [
    (114.0, 3.142, 0.0),
    (8.0, 4.13, 6_283.08),
    (1.0, 3.84, 12_566.15),
];

static L5: [Term; 1] = [(1.0, 3.14, 0.0)];

#[rustfmt::skip]
static B0: [Term; 5] = [
    (280.0, 3.199, 84_334.662),
    (102.0, 5.422, 5_507.553),
    (80.0, 3.88, 5_223.69),
    (44.0, 3.70, 2_352.87),
    (32.0, 4.00, 1_577.34),
];

static B1: [Term; 2] = [(9.0, 3.90, 5_507.55), (6.0, 1.73, 5_223.69)];

#[rustfmt::skip]
static R0: [Term; 20] = [
    (100_013_989.0, 0.0, 0.0),
    (1_670_700.0, 3.098_463_5, 6_283.075_85),
    (13_956.0, 3.055_25, 12_566.1517),
    (3_084.0, 5.1985, 77_713.7715),
    (1_628.0, 1.1739, 5_753.3849),
    (1_576.0, 2.8469, 7_860.4194),
    (925.0, 5.453, 11_506.770),
    (542.0, 4.564, 3_930.210),
    (472.0, 3.661, 5_884.927),
    (346.0, 0.964, 5_507.553),
    (329.0, 5.900, 5_223.694),
    (307.0, 0.299, 5_573.143),
    (243.0, 4.273, 11_790.629),
    (212.0, 5.847, 1_577.344),
    (186.0, 5.022, 10_977.079),
    (175.0, 3.012, 18_849.228),
    (110.0, 5.055, 5_486.778),
    (98.0, 0.89, 6_069.78),
    (86.0, 5.69, 15_720.84),
    (86.0, 1.27, 161_000.69),
];

#[rustfmt::skip]
static R1: [Term; 10] = [
    (103_019.0, 1.107_490, 6_283.075_850),
    (1_721.0, 1.0644, 12_566.1517),
    (702.0, 3.142, 0.0),
    (32.0, 1.02, 18_849.23),
    (31.0, 2.84, 5_507.55),
    (25.0, 1.32, 5_223.69),
    (18.0, 1.42, 1_577.34),
    (10.0, 5.91, 10_977.08),
    (9.0, 1.42, 6_275.96),
    (9.0, 0.27, 5_486.78),
];

#[rustfmt::skip]
static R2: [Term; 6] = [
    (4_359.0, 5.7846, 6_283.0758),
    (124.0, 5.579, 12_566.152),
    (12.0, 3.14, 0.0),
    (9.0, 3.63, 77_713.77),
    (6.0, 1.87, 5_573.14),
    (3.0, 5.47, 18_849.23),
];

static R3: [Term; 2] = [(145.0, 4.273, 6_283.076), (7.0, 3.92, 12_566.15)];

static R4: [Term; 1] = [(4.0, 2.56, 6_283.08)];

/// The built-in table as a [`CoefficientSet`] borrowing static data.
pub fn builtin_coefficients() -> CoefficientSet {
    CoefficientSet::new(
        [
            Cow::Borrowed(&L0[..]),
            Cow::Borrowed(&L1[..]),
            Cow::Borrowed(&L2[..]),
            Cow::Borrowed(&L3[..]),
            Cow::Borrowed(&L4[..]),
            Cow::Borrowed(&L5[..]),
        ],
        [
            Cow::Borrowed(&B0[..]),
            Cow::Borrowed(&B1[..]),
            Cow::Borrowed(&[]),
            Cow::Borrowed(&[]),
            Cow::Borrowed(&[]),
            Cow::Borrowed(&[]),
        ],
        [
            Cow::Borrowed(&R0[..]),
            Cow::Borrowed(&R1[..]),
            Cow::Borrowed(&R2[..]),
            Cow::Borrowed(&R3[..]),
            Cow::Borrowed(&R4[..]),
            Cow::Borrowed(&[]),
        ],
    )
}
