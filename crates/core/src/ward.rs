//! Municipal ward registry for Indore.
//!
//! The ward list is fixed; every assessment request and every report must
//! name one of these wards. A subset carries baseline fixture readings used
//! when no citizen reports exist for the ward yet.

use serde::Serialize;

use crate::status::{classify_readings, StatusLabel};

/// Canonical ward names, in display order.
pub const WARD_NAMES: &[&str] = &[
    "Sudama Nagar",
    "Rajendra Nagar",
    "Rau",
    "Annapurna",
    "Chhatribagh",
    "Dravid Nagar",
    "Lokmanya Nagar",
    "Goma Ki Phel",
    "Sukhliya",
    "Vijay Nagar",
    "Palasia",
    "Old Palasia",
    "Tilak Nagar",
    "Manik Bagh",
    "Pipliyahana",
    "Scheme No. 78",
    "Scheme No. 54",
    "Bengali Square",
    "Geeta Bhawan",
    "Navlakha",
];

/// Baseline physical readings for a ward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WardBaseline {
    pub ward: &'static str,
    pub ph: f64,
    pub turbidity: f64,
}

impl WardBaseline {
    pub fn status(&self) -> StatusLabel {
        classify_readings(self.ph, self.turbidity)
    }
}

#[rustfmt::skip]
const BASELINES: &[WardBaseline] = &[
    WardBaseline { ward: "Sudama Nagar", ph: 7.5, turbidity: 3.2 },
    WardBaseline { ward: "Rajendra Nagar", ph: 6.8, turbidity: 6.1 },
    WardBaseline { ward: "Rau", ph: 7.1, turbidity: 4.5 },
    WardBaseline { ward: "Annapurna", ph: 8.5, turbidity: 10.3 },
    WardBaseline { ward: "Chhatribagh", ph: 7.3, turbidity: 2.8 },
    WardBaseline { ward: "Dravid Nagar", ph: 7.8, turbidity: 5.5 },
    WardBaseline { ward: "Lokmanya Nagar", ph: 7.0, turbidity: 4.0 },
    WardBaseline { ward: "Goma Ki Phel", ph: 6.5, turbidity: 8.9 },
    WardBaseline { ward: "Sukhliya", ph: 6.9, turbidity: 7.2 },
    WardBaseline { ward: "Vijay Nagar", ph: 7.4, turbidity: 3.5 },
    WardBaseline { ward: "Palasia", ph: 7.2, turbidity: 3.8 },
    WardBaseline { ward: "Old Palasia", ph: 7.0, turbidity: 5.9 },
    WardBaseline { ward: "Tilak Nagar", ph: 7.6, turbidity: 2.5 },
    WardBaseline { ward: "Manik Bagh", ph: 6.7, turbidity: 9.5 },
    WardBaseline { ward: "Pipliyahana", ph: 7.3, turbidity: 4.1 },
];

/// Resolve a user-supplied ward name to its canonical spelling.
///
/// Matching ignores surrounding whitespace and ASCII case.
pub fn canonical_ward(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    WARD_NAMES
        .iter()
        .copied()
        .find(|ward| ward.eq_ignore_ascii_case(trimmed))
}

/// Baseline fixture readings for a canonical ward, if any.
pub fn baseline(ward: &str) -> Option<&'static WardBaseline> {
    BASELINES.iter().find(|b| b.ward == ward)
}
