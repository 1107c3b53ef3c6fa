//! Physical dimensions as SI base exponents.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// SI base dimension exponents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Exponents {
    /// Mass (kg)
    pub mass: i8,
    /// Length (m)
    pub length: i8,
    /// Time (s)
    pub time: i8,
    /// Electric current (A)
    pub current: i8,
    /// Amount of substance (mol)
    pub amount: i8,
    /// Temperature (K)
    pub temperature: i8,
    /// Luminous intensity (cd)
    pub luminosity: i8,
}

/// A named physical dimension.
///
/// Two dimensions match when their exponents are equal; the name is only a
/// label, so `voltage` and a user-declared `membrane_potential` with the
/// same exponents are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
    pub exponents: Exponents,
}

const fn exps(mass: i8, length: i8, time: i8, current: i8) -> Exponents {
    Exponents {
        mass,
        length,
        time,
        current,
        amount: 0,
        temperature: 0,
        luminosity: 0,
    }
}

const NAMED: &[(&str, Exponents)] = &[
    ("dimensionless", exps(0, 0, 0, 0)),
    ("voltage", exps(1, 2, -3, -1)),
    ("current", exps(0, 0, 0, 1)),
    ("time", exps(0, 0, 1, 0)),
    ("resistance", exps(1, 2, -3, -2)),
    ("conductance", exps(-1, -2, 3, 2)),
    ("capacitance", exps(-1, -2, 4, 2)),
    ("per_time", exps(0, 0, -1, 0)),
    ("charge", exps(0, 0, 1, 1)),
];

impl Dimension {
    pub fn new(name: impl Into<String>, exponents: Exponents) -> Self {
        Self {
            name: name.into(),
            exponents,
        }
    }

    /// Look up one of the predefined dimensions by name.
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, e)| Dimension::new(*n, *e))
    }

    fn named(name: &str) -> Self {
        let exponents = NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, e)| *e)
            .unwrap_or_default();
        Dimension::new(name, exponents)
    }

    pub fn dimensionless() -> Self {
        Self::named("dimensionless")
    }

    pub fn voltage() -> Self {
        Self::named("voltage")
    }

    pub fn current() -> Self {
        Self::named("current")
    }

    pub fn time() -> Self {
        Self::named("time")
    }

    pub fn resistance() -> Self {
        Self::named("resistance")
    }

    pub fn conductance() -> Self {
        Self::named("conductance")
    }

    pub fn capacitance() -> Self {
        Self::named("capacitance")
    }

    pub fn per_time() -> Self {
        Self::named("per_time")
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents == Exponents::default()
    }

    /// Dimensions are compatible when their exponents agree.
    pub fn matches(&self, other: &Dimension) -> bool {
        self.exponents == other.exponents
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Named(String),
    Full {
        name: String,
        #[serde(flatten)]
        exponents: Exponents,
    },
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match Dimension::from_name(&self.name) {
            Some(known) if known.exponents == self.exponents => {
                DimensionRepr::Named(self.name.clone())
            }
            _ => DimensionRepr::Full {
                name: self.name.clone(),
                exponents: self.exponents,
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match DimensionRepr::deserialize(deserializer)? {
            DimensionRepr::Named(name) => Dimension::from_name(&name).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "unknown dimension '{name}', give its exponents explicitly"
                ))
            }),
            DimensionRepr::Full { name, exponents } => Ok(Dimension::new(name, exponents)),
        }
    }
}
