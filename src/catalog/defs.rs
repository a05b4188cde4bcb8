use std::fmt;
use std::str::FromStr;

pub const QUANTITY_COUNT: usize = 5;
pub const VARIANT_COUNT: usize = 4;
pub const FEATURE_COUNT: usize = QUANTITY_COUNT * VARIANT_COUNT;

/// Physical quantity measured in the greenhouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    Sunlight,
    Temperature,
    Humidity,
    Co2,
    AccumulatedSunlight,
}

impl Quantity {
    pub const ALL: [Quantity; QUANTITY_COUNT] = [
        Quantity::Sunlight,
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Co2,
        Quantity::AccumulatedSunlight,
    ];

    pub fn index(self) -> usize {
        match self {
            Quantity::Sunlight => 0,
            Quantity::Temperature => 1,
            Quantity::Humidity => 2,
            Quantity::Co2 => 3,
            Quantity::AccumulatedSunlight => 4,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Quantity::Sunlight => "sunlight",
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
            Quantity::Co2 => "co2",
            Quantity::AccumulatedSunlight => "accumulated_sunlight",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quantity::Sunlight => "Sunlight",
            Quantity::Temperature => "Temperature",
            Quantity::Humidity => "Humidity",
            Quantity::Co2 => "CO2 concentration",
            Quantity::AccumulatedSunlight => "Accumulated sunlight",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Sunlight => "W/m²",
            Quantity::Temperature => "°C",
            Quantity::Humidity => "%",
            Quantity::Co2 => "ppm",
            Quantity::AccumulatedSunlight => "MJ/m²",
        }
    }

    pub fn from_key(key: &str) -> Option<Quantity> {
        Quantity::ALL.into_iter().find(|q| q.key() == key)
    }
}

/// Statistical view of a quantity the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    CurrentMean,
    CurrentStd,
    MaxMean,
    MinMean,
}

impl Variant {
    pub const ALL: [Variant; VARIANT_COUNT] = [
        Variant::CurrentMean,
        Variant::CurrentStd,
        Variant::MaxMean,
        Variant::MinMean,
    ];

    pub fn index(self) -> usize {
        match self {
            Variant::CurrentMean => 0,
            Variant::CurrentStd => 1,
            Variant::MaxMean => 2,
            Variant::MinMean => 3,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Variant::CurrentMean => "current_mean",
            Variant::CurrentStd => "current_std",
            Variant::MaxMean => "max_mean",
            Variant::MinMean => "min_mean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureKey {
    pub quantity: Quantity,
    pub variant: Variant,
}

impl FeatureKey {
    pub const fn new(quantity: Quantity, variant: Variant) -> Self {
        Self { quantity, variant }
    }

    /// Position of this feature in the model input vector.
    pub fn position(self) -> usize {
        self.quantity.index() * VARIANT_COUNT + self.variant.index()
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.quantity.key(), self.variant.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature name: {0}")]
pub struct UnknownFeature(pub String);

impl FromStr for FeatureKey {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        for quantity in Quantity::ALL {
            let Some(rest) = name
                .strip_prefix(quantity.key())
                .and_then(|r| r.strip_prefix('_'))
            else {
                continue;
            };
            if let Some(variant) = Variant::ALL.into_iter().find(|v| v.key() == rest) {
                return Ok(FeatureKey::new(quantity, variant));
            }
        }
        Err(UnknownFeature(name.to_string()))
    }
}

/// Model input order: quantity-major, variant-minor.
pub fn feature_order() -> [FeatureKey; FEATURE_COUNT] {
    let mut out = [FeatureKey::new(Quantity::Sunlight, Variant::CurrentMean); FEATURE_COUNT];
    for quantity in Quantity::ALL {
        for variant in Variant::ALL {
            let key = FeatureKey::new(quantity, variant);
            out[key.position()] = key;
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub struct FallbackDef {
    pub quantity: Quantity,
    /// Indexed by `Variant::index`.
    pub values: [f64; VARIANT_COUNT],
}

// Training-set means.
const BUILTIN_FALLBACKS: &[FallbackDef] = &[
    FallbackDef {
        quantity: Quantity::Sunlight,
        values: [0.1651, 0.1989, 0.1934, 0.1418],
    },
    FallbackDef {
        quantity: Quantity::Temperature,
        values: [22.9567, 5.8672, 23.3642, 22.5699],
    },
    FallbackDef {
        quantity: Quantity::Humidity,
        values: [88.0837, 14.1522, 89.8457, 86.2996],
    },
    FallbackDef {
        quantity: Quantity::Co2,
        values: [379.7915, 32.5539, 387.8929, 372.4839],
    },
    FallbackDef {
        quantity: Quantity::AccumulatedSunlight,
        values: [14948.3364, 2999.0494, 15003.5516, 14890.9634],
    },
];

pub fn builtin_fallbacks() -> &'static [FallbackDef] {
    BUILTIN_FALLBACKS
}
