//! Pollutant tags accepted by `filter_specific_pollutant`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of pollutant tags any system or appliance may recognize.
///
/// Which tags a given system acts on is up to that system; a tag that parses
/// here can still be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Smoke,
    Grease,
    Voc,
    CarbonMonoxide,
    Mold,
    Bacteria,
    Ammonia,
    Humidity,
    Allergen,
    DustMite,
    Pollen,
    Dust,
    Pm25,
    Pm10,
    Virus,
    Odor,
}

impl Pollutant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Smoke => "smoke",
            Pollutant::Grease => "grease",
            Pollutant::Voc => "voc",
            Pollutant::CarbonMonoxide => "co",
            Pollutant::Mold => "mold",
            Pollutant::Bacteria => "bacteria",
            Pollutant::Ammonia => "ammonia",
            Pollutant::Humidity => "humidity",
            Pollutant::Allergen => "allergen",
            Pollutant::DustMite => "dust_mite",
            Pollutant::Pollen => "pollen",
            Pollutant::Dust => "dust",
            Pollutant::Pm25 => "pm2.5",
            Pollutant::Pm10 => "pm10",
            Pollutant::Virus => "virus",
            Pollutant::Odor => "odor",
        }
    }
}

/// Error returned for a tag outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pollutant tag: {0}")]
pub struct UnknownPollutant(pub String);

impl FromStr for Pollutant {
    type Err = UnknownPollutant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        let pollutant = match tag.as_str() {
            "smoke" => Pollutant::Smoke,
            "grease" => Pollutant::Grease,
            "voc" => Pollutant::Voc,
            "co" | "carbon_monoxide" => Pollutant::CarbonMonoxide,
            "mold" => Pollutant::Mold,
            "bacteria" => Pollutant::Bacteria,
            "ammonia" => Pollutant::Ammonia,
            "humidity" => Pollutant::Humidity,
            "allergen" => Pollutant::Allergen,
            "dust_mite" | "dust-mite" => Pollutant::DustMite,
            "pollen" => Pollutant::Pollen,
            "dust" => Pollutant::Dust,
            "pm2.5" | "pm25" => Pollutant::Pm25,
            "pm10" => Pollutant::Pm10,
            "virus" => Pollutant::Virus,
            "odor" => Pollutant::Odor,
            _ => return Err(UnknownPollutant(tag)),
        };
        Ok(pollutant)
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
