//! Emission factor tables, in kgCO2eq per passenger-km unless noted.

use serde::{Deserialize, Serialize};

use crate::model::{FerryOption, Passengers};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionFactors {
    pub car: CarFactors,
    pub electric_car: ElectricCarFactors,
    pub bus: BusFactors,
    pub train: TrainFactors,
    pub bicycle: BicycleFactors,
    pub plane: PlaneFactors,
    pub ferry: FerryFactors,
    pub sail: SailFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarFactors {
    pub construction: f64,
    pub fuel: f64,
    /// Extra consumption per additional passenger.
    pub passenger_penalty: f64,
    /// Share of the fuel attributed to a hitch-hiker.
    pub hitch_hiking_share: f64,
}

impl Default for CarFactors {
    fn default() -> Self {
        Self {
            construction: 0.0256,
            fuel: 0.192,
            passenger_penalty: 0.04,
            hitch_hiking_share: 0.04,
        }
    }
}

impl CarFactors {
    /// Per-passenger `(usage, construction)` shares.
    ///
    /// `usage` multiplies the vehicle's usage factor: the vehicle consumption
    /// grows by `passenger_penalty` per extra passenger and is split between
    /// them. A hitch-hiker only carries the extra consumption they cause.
    pub fn shares(&self, passengers: Passengers) -> (f64, f64) {
        match passengers {
            Passengers::Count(n) => {
                let n = f64::from(n.get());
                ((1.0 + self.passenger_penalty * (n - 1.0)) / n, 1.0 / n)
            }
            Passengers::HitchHiking => (self.hitch_hiking_share, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricCarFactors {
    pub construction: f64,
    /// kWh per km.
    pub energy_kwh_per_km: f64,
}

impl Default for ElectricCarFactors {
    fn default() -> Self {
        Self {
            construction: 0.0836,
            energy_kwh_per_km: 0.187,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusFactors {
    pub construction: f64,
    pub fuel: f64,
}

impl Default for BusFactors {
    fn default() -> Self {
        Self {
            construction: 0.00442,
            fuel: 0.025,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainFactors {
    pub infra: f64,
}

impl Default for TrainFactors {
    fn default() -> Self {
        Self { infra: 0.0065 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BicycleFactors {
    pub construction: f64,
}

impl Default for BicycleFactors {
    fn default() -> Self {
        Self {
            construction: 0.005,
        }
    }
}

/// Factors of one flight distance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneTier {
    pub construction: f64,
    pub upstream: f64,
    pub combustion: f64,
    pub infra: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightBand {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneFactors {
    pub short: PlaneTier,
    pub medium: PlaneTier,
    pub long: PlaneTier,
    /// Flights shorter than this are short haul.
    pub short_haul_max_km: f64,
    /// Flights shorter than this (and not short) are medium haul.
    pub medium_haul_max_km: f64,
    /// Non-CO2 forcing as a multiple of combustion emissions.
    pub contrails_multiplier: f64,
    /// Flat holding-pattern emissions per flight, in kg.
    pub holding_kg: f64,
    /// Ratio between flown and great-circle distance.
    pub detour: f64,
}

impl Default for PlaneFactors {
    fn default() -> Self {
        Self {
            short: PlaneTier {
                construction: 0.00038,
                upstream: 0.0242,
                combustion: 0.117,
                infra: 0.0003,
            },
            medium: PlaneTier {
                construction: 0.00036,
                upstream: 0.0176,
                combustion: 0.0848,
                infra: 0.0003,
            },
            long: PlaneTier {
                construction: 0.00026,
                upstream: 0.0143,
                combustion: 0.0687,
                infra: 0.0003,
            },
            short_haul_max_km: 1000.0,
            medium_haul_max_km: 3500.0,
            contrails_multiplier: 2.0,
            holding_kg: 3.81,
            detour: 1.076,
        }
    }
}

impl PlaneFactors {
    /// Band and factors for an undetoured great-circle distance.
    pub fn tier(&self, distance_km: f64) -> (FlightBand, &PlaneTier) {
        if distance_km < self.short_haul_max_km {
            (FlightBand::Short, &self.short)
        } else if distance_km < self.medium_haul_max_km {
            (FlightBand::Medium, &self.medium)
        } else {
            (FlightBand::Long, &self.long)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FerryFactors {
    pub base: f64,
    pub seat: f64,
    pub cabin: f64,
    /// Add-on for bringing a car aboard.
    pub car: f64,
}

impl Default for FerryFactors {
    fn default() -> Self {
        Self {
            base: 0.1056,
            seat: 0.0,
            cabin: 0.0255,
            car: 0.1314,
        }
    }
}

impl FerryFactors {
    pub fn factor(&self, option: FerryOption) -> f64 {
        match option {
            FerryOption::None => self.seat + self.base,
            FerryOption::Cabin => self.cabin + self.base,
            FerryOption::Vehicle => self.car + self.seat + self.base,
            FerryOption::CabinVehicle => self.car + self.cabin + self.base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SailFactors {
    pub usage: f64,
}

impl Default for SailFactors {
    fn default() -> Self {
        Self { usage: 0.0036 }
    }
}
