//! Long-term monthly mean air temperatures for tomato-growing districts.
//!
//! Values are rounded 1991-2020 normals (°C) and only serve as a stand-in when
//! live weather is disabled or unavailable.

use crate::models::{TemperatureSeries, WeatherSource};
use chrono::{Datelike, Days, NaiveDate};

struct DistrictNormals {
    name: &'static str,
    aliases: &'static [&'static str],
    monthly_mean_c: [f64; 12],
}

const DISTRICTS: &[DistrictNormals] = &[
    DistrictNormals {
        name: "Coimbatore",
        aliases: &["kovai"],
        monthly_mean_c: [23.5, 25.0, 27.2, 28.5, 28.1, 25.9, 25.0, 25.2, 25.6, 25.3, 24.2, 23.3],
    },
    DistrictNormals {
        name: "Salem",
        aliases: &[],
        monthly_mean_c: [24.5, 26.5, 29.0, 30.5, 30.0, 28.0, 27.2, 27.0, 27.0, 26.3, 25.0, 24.2],
    },
    DistrictNormals {
        name: "Krishnagiri",
        aliases: &["hosur"],
        monthly_mean_c: [22.5, 24.5, 27.5, 29.5, 29.5, 27.0, 26.0, 25.8, 25.8, 25.0, 23.5, 22.3],
    },
    DistrictNormals {
        name: "Dharmapuri",
        aliases: &[],
        monthly_mean_c: [23.8, 25.8, 28.5, 30.3, 30.0, 27.8, 26.9, 26.7, 26.7, 25.9, 24.5, 23.6],
    },
    DistrictNormals {
        name: "Dindigul",
        aliases: &["oddanchatram"],
        monthly_mean_c: [24.0, 25.5, 28.0, 29.5, 29.3, 27.8, 27.0, 26.8, 27.0, 26.2, 25.0, 24.2],
    },
    DistrictNormals {
        name: "Madurai",
        aliases: &[],
        monthly_mean_c: [25.5, 27.0, 29.3, 31.0, 31.5, 30.5, 30.0, 29.5, 29.2, 28.0, 26.5, 25.6],
    },
    DistrictNormals {
        name: "Theni",
        aliases: &[],
        monthly_mean_c: [24.8, 26.2, 28.4, 29.8, 29.6, 28.2, 27.6, 27.4, 27.5, 26.7, 25.6, 24.8],
    },
    DistrictNormals {
        name: "Chennai",
        aliases: &["madras"],
        monthly_mean_c: [24.8, 26.1, 28.0, 30.6, 32.6, 31.9, 30.7, 30.0, 29.6, 28.1, 26.3, 25.1],
    },
    DistrictNormals {
        name: "Bengaluru",
        aliases: &["bangalore", "bengaluru rural", "bengaluru urban"],
        monthly_mean_c: [21.0, 23.3, 26.0, 27.7, 27.0, 24.4, 23.6, 23.5, 23.6, 23.2, 21.8, 20.6],
    },
    DistrictNormals {
        name: "Kolar",
        aliases: &["chikkaballapur"],
        monthly_mean_c: [21.5, 24.0, 27.0, 28.5, 28.0, 25.5, 24.5, 24.3, 24.5, 24.0, 22.5, 21.2],
    },
];

fn lookup(district: &str) -> Option<&'static DistrictNormals> {
    let key = district.trim().to_lowercase();
    let key = key.strip_suffix(" district").unwrap_or(&key);
    DISTRICTS
        .iter()
        .find(|d| d.name.to_lowercase() == key || d.aliases.contains(&key))
}

/// Canonical name for a district, if it is in the table
pub fn canonical_name(district: &str) -> Option<&'static str> {
    lookup(district).map(|d| d.name)
}

pub fn known_districts() -> Vec<&'static str> {
    DISTRICTS.iter().map(|d| d.name).collect()
}

/// Mean temperature for a calendar month (1-12)
pub fn monthly_mean_c(district: &str, month: u32) -> Option<f64> {
    let normals = lookup(district)?;
    let idx = usize::try_from(month.checked_sub(1)?).ok()?;
    normals.monthly_mean_c.get(idx).copied()
}

/// Climatological series covering the `days` days after `as_of`
pub fn series(district: &str, as_of: NaiveDate, days: usize) -> Option<TemperatureSeries> {
    let normals = lookup(district)?;
    let temps = (1..=days as u64)
        .map(|n| {
            let date = as_of.checked_add_days(Days::new(n)).unwrap_or(NaiveDate::MAX);
            normals.monthly_mean_c[date.month0() as usize]
        })
        .collect();
    Some(TemperatureSeries::new(WeatherSource::Climatology, temps))
}
