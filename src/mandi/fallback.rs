use crate::mandi::dto::PriceRecord;

struct Sample {
    market: &'static str,
    district: &'static str,
    commodity: &'static str,
    min: f64,
    max: f64,
    modal: f64,
}

const SAMPLE_DATE: &str = "2025-10-05";

const SAMPLES: &[Sample] = &[
    Sample { market: "Amritsar Mandi", district: "Amritsar", commodity: "Wheat", min: 2100.0, max: 2300.0, modal: 2200.0 },
    Sample { market: "Rajasansi Market", district: "Amritsar", commodity: "Rice (Basmati)", min: 3500.0, max: 3800.0, modal: 3650.0 },
    Sample { market: "Chatiwind Mandi", district: "Amritsar", commodity: "Cotton", min: 6800.0, max: 7200.0, modal: 7000.0 },
    Sample { market: "Ludhiana Grain Market", district: "Ludhiana", commodity: "Wheat", min: 2050.0, max: 2250.0, modal: 2150.0 },
    Sample { market: "Khanna Mandi", district: "Ludhiana", commodity: "Maize", min: 1800.0, max: 2000.0, modal: 1900.0 },
    Sample { market: "Jagraon Market", district: "Ludhiana", commodity: "Rice", min: 3400.0, max: 3700.0, modal: 3550.0 },
    Sample { market: "Patiala Mandi", district: "Patiala", commodity: "Wheat", min: 2080.0, max: 2280.0, modal: 2180.0 },
    Sample { market: "Nabha Market", district: "Patiala", commodity: "Cotton", min: 6900.0, max: 7300.0, modal: 7100.0 },
    Sample { market: "Samana Mandi", district: "Patiala", commodity: "Mustard", min: 5200.0, max: 5500.0, modal: 5350.0 },
];

/// Built-in rows served when the price API cannot be used.
///
/// District matches exactly, commodity as a case-insensitive substring; blank filters match all.
pub fn sample_prices(district: &str, commodity: &str) -> Vec<PriceRecord> {
    let commodity = commodity.to_lowercase();
    SAMPLES
        .iter()
        .filter(|s| district.is_empty() || s.district == district)
        .filter(|s| commodity.is_empty() || s.commodity.to_lowercase().contains(&commodity))
        .map(|s| PriceRecord {
            market: s.market.into(),
            district: s.district.into(),
            commodity: s.commodity.into(),
            min: s.min,
            max: s.max,
            modal: s.modal,
            date: SAMPLE_DATE.into(),
        })
        .collect()
}
