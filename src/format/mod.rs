//! Display formatting for listing fields.
//!
//! All functions are total: missing or zero values map to a fallback string
//! instead of panicking.

const CURRENCY: &str = "KM";

/// Deal score quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

struct BandRow {
    min: f64,
    band: DealBand,
    label: &'static str,
    color: &'static str,
}

// Ordered from the highest threshold down; the last row catches everything.
static BANDS: [BandRow; 4] = [
    BandRow { min: 90.0, band: DealBand::Excellent, label: "Excellent Deal", color: "#10B981" },
    BandRow { min: 70.0, band: DealBand::Good, label: "Good Deal", color: "#3B82F6" },
    BandRow { min: 50.0, band: DealBand::Fair, label: "Fair Price", color: "#F59E0B" },
    BandRow { min: f64::NEG_INFINITY, band: DealBand::Poor, label: "Overpriced", color: "#EF4444" },
];

/// Color used when a listing has no score
pub const UNKNOWN_SCORE_COLOR: &str = "#9CA3AF";

impl DealBand {
    fn row(&self) -> &'static BandRow {
        // every variant has exactly one row
        BANDS
            .iter()
            .find(|row| row.band == *self)
            .unwrap_or(&BANDS[BANDS.len() - 1])
    }

    pub fn label(&self) -> &'static str {
        self.row().label
    }

    pub fn color(&self) -> &'static str {
        self.row().color
    }
}

/// Band for a score; `None` when the score is missing or not a number
pub fn deal_band(score: Option<f64>) -> Option<DealBand> {
    let score = score.filter(|s| s.is_finite())?;
    BANDS.iter().find(|row| score >= row.min).map(|row| row.band)
}

pub fn deal_label(score: Option<f64>) -> &'static str {
    deal_band(score).map(|b| b.label()).unwrap_or("N/A")
}

pub fn deal_color(score: Option<f64>) -> &'static str {
    deal_band(score).map(|b| b.color()).unwrap_or(UNKNOWN_SCORE_COLOR)
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.is_finite() && p > 0.0 => {
            format!("{} {}", group_thousands(p.round() as u64), CURRENCY)
        }
        _ => "On request".to_string(),
    }
}

pub fn format_deal_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() && s > 0.0 => format!("{}", s.round() as i64),
        _ => "N/A".to_string(),
    }
}

pub fn format_size(square_m2: Option<f64>) -> String {
    match square_m2 {
        Some(s) if s.is_finite() && s > 0.0 => format!("{} m²", trim_number(s)),
        _ => "N/A".to_string(),
    }
}

pub fn format_rooms(rooms: Option<f64>) -> String {
    match rooms {
        Some(r) if r.is_finite() && r > 0.0 => trim_number(r),
        _ => "N/A".to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_thresholds_are_inclusive() {
        assert_eq!(deal_band(Some(90.0)), Some(DealBand::Excellent));
        assert_eq!(deal_band(Some(89.9)), Some(DealBand::Good));
        assert_eq!(deal_band(Some(70.0)), Some(DealBand::Good));
        assert_eq!(deal_band(Some(50.0)), Some(DealBand::Fair));
        assert_eq!(deal_band(Some(49.0)), Some(DealBand::Poor));
        assert_eq!(deal_band(Some(0.0)), Some(DealBand::Poor));
        assert_eq!(deal_band(None), None);
        assert_eq!(deal_band(Some(f64::NAN)), None);
    }

    #[test]
    fn labels_and_colors_come_from_one_table() {
        assert_eq!(deal_label(Some(95.0)), "Excellent Deal");
        assert_eq!(deal_color(Some(95.0)), DealBand::Excellent.color());
        assert_eq!(deal_label(Some(10.0)), "Overpriced");
        assert_eq!(deal_label(None), "N/A");
        assert_eq!(deal_color(None), UNKNOWN_SCORE_COLOR);
    }

    #[test]
    fn price_fallbacks() {
        assert_eq!(format_price(None), "On request");
        assert_eq!(format_price(Some(0.0)), "On request");
        assert_eq!(format_price(Some(f64::NAN)), "On request");
        assert_eq!(format_price(Some(950.0)), "950 KM");
        assert_eq!(format_price(Some(250_000.0)), "250,000 KM");
        assert_eq!(format_price(Some(1_234_567.4)), "1,234,567 KM");
    }

    #[test]
    fn score_size_and_rooms() {
        assert_eq!(format_deal_score(Some(87.6)), "88");
        assert_eq!(format_deal_score(None), "N/A");
        assert_eq!(format_size(Some(61.0)), "61 m²");
        assert_eq!(format_size(Some(61.3)), "61.3 m²");
        assert_eq!(format_size(Some(0.0)), "N/A");
        assert_eq!(format_rooms(Some(2.5)), "2.5");
        assert_eq!(format_rooms(Some(3.0)), "3");
        assert_eq!(format_rooms(None), "N/A");
    }
}
