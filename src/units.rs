//! Unit conversion and rounding helpers

/// Pounds per kilogram
pub const LBS_PER_KG: f64 = 2.20462;

/// Centimetres per inch
pub const CM_PER_INCH: f64 = 2.54;

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / LBS_PER_KG
}

pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

/// Split total inches into whole feet and rounded remaining inches
pub fn inches_to_feet_inches(total_inches: f64) -> (u32, u32) {
    let feet = (total_inches / 12.0).floor();
    let inches = (total_inches - feet * 12.0).round();
    (feet.max(0.0) as u32, inches.max(0.0) as u32)
}

pub fn feet_inches_to_inches(feet: u32, inches: f64) -> f64 {
    f64::from(feet) * 12.0 + inches
}

/// Display a weight with one decimal in the requested unit system
pub fn format_weight(kg: f64, imperial: bool) -> String {
    if imperial {
        format!("{:.1} lbs", kg_to_lbs(kg))
    } else {
        format!("{kg:.1} kg")
    }
}

/// Round to the nearest integer, halves toward positive infinity.
///
/// Differs from [`f64::round`] only for negative halves (-2.5 -> -2).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// [`round_half_up`] to an integer
pub fn round_to_i64(value: f64) -> i64 {
    round_half_up(value) as i64
}

/// Round to a fixed number of decimal places
pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_conversions() {
        assert!((kg_to_lbs(100.0) - 220.462).abs() < 1e-9);
        assert!((lbs_to_kg(kg_to_lbs(72.5)) - 72.5).abs() < 1e-9);
    }

    #[test]
    fn test_height_conversions() {
        assert!((inches_to_cm(70.0) - 177.8).abs() < 1e-9);
        assert_eq!(inches_to_feet_inches(70.0), (5, 10));
        assert_eq!(inches_to_feet_inches(cm_to_inches(180.0)), (5, 11));
        assert_eq!(feet_inches_to_inches(6, 1.0), 73.0);
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(70.0, false), "70.0 kg");
        assert_eq!(format_weight(70.0, true), "154.3 lbs");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-231.43), -231.0);
        assert_eq!(round_to_i64(1648.75), 1649);
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(27.777_777, 2), 27.78);
        assert_eq!(round_dp(56.656_25, 1), 56.7);
    }
}
