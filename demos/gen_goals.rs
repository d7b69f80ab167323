//! Generate a goals report for validation testing

fn main() {
    let json = r#"{
        "weight_kg": 70,
        "height_cm": 175,
        "birth_date": "1996-01-15",
        "gender": "male",
        "activity_level": "moderately_active",
        "goal_type": "maintenance"
    }"#;

    let today = chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap_or_default();

    match nutri_goals::profile_json_to_goals(json, today) {
        Ok(report) => print!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
