//! Fixed feature schema shared with the prediction models.

/// Number of positional features in a vector.
pub const FEATURE_COUNT: usize = 21;

/// Feature names in vector order.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "lat",
    "lon",
    "expiry_days_left",
    "distance_mm",
    "time_to_migrate_s",
    "sample_volume_uL",
    "sample_pH",
    "sample_turbidity_NTU",
    "sample_temp_C",
    "ambient_T_C",
    "ambient_RH_pct",
    "lighting_lux",
    "tilt_deg",
    "preincubation_time_s",
    "time_since_sampling_min",
    "image_blur_score",
    "tempo_transporte_horas",
    "estimated_concentration_ppb",
    "incerteza_estimativa_ppb",
    "control_line_ok",
    "controle_interno_result",
];

/// Numeric features defaulted to 0 when null or missing.
pub const NUMERIC_FEATURES: [&str; 16] = [
    "expiry_days_left",
    "distance_mm",
    "time_to_migrate_s",
    "sample_volume_uL",
    "sample_pH",
    "sample_turbidity_NTU",
    "sample_temp_C",
    "ambient_T_C",
    "ambient_RH_pct",
    "lighting_lux",
    "tilt_deg",
    "preincubation_time_s",
    "time_since_sampling_min",
    "tempo_transporte_horas",
    "estimated_concentration_ppb",
    "incerteza_estimativa_ppb",
];

/// Categorical features, also defaulted to 0.
pub const CATEGORICAL_FEATURES: [&str; 2] = ["control_line_ok", "controle_interno_result"];

/// Internal control outcome codes. Anything else encodes as 0.
pub fn controle_interno_code(value: &str) -> Option<i64> {
    match value {
        "ok" => Some(2),
        "fail" => Some(1),
        "invalid" => Some(0),
        _ => None,
    }
}

/// Position of `name` in the vector.
pub fn position(name: &str) -> Option<usize> {
    FEATURE_ORDER.iter().position(|feature| *feature == name)
}
