/// Degree-days contributed by one day's mean temperature.
/// Days at or below the base contribute nothing.
pub fn daily_gdd(mean_temp_c: f64, base_temp_c: f64) -> f64 {
    let gdd = mean_temp_c - base_temp_c;
    if gdd > 0.0 {
        gdd
    } else {
        0.0
    }
}

/// Running degree-day total, one entry per input day
pub fn accumulate_gdd(daily_mean_c: &[f64], base_temp_c: f64) -> Vec<f64> {
    daily_mean_c
        .iter()
        .scan(0.0, |cum, temp| {
            *cum += daily_gdd(*temp, base_temp_c);
            Some(*cum)
        })
        .collect()
}

/// Mass in kg represented by one detected fruit once the single analyzed
/// image is scaled up to the whole planting.
pub fn fruit_mass_kg(avg_weight_g: f64, num_plants: u64, plants_per_image: f64) -> f64 {
    avg_weight_g / 1000.0 * num_plants as f64 / plants_per_image
}

/// Mass left after post-harvest loss (loss given as 0-100 percent)
pub fn after_loss(mass_kg: f64, loss_pct: f64) -> f64 {
    mass_kg * (1.0 - loss_pct / 100.0)
}
