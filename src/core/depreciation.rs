use chrono::Datelike;

/// Applied when the year is missing or lies more than a year in the future.
pub const UNTRUSTED_YEAR_FACTOR: f64 = 0.50;
/// Markdown for a unit listed in its model year.
pub const CURRENT_YEAR_FACTOR: f64 = 0.95;
const FIRST_YEAR_RETENTION: f64 = 0.85;
const LATER_YEAR_RETENTION: f64 = 0.90;
/// Total depreciation never exceeds 75%.
pub const MIN_FACTOR: f64 = 0.25;

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub fn depreciation_factor(year: Option<i32>) -> f64 {
    depreciation_factor_at(year, current_year())
}

pub fn depreciation_factor_at(year: Option<i32>, current_year: i32) -> f64 {
    let Some(year) = year else {
        return UNTRUSTED_YEAR_FACTOR;
    };
    if year > current_year.saturating_add(1) {
        return UNTRUSTED_YEAR_FACTOR;
    }

    let age = current_year.saturating_sub(year).max(0);
    if age == 0 {
        return CURRENT_YEAR_FACTOR;
    }

    let factor = FIRST_YEAR_RETENTION * LATER_YEAR_RETENTION.powi(age - 1);
    factor.max(MIN_FACTOR)
}
