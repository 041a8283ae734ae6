use crate::domain::model::Category;

pub const BASELINE_CAPACITY_KWH: f64 = 3.0;
const EV_SLOPE_PER_KWH: f64 = 0.04;
// Standalone packs are valued mostly on capacity.
const BATTERY_SLOPE_PER_KWH: f64 = 0.08;

pub fn capacity_factor(category: Option<Category>, capacity_kwh: Option<f64>) -> f64 {
    let (Some(category), Some(capacity)) = (category, capacity_kwh) else {
        return 1.0;
    };
    let slope = match category {
        Category::Ev => EV_SLOPE_PER_KWH,
        Category::Battery => BATTERY_SLOPE_PER_KWH,
    };
    1.0 + (capacity - BASELINE_CAPACITY_KWH) * slope
}
