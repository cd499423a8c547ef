/// Points earned per reference-currency unit.
///
/// Absent when either operand is missing or the amount is zero.
pub fn points_per_unit(points: Option<f64>, normalized_amount: Option<f64>) -> Option<f64> {
    let (points, amount) = points.zip(normalized_amount)?;
    if amount == 0.0 {
        return None;
    }
    Some(points / amount).filter(|r| r.is_finite())
}
