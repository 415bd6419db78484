/// Round a display value to one decimal place.
///
/// Missing, NaN and infinite values all come back as `None`, which is the
/// only "no value" the chart renderer accepts.
pub fn round1(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| (10.0 * v).round() / 10.0)
}

pub fn round1_all(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values.iter().map(|v| round1(*v)).collect()
}

/// Mean of the present values, `None` when nothing is present
pub fn mean_present<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
