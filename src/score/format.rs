/// Label under a scorecard cell: `Par`, `+2`, `-1`, or `-` when the hole is unscored.
#[must_use]
pub fn format_hole_diff(diff: Option<i32>) -> String {
    match diff {
        None => "-".to_string(),
        Some(0) => "Par".to_string(),
        Some(d) if d > 0 => format!("+{d}"),
        Some(d) => d.to_string(),
    }
}

#[must_use]
pub fn format_vs_par(vs_par: i32) -> String {
    if vs_par > 0 {
        format!("+{vs_par}")
    } else {
        vs_par.to_string()
    }
}

/// One decimal unless the value is whole. No data renders as `0`.
#[must_use]
pub fn format_average(avg: Option<f64>) -> String {
    let Some(avg) = avg.filter(|v| v.is_finite()) else {
        return "0".to_string();
    };
    let rounded = (avg * 10.0).round() / 10.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let sign = if rounded < 0.0 { "-" } else { "+" };
    let abs = rounded.abs();
    if abs.fract() == 0.0 {
        format!("{sign}{abs:.0}")
    } else {
        format!("{sign}{abs:.1}")
    }
}

/// Cell text for a saved hole: `+1`, `-2`, `0`, or `(+1)2` when OB strokes were taken.
#[must_use]
pub fn format_saved_diff(diff_to_par: i32, ob_count: u32) -> String {
    let diff = format_vs_par(diff_to_par);
    if ob_count >= 1 {
        format!("({diff}){ob_count}")
    } else {
        diff
    }
}
