use super::config::{
    ScoringConfig, MAX_AVAILABILITY_POINTS, MAX_DISTANCE_POINTS, MAX_WORKLOAD_POINTS,
};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let distance = &config.distance;

    // Distance brackets: finite, non-negative, strictly ascending, capped
    let mut previous: Option<f64> = None;
    for (i, bracket) in distance.brackets.iter().enumerate() {
        if !bracket.up_to_km.is_finite() || bracket.up_to_km < 0.0 {
            errors.push(format!(
                "scoring.distance.brackets[{}].up_to_km: must be a finite non-negative number, got {}",
                i, bracket.up_to_km
            ));
        } else if let Some(prev) = previous {
            if bracket.up_to_km <= prev {
                errors.push(format!(
                    "scoring.distance.brackets[{}].up_to_km: must be greater than previous bracket ({})",
                    i, prev
                ));
            }
        }
        if bracket.up_to_km.is_finite() {
            previous = Some(bracket.up_to_km);
        }
        check_cap(
            &mut errors,
            &format!("scoring.distance.brackets[{}].points", i),
            bracket.points,
            MAX_DISTANCE_POINTS,
        );
    }

    for (field, points) in [
        ("beyond_points", distance.beyond_points),
        ("lookup_failed_points", distance.lookup_failed_points),
        ("no_previous_course_points", distance.no_previous_course_points),
        ("no_drop_off_points", distance.no_drop_off_points),
    ] {
        check_cap(
            &mut errors,
            &format!("scoring.distance.{}", field),
            points,
            MAX_DISTANCE_POINTS,
        );
    }

    // Workload brackets: strictly ascending, capped
    let workload = &config.workload;
    for (i, pair) in workload.brackets.windows(2).enumerate() {
        if pair[1].up_to <= pair[0].up_to {
            errors.push(format!(
                "scoring.workload.brackets[{}].up_to: must be greater than previous bracket ({})",
                i + 1,
                pair[0].up_to
            ));
        }
    }
    for (i, bracket) in workload.brackets.iter().enumerate() {
        check_cap(
            &mut errors,
            &format!("scoring.workload.brackets[{}].points", i),
            bracket.points,
            MAX_WORKLOAD_POINTS,
        );
    }
    check_cap(
        &mut errors,
        "scoring.workload.beyond_points",
        workload.beyond_points,
        MAX_WORKLOAD_POINTS,
    );

    check_cap(
        &mut errors,
        "scoring.availability_points",
        config.availability_points,
        MAX_AVAILABILITY_POINTS,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_cap(errors: &mut Vec<String>, field: &str, points: u32, max: u32) {
    if points > max {
        errors.push(format!("{}: must be at most {}, got {}", field, max, points));
    }
}
