//! The scaling policy — a pure decision function.
//!
//! Rules evaluate in a fixed order; the first match wins:
//!
//! 1. short average spikes above the up threshold *and* above the long
//!    average by the trend margin → multiplicative scale-up.
//! 2. short average collapses below the down threshold *and* below the
//!    long average by the trend margin → multiplicative scale-down.
//! 3. long average alone sits above the up threshold with headroom
//!    left → single-instance proactive scale-up.
//! 4. otherwise no action.
//!
//! The function is total: NaN averages fail every comparison and fall
//! through to `NoAction`.

use surge_core::{InstanceBounds, PolicyConfig, ScalingDecision};

/// Decide a scaling transition from the two window averages and the
/// current instance count.
///
/// `to` in the returned decision is always inside `bounds`. Up steps
/// use `ceil(current * factor)`, down steps `floor(current / factor)`;
/// because of the rounding the two directions are not symmetric:
/// up-then-down returns to the starting count, down-then-up may not.
pub fn decide(
    short_avg: f64,
    long_avg: f64,
    current: u32,
    bounds: InstanceBounds,
    policy: &PolicyConfig,
) -> ScalingDecision {
    // The target invariant guarantees current is in bounds; clamp
    // anyway before the formulas run.
    let current = bounds.clamp(current);

    if short_avg > policy.scale_up_threshold && short_avg > long_avg + policy.trend_margin {
        let to = scale_up_target(current, policy.scale_factor, bounds);
        if to > current {
            return ScalingDecision::ScaleUp { from: current, to };
        }
        return ScalingDecision::NoAction;
    }

    if short_avg < policy.scale_down_threshold && short_avg < long_avg - policy.trend_margin {
        let to = scale_down_target(current, policy.scale_factor, bounds);
        if to < current {
            return ScalingDecision::ScaleDown { from: current, to };
        }
        return ScalingDecision::NoAction;
    }

    if long_avg > policy.scale_up_threshold && current < bounds.max {
        // Damped response to a sustained-but-unspiky trend: a fixed
        // step of one, independent of the scale factor. The guard
        // makes current + 1 <= max.
        return ScalingDecision::ProactiveScaleUp {
            from: current,
            to: current + 1,
        };
    }

    ScalingDecision::NoAction
}

fn scale_up_target(current: u32, factor: f64, bounds: InstanceBounds) -> u32 {
    let desired = ((current as f64) * factor).ceil() as u32;
    desired.min(bounds.max)
}

fn scale_down_target(current: u32, factor: f64, bounds: InstanceBounds) -> u32 {
    let desired = ((current as f64) / factor).floor() as u32;
    desired.max(bounds.min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: u32, max: u32) -> InstanceBounds {
        InstanceBounds { min, max }
    }

    fn policy(up: f64, down: f64, factor: f64) -> PolicyConfig {
        PolicyConfig {
            scale_up_threshold: up,
            scale_down_threshold: down,
            scale_factor: factor,
            trend_margin: 5.0,
        }
    }

    #[test]
    fn spike_triggers_reactive_scale_up() {
        // short=80 clears up=65 and long+margin=65 → ceil(4 * 1.5) = 6.
        let decision = decide(80.0, 60.0, 4, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::ScaleUp { from: 4, to: 6 });
    }

    #[test]
    fn collapse_triggers_reactive_scale_down() {
        // short=10 is below down=30 and below long-margin=35 → floor(6 / 1.5) = 4.
        let decision = decide(10.0, 40.0, 6, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::ScaleDown { from: 6, to: 4 });
    }

    #[test]
    fn elevated_trend_without_spike_nudges_by_one() {
        // short=50 fails rule 1, long=70 clears the up threshold.
        let decision = decide(50.0, 70.0, 3, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::ProactiveScaleUp { from: 3, to: 4 });
    }

    #[test]
    fn empty_windows_take_no_action() {
        // Both averages default to 0 on empty windows; rule 2 needs
        // 0 < long - margin which 0 < -5 fails, and min clamping would
        // stop a scale-down anyway.
        let decision = decide(0.0, 0.0, 2, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    #[test]
    fn spike_without_trend_gap_is_ignored() {
        // short=70 clears the threshold but not long + margin = 70,
        // and long sits at (not above) the up threshold so the
        // proactive rule stays quiet too.
        let decision = decide(70.0, 65.0, 4, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    #[test]
    fn scale_up_clamps_at_max() {
        // ceil(8 * 1.5) = 12, capped at 10.
        let decision = decide(90.0, 50.0, 8, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::ScaleUp { from: 8, to: 10 });
    }

    #[test]
    fn scale_up_at_max_is_no_action() {
        let decision = decide(90.0, 50.0, 10, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    #[test]
    fn scale_down_clamps_at_min() {
        // floor(4 / 1.5) = 2, floored at 3.
        let decision = decide(5.0, 50.0, 4, bounds(3, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::ScaleDown { from: 4, to: 3 });
    }

    #[test]
    fn scale_down_at_min_is_no_action() {
        let decision = decide(5.0, 50.0, 1, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    #[test]
    fn proactive_at_max_is_no_action() {
        let decision = decide(50.0, 70.0, 10, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    #[test]
    fn reactive_up_takes_precedence_over_proactive() {
        // Both rule 1 and rule 3 hold; rule 1 wins with its larger step.
        let decision = decide(90.0, 70.0, 4, bounds(1, 20), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::ScaleUp { from: 4, to: 6 });
    }

    #[test]
    fn decision_is_idempotent_for_identical_inputs() {
        let p = policy(65.0, 30.0, 1.5);
        let b = bounds(1, 10);
        let first = decide(80.0, 60.0, 4, b, &p);
        let second = decide(80.0, 60.0, 4, b, &p);
        assert_eq!(first, second);
    }

    #[test]
    fn nan_averages_resolve_to_no_action() {
        let p = policy(65.0, 30.0, 1.5);
        let b = bounds(1, 10);
        assert_eq!(decide(f64::NAN, 50.0, 4, b, &p), ScalingDecision::NoAction);
        assert_eq!(decide(50.0, f64::NAN, 4, b, &p), ScalingDecision::NoAction);
        assert_eq!(decide(f64::NAN, f64::NAN, 4, b, &p), ScalingDecision::NoAction);
    }

    #[test]
    fn negative_averages_cannot_scale_below_min() {
        let decision = decide(-20.0, 50.0, 1, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    #[test]
    fn out_of_bounds_current_is_clamped_before_the_formulas() {
        // current=50 above max=10: clamped to 10, already at max.
        let decision = decide(90.0, 50.0, 50, bounds(1, 10), &policy(65.0, 30.0, 1.5));
        assert_eq!(decision, ScalingDecision::NoAction);
    }

    // ceil-up / floor-down rounding asymmetry. For factor > 1 and no
    // clamping, up-then-down always returns to the start:
    // c <= ceil(c*f)/f < c + 1/f < c + 1, so the floor lands on c.
    // Down-then-up has no such guarantee.

    #[test]
    fn up_then_down_round_trips() {
        let b = bounds(1, 100);
        for (count, factor, up_target) in [(10, 1.5, 15), (7, 1.5, 11), (9, 1.4, 13)] {
            let p = policy(65.0, 30.0, factor);
            let up = decide(80.0, 60.0, count, b, &p);
            assert_eq!(up, ScalingDecision::ScaleUp { from: count, to: up_target });

            let down = decide(10.0, 40.0, up_target, b, &p);
            assert_eq!(
                down,
                ScalingDecision::ScaleDown { from: up_target, to: count },
                "count={count} factor={factor}"
            );
        }
    }

    #[test]
    fn down_then_up_does_not_round_trip() {
        let b = bounds(1, 100);
        let p = policy(65.0, 30.0, 1.5);

        // 10 → floor(10/1.5) = 6.
        let down = decide(10.0, 40.0, 10, b, &p);
        assert_eq!(down, ScalingDecision::ScaleDown { from: 10, to: 6 });

        // 6 → ceil(6*1.5) = 9, not back to 10.
        let up = decide(80.0, 60.0, 6, b, &p);
        assert_eq!(up, ScalingDecision::ScaleUp { from: 6, to: 9 });
    }
}
