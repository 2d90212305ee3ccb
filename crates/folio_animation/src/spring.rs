//! Spring physics for timed animations
//!
//! A spring here is described the way transition code thinks about it: a
//! damping ratio and a duration. The curve is the analytical solution of the
//! damped harmonic oscillator, normalized so that the spring settles at the
//! end of the animation's duration.
//!
//! ```text
//! x''(t) + 2ζω₀x'(t) + ω₀²x(t) = ω₀²
//! ```

/// Natural frequency, in units of 1/duration, for settling within ~1% of the
/// target by the end of the duration: e^(-ω₀)(1 + ω₀) ≈ 0.01 at ω₀ = 6.6
const SETTLE_FACTOR: f32 = 6.6;

/// Normalized spring position for a damping ratio at `t` ∈ [0, 1], where 1 is
/// the end of the animation's duration. Underdamped springs overshoot 1.0
/// before settling; the curve is pinned to exactly 1.0 at `t >= 1`.
pub fn spring_progress(damping_ratio: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let omega_0 = SETTLE_FACTOR;
    let zeta = damping_ratio.max(0.0);

    if zeta < 0.999 {
        underdamped_position(t, omega_0, zeta)
    } else if zeta <= 1.001 {
        critically_damped_position(t, omega_0)
    } else {
        overdamped_position(t, omega_0, zeta)
    }
}

/// x(t) = 1 - e^(-ζω₀t) * [cos(ωd*t) + (ζ/√(1-ζ²)) * sin(ωd*t)]
#[inline]
fn underdamped_position(t: f32, omega_0: f32, zeta: f32) -> f32 {
    let complement = zeta.mul_add(-zeta, 1.0).sqrt();
    let omega_d = omega_0 * complement;
    let decay = (-zeta * omega_0 * t).exp();
    let cos_term = (omega_d * t).cos();
    let sin_term = (zeta / complement) * (omega_d * t).sin();
    decay.mul_add(-(cos_term + sin_term), 1.0)
}

/// x(t) = 1 - e^(-ω₀t) * (1 + ω₀t)
#[inline]
fn critically_damped_position(t: f32, omega_0: f32) -> f32 {
    let decay = (-omega_0 * t).exp();
    decay.mul_add(-omega_0.mul_add(t, 1.0), 1.0)
}

/// x(t) = 1 - e^(-ζω₀t) * [cosh(γt) + (ζ/√(ζ²-1)) * sinh(γt)]
#[inline]
fn overdamped_position(t: f32, omega_0: f32, zeta: f32) -> f32 {
    let excess = zeta.mul_add(zeta, -1.0).sqrt();
    let gamma = omega_0 * excess;
    let decay = (-zeta * omega_0 * t).exp();
    let cosh_term = (gamma * t).cosh();
    let sinh_term = (zeta / excess) * (gamma * t).sinh();
    decay.mul_add(-(cosh_term + sinh_term), 1.0)
}
