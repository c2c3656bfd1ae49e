//! Age-based output model for a single solar installation.
//!
//! An installation produces nothing during its commissioning hold. Past the
//! hold it delivers its nameplate output, degraded linearly per 365-day period
//! counted from the end of the hold.

/// Days after installation during which a grid produces no power.
pub const COMMISSIONING_HOLD_DAYS: u32 = 60;
/// Optimal output of a freshly commissioned grid in kW.
pub const NAMEPLATE_OUTPUT_KW: f64 = 20.0;
/// Fraction of nameplate output lost per year of operation.
pub const DEGRADATION_PER_YEAR: f64 = 0.005;
pub const DAYS_IN_A_YEAR: u32 = 365;
/// Nominal 25-year service life. Informational only, [`compute_output`] does not clamp on it.
pub const END_OF_LIFE_DAYS: u32 = 25 * DAYS_IN_A_YEAR;

/// Whether an installation of the given age has left the commissioning hold.
pub fn is_producing(age_days: u32) -> bool {
    age_days > COMMISSIONING_HOLD_DAYS
}

/// Expected output in kW of an installation that is `age_days` old.
pub fn compute_output(age_days: u32) -> f64 {
    if !is_producing(age_days) {
        return 0.0;
    }

    let years_in_service =
        f64::from(age_days - COMMISSIONING_HOLD_DAYS) / f64::from(DAYS_IN_A_YEAR);
    NAMEPLATE_OUTPUT_KW * (1.0 - years_in_service * DEGRADATION_PER_YEAR)
}
