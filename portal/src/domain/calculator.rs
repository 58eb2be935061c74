//! EMI (equated monthly instalment) preview for loan terms.
//!
//! Pure arithmetic; the application form recomputes it on every edit of
//! amount, tenure or rate.

use serde::Serialize;

/// Validation failures for [`LoanTerms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TermsError {
    /// Amount was zero, negative, or not a finite number.
    #[error("amount must be a positive number")]
    NonPositiveAmount,
    /// Tenure was zero months.
    #[error("tenure must be at least one month")]
    ZeroTenure,
    /// Rate was negative or not a finite number.
    #[error("annual rate must be zero or positive")]
    NegativeRate,
}

/// Amount, tenure and annual rate accepted by [`compute_emi`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    amount: f64,
    tenure_months: u32,
    annual_rate_percent: f64,
}

impl LoanTerms {
    /// Validate raw terms.
    pub fn new(
        amount: f64,
        tenure_months: u32,
        annual_rate_percent: f64,
    ) -> Result<Self, TermsError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TermsError::NonPositiveAmount);
        }
        if tenure_months == 0 {
            return Err(TermsError::ZeroTenure);
        }
        if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
            return Err(TermsError::NegativeRate);
        }
        Ok(Self {
            amount,
            tenure_months,
            annual_rate_percent,
        })
    }

    /// Principal.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Number of monthly instalments.
    pub fn tenure_months(&self) -> u32 {
        self.tenure_months
    }

    /// Annual interest rate in percent.
    pub fn annual_rate_percent(&self) -> f64 {
        self.annual_rate_percent
    }
}

/// Rounded outputs in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiBreakdown {
    /// Monthly instalment.
    pub emi: i64,
    /// Interest paid over the whole tenure.
    pub total_interest: i64,
    /// Sum of all instalments.
    pub total_payable: i64,
}

/// Compute the instalment schedule totals for validated terms.
///
/// Each output is rounded half away from zero from the unrounded
/// intermediate. `total_payable` is therefore `round(emi_exact * tenure)`,
/// not `round(emi_exact) * tenure`: it can differ from `emi * tenure` by up
/// to half a unit per instalment (82 units for 1,000,000 over 240 months at
/// 8.25%). The one-unit tolerance holds between `total_payable` and
/// `amount + total_interest`.
///
/// # Examples
/// ```
/// use portal::domain::{compute_emi, LoanTerms};
///
/// let terms = LoanTerms::new(100_000.0, 12, 12.0).unwrap();
/// let breakdown = compute_emi(&terms);
/// assert_eq!(breakdown.emi, 8885);
/// assert_eq!(breakdown.total_payable, 106_619);
/// assert_eq!(breakdown.total_interest, 6_619);
/// ```
pub fn compute_emi(terms: &LoanTerms) -> EmiBreakdown {
    Schedule::of(terms).rounded()
}

/// Reactive form entry point: `None` until all three inputs are present and
/// non-zero, or when the schedule does not fit in a finite amount.
pub fn emi_preview(
    amount: Option<f64>,
    tenure_months: Option<u32>,
    annual_rate_percent: Option<f64>,
) -> Option<EmiBreakdown> {
    let (amount, tenure, rate) = (amount?, tenure_months?, annual_rate_percent?);
    if amount == 0.0 || tenure == 0 || rate == 0.0 {
        return None;
    }
    let terms = LoanTerms::new(amount, tenure, rate).ok()?;
    let schedule = Schedule::of(&terms);
    schedule.is_finite().then(|| schedule.rounded())
}

/// Unrounded schedule totals.
struct Schedule {
    emi: f64,
    total_interest: f64,
    total_payable: f64,
}

impl Schedule {
    fn of(terms: &LoanTerms) -> Self {
        let tenure = f64::from(terms.tenure_months);
        let monthly_rate = terms.annual_rate_percent / 12.0 / 100.0;
        // (1 + r)^n - 1, kept accurate for rates close to zero.
        let log_growth = tenure * monthly_rate.ln_1p();
        let growth_less_one = log_growth.exp_m1();
        let emi = if monthly_rate == 0.0 || growth_less_one == 0.0 {
            terms.amount / tenure
        } else {
            terms.amount * monthly_rate * log_growth.exp() / growth_less_one
        };
        let total_payable = emi * tenure;
        Self {
            emi,
            total_interest: total_payable - terms.amount,
            total_payable,
        }
    }

    fn is_finite(&self) -> bool {
        self.emi.is_finite() && self.total_interest.is_finite() && self.total_payable.is_finite()
    }

    fn rounded(&self) -> EmiBreakdown {
        EmiBreakdown {
            emi: whole_units(self.emi),
            total_interest: whole_units(self.total_interest),
            total_payable: whole_units(self.total_payable),
        }
    }
}

// Saturates for schedules beyond i64; `emi_preview` filters non-finite ones.
fn whole_units(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn breakdown(amount: f64, tenure: u32, rate: f64) -> EmiBreakdown {
        let terms = LoanTerms::new(amount, tenure, rate).expect("valid terms");
        compute_emi(&terms)
    }

    #[rstest]
    fn reference_loan_matches_known_schedule() {
        assert_eq!(
            breakdown(100_000.0, 12, 12.0),
            EmiBreakdown {
                emi: 8885,
                total_interest: 6619,
                total_payable: 106_619,
            }
        );
    }

    #[rstest]
    #[case(120_000.0, 12, 10_000)]
    #[case(100_000.0, 7, 14_286)]
    #[case(50_000.0, 6, 8_333)]
    fn zero_rate_divides_evenly(#[case] amount: f64, #[case] tenure: u32, #[case] emi: i64) {
        let result = breakdown(amount, tenure, 0.0);
        assert_eq!(result.emi, emi);
        assert_eq!(result.total_interest, 0);
    }

    #[rstest]
    #[case(100_000.0, 12, 12.0)]
    #[case(2_500_000.0, 60, 9.5)]
    #[case(75_000.0, 6, 0.1)]
    #[case(1_000_000.0, 240, 8.25)]
    fn payable_is_principal_plus_interest(
        #[case] amount: f64,
        #[case] tenure: u32,
        #[case] rate: f64,
    ) {
        let result = breakdown(amount, tenure, rate);
        assert!((result.total_payable - result.total_interest - amount as i64).abs() <= 1);
    }

    #[rstest]
    #[case(100_000.0, 12, 12.0, 1)]
    #[case(2_500_000.0, 60, 9.5, 30)]
    #[case(1_000_000.0, 240, 8.25, 82)]
    fn payable_follows_the_unrounded_instalment(
        #[case] amount: f64,
        #[case] tenure: u32,
        #[case] rate: f64,
        #[case] max_drift: i64,
    ) {
        let result = breakdown(amount, tenure, rate);
        let drift = (result.emi * i64::from(tenure) - result.total_payable).abs();
        assert!(drift <= max_drift, "drift {drift} above {max_drift}");
    }

    #[rstest]
    #[case(1e-20)]
    #[case(1e-9)]
    #[case(f64::MIN_POSITIVE)]
    fn vanishing_rate_behaves_like_zero_rate(#[case] rate: f64) {
        assert_eq!(
            emi_preview(Some(100_000.0), Some(12), Some(rate)),
            Some(EmiBreakdown {
                emi: 8333,
                total_interest: 0,
                total_payable: 100_000,
            })
        );
    }

    #[rstest]
    fn preview_is_absent_when_totals_overflow() {
        assert_eq!(emi_preview(Some(f64::MAX), Some(12), Some(12.0)), None);
    }

    #[rstest]
    #[case(None, Some(12), Some(12.0))]
    #[case(Some(100_000.0), None, Some(12.0))]
    #[case(Some(100_000.0), Some(12), None)]
    #[case(Some(0.0), Some(12), Some(12.0))]
    #[case(Some(100_000.0), Some(0), Some(12.0))]
    #[case(Some(100_000.0), Some(12), Some(0.0))]
    #[case(Some(-5.0), Some(12), Some(12.0))]
    fn preview_is_absent_until_computable(
        #[case] amount: Option<f64>,
        #[case] tenure: Option<u32>,
        #[case] rate: Option<f64>,
    ) {
        assert_eq!(emi_preview(amount, tenure, rate), None);
    }

    #[rstest]
    fn preview_delegates_when_complete() {
        assert_eq!(
            emi_preview(Some(100_000.0), Some(12), Some(12.0)),
            Some(breakdown(100_000.0, 12, 12.0))
        );
    }

    #[rstest]
    #[case(f64::NAN, 12, 1.0, TermsError::NonPositiveAmount)]
    #[case(1.0, 0, 1.0, TermsError::ZeroTenure)]
    #[case(1.0, 12, -0.5, TermsError::NegativeRate)]
    fn terms_validation(
        #[case] amount: f64,
        #[case] tenure: u32,
        #[case] rate: f64,
        #[case] expected: TermsError,
    ) {
        assert_eq!(LoanTerms::new(amount, tenure, rate), Err(expected));
    }
}
