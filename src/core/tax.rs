use serde::Serialize;

use super::tables::TaxSchedule;
use super::types::{BracketTax, TaxInputs, TaxResult};
use crate::error::{EngineResult, require_non_negative};

const ASSUMED_SAVING_RATE: f64 = 0.2;

/// Progressive slab tax over `schedule`. Age is carried through but does not
/// select a different schedule.
pub fn compute_tax(inputs: &TaxInputs, schedule: &TaxSchedule) -> EngineResult<TaxResult> {
    schedule.validate()?;
    require_non_negative("annual_income", inputs.gross_income)?;
    require_non_negative("deductions_80c", inputs.deductions_80c)?;
    require_non_negative("deductions_80d", inputs.deductions_80d)?;
    require_non_negative("other_deductions", inputs.other_deductions)?;

    let total_deductions = inputs.deductions_80c.min(schedule.section_80c_cap)
        + inputs.deductions_80d
        + inputs.other_deductions;
    let taxable_income = (inputs.gross_income - total_deductions).max(0.0);

    let (income_tax, tax_breakdown) = walk_brackets(taxable_income, schedule);
    let cess = income_tax * schedule.cess_rate;
    let total_tax = income_tax + cess;
    let effective_tax_rate = if inputs.gross_income > 0.0 {
        total_tax / inputs.gross_income * 100.0
    } else {
        0.0
    };

    Ok(TaxResult {
        gross_income: inputs.gross_income,
        total_deductions,
        taxable_income,
        income_tax,
        cess,
        total_tax,
        net_income: inputs.gross_income - total_tax,
        effective_tax_rate,
        tax_breakdown,
        tax_saving_suggestions: saving_suggestions(inputs, schedule),
    })
}

fn walk_brackets(taxable_income: f64, schedule: &TaxSchedule) -> (f64, Vec<BracketTax>) {
    let mut remaining = taxable_income;
    let mut income_tax = 0.0;
    let mut rows = Vec::new();

    for bracket in &schedule.brackets {
        if remaining <= 0.0 {
            break;
        }
        let in_slab = remaining.min(bracket.width());
        let tax = in_slab * bracket.rate;
        income_tax += tax;
        if in_slab > 0.0 {
            rows.push(BracketTax {
                lower: bracket.lower,
                upper: bracket.lower + in_slab,
                rate: bracket.rate * 100.0,
                taxable_amount: in_slab,
                tax,
            });
        }
        remaining -= in_slab;
    }

    (income_tax, rows)
}

fn saving_suggestions(inputs: &TaxInputs, schedule: &TaxSchedule) -> Vec<String> {
    let mut suggestions = Vec::new();
    if inputs.deductions_80c < schedule.section_80c_cap {
        let headroom = schedule.section_80c_cap - inputs.deductions_80c;
        suggestions.push(format!(
            "Invest ₹{headroom:.0} more in 80C to save ₹{:.0} tax",
            headroom * ASSUMED_SAVING_RATE
        ));
    }
    if inputs.deductions_80d < schedule.section_80d_hint {
        suggestions.push("Consider health insurance for 80D deductions".to_string());
    }
    suggestions.extend(
        [
            "Invest in NPS for additional 80CCD(1B) deduction of ₹50,000",
            "Consider HRA exemption if paying rent",
            "Claim LTA for travel expenses",
        ]
        .map(String::from),
    );
    suggestions
}

#[derive(Debug, Clone, Serialize)]
pub struct SlabReference {
    pub slab: String,
    pub rate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxSlabReference {
    pub regime: &'static str,
    pub slabs: Vec<SlabReference>,
    pub cess: String,
    pub standard_deduction: f64,
    pub section_80c_limit: f64,
    pub section_80d_limit: f64,
}

/// Human-readable view of the active schedule.
pub fn slab_reference(schedule: &TaxSchedule) -> TaxSlabReference {
    let slabs = schedule
        .brackets
        .iter()
        .map(|bracket| {
            let slab = match bracket.upper {
                Some(upper) if bracket.lower == 0.0 => format!("Up to ₹{upper:.0}"),
                Some(upper) => format!("₹{:.0} to ₹{upper:.0}", bracket.lower + 1.0),
                None => format!("Above ₹{:.0}", bracket.lower),
            };
            SlabReference {
                slab,
                rate: format!("{:.0}%", bracket.rate * 100.0),
            }
        })
        .collect();

    TaxSlabReference {
        regime: "new",
        slabs,
        cess: format!("{:.0}% on income tax", schedule.cess_rate * 100.0),
        standard_deduction: schedule.standard_deduction,
        section_80c_limit: schedule.section_80c_cap,
        section_80d_limit: schedule.section_80d_hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn inputs(gross: f64, d80c: f64, d80d: f64, other: f64) -> TaxInputs {
        TaxInputs {
            gross_income: gross,
            deductions_80c: d80c,
            deductions_80d: d80d,
            other_deductions: other,
            age: 35,
        }
    }

    #[test]
    fn oracle_eight_lakh_with_deductions() {
        let result = compute_tax(
            &inputs(800_000.0, 150_000.0, 25_000.0, 0.0),
            &TaxSchedule::default(),
        )
        .expect("valid inputs");

        assert_approx(result.total_deductions, 175_000.0);
        assert_approx(result.taxable_income, 625_000.0);
        assert_eq!(result.tax_breakdown.len(), 3);
        assert_approx(result.tax_breakdown[0].taxable_amount, 300_000.0);
        assert_approx(result.tax_breakdown[0].tax, 0.0);
        assert_approx(result.tax_breakdown[1].taxable_amount, 300_000.0);
        assert_approx(result.tax_breakdown[1].tax, 15_000.0);
        assert_approx(result.tax_breakdown[2].taxable_amount, 25_000.0);
        assert_approx(result.tax_breakdown[2].tax, 2_500.0);
        assert_approx(result.tax_breakdown[2].upper, 625_000.0);
        assert_approx(result.income_tax, 17_500.0);
        assert_approx(result.cess, 700.0);
        assert_approx(result.total_tax, 18_200.0);
        assert_approx(result.net_income, 800_000.0 - 18_200.0);
        assert_approx(result.effective_tax_rate, 18_200.0 / 800_000.0 * 100.0);
    }

    #[test]
    fn section_80c_is_capped() {
        let schedule = TaxSchedule::default();
        let capped = compute_tax(&inputs(1_000_000.0, 150_000.0, 0.0, 0.0), &schedule)
            .expect("valid inputs");
        let over = compute_tax(&inputs(1_000_000.0, 200_000.0, 0.0, 0.0), &schedule)
            .expect("valid inputs");
        assert_approx(over.total_deductions, capped.total_deductions);
        assert_approx(over.taxable_income, capped.taxable_income);
        assert_approx(over.total_tax, capped.total_tax);
    }

    #[test]
    fn deductions_above_income_floor_taxable_at_zero() {
        let result = compute_tax(
            &inputs(100_000.0, 150_000.0, 0.0, 0.0),
            &TaxSchedule::default(),
        )
        .expect("valid inputs");
        assert_approx(result.taxable_income, 0.0);
        assert_approx(result.total_tax, 0.0);
        assert!(result.tax_breakdown.is_empty());
    }

    #[test]
    fn top_bracket_is_unbounded() {
        let result = compute_tax(&inputs(2_500_000.0, 0.0, 0.0, 0.0), &TaxSchedule::default())
            .expect("valid inputs");
        assert_eq!(result.tax_breakdown.len(), 6);
        let top = result.tax_breakdown[5];
        assert_approx(top.taxable_amount, 1_000_000.0);
        assert_approx(top.tax, 300_000.0);
        assert_approx(result.income_tax, 15_000.0 + 30_000.0 + 45_000.0 + 60_000.0 + 300_000.0);
    }

    #[test]
    fn zero_income_has_zero_effective_rate() {
        let result =
            compute_tax(&inputs(0.0, 0.0, 0.0, 0.0), &TaxSchedule::default()).expect("valid");
        assert_approx(result.effective_tax_rate, 0.0);
    }

    #[test]
    fn negative_income_is_rejected() {
        let err = compute_tax(&inputs(-1.0, 0.0, 0.0, 0.0), &TaxSchedule::default())
            .expect_err("negative income");
        assert!(err.to_string().contains("annual_income"));
    }

    #[test]
    fn suggestions_mention_unused_80c_headroom() {
        let result = compute_tax(
            &inputs(900_000.0, 100_000.0, 30_000.0, 0.0),
            &TaxSchedule::default(),
        )
        .expect("valid inputs");
        assert!(result.tax_saving_suggestions[0].contains("₹50000"));
        assert!(result.tax_saving_suggestions[0].contains("₹10000"));
        assert!(
            !result
                .tax_saving_suggestions
                .iter()
                .any(|s| s.contains("80D"))
        );
    }

    #[test]
    fn alternate_schedule_can_be_injected() {
        let mut schedule = TaxSchedule::default();
        for bracket in &mut schedule.brackets {
            bracket.rate = 0.10;
        }
        let result = compute_tax(&inputs(500_000.0, 0.0, 0.0, 0.0), &schedule).expect("valid");
        assert_approx(result.income_tax, 50_000.0);
    }

    #[test]
    fn gapped_schedule_is_refused_before_any_tax_is_computed() {
        let mut schedule = TaxSchedule::default();
        schedule.brackets[1].upper = Some(250_000.0);
        let err = compute_tax(&inputs(500_000.0, 0.0, 0.0, 0.0), &schedule)
            .expect_err("inverted bracket");
        assert!(matches!(
            err,
            crate::error::EngineError::InvalidParameter {
                field: "tax_schedule",
                ..
            }
        ));
    }

    #[test]
    fn slab_reference_lists_every_bracket() {
        let reference = slab_reference(&TaxSchedule::default());
        assert_eq!(reference.slabs.len(), 6);
        assert_eq!(reference.slabs[0].slab, "Up to ₹300000");
        assert_eq!(reference.slabs[5].slab, "Above ₹1500000");
        assert_eq!(reference.slabs[5].rate, "30%");
        assert_eq!(reference.cess, "4% on income tax");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_breakdown_sums_to_totals(
            gross in 0u32..5_000_000,
            d80c in 0u32..300_000,
            d80d in 0u32..100_000,
        ) {
            let result = compute_tax(
                &inputs(gross as f64, d80c as f64, d80d as f64, 0.0),
                &TaxSchedule::default(),
            ).expect("valid inputs");

            let slab_income: f64 = result.tax_breakdown.iter().map(|row| row.taxable_amount).sum();
            let slab_tax: f64 = result.tax_breakdown.iter().map(|row| row.tax).sum();
            prop_assert!((slab_income - result.taxable_income).abs() <= 1e-6);
            prop_assert!((slab_tax - result.income_tax).abs() <= 1e-6);
            prop_assert!(result.tax_breakdown.iter().all(|row| row.taxable_amount > 0.0));
            prop_assert!(result.total_tax <= result.gross_income * 0.312 + 1e-6);
        }
    }
}
