use std::collections::BTreeMap;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, check_range, explained, json_response, required};
use crate::core::{
    DEFAULT_CURRENT_DUTY_PERCENTAGE, DEFAULT_DUTY_CATEGORY, FuelType, IncomeBracket,
    NamedScenario, SubsidyInputs, TaxInputs, compare_scenarios, compute_tax, simulate_gst,
    simulate_import_duty, simulate_sector_subsidy, simulate_subsidy, simulate_tax_rate_change,
    slab_reference,
};
use crate::explain_context;

const DEFAULT_TAX_POLICY_TYPE: &str = "income_tax";
const DEFAULT_SUBSIDY_TYPE: &str = "fuel";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TaxPayload {
    annual_income: Option<f64>,
    age: Option<u32>,
    deductions_80c: Option<f64>,
    deductions_80d: Option<f64>,
    other_deductions: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct GstPayload {
    monthly_expenses: Option<f64>,
    expense_categories: BTreeMap<String, f64>,
    /// New rates as fractions, keyed by category.
    gst_rate_change: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SubsidyPayload {
    monthly_fuel_consumption: Option<f64>,
    fuel_type: Option<FuelType>,
    cooking_gas_cylinders: Option<u32>,
    /// New per-unit subsidy under `fuel` and `lpg`.
    subsidy_change: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ImportDutyPayload {
    category: Option<String>,
    duty_change_percentage: Option<f64>,
    current_duty_percentage: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TaxRateChangePayload {
    policy_type: Option<String>,
    change_percentage: Option<f64>,
    income_bracket: Option<IncomeBracket>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SectorSubsidyPayload {
    subsidy_type: Option<String>,
    amount_change: Option<f64>,
}

fn tax_inputs_from_payload(payload: TaxPayload) -> Result<TaxInputs, ApiError> {
    let gross_income = required(payload.annual_income, "annual_income")?;
    if !gross_income.is_finite() || gross_income <= 0.0 {
        return Err(ApiError::BadRequest("annual_income must be > 0".to_string()));
    }
    Ok(TaxInputs {
        gross_income,
        deductions_80c: payload.deductions_80c.unwrap_or(0.0),
        deductions_80d: payload.deductions_80d.unwrap_or(0.0),
        other_deductions: payload.other_deductions.unwrap_or(0.0),
        age: check_range(required(payload.age, "age")?, "age", 18, 100)?,
    })
}

fn subsidy_inputs_from_payload(payload: SubsidyPayload) -> Result<SubsidyInputs, ApiError> {
    Ok(SubsidyInputs {
        monthly_fuel_liters: required(
            payload.monthly_fuel_consumption,
            "monthly_fuel_consumption",
        )?,
        fuel: required(payload.fuel_type, "fuel_type")?,
        lpg_cylinders: required(payload.cooking_gas_cylinders, "cooking_gas_cylinders")?,
        new_fuel_subsidy: payload.subsidy_change.get("fuel").copied(),
        new_lpg_subsidy: payload.subsidy_change.get("lpg").copied(),
    })
}

pub(super) async fn tax_handler(
    State(state): State<AppState>,
    Json(payload): Json<TaxPayload>,
) -> ApiResult {
    let inputs = tax_inputs_from_payload(payload)?;
    let result = compute_tax(&inputs, &state.tables.tax)?;
    tracing::info!(
        taxable_income = result.taxable_income,
        total_tax = result.total_tax,
        "tax computed"
    );

    let context = explain_context! {
        "annual_income" => inputs.gross_income,
        "taxable_income" => result.taxable_income,
        "total_tax" => result.total_tax,
        "effective_rate" => result.effective_tax_rate,
    };
    let prompt = format!(
        "Explain tax calculation for income ₹{:.0}, taxable income ₹{:.0}, \
         total tax ₹{:.0} ({:.2}% effective rate). Suggest tax-saving strategies.",
        inputs.gross_income, result.taxable_income, result.total_tax, result.effective_tax_rate,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(result, ai_explanation))
}

pub(super) async fn gst_handler(
    State(state): State<AppState>,
    Json(payload): Json<GstPayload>,
) -> ApiResult {
    if let Some(monthly) = payload.monthly_expenses {
        if !monthly.is_finite() || monthly <= 0.0 {
            return Err(ApiError::BadRequest("monthly_expenses must be > 0".to_string()));
        }
    }
    let result = simulate_gst(
        &payload.expense_categories,
        &payload.gst_rate_change,
        &state.tables.gst,
    )?;
    tracing::info!(
        categories = result.category_wise_impact.len(),
        monthly_delta = result.totals.monthly_delta,
        "GST change simulated"
    );

    let context = explain_context! {
        "monthly_expenses" => payload.monthly_expenses,
        "current_burden" => result.totals.current,
        "new_burden" => result.totals.new,
        "monthly_impact" => result.totals.monthly_delta,
    };
    let prompt = format!(
        "Explain GST impact: Current burden ₹{:.0}, New burden ₹{:.0}, \
         Monthly impact ₹{:.0}. How does this affect household budget?",
        result.totals.current, result.totals.new, result.totals.monthly_delta,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(result, ai_explanation))
}

pub(super) async fn subsidy_handler(
    State(state): State<AppState>,
    Json(payload): Json<SubsidyPayload>,
) -> ApiResult {
    let inputs = subsidy_inputs_from_payload(payload)?;
    let result = simulate_subsidy(&inputs, &state.tables.subsidy)?;
    tracing::info!(
        monthly_delta = result.totals.monthly_delta,
        "subsidy change simulated"
    );

    let context = explain_context! {
        "fuel_consumption" => inputs.monthly_fuel_liters,
        "lpg_cylinders" => inputs.lpg_cylinders,
        "monthly_impact" => result.totals.monthly_delta,
    };
    let prompt = format!(
        "Explain subsidy change impact: Fuel impact ₹{:.0}, LPG impact ₹{:.0}, \
         Total monthly impact ₹{:.0}",
        result.fuel.delta, result.lpg.delta, result.totals.monthly_delta,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(result, ai_explanation))
}

pub(super) async fn import_duty_handler(
    State(state): State<AppState>,
    Json(payload): Json<ImportDutyPayload>,
) -> ApiResult {
    let category = payload
        .category
        .unwrap_or_else(|| DEFAULT_DUTY_CATEGORY.to_string());
    let change = required(payload.duty_change_percentage, "duty_change_percentage")?;
    let current = payload
        .current_duty_percentage
        .unwrap_or(DEFAULT_CURRENT_DUTY_PERCENTAGE);

    let result = simulate_import_duty(&category, change, current, &state.tables.duty)?;
    tracing::info!(
        category = %category,
        profile = result.profile_category,
        price_impact = result.price_impact_percentage,
        "import duty change simulated"
    );

    let context = explain_context! {
        "category" => category,
        "duty_change" => change,
        "price_impact" => result.price_impact_percentage,
        "demand_change" => result.demand_change_percentage,
    };
    let prompt = format!(
        "Explain how a {change:+.1} point import duty change on {category} moves consumer prices \
         by {:.1}% and demand by {:.1}%. What should Indian households expect?",
        result.price_impact_percentage, result.demand_change_percentage,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(result, ai_explanation))
}

pub(super) async fn tax_rate_change_handler(
    Json(payload): Json<TaxRateChangePayload>,
) -> ApiResult {
    let policy_type = payload
        .policy_type
        .unwrap_or_else(|| DEFAULT_TAX_POLICY_TYPE.to_string());
    let bracket = payload.income_bracket.unwrap_or_default();
    let change = required(payload.change_percentage, "change_percentage")?;

    let impact = simulate_tax_rate_change(&policy_type, bracket, change)?;
    tracing::info!(
        bracket = bracket.label(),
        new_rate = impact.new_rate,
        average_annual_savings = impact.average_annual_savings,
        "tax rate change simulated"
    );
    Ok(json_response(StatusCode::OK, impact))
}

pub(super) async fn sector_subsidy_handler(
    Json(payload): Json<SectorSubsidyPayload>,
) -> ApiResult {
    let subsidy_type = payload
        .subsidy_type
        .unwrap_or_else(|| DEFAULT_SUBSIDY_TYPE.to_string());
    let change = required(payload.amount_change, "amount_change")?;

    let impact = simulate_sector_subsidy(&subsidy_type, change)?;
    tracing::info!(
        subsidy_type = %subsidy_type,
        sector = ?impact.sector_profile,
        "sector subsidy change simulated"
    );
    Ok(json_response(StatusCode::OK, impact))
}

pub(super) async fn compare_handler(
    State(state): State<AppState>,
    Json(scenarios): Json<Vec<NamedScenario>>,
) -> ApiResult {
    let comparison = compare_scenarios(&scenarios, &state.tables.duty)?;
    tracing::info!(
        scenarios = comparison.total_scenarios,
        "policy scenarios compared"
    );
    Ok(json_response(StatusCode::OK, comparison))
}

pub(super) async fn tax_slabs_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, slab_reference(&state.tables.tax))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_deductions_default_to_zero() {
        let inputs = tax_inputs_from_payload(
            serde_json::from_str(r#"{"annual_income":500000,"age":30}"#)
                .expect("valid payload json"),
        )
        .expect("valid");
        assert_eq!(inputs.deductions_80c, 0.0);
        assert_eq!(inputs.deductions_80d, 0.0);
        assert_eq!(inputs.other_deductions, 0.0);
    }

    #[test]
    fn tax_requires_positive_income() {
        let err = tax_inputs_from_payload(
            serde_json::from_str(r#"{"annual_income":0,"age":30}"#).expect("valid payload json"),
        )
        .expect_err("zero income");
        assert_eq!(err.to_string(), "annual_income must be > 0");
    }

    #[test]
    fn subsidy_change_keys_map_to_optional_overrides() {
        let inputs = subsidy_inputs_from_payload(
            serde_json::from_str(
                r#"{"monthly_fuel_consumption":30,"fuel_type":"petrol",
                    "cooking_gas_cylinders":2,"subsidy_change":{"lpg":250}}"#,
            )
            .expect("valid payload json"),
        )
        .expect("valid");
        assert_eq!(inputs.fuel, FuelType::Petrol);
        assert_eq!(inputs.new_fuel_subsidy, None);
        assert_eq!(inputs.new_lpg_subsidy, Some(250.0));
    }

    #[test]
    fn tax_rate_change_defaults_to_middle_bracket() {
        let payload: TaxRateChangePayload =
            serde_json::from_str(r#"{"change_percentage":-2}"#).expect("valid payload json");
        assert_eq!(payload.income_bracket.unwrap_or_default(), IncomeBracket::Middle);
        assert_eq!(payload.policy_type, None);

        let payload: TaxRateChangePayload =
            serde_json::from_str(r#"{"change_percentage":3,"income_bracket":"high"}"#)
                .expect("valid payload json");
        assert_eq!(payload.income_bracket, Some(IncomeBracket::High));
    }

    #[test]
    fn subsidy_requires_fuel_type() {
        let err = subsidy_inputs_from_payload(
            serde_json::from_str(r#"{"monthly_fuel_consumption":30,"cooking_gas_cylinders":1}"#)
                .expect("valid payload json"),
        )
        .expect_err("missing fuel type");
        assert_eq!(err.to_string(), "fuel_type is required");
    }
}
