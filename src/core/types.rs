use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Sip,
    Rd,
    Fd,
    Ppf,
    Nps,
}

impl InstrumentType {
    pub fn label(self) -> &'static str {
        match self {
            InstrumentType::Sip => "SIP",
            InstrumentType::Rd => "RD",
            InstrumentType::Fd => "FD",
            InstrumentType::Ppf => "PPF",
            InstrumentType::Nps => "NPS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvestmentParameters {
    pub instrument: InstrumentType,
    pub monthly_contribution: f64,
    /// Annual nominal rate in percent, e.g. 12 for 12%.
    pub annual_rate: f64,
    pub tenor_years: u32,
    pub age: Option<u32>,
    /// Annual inflation in percent.
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyGrowthPoint {
    pub year: u32,
    pub invested_amount: f64,
    pub corpus_value: f64,
    pub inflation_adjusted_value: f64,
    pub real_returns: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NpsPayout {
    pub lump_sum_withdrawal: f64,
    pub annuity_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthResult {
    pub investment_type: InstrumentType,
    pub total_invested: f64,
    pub final_corpus: f64,
    pub total_returns: f64,
    pub inflation_adjusted_corpus: f64,
    pub real_returns: f64,
    pub yearly_breakdown: Vec<YearlyGrowthPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nps_payout: Option<NpsPayout>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBracket {
    pub lower: f64,
    /// `None` for the open-ended top bracket.
    pub upper: Option<f64>,
    /// Marginal rate as a fraction.
    pub rate: f64,
}

impl TaxBracket {
    pub fn width(&self) -> f64 {
        match self.upper {
            Some(upper) => upper - self.lower,
            None => f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaxInputs {
    pub gross_income: f64,
    pub deductions_80c: f64,
    pub deductions_80d: f64,
    pub other_deductions: f64,
    pub age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketTax {
    pub lower: f64,
    pub upper: f64,
    /// Marginal rate in percent.
    pub rate: f64,
    pub taxable_amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxResult {
    pub gross_income: f64,
    pub total_deductions: f64,
    pub taxable_income: f64,
    pub income_tax: f64,
    pub cess: f64,
    pub total_tax: f64,
    pub net_income: f64,
    pub effective_tax_rate: f64,
    pub tax_breakdown: Vec<BracketTax>,
    pub tax_saving_suggestions: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Good,
    Warning,
    Critical,
}

impl BudgetStatus {
    pub fn weight(self) -> u32 {
        match self {
            BudgetStatus::Good => 100,
            BudgetStatus::Warning => 60,
            BudgetStatus::Critical => 20,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBucket {
    Essential,
    Discretionary,
    Savings,
    Debt,
}

/// Percentages of income; `ideal` sits inside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealBand {
    pub min: f64,
    pub max: f64,
    pub ideal: f64,
}

impl IdealBand {
    pub const fn new(min: f64, max: f64, ideal: f64) -> Self {
        Self { min, max, ideal }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetCategory {
    pub bucket: BudgetBucket,
    pub name: String,
    pub current_amount: f64,
    pub recommended_amount: f64,
    pub percentage_of_income: f64,
    pub recommended_percentage: f64,
    pub status: BudgetStatus,
    pub description: String,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetAnalysis {
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings_rate: f64,
    pub recommended_savings_rate: f64,
    pub categories: Vec<BudgetCategory>,
    pub overall_score: u32,
    pub recommendations: Vec<String>,
    pub emergency_fund_months: f64,
    pub debt_to_income_ratio: f64,
}

/// Before/after comparison shared by every policy calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyDelta {
    pub current: f64,
    pub new: f64,
    pub delta: f64,
    pub monthly_delta: f64,
    pub annual_delta: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GstImpact {
    pub totals: PolicyDelta,
    pub category_wise_impact: BTreeMap<String, PolicyDelta>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubsidyInputs {
    pub monthly_fuel_liters: f64,
    pub fuel: FuelType,
    pub lpg_cylinders: u32,
    pub new_fuel_subsidy: Option<f64>,
    pub new_lpg_subsidy: Option<f64>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubsidyImpact {
    pub totals: PolicyDelta,
    pub fuel: PolicyDelta,
    pub lpg: PolicyDelta,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyProfile {
    pub price_multiplier: f64,
    pub demand_elasticity: f64,
    pub domestic_boost: f64,
}

impl DutyProfile {
    pub const NEUTRAL: DutyProfile = DutyProfile::new(1.0, 0.0, 0.0);

    pub const fn new(price_multiplier: f64, demand_elasticity: f64, domestic_boost: f64) -> Self {
        Self {
            price_multiplier,
            demand_elasticity,
            domestic_boost,
        }
    }
}

/// Coarse three-step rating used for affordability, substitution likelihood
/// and investment attraction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ImpactLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePriceChange {
    pub base_price: f64,
    pub new_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDutyImpact {
    pub product_category: String,
    pub profile_category: &'static str,
    pub current_duty_percentage: f64,
    pub new_duty_percentage: f64,
    pub duty_change_percentage: f64,
    pub price_impact_percentage: f64,
    pub demand_change_percentage: f64,
    pub domestic_production_boost_percentage: f64,
    pub import_volume_change_percentage: f64,
    pub affordability_impact: ImpactLevel,
    pub sample_prices: Vec<SamplePriceChange>,
    pub consumer_impact: ConsumerImpact,
    pub industry_impact: IndustryImpact,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsumerImpact {
    pub price_increase_percentage: f64,
    pub affordability_impact: ImpactLevel,
    pub substitution_likelihood: ImpactLevel,
    /// Capped at 50 and floored at 0.
    pub purchase_delay_probability_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndustryImpact {
    pub domestic_production_boost_percentage: f64,
    pub employment_change_percentage: f64,
    pub investment_attraction: ImpactLevel,
    pub competitiveness_improvement_percentage: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InsuranceInputs {
    pub age: u32,
    pub annual_income: f64,
    pub dependents: u32,
    pub existing_coverage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsuranceRecommendation {
    pub recommended_life_cover: f64,
    pub recommended_health_cover: f64,
    pub estimated_premium: f64,
    pub coverage_gap: f64,
    pub recommendations: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialGoal {
    EmergencyFund,
    HomePurchase,
    Retirement,
    ChildEducation,
    WealthCreation,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub age: u32,
    pub current_savings: f64,
    pub current_investments: f64,
    pub dependents: u32,
    pub risk_level: RiskLevel,
    pub financial_goals: Vec<FinancialGoal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationGuidance {
    pub category: String,
    pub current_allocation: f64,
    pub recommended_allocation: f64,
    pub difference: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileAssessment {
    pub financial_health_score: u32,
    pub savings_rate: f64,
    pub emergency_fund_months: f64,
    pub investment_ratio: f64,
    pub budget_recommendations: Vec<AllocationGuidance>,
    pub savings_suggestions: Vec<String>,
    pub investment_recommendations: Vec<String>,
    pub goal_guidance: Vec<GoalGuidance>,
    pub insurance: InsuranceRecommendation,
    pub warnings: Vec<String>,
    pub action_plan: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalGuidance {
    pub goal: FinancialGoal,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationStep {
    pub category: &'static str,
    pub current: f64,
    pub suggested: f64,
    pub savings: f64,
    pub difficulty: &'static str,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetOptimization {
    pub monthly_income: f64,
    pub current_expenses: f64,
    pub target_expenses: f64,
    pub reduction_needed: f64,
    pub target_savings_rate: f64,
    pub optimization_suggestions: Vec<OptimizationStep>,
    pub total_suggested_savings: f64,
    /// Reduction still missing after every suggested cut; 0 when the target is met.
    pub remaining_gap: f64,
    pub projected_savings_rate: f64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeBracket {
    Low,
    #[default]
    Middle,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleTaxChange {
    pub income: f64,
    pub current_tax: f64,
    pub new_tax: f64,
    pub annual_savings: f64,
    pub monthly_savings: f64,
    pub percentage_change: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum EconomicEffect {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxRateChangeImpact {
    pub policy_type: String,
    pub income_bracket: IncomeBracket,
    pub change_percentage: f64,
    pub current_rate: f64,
    pub new_rate: f64,
    pub impact_analysis: Vec<SampleTaxChange>,
    pub average_annual_savings: f64,
    pub economic_effect: EconomicEffect,
    pub recommendations: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsidySector {
    #[default]
    Fuel,
    Fertilizer,
    Electricity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelImpact {
    pub channel: &'static str,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseholdImpact {
    pub segment: &'static str,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub percentage_of_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BusinessImpact {
    pub segment: &'static str,
    pub cost_change_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorSubsidyImpact {
    pub subsidy_type: String,
    pub sector_profile: SubsidySector,
    pub change_amount: f64,
    pub direct_impact: f64,
    pub indirect_impacts: Vec<ChannelImpact>,
    pub affected_sectors: Vec<&'static str>,
    pub household_impact: Vec<HouseholdImpact>,
    pub business_impact: Vec<BusinessImpact>,
    pub recommendations: Vec<String>,
}

/// One entry of a side-by-side policy comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyScenario {
    Tax {
        #[serde(default)]
        income_bracket: IncomeBracket,
        change_percentage: f64,
    },
    Subsidy {
        #[serde(default)]
        subsidy_type: Option<String>,
        amount_change: f64,
    },
    ImportDuty {
        #[serde(default)]
        category: Option<String>,
        duty_change_percentage: f64,
        #[serde(default)]
        current_duty_percentage: Option<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedScenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub scenario: PolicyScenario,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScenarioOutcome {
    Tax(TaxRateChangeImpact),
    Subsidy(SectorSubsidyImpact),
    ImportDuty(ImportDutyImpact),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_id: usize,
    pub scenario_name: String,
    pub scenario_type: &'static str,
    pub results: ScenarioOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioComparison {
    pub total_scenarios: usize,
    pub scenarios: Vec<ScenarioResult>,
}
