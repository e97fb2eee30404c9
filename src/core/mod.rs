mod budget;
mod growth;
mod inflation;
mod insurance;
mod market;
mod optimize;
mod policy;
mod profile;
mod scenario;
mod tables;
mod tax;
mod types;

pub use budget::{analyze_budget, classify};
pub use growth::compute_growth;
pub use inflation::real_value;
pub use insurance::estimate_insurance;
pub use market::{
    BestMarketQuery, BestMarketReport, CropInfo, MandiPrice, MandiPriceReport,
    MarketRecommendation, MspRate, PriceTrend, best_market, mandi_prices, msp_rates,
    supported_crops,
};
pub use policy::{gst_portion, simulate_gst, simulate_import_duty, simulate_subsidy};
pub use optimize::optimize_budget;
pub use profile::assess_profile;
pub use scenario::{
    DEFAULT_CURRENT_DUTY_PERCENTAGE, DEFAULT_DUTY_CATEGORY, MAX_SCENARIOS, compare_scenarios,
    simulate_sector_subsidy, simulate_tax_rate_change,
};
pub use tables::{
    BudgetBands, DutyTable, EngineTables, GstRates, InsuranceFactors, PpfTerms, SubsidyRates,
    TaxSchedule,
};
pub use tax::{SlabReference, TaxSlabReference, compute_tax, slab_reference};
pub use types::{
    AllocationGuidance, BracketTax, BudgetAnalysis, BudgetBucket, BudgetCategory,
    BudgetOptimization, BudgetStatus, BusinessImpact, ChannelImpact, ConsumerImpact, DutyProfile,
    EconomicEffect, FinancialGoal, FinancialProfile, FuelType, GoalGuidance, GrowthResult,
    GstImpact, HouseholdImpact, IdealBand, ImpactLevel, ImportDutyImpact, IncomeBracket,
    IndustryImpact, InstrumentType, InsuranceInputs, InsuranceRecommendation,
    InvestmentParameters, NamedScenario, NpsPayout, OptimizationStep, PolicyDelta,
    PolicyScenario, ProfileAssessment, RiskLevel, SamplePriceChange, SampleTaxChange,
    ScenarioComparison, ScenarioOutcome, ScenarioResult, SectorSubsidyImpact, SubsidyImpact,
    SubsidyInputs, SubsidySector, TaxBracket, TaxInputs, TaxRateChangeImpact, TaxResult,
    YearlyGrowthPoint,
};
