use std::collections::BTreeMap;

use super::tables::BudgetBands;
use super::types::{BudgetAnalysis, BudgetBucket, BudgetCategory, BudgetStatus, IdealBand};
use crate::error::{EngineError, EngineResult, require_positive};

const ESSENTIAL_KEYS: [&str; 4] = ["rent", "food", "utilities", "transportation"];
const DISCRETIONARY_KEYS: [&str; 3] = ["entertainment", "dining", "shopping"];
const DEBT_KEYS: [&str; 2] = ["loan_payments", "credit_card"];
const SAVINGS_KEYS: [&str; 2] = ["savings", "investments"];

#[derive(Debug, Clone, Copy)]
struct BucketTotals {
    essential: f64,
    discretionary: f64,
    debt: f64,
    savings: f64,
}

impl BucketTotals {
    fn from_expenses(expenses: &BTreeMap<String, f64>) -> Self {
        let sum = |keys: &[&str]| -> f64 {
            keys.iter()
                .filter_map(|key| expenses.get(*key))
                .sum()
        };
        Self {
            essential: sum(&ESSENTIAL_KEYS),
            discretionary: sum(&DISCRETIONARY_KEYS),
            debt: sum(&DEBT_KEYS),
            savings: sum(&SAVINGS_KEYS),
        }
    }
}

pub fn analyze_budget(
    income: f64,
    expenses: &BTreeMap<String, f64>,
    bands: &BudgetBands,
) -> EngineResult<BudgetAnalysis> {
    require_positive("income", income)?;
    if expenses.values().any(|amount| !amount.is_finite() || *amount < 0.0) {
        return Err(EngineError::invalid("expenses", "amounts must be >= 0"));
    }

    let totals = BucketTotals::from_expenses(expenses);
    let total_expenses: f64 = expenses.values().sum();
    let savings_rate = percent_of(income - total_expenses, income);

    let mut categories = vec![
        categorize(BudgetBucket::Essential, totals.essential, income, bands),
        categorize(BudgetBucket::Discretionary, totals.discretionary, income, bands),
        categorize(BudgetBucket::Savings, totals.savings, income, bands),
    ];
    if totals.debt > 0.0 {
        categories.push(categorize(BudgetBucket::Debt, totals.debt, income, bands));
    }

    let overall_score = overall_score(&categories);
    let recommendations = recommendations(&categories, savings_rate, income);
    let emergency_fund_months = if totals.essential > 0.0 {
        totals.savings / totals.essential
    } else {
        0.0
    };

    Ok(BudgetAnalysis {
        total_income: income,
        total_expenses,
        savings_rate,
        recommended_savings_rate: bands.savings.ideal,
        categories,
        overall_score,
        recommendations,
        emergency_fund_months,
        debt_to_income_ratio: percent_of(totals.debt, income),
    })
}

/// Multiplying first keeps round inputs like 55_000 of 100_000 exactly on 55.
fn percent_of(amount: f64, income: f64) -> f64 {
    amount * 100.0 / income
}

/// Values under `band.min` go straight to critical; only overshoot gets a
/// warning tier.
pub fn classify(percentage: f64, band: IdealBand, warning_margin: f64) -> BudgetStatus {
    if percentage >= band.min && percentage <= band.max {
        BudgetStatus::Good
    } else if percentage > band.max && percentage <= band.max + warning_margin {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Critical
    }
}

fn band_for(bucket: BudgetBucket, bands: &BudgetBands) -> IdealBand {
    match bucket {
        BudgetBucket::Essential => bands.essential,
        BudgetBucket::Discretionary => bands.discretionary,
        BudgetBucket::Savings => bands.savings,
        BudgetBucket::Debt => bands.debt,
    }
}

fn categorize(
    bucket: BudgetBucket,
    amount: f64,
    income: f64,
    bands: &BudgetBands,
) -> BudgetCategory {
    let band = band_for(bucket, bands);
    let percentage = percent_of(amount, income);
    let status = classify(percentage, band, bands.warning_margin);
    let (name, description) = match bucket {
        BudgetBucket::Essential => (
            "Essential Expenses (Rent, Food, Utilities, Transport)",
            "Keep essential expenses under 55% of income for better financial flexibility",
        ),
        BudgetBucket::Discretionary => (
            "Discretionary Spending (Entertainment, Dining, Shopping)",
            "Limit discretionary spending to 25% for better financial health",
        ),
        BudgetBucket::Savings => (
            "Savings & Investments",
            "Aim to save at least 20% of your income for long-term financial security",
        ),
        BudgetBucket::Debt => (
            "Debt Payments",
            "Keep debt payments under 10% of income to maintain financial health",
        ),
    };

    BudgetCategory {
        bucket,
        name: name.to_string(),
        current_amount: amount,
        recommended_amount: income * band.ideal / 100.0,
        percentage_of_income: percentage,
        recommended_percentage: band.ideal,
        status,
        description: description.to_string(),
        tips: tips(bucket, status),
    }
}

fn overall_score(categories: &[BudgetCategory]) -> u32 {
    if categories.is_empty() {
        return 0;
    }
    let total: u32 = categories.iter().map(|c| c.status.weight()).sum();
    total / categories.len() as u32
}

fn tips(bucket: BudgetBucket, status: BudgetStatus) -> Vec<String> {
    use BudgetBucket::*;
    use BudgetStatus::*;

    let tips: &[&str] = match (bucket, status) {
        (Essential, Good) => &[
            "Great job keeping essential expenses in check!",
            "Consider negotiating better rates for utilities and insurance",
            "Look for ways to optimize transportation costs",
        ],
        (Essential, Warning) => &[
            "Essential expenses are slightly high - look for cost-cutting opportunities",
            "Consider moving to a more affordable location if possible",
            "Review and optimize your grocery and utility bills",
            "Use public transportation or carpooling to reduce transport costs",
        ],
        (Essential, Critical) => &[
            "Essential expenses are too high - immediate action needed",
            "Consider downsizing housing or finding roommates",
            "Switch to a more affordable mobile and internet plan",
            "Cook at home more often to reduce food costs",
            "Review all subscriptions and cancel unnecessary ones",
        ],
        (Discretionary, Good) => &[
            "Good balance on discretionary spending!",
            "Consider using cashback apps for entertainment purchases",
            "Set monthly limits for dining out and stick to them",
        ],
        (Discretionary, Warning) => &[
            "Discretionary spending is a bit high - time to cut back",
            "Try the 24-hour rule before making non-essential purchases",
            "Look for free or low-cost entertainment alternatives",
            "Set a weekly dining out budget and track it",
        ],
        (Discretionary, Critical) => &[
            "Discretionary spending is way too high - major cuts needed",
            "Implement a strict entertainment budget",
            "Cook at home instead of dining out",
            "Find free activities like hiking, reading, or community events",
            "Cancel non-essential subscriptions immediately",
        ],
        (Savings, Good) => &[
            "Excellent savings rate! Keep it up!",
            "Consider diversifying your investment portfolio",
            "Look into tax-saving investments like ELSS and PPF",
            "Automate your savings to maintain consistency",
        ],
        (Savings, Warning) => &[
            "Savings rate needs improvement - aim for at least 20%",
            "Start with automating 10% savings and gradually increase",
            "Consider starting a SIP in mutual funds",
            "Build an emergency fund of 6 months expenses first",
        ],
        (Savings, Critical) => &[
            "Critical: You need to start saving immediately",
            "Begin with saving just ₹1000 per month and increase gradually",
            "Open a separate savings account for emergency fund",
            "Consider taking a financial literacy course",
            "Review and cut unnecessary expenses to free up money for savings",
        ],
        (Debt, Good) => &[
            "Debt levels are manageable",
            "Consider paying extra towards high-interest debt",
            "Maintain good credit score by paying on time",
        ],
        (Debt, Warning) => &[
            "Debt payments are getting high - focus on reduction",
            "Pay more than minimum on credit cards",
            "Consider debt consolidation if beneficial",
            "Avoid taking on new debt",
        ],
        (Debt, Critical) => &[
            "Debt levels are critical - immediate action required",
            "Stop using credit cards for new purchases",
            "Consider debt counseling services",
            "Focus on paying off highest interest debt first",
            "Look into debt consolidation options",
        ],
    };
    tips.iter().map(|tip| tip.to_string()).collect()
}

fn recommendations(categories: &[BudgetCategory], savings_rate: f64, income: f64) -> Vec<String> {
    let mut out = Vec::new();

    let critical: Vec<&BudgetCategory> = categories
        .iter()
        .filter(|c| c.status == BudgetStatus::Critical)
        .collect();
    if !critical.is_empty() {
        out.push("Immediate Action Required: Address critical budget categories first".to_string());
        for category in critical {
            let line = match category.bucket {
                BudgetBucket::Essential => Some("• Reduce housing and essential costs immediately"),
                BudgetBucket::Discretionary => {
                    Some("• Cut all non-essential spending until budget is balanced")
                }
                BudgetBucket::Savings => {
                    Some("• Start emergency savings even if it's just ₹500/month")
                }
                BudgetBucket::Debt => None,
            };
            if let Some(line) = line {
                out.push(line.to_string());
            }
        }
    }

    if categories.iter().any(|c| c.status == BudgetStatus::Warning) {
        out.push("Attention Needed: Optimize these areas for better financial health".to_string());
    }

    out.push(
        if savings_rate < 10.0 {
            "Priority: Build emergency fund of 3-6 months expenses"
        } else if savings_rate < 20.0 {
            "Goal: Increase savings rate to 20% for long-term wealth building"
        } else {
            "Excellent: Consider advanced investment strategies for wealth growth"
        }
        .to_string(),
    );

    if income < 50_000.0 {
        out.push("Focus on skill development to increase earning potential".to_string());
    } else if income > 100_000.0 {
        out.push("Consider tax-saving investments and wealth management strategies".to_string());
    }

    out
}
