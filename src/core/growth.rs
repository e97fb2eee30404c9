use super::inflation::real_value;
use super::tables::EngineTables;
use super::types::{
    GrowthResult, InstrumentType, InvestmentParameters, NpsPayout, YearlyGrowthPoint,
};
use crate::error::{EngineError, EngineResult, require_positive};

const NPS_LUMP_SUM_SHARE: f64 = 0.6;
/// Longest horizon the engines will expand month by month.
pub const MAX_TENOR_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy)]
struct Maturity {
    total_invested: f64,
    final_corpus: f64,
    nps_payout: Option<NpsPayout>,
}

pub fn compute_growth(
    params: &InvestmentParameters,
    tables: &EngineTables,
) -> EngineResult<GrowthResult> {
    validate(params)?;

    let maturity = match params.instrument {
        InstrumentType::Sip => sip_maturity(params),
        InstrumentType::Rd => rd_maturity(params),
        InstrumentType::Fd => fd_maturity(params),
        InstrumentType::Ppf => ppf_maturity(params, tables),
        InstrumentType::Nps => nps_maturity(params),
    };

    let inflation_adjusted_corpus =
        real_value(maturity.final_corpus, params.inflation_rate, params.tenor_years);

    Ok(GrowthResult {
        investment_type: params.instrument,
        total_invested: maturity.total_invested,
        final_corpus: maturity.final_corpus,
        total_returns: maturity.final_corpus - maturity.total_invested,
        inflation_adjusted_corpus,
        real_returns: inflation_adjusted_corpus - maturity.total_invested,
        yearly_breakdown: yearly_breakdown(params),
        nps_payout: maturity.nps_payout,
        recommendations: recommendations(params.instrument),
    })
}

fn validate(params: &InvestmentParameters) -> EngineResult<()> {
    require_positive("monthly_amount", params.monthly_contribution)?;
    require_positive("annual_return_rate", params.annual_rate)?;
    if params.tenor_years == 0 {
        return Err(EngineError::invalid("investment_period_years", "must be > 0"));
    }
    // Every monthly helper multiplies the tenor by 12 and feeds the result to `powi`.
    let months = params.tenor_years.checked_mul(12);
    if params.tenor_years > MAX_TENOR_YEARS || months.is_none_or(|m| m > i32::MAX as u32) {
        return Err(EngineError::invalid(
            "investment_period_years",
            "must be <= 100",
        ));
    }
    if !params.inflation_rate.is_finite() || params.inflation_rate <= -100.0 {
        return Err(EngineError::invalid("inflation_rate", "must be > -100"));
    }
    Ok(())
}

fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 1200.0
}

/// Future value of `months` deposits made at the start of each month.
fn annuity_due(contribution: f64, rate: f64, months: u32) -> f64 {
    if rate == 0.0 {
        return contribution * months as f64;
    }
    ordinary_annuity(contribution, rate, months) * (1.0 + rate)
}

/// Future value of `months` deposits made at the end of each month.
fn ordinary_annuity(contribution: f64, rate: f64, months: u32) -> f64 {
    if rate == 0.0 {
        return contribution * months as f64;
    }
    contribution * (((1.0 + rate).powi(months as i32) - 1.0) / rate)
}

fn sip_maturity(params: &InvestmentParameters) -> Maturity {
    let months = params.tenor_years * 12;
    Maturity {
        total_invested: params.monthly_contribution * months as f64,
        final_corpus: annuity_due(
            params.monthly_contribution,
            monthly_rate(params.annual_rate),
            months,
        ),
        nps_payout: None,
    }
}

fn rd_maturity(params: &InvestmentParameters) -> Maturity {
    let months = params.tenor_years * 12;
    let quarterly_growth = 1.0 + params.annual_rate / 400.0;
    let final_corpus = (1..=months)
        .map(|month| {
            let quarters_remaining = (months - month) as f64 / 3.0;
            params.monthly_contribution * quarterly_growth.powf(quarters_remaining)
        })
        .sum();
    Maturity {
        total_invested: params.monthly_contribution * months as f64,
        final_corpus,
        nps_payout: None,
    }
}

fn fd_maturity(params: &InvestmentParameters) -> Maturity {
    let principal = params.monthly_contribution * 12.0;
    let rate = params.annual_rate / 100.0;
    Maturity {
        total_invested: principal * params.tenor_years as f64,
        final_corpus: principal * (1.0 + rate).powi(params.tenor_years as i32),
        nps_payout: None,
    }
}

fn ppf_maturity(params: &InvestmentParameters, tables: &EngineTables) -> Maturity {
    let annual_contribution = params.monthly_contribution * 12.0;
    let growth = 1.0 + tables.ppf.annual_rate_percent / 100.0;
    let years = params.tenor_years.min(tables.ppf.max_years);

    let final_corpus =
        (0..years).fold(0.0, |balance, _| (balance + annual_contribution) * growth);
    Maturity {
        total_invested: annual_contribution * years as f64,
        final_corpus,
        nps_payout: None,
    }
}

fn nps_maturity(params: &InvestmentParameters) -> Maturity {
    let months = params.tenor_years * 12;
    let corpus = ordinary_annuity(
        params.monthly_contribution,
        monthly_rate(params.annual_rate),
        months,
    );
    Maturity {
        total_invested: params.monthly_contribution * months as f64,
        final_corpus: corpus,
        nps_payout: Some(NpsPayout {
            lump_sum_withdrawal: corpus * NPS_LUMP_SUM_SHARE,
            annuity_amount: corpus * (1.0 - NPS_LUMP_SUM_SHARE),
        }),
    }
}

/// Year-end snapshots. SIP is exact; every other instrument uses the coarse
/// `invested * (1 + r)^year` approximation.
fn yearly_breakdown(params: &InvestmentParameters) -> Vec<YearlyGrowthPoint> {
    let rate = monthly_rate(params.annual_rate);
    let annual_growth = 1.0 + params.annual_rate / 100.0;

    (1..=params.tenor_years)
        .map(|year| {
            let months = year * 12;
            let invested_amount = params.monthly_contribution * months as f64;
            let corpus_value = match params.instrument {
                InstrumentType::Sip => annuity_due(params.monthly_contribution, rate, months),
                InstrumentType::Rd
                | InstrumentType::Fd
                | InstrumentType::Ppf
                | InstrumentType::Nps => invested_amount * annual_growth.powi(year as i32),
            };
            let inflation_adjusted_value = real_value(corpus_value, params.inflation_rate, year);
            YearlyGrowthPoint {
                year,
                invested_amount,
                corpus_value,
                inflation_adjusted_value,
                real_returns: inflation_adjusted_value - invested_amount,
            }
        })
        .collect()
}

fn recommendations(instrument: InstrumentType) -> Vec<String> {
    let tips: &[&str] = match instrument {
        InstrumentType::Sip => &[
            "Consider increasing SIP amount by 10% annually",
            "Diversify across large-cap, mid-cap, and international funds",
            "Review and rebalance portfolio every 6 months",
        ],
        InstrumentType::Ppf => &[
            "PPF has 15-year lock-in period with tax benefits",
            "Maximum investment limit is ₹1.5 lakh per year",
            "Consider additional investments for higher returns",
        ],
        InstrumentType::Nps => &[
            "NPS offers additional tax deduction under 80CCD(1B)",
            "Choose active choice for better returns",
            "Review asset allocation based on age",
        ],
        InstrumentType::Rd | InstrumentType::Fd => &[],
    };
    tips.iter().map(|tip| tip.to_string()).collect()
}
