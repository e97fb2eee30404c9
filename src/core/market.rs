use serde::Serialize;

use crate::error::{EngineError, EngineResult, require_positive};

const MIN_PRICE_FACTOR: f64 = 0.95;
const MAX_PRICE_FACTOR: f64 = 1.05;
const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, Copy)]
struct MandiQuote {
    mandi: &'static str,
    district: &'static str,
    state: &'static str,
    variety: &'static str,
    modal_price: f64,
    distance_km: f64,
}

const fn quote(
    mandi: &'static str,
    district: &'static str,
    state: &'static str,
    variety: &'static str,
    modal_price: f64,
    distance_km: f64,
) -> MandiQuote {
    MandiQuote {
        mandi,
        district,
        state,
        variety,
        modal_price,
        distance_km,
    }
}

static WHEAT: [MandiQuote; 3] = [
    quote("Azadpur Mandi", "Delhi", "Delhi", "Sharbati", 2200.0, 35.0),
    quote("Karnal Mandi", "Karnal", "Haryana", "HD-2967", 2350.0, 120.0),
    quote("Meerut Mandi", "Meerut", "Uttar Pradesh", "PBW-343", 2180.0, 70.0),
];

static RICE: [MandiQuote; 3] = [
    quote("Karnal Mandi", "Karnal", "Haryana", "Basmati", 3200.0, 60.0),
    quote("Amritsar Mandi", "Amritsar", "Punjab", "Pusa-1121", 3400.0, 95.0),
    quote("Rohtak Mandi", "Rohtak", "Haryana", "PR-126", 3100.0, 25.0),
];

static ONION: [MandiQuote; 3] = [
    quote("Lasalgaon Mandi", "Nashik", "Maharashtra", "Red", 1800.0, 40.0),
    quote("Pimpalgaon Mandi", "Nashik", "Maharashtra", "Red", 1750.0, 22.0),
    quote("Bangalore Mandi", "Bangalore", "Karnataka", "Red", 2000.0, 85.0),
];

static GENERIC: [MandiQuote; 2] = [
    quote("Sample Mandi 1", "District 1", "State 1", "Common", 2000.0, 30.0),
    quote("Sample Mandi 2", "District 2", "State 2", "Common", 2100.0, 60.0),
];

fn quotes_for(crop: &str) -> Option<&'static [MandiQuote]> {
    match crop.trim().to_ascii_lowercase().as_str() {
        "wheat" => Some(&WHEAT),
        "rice" => Some(&RICE),
        "onion" => Some(&ONION),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PriceTrend {
    Rising,
    Stable,
    Falling,
}

#[derive(Debug, Clone, Serialize)]
pub struct MandiPrice {
    pub mandi_name: String,
    pub district: String,
    pub state: String,
    pub crop: String,
    pub variety: String,
    pub min_price: f64,
    pub max_price: f64,
    pub modal_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MandiPriceReport {
    pub crop: String,
    pub prices: Vec<MandiPrice>,
    pub average_price: f64,
    pub price_trend: PriceTrend,
}

/// Price quotes for `crop`. Unknown crops get generic placeholder mandis.
/// The trend is the only non-derived field and is fixed by `seed`.
pub fn mandi_prices(crop: &str, seed: u64) -> MandiPriceReport {
    let quotes = quotes_for(crop).unwrap_or(&GENERIC);
    let prices: Vec<MandiPrice> = quotes
        .iter()
        .map(|q| MandiPrice {
            mandi_name: q.mandi.to_string(),
            district: q.district.to_string(),
            state: q.state.to_string(),
            crop: crop.to_string(),
            variety: q.variety.to_string(),
            min_price: q.modal_price * MIN_PRICE_FACTOR,
            max_price: q.modal_price * MAX_PRICE_FACTOR,
            modal_price: q.modal_price,
        })
        .collect();
    let average_price = if prices.is_empty() {
        0.0
    } else {
        prices.iter().map(|p| p.modal_price).sum::<f64>() / prices.len() as f64
    };

    MandiPriceReport {
        crop: crop.to_string(),
        prices,
        average_price,
        price_trend: price_trend(crop, seed),
    }
}

fn price_trend(crop: &str, seed: u64) -> PriceTrend {
    let mut rng = Rng::new(derive_seed(seed, crop));
    match rng.next_u64() % 3 {
        0 => PriceTrend::Rising,
        1 => PriceTrend::Stable,
        _ => PriceTrend::Falling,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BestMarketQuery<'a> {
    pub crop: &'a str,
    pub quantity_quintals: f64,
    pub transport_cost_per_km: f64,
    pub max_distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketRecommendation {
    pub mandi_name: String,
    pub district: String,
    pub state: String,
    pub price_per_quintal: f64,
    pub distance_km: f64,
    pub transport_cost: f64,
    pub gross_revenue: f64,
    pub net_revenue: f64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestMarketReport {
    pub crop: String,
    pub quantity: f64,
    pub recommendations: Vec<MarketRecommendation>,
    pub best_market: MarketRecommendation,
    pub tips: Vec<String>,
}

pub fn best_market(query: &BestMarketQuery<'_>) -> EngineResult<BestMarketReport> {
    require_positive("quantity_quintals", query.quantity_quintals)?;
    require_positive("max_distance_km", query.max_distance_km)?;
    if !query.transport_cost_per_km.is_finite() || query.transport_cost_per_km < 0.0 {
        return Err(EngineError::invalid("transport_cost_per_km", "must be >= 0"));
    }

    let quotes = quotes_for(query.crop).ok_or_else(|| EngineError::UnsupportedCategory {
        kind: "mandi",
        name: query.crop.to_string(),
    })?;

    let mut recommendations: Vec<MarketRecommendation> = quotes
        .iter()
        .filter(|q| q.distance_km <= query.max_distance_km)
        .map(|q| {
            let transport_cost = q.distance_km * query.transport_cost_per_km;
            let gross_revenue = q.modal_price * query.quantity_quintals;
            let net_revenue = gross_revenue - transport_cost;
            MarketRecommendation {
                mandi_name: q.mandi.to_string(),
                district: q.district.to_string(),
                state: q.state.to_string(),
                price_per_quintal: q.modal_price,
                distance_km: q.distance_km,
                transport_cost,
                gross_revenue,
                net_revenue,
                profit_margin: net_revenue / gross_revenue * 100.0,
            }
        })
        .collect();
    recommendations.sort_by(|a, b| b.net_revenue.total_cmp(&a.net_revenue));
    recommendations.truncate(MAX_RECOMMENDATIONS);

    let best_market = recommendations
        .first()
        .cloned()
        .ok_or_else(|| EngineError::UnsupportedCategory {
            kind: "mandi within distance limit",
            name: query.crop.to_string(),
        })?;

    Ok(BestMarketReport {
        crop: query.crop.to_string(),
        quantity: query.quantity_quintals,
        recommendations,
        best_market,
        tips: [
            "Check mandi prices daily for best rates",
            "Consider selling in batches to average out price fluctuations",
            "Negotiate transport costs for bulk quantities",
            "Verify quality standards before transport",
            "Keep MSP (Minimum Support Price) as reference",
        ]
        .map(String::from)
        .to_vec(),
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MspRate {
    pub crop: &'static str,
    pub msp: f64,
    pub unit: &'static str,
}

pub fn msp_rates() -> Vec<MspRate> {
    [
        ("Paddy (Common)", 2183.0),
        ("Paddy (Grade A)", 2203.0),
        ("Wheat", 2275.0),
        ("Jowar (Hybrid)", 3180.0),
        ("Bajra", 2500.0),
        ("Maize", 2090.0),
        ("Tur (Arhar)", 7000.0),
        ("Moong", 8558.0),
        ("Urad", 6950.0),
        ("Cotton (Medium Staple)", 6620.0),
        ("Groundnut", 6377.0),
        ("Soyabean (Yellow)", 4600.0),
    ]
    .into_iter()
    .map(|(crop, msp)| MspRate {
        crop,
        msp,
        unit: "per quintal",
    })
    .collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CropInfo {
    pub name: &'static str,
    pub season: &'static str,
    pub msp_available: bool,
    pub mandi_data: bool,
}

pub fn supported_crops() -> Vec<CropInfo> {
    [
        ("Wheat", "Rabi", true),
        ("Rice", "Kharif", true),
        ("Onion", "Year-round", false),
        ("Potato", "Rabi", false),
        ("Tomato", "Year-round", false),
        ("Cotton", "Kharif", true),
        ("Sugarcane", "Year-round", true),
    ]
    .into_iter()
    .map(|(name, season, msp_available)| CropInfo {
        name,
        season,
        msp_available,
        mandi_data: quotes_for(name).is_some(),
    })
    .collect()
}

fn derive_seed(base_seed: u64, crop: &str) -> u64 {
    // FNV-1a over the normalized crop name
    let crop_hash = crop
        .trim()
        .to_ascii_lowercase()
        .bytes()
        .fold(0xCBF2_9CE4_8422_2325_u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01B3)
        });
    splitmix64(base_seed ^ crop_hash)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}
