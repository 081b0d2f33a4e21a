//! Yahoo Finance option chain fetcher
//!
//! Uses Yahoo Finance's unofficial options endpoint. One blocking request per
//! expiration date; no caching and no retries.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::error::{ListError, ListResult};

/// One row of an option chain.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    pub contract_symbol: String,
    pub strike: f64,
    pub in_the_money: bool,
    /// Fraction, 0.25 means 25%
    pub implied_volatility: Option<f64>,
    pub volume: Option<i64>,
    pub open_interest: Option<i64>,
    pub expiration: Option<NaiveDate>,
}

/// Calls and puts for a single expiration date.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChain {
    pub expiration: NaiveDate,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

/// Anything that can hand out option chains for a ticker.
pub trait ChainSource {
    /// Available expiration dates in the order the provider reports them.
    fn expirations(&self, ticker: &str) -> ListResult<Vec<NaiveDate>>;

    fn option_chain(&self, ticker: &str, expiration: NaiveDate) -> ListResult<OptionChain>;
}

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query2.finance.yahoo.com/v7/finance";

    pub fn new() -> ListResult<Self> {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> ListResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn fetch(&self, url: &str) -> ListResult<YahooChainData> {
        tracing::debug!(%url, "fetching options");
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        parse_chain_response(&body)
    }
}

impl ChainSource for YahooClient {
    fn expirations(&self, ticker: &str) -> ListResult<Vec<NaiveDate>> {
        let url = format!("{}/options/{}", self.base_url, ticker);
        let data = self.fetch(&url)?;
        Ok(data
            .expiration_dates
            .iter()
            .filter_map(|&ts| timestamp_to_date(ts))
            .collect())
    }

    fn option_chain(&self, ticker: &str, expiration: NaiveDate) -> ListResult<OptionChain> {
        let url = format!(
            "{}/options/{}?date={}",
            self.base_url,
            ticker,
            date_to_timestamp(expiration)
        );
        let data = self.fetch(&url)?;
        Ok(data.into_chain(expiration))
    }
}

/// Yahoo encodes expirations as midnight UTC timestamps.
fn date_to_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

fn parse_chain_response(body: &str) -> ListResult<YahooChainData> {
    let response: YahooOptionsResponse = serde_json::from_str(body)?;
    if let Some(error) = response.option_chain.error {
        return Err(ListError::upstream(error.description));
    }
    response
        .option_chain
        .result
        .into_iter()
        .flatten()
        .next()
        .ok_or_else(|| ListError::upstream("No options data returned"))
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    result: Option<Vec<YahooChainData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<YahooOptionData>,
    #[serde(default)]
    puts: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    #[serde(rename = "contractSymbol")]
    contract_symbol: Option<String>,
    strike: Option<f64>,
    #[serde(rename = "inTheMoney", default)]
    in_the_money: bool,
    #[serde(rename = "impliedVolatility")]
    implied_volatility: Option<f64>,
    volume: Option<i64>,
    #[serde(rename = "openInterest")]
    open_interest: Option<i64>,
    expiration: Option<i64>,
}

impl YahooChainData {
    fn into_chain(self, expiration: NaiveDate) -> OptionChain {
        let mut chain = OptionChain {
            expiration,
            calls: Vec::new(),
            puts: Vec::new(),
        };
        if let Some(options) = self.options.into_iter().next() {
            chain.calls = options.calls.into_iter().filter_map(convert_option).collect();
            chain.puts = options.puts.into_iter().filter_map(convert_option).collect();
        }
        chain
    }
}

fn convert_option(data: YahooOptionData) -> Option<OptionContract> {
    Some(OptionContract {
        contract_symbol: data.contract_symbol?,
        strike: data.strike?,
        in_the_money: data.in_the_money,
        implied_volatility: data.implied_volatility,
        volume: data.volume,
        open_interest: data.open_interest,
        expiration: data.expiration.and_then(timestamp_to_date),
    })
}
