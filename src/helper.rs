pub mod options {
    use std::sync::Once;

    use chrono::NaiveDate;
    use polars::prelude::*;

    use crate::cli::{ReportSettings, SortKey};
    use crate::error::ListResult;
    use crate::expiry;
    use crate::yahoo::{ChainSource, OptionContract};

    pub const CONTRACT_SYMBOL: &str = "contractSymbol";
    pub const STRIKE: &str = "strike";
    pub const IN_THE_MONEY: &str = "inTheMoney";
    pub const IMPLIED_VOLATILITY: &str = "impliedVolatility";
    pub const VOLUME: &str = "volume";
    pub const OPEN_INTEREST: &str = "openInterest";
    pub const EXPIRATION_DATE: &str = "expirationDate";
    pub const MONEYNESS: &str = "moneyness";
    pub const IMPLIED_VOLATILITY_PCT: &str = "impliedVolatilityPct";

    /// Displayed columns, in order. `expirationDate` is appended for all-dates reports.
    pub const OUTPUT_COLUMNS: [&str; 6] = [
        CONTRACT_SYMBOL,
        MONEYNESS,
        STRIKE,
        IMPLIED_VOLATILITY_PCT,
        VOLUME,
        OPEN_INTEREST,
    ];

    /// Sorted and truncated calls and puts, ready to print.
    #[derive(Debug, Clone)]
    pub struct Report {
        pub expirations: Vec<NaiveDate>,
        pub calls: DataFrame,
        pub puts: DataFrame,
    }

    pub fn contracts_frame(contracts: &[OptionContract]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new(
                CONTRACT_SYMBOL,
                contracts
                    .iter()
                    .map(|c| c.contract_symbol.as_str())
                    .collect::<Vec<_>>(),
            ),
            Series::new(
                STRIKE,
                contracts.iter().map(|c| c.strike).collect::<Vec<_>>(),
            ),
            Series::new(
                IN_THE_MONEY,
                contracts.iter().map(|c| c.in_the_money).collect::<Vec<_>>(),
            ),
            Series::new(
                IMPLIED_VOLATILITY,
                contracts
                    .iter()
                    .map(|c| c.implied_volatility)
                    .collect::<Vec<_>>(),
            ),
            Series::new(
                VOLUME,
                contracts.iter().map(|c| c.volume).collect::<Vec<_>>(),
            ),
            Series::new(
                OPEN_INTEREST,
                contracts.iter().map(|c| c.open_interest).collect::<Vec<_>>(),
            ),
        ])
    }

    /// Tag every row with the expiration it was fetched for, so merged batches stay apart.
    pub fn stamp_expiration(df: &mut DataFrame, expiration: NaiveDate) -> PolarsResult<()> {
        let stamp = expiration.to_string();
        let values = vec![stamp.as_str(); df.height()];
        df.with_column(Series::new(EXPIRATION_DATE, values))?;
        Ok(())
    }

    pub fn annotate(lf: LazyFrame) -> LazyFrame {
        lf.with_columns([
            when(col(IN_THE_MONEY))
                .then(lit("ITM"))
                .otherwise(lit("OTM"))
                .alias(MONEYNESS),
            (col(IMPLIED_VOLATILITY) * lit(100.0))
                .round(2)
                .alias(IMPLIED_VOLATILITY_PCT),
        ])
    }

    /// Stable sort, missing values last in either direction.
    pub fn sort_rows(lf: LazyFrame, key: SortKey, reverse: bool) -> LazyFrame {
        lf.sort(
            key.column(),
            SortOptions {
                descending: reverse,
                nulls_last: true,
                maintain_order: true,
                ..Default::default()
            },
        )
    }

    /// Columns holding at least one value. An empty frame keeps all of its columns.
    pub fn present_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|s| s.len() == 0 || s.null_count() < s.len())
            .map(|s| s.name().to_string())
            .collect()
    }

    pub fn project(df: &DataFrame, stamped: bool, max_rows: i64) -> PolarsResult<DataFrame> {
        let present = present_columns(df);
        let selection: Vec<&str> = OUTPUT_COLUMNS
            .iter()
            .copied()
            .chain(stamped.then_some(EXPIRATION_DATE))
            .filter(|name| present.iter().any(|p| p == name))
            .collect();
        // negative limits behave like zero
        let rows = usize::try_from(max_rows).unwrap_or(0);
        Ok(df.select(selection)?.head(Some(rows)))
    }

    /// Merge the per-expiration batches of one side and run it through the pipeline.
    pub fn prepare_side(
        batches: Vec<DataFrame>,
        settings: &ReportSettings,
    ) -> PolarsResult<DataFrame> {
        let mut batches = batches.into_iter();
        let mut merged = match batches.next() {
            Some(first) => first,
            None => contracts_frame(&[])?,
        };
        for batch in batches {
            merged.vstack_mut(&batch)?;
        }

        let sorted = sort_rows(annotate(merged.lazy()), settings.sort_key, settings.reverse)
            .collect()?;
        project(&sorted, settings.selector.is_all(), settings.max_rows)
    }

    /// Resolve expirations, fetch every chain, then build both tables.
    /// Nothing is produced unless every fetch succeeds.
    pub fn build_report<S: ChainSource + ?Sized>(
        source: &S,
        settings: &ReportSettings,
    ) -> ListResult<Report> {
        let ticker = settings.ticker.as_str();
        let available = source.expirations(ticker)?;
        let expirations = expiry::resolve(ticker, &available, settings.selector)?;
        tracing::info!(ticker, ?expirations, "resolved expiration dates");

        let stamped = settings.selector.is_all();
        let mut calls = Vec::with_capacity(expirations.len());
        let mut puts = Vec::with_capacity(expirations.len());

        for &expiration in &expirations {
            let chain = source.option_chain(ticker, expiration)?;
            tracing::debug!(
                %expiration,
                calls = chain.calls.len(),
                puts = chain.puts.len(),
                "fetched option chain"
            );

            let mut call_df = contracts_frame(&chain.calls)?;
            let mut put_df = contracts_frame(&chain.puts)?;
            if stamped {
                stamp_expiration(&mut call_df, chain.expiration)?;
                stamp_expiration(&mut put_df, chain.expiration)?;
            }
            calls.push(call_df);
            puts.push(put_df);
        }

        Ok(Report {
            calls: prepare_side(calls, settings)?,
            puts: prepare_side(puts, settings)?,
            expirations,
        })
    }

    static TABLE_FORMAT: Once = Once::new();

    // plain fixed-width layout: no borders, dtypes or shape line
    fn configure_table_format() {
        TABLE_FORMAT.call_once(|| {
            for (key, value) in [
                ("POLARS_FMT_TABLE_FORMATTING", "NOTHING"),
                ("POLARS_FMT_TABLE_HIDE_COLUMN_DATA_TYPES", "1"),
                ("POLARS_FMT_TABLE_HIDE_DATAFRAME_SHAPE_INFORMATION", "1"),
                ("POLARS_FMT_TABLE_HIDE_COLUMN_SEPARATOR", "1"),
                ("POLARS_FMT_MAX_ROWS", "10000"),
                ("POLARS_FMT_MAX_COLS", "16"),
                ("POLARS_FMT_STR_LEN", "64"),
            ] {
                std::env::set_var(key, value);
            }
        });
    }

    pub fn render_table(title: &str, df: &DataFrame) -> String {
        configure_table_format();
        format!("{title}:\n{df}")
    }

}
