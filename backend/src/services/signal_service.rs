use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::classifier::{classify, Signal, SignalInputs};
use crate::error::SignalError;
use crate::indicators::{Ema, Rsi};
use crate::indices::IndexInfo;
use crate::models::{IndicatorRow, RawPriceTable, CLOSE, EMA, RSI};
use crate::series::{self, PriceTable};
use crate::state::AppState;

/// Window lengths for the two indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub ema_span: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: Rsi::DEFAULT_PERIOD,
            ema_span: Ema::DEFAULT_SPAN,
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub signal: Signal,
    pub inputs: SignalInputs,
    /// Cleaned augmented series, oldest first
    pub rows: Vec<IndicatorRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayMetrics {
    pub price: String,
    pub rsi: String,
    pub ema: String,
}

/// Column-oriented series for the price/EMA and RSI charts
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSeries {
    pub timestamps: Vec<i64>,
    pub close: Vec<f64>,
    pub ema: Vec<f64>,
    pub rsi: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub index: String,
    pub ticker: String,
    pub signal: Signal,
    pub label: &'static str,
    pub advisory: &'static str,
    pub close: f64,
    pub rsi: f64,
    pub ema: f64,
    pub trend: f64,
    pub display: DisplayMetrics,
    pub chart: ChartSeries,
    pub generated_at: DateTime<Utc>,
    pub last_updated: String,
}

impl SignalReport {
    pub fn new(index: IndexInfo, evaluation: Evaluation, generated_at: DateTime<Utc>) -> Self {
        let Evaluation {
            signal,
            inputs,
            rows,
        } = evaluation;

        let mut chart = ChartSeries::default();
        for row in &rows {
            chart.timestamps.push(row.timestamp.timestamp());
            chart.close.push(row.close);
            chart.ema.push(row.ema);
            chart.rsi.push(row.rsi);
        }

        Self {
            index: index.name.to_string(),
            ticker: index.ticker.to_string(),
            signal,
            label: signal.label(),
            advisory: signal.advisory(),
            close: inputs.close,
            rsi: inputs.rsi,
            ema: inputs.ema,
            trend: inputs.trend,
            display: DisplayMetrics {
                price: format!("₹{:.2}", inputs.close),
                rsi: format!("{:.2}", inputs.rsi),
                ema: format!("{:.2}", inputs.ema),
            },
            chart,
            generated_at,
            last_updated: generated_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

/// Adds RSI and EMA columns computed from a gap-free Close column
pub fn augment(table: PriceTable, params: &IndicatorParams) -> Result<PriceTable, SignalError> {
    let closes = table.defined_values(CLOSE)?;
    let rsi = Rsi::new(params.rsi_period)?.calculate(&closes);
    let ema = Ema::new(params.ema_span)?.calculate(&closes);

    table
        .with_column(RSI, rsi)?
        .with_column(EMA, ema.into_iter().map(Some).collect())
}

/// Typed rows of a table whose Close, RSI and EMA are all defined
pub fn indicator_rows(table: &PriceTable) -> Result<Vec<IndicatorRow>, SignalError> {
    let close = table.defined_values(CLOSE)?;
    let rsi = table.defined_values(RSI)?;
    let ema = table.defined_values(EMA)?;

    Ok(table
        .timestamps()
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| IndicatorRow {
            timestamp,
            close: close[i],
            rsi: rsi[i],
            ema: ema[i],
        })
        .collect())
}

/// Raw table -> prune -> indicators -> prune -> classification
pub fn evaluate(raw: RawPriceTable, params: &IndicatorParams) -> Result<Evaluation, SignalError> {
    let prepared = series::prepare(raw, &[CLOSE])?;
    let augmented = augment(prepared, params)?;
    let clean = augmented.drop_incomplete(&[CLOSE, RSI, EMA])?;

    let rows = indicator_rows(&clean)?;
    let inputs = SignalInputs::from_rows(&rows)?;
    let signal = classify(&inputs);

    Ok(Evaluation {
        signal,
        inputs,
        rows,
    })
}

/// Fetches the index and runs the full pipeline
pub async fn generate_signal(state: &AppState, index: IndexInfo) -> Result<SignalReport, SignalError> {
    let raw = state
        .api_client
        .fetch_chart(index.ticker, &state.config.fetch_window)
        .await?;

    let evaluation = evaluate(raw, &state.config.indicators)?;

    tracing::info!(
        "{} ({}): {} @ {:.2} (RSI {:.2}, EMA {:.2}, trend {:+.2})",
        index.name,
        index.ticker,
        evaluation.signal,
        evaluation.inputs.close,
        evaluation.inputs.rsi,
        evaluation.inputs.ema,
        evaluation.inputs.trend
    );

    Ok(SignalReport::new(index, evaluation, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indices::INDICES;
    use crate::models::{ColumnSet, GroupedColumn};
    use chrono::TimeZone;

    fn raw_table(closes: &[f64]) -> RawPriceTable {
        RawPriceTable {
            timestamps: (0..closes.len())
                .map(|i| Utc.timestamp_opt(1_700_000_000 + i as i64 * 900, 0).unwrap())
                .collect(),
            columns: ColumnSet::Grouped(vec![GroupedColumn {
                field: CLOSE.to_string(),
                ticker: "^NSEI".to_string(),
                values: closes.iter().copied().map(Some).collect(),
            }]),
        }
    }

    /// Flat, then a jump, then a steady drift in `step` for 14 bars
    fn jump_then_drift(base: f64, jump_to: f64, step: f64) -> Vec<f64> {
        let mut closes = vec![base; 30];
        closes.extend((0..15).map(|i| jump_to + step * i as f64));
        closes
    }

    #[test]
    fn test_evaluate_buy() {
        // Oversold on the pullback, still above a rising EMA
        let closes = jump_then_drift(100.0, 200.0, -1.0);
        let evaluation = evaluate(raw_table(&closes), &IndicatorParams::default()).unwrap();

        assert_eq!(evaluation.signal, Signal::Buy);
        assert_eq!(evaluation.inputs.close, 186.0);
        assert_eq!(evaluation.inputs.rsi, 0.0);
        assert!(evaluation.inputs.ema < 186.0);
        assert!(evaluation.inputs.trend > 0.0);
    }

    #[test]
    fn test_evaluate_sell() {
        let closes = jump_then_drift(200.0, 100.0, 1.0);
        let evaluation = evaluate(raw_table(&closes), &IndicatorParams::default()).unwrap();

        assert_eq!(evaluation.signal, Signal::Sell);
        assert_eq!(evaluation.inputs.rsi, 100.0);
        assert!(evaluation.inputs.close < evaluation.inputs.ema);
        assert!(evaluation.inputs.trend < 0.0);
    }

    #[test]
    fn test_flat_warmup_rows_are_pruned() {
        // The 30 flat bars give 0/0 RSI windows, so only post-jump rows survive
        let closes = jump_then_drift(100.0, 200.0, -1.0);
        let evaluation = evaluate(raw_table(&closes), &IndicatorParams::default()).unwrap();

        assert_eq!(evaluation.rows.len(), 15);
        assert_eq!(evaluation.rows[0].close, 200.0);
        assert_eq!(evaluation.rows[0].rsi, 100.0);
    }

    #[test]
    fn test_falling_series_never_buys() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - 10.0 * i as f64 / 19.0).collect();
        let evaluation = evaluate(raw_table(&closes), &IndicatorParams::default()).unwrap();

        assert!(evaluation.inputs.rsi < 30.0);
        assert!(evaluation.inputs.close < evaluation.inputs.ema);
        assert!(evaluation.inputs.trend < 0.0);
        assert_eq!(evaluation.signal, Signal::Hold);
    }

    #[test]
    fn test_rows_fully_defined_and_aligned() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i % 5) as f64 * 0.7 + i as f64 * 0.1)
            .collect();
        let raw = raw_table(&closes);
        let evaluation = evaluate(raw.clone(), &IndicatorParams::default()).unwrap();

        // Every row after the RSI warmup survives, and timestamps stay aligned
        assert_eq!(evaluation.rows.len(), 40 - 14);
        assert_eq!(evaluation.rows[0].timestamp, raw.timestamps[14]);
        assert_eq!(evaluation.rows[0].close, closes[14]);
    }

    #[test]
    fn test_trend_lookback_spans_pruned_flat_window() {
        // Rise for 20 bars, hold flat for 14, then rise 3 more. Only bar 33 has a
        // fully flat 14-change window, so it is the one row pruned mid-series.
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.extend([119.0; 14]);
        closes.extend([120.0, 121.0, 122.0]);
        let raw = raw_table(&closes);

        let evaluation = evaluate(raw.clone(), &IndicatorParams::default()).unwrap();

        assert_eq!(evaluation.rows.len(), 37 - 14 - 1);
        assert!(evaluation.rows.iter().all(|r| r.timestamp != raw.timestamps[33]));

        // Four rows back from bar 36 lands on bar 31, skipping the pruned bar
        let ema = Ema::new(Ema::DEFAULT_SPAN).unwrap().calculate(&closes);
        assert!((evaluation.inputs.trend - (ema[36] - ema[31])).abs() < 1e-9);
        assert!((evaluation.inputs.ema - ema[36]).abs() < 1e-9);
        assert_eq!(evaluation.inputs.rsi, 100.0);
    }

    #[test]
    fn test_fetch_gaps_dropped_before_indicators() {
        let mut raw = raw_table(&jump_then_drift(200.0, 100.0, 1.0));
        if let ColumnSet::Grouped(columns) = &mut raw.columns {
            columns[0].values.insert(10, None);
            raw.timestamps.push(Utc.timestamp_opt(1_800_000_000, 0).unwrap());
        }

        let evaluation = evaluate(raw, &IndicatorParams::default()).unwrap();
        assert_eq!(evaluation.signal, Signal::Sell);
    }

    #[test]
    fn test_insufficient_data() {
        let closes: Vec<f64> = (0..17).map(|i| 100.0 + i as f64).collect();
        let err = evaluate(raw_table(&closes), &IndicatorParams::default()).unwrap_err();

        // 17 bars leave 3 rows once the 14-bar warmup is pruned
        assert!(matches!(
            err,
            SignalError::InsufficientData {
                required: 5,
                available: 3
            }
        ));
    }

    #[test]
    fn test_empty_table() {
        let err = evaluate(raw_table(&[]), &IndicatorParams::default()).unwrap_err();
        assert!(matches!(
            err,
            SignalError::InsufficientData { available: 0, .. }
        ));
    }

    #[test]
    fn test_missing_close_column() {
        let raw = RawPriceTable {
            timestamps: vec![],
            columns: ColumnSet::Flat(vec![]),
        };
        let err = evaluate(raw, &IndicatorParams::default()).unwrap_err();
        assert!(matches!(err, SignalError::MissingColumn(name) if name == CLOSE));
    }

    #[test]
    fn test_invalid_params() {
        let params = IndicatorParams {
            rsi_period: 0,
            ema_span: 20,
        };
        let err = evaluate(raw_table(&[1.0; 10]), &params).unwrap_err();
        assert!(matches!(err, SignalError::InvalidParameter(_)));
    }

    #[test]
    fn test_report_formatting() {
        let closes = jump_then_drift(100.0, 200.0, -1.0);
        let evaluation = evaluate(raw_table(&closes), &IndicatorParams::default()).unwrap();
        let generated_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let report = SignalReport::new(INDICES[0], evaluation, generated_at);

        assert_eq!(report.index, "NIFTY 50");
        assert_eq!(report.ticker, "^NSEI");
        assert_eq!(report.label, "BUY Signal");
        assert_eq!(report.advisory, "Consider entering long position.");
        assert_eq!(report.display.price, "₹186.00");
        assert_eq!(report.display.rsi, "0.00");
        assert_eq!(report.chart.close.len(), 15);
        assert_eq!(report.chart.ema.len(), report.chart.rsi.len());
        assert_eq!(report.last_updated.len(), "2023-11-14 22:13:20".len());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["signal"], "BUY");
    }
}
