use crate::error::SignalError;

/// Simple Moving Average (SMA)
/// Arithmetic mean of the trailing `period` values
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, SignalError> {
        if period == 0 {
            return Err(SignalError::InvalidParameter(
                "SMA period must be at least 1".to_string(),
            ));
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Rolling mean over a series that may contain gaps.
    /// Returns a vector of the same length as input; an entry is `None` until
    /// `period` values are available and whenever its window contains a gap.
    pub fn calculate(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut result = vec![None; values.len()];

        for i in (self.period - 1)..values.len() {
            let window = &values[i + 1 - self.period..=i];
            let sum: Option<f64> = window.iter().copied().sum();
            result[i] = sum.map(|s| s / self.period as f64);
        }

        result
    }
}

/// Exponential Moving Average (EMA)
/// Gives more weight to recent prices using exponential smoothing
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    span: usize,
}

impl Ema {
    pub const DEFAULT_SPAN: usize = 20;

    pub fn new(span: usize) -> Result<Self, SignalError> {
        if span == 0 {
            return Err(SignalError::InvalidParameter(
                "EMA span must be at least 1".to_string(),
            ));
        }
        Ok(Self { span })
    }

    /// Smoothing factor (k) for EMA calculation
    /// k = 2 / (span + 1)
    fn smoothing_factor(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// Calculate EMA for a price series
    /// Seeded with the first price, so every entry is defined
    pub fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        let k = self.smoothing_factor();
        let mut result: Vec<f64> = Vec::with_capacity(prices.len());

        // EMA(t) = Price(t) * k + EMA(t-1) * (1 - k)
        for &price in prices {
            let next = match result.last() {
                Some(&prev_ema) => price * k + prev_ema * (1.0 - k),
                None => price,
            };
            result.push(next);
        }

        result
    }
}
