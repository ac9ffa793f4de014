use shared_kernel::train_number::TrainNumber;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_THRESHOLD_MINUTES: i32 = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WatchEntryError {
    #[error("invalid train number in watch entry {0:?}")]
    InvalidTrainNumber(String),
    #[error("invalid delay threshold in watch entry {0:?}")]
    InvalidThreshold(String),
    #[error("too many components in watch entry {0:?}")]
    TooManyComponents(String),
}

/// A subscriber's interest in one train, encoded as `"<train>"` or
/// `"<train>:<threshold minutes>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchEntry {
    pub train_number: TrainNumber,
    pub threshold_minutes: i32,
}

impl WatchEntry {
    pub fn new(train_number: TrainNumber, threshold_minutes: i32) -> Self {
        Self {
            train_number,
            threshold_minutes,
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.train_number, self.threshold_minutes)
    }
}

impl FromStr for WatchEntry {
    type Err = WatchEntryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let mut parts = value.split(':');
        let train_number = parts
            .next()
            .and_then(|part| part.parse::<TrainNumber>().ok())
            .ok_or_else(|| WatchEntryError::InvalidTrainNumber(value.to_owned()))?;

        let threshold_minutes = match parts.next() {
            None => DEFAULT_THRESHOLD_MINUTES,
            Some(threshold) => threshold
                .parse::<i32>()
                .map_err(|_| WatchEntryError::InvalidThreshold(value.to_owned()))?,
        };

        if parts.next().is_some() {
            return Err(WatchEntryError::TooManyComponents(value.to_owned()));
        }

        Ok(WatchEntry {
            train_number,
            threshold_minutes,
        })
    }
}
