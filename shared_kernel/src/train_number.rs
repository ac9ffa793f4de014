use serde::{Deserialize, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrainNumber(u32);

impl TrainNumber {
    pub fn new(value: u32) -> Self {
        TrainNumber(value)
    }

    pub fn inner(&self) -> u32 {
        self.0
    }
}

impl From<u32> for TrainNumber {
    fn from(value: u32) -> Self {
        TrainNumber(value)
    }
}

impl FromStr for TrainNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(TrainNumber)
    }
}

impl std::fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
