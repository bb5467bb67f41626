use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(ListenerId);

/// Settlement path a payment travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rail {
    Lightning,
    Liquid,
    Bitcoin,
}

impl Rail {
    pub fn label(self) -> &'static str {
        match self {
            Rail::Lightning => "Lightning",
            Rail::Liquid => "Liquid",
            Rail::Bitcoin => "Bitcoin",
        }
    }
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const SATS_PER_BTC: u64 = 100_000_000;
pub const MSATS_PER_SAT: u64 = 1_000;
