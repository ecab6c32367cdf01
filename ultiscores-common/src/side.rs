use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Side {
    #[derivative(Default)]
    Home,
    Away,
}

impl Side {
    /// Decodes the single letter team code used by the watchlive feed
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "h" => Some(Self::Home),
            "a" => Some(Self::Away),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Home => "h",
            Self::Away => "a",
        }
    }
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Home => write!(f, "Home"),
            Self::Away => write!(f, "Away"),
        }
    }
}
