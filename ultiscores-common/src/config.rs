use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

/// The Ultiscores deployments the reader knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Site {
    Test,
    Wu,
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "wu" => Ok(Self::Wu),
            _ => Err("Invalid URL key provided. Available keys are: test, wu".to_string()),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Wu => write!(f, "wu"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub test_url: String,
    pub wu_url: String,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
}

impl Scoreboard {
    pub fn base_url(&self, site: Site) -> &str {
        match site {
            Site::Test => &self.test_url,
            Site::Wu => &self.wu_url,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            test_url: "https://scores.frisbee.pl/test3/ext/watchlive.php/".to_string(),
            wu_url: "https://ultiscores.com/winterunleashed/ext/watchlive.php/".to_string(),
            request_timeout_secs: 10,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub game_duration_mins: u32,
    pub resync_interval_secs: u32,
    /// Upper bound on one game update, kept below the resync interval
    pub fetch_timeout_secs: u32,
}

impl Clock {
    pub fn game_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.game_duration_mins) * 60)
    }

    pub fn resync_interval_secs(&self) -> u32 {
        self.resync_interval_secs.max(1)
    }

    pub fn fetch_timeout(&self) -> Duration {
        let secs = self
            .fetch_timeout_secs
            .clamp(1, self.resync_interval_secs().saturating_sub(1).max(1));
        Duration::from_secs(u64::from(secs))
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            game_duration_mins: 28,
            resync_interval_secs: 5,
            fetch_timeout_secs: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub directory: PathBuf,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub scoreboard: Scoreboard,
    pub clock: Clock,
    pub output: Output,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ser_scoreboard() {
        let sb: Scoreboard = Default::default();
        let serialized = toml::to_string(&sb).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(sb));
    }

    #[test]
    fn test_ser_clock() {
        let c: Clock = Default::default();
        let serialized = toml::to_string(&c).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(c));
    }

    #[test]
    fn test_ser_output() {
        let o: Output = Default::default();
        let serialized = toml::to_string(&o).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(o));
    }

    #[test]
    fn test_ser_config() {
        let config: Config = Default::default();
        let serialized = toml::to_string(&config).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(config));
    }

    #[test]
    fn test_site_from_str() {
        assert_eq!("test".parse(), Ok(Site::Test));
        assert_eq!("WU".parse(), Ok(Site::Wu));
        assert!("prod".parse::<Site>().is_err());

        let sb = Scoreboard::default();
        assert!(sb.base_url(Site::Wu).contains("winterunleashed"));
    }

    #[test]
    fn test_clock_limits() {
        let clock = Clock::default();
        assert_eq!(clock.game_duration(), Duration::from_secs(28 * 60));
        assert_eq!(clock.fetch_timeout(), Duration::from_secs(4));

        let too_slow = Clock {
            resync_interval_secs: 5,
            fetch_timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(too_slow.fetch_timeout(), Duration::from_secs(4));

        let zero = Clock {
            resync_interval_secs: 0,
            fetch_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(zero.resync_interval_secs(), 1);
        assert_eq!(zero.fetch_timeout(), Duration::from_secs(1));
    }
}
