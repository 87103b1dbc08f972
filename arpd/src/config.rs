use std::error::Error;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{App, Arg};
use log::LevelFilter;

/// Startup configuration of the responder, built from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    iface: String,
    ip: Ipv4Addr,
    hexdump: bool,
    verbosity: u64,
    stats_interval: u64,
    nb_mbufs: u32,
}

impl Config {
    pub const STATS_INTERVAL: u64 = 1;
    pub const NB_MBUFS: u32 = 8191;

    pub fn new(iface: String, ip: Ipv4Addr) -> Self {
        Self {
            iface,
            ip,
            hexdump: false,
            verbosity: 0,
            stats_interval: Self::STATS_INTERVAL,
            nb_mbufs: Self::NB_MBUFS,
        }
    }

    /// The command line accepted by the `arpd` binary.
    pub fn app() -> App<'static, 'static> {
        App::new("arpd")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Answers ARP requests for one Ipv4 address on one interface")
            .arg(
                Arg::with_name("iface")
                    .value_name("IFACE")
                    .help("network interface to serve")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::with_name("ip")
                    .value_name("IP")
                    .help("local Ipv4 address, in dotted decimal")
                    .required(true)
                    .index(2),
            )
            .arg(
                Arg::with_name("hexdump")
                    .short("x")
                    .long("hexdump")
                    .help("log every received frame as a hex dump"),
            )
            .arg(
                Arg::with_name("stats")
                    .short("s")
                    .long("stats")
                    .value_name("SECS")
                    .takes_value(true)
                    .help("seconds between statistics reports, 0 disables them (default: 1)"),
            )
            .arg(
                Arg::with_name("mbufs")
                    .short("n")
                    .long("mbufs")
                    .value_name("N")
                    .takes_value(true)
                    .help("number of frame buffers in the pool (default: 8191)"),
            )
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .multiple(true)
                    .help("more logging, repeat for more"),
            )
    }

    /// Parse the command line. The first item is the program name.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::app()
            .get_matches_from_safe(args)
            .map_err(ConfigError::Usage)?;

        // Both positionals are required, clap has already rejected their absence.
        let iface = matches.value_of("iface").unwrap_or_default().to_string();
        let ip_str = matches.value_of("ip").unwrap_or_default();
        let ip = ip_str
            .parse::<Ipv4Addr>()
            .map_err(|_| ConfigError::InvalidIp(ip_str.to_string()))?;

        let mut conf = Self::new(iface, ip);
        conf.set_hexdump(matches.is_present("hexdump"));
        conf.set_verbosity(matches.occurrences_of("verbose"));

        if let Some(s) = matches.value_of("stats") {
            let secs = s
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidStats(s.to_string()))?;
            conf.set_stats_interval(secs);
        }

        if let Some(s) = matches.value_of("mbufs") {
            let nb_mbufs = s
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidMbufs(s.to_string()))?;
            conf.set_nb_mbufs(nb_mbufs);
        }

        Ok(conf)
    }

    pub fn set_hexdump(&mut self, val: bool) {
        self.hexdump = val;
    }

    pub fn set_verbosity(&mut self, val: u64) {
        self.verbosity = val;
    }

    pub fn set_stats_interval(&mut self, val: u64) {
        self.stats_interval = val;
    }

    pub fn set_nb_mbufs(&mut self, val: u32) {
        self.nb_mbufs = val;
    }

    pub fn iface(&self) -> &str {
        &self.iface
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn hexdump(&self) -> bool {
        self.hexdump
    }

    pub fn verbosity(&self) -> u64 {
        self.verbosity
    }

    /// Time between statistics reports, `None` when reporting is off.
    pub fn stats_interval(&self) -> Option<Duration> {
        match self.stats_interval {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn nb_mbufs(&self) -> u32 {
        self.nb_mbufs
    }

    /// Maximum log level. Hex dumps are logged at debug level, so `hexdump` raises it.
    pub fn log_level(&self) -> LevelFilter {
        let level = match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        if self.hexdump {
            level.max(LevelFilter::Debug)
        } else {
            level
        }
    }
}

/// A command line that can not be turned into a [`Config`].
#[derive(Debug)]
pub enum ConfigError {
    /// Rejected by the argument parser, this includes `--help` and `--version`.
    Usage(clap::Error),
    InvalidIp(String),
    InvalidStats(String),
    InvalidMbufs(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Usage(e) => write!(f, "{}", e),
            ConfigError::InvalidIp(s) => write!(f, "invalid Ipv4 address: {}", s),
            ConfigError::InvalidStats(s) => write!(f, "invalid statistics interval: {}", s),
            ConfigError::InvalidMbufs(s) => write!(f, "invalid number of mbufs: {}", s),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Usage(e) => Some(e),
            _ => None,
        }
    }
}
