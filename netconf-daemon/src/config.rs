//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_address: String,
    pub yang_dir: String,
    pub idle_timeout_secs: u64,
    pub rpc_deadline_secs: u64,
    pub logging: Logging,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub stdout: LoggingStdout,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingStdout {
    pub style: LoggingFmtStyle,
    pub colors: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFmtStyle {
    Compact,
    Full,
    Json,
    Pretty,
}

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/netconfd.toml";

    pub(crate) fn load(config_file: Option<&str>) -> Config {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => {
                toml::from_str(&config_str).expect("failed to parse configuration file")
            }
            Err(err) => {
                eprintln!("failed to load configuration file: {err}");
                eprintln!("falling back to default configuration...");
                Config::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            listen_address: "[::]:830".to_owned(),
            yang_dir: "/etc/netconfd/yang".to_owned(),
            idle_timeout_secs: 600,
            rpc_deadline_secs: 30,
            logging: Default::default(),
        }
    }
}

impl Default for Logging {
    fn default() -> Logging {
        Logging {
            stdout: Default::default(),
        }
    }
}

impl Default for LoggingStdout {
    fn default() -> LoggingStdout {
        LoggingStdout {
            style: LoggingFmtStyle::Full,
            colors: false,
        }
    }
}
