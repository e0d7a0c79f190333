/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 03/09/2026
Last Modified: 01/10/2026
License: MIT
*/

use serde::{Deserialize, Serialize};
use serde_json;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// A structure to hold environment settings. Backed by settings.json file in the current directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    pub overwrite_output: bool,
    /// Upper bound on worker threads; zero or negative means one per CPU.
    pub max_procs: isize,
}

impl Configs {
    pub fn new() -> Configs {
        Configs {
            verbose_mode: true,
            working_directory: String::new(),
            overwrite_output: false,
            max_procs: -1,
        }
    }
}

impl Default for Configs {
    fn default() -> Configs {
        Configs::new()
    }
}

fn settings_file() -> Result<PathBuf, Error> {
    Ok(std::env::current_dir()?.join(SETTINGS_FILE))
}

pub fn get_configs() -> Result<Configs, Error> {
    read_configs(&settings_file()?)
}

pub fn save_configs(configs: &Configs) -> Result<(), Error> {
    write_configs(configs, &settings_file()?)
}

/// Reads the settings held in `config_file`, or the defaults when there is
/// no such file.
pub fn read_configs(config_file: &Path) -> Result<Configs, Error> {
    match fs::read_to_string(config_file) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", config_file.display(), e),
            )
        }),
        Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(Configs::new()),
        Err(e) => Err(e),
    }
}

pub fn write_configs(configs: &Configs, config_file: &Path) -> Result<(), Error> {
    let configs_json = serde_json::to_string_pretty(configs)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
    let mut file = File::create(config_file)?;
    file.write_all(configs_json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_configs_round_trip_and_defaults() {
        let mut path = std::env::temp_dir();
        path.push(format!("featureline_settings_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        assert_eq!(read_configs(&path).unwrap(), Configs::new());

        let configs = Configs {
            verbose_mode: false,
            working_directory: "/data/roads".to_string(),
            overwrite_output: true,
            max_procs: 2,
        };
        write_configs(&configs, &path).unwrap();
        assert_eq!(read_configs(&path).unwrap(), configs);

        // older settings files without every field still load
        fs::write(&path, "{\"verbose_mode\": false}").unwrap();
        let partial = read_configs(&path).unwrap();
        assert!(!partial.overwrite_output);
        assert_eq!(partial.max_procs, -1);

        fs::write(&path, "not json").unwrap();
        assert_eq!(
            read_configs(&path).unwrap_err().kind(),
            ErrorKind::InvalidData
        );
        fs::remove_file(&path).unwrap();
    }
}
