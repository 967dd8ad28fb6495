use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::accumulator::SHADOW_OVERRIDE_ALL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatorSettings {
    /// Driver-side early depth test; disables the prepass depth-mode switches.
    #[serde(default)]
    pub use_early_z: bool,
    /// The main pass draws after a depth prepass.
    #[serde(default = "AccumulatorSettings::default_depth_prepass")]
    pub main_pass_depth_prepass: bool,
    #[serde(default)]
    pub suppress_grass_shadows: bool,
    #[serde(default = "AccumulatorSettings::default_log_unexercised_modes")]
    pub log_unexercised_modes: bool,
    /// 0 disables the override, 0xFFFF clears light flags, anything else
    /// selects bits to merge.
    #[serde(default)]
    pub shadow_override_mask: u32,
    #[serde(default)]
    pub shadow_override_bits: u32,
}

impl Default for AccumulatorSettings {
    fn default() -> Self {
        Self {
            use_early_z: false,
            main_pass_depth_prepass: Self::default_depth_prepass(),
            suppress_grass_shadows: false,
            log_unexercised_modes: Self::default_log_unexercised_modes(),
            shadow_override_mask: 0,
            shadow_override_bits: 0,
        }
    }
}

impl AccumulatorSettings {
    pub fn load() -> Self {
        Self::load_from_path("accumulator.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    info!("Loaded accumulator settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default accumulator settings.",
                        path, err
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Accumulator settings file {:?} not found. Using default settings.",
                    path
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default accumulator settings.",
                    path, err
                );
                Self::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(contents).map(Self::validate)
    }

    fn validate(mut self) -> Self {
        if self.shadow_override_mask > SHADOW_OVERRIDE_ALL {
            warn!(
                "Shadow override mask {:#x} exceeds {:#x}. Disabling the override.",
                self.shadow_override_mask, SHADOW_OVERRIDE_ALL
            );
            self.shadow_override_mask = 0;
        }

        if self.use_early_z && self.main_pass_depth_prepass {
            info!("Early-Z enabled; prepass depth-mode switches will be skipped.");
        }

        self
    }

    const fn default_depth_prepass() -> bool {
        true
    }

    const fn default_log_unexercised_modes() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings = AccumulatorSettings::from_json("{}").unwrap();
        assert_eq!(settings, AccumulatorSettings::default());
        assert!(settings.main_pass_depth_prepass);
        assert!(!settings.use_early_z);
    }

    #[test]
    fn oversized_override_mask_is_disabled() {
        let settings =
            AccumulatorSettings::from_json(r#"{ "shadow_override_mask": 65536, "shadow_override_bits": 3 }"#)
                .unwrap();
        assert_eq!(settings.shadow_override_mask, 0);
        assert_eq!(settings.shadow_override_bits, 3);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = AccumulatorSettings::load_from_path("does/not/exist/accumulator.json");
        assert_eq!(settings, AccumulatorSettings::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AccumulatorSettings::from_json("{ use_early_z: ").is_err());
    }
}
