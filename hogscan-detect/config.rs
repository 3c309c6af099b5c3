use hogscan_core::{default_threads, ScanError, ScanResult};

use crate::builder::DetectorBuilder;
use crate::hog::HogExtractor;
use crate::pyramid::DEFAULT_MIN_SIZE;
use crate::types::WindowSize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete detector configuration with all settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Size of the scanned window (the reference template's size)
    pub window: WindowSize,
    /// Pixels between neighbouring window positions
    pub step_size: usize,
    /// Pyramid shrink factor per level, in (0, 1)
    pub scale: f32,
    /// Smallest pyramid level kept
    pub min_size: WindowSize,
    /// Feature extractor settings
    pub hog: HogExtractor,
    pub n_threads: usize,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub version: Option<String>,
}

impl DetectorConfig {
    /// Create new configuration with default settings
    pub fn new(window: WindowSize) -> Self {
        Self {
            window,
            step_size: 20,
            scale: 0.9,
            min_size: DEFAULT_MIN_SIZE,
            hog: HogExtractor::default(),
            n_threads: default_threads(),
            name: None,
            description: None,
            version: None,
        }
    }

    /// Coarse preset: wide steps and a steep pyramid
    pub fn coarse_preset(window: WindowSize) -> Self {
        Self {
            step_size: 20,
            scale: 0.8,
            name: Some("Coarse".to_string()),
            description: Some("Quick scan with wide steps and few pyramid levels".to_string()),
            version: Some("1.0".to_string()),
            ..Self::new(window)
        }
    }

    /// Fine preset: small steps, standard pyramid
    pub fn fine_preset(window: WindowSize) -> Self {
        Self {
            step_size: 4,
            scale: 0.9,
            name: Some("Fine".to_string()),
            description: Some("Dense scan balancing localization and run time".to_string()),
            version: Some("1.0".to_string()),
            ..Self::new(window)
        }
    }

    /// Exhaustive preset: every pixel offset at every level
    pub fn exhaustive_preset(window: WindowSize) -> Self {
        Self {
            step_size: 1,
            scale: 0.9,
            name: Some("Exhaustive".to_string()),
            description: Some("Scores every window position; slow on large images".to_string()),
            version: Some("1.0".to_string()),
            ..Self::new(window)
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self.version = Some("1.0".to_string());
        self
    }

    /// Convert to DetectorBuilder for further customization
    pub fn to_builder(self) -> DetectorBuilder {
        DetectorBuilder::from_config(self)
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "DetectorConfig: window={}x{}, step={}, scale={:.2}, min={}x{}, hog=[cell:{}, bins:{}, block:{}, norm:{:?}], threads={}",
            self.window.width, self.window.height, self.step_size, self.scale,
            self.min_size.width, self.min_size.height,
            self.hog.cell_size, self.hog.orientations, self.hog.block_size, self.hog.block_norm,
            self.n_threads
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> ScanResult<()> {
        self.window.validate()?;
        if self.step_size == 0 {
            return Err(ScanError::InvalidStep(self.step_size));
        }
        if self.scale.is_nan() || self.scale <= 0.0 || self.scale >= 1.0 {
            return Err(ScanError::InvalidScale(self.scale));
        }
        if self.min_size.height == 0 || self.min_size.width == 0 {
            return Err(ScanError::InvalidMinSize {
                height: self.min_size.height,
                width: self.min_size.width,
            });
        }
        if self.n_threads == 0 {
            return Err(ScanError::InvalidParameter { name: "n_threads", value: 0.0 });
        }
        // The window must hold at least one block of cells
        self.hog.descriptor_len(self.window)?;
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
