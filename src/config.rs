//! TOML configuration: layer sources, field aliases and resolver settings.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::layer::{load_file, FieldAliases, Layer, LayerSchema, LayerSet};
use crate::models::{GeometryFamily, LayerRole};
use crate::resolver::{ResolverOptions, DEFAULT_FEEDER_TOLERANCE_MILES, DEFAULT_NEARBY_GRID_COUNT};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    pub layers: LayersConfig,
    /// Directory relative layer paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    #[serde(default = "default_tolerance")]
    pub feeder_tolerance_miles: f64,
    #[serde(default = "default_nearby_count")]
    pub nearby_grid_count: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            feeder_tolerance_miles: DEFAULT_FEEDER_TOLERANCE_MILES,
            nearby_grid_count: DEFAULT_NEARBY_GRID_COUNT,
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_FEEDER_TOLERANCE_MILES
}

fn default_nearby_count() -> usize {
    DEFAULT_NEARBY_GRID_COUNT
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayersConfig {
    pub grids: LayerSource,
    pub grid_oot: Option<LayerSource>,
    pub substations: Option<LayerSource>,
    pub feeders: Option<LayerSource>,
    pub huts: Option<LayerSource>,
}

/// One GeoJSON file and how to read it. Empty key lists fall back to the
/// role's default aliases.
#[derive(Debug, Deserialize, Clone)]
pub struct LayerSource {
    pub path: PathBuf,
    #[serde(default)]
    pub geometry: Option<GeometryFamily>,
    #[serde(default)]
    pub code_keys: Vec<String>,
    #[serde(default)]
    pub name_keys: Vec<String>,
    #[serde(default)]
    pub substation_keys: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

/// Default aliases per role, matching the utility's published field names
fn default_aliases(role: LayerRole) -> FieldAliases {
    match role {
        LayerRole::Grid | LayerRole::GridOot => FieldAliases {
            code: keys(&["Number_"]),
            ..Default::default()
        },
        LayerRole::Substation => FieldAliases {
            name: keys(&["Substation"]),
            ..Default::default()
        },
        LayerRole::Feeder => FieldAliases {
            code: keys(&[
                "Feeder_Code",
                "Feeder",
                "FEEDER",
                "FeederID",
                "feeder_code",
                "FeederName",
                "Feeder Code",
            ]),
            substation: keys(&["Substation", "substation", "SUBSTATION"]),
            ..Default::default()
        },
        LayerRole::Hut => FieldAliases {
            name: keys(&["stationID"]),
            substation: keys(&["Substation"]),
            ..Default::default()
        },
    }
}

fn default_family(role: LayerRole) -> GeometryFamily {
    match role {
        LayerRole::Hut => GeometryFamily::Point,
        _ => GeometryFamily::Polygon,
    }
}

impl LayerSource {
    /// Schema for this source, checking the declared geometry suits the role
    pub fn schema(&self, role: LayerRole) -> Result<LayerSchema> {
        let family = self.geometry.unwrap_or_else(|| default_family(role));
        let allowed = match role {
            LayerRole::Grid | LayerRole::GridOot => family == GeometryFamily::Polygon,
            LayerRole::Substation => family != GeometryFamily::Line,
            LayerRole::Feeder => family != GeometryFamily::Point,
            LayerRole::Hut => family == GeometryFamily::Point,
        };
        if !allowed {
            bail!("{} layer cannot use {} geometry", role, family);
        }

        let defaults = default_aliases(role);
        let pick = |configured: &[String], fallback: Vec<String>| {
            if configured.is_empty() {
                fallback
            } else {
                configured.to_vec()
            }
        };
        let aliases = FieldAliases {
            code: pick(&self.code_keys, defaults.code),
            name: pick(&self.name_keys, defaults.name),
            substation: pick(&self.substation_keys, defaults.substation),
        };

        Ok(LayerSchema::new(role, Some(family)).with_aliases(aliases))
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let tolerance = self.resolver.feeder_tolerance_miles;
        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!("feeder_tolerance_miles must be a non-negative number, got {}", tolerance);
        }
        Ok(())
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            feeder_tolerance_miles: self.resolver.feeder_tolerance_miles,
            nearby_grid_count: self.resolver.nearby_grid_count,
        }
    }

    /// Read and validate every configured layer.
    ///
    /// Any failure aborts the whole load so callers never see a partial set.
    pub fn load_layers(&self) -> Result<LayerSet> {
        let layers = &self.layers;
        let set = LayerSet {
            grids: Some(self.load_layer(LayerRole::Grid, &layers.grids)?),
            grid_oot: self.load_optional(LayerRole::GridOot, layers.grid_oot.as_ref())?,
            substations: self.load_optional(LayerRole::Substation, layers.substations.as_ref())?,
            feeders: self.load_optional(LayerRole::Feeder, layers.feeders.as_ref())?,
            huts: self.load_optional(LayerRole::Hut, layers.huts.as_ref())?,
        };

        for (role, count) in set.counts() {
            info!("  {}: {} features", role, count);
        }
        Ok(set)
    }

    fn load_optional(&self, role: LayerRole, source: Option<&LayerSource>) -> Result<Option<Layer>> {
        match source {
            Some(source) => self.load_layer(role, source).map(Some),
            None => {
                warn!("No {} layer configured; dependent fields will be empty", role);
                Ok(None)
            }
        }
    }

    fn load_layer(&self, role: LayerRole, source: &LayerSource) -> Result<Layer> {
        let path = self.base_dir.join(&source.path);
        info!("Loading {} layer from {}", role, path.display());
        let schema = source.schema(role)?;
        load_file(&path, &schema)
            .with_context(|| format!("Failed to load {} layer {}", role, path.display()))
    }
}
