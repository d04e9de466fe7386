//! Feature value normalization
//!
//! This module provides:
//! - Normalizer trait for pluggable value transforms
//! - IdentityNormalizer, MinMaxNormalizer, StandardNormalizer
//! - NormalizerConfig, the `{type, params}` JSON form
//! - NormalizerRegistry mapping type identifiers to factories
//!
//! A normalizer is immutable once built: `normalize` is a pure function of
//! its input and the state derived from params at construction time.

use ltrank_core::{format_f32, Explanation, LtrError, LtrResult, NamedParams};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type identifier of [`IdentityNormalizer`]
pub const IDENTITY: &str = "Identity";
/// Type identifier of [`MinMaxNormalizer`]
pub const MIN_MAX: &str = "MinMax";
/// Type identifier of [`StandardNormalizer`]
pub const STANDARD: &str = "Standard";

// ============================================================================
// NormalizerConfig
// ============================================================================

/// Serializable normalizer description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Registered type identifier
    #[serde(rename = "type")]
    pub type_name: String,
    /// Params handed to the factory
    #[serde(default, skip_serializing_if = "NamedParams::is_empty")]
    pub params: NamedParams,
}

impl NormalizerConfig {
    /// Create a config
    pub fn new(type_name: impl Into<String>, params: NamedParams) -> Self {
        NormalizerConfig {
            type_name: type_name.into(),
            params,
        }
    }
}

// ============================================================================
// Normalizer Trait
// ============================================================================

/// Pluggable normalization interface
///
/// # Thread Safety
///
/// Normalizers are shared by every worker scoring documents for a store, so
/// they must be Send + Sync and hold no mutable state.
pub trait Normalizer: Send + Sync + fmt::Debug {
    /// Registered type identifier
    fn type_name(&self) -> &str;

    /// Params this normalizer was built from
    fn params(&self) -> &NamedParams;

    /// Map a raw feature value onto the normalized scale
    fn normalize(&self, value: f32) -> f32;

    /// Wrap the raw value's explanation with the normalized value
    ///
    /// The raw explanation stays inspectable as the only child.
    fn explain(&self, raw: Explanation) -> Explanation {
        let normalized = self.normalize(raw.value());
        let mut description = format!("normalized using {}", self.type_name());
        if !self.params().is_empty() {
            description.push_str(&format!(" [params {}]", self.params()));
        }
        Explanation::with_details(normalized, description, vec![raw])
    }

    /// Config that rebuilds an equivalent normalizer
    fn to_config(&self) -> NormalizerConfig {
        NormalizerConfig::new(self.type_name(), self.params().clone())
    }
}

// ============================================================================
// IdentityNormalizer
// ============================================================================

/// Leaves values unchanged
#[derive(Debug, Clone, Default)]
pub struct IdentityNormalizer {
    params: NamedParams,
}

impl IdentityNormalizer {
    /// Create an identity normalizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity carrying its configured params through `to_config`
    pub fn with_params(params: NamedParams) -> Self {
        IdentityNormalizer { params }
    }

    /// Shared handle, used as the default binding of every feature
    pub fn shared() -> Arc<dyn Normalizer> {
        Arc::new(IdentityNormalizer::new())
    }
}

impl Normalizer for IdentityNormalizer {
    fn type_name(&self) -> &str {
        IDENTITY
    }

    fn params(&self) -> &NamedParams {
        &self.params
    }

    fn normalize(&self, value: f32) -> f32 {
        value
    }
}

// ============================================================================
// MinMaxNormalizer
// ============================================================================

/// Rescales `[min, max]` onto `[0, 1]`: `(v - min) / (max - min)`
#[derive(Debug, Clone)]
pub struct MinMaxNormalizer {
    params: NamedParams,
    min: f32,
    max: f32,
    delta: f32,
}

impl MinMaxNormalizer {
    /// Build from explicit bounds; requires `max > min`
    pub fn new(min: f32, max: f32) -> LtrResult<Self> {
        let params = NamedParams::new()
            .with("min", min as f64)?
            .with("max", max as f64)?;
        Self::build(params, min, max)
    }

    /// Build from `min` and `max` params
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        let min = required_float(params, "min", MIN_MAX)?;
        let max = required_float(params, "max", MIN_MAX)?;
        Self::build(params.clone(), min, max)
    }

    fn build(params: NamedParams, min: f32, max: f32) -> LtrResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(LtrError::normalizer(format!(
                "invalid params for {}: min ({}) and max ({}) must be finite",
                MIN_MAX,
                format_f32(min),
                format_f32(max)
            )));
        }
        let delta = max - min;
        if !delta.is_finite() {
            return Err(LtrError::normalizer(format!(
                "invalid params for {}: range from {} to {} overflows",
                MIN_MAX,
                format_f32(min),
                format_f32(max)
            )));
        }
        if delta <= 0.0 {
            return Err(LtrError::normalizer(format!(
                "invalid params for {}: min ({}) must be lower than max ({})",
                MIN_MAX,
                format_f32(min),
                format_f32(max)
            )));
        }
        Ok(MinMaxNormalizer {
            params,
            min,
            max,
            delta,
        })
    }

    /// Lower bound
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f32 {
        self.max
    }
}

impl Normalizer for MinMaxNormalizer {
    fn type_name(&self) -> &str {
        MIN_MAX
    }

    fn params(&self) -> &NamedParams {
        &self.params
    }

    fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / self.delta
    }
}

// ============================================================================
// StandardNormalizer
// ============================================================================

/// z-score: `(v - avg) / std`
#[derive(Debug, Clone)]
pub struct StandardNormalizer {
    params: NamedParams,
    avg: f32,
    std: f32,
}

impl StandardNormalizer {
    /// Build from explicit moments; requires `std > 0`
    pub fn new(avg: f32, std: f32) -> LtrResult<Self> {
        let params = NamedParams::new()
            .with("avg", avg as f64)?
            .with("std", std as f64)?;
        Self::build(params, avg, std)
    }

    /// Build from `avg` and `std` params
    pub fn from_params(params: &NamedParams) -> LtrResult<Self> {
        let avg = required_float(params, "avg", STANDARD)?;
        let std = required_float(params, "std", STANDARD)?;
        Self::build(params.clone(), avg, std)
    }

    fn build(params: NamedParams, avg: f32, std: f32) -> LtrResult<Self> {
        if !avg.is_finite() {
            return Err(LtrError::normalizer(format!(
                "invalid params for {}: avg must be finite, got {}",
                STANDARD,
                format_f32(avg)
            )));
        }
        // `!(std > 0)` also rejects NaN
        if !(std > 0.0) || !std.is_finite() {
            return Err(LtrError::normalizer(format!(
                "invalid params for {}: std must be > 0, got {}",
                STANDARD,
                format_f32(std)
            )));
        }
        Ok(StandardNormalizer { params, avg, std })
    }

    /// Mean
    pub fn avg(&self) -> f32 {
        self.avg
    }

    /// Standard deviation
    pub fn std(&self) -> f32 {
        self.std
    }
}

impl Normalizer for StandardNormalizer {
    fn type_name(&self) -> &str {
        STANDARD
    }

    fn params(&self) -> &NamedParams {
        &self.params
    }

    fn normalize(&self, value: f32) -> f32 {
        (value - self.avg) / self.std
    }
}

fn required_float(params: &NamedParams, key: &str, normalizer: &str) -> LtrResult<f32> {
    if !params.contains_key(key) {
        return Err(LtrError::normalizer(format!(
            "missing required param [{}] for normalizer {}",
            key, normalizer
        )));
    }
    params.get_float(key).map_err(|e| {
        LtrError::normalizer(format!("invalid param value for normalizer {}: {}", normalizer, e))
    })
}

// ============================================================================
// NormalizerRegistry
// ============================================================================

/// Factory building a normalizer from its params
pub type NormalizerFactory =
    Arc<dyn Fn(&NamedParams) -> LtrResult<Arc<dyn Normalizer>> + Send + Sync>;

/// Type-identifier keyed normalizer factories
#[derive(Clone)]
pub struct NormalizerRegistry {
    factories: HashMap<String, NormalizerFactory>,
}

impl NormalizerRegistry {
    /// Empty registry
    pub fn empty() -> Self {
        NormalizerRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registry with Identity, MinMax and Standard registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(IDENTITY, |params| {
            if params.is_empty() {
                Ok(IdentityNormalizer::shared())
            } else {
                Ok(Arc::new(IdentityNormalizer::with_params(params.clone())) as Arc<dyn Normalizer>)
            }
        });
        registry.register(MIN_MAX, |params| {
            Ok(Arc::new(MinMaxNormalizer::from_params(params)?) as Arc<dyn Normalizer>)
        });
        registry.register(STANDARD, |params| {
            Ok(Arc::new(StandardNormalizer::from_params(params)?) as Arc<dyn Normalizer>)
        });
        registry
    }

    /// Register (or replace) a factory
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&NamedParams) -> LtrResult<Arc<dyn Normalizer>> + Send + Sync + 'static,
    {
        self.factories.insert(type_name.into(), Arc::new(factory));
    }

    /// True if a factory is registered for `type_name`
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Instantiate a normalizer from its config
    pub fn create(&self, config: &NormalizerConfig) -> LtrResult<Arc<dyn Normalizer>> {
        let factory = self
            .factories
            .get(&config.type_name)
            .ok_or_else(|| LtrError::unknown_type("normalizer", config.type_name.clone()))?;
        factory(&config.params)
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.factories.keys().collect();
        types.sort();
        f.debug_struct("NormalizerRegistry").field("types", &types).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
