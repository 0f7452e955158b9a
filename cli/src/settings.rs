//! Simulation settings assembled from files and command-line flags.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, warn};
use serde::de::{self, Deserializer, EnumAccess, VariantAccess, Visitor};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ndtorus_core::prelude::*;

use crate::presets;

/// Lattice dimensions, written as `N[xN[xN...]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions(pub Vec<usize>);
impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        s.split(|c| c == 'x' || c == 'X')
            .map(|axis| {
                axis.trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid axis size {:?} in dimensions {:?}", axis, s))
            })
            .collect::<Result<_, _>>()
            .map(Dimensions)
    }
}
impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "{}", axes.join("x"))
    }
}

/// Initial state of a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialState {
    /// Uniformly random state.
    Random,
    /// Explicit state.
    Given(BigUint),
}
impl FromStr for InitialState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.starts_with('-') {
            s[1..]
                .parse::<BigUint>()
                .map(|_| InitialState::Random)
                .map_err(|e| format!("invalid initial state {:?}: {}", s, e))
        } else {
            s.parse()
                .map(InitialState::Given)
                .map_err(|e| format!("invalid initial state {:?}: {}", s, e))
        }
    }
}

/// Partial set of simulation settings. Any field may be missing until all
/// sources have been merged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dimensions: Option<Dimensions>,
    pub method: Option<RuleKind>,
    pub rule: Option<BigUint>,
    /// Negative means unbounded.
    pub iterations: Option<i64>,
    pub neighborhood_radius: Option<usize>,
    pub initial_state: Option<InitialState>,
    pub seed: Option<u64>,
    pub parallelize: Option<bool>,
    pub workers: Option<usize>,
    pub skip_initial_state: Option<bool>,
}

impl Settings {
    /// Loads settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Parses settings from YAML.
    pub fn from_yaml(s: &str) -> Result<Self> {
        let file: SettingsFile = serde_yaml::from_str(s)?;
        file.try_into_settings()
    }

    /// Overwrites every setting that `other` specifies.
    pub fn merge(&mut self, other: Settings) {
        macro_rules! merge_fields {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        merge_fields!(
            dimensions,
            method,
            rule,
            iterations,
            neighborhood_radius,
            initial_state,
            seed,
            parallelize,
            workers,
            skip_initial_state,
        );
    }

    /// Builds a simulation configuration, failing if a required setting is
    /// missing.
    pub fn into_config(self) -> Result<SimulationConfig> {
        let dimensions = self.dimensions.ok_or_else(|| missing("dimensions"))?;
        let method = self.method.ok_or_else(|| missing("method"))?;
        let rule = self.rule.ok_or_else(|| missing("rule"))?;

        let mut config = SimulationConfig::new(dimensions.0, method, rule);
        if let Some(radius) = self.neighborhood_radius {
            config = config.with_radius(radius);
        }
        if let Some(InitialState::Given(state)) = self.initial_state {
            config = config.with_initial_state(state);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        match self.iterations {
            Some(n) if n >= 0 => config = config.with_iterations(n as u64),
            _ => config = config.unbounded(),
        }
        config = config.parallel(self.parallelize.unwrap_or(false));
        if let Some(workers) = self.workers {
            if !config.parallel {
                bail!("--workers requires --parallelize");
            }
            config = config.with_workers(workers);
        }
        config = config.skip_initial_state(self.skip_initial_state.unwrap_or(false));

        config.validate()?;
        Ok(config)
    }
}

fn missing(name: &str) -> anyhow::Error {
    anyhow!("missing required setting `{}`", name)
}

/// Layers settings in increasing order of precedence: built-in presets in
/// order, then files in order (each already layered over its own preset), then
/// command-line flags.
pub fn layer(preset_names: &[String], files: Vec<Settings>, flags: Settings) -> Result<Settings> {
    let mut settings = Settings::default();
    for name in preset_names {
        debug!("Loading preset {}", name);
        settings.merge(presets::load(name)?);
    }
    for file in files {
        settings.merge(file);
    }
    settings.merge(flags);
    Ok(settings)
}

/// Settings as written in a YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    preset: Option<String>,
    dimensions: Option<DimensionsValue>,
    method: Option<String>,
    rule: Option<IntegerValue>,
    iterations: Option<i64>,
    neighborhood_radius: Option<usize>,
    initial_state: Option<IntegerValue>,
    seed: Option<u64>,
    parallelize: Option<bool>,
    workers: Option<usize>,
    skip_initial_state: Option<bool>,

    // Output settings, which are accepted and ignored.
    scaling: Option<serde_yaml::Value>,
    out: Option<serde_yaml::Value>,
    format: Option<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DimensionsValue {
    Single(usize),
    List(Vec<usize>),
    Text(String),
}

/// Integer in a settings file.
///
/// Plain integers, decimal strings, and binary strings tagged `!b` (most
/// significant digit first) or `!rb` (least significant digit first) are all
/// accepted. Whitespace inside a binary string is ignored. Integers too large
/// for YAML to read exactly must be quoted or written in binary.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IntegerValue {
    Negative,
    NonNegative(BigUint),
}

impl<'de> Deserialize<'de> for IntegerValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntegerVisitor)
    }
}

struct IntegerVisitor;
impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = IntegerValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an integer, a decimal string, or a binary string tagged !b or !rb")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<IntegerValue, E> {
        Ok(IntegerValue::NonNegative(v.into()))
    }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<IntegerValue, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Ok(IntegerValue::Negative),
        }
    }
    fn visit_u128<E: de::Error>(self, v: u128) -> Result<IntegerValue, E> {
        Ok(IntegerValue::NonNegative(v.into()))
    }
    fn visit_i128<E: de::Error>(self, v: i128) -> Result<IntegerValue, E> {
        match u128::try_from(v) {
            Ok(v) => self.visit_u128(v),
            Err(_) => Ok(IntegerValue::Negative),
        }
    }
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<IntegerValue, E> {
        Err(E::custom(format!(
            "{} cannot be read as an exact integer; quote large integers or write them in \
             binary with !b",
            v,
        )))
    }
    fn visit_str<E: de::Error>(self, v: &str) -> Result<IntegerValue, E> {
        let s = v.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, s),
        };
        let n = digits
            .parse::<BigUint>()
            .map_err(|e| E::custom(format!("invalid integer {:?}: {}", v, e)))?;
        if negative {
            Ok(IntegerValue::Negative)
        } else {
            Ok(IntegerValue::NonNegative(n))
        }
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<IntegerValue, A::Error> {
        let (tag, variant): (String, _) = data.variant()?;
        let text: String = variant.newtype_variant()?;
        let reversed = match tag.trim_start_matches('!') {
            "b" => false,
            "rb" => true,
            other => {
                return Err(de::Error::custom(format!(
                    "unknown tag !{}; expected !b or !rb",
                    other,
                )))
            }
        };
        parse_binary(&text, reversed)
            .map(IntegerValue::NonNegative)
            .ok_or_else(|| de::Error::custom(format!("invalid binary integer {:?}", text.trim())))
    }
}

/// Parses a string of binary digits, ignoring whitespace.
fn parse_binary(s: &str, reversed: bool) -> Option<BigUint> {
    let mut digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if reversed {
        digits.reverse();
    }
    BigUint::parse_bytes(&digits, 2)
}

impl SettingsFile {
    fn try_into_settings(self) -> Result<Settings> {
        let ignored = [
            ("scaling", self.scaling.is_some()),
            ("out", self.out.is_some()),
            ("format", self.format.is_some()),
        ];
        for &(key, present) in &ignored {
            if present {
                warn!("Ignoring output setting `{}`", key);
            }
        }

        let dimensions = match self.dimensions {
            Some(DimensionsValue::Single(len)) => Some(Dimensions(vec![len])),
            Some(DimensionsValue::List(axes)) => Some(Dimensions(axes)),
            Some(DimensionsValue::Text(s)) => Some(s.parse().map_err(|e: String| anyhow!(e))?),
            None => None,
        };
        let method = self.method.map(|s| s.parse::<RuleKind>()).transpose()?;
        let rule = match self.rule {
            Some(IntegerValue::NonNegative(n)) => Some(n),
            Some(IntegerValue::Negative) => bail!("rule must not be negative"),
            None => None,
        };
        let initial_state = self.initial_state.map(|n| match n {
            IntegerValue::NonNegative(n) => InitialState::Given(n),
            IntegerValue::Negative => InitialState::Random,
        });

        let own = Settings {
            dimensions,
            method,
            rule,
            iterations: self.iterations,
            neighborhood_radius: self.neighborhood_radius,
            initial_state,
            seed: self.seed,
            parallelize: self.parallelize,
            workers: self.workers,
            skip_initial_state: self.skip_initial_state,
        };

        match self.preset {
            Some(name) => {
                debug!("Layering settings over preset {}", name);
                let mut settings = presets::load(&name)?;
                settings.merge(own);
                Ok(settings)
            }
            None => Ok(own),
        }
    }
}
