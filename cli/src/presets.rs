//! Built-in simulation presets.

use anyhow::{anyhow, Context, Result};

use crate::settings::Settings;

/// Names of all built-in presets.
pub const NAMES: [&str; 3] = ["b4s4", "life", "rule30"];

/// Returns the YAML source of a built-in preset.
fn source(name: &str) -> Option<&'static str> {
    match name {
        "b4s4" => Some(include_str!("../presets/b4s4.yaml")),
        "life" => Some(include_str!("../presets/life.yaml")),
        "rule30" => Some(include_str!("../presets/rule30.yaml")),
        _ => None,
    }
}

/// Loads a built-in preset.
pub fn load(name: &str) -> Result<Settings> {
    let source = source(name).ok_or_else(|| {
        anyhow!(
            "unknown preset {:?}; expected one of {}",
            name,
            NAMES.join(", "),
        )
    })?;
    Settings::from_yaml(source).with_context(|| format!("invalid preset {:?}", name))
}

#[cfg(test)]
mod tests {
    use ndtorus_core::prelude::*;

    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for &name in &NAMES {
            let config = load(name).unwrap().into_config().unwrap();
            assert_eq!(Ok(()), config.validate(), "preset {}", name);
        }
    }

    #[test]
    fn test_preset_rules() {
        let life = load("life").unwrap();
        assert_eq!(Some(CountRule::encode(8, &[3], &[2, 3])), life.rule);

        let b4s4 = load("b4s4").unwrap();
        assert_eq!(Some(CountRule::encode(26, &[4], &[4])), b4s4.rule);

        let rule30 = load("rule30").unwrap().into_config().unwrap();
        assert_eq!(RuleKind::Pattern, rule30.kind);
        assert_eq!(Some(BigUint::from(1_u32) << 128), rule30.initial_state);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load("hashlife").is_err());
    }
}
