//! Device motion preferences
//!
//! Visitors can turn the animated background off from the site itself. The
//! choice is stored locally and takes precedence over the operating system's
//! reduced-motion setting.

use serde::{Deserialize, Serialize};

use crate::kv::{KvStore, Result, Scope};

const MOTION_KEY: &str = "motion";

/// Persisted motion preferences for one device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionPreferences {
    /// Manual reduced-motion override; `None` defers to the OS setting
    #[serde(default)]
    pub reduced_motion_override: Option<bool>,
}

impl MotionPreferences {
    /// Resolve the effective preference
    ///
    /// The manual override wins; otherwise the OS setting is used. When
    /// neither is known motion is treated as allowed.
    pub fn effective_reduced_motion(&self, os_prefers_reduced: Option<bool>) -> bool {
        self.reduced_motion_override.or(os_prefers_reduced).unwrap_or(false)
    }
}

/// Store for the manual reduced-motion override
#[derive(Clone)]
pub struct MotionOverrideStore {
    scope: Scope,
}

impl MotionOverrideStore {
    /// Scope name used for device preference keys
    pub const SCOPE: &'static str = "device";

    /// Open the device scope of a key-value store
    pub fn new(kv: &KvStore) -> Result<Self> {
        Ok(Self {
            scope: kv.scope(Self::SCOPE)?,
        })
    }

    /// Load preferences, returning defaults when nothing is stored
    pub fn load(&self) -> Result<MotionPreferences> {
        Ok(self.scope.get(MOTION_KEY)?.unwrap_or_default())
    }

    /// Current manual override, if any
    pub fn get_override(&self) -> Result<Option<bool>> {
        Ok(self.load()?.reduced_motion_override)
    }

    /// Set or clear the manual override
    pub fn set_override(&self, reduced: Option<bool>) -> Result<()> {
        let prefs = MotionPreferences {
            reduced_motion_override: reduced,
        };
        self.scope.set(MOTION_KEY, &prefs)?;
        tracing::debug!(?reduced, "Updated reduced-motion override");
        Ok(())
    }

    /// Remove the manual override so the OS setting applies again
    pub fn clear(&self) -> Result<()> {
        self.scope.remove(MOTION_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_defaults_to_none() {
        let kv = KvStore::in_memory().unwrap();
        let store = MotionOverrideStore::new(&kv).unwrap();
        assert_eq!(store.get_override().unwrap(), None);
        assert_eq!(store.load().unwrap(), MotionPreferences::default());
    }

    #[test]
    fn test_set_and_clear_override() {
        let kv = KvStore::in_memory().unwrap();
        let store = MotionOverrideStore::new(&kv).unwrap();

        store.set_override(Some(true)).unwrap();
        assert_eq!(store.get_override().unwrap(), Some(true));

        store.set_override(Some(false)).unwrap();
        assert_eq!(store.get_override().unwrap(), Some(false));

        store.clear().unwrap();
        assert_eq!(store.get_override().unwrap(), None);
    }

    #[test]
    fn test_effective_preference_precedence() {
        let none = MotionPreferences::default();
        assert!(!none.effective_reduced_motion(None));
        assert!(none.effective_reduced_motion(Some(true)));
        assert!(!none.effective_reduced_motion(Some(false)));

        let forced_off = MotionPreferences {
            reduced_motion_override: Some(false),
        };
        assert!(!forced_off.effective_reduced_motion(Some(true)));

        let forced_on = MotionPreferences {
            reduced_motion_override: Some(true),
        };
        assert!(forced_on.effective_reduced_motion(Some(false)));
        assert!(forced_on.effective_reduced_motion(None));
    }

    #[test]
    fn test_preferences_serialization() {
        let prefs = MotionPreferences {
            reduced_motion_override: Some(true),
        };
        let json = serde_json::to_string(&prefs).unwrap();
        assert_eq!(json, r#"{"reducedMotionOverride":true}"#);

        let parsed: MotionPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.reduced_motion_override, None);
    }
}
