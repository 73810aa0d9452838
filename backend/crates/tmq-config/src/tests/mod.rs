
use std::env;
use std::path::Path;

use tempfile::TempDir;

/// Sets or clears one environment variable and restores it on drop.
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let original = env::var(key).ok();
        // Tests touching the environment are #[serial]
        unsafe { env::set_var(key, value) };
        Self { key, original }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        let original = env::var(key).ok();
        unsafe { env::remove_var(key) };
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// A throwaway config directory pointed to by TMQ_CONFIG_DIR.
pub(crate) struct TestEnv {
    dir: TempDir,
    _guards: Vec<EnvGuard>,
}

impl TestEnv {
    /// Config directory only; the broker password is cleared.
    pub(crate) fn bare() -> Self {
        let dir = TempDir::new().unwrap();
        let guards = vec![
            EnvGuard::set("TMQ_CONFIG_DIR", dir.path().to_str().unwrap()),
            EnvGuard::remove("TMQ_BROKER_PASSWORD"),
        ];
        Self {
            dir,
            _guards: guards,
        }
    }

    /// Config directory plus the one setting that has no default.
    pub(crate) fn valid() -> Self {
        let mut env = Self::bare();
        env._guards
            .push(EnvGuard::set("TMQ_BROKER_PASSWORD", "s3cret"));
        env
    }

    pub(crate) fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn write_config(&self, contents: &str) {
        std::fs::write(self.dir().join("config.toml"), contents).unwrap();
    }
}
