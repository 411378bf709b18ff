//! Module manifests and the host's asset bundle registry.
//!
//! Registration is an explicit call made by the host's startup sequence;
//! nothing is registered as a side effect of loading a module.

use color_eyre::{eyre::eyre, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Bundle that carries assets loaded with the backend client
pub const BACKEND_BUNDLE: &str = "web.assets_backend";

/// Static description of an add-on module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  pub name: &'static str,
  pub technical_name: &'static str,
  pub version: &'static str,
  pub category: &'static str,
  pub summary: &'static str,
  pub depends: &'static [&'static str],
  /// Bundle name to asset glob patterns
  pub assets: &'static [(&'static str, &'static [&'static str])],
  pub license: &'static str,
}

/// Manifest of this add-on
pub const X2M_SEARCH: Manifest = Manifest {
  name: "X2M Search",
  technical_name: "x2m_search",
  version: env!("CARGO_PKG_VERSION"),
  category: "Tools",
  summary: "Add search, filter, and group by functionality to O2M and M2M tree views",
  depends: &["base", "web"],
  assets: &[(BACKEND_BUNDLE, &["x2m_search/static/src/**/*"])],
  license: env!("CARGO_PKG_LICENSE"),
};

/// Modules every host ships with
pub const CORE_MODULES: &[&str] = &["base", "web"];

/// Installed modules and the assets they contributed to each bundle
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
  installed: BTreeSet<String>,
  bundles: BTreeMap<String, Vec<String>>,
}

impl AssetRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with the core modules already installed
  pub fn with_core() -> Self {
    let mut registry = Self::new();
    for module in CORE_MODULES {
      registry.installed.insert(module.to_string());
    }
    registry
  }

  /// Install a module and add its assets to their bundles.
  ///
  /// Fails if a dependency is not installed. Registering the same module
  /// twice is a no-op.
  pub fn register(&mut self, manifest: &Manifest) -> Result<()> {
    if self.is_installed(manifest.technical_name) {
      return Ok(());
    }

    let missing: Vec<&str> = manifest
      .depends
      .iter()
      .copied()
      .filter(|dep| !self.is_installed(dep))
      .collect();
    if !missing.is_empty() {
      return Err(eyre!(
        "Cannot install {}: missing dependencies {}",
        manifest.technical_name,
        missing.join(", ")
      ));
    }

    for (bundle, patterns) in manifest.assets {
      self
        .bundles
        .entry(bundle.to_string())
        .or_default()
        .extend(patterns.iter().map(|p| p.to_string()));
    }
    self.installed.insert(manifest.technical_name.to_string());

    info!(
      module = manifest.technical_name,
      version = manifest.version,
      "module registered"
    );
    Ok(())
  }

  pub fn is_installed(&self, module: &str) -> bool {
    self.installed.contains(module)
  }

  /// Asset patterns registered into a bundle, in registration order
  pub fn bundle(&self, name: &str) -> &[String] {
    self.bundles.get(name).map(|v| v.as_slice()).unwrap_or(&[])
  }
}
