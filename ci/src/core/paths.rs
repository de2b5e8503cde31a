//! Path layout anchored at the project root.
//!
//! Every location the pipeline touches is derived from a single absolute
//! root by relative joins, so the whole tree can be pointed at a temp
//! directory in tests. No other component hard-codes an absolute path.

use std::path::{Path, PathBuf};

/// Loader checkout directory name under the external tree.
const LOADER_DIR: &str = "loader";
/// Device-tools checkout directory name (hosts the mock driver).
const TOOLS_DIR: &str = "device-tools";
/// Test-framework checkout directory name.
const TEST_FRAMEWORK_DIR: &str = "googletest";
/// Headers checkout resolved by the layer repository's dependency helper.
const HEADERS_DIR: &str = "headers";
/// API registry directory inside the headers checkout.
const REGISTRY_DIR: &str = "registry";
/// Driver manifest file name.
const MANIFEST_FILE: &str = "mock_driver.json";

/// Resolver for project-root-relative locations.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
    external_dir: String,
    build_dir: String,
}

impl Paths {
    pub fn new(
        root: impl Into<PathBuf>,
        external_dir: impl Into<String>,
        build_dir: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            external_dir: external_dir.into(),
            build_dir: build_dir.into(),
        }
    }

    /// Project root; never mutated after construction.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a fragment relative to the project root.
    pub fn resolve(&self, fragment: impl AsRef<Path>) -> PathBuf {
        self.root.join(fragment)
    }

    /// External-dependencies subtree.
    pub fn external(&self) -> PathBuf {
        self.root.join(&self.external_dir)
    }

    /// External-dependencies directory name, for tools that take it as a
    /// root-relative argument.
    pub fn external_dir_name(&self) -> &str {
        &self.external_dir
    }

    /// Build-output subtree of the project root.
    pub fn build(&self) -> PathBuf {
        self.root.join(&self.build_dir)
    }

    /// Per-project build-output directory name.
    pub fn build_dir_name(&self) -> &str {
        &self.build_dir
    }

    /// Loader checkout.
    pub fn loader(&self) -> PathBuf {
        self.external().join(LOADER_DIR)
    }

    /// Loader build tree.
    pub fn loader_build(&self) -> PathBuf {
        self.loader().join(&self.build_dir)
    }

    /// Dynamic libraries produced by the loader build.
    pub fn loader_libs(&self) -> PathBuf {
        self.loader_build().join("loader")
    }

    /// Device-tools checkout (mock driver sources and generator).
    pub fn device_tools(&self) -> PathBuf {
        self.external().join(TOOLS_DIR)
    }

    /// Device-tools build tree.
    pub fn device_tools_build(&self) -> PathBuf {
        self.device_tools().join(&self.build_dir)
    }

    /// Test-framework checkout.
    pub fn test_framework(&self) -> PathBuf {
        self.external().join(TEST_FRAMEWORK_DIR)
    }

    /// API registry consumed by the source generators.
    pub fn registry(&self) -> PathBuf {
        self.external().join(HEADERS_DIR).join(REGISTRY_DIR)
    }

    /// Layer binaries inside the root build tree.
    pub fn layers_out(&self) -> PathBuf {
        self.build().join("layers")
    }

    /// Checked-in driver manifest shipped with the device-tools sources.
    pub fn driver_manifest_source(&self) -> PathBuf {
        self.device_tools()
            .join("driver")
            .join("linux")
            .join(MANIFEST_FILE)
    }

    /// Driver manifest location next to the built driver binary.
    pub fn driver_manifest(&self) -> PathBuf {
        self.device_tools_build().join("driver").join(MANIFEST_FILE)
    }

    /// Compiled layer validation test binary.
    pub fn test_binary(&self) -> PathBuf {
        self.build().join("tests").join("layer_validation_tests")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> Paths {
        Paths::new("/srv/layers", "external", "build")
    }

    #[test]
    fn resolve_joins_under_root() {
        assert_eq!(
            paths().resolve("scripts/generate_source.py"),
            PathBuf::from("/srv/layers/scripts/generate_source.py")
        );
    }

    #[test]
    fn layout_names_are_honored() {
        let paths = Paths::new("/srv/layers", "third_party", "out");
        assert_eq!(paths.external(), PathBuf::from("/srv/layers/third_party"));
        assert_eq!(paths.build(), PathBuf::from("/srv/layers/out"));
        assert_eq!(
            paths.loader_build(),
            PathBuf::from("/srv/layers/third_party/loader/out")
        );
    }

    #[test]
    fn driver_manifest_lands_in_the_driver_build_tree() {
        assert_eq!(
            paths().driver_manifest(),
            PathBuf::from("/srv/layers/external/device-tools/build/driver/mock_driver.json")
        );
        assert_eq!(
            paths().driver_manifest_source(),
            PathBuf::from("/srv/layers/external/device-tools/driver/linux/mock_driver.json")
        );
    }

    #[test]
    fn registry_lives_in_the_headers_checkout() {
        assert_eq!(
            paths().registry(),
            PathBuf::from("/srv/layers/external/headers/registry")
        );
    }
}
