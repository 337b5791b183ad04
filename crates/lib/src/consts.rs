//! Shared constants.

/// The only manifest format version this crate reads and writes.
pub const MANIFEST_VERSION: u32 = 1;

/// Version attribute stamped on the runtime (content root) manifest.
pub const RUNTIME_MANIFEST_VERSION: &str = "1.0";

/// Default file name of the build manifest.
pub const BUILD_MANIFEST_FILENAME: &str = "staticwebassets.build.json";

/// Default file name of the publish manifest.
pub const PUBLISH_MANIFEST_FILENAME: &str = "staticwebassets.publish.json";

/// Default file name of the runtime manifest.
pub const RUNTIME_MANIFEST_FILENAME: &str = "staticwebassets.runtime.xml";

/// Metadata key used by the build engine to hand out an absolute path.
pub const FULL_PATH_METADATA: &str = "FullPath";

/// Metadata key carrying a precomputed base64 SHA-256 of an asset's content.
pub const INTEGRITY_METADATA: &str = "Integrity";

/// Metadata key carrying a copy destination.
pub const TARGET_PATH_METADATA: &str = "TargetPath";
