pub use hash::{HashAlgorithm, HashDigest, HashParseError};
pub use manifest::FetchManifest;
pub use template::{FetchDescriptor, RegistryError, RegistryTemplate};

mod hash;
mod manifest;
mod template;
