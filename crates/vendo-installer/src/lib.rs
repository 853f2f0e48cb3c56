pub use installer::{Installer, VendorEntry, VendorTree};
pub use redirect::{RedirectConfig, REDIRECT_FILE};

mod installer;
mod redirect;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Extract(#[from] vendo_extract::Error),
    #[error("Two archives claim the vendor entry `{dir_name}`: `{first}` and `{second}`")]
    Collision {
        dir_name: String,
        first: String,
        second: String,
    },
    #[error("Failed to build the unpack thread pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to serialize the redirect config")]
    Serialize(#[from] toml::ser::Error),
}
