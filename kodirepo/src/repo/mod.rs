//! Repository output: layout, archives, checksums, assets and the build pipeline.

mod archive;
mod assets;
mod checksum;
mod error;
mod layout;
mod pipeline;
mod self_addon;

pub use archive::{write_addon_archive, write_addon_archive_filtered, write_directory_archive};
pub use assets::{copy_assets, prepare_output_dir, AssetCopy};
pub use checksum::{calculate_file_checksum, write_checksum_file};
pub use error::{RepoError, RepoResult};
pub use layout::RepoLayout;
pub use pipeline::{BuildReport, RepoBuilder};
pub use self_addon::{render_descriptor, write_repository_addon, write_repository_archive};
