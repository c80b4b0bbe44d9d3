//! kodirepo - Kodi add-on repository assembly
//!
//! This library turns a folder of add-on sources (loose directories and/or
//! pre-built ZIP archives) into a Kodi repository: a merged `addons.xml`
//! index, one versioned archive per add-on, MD5 checksum files and the
//! declared artwork copied next to each archive.
//!
//! # Overview
//!
//! A run flows through these stages:
//!
//! 1. [`addon::SourceScanner`] discovers add-on sources and reads their
//!    `addon.xml` descriptors
//! 2. [`addon::Resolver`] keeps the newest version of every fresh add-on and
//!    remembers what is already packaged in the repository
//! 3. [`manifest::ManifestBuilder`] merges every known descriptor into
//!    `addons.xml`
//! 4. [`repo::RepoBuilder`] writes archives, checksums and assets
//!
//! Version ordering is handled by [`version::VersionKey`].

pub mod addon;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod repo;
pub mod version;
