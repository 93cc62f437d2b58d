// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Free space on the volume that will receive operation output.

use crate::MonitorError;
use std::path::{Path, PathBuf};

/// Free-space reading for one mounted volume.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DiskInfo {
    /// Mount point of the volume containing the watched path.
    pub mount_point: PathBuf,
    /// Bytes available to unprivileged writers.
    pub available_bytes: u64,
    /// Volume capacity in bytes.
    pub total_bytes: u64,
}

impl DiskInfo {
    /// Reads free space for the volume holding `path`.
    ///
    /// `path` need not exist yet; its nearest existing ancestor is used.
    pub fn read_for(path: &Path) -> Result<Self, MonitorError> {
        let target = nearest_existing(path);
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let volumes: Vec<DiskInfo> = disks
            .list()
            .iter()
            .map(|d| DiskInfo {
                mount_point: d.mount_point().to_path_buf(),
                available_bytes: d.available_space(),
                total_bytes: d.total_space(),
            })
            .collect();

        select_volume(&target, &volumes)
            .cloned()
            .ok_or_else(|| MonitorError::VolumeNotFound {
                path: target.display().to_string(),
            })
    }

    /// Returns available space in megabytes.
    pub fn available_mb(&self) -> u64 {
        self.available_bytes / (1024 * 1024)
    }
}

/// Picks the volume whose mount point is the longest prefix of `path`.
fn select_volume<'a>(path: &Path, volumes: &'a [DiskInfo]) -> Option<&'a DiskInfo> {
    volumes
        .iter()
        .filter(|v| path.starts_with(&v.mount_point))
        .max_by_key(|v| v.mount_point.components().count())
}

/// Walks up from `path` until an existing directory is found.
fn nearest_existing(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut current = absolute.as_path();
    loop {
        if current.exists() {
            return current
                .canonicalize()
                .unwrap_or_else(|_| current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return PathBuf::from("/"),
        }
    }
}
