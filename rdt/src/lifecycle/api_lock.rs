/*
 * Copyright 2024 Fluence Labs Limited
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::fs::File;
use std::fs::OpenOptions;
use std::os::fd::AsRawFd;
use std::path::Path;
use std::path::PathBuf;

use nix::fcntl::flock;
use nix::fcntl::FlockArg;

use crate::RDTError;
use crate::RDTResult;

/// Advisory lock file shared with other processes using the same path.
#[derive(Debug)]
pub(crate) struct LockFile {
    file: File,
    path: PathBuf,
}

/// Holds the cross-process lock until dropped.
#[derive(Debug)]
pub(crate) struct FileLockGuard<'lock> {
    lock_file: &'lock LockFile,
}

impl LockFile {
    pub(crate) fn open(path: impl AsRef<Path>) -> RDTResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|io_error| RDTError::lock_file(path, io_error))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until the exclusive lock is taken. Failures are only logged,
    /// the in-process mutex still serializes callers of this process.
    pub(crate) fn lock(&self) -> FileLockGuard<'_> {
        if let Err(errno) = flock(self.file.as_raw_fd(), FlockArg::LockExclusive) {
            tracing::error!("Failed to lock {:?}: {errno}", self.path);
        }

        FileLockGuard { lock_file: self }
    }
}

impl Drop for FileLockGuard<'_> {
    fn drop(&mut self) {
        let lock_file = self.lock_file;
        if let Err(errno) = flock(lock_file.file.as_raw_fd(), FlockArg::Unlock) {
            tracing::error!("Failed to unlock {:?}: {errno}", lock_file.path);
        }
    }
}
