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

use std::io::ErrorKind;
use std::path::Path;

use crate::RDTError;
use crate::RDTResult;

/// Looks for a substring in any line of the file, a missing file contains
/// nothing.
pub(crate) fn file_contains(path: &Path, needle: &str) -> RDTResult<bool> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().any(|line| line.contains(needle))),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not found", path.display());
            Ok(false)
        }
        Err(error) => Err(RDTError::resctrl_io(path, error)),
    }
}

pub(crate) fn read_trimmed(path: &Path) -> RDTResult<String> {
    let content =
        std::fs::read_to_string(path).map_err(|error| RDTError::resctrl_io(path, error))?;
    Ok(content.trim().to_string())
}

pub(crate) fn read_u64(path: &Path, radix: u32) -> RDTResult<u64> {
    let content = read_trimmed(path)?;
    u64::from_str_radix(&content, radix).map_err(|error| {
        tracing::error!("Error converting '{content}' to unsigned number");
        RDTError::resctrl_parse(path, error.to_string())
    })
}

pub(crate) fn read_u32(path: &Path, radix: u32) -> RDTResult<u32> {
    let value = read_u64(path, radix)?;
    u32::try_from(value)
        .map_err(|_| RDTError::resctrl_parse(path, format!("{value} doesn't fit into u32")))
}

pub(crate) fn read_f64(path: &Path) -> RDTResult<f64> {
    let content = read_trimmed(path)?;
    content
        .parse::<f64>()
        .map_err(|error| RDTError::resctrl_parse(path, error.to_string()))
}
