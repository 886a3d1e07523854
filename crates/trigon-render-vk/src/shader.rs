// SPDX-License-Identifier: CEPL-1.0
use ash::util::read_spv;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RenderError, RenderResult};

pub const VERTEX_SHADER_FILE: &str = "shader.vert.spv";
pub const FRAGMENT_SHADER_FILE: &str = "shader.frag.spv";

/// Pre-compiled SPIR-V for the two fixed stages, as 32-bit words.
#[derive(Clone, Debug)]
pub struct ShaderBlobs {
    pub vertex: Vec<u32>,
    pub fragment: Vec<u32>,
}

impl ShaderBlobs {
    /// Reads `shader.vert.spv` and `shader.frag.spv` from `dir`.
    pub fn load_dir(dir: &Path) -> RenderResult<Self> {
        Ok(ShaderBlobs {
            vertex: load_spirv(&dir.join(VERTEX_SHADER_FILE))?,
            fragment: load_spirv(&dir.join(FRAGMENT_SHADER_FILE))?,
        })
    }
}

/// Reads a SPIR-V binary verbatim, zero-padding it to a whole number of words.
pub fn load_spirv(path: &Path) -> RenderResult<Vec<u32>> {
    let read_err = |source: io::Error| RenderError::ShaderRead {
        path: path.to_path_buf(),
        source,
    };

    let mut bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RenderError::ShaderNotFound {
                path: PathBuf::from(path),
            })
        }
        Err(e) => return Err(read_err(e)),
    };
    if bytes.is_empty() {
        return Err(read_err(io::Error::new(
            io::ErrorKind::InvalidData,
            "shader binary is empty",
        )));
    }

    bytes.resize(bytes.len().next_multiple_of(4), 0);
    let words = read_spv(&mut Cursor::new(&bytes)).map_err(read_err)?;
    debug!("loaded {} ({} words)", path.display(), words.len());
    Ok(words)
}
