//! JSON descriptions of shader programs.
//!
//! A [`ShaderManifest`] names a program, its stage files and its preprocessor definitions:
//!
//! ```json
//! {
//!     "name": "flat",
//!     "vertex": "flat/vert.glsl",
//!     "fragment": "flat/frag.glsl",
//!     "defines": { "USE_FOG": "1" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GlError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderManifest {
    pub name: String,
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defines: BTreeMap<String, String>,
}

impl ShaderManifest {
    pub fn new(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| GlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&s)
    }
}

/// Several manifests keyed by program name, as stored in a single JSON object.
#[derive(Debug, Clone)]
pub struct ShaderManifests {
    map: BTreeMap<String, ShaderManifest>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    vertex: PathBuf,
    fragment: PathBuf,
    #[serde(default)]
    geometry: Option<PathBuf>,
    #[serde(default)]
    defines: BTreeMap<String, String>,
}

impl ShaderManifests {
    pub fn new(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawManifest> = serde_json::from_str(s)?;
        let map = raw
            .into_iter()
            .map(|(name, raw)| {
                let manifest = ShaderManifest {
                    name: name.clone(),
                    vertex: raw.vertex,
                    fragment: raw.fragment,
                    geometry: raw.geometry,
                    defines: raw.defines,
                };
                (name, manifest)
            })
            .collect();
        Ok(Self { map })
    }

    pub fn get(&self, name: &str) -> Option<&ShaderManifest> {
        self.map.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShaderManifest> {
        self.map.values()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abs::ShaderProgram;
    use crate::abs::testing::FakeDevice;

    #[test]
    fn test_manifest_parsing() {
        let manifest = ShaderManifest::new(
            r#"{ "name": "flat", "vertex": "flat.vert", "fragment": "flat.frag", "defines": { "FOG": "1" } }"#,
        )
        .unwrap();
        assert_eq!(manifest.name, "flat");
        assert_eq!(manifest.vertex, PathBuf::from("flat.vert"));
        assert_eq!(manifest.geometry, None);
        assert_eq!(manifest.defines.get("FOG").map(String::as_str), Some("1"));

        assert!(matches!(
            ShaderManifest::new(r#"{ "name": "flat" }"#),
            Err(GlError::Manifest(_))
        ));
    }

    #[test]
    fn test_manifest_collection() {
        let manifests = ShaderManifests::new(
            r#"{
                "ui": { "vertex": "ui.vert", "fragment": "ui.frag" },
                "lines": { "vertex": "l.vert", "fragment": "l.frag", "geometry": "l.geom" }
            }"#,
        )
        .unwrap();
        assert_eq!(manifests.iter().count(), 2);
        let lines = manifests.get("lines").unwrap();
        assert_eq!(lines.name, "lines");
        assert_eq!(lines.geometry, Some(PathBuf::from("l.geom")));
        assert!(manifests.get("terrain").is_none());
    }

    #[test]
    fn test_init_from_manifest() {
        let dir = std::env::temp_dir().join(format!("mp3d-glutil-manifest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.vert"), "#version 330 core\nvoid main() {}\n").unwrap();
        std::fs::write(dir.join("a.frag"), "#version 330 core\nvoid main() {}\n").unwrap();
        std::fs::write(
            dir.join("a.json"),
            r#"{ "name": "a", "vertex": "a.vert", "fragment": "a.frag", "defines": { "LIGHTS": "2" } }"#,
        )
        .unwrap();

        let gl = Arc::new(FakeDevice::new());
        let manifest = ShaderManifest::load(dir.join("a.json")).unwrap();
        let mut shader = ShaderProgram::new(&gl);
        shader.init_from_manifest(&manifest, &dir).unwrap();

        assert!(shader.is_ready());
        assert_eq!(shader.name(), "a");
        assert_eq!(
            shader.definitions().get("LIGHTS").map(String::as_str),
            Some("2")
        );
        assert!(
            gl.state
                .borrow()
                .sources
                .iter()
                .all(|(_, src)| src.starts_with("#version 330 core\n#define LIGHTS 2\n"))
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
