use crate::shader::ShaderSources;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,

    pub gl_version: GlVersion,
    pub profile: Profile,
    pub vsync: bool,

    pub clear_color: [f32; 4],
    pub wireframe: bool,

    pub shaders: ShaderSources,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_string(),
            width: 800,
            height: 600,
            gl_version: GlVersion { major: 3, minor: 3 },
            profile: Profile::Core,
            vsync: true,
            clear_color: [0.2, 0.3, 0.3, 1.0],
            wireframe: false,
            shaders: ShaderSources::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlVersion {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for GlVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Profile {
    Core,
    Compatibility,
}
