use crate::render::{self, Context, Problem, Program, ShaderStage};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const GLSL_VERSION: &str = "330 core";

static TRIANGLE_VERT_SHADER: &str =
    include_str!(concat!(env!("OUT_DIR"), "/shaders/triangle.vert"));
static TRIANGLE_FRAG_SHADER: &str =
    include_str!(concat!(env!("OUT_DIR"), "/shaders/triangle.frag"));

/// Where a shader stage gets its GLSL from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShaderSource {
    /// The triangle shaders compiled into the binary.
    #[default]
    Builtin,
    File(PathBuf),
    Inline(String),
}

impl ShaderSource {
    pub fn load(&self, stage: ShaderStage) -> Result<Cow<'static, str>, Problem> {
        match self {
            ShaderSource::Builtin => Ok(Cow::Borrowed(builtin(stage))),
            ShaderSource::File(path) => read_source(path).map(|source| with_version(source).into()),
            ShaderSource::Inline(source) => Ok(with_version(source.clone()).into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShaderSources {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

/// A linked vertex + fragment program.
pub struct Shader {
    program: Program,
}

impl Shader {
    pub fn new(context: &Context, sources: &ShaderSources) -> Result<Self, Problem> {
        let vertex = sources.vertex.load(ShaderStage::Vertex)?;
        let fragment = sources.fragment.load(ShaderStage::Fragment)?;
        log::debug!(
            "Compiling shaders from {:?} and {:?}",
            sources.vertex,
            sources.fragment
        );

        let program = Program::new(context, (vertex.as_ref(), fragment.as_ref()))?;

        Ok(Self { program })
    }

    pub fn activate(&self) {
        self.program.use_program();
    }

    pub fn program(&self) -> &render::Program {
        &self.program
    }
}

fn builtin(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => TRIANGLE_VERT_SHADER,
        ShaderStage::Fragment => TRIANGLE_FRAG_SHADER,
    }
}

fn read_source(path: &Path) -> Result<String, Problem> {
    std::fs::read_to_string(path).map_err(|source| Problem::CannotReadShader {
        path: path.to_path_buf(),
        source,
    })
}

/// Log a shader failure and carry on without the program.
///
/// A broken shader is not fatal: the window still opens and clears.
pub fn report_failure<T>(result: Result<T, Problem>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(problem) => {
            log::error!("{}", problem);
            None
        }
    }
}

/// Prepend the `#version` directive unless the source already declares one.
pub fn with_version(source: String) -> String {
    if declares_version(&source) {
        source
    } else {
        format!("#version {}\n{}", GLSL_VERSION, source)
    }
}

// `#version` must be the first token, but comments and whitespace may
// come before it.
fn declares_version(source: &str) -> bool {
    let mut rest = source;

    loop {
        rest = rest.trim_start();

        if let Some(comment) = rest.strip_prefix("//") {
            rest = comment.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(comment) = rest.strip_prefix("/*") {
            match comment.split_once("*/") {
                Some((_, tail)) => rest = tail,
                None => return false,
            }
        } else {
            return rest.starts_with("#version");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn builtin_shaders_carry_the_version_header() {
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let source = ShaderSource::Builtin.load(stage).unwrap();
            assert!(source.starts_with("#version 330 core\n"));
        }
    }

    #[test]
    fn builtin_vertex_shader_declares_both_attributes() {
        let source = ShaderSource::Builtin.load(ShaderStage::Vertex).unwrap();
        assert!(source.contains("layout (location = 0) in vec3 aPos;"));
        assert!(source.contains("layout (location = 1) in vec3 aColor;"));
    }

    #[test]
    fn version_is_only_added_once() {
        let versioned = "#version 410 core\nvoid main() {}".to_string();
        assert_eq!(with_version(versioned.clone()), versioned);
        assert_eq!(
            with_version("void main() {}".to_string()),
            "#version 330 core\nvoid main() {}"
        );
    }

    #[test]
    fn leading_comments_keep_a_single_version() {
        for source in [
            "// flat colour\n#version 410 core\nvoid main() {}",
            "/* flat\n colour */\n\n  #version 410 core\nvoid main() {}",
            "// one\n/* two */ // three\n#version 410 core\nvoid main() {}",
        ] {
            let versioned = with_version(source.to_string());
            assert_eq!(versioned, source);
            assert_eq!(versioned.matches("#version").count(), 1);
        }
    }

    #[test]
    fn version_after_code_or_in_comments_does_not_count() {
        let commented = "// #version 410 core\nvoid main() {}";
        assert!(with_version(commented.to_string()).starts_with("#version 330 core\n"));

        let unterminated = "/* #version 410 core\nvoid main() {}";
        assert!(with_version(unterminated.to_string()).starts_with("#version 330 core\n"));

        let late = "void main() {}\n#version 410 core\n";
        assert!(with_version(late.to_string()).starts_with("#version 330 core\n"));
    }

    #[test]
    fn shader_failures_are_reported_not_fatal() {
        let failed: Result<(), Problem> = Err(Problem::CannotLinkProgram("no main".to_string()));
        assert!(report_failure(failed).is_none());

        let compiled: Result<u32, Problem> = Ok(7);
        assert_eq!(report_failure(compiled), Some(7));
    }

    #[test]
    fn loads_sources_from_files() {
        let dir = std::env::temp_dir().join(format!("glitter-shader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flat.frag");
        fs::write(&path, "out vec4 c;\nvoid main() { c = vec4(1.0); }\n").unwrap();

        let source = ShaderSource::File(path.clone())
            .load(ShaderStage::Fragment)
            .unwrap();
        assert_eq!(
            source,
            "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_files_report_their_path() {
        let path = PathBuf::from("definitely/not/here.vert");
        match ShaderSource::File(path.clone()).load(ShaderStage::Vertex) {
            Err(Problem::CannotReadShader { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn inline_sources_are_versioned() {
        let source = ShaderSource::Inline("void main() {}".to_string())
            .load(ShaderStage::Vertex)
            .unwrap();
        assert_eq!(source, "#version 330 core\nvoid main() {}");
    }
}
