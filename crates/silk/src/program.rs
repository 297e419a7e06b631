use tracing::{debug, error};

use crate::context::RenderingContext;
use crate::error::{BuildError, StageKind};

/// A linked two-stage program plus the stages it was linked from.
///
/// Only ever constructed after both stages compiled and the link succeeded, so
/// holding one means it is safe to bind for drawing.
pub struct ShaderProgram<C: RenderingContext> {
    vertex: C::Stage,
    fragment: C::Stage,
    program: C::Program,
}

impl<C: RenderingContext> ShaderProgram<C> {
    pub(crate) fn handle(&self) -> &C::Program {
        &self.program
    }

    /// Frees the program, then the fragment stage, then the vertex stage.
    pub fn release(self, context: &mut C) {
        context.release_program(self.program);
        context.release_stage(self.fragment);
        context.release_stage(self.vertex);
        debug!("released silk program and both stages");
    }
}

/// Compiles and links the silk program.
pub struct ProgramBuilder;

impl ProgramBuilder {
    /// Builds a program from vertex and fragment sources.
    ///
    /// Stages are compiled in order; the first failure releases whatever was
    /// already compiled and returns without attempting a link.
    pub fn build<C: RenderingContext>(
        context: &mut C,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ShaderProgram<C>, BuildError> {
        let vertex = compile(context, StageKind::Vertex, vertex_source)?;
        let fragment = match compile(context, StageKind::Fragment, fragment_source) {
            Ok(stage) => stage,
            Err(err) => {
                context.release_stage(vertex);
                return Err(err);
            }
        };

        match context.link_program(&vertex, &fragment) {
            Ok(program) => {
                debug!("linked silk program");
                Ok(ShaderProgram {
                    vertex,
                    fragment,
                    program,
                })
            }
            Err(diagnostic) => {
                error!(%diagnostic, "program link error");
                context.release_stage(fragment);
                context.release_stage(vertex);
                Err(BuildError::LinkFailed { diagnostic })
            }
        }
    }
}

fn compile<C: RenderingContext>(
    context: &mut C,
    stage: StageKind,
    source: &str,
) -> Result<C::Stage, BuildError> {
    context.compile_stage(stage, source).map_err(|diagnostic| {
        error!(%stage, %diagnostic, "shader compile error");
        BuildError::StageCompileFailed { stage, diagnostic }
    })
}
