//! Shader-program lifecycle: load, build once, set uniforms, bind per draw.
//!
//! The build step runs entirely on the CPU — each stage's WGSL is parsed
//! and validated with naga, then the two stages are linked (entry-point,
//! stage-IO, and uniform-layout checks). A program that fails to build
//! still holds a handle and a build log; binding it is a harmless no-op,
//! so one bad shader degrades the picture instead of taking the app down.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use cgmath::{Matrix4, Vector3};
use naga::{Binding, EntryPoint, Handle, Module, ShaderStage, Type, TypeInner};
use thiserror::Error;

use super::gpu::ProgramGpu;
use super::reflect::{self, UniformBlock, UniformType};

/// Handles are process-unique and never zero, so a zero handle always
/// means "no build attempted yet".
static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

/// The group/binding every program's per-draw uniform block lives at.
pub const FRAME_BLOCK_GROUP: u32 = 0;
pub const FRAME_BLOCK_BINDING: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Unbuilt,
    Built,
    BuildFailed,
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} stage failed to compile:\n{diagnostic}")]
    Compile {
        stage: &'static str,
        diagnostic: String,
    },
    #[error("program failed to link: {0}")]
    Link(String),
}

/// A two-stage GPU program plus the host side of its uniform contract.
pub struct ShaderProgram {
    label: String,
    vertex_source: String,
    fragment_source: String,
    state: BuildState,
    handle: u32,
    vertex_entry: String,
    fragment_entry: String,
    /// The reflected per-draw uniform block, present once linked.
    frame_block: Option<UniformBlock>,
    /// CPU staging for the frame block's bytes; setters write here and the
    /// renderer uploads the whole block per draw slot.
    staged: Vec<u8>,
    build_log: String,
    gpu: Option<ProgramGpu>,
}

impl ShaderProgram {
    /// Creates a program from two WGSL source files.
    ///
    /// An unreadable file degrades to an empty source string and a logged
    /// warning rather than an error: the subsequent [`build`] will then
    /// fail with an ordinary compile diagnostic, which is easier to act on
    /// than an I/O abort at construction time.
    ///
    /// [`build`]: ShaderProgram::build
    pub fn from_files(
        label: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Self {
        let vertex_source = read_source(vertex_path.as_ref());
        let fragment_source = read_source(fragment_path.as_ref());
        Self::from_sources(label, &vertex_source, &fragment_source)
    }

    pub fn from_sources(label: &str, vertex_source: &str, fragment_source: &str) -> Self {
        Self {
            label: label.to_string(),
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
            state: BuildState::Unbuilt,
            handle: 0,
            vertex_entry: String::new(),
            fragment_entry: String::new(),
            frame_block: None,
            staged: Vec::new(),
            build_log: String::new(),
            gpu: None,
        }
    }

    /// Compiles both stages and links them into a usable program.
    ///
    /// Each stage is checked independently; a stage failure is logged and
    /// recorded but the build still proceeds to the link step so that every
    /// diagnostic from one bad edit surfaces in a single run. The final
    /// state is [`BuildState::Built`] only when neither compilation nor
    /// linking produced a diagnostic.
    pub fn build(&mut self) -> BuildState {
        if self.handle == 0 {
            self.handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        }
        self.build_log.clear();
        self.frame_block = None;
        self.staged.clear();

        let vertex = compile_stage("vertex", &self.label, &self.vertex_source, &mut self.build_log);
        let fragment = compile_stage(
            "fragment",
            &self.label,
            &self.fragment_source,
            &mut self.build_log,
        );

        match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => match self.link(&vertex, &fragment) {
                Ok(()) => {
                    self.state = BuildState::Built;
                }
                Err(err) => {
                    record_error(&self.label, &err, &mut self.build_log);
                    self.state = BuildState::BuildFailed;
                }
            },
            _ => {
                let err = ShaderError::Link("one or more stages failed to compile".to_string());
                record_error(&self.label, &err, &mut self.build_log);
                self.state = BuildState::BuildFailed;
            }
        }

        self.state
    }

    fn link(&mut self, vertex: &Module, fragment: &Module) -> Result<(), ShaderError> {
        let vertex_entry = single_entry_point(vertex, ShaderStage::Vertex, "vertex")?;
        let fragment_entry = single_entry_point(fragment, ShaderStage::Fragment, "fragment")?;

        check_stage_io(vertex, vertex_entry, fragment, fragment_entry)?;

        let vertex_blocks = reflect::reflect_uniform_blocks(vertex)
            .map_err(|err| ShaderError::Link(err.to_string()))?;
        let fragment_blocks = reflect::reflect_uniform_blocks(fragment)
            .map_err(|err| ShaderError::Link(err.to_string()))?;
        let merged = reflect::merge_blocks(vertex_blocks, fragment_blocks)
            .map_err(ShaderError::Link)?;

        self.vertex_entry = vertex_entry.name.clone();
        self.fragment_entry = fragment_entry.name.clone();
        self.frame_block = merged
            .into_iter()
            .find(|block| block.group == FRAME_BLOCK_GROUP && block.binding == FRAME_BLOCK_BINDING);
        self.staged = vec![0u8; self.frame_block.as_ref().map_or(0, |b| b.span as usize)];
        Ok(())
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Numeric program handle; non-zero once a build has been attempted,
    /// whether or not it succeeded.
    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Accumulated compile/link diagnostics from the last build.
    pub fn build_log(&self) -> &str {
        &self.build_log
    }

    /// Explicit existence query for a uniform name; the setters themselves
    /// stay silent about unknown names.
    pub fn uniform_offset(&self, name: &str) -> Option<u32> {
        self.frame_block
            .as_ref()
            .and_then(|block| block.entries.get(name))
            .map(|slot| slot.offset)
    }

    /// Byte span of the per-draw uniform block (zero before a successful
    /// link, or when the program declares none).
    pub fn uniform_span(&self) -> u32 {
        self.frame_block.as_ref().map_or(0, |block| block.span)
    }

    /// The staged uniform bytes exactly as they will be uploaded.
    pub fn staged_bytes(&self) -> &[u8] {
        &self.staged
    }

    /// Booleans are staged as 0/1 words; WGSL keeps `bool` out of uniform
    /// blocks, so boolean flags are declared as `u32`/`i32` shader-side.
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.write_uniform(
            name,
            &[UniformType::Uint, UniformType::Int],
            &(value as u32).to_le_bytes(),
        );
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.write_uniform(
            name,
            &[UniformType::Int, UniformType::Uint],
            &value.to_le_bytes(),
        );
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.write_uniform(name, &[UniformType::Float], &value.to_le_bytes());
    }

    pub fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let value: [f32; 3] = value.into();
        self.write_uniform(name, &[UniformType::Vec3], bytemuck::bytes_of(&value));
    }

    pub fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        let value: [[f32; 4]; 4] = value.into();
        self.write_uniform(name, &[UniformType::Mat4], bytemuck::bytes_of(&value));
    }

    /// Writes `bytes` at the slot `name` resolves to.
    ///
    /// A name that is absent from the linked interface — or present with an
    /// incompatible type — is ignored without an error, mirroring how the
    /// graphics layer drops writes to unresolved uniform locations. Callers
    /// that need to detect this use [`uniform_offset`].
    ///
    /// [`uniform_offset`]: ShaderProgram::uniform_offset
    fn write_uniform(&mut self, name: &str, accepted: &[UniformType], bytes: &[u8]) {
        let Some(slot) = self
            .frame_block
            .as_ref()
            .and_then(|block| block.entries.get(name))
        else {
            log::trace!("{}: uniform '{}' not in linked interface", self.label, name);
            return;
        };
        if !accepted.contains(&slot.ty) {
            log::trace!(
                "{}: uniform '{}' has type {:?}, write dropped",
                self.label,
                name,
                slot.ty
            );
            return;
        }
        let start = slot.offset as usize;
        self.staged[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Creates the GPU half of the program: shader modules, pipeline, and
    /// the slotted per-draw uniform buffer.
    ///
    /// For a program that is not [`BuildState::Built`] this logs and creates
    /// nothing; its draws are later skipped, keeping the frame alive in a
    /// visibly degraded state.
    pub fn realize(&mut self, device: &wgpu::Device, params: &super::gpu::RealizeParams) {
        if self.state != BuildState::Built {
            log::warn!(
                "{}: program not built (state {:?}), draws will be skipped",
                self.label,
                self.state
            );
            return;
        }
        self.gpu = Some(ProgramGpu::new(
            device,
            &self.label,
            &self.vertex_source,
            &self.fragment_source,
            &self.vertex_entry,
            &self.fragment_entry,
            self.uniform_span(),
            params,
        ));
    }

    /// Whether draws through this program will actually reach the GPU.
    pub fn is_renderable(&self) -> bool {
        self.gpu.is_some()
    }

    /// Uploads the staged uniform block into draw slot `slot`.
    pub fn upload_slot(&self, queue: &wgpu::Queue, slot: u32) {
        if let Some(gpu) = &self.gpu {
            gpu.upload_slot(queue, slot, &self.staged);
        }
    }

    /// Binds the pipeline and the slot's uniform window for the next draw.
    /// No-op when the program has no GPU state (failed or skipped build).
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        if let Some(gpu) = &self.gpu {
            gpu.bind(pass, slot);
        }
    }
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            log::warn!(
                "failed to read shader source {}: {err}; continuing with empty source",
                path.display()
            );
            String::new()
        }
    }
}

fn record_error(label: &str, err: &ShaderError, build_log: &mut String) {
    log::error!("{label}: {err}");
    build_log.push_str(&err.to_string());
    build_log.push('\n');
}

/// Parses and validates one stage; diagnostics go to the log and the build
/// log, and the stage simply comes back as `None`.
fn compile_stage(
    stage: &'static str,
    label: &str,
    source: &str,
    build_log: &mut String,
) -> Option<Module> {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(err) => {
            let err = ShaderError::Compile {
                stage,
                diagnostic: err.emit_to_string(source),
            };
            record_error(label, &err, build_log);
            return None;
        }
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    match validator.validate(&module) {
        Ok(_) => Some(module),
        Err(err) => {
            let err = ShaderError::Compile {
                stage,
                diagnostic: error_chain(&err),
            };
            record_error(label, &err, build_log);
            None
        }
    }
}

/// Flattens an error and its source chain into one readable line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn single_entry_point<'m>(
    module: &'m Module,
    stage: ShaderStage,
    stage_name: &str,
) -> Result<&'m EntryPoint, ShaderError> {
    let mut matching = module.entry_points.iter().filter(|ep| ep.stage == stage);
    let entry = matching
        .next()
        .ok_or_else(|| ShaderError::Link(format!("{stage_name} stage has no entry point")))?;
    if matching.next().is_some() {
        return Err(ShaderError::Link(format!(
            "{stage_name} stage has more than one entry point"
        )));
    }
    Ok(entry)
}

/// Verifies every fragment stage-IO input is fed by a vertex output of the
/// same location and type.
fn check_stage_io(
    vertex: &Module,
    vertex_entry: &EntryPoint,
    fragment: &Module,
    fragment_entry: &EntryPoint,
) -> Result<(), ShaderError> {
    let mut outputs = HashMap::new();
    if let Some(result) = &vertex_entry.function.result {
        collect_io(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = HashMap::new();
    for arg in &fragment_entry.function.arguments {
        collect_io(fragment, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for (location, input_ty) in &inputs {
        match outputs.get(location) {
            None => {
                return Err(ShaderError::Link(format!(
                    "fragment input at location {location} has no matching vertex output"
                )));
            }
            Some(output_ty) if output_ty != input_ty => {
                return Err(ShaderError::Link(format!(
                    "location {location} is {output_ty} out of the vertex stage but {input_ty} into the fragment stage"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn collect_io(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    io: &mut HashMap<u32, String>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            io.insert(*location, type_signature(module, ty));
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_io(module, member.ty, member.binding.as_ref(), io);
                }
            }
        }
    }
}

fn type_signature(module: &Module, ty: Handle<Type>) -> String {
    fn scalar_name(scalar: &naga::Scalar) -> String {
        match scalar.kind {
            naga::ScalarKind::Float => format!("f{}", scalar.width * 8),
            naga::ScalarKind::Sint => format!("i{}", scalar.width * 8),
            naga::ScalarKind::Uint => format!("u{}", scalar.width * 8),
            naga::ScalarKind::Bool => "bool".to_string(),
            _ => "unknown".to_string(),
        }
    }
    fn count(size: naga::VectorSize) -> u32 {
        match size {
            naga::VectorSize::Bi => 2,
            naga::VectorSize::Tri => 3,
            naga::VectorSize::Quad => 4,
        }
    }

    match &module.types[ty].inner {
        TypeInner::Scalar(scalar) => scalar_name(scalar),
        TypeInner::Vector { size, scalar } => {
            format!("vec{}<{}>", count(*size), scalar_name(scalar))
        }
        TypeInner::Matrix {
            columns,
            rows,
            scalar,
        } => format!("mat{}x{}<{}>", count(*columns), count(*rows), scalar_name(scalar)),
        other => format!("{other:?}"),
    }
}
