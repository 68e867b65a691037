//! Uniform-interface reflection over parsed shader modules.
//!
//! A linked program's uniform blocks are flattened once into exact name
//! paths — `model`, `material.shininess`, `pointLights[2].linear` — mapped
//! to byte offsets and types. Setters then resolve names with a single map
//! lookup per call instead of querying the graphics layer every frame.

use std::collections::HashMap;

use naga::{AddressSpace, ArraySize, Handle, Module, ScalarKind, Type, TypeInner, VectorSize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("uniform variable '{0}' carries no group/binding annotation")]
    MissingBinding(String),
    #[error("uniform array '{0}' has no fixed length")]
    UnsizedArray(String),
}

/// Host-settable classification of a uniform leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Uint,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Present in the interface but not settable through the host-side
    /// setter surface (f16, mat3, and friends).
    Unsupported,
}

/// One flattened uniform: where it lives in the block and what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: u32,
    pub ty: UniformType,
}

/// A `var<uniform>` block with its flattened member table.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    /// Byte span of the block, as the shader compiler laid it out.
    pub span: u32,
    pub entries: HashMap<String, UniformSlot>,
}

/// Reflects every uniform-space global in `module`.
pub fn reflect_uniform_blocks(module: &Module) -> Result<Vec<UniformBlock>, ReflectError> {
    let mut blocks = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        let binding = var.binding.as_ref().ok_or_else(|| {
            ReflectError::MissingBinding(var.name.clone().unwrap_or_default())
        })?;

        let ty = &module.types[var.ty];
        let span = ty.inner.size(module.to_ctx());

        let mut entries = HashMap::new();
        match &ty.inner {
            TypeInner::Struct { .. } => {
                flatten(module, var.ty, "", 0, &mut entries)?;
            }
            // A bare uniform variable reflects under its own name.
            inner => {
                entries.insert(
                    var.name.clone().unwrap_or_default(),
                    UniformSlot {
                        offset: 0,
                        ty: classify(inner),
                    },
                );
            }
        }

        blocks.push(UniformBlock {
            group: binding.group,
            binding: binding.binding,
            span,
            entries,
        });
    }

    Ok(blocks)
}

/// Merges the uniform interfaces of two stages into one program interface.
///
/// Blocks that share a (group, binding) pair must agree on their byte span,
/// and any name both stages declare must resolve to the same offset and
/// type; a disagreement is a link failure described by the returned string.
pub fn merge_blocks(
    mut merged: Vec<UniformBlock>,
    other: Vec<UniformBlock>,
) -> Result<Vec<UniformBlock>, String> {
    for block in other {
        let Some(existing) = merged
            .iter_mut()
            .find(|b| b.group == block.group && b.binding == block.binding)
        else {
            merged.push(block);
            continue;
        };

        if existing.span != block.span {
            return Err(format!(
                "uniform block at group {} binding {} spans {} bytes in one stage and {} in the other",
                block.group, block.binding, existing.span, block.span
            ));
        }
        for (name, slot) in block.entries {
            match existing.entries.get(&name) {
                Some(found) if *found != slot => {
                    return Err(format!(
                        "uniform '{}' is laid out differently across stages (offset {} vs {})",
                        name, found.offset, slot.offset
                    ));
                }
                Some(_) => {}
                None => {
                    existing.entries.insert(name, slot);
                }
            }
        }
    }
    Ok(merged)
}

fn flatten(
    module: &Module,
    ty: Handle<Type>,
    prefix: &str,
    offset: u32,
    entries: &mut HashMap<String, UniformSlot>,
) -> Result<(), ReflectError> {
    match &module.types[ty].inner {
        TypeInner::Struct { members, .. } => {
            for member in members {
                let name = member.name.as_deref().unwrap_or("<anonymous>");
                let path = if prefix.is_empty() {
                    name.to_string()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten(module, member.ty, &path, offset + member.offset, entries)?;
            }
        }
        TypeInner::Array { base, size, stride } => {
            let ArraySize::Constant(len) = size else {
                return Err(ReflectError::UnsizedArray(prefix.to_string()));
            };
            for index in 0..len.get() {
                let path = format!("{prefix}[{index}]");
                flatten(module, *base, &path, offset + index * stride, entries)?;
            }
        }
        inner => {
            entries.insert(
                prefix.to_string(),
                UniformSlot {
                    offset,
                    ty: classify(inner),
                },
            );
        }
    }
    Ok(())
}

fn classify(inner: &TypeInner) -> UniformType {
    match inner {
        TypeInner::Scalar(scalar) => match (scalar.kind, scalar.width) {
            (ScalarKind::Float, 4) => UniformType::Float,
            (ScalarKind::Sint, 4) => UniformType::Int,
            (ScalarKind::Uint, 4) => UniformType::Uint,
            _ => UniformType::Unsupported,
        },
        TypeInner::Vector { size, scalar }
            if scalar.kind == ScalarKind::Float && scalar.width == 4 =>
        {
            match size {
                VectorSize::Bi => UniformType::Vec2,
                VectorSize::Tri => UniformType::Vec3,
                VectorSize::Quad => UniformType::Vec4,
            }
        }
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar.kind == ScalarKind::Float && scalar.width == 4 => UniformType::Mat4,
        _ => UniformType::Unsupported,
    }
}
