//! The shader files shipped in `shaders/` must expose the exact uniform
//! interface the renderer writes each frame. Names are checked verbatim;
//! a drifting member name shader-side would otherwise fail silently at
//! runtime, since setters drop writes to unknown names by design.

use std::path::PathBuf;

use cgmath::Vector3;
use lantern::gfx::camera::FlyCamera;
use lantern::gfx::lighting::{LightRig, Material};
use lantern::gfx::shader::{BuildState, ShaderProgram};

fn shader_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("shaders")
        .join(name)
}

fn scene_program() -> ShaderProgram {
    let mut program = ShaderProgram::from_files(
        "scene",
        shader_path("cube.vert.wgsl"),
        shader_path("cube.frag.wgsl"),
    );
    let state = program.build();
    assert_eq!(state, BuildState::Built, "build log:\n{}", program.build_log());
    program
}

fn contract_names() -> Vec<String> {
    let mut names: Vec<String> = ["model", "view", "projection", "viewPos"]
        .into_iter()
        .map(String::from)
        .collect();
    for field in ["ambient", "diffuse", "specular", "shininess"] {
        names.push(format!("material.{field}"));
    }
    for field in ["direction", "ambient", "diffuse", "specular"] {
        names.push(format!("dirLight.{field}"));
    }
    for index in 0..4 {
        for field in [
            "position",
            "ambient",
            "diffuse",
            "specular",
            "constant",
            "linear",
            "quadratic",
        ] {
            names.push(format!("pointLights[{index}].{field}"));
        }
    }
    for field in [
        "position",
        "direction",
        "ambient",
        "diffuse",
        "specular",
        "constant",
        "linear",
        "quadratic",
        "cutOff",
        "outerCutOff",
    ] {
        names.push(format!("spotLight.{field}"));
    }
    names
}

#[test]
fn scene_program_exposes_the_full_uniform_contract() {
    let program = scene_program();
    for name in contract_names() {
        assert!(
            program.uniform_offset(&name).is_some(),
            "uniform '{name}' missing from the linked scene program"
        );
    }
}

#[test]
fn point_light_array_entries_are_evenly_strided() {
    let program = scene_program();
    let offset = |name: &str| program.uniform_offset(name).unwrap();

    let stride = offset("pointLights[1].position") - offset("pointLights[0].position");
    assert!(stride > 0);
    for index in 1..4u32 {
        assert_eq!(
            offset(&format!("pointLights[{index}].position")),
            offset("pointLights[0].position") + index * stride
        );
    }
}

#[test]
fn marker_program_builds_with_its_transform_contract() {
    let mut program = ShaderProgram::from_files(
        "light marker",
        shader_path("light_marker.vert.wgsl"),
        shader_path("light_marker.frag.wgsl"),
    );
    assert_eq!(program.build(), BuildState::Built, "build log:\n{}", program.build_log());

    for name in ["model", "view", "projection"] {
        assert!(program.uniform_offset(name).is_some());
    }
    // The marker program is transform-only; no lighting interface leaks in.
    assert_eq!(program.uniform_offset("dirLight.direction"), None);
}

#[test]
fn one_frame_of_uniform_writes_lands_in_the_staging_block() {
    let mut program = scene_program();
    let mut camera = FlyCamera::new();
    camera.pointer_delta(400.0, 300.0);
    camera.pointer_delta(450.0, 280.0);
    camera.scroll_delta(10.0);

    // The writes the renderer performs per cube, minus the matrices.
    program.set_vec3("viewPos", camera.position());
    Material::default().write_uniforms(&mut program);
    LightRig::default().write_uniforms(&mut program, &camera);

    let offset = program.uniform_offset("material.shininess").unwrap() as usize;
    let staged = &program.staged_bytes()[offset..offset + 4];
    assert_eq!(staged, &32.0f32.to_le_bytes());

    let offset = program.uniform_offset("pointLights[3].quadratic").unwrap() as usize;
    let staged = &program.staged_bytes()[offset..offset + 4];
    assert_eq!(staged, &0.032f32.to_le_bytes());

    let offset = program.uniform_offset("spotLight.direction").unwrap() as usize;
    let staged = &program.staged_bytes()[offset..offset + 12];
    let front: [f32; 3] = camera.front().into();
    assert_eq!(staged, bytemuck::bytes_of(&front));
}

#[test]
fn unknown_uniform_leaves_the_rest_of_the_block_alone() {
    let mut program = scene_program();
    program.set_vec3("material.ambient", Vector3::new(1.0, 0.5, 0.31));
    let before = program.staged_bytes().to_vec();

    program.set_float("material.glossiness", 1.0);
    program.set_vec3("pointLights[4].position", Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(program.staged_bytes(), &before[..]);
}
