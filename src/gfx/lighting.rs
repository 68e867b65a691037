//! Light and material descriptors plus their per-frame uniform writes.
//!
//! None of these own GPU state: they are plain values whose contents are
//! pushed into a shader program's uniform interface every frame. The
//! spotlight is camera-mounted — its position and direction are read from
//! the camera at write time and never stored.

use cgmath::Vector3;

use super::camera::FlyCamera;
use super::scene::POINT_LIGHT_POSITIONS;
use super::shader::ShaderProgram;

/// A single sun-style light defined only by direction.
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

/// A positioned light with distance attenuation.
pub struct PointLight {
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// A camera-mounted cone light.
///
/// Cutoff angles are kept in degrees here; they cross the uniform boundary
/// as cosines so the shader compares them against dot products directly.
pub struct SpotLight {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub cut_off_deg: f32,
    pub outer_cut_off_deg: f32,
}

/// Surface reflectance coefficients for the lit cubes.
///
/// Diffuse and specular are coefficient colors multiplied against the
/// sampled material maps; ambient tints the unlit base.
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(1.0, 0.5, 0.31),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(1.0, 1.0, 1.0),
            shininess: 32.0,
        }
    }
}

impl Material {
    pub fn write_uniforms(&self, program: &mut ShaderProgram) {
        program.set_vec3("material.ambient", self.ambient);
        program.set_vec3("material.diffuse", self.diffuse);
        program.set_vec3("material.specular", self.specular);
        program.set_float("material.shininess", self.shininess);
    }
}

/// The full lighting setup: one directional light, four point lights, and
/// the camera spotlight.
pub struct LightRig {
    pub directional: DirectionalLight,
    pub points: [PointLight; 4],
    pub spot: SpotLight,
}

impl Default for LightRig {
    fn default() -> Self {
        let point = |position: Vector3<f32>| PointLight {
            position,
            ambient: Vector3::new(0.05, 0.05, 0.05),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(1.0, 1.0, 1.0),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        };

        Self {
            directional: DirectionalLight {
                direction: Vector3::new(-0.2, -1.0, -0.3),
                ambient: Vector3::new(0.05, 0.05, 0.05),
                diffuse: Vector3::new(0.4, 0.4, 0.4),
                specular: Vector3::new(0.5, 0.5, 0.5),
            },
            points: [
                point(POINT_LIGHT_POSITIONS[0]),
                point(POINT_LIGHT_POSITIONS[1]),
                point(POINT_LIGHT_POSITIONS[2]),
                point(POINT_LIGHT_POSITIONS[3]),
            ],
            spot: SpotLight {
                ambient: Vector3::new(0.0, 0.0, 0.0),
                diffuse: Vector3::new(1.0, 1.0, 1.0),
                specular: Vector3::new(1.0, 1.0, 1.0),
                constant: 1.0,
                linear: 0.09,
                quadratic: 0.032,
                cut_off_deg: 12.5,
                outer_cut_off_deg: 15.0,
            },
        }
    }
}

impl LightRig {
    /// Pushes every light descriptor into the program's uniform interface.
    ///
    /// The spotlight rides the camera: its position and direction come from
    /// the camera snapshot passed in, so this must run after input handling
    /// for the frame.
    pub fn write_uniforms(&self, program: &mut ShaderProgram, camera: &FlyCamera) {
        program.set_vec3("dirLight.direction", self.directional.direction);
        program.set_vec3("dirLight.ambient", self.directional.ambient);
        program.set_vec3("dirLight.diffuse", self.directional.diffuse);
        program.set_vec3("dirLight.specular", self.directional.specular);

        for (index, light) in self.points.iter().enumerate() {
            program.set_vec3(&format!("pointLights[{index}].position"), light.position);
            program.set_vec3(&format!("pointLights[{index}].ambient"), light.ambient);
            program.set_vec3(&format!("pointLights[{index}].diffuse"), light.diffuse);
            program.set_vec3(&format!("pointLights[{index}].specular"), light.specular);
            program.set_float(&format!("pointLights[{index}].constant"), light.constant);
            program.set_float(&format!("pointLights[{index}].linear"), light.linear);
            program.set_float(&format!("pointLights[{index}].quadratic"), light.quadratic);
        }

        program.set_vec3("spotLight.position", camera.position());
        program.set_vec3("spotLight.direction", camera.front());
        program.set_vec3("spotLight.ambient", self.spot.ambient);
        program.set_vec3("spotLight.diffuse", self.spot.diffuse);
        program.set_vec3("spotLight.specular", self.spot.specular);
        program.set_float("spotLight.constant", self.spot.constant);
        program.set_float("spotLight.linear", self.spot.linear);
        program.set_float("spotLight.quadratic", self.spot.quadratic);
        program.set_float("spotLight.cutOff", self.spot.cut_off_deg.to_radians().cos());
        program.set_float(
            "spotLight.outerCutOff",
            self.spot.outer_cut_off_deg.to_radians().cos(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SPOT_VERTEX: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
    "#;

    const SPOT_FRAGMENT: &str = r#"
        struct SpotLight {
            position: vec3<f32>,
            cutOff: f32,
            direction: vec3<f32>,
            outerCutOff: f32,
            ambient: vec3<f32>,
            constant: f32,
            diffuse: vec3<f32>,
            linear: f32,
            specular: vec3<f32>,
            quadratic: f32,
        }
        struct FrameUniforms {
            spotLight: SpotLight,
        }
        @group(0) @binding(0) var<uniform> frame: FrameUniforms;

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(frame.spotLight.diffuse * frame.spotLight.cutOff, 1.0);
        }
    "#;

    fn staged_f32(program: &ShaderProgram, name: &str) -> f32 {
        let offset = program.uniform_offset(name).unwrap() as usize;
        let bytes = &program.staged_bytes()[offset..offset + 4];
        f32::from_le_bytes(bytes.try_into().unwrap())
    }

    fn staged_vec3(program: &ShaderProgram, name: &str) -> [f32; 3] {
        let offset = program.uniform_offset(name).unwrap() as usize;
        let bytes = &program.staged_bytes()[offset..offset + 12];
        let mut out = [0.0f32; 3];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            out[i] = f32::from_le_bytes(chunk.try_into().unwrap());
        }
        out
    }

    #[test]
    fn spot_cutoffs_cross_the_boundary_as_cosines() {
        let mut program = ShaderProgram::from_sources("spot", SPOT_VERTEX, SPOT_FRAGMENT);
        program.build();

        let rig = LightRig::default();
        let camera = FlyCamera::new();
        rig.write_uniforms(&mut program, &camera);

        assert_relative_eq!(
            staged_f32(&program, "spotLight.cutOff"),
            12.5f32.to_radians().cos(),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            staged_f32(&program, "spotLight.outerCutOff"),
            15.0f32.to_radians().cos(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn spotlight_rides_the_camera() {
        let mut program = ShaderProgram::from_sources("spot", SPOT_VERTEX, SPOT_FRAGMENT);
        program.build();

        let rig = LightRig::default();
        let mut camera = FlyCamera::new();
        camera.pointer_delta(0.0, 0.0);
        camera.pointer_delta(250.0, -80.0);
        rig.write_uniforms(&mut program, &camera);

        let position: [f32; 3] = camera.position().into();
        let front: [f32; 3] = camera.front().into();
        assert_eq!(staged_vec3(&program, "spotLight.position"), position);
        assert_eq!(staged_vec3(&program, "spotLight.direction"), front);
    }

    #[test]
    fn default_rig_matches_the_scene_lights() {
        let rig = LightRig::default();
        for (light, position) in rig.points.iter().zip(POINT_LIGHT_POSITIONS) {
            assert_eq!(light.position, position);
        }
        assert_eq!(rig.points[0].constant, 1.0);
        assert_eq!(rig.points[0].linear, 0.09);
        assert_eq!(rig.points[0].quadratic, 0.032);
    }
}
