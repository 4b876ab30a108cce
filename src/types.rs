//shared conversions between cgmath values and GPU-visible arrays
use cgmath::{Matrix4, Vector3};

pub fn mat4_to_array(m: &Matrix4<f32>) -> [[f32; 4]; 4] {
    [
        [m.x.x, m.x.y, m.x.z, m.x.w],
        [m.y.x, m.y.y, m.y.z, m.y.w],
        [m.z.x, m.z.y, m.z.z, m.z.w],
        [m.w.x, m.w.y, m.w.z, m.w.w],
    ]
}

pub fn vec3_to_array(v: Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}
