//! Wavefront OBJ geometry reader.
//!
//! Only what the viewer draws is read: positions (`v`), texture coordinates
//! (`vt`), normals (`vn`) and polygonal faces (`f`). Faces are fan
//! triangulated. Groups, smoothing and line elements are skipped; material
//! statements are read separately by [`crate::material`].

use std::collections::HashMap;

use thiserror::Error;

use crate::mesh::{MeshData, Vertex};

#[derive(Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: malformed `{keyword}` statement")]
    Malformed { line: usize, keyword: String },
    #[error("line {line}: index {index} is out of range")]
    IndexOutOfRange { line: usize, index: i64 },
    #[error("line {line}: face has fewer than 3 vertices")]
    DegenerateFace { line: usize },
    #[error("model has no faces")]
    Empty,
}

/// One face corner: resolved 0-based indices into the attribute pools.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct Builder {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    mesh: MeshData,
    // only corners with an explicit normal are shared between faces
    shared: HashMap<Corner, u32>,
}

pub fn parse_obj(text: &str) -> Result<MeshData, ObjError> {
    let mut b = Builder::default();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let mut parts = content.split_whitespace();
        let Some(keyword) = parts.next() else { continue };

        match keyword {
            "v" => {
                let [x, y, z] = floats::<3>(&mut parts, line, keyword)?;
                b.positions.push([x, y, z]);
            }
            "vt" => {
                let [u, v] = floats::<2>(&mut parts, line, keyword)?;
                b.uvs.push([u, v]);
            }
            "vn" => {
                let [x, y, z] = floats::<3>(&mut parts, line, keyword)?;
                b.normals.push([x, y, z]);
            }
            "f" => {
                let corners = parts
                    .map(|token| b.corner(token, line))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(ObjError::DegenerateFace { line });
                }
                b.face(&corners);
            }
            _ => {}
        }
    }

    if b.mesh.indices.is_empty() {
        return Err(ObjError::Empty);
    }
    Ok(b.mesh)
}

fn floats<const N: usize>(
    parts: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    keyword: &str,
) -> Result<[f32; N], ObjError> {
    let malformed = || ObjError::Malformed { line, keyword: keyword.to_owned() };
    let mut out = [0.0; N];
    for slot in &mut out {
        *slot = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
    }
    // trailing components (`w`, vertex colors) are ignored
    Ok(out)
}

/// OBJ indices are 1-based; negative values count back from the end.
fn resolve(raw: &str, len: usize, line: usize) -> Result<usize, ObjError> {
    let index: i64 = raw
        .parse()
        .map_err(|_| ObjError::Malformed { line, keyword: "f".to_owned() })?;
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len as i64 + i,
        _ => -1,
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::IndexOutOfRange { line, index });
    }
    Ok(resolved as usize)
}

impl Builder {
    fn corner(&self, token: &str, line: usize) -> Result<Corner, ObjError> {
        let mut fields = token.split('/');
        let position = resolve(fields.next().unwrap_or(""), self.positions.len(), line)?;
        let uv = match fields.next() {
            Some(s) if !s.is_empty() => Some(resolve(s, self.uvs.len(), line)?),
            _ => None,
        };
        let normal = match fields.next() {
            Some(s) if !s.is_empty() => Some(resolve(s, self.normals.len(), line)?),
            _ => None,
        };
        Ok(Corner { position, uv, normal })
    }

    fn face(&mut self, corners: &[Corner]) {
        let flat = self.face_normal(corners);
        let base: Vec<u32> = corners.iter().map(|c| self.vertex(c, flat)).collect();
        for k in 1..base.len() - 1 {
            self.mesh.indices.extend_from_slice(&[base[0], base[k], base[k + 1]]);
        }
    }

    fn vertex(&mut self, corner: &Corner, flat_normal: [f32; 3]) -> u32 {
        if corner.normal.is_some() {
            if let Some(&index) = self.shared.get(corner) {
                return index;
            }
        }

        let vertex = Vertex {
            position: self.positions[corner.position],
            normal: corner.normal.map_or(flat_normal, |n| self.normals[n]),
            uv: corner.uv.map_or([0.0, 0.0], |t| self.uvs[t]),
        };
        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(vertex);
        if corner.normal.is_some() {
            self.shared.insert(*corner, index);
        }
        index
    }

    /// Normal of the plane through the first three corners, used when the
    /// file supplies none.
    fn face_normal(&self, corners: &[Corner]) -> [f32; 3] {
        let p0 = self.positions[corners[0].position];
        let p1 = self.positions[corners[1].position];
        let p2 = self.positions[corners[2].position];
        let a = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
        let c = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
        let n = [
            a[1] * c[2] - a[2] * c[1],
            a[2] * c[0] - a[0] * c[2],
            a[0] * c[1] - a[1] * c[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len <= f32::EPSILON {
            return [0.0, 0.0, 1.0];
        }
        [n[0] / len, n[1] / len, n[2] / len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn quad_is_fan_triangulated_with_flat_normal() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn corners_with_normals_are_shared() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 1
vn 0 0 1
f 1/1/1 2//1 3/2/1
f 1/1/1 3/2/1 4//1
";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[1].uv, [0.0, 0.0]);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn unknown_statements_are_skipped() {
        let text = "mtllib a.mtl\no thing\ng part\nusemtl red\ns off\nv 0 0 0\nv 1 0 0\nv 0 1 0 1.0\nf 1 2 3\nl 1 2\n";
        assert_eq!(parse_obj(text).unwrap().triangle_count(), 1);
    }

    #[test]
    fn errors_report_the_line() {
        assert_eq!(
            parse_obj("v 0 0\n"),
            Err(ObjError::Malformed { line: 1, keyword: "v".to_owned() })
        );
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 7\n"),
            Err(ObjError::IndexOutOfRange { line: 4, index: 7 })
        );
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(ObjError::DegenerateFace { line: 3 })
        );
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n"),
            Err(ObjError::IndexOutOfRange { line: 4, index: 0 })
        );
        assert_eq!(parse_obj("v 0 0 0\n"), Err(ObjError::Empty));
    }

    #[test]
    fn bundled_cube_parses() {
        let mesh = parse_obj(include_str!("../assets/models/cube.obj")).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertices.len(), 24);
    }
}
