//! Wavefront material references (`mtllib`, `usemtl`) and `.mtl` files.
//!
//! The viewer draws a single material: the one named by the first `usemtl`
//! statement, or the first material of the first library when the model
//! never selects one. Only the diffuse color (`Kd`) and diffuse map
//! (`map_Kd`) are read.

use crate::obj::ObjError;

/// Material statements found in an OBJ file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialRefs {
    pub libraries: Vec<String>,
    pub used: Option<String>,
}

pub fn material_refs(obj_text: &str) -> MaterialRefs {
    let mut refs = MaterialRefs::default();
    for raw in obj_text.lines() {
        let content = raw.split('#').next().unwrap_or("").trim();
        if let Some(rest) = content.strip_prefix("mtllib ") {
            refs.libraries.extend(rest.split_whitespace().map(str::to_owned));
        } else if let Some(rest) = content.strip_prefix("usemtl ") {
            if refs.used.is_none() {
                refs.used = Some(rest.trim().to_owned());
            }
        }
    }
    refs
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    /// Image path as written in the file, relative to the `.mtl`.
    pub diffuse_map: Option<String>,
}

impl Material {
    fn named(name: &str) -> Self {
        Self { name: name.to_owned(), diffuse: [1.0; 3], diffuse_map: None }
    }
}

pub fn parse_mtl(text: &str) -> Result<Vec<Material>, ObjError> {
    let mut materials: Vec<Material> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let mut parts = content.split_whitespace();
        let Some(keyword) = parts.next() else { continue };
        let malformed = || ObjError::Malformed { line, keyword: keyword.to_owned() };

        match keyword {
            "newmtl" => {
                let name = parts.next().ok_or_else(malformed)?;
                materials.push(Material::named(name));
            }
            "Kd" => {
                let current = materials.last_mut().ok_or_else(malformed)?;
                let mut rgb = [0.0; 3];
                for slot in &mut rgb {
                    *slot = parts.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
                }
                current.diffuse = rgb;
            }
            "map_Kd" => {
                let current = materials.last_mut().ok_or_else(malformed)?;
                // options such as `-s 1 1 1` come first, the file name last
                let file = parts.last().ok_or_else(malformed)?;
                current.diffuse_map = Some(file.to_owned());
            }
            _ => {}
        }
    }
    Ok(materials)
}

/// The material the viewer draws with, see the module docs.
pub fn select<'a>(materials: &'a [Material], used: Option<&str>) -> Option<&'a Material> {
    match used {
        Some(name) => materials.iter().find(|m| m.name == name).or_else(|| materials.first()),
        None => materials.first(),
    }
}

/// A material resolved against the filesystem.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMaterial {
    pub diffuse: [f32; 3],
    pub texture_path: Option<std::path::PathBuf>,
}

/// Finds the material for the OBJ at `obj_path`. Missing or broken
/// libraries are logged and skipped; the model then draws untextured.
#[cfg(not(target_arch = "wasm32"))]
pub fn resolve(obj_path: &std::path::Path, obj_text: &str) -> Option<ResolvedMaterial> {
    let refs = material_refs(obj_text);
    let dir = obj_path.parent().unwrap_or_else(|| std::path::Path::new(""));

    let mut materials = Vec::new();
    let mut origin = Vec::new();
    for library in &refs.libraries {
        let path = dir.join(library);
        let parsed = match std::fs::read_to_string(&path) {
            Ok(text) => parse_mtl(&text),
            Err(e) => {
                log::warn!("material library {}: {e}", path.display());
                continue;
            }
        };
        match parsed {
            Ok(found) => {
                origin.extend(std::iter::repeat(path.clone()).take(found.len()));
                materials.extend(found);
            }
            Err(e) => log::warn!("material library {}: {e}", path.display()),
        }
    }

    let chosen = select(&materials, refs.used.as_deref())?;
    let index = materials.iter().position(|m| std::ptr::eq(m, chosen))?;
    let library_dir = origin[index].parent().unwrap_or_else(|| std::path::Path::new(""));
    Some(ResolvedMaterial {
        diffuse: chosen.diffuse,
        texture_path: chosen.diffuse_map.as_ref().map(|file| library_dir.join(file)),
    })
}
