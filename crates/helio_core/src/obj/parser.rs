//! Line-by-line Wavefront OBJ parser.
//!
//! # Supported statements
//!
//! - `v x y z` vertex positions
//! - `vn x y z` vertex normals
//! - `vt u v` texture coordinates
//! - `f a/b/c ...` faces with 3+ vertices, fan-triangulated
//! - `usemtl name` material selection
//! - `s on|off|<group>` smoothing state
//! - `o`/`g` object and group names (skipped)
//!
//! Indices are 1-based; negative indices count back from the most
//! recently declared element. Unknown statements are skipped so files
//! from modelling tools with vendor extensions still load.

use std::io::Read;

use helio_math::{DVec2, DVec3};
use log::info;
use thiserror::Error;

use crate::mesh::{MeshMaterial, MeshTriangle, TriangleMesh};

use super::mtl::parse_mtl;

/// Errors produced while loading OBJ/MTL streams.
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid number {value:?} at line {line}")]
    InvalidNumber { line: usize, value: String },

    #[error("index {index} out of range at line {line}")]
    IndexOutOfRange { line: usize, index: i64 },

    #[error("unknown material {name:?} at line {line}")]
    UnknownMaterial { line: usize, name: String },
}

/// Result type for loading operations.
pub type ObjResult<T> = Result<T, ObjError>;

/// Reads an OBJ stream and its material library into a mesh.
pub fn load(mut obj_reader: impl Read, mut mtl_reader: impl Read) -> ObjResult<TriangleMesh> {
    let mut obj_source = String::new();
    obj_reader.read_to_string(&mut obj_source)?;
    let mut mtl_source = String::new();
    mtl_reader.read_to_string(&mut mtl_source)?;

    let materials = parse_mtl(&mtl_source)?;
    let mesh = parse_obj(&obj_source, materials)?;

    info!(
        "loaded {} triangles with {} materials",
        mesh.triangle_count(),
        mesh.material_count()
    );
    Ok(mesh)
}

/// Parses OBJ text against an already-parsed material table.
pub fn parse_obj(source: &str, mut materials: Vec<MeshMaterial>) -> ObjResult<TriangleMesh> {
    let mut vertices: Vec<DVec3> = Vec::new();
    let mut normals: Vec<DVec3> = Vec::new();
    let mut uvs: Vec<DVec2> = Vec::new();
    let mut triangles: Vec<MeshTriangle> = Vec::new();

    // Faces seen before any `usemtl` fall back to a neutral grey
    // material, appended lazily so well-formed files don't carry it.
    let mut current_material: Option<usize> = None;
    let mut smooth = false;

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        let rest: Vec<&str> = tokens.collect();

        match keyword {
            "v" => vertices.push(parse_vec3(line, &rest)?),
            "vn" => normals.push(parse_vec3(line, &rest)?),
            "vt" => uvs.push(parse_vec2(line, &rest)?),
            "f" => {
                let material = match current_material {
                    Some(index) => index,
                    None => {
                        materials.push(default_material());
                        let index = materials.len() - 1;
                        current_material = Some(index);
                        index
                    }
                };
                read_face(
                    line,
                    &rest,
                    &vertices,
                    &normals,
                    &uvs,
                    material,
                    smooth,
                    &mut triangles,
                )?;
            }
            "usemtl" => {
                let name = rest.join(" ");
                let found = materials.iter().position(|m| m.name == name);
                match found {
                    Some(index) => current_material = Some(index),
                    None => {
                        return Err(ObjError::UnknownMaterial { line, name });
                    }
                }
            }
            "s" => {
                smooth = !matches!(rest.first().copied(), Some("off") | Some("0") | None);
            }
            // Object/group names and the caller-supplied material
            // library reference carry no geometry.
            "o" | "g" | "mtllib" => {}
            _ => {}
        }
    }

    Ok(TriangleMesh {
        triangles,
        materials,
    })
}

fn default_material() -> MeshMaterial {
    MeshMaterial {
        name: String::from("default"),
        diffuse: DVec3::splat(0.8),
        specular: DVec3::ZERO,
        emissive: DVec3::ZERO,
    }
}

/// Fan-triangulates one `f` statement around its first vertex and
/// appends the resulting triangles.
#[allow(clippy::too_many_arguments)]
fn read_face(
    line: usize,
    corners: &[&str],
    vertices: &[DVec3],
    normals: &[DVec3],
    uvs: &[DVec2],
    material: usize,
    smooth: bool,
    triangles: &mut Vec<MeshTriangle>,
) -> ObjResult<()> {
    if corners.len() < 3 {
        return Err(ObjError::Parse {
            line,
            message: format!("face needs at least 3 vertices, found {}", corners.len()),
        });
    }

    let parsed: Vec<FaceCorner> = corners
        .iter()
        .map(|token| parse_corner(line, token, vertices, normals, uvs))
        .collect::<ObjResult<_>>()?;

    for i in 0..parsed.len() - 2 {
        let fan = [&parsed[0], &parsed[i + 1], &parsed[i + 2]];
        let face_vertices = [fan[0].vertex, fan[1].vertex, fan[2].vertex];

        // Corners without a `vn` reference share the face's geometric
        // normal instead.
        let geometric =
            (face_vertices[0] - face_vertices[1]).cross(face_vertices[0] - face_vertices[2]);
        let face_normals = [
            fan[0].normal.unwrap_or(geometric).normalize(),
            fan[1].normal.unwrap_or(geometric).normalize(),
            fan[2].normal.unwrap_or(geometric).normalize(),
        ];

        triangles.push(MeshTriangle {
            vertices: face_vertices,
            normals: face_normals,
            uvs: [
                fan[0].uv.unwrap_or(DVec2::ZERO),
                fan[1].uv.unwrap_or(DVec2::ZERO),
                fan[2].uv.unwrap_or(DVec2::ZERO),
            ],
            material,
            smooth,
        });
    }
    Ok(())
}

struct FaceCorner {
    vertex: DVec3,
    uv: Option<DVec2>,
    normal: Option<DVec3>,
}

/// Parses one `v`, `v/vt`, `v//vn` or `v/vt/vn` face corner.
fn parse_corner(
    line: usize,
    token: &str,
    vertices: &[DVec3],
    normals: &[DVec3],
    uvs: &[DVec2],
) -> ObjResult<FaceCorner> {
    let mut parts = token.split('/');

    let vertex_index = parts.next().filter(|p| !p.is_empty());
    let uv_index = parts.next().filter(|p| !p.is_empty());
    let normal_index = parts.next().filter(|p| !p.is_empty());

    let vertex_index = vertex_index.ok_or_else(|| ObjError::Parse {
        line,
        message: format!("face corner {:?} has no vertex index", token),
    })?;

    let vertex = *resolve(line, vertex_index, vertices)?;
    let uv = match uv_index {
        Some(raw) => Some(*resolve(line, raw, uvs)?),
        None => None,
    };
    let normal = match normal_index {
        Some(raw) => Some(*resolve(line, raw, normals)?),
        None => None,
    };

    Ok(FaceCorner { vertex, uv, normal })
}

/// Resolves a 1-based (or negative, relative) OBJ index into a slice.
fn resolve<'a, T>(line: usize, raw: &str, elements: &'a [T]) -> ObjResult<&'a T> {
    let index: i64 = raw.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        value: raw.to_string(),
    })?;

    let resolved = if index > 0 {
        (index - 1) as usize
    } else if index < 0 && elements.len() as i64 + index >= 0 {
        (elements.len() as i64 + index) as usize
    } else {
        return Err(ObjError::IndexOutOfRange { line, index });
    };

    elements
        .get(resolved)
        .ok_or(ObjError::IndexOutOfRange { line, index })
}

fn parse_vec3(line: usize, tokens: &[&str]) -> ObjResult<DVec3> {
    if tokens.len() < 3 {
        return Err(ObjError::Parse {
            line,
            message: format!("expected 3 components, found {}", tokens.len()),
        });
    }
    Ok(DVec3::new(
        parse_float(line, tokens[0])?,
        parse_float(line, tokens[1])?,
        parse_float(line, tokens[2])?,
    ))
}

fn parse_vec2(line: usize, tokens: &[&str]) -> ObjResult<DVec2> {
    if tokens.is_empty() {
        return Err(ObjError::Parse {
            line,
            message: String::from("expected at least 1 component"),
        });
    }
    let u = parse_float(line, tokens[0])?;
    let v = match tokens.get(1) {
        Some(raw) => parse_float(line, raw)?,
        None => 0.0,
    };
    Ok(DVec2::new(u, v))
}

pub(super) fn parse_float(line: usize, raw: &str) -> ObjResult<f64> {
    raw.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        value: raw.to_string(),
    })
}
