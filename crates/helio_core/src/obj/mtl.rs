//! Line-by-line Wavefront MTL parser.
//!
//! Only the channels the renderer shades with are kept: `Kd` (diffuse),
//! `Ks` (specular) and `Ke` (emissive). Everything else — `Ns`, `Ni`,
//! `d`, `illum`, texture maps — is skipped.

use helio_math::DVec3;

use crate::mesh::MeshMaterial;

use super::parser::{parse_float, ObjError, ObjResult};

/// Parses MTL text into a material table, in declaration order.
pub fn parse_mtl(source: &str) -> ObjResult<Vec<MeshMaterial>> {
    let mut materials: Vec<MeshMaterial> = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        let rest: Vec<&str> = tokens.collect();

        if keyword == "newmtl" {
            materials.push(MeshMaterial {
                name: rest.join(" "),
                ..MeshMaterial::default()
            });
            continue;
        }

        let Some(current) = materials.last_mut() else {
            // Channel statements before any newmtl have nothing to
            // attach to.
            return Err(ObjError::Parse {
                line,
                message: format!("{:?} before any newmtl statement", keyword),
            });
        };

        match keyword {
            "Kd" => current.diffuse = parse_color(line, &rest)?,
            "Ks" => current.specular = parse_color(line, &rest)?,
            "Ke" => current.emissive = parse_color(line, &rest)?,
            _ => {}
        }
    }

    Ok(materials)
}

fn parse_color(line: usize, tokens: &[&str]) -> ObjResult<DVec3> {
    if tokens.len() < 3 {
        return Err(ObjError::Parse {
            line,
            message: format!("expected 3 color components, found {}", tokens.len()),
        });
    }
    Ok(DVec3::new(
        parse_float(line, tokens[0])?,
        parse_float(line, tokens[1])?,
        parse_float(line, tokens[2])?,
    ))
}
