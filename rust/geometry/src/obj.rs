// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ text output and parse-back
//!
//! Meshes are built Z-up in plan space; OBJ files are Y-up, so vertices are
//! written as `x z -y` and swapped back on parse.

use crate::error::{Error, Result};
use crate::mesh::{Face, GroupedMesh, MeshTag};
use nalgebra::Point3;
use std::io;

/// Adding zero turns `-0.0` into `0.0` so output never shows `-0.0000`
#[inline]
fn clean(v: f64) -> f64 {
    v + 0.0
}

/// Serialize a mesh: vertex lines, then one `g` block per group with 1-based
/// face indices
pub fn to_obj_string(mesh: &GroupedMesh, header: Option<&str>) -> String {
    let mut out = String::with_capacity(mesh.vertex_count() * 32 + mesh.face_count() * 24);

    if let Some(header) = header {
        for line in header.lines() {
            out.push_str(&format!("# {}\n", line));
        }
    }

    for v in &mesh.vertices {
        out.push_str(&format!(
            "v {:.4} {:.4} {:.4}\n",
            clean(v.x),
            clean(v.z),
            clean(-v.y)
        ));
    }

    for group in &mesh.groups {
        if group.faces.is_empty() {
            continue;
        }
        out.push_str(&format!("g {}\n", group.tag.name()));
        for face in &group.faces {
            out.push('f');
            for &index in face.iter() {
                out.push_str(&format!(" {}", index + 1));
            }
            out.push('\n');
        }
    }

    out
}

/// Write OBJ text to any writer; I/O errors propagate unchanged
pub fn write_obj<W: io::Write>(writer: &mut W, mesh: &GroupedMesh, header: Option<&str>) -> io::Result<()> {
    writer.write_all(to_obj_string(mesh, header).as_bytes())
}

/// Parse OBJ text back into grouped geometry.
///
/// Vertices accumulate globally; each face joins the group named by the most
/// recent `g` line. Texture and normal references (`f 1/2/3`) are ignored,
/// unsupported statements are skipped.
pub fn parse_obj(text: &str) -> Result<GroupedMesh> {
    let mut mesh = GroupedMesh::new();
    let mut current: Option<MeshTag> = None;
    let mut pending: Vec<(usize, Face, MeshTag)> = Vec::new();

    for (line_index, raw) in text.lines().enumerate() {
        let line_no = line_index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let coords: Vec<f64> = parts
                    .take(3)
                    .map(|s| s.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| parse_error(line_no, format!("bad vertex coordinate: {}", e)))?;
                if coords.len() != 3 {
                    return Err(parse_error(line_no, "vertex needs three coordinates"));
                }
                mesh.add_vertex(Point3::new(coords[0], -coords[2], coords[1]));
            }
            "g" => {
                let name = parts.next().unwrap_or_default();
                current = Some(
                    MeshTag::from_name(name)
                        .ok_or_else(|| parse_error(line_no, format!("unknown group '{}'", name)))?,
                );
            }
            "f" => {
                let tag = current.ok_or_else(|| parse_error(line_no, "face before any group"))?;
                let face: Face = parts
                    .map(|token| parse_index(line_no, token))
                    .collect::<Result<_>>()?;
                if face.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least three vertices"));
                }
                pending.push((line_no, face, tag));
            }
            _ => {}
        }
    }

    // Faces may reference vertices declared later in the file
    let count = mesh.vertex_count();
    for (line_no, face, tag) in pending {
        if let Some(&bad) = face.iter().find(|&&i| i as usize >= count) {
            return Err(parse_error(
                line_no,
                format!("vertex index {} out of range (have {})", bad + 1, count),
            ));
        }
        mesh.add_face(tag, &face);
    }

    Ok(mesh)
}

fn parse_index(line: usize, token: &str) -> Result<u32> {
    let head = token.split('/').next().unwrap_or(token);
    let index: i64 = head
        .parse()
        .map_err(|_| parse_error(line, format!("bad face index '{}'", token)))?;
    if index < 1 || index > u32::MAX as i64 {
        return Err(parse_error(line, format!("face index {} must be 1-based and positive", index)));
    }
    Ok((index - 1) as u32)
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::ObjParse {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_and_quad() -> GroupedMesh {
        let mut mesh = GroupedMesh::new();
        for (x, y, z) in [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 2.8)] {
            mesh.add_vertex(Point3::new(x, y, z));
        }
        mesh.add_face(MeshTag::Floor, &[0, 1, 2, 3]);
        mesh.add_face(MeshTag::Walls, &[0, 1, 4]);
        mesh
    }

    #[test]
    fn test_obj_layout() {
        let text = to_obj_string(&triangle_and_quad(), Some("floor 0"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# floor 0");
        assert_eq!(lines[1], "v 0.0000 0.0000 0.0000");
        // Y-up: plan y becomes -z, height becomes y
        assert_eq!(lines[3], "v 1.0000 0.0000 -1.0000");
        assert_eq!(lines[5], "v 0.0000 2.8000 0.0000");
        assert_eq!(lines[6], "g floor");
        assert_eq!(lines[7], "f 1 2 3 4");
        assert_eq!(lines[8], "g walls");
        assert_eq!(lines[9], "f 1 2 5");
    }

    #[test]
    fn test_parse_back() {
        let original = triangle_and_quad();
        let parsed = parse_obj(&to_obj_string(&original, None)).unwrap();
        assert_eq!(parsed.vertex_count(), 5);
        assert_eq!(parsed.faces(MeshTag::Floor).len(), 1);
        assert_eq!(parsed.faces(MeshTag::Walls)[0].as_slice(), &[0, 1, 4]);
        assert!((parsed.vertices[4].z - 2.8).abs() < 1e-9);
        assert!((parsed.vertices[2].y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_accepts_slash_indices_and_comments() {
        let text = "# comment\nv 0 0 0\nv 1 0 0\nv 1 1 0\ng walls_balustrades\nvn 0 1 0\nf 1//1 2//1 3//1\n";
        let parsed = parse_obj(text).unwrap();
        assert_eq!(parsed.faces(MeshTag::WallsBalustrades).len(), 1);
    }

    #[test]
    fn test_parse_rejects_out_of_range_index() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\ng floor\nf 1 2 4\n").unwrap_err();
        assert!(matches!(err, Error::ObjParse { line: 5, .. }));
    }

    #[test]
    fn test_parse_rejects_zero_index_and_missing_group() {
        assert!(matches!(
            parse_obj("v 0 0 0\ng floor\nf 0 1 1\n"),
            Err(Error::ObjParse { line: 3, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nf 1 1 1\n"),
            Err(Error::ObjParse { line: 2, .. })
        ));
    }

    #[test]
    fn test_write_obj_to_buffer() {
        let mut buffer = Vec::new();
        write_obj(&mut buffer, &triangle_and_quad(), None).unwrap();
        assert!(String::from_utf8(buffer).unwrap().starts_with("v "));
    }
}
