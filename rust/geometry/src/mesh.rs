// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal indexed-face mesh I/O (spec §4.G, §6): a Wavefront-like text
//! subset with `v`/`f`/`g` lines. 1-based indices are a file-format
//! convention only; everything past the parser is 0-based.

use rustc_hash::FxHashSet;

use cellcx_core::{build_cops, ChainOp, VertexSet};

use crate::error::{Error, Result};
use crate::triangulate::{triangulate_face, ConstrainedTriangulator};

/// Read a mesh. `v x y z` lines accumulate vertices; `f i j k [...]` lines
/// accumulate a face's vertex list (an `i/texcoord/normal` suffix is
/// ignored, only the vertex index is read); `g` lines and anything else are
/// ignored on read. Triangles/polygons are decomposed into deduplicated,
/// sorted-endpoint edges before `build_cops` assembles the operators.
pub fn read_mesh(text: &str) -> Result<(VertexSet, ChainOp, ChainOp)> {
    let mut vertices: Vec<(f64, f64, f64)> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for (offset, raw_line) in text.lines().enumerate() {
        let line_no = offset + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let tag = match tokens.next() {
            Some(t) => t,
            None => continue,
        };
        match tag {
            "v" => {
                let coords: Vec<f64> = tokens
                    .map(|t| {
                        t.parse::<f64>().map_err(|_| Error::IOFormatError {
                            line: line_no,
                            message: format!("non-numeric vertex field {t:?}"),
                        })
                    })
                    .collect::<Result<_>>()?;
                if coords.len() < 3 {
                    return Err(Error::IOFormatError {
                        line: line_no,
                        message: "vertex line needs x, y, and z fields".to_string(),
                    });
                }
                vertices.push((coords[0], coords[1], coords[2]));
            }
            "f" => {
                let mut face = Vec::new();
                for tok in tokens {
                    let idx_field = tok.split('/').next().unwrap_or(tok);
                    let one_based: usize = idx_field.parse().map_err(|_| Error::IOFormatError {
                        line: line_no,
                        message: format!("non-numeric face field {tok:?}"),
                    })?;
                    if one_based == 0 {
                        return Err(Error::IOFormatError {
                            line: line_no,
                            message: "face indices are 1-based".to_string(),
                        });
                    }
                    face.push(one_based - 1);
                }
                if face.len() < 3 {
                    return Err(Error::IOFormatError {
                        line: line_no,
                        message: "face needs at least three vertices".to_string(),
                    });
                }
                faces.push(face);
            }
            _ => {}
        }
    }

    let mut seen = FxHashSet::default();
    let mut edges = Vec::new();
    for face in &faces {
        let n = face.len();
        for i in 0..n {
            let a = face[i];
            let b = face[(i + 1) % n];
            let key = if a < b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                edges.push(key);
            }
        }
    }

    let v = VertexSet::from_3d(vertices);
    let (copEV, copFE) = build_cops(&edges, &faces)?;
    Ok((v, copEV, copFE))
}

/// Write a mesh. Every face is triangulated via [`triangulate_face`]. When
/// `copCF` is given (the 3D variant), triangles are grouped under a `g
/// cellN` header per 3-cell and their winding is flipped where `copCF`'s
/// sign for that (cell, face) pair is negative; otherwise (the 2D variant)
/// triangles are emitted ungrouped in face order. Coordinates are rounded
/// to six decimal digits; indices are written 1-based.
pub fn write_mesh(
    v: &VertexSet,
    copEV: &ChainOp,
    copFE: &ChainOp,
    copCF: Option<&ChainOp>,
    triangulator: &dyn ConstrainedTriangulator,
) -> Result<String> {
    let mut out = String::new();
    for i in 0..v.len() {
        let p = v.get(i);
        out.push_str(&format!("v {:.6} {:.6} {:.6}\n", p.x, p.y, p.z));
    }

    let mut face_triangles: Vec<Vec<[usize; 3]>> = Vec::with_capacity(copFE.rows());
    for f in 0..copFE.rows() {
        face_triangles.push(triangulate_face(v, copEV, copFE, f, triangulator)?);
    }

    match copCF {
        Some(cf) => {
            for c in 0..cf.rows() {
                out.push_str(&format!("g cell{c}\n"));
                for &(f, sign) in cf.row(c) {
                    for tri in &face_triangles[f] {
                        let t = if sign < 0 { [tri[1], tri[0], tri[2]] } else { *tri };
                        out.push_str(&format!("f {} {} {}\n", t[0] + 1, t[1] + 1, t[2] + 1));
                    }
                }
            }
        }
        None => {
            for tris in &face_triangles {
                for tri in tris {
                    out.push_str(&format!("f {} {} {}\n", tri[0] + 1, tri[1] + 1, tri[2] + 1));
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulate::EarcutTriangulator;

    #[test]
    fn round_trips_a_unit_square_face() {
        let v = VertexSet::from_3d([(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)]);
        let (ev, fe) = build_cops(&[(0, 1), (1, 2), (2, 3), (3, 0)], &[vec![0, 1, 2, 3]]).unwrap();
        let text = write_mesh(&v, &ev, &fe, None, &EarcutTriangulator).unwrap();

        let (v2, ev2, fe2) = read_mesh(&text).unwrap();
        assert_eq!(v2.len(), 4);
        // a quad triangulates into two triangles, each contributing three edges;
        // the shared diagonal is deduplicated, so 4 boundary + 1 diagonal = 5.
        assert_eq!(ev2.rows(), 5);
        assert_eq!(fe2.rows(), 2);
    }

    #[test]
    fn cube_mesh_round_trip_preserves_vertex_count() {
        let v = VertexSet::from_3d([
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
        ]);
        let ev_list = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        let fv = vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        let (ev, fe) = build_cops(&ev_list, &fv).unwrap();
        let text = write_mesh(&v, &ev, &fe, None, &EarcutTriangulator).unwrap();

        let (v2, _ev2, fe2) = read_mesh(&text).unwrap();
        assert_eq!(v2.len(), 8);
        // 6 quads triangulated into 2 triangles each.
        assert_eq!(fe2.rows(), 12);
    }

    #[test]
    fn reader_rejects_non_numeric_vertex_field() {
        let err = read_mesh("v 1.0 abc 0.0\n").unwrap_err();
        assert!(matches!(err, Error::IOFormatError { line: 1, .. }));
    }

    #[test]
    fn reader_ignores_group_lines_and_comments() {
        let text = "# a comment\nv 0 0 0\nv 1 0 0\nv 1 1 0\ng mygroup\nf 1 2 3\n";
        let (v, ev, fe) = read_mesh(text).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(ev.rows(), 3);
        assert_eq!(fe.rows(), 1);
    }

    #[test]
    fn reader_parses_texcoord_normal_suffixes() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1/1/1 2/2/1 3/3/1\n";
        let (v, _ev, fe) = read_mesh(text).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(fe.rows(), 1);
    }
}
