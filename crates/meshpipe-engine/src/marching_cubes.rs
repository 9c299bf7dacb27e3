//! Iso-surface extraction by marching cubes.
//!
//! Works on a node grid stored x-fastest: the value of node `(x, y, z)` is at
//! `(z * ny + y) * nx + x`. A node is inside when its value is negative.
//! Output vertices are in grid-index space; callers scale and offset them.

#![allow(clippy::unreadable_literal, clippy::cast_possible_truncation)]

use glam::DVec3;

/// Where a vertex is placed on a cube edge crossed by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgePlacement {
    /// Linear interpolation of the two node values.
    Interpolated,
    /// The edge midpoint.
    Midpoint,
}

/// Triangle soup with shared vertices, in grid-index space.
#[derive(Debug, Clone, Default)]
pub(crate) struct IsoMesh {
    pub vertices: Vec<DVec3>,
    /// Unit normals pointing towards positive values.
    pub normals: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
}

/// Cube edges as `(corner a, corner b, axis, offset of the edge's low end)`.
///
/// Corner `c` of a cell sits at offset `(c & 1, (c >> 1) & 1, c >> 2)`.
const EDGES: [(usize, usize, usize, [u32; 3]); 12] = [
    (0, 1, 0, [0, 0, 0]),
    (2, 3, 0, [0, 1, 0]),
    (4, 5, 0, [0, 0, 1]),
    (6, 7, 0, [0, 1, 1]),
    (0, 2, 1, [0, 0, 0]),
    (1, 3, 1, [1, 0, 0]),
    (4, 6, 1, [0, 0, 1]),
    (5, 7, 1, [1, 0, 1]),
    (0, 4, 2, [0, 0, 0]),
    (1, 5, 2, [1, 0, 0]),
    (2, 6, 2, [0, 1, 0]),
    (3, 7, 2, [1, 1, 0]),
];

/// Extracts the zero level set of `values`.
///
/// Each crossed edge yields exactly one vertex, shared by every cell around
/// it. Vertex indices of the current and next z layer live in a two-layer
/// slab, so memory stays proportional to one grid slice.
///
/// # Panics
/// Panics if `values.len()` does not match `dims` or a dimension is below 2.
pub(crate) fn extract_isosurface(
    values: &[f64],
    dims: [u32; 3],
    placement: EdgePlacement,
) -> IsoMesh {
    let [nx, ny, nz] = dims;
    assert!(nx >= 2 && ny >= 2 && nz >= 2, "grid dimensions must be >= 2");
    assert_eq!(
        values.len(),
        nx as usize * ny as usize * nz as usize,
        "grid size does not match {nx}x{ny}x{nz}"
    );

    let (sx, sy) = (nx as usize, ny as usize);
    let node = |x: u32, y: u32, z: u32| values[(z as usize * sy + y as usize) * sx + x as usize];
    let slab_index = |x: u32, y: u32, z: u32| sx * sy * (z as usize % 2) + y as usize * sx + x as usize;

    let mut mesh = IsoMesh::default();
    let mut slab = vec![[u32::MAX; 3]; sx * sy * 2];
    let mut corners = [0.0_f64; 8];
    let mut edge_vertices = [0_u32; 12];

    for z in 0..nz - 1 {
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                let cell = [x, y, z];
                let mut config = 0_usize;
                for (c, value) in corners.iter_mut().enumerate() {
                    let c = c as u32;
                    *value = node(x + (c & 1), y + ((c >> 1) & 1), z + (c >> 2));
                    if *value < 0.0 {
                        config |= 1 << c;
                    }
                }
                if config == 0 || config == 255 {
                    continue;
                }

                for (e, &(a, b, axis, offset)) in EDGES.iter().enumerate() {
                    let at = [x + offset[0], y + offset[1], z + offset[2]];
                    let slot = slab_index(at[0], at[1], at[2]);
                    // Edges on the low faces of a cell belong to the neighbour
                    // visited earlier, unless the cell touches the grid border.
                    let owned = (0..3).all(|d| d == axis || offset[d] == 1 || cell[d] == 0);
                    if owned {
                        let (va, vb) = (corners[a], corners[b]);
                        if (va < 0.0) != (vb < 0.0) {
                            let t = match placement {
                                EdgePlacement::Interpolated => va / (va - vb),
                                EdgePlacement::Midpoint => 0.5,
                            };
                            let mut position = DVec3::new(
                                f64::from(at[0]),
                                f64::from(at[1]),
                                f64::from(at[2]),
                            );
                            position[axis] += t;
                            slab[slot][axis] = mesh.vertices.len() as u32;
                            mesh.vertices.push(position);
                            mesh.normals.push(DVec3::ZERO);
                        }
                    }
                    edge_vertices[e] = slab[slot][axis];
                }

                let entry = MC_TRIS[config];
                let triangle_count = (entry & 0xF) as usize;
                for t in 0..triangle_count {
                    let shift = 4 + 12 * t;
                    let tri = [0, 1, 2].map(|k| {
                        edge_vertices[((entry >> (shift + 4 * k)) & 0xF) as usize]
                    });
                    accumulate_normal(&mut mesh, tri);
                    mesh.triangles.push(tri);
                }
            }
        }
    }

    for normal in &mut mesh.normals {
        *normal = normal.normalize_or_zero();
    }
    mesh
}

/// Adds the face normal of `tri` to its three vertices.
fn accumulate_normal(mesh: &mut IsoMesh, tri: [u32; 3]) {
    let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
    let n = (c - b).cross(a - b);
    for i in tri {
        mesh.normals[i as usize] += n;
    }
}

/// Triangle table, one entry per corner-sign configuration.
///
/// Bits `[3:0]` hold the triangle count (0-5); each following nibble is a
/// cube edge index (see [`EDGES`]), three per triangle.
#[rustfmt::skip]
static MC_TRIS: [u64; 256] = [
    0, 33793, 36945, 159668546,
    18961, 144771090, 5851666, 595283255635,
    20913, 67640146, 193993474, 655980856339,
    88782242, 736732689667, 797430812739, 194554754,
    26657, 104867330, 136709522, 298069416227,
    109224258, 8877909667, 318136408323, 1567994331701604,
    189884450, 350847647843, 559958167731, 3256298596865604,
    447393122899, 651646838401572, 2538311371089956, 737032694307,
    29329, 43484162, 91358498, 374810899075,
    158485010, 178117478419, 88675058979, 433581536604804,
    158486962, 649105605635, 4866906995, 3220959471609924,
    649165714851, 3184943915608436, 570691368417972, 595804498035,
    124295042, 431498018963, 508238522371, 91518530,
    318240155763, 291789778348404, 1830001131721892, 375363605923,
    777781811075, 1136111028516116, 3097834205243396, 508001629971,
    2663607373704004, 680242583802939237, 333380770766129845, 179746658,
    42545, 138437538, 93365810, 713842853011,
    73602098, 69575510115, 23964357683, 868078761575828,
    28681778, 713778574611, 250912709379, 2323825233181284,
    302080811955, 3184439127991172, 1694042660682596, 796909779811,
    176306722, 150327278147, 619854856867, 1005252473234484,
    211025400963, 36712706, 360743481544788, 150627258963,
    117482600995, 1024968212107700, 2535169275963444, 4734473194086550421,
    628107696687956, 9399128243, 5198438490361643573, 194220594,
    104474994, 566996932387, 427920028243, 2014821863433780,
    492093858627, 147361150235284, 2005882975110676, 9671606099636618005,
    777701008947, 3185463219618820, 482784926917540, 2900953068249785909,
    1754182023747364, 4274848857537943333, 13198752741767688709, 2015093490989156,
    591272318771, 2659758091419812, 1531044293118596, 298306479155,
    408509245114388, 210504348563, 9248164405801223541, 91321106,
    2660352816454484, 680170263324308757, 8333659837799955077, 482966828984116,
    4274926723105633605, 3184439197724820, 192104450, 15217,
    45937, 129205250, 129208402, 529245952323,
    169097138, 770695537027, 382310500883, 2838550742137652,
    122763026, 277045793139, 81608128403, 1991870397907988,
    362778151475, 2059003085103236, 2132572377842852, 655681091891,
    58419234, 239280858627, 529092143139, 1568257451898804,
    447235128115, 679678845236084, 2167161349491220, 1554184567314086709,
    165479003923, 1428768988226596, 977710670185060, 10550024711307499077,
    1305410032576132, 11779770265620358997, 333446212255967269, 978168444447012,
    162736434, 35596216627, 138295313843, 891861543990356,
    692616541075, 3151866750863876, 100103641866564, 6572336607016932133,
    215036012883, 726936420696196, 52433666, 82160664963,
    2588613720361524, 5802089162353039525, 214799000387, 144876322,
    668013605731, 110616894681956, 1601657732871812, 430945547955,
    3156382366321172, 7644494644932993285, 3928124806469601813, 3155990846772900,
    339991010498708, 10743689387941597493, 5103845475, 105070898,
    3928064910068824213, 156265010, 1305138421793636, 27185,
    195459938, 567044449971, 382447549283, 2175279159592324,
    443529919251, 195059004769796, 2165424908404116, 1554158691063110021,
    504228368803, 1436350466655236, 27584723588724, 1900945754488837749,
    122971970, 443829749251, 302601798803, 108558722,
    724700725875, 43570095105972, 2295263717447940, 2860446751369014181,
    2165106202149444, 69275726195, 2860543885641537797, 2165106320445780,
    2280890014640004, 11820349930268368933, 8721082628082003989, 127050770,
    503707084675, 122834978, 2538193642857604, 10129,
    801441490467, 2923200302876740, 1443359556281892, 2901063790822564949,
    2728339631923524, 7103874718248233397, 12775311047932294245, 95520290,
    2623783208098404, 1900908618382410757, 137742672547, 2323440239468964,
    362478212387, 727199575803140, 73425410, 34337,
    163101314, 668566030659, 801204361987, 73030562,
    591509145619, 162574594, 100608342969108, 5553,
    724147968595, 1436604830452292, 176259090, 42001,
    143955266, 2385, 18433, 0,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_field(n: u32, radius: f64) -> (Vec<f64>, DVec3) {
        let center = DVec3::splat(f64::from(n - 1) / 2.0);
        let mut values = Vec::with_capacity((n * n * n) as usize);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let p = DVec3::new(f64::from(x), f64::from(y), f64::from(z));
                    values.push(p.distance(center) - radius);
                }
            }
        }
        (values, center)
    }

    #[test]
    fn test_uniform_fields_are_empty() {
        let above = extract_isosurface(&[1.0; 27], [3, 3, 3], EdgePlacement::Interpolated);
        assert!(above.triangles.is_empty());
        let below = extract_isosurface(&[-1.0; 27], [3, 3, 3], EdgePlacement::Interpolated);
        assert!(below.vertices.is_empty());
    }

    #[test]
    fn test_single_inside_corner() {
        let mut values = [1.0; 8];
        values[0] = -1.0;
        let mesh = extract_isosurface(&values, [2, 2, 2], EdgePlacement::Interpolated);
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.vertices.len(), 3);
        for v in &mesh.vertices {
            assert!((v.element_sum() - 0.5).abs() < 1e-12);
        }
        // Faces away from the inside corner.
        let n = mesh.normals[0];
        assert!(n.abs_diff_eq(DVec3::ONE.normalize(), 1e-12), "{n:?}");
    }

    #[test]
    fn test_midpoint_placement() {
        let mut values = [1.0; 8];
        values[0] = -3.0;
        let mesh = extract_isosurface(&values, [2, 2, 2], EdgePlacement::Midpoint);
        for v in &mesh.vertices {
            assert_eq!(v.max_element(), 0.5);
        }
        let mesh = extract_isosurface(&values, [2, 2, 2], EdgePlacement::Interpolated);
        for v in &mesh.vertices {
            assert_eq!(v.max_element(), 0.75);
        }
    }

    #[test]
    fn test_sphere() {
        let (values, center) = sphere_field(20, 5.0);
        let mesh = extract_isosurface(&values, [20, 20, 20], EdgePlacement::Interpolated);
        assert!(mesh.triangles.len() > 100, "{} triangles", mesh.triangles.len());
        assert_eq!(mesh.vertices.len(), mesh.normals.len());

        for tri in &mesh.triangles {
            assert!(tri.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        }
        for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
            assert!((v.distance(center) - 5.0).abs() < 0.5, "{v:?} is off the sphere");
            assert!((n.length() - 1.0).abs() < 1e-9);
            assert!(n.dot(*v - center) > 0.0, "normal at {v:?} points inward");
        }
    }

    #[test]
    fn test_vertices_are_shared() {
        let (values, _) = sphere_field(12, 3.0);
        let mesh = extract_isosurface(&values, [12, 12, 12], EdgePlacement::Midpoint);
        // A closed surface built from shared vertices has every edge on two faces.
        let mut edges = std::collections::HashMap::new();
        for tri in &mesh.triangles {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&count| count == 2));
    }

    #[test]
    #[should_panic(expected = "grid size does not match")]
    fn test_wrong_field_size() {
        let _ = extract_isosurface(&[0.0; 10], [3, 3, 3], EdgePlacement::Midpoint);
    }
}
