//! In-place mesh cleanup passes.
//!
//! Each pass returns how many elements it removed. Vertex attributes follow
//! their vertices through every compaction.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::DVec3;

use super::TriangleMesh;
use crate::error::{check_attribute_len, Result};

/// Triangles with an area at or below this are degenerate.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// Vertices closer than this are duplicates.
pub const DUPLICATE_VERTEX_EPSILON: f64 = 1e-9;

impl TriangleMesh {
    /// Removes every vertex whose mask entry is `true`, along with the
    /// triangles that reference it.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_vertices_by_mask(&mut self, mask: &[bool]) -> Result<usize> {
        check_attribute_len("vertex_mask", self.vertices.len(), mask.len())?;

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut next = 0_u32;
        for (slot, &remove) in remap.iter_mut().zip(mask) {
            if !remove {
                *slot = next;
                next += 1;
            }
        }

        let removed = self.vertices.len() - next as usize;
        if removed == 0 {
            return Ok(0);
        }

        self.triangles = self
            .triangles
            .iter()
            .filter_map(|tri| {
                let mapped = tri.map(|i| remap[i as usize]);
                mapped.iter().all(|&i| i != u32::MAX).then_some(mapped)
            })
            .collect();
        self.retain_vertices(|i| !mask[i]);

        Ok(removed)
    }

    /// Removes triangles with a repeated index or (near-)zero area.
    pub fn remove_degenerate_triangles(&mut self) -> usize {
        let before = self.triangles.len();
        let vertices = &self.vertices;
        self.triangles.retain(|&[a, b, c]| {
            if a == b || b == c || a == c {
                return false;
            }
            let (pa, pb, pc) = (
                vertices[a as usize],
                vertices[b as usize],
                vertices[c as usize],
            );
            (pb - pa).cross(pc - pa).length() * 0.5 > DEGENERATE_AREA_EPSILON
        });
        before - self.triangles.len()
    }

    /// Removes triangles that repeat an earlier triangle up to rotation of
    /// its index triple. The first occurrence is kept.
    pub fn remove_duplicated_triangles(&mut self) -> usize {
        let before = self.triangles.len();
        let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(before);
        self.triangles.retain(|&tri| seen.insert(rotate_to_min(tri)));
        before - self.triangles.len()
    }

    /// Merges vertices closer than [`DUPLICATE_VERTEX_EPSILON`] into the
    /// first of them and compacts the vertex array.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_duplicated_vertices(&mut self) -> usize {
        let count = self.vertices.len();
        if count == 0 {
            return 0;
        }

        let cell_size = DUPLICATE_VERTEX_EPSILON * 2.0;
        let mut cells: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
        let mut canonical: Vec<u32> = (0..count as u32).collect();
        let mut merged = 0;

        for (idx, &position) in self.vertices.iter().enumerate() {
            let key = cell_of(position, cell_size);
            let mut target = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(candidates) = cells.get(&(key.0 + dx, key.1 + dy, key.2 + dz))
                        else {
                            continue;
                        };
                        for &other in candidates {
                            if self.vertices[other as usize].distance(position)
                                < DUPLICATE_VERTEX_EPSILON
                            {
                                target = Some(other);
                                break 'search;
                            }
                        }
                    }
                }
            }
            match target {
                Some(other) => {
                    canonical[idx] = other;
                    merged += 1;
                }
                None => cells.entry(key).or_default().push(idx as u32),
            }
        }

        if merged == 0 {
            return 0;
        }

        // Canonical vertices are never merged themselves, so one lookup suffices.
        let mut compact = vec![u32::MAX; count];
        let mut next = 0_u32;
        for i in 0..count {
            if canonical[i] == i as u32 {
                compact[i] = next;
                next += 1;
            }
        }
        for tri in &mut self.triangles {
            *tri = tri.map(|i| compact[canonical[i as usize] as usize]);
        }
        self.retain_vertices(|i| canonical[i] == i as u32);

        merged
    }

    /// Removes triangles until no edge is shared by more than two of them.
    ///
    /// For each over-shared edge the smallest-area triangles go first.
    /// Returns the number of triangles removed.
    pub fn remove_non_manifold_edges(&mut self) -> usize {
        let mut edge_faces: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
        for (face, tri) in self.triangles.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                edge_faces.entry((a.min(b), a.max(b))).or_default().push(face);
            }
        }

        let areas: Vec<f64> = self
            .triangles
            .iter()
            .map(|&tri| self.triangle_area(tri))
            .collect();
        let mut alive = vec![true; self.triangles.len()];

        for faces in edge_faces.values() {
            let mut live: Vec<usize> = faces.iter().copied().filter(|&f| alive[f]).collect();
            if live.len() <= 2 {
                continue;
            }
            live.sort_by(|&a, &b| areas[a].total_cmp(&areas[b]).then(a.cmp(&b)));
            for &face in &live[..live.len() - 2] {
                alive[face] = false;
            }
        }

        let before = self.triangles.len();
        let mut face = 0;
        self.triangles.retain(|_| {
            let keep = alive[face];
            face += 1;
            keep
        });
        before - self.triangles.len()
    }

    /// Keeps the vertices (and their attributes) for which `keep` holds.
    fn retain_vertices(&mut self, keep: impl Fn(usize) -> bool) {
        fn filter(values: &mut Vec<DVec3>, keep: &dyn Fn(usize) -> bool) {
            let mut i = 0;
            values.retain(|_| {
                let k = keep(i);
                i += 1;
                k
            });
        }
        filter(&mut self.vertices, &keep);
        if let Some(colors) = &mut self.vertex_colors {
            filter(colors, &keep);
        }
        if let Some(normals) = &mut self.vertex_normals {
            filter(normals, &keep);
        }
    }
}

/// Rotates a triangle so its smallest index comes first, keeping winding.
fn rotate_to_min(tri: [u32; 3]) -> [u32; 3] {
    let start = if tri[0] <= tri[1] && tri[0] <= tri[2] {
        0
    } else if tri[1] <= tri[2] {
        1
    } else {
        2
    };
    [tri[start], tri[(start + 1) % 3], tri[(start + 2) % 3]]
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: DVec3, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}
