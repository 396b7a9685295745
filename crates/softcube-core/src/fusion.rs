//! Cube fusion
//!
//! A cube being placed starts as a [`PendingCube`] whose local vertices and
//! springs have no arena entry yet. Fusing it onto an already placed cube
//! aliases the 4 vertices and 6 springs of the mating face to the entries
//! the placed cube already owns. Whatever is still unaliased after all
//! fusions is flushed into the arena as fresh entries.
//!
//! A pending vertex can receive two different arena ids when the new cube
//! bridges two placed cubes that only touched along an edge or corner, each
//! of which brought its own copy of the shared vertex. Those copies are
//! welded in [`MassWelds`] and collapse into one mass when the robot is
//! finished.

use glam::IVec3;
use log::trace;
use smallvec::SmallVec;

use crate::cube::{cell_centroid, cell_origin, Cube, CubeJoint};
use crate::error::AssemblyError;
use crate::face::{Face, FaceSet};
use crate::lattice::{
    template_rest_length, PointMass, Spring, CUBE_MASSES, CUBE_SPRINGS, SPRING_ENDPOINTS,
    VERTEX_OFFSETS,
};

/// Union-find over arena mass ids
///
/// The smallest id of a welded group is its representative, so the masses of
/// earlier cubes keep their ids when the arena is compacted.
#[derive(Debug, Clone, Default)]
pub struct MassWelds {
    parent: Vec<usize>,
}

impl MassWelds {
    /// Register a new mass id
    pub fn push(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `id`'s group
    pub fn find(&mut self, mut id: usize) -> usize {
        while self.parent[id] != id {
            self.parent[id] = self.parent[self.parent[id]];
            id = self.parent[id];
        }
        id
    }

    /// Merge the groups of `a` and `b`. Returns false if they already were one.
    pub fn weld(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[drop] = keep;
        true
    }
}

/// A cube that has been positioned but not yet flushed into the arena
#[derive(Debug, Clone)]
pub struct PendingCube {
    /// Index the cube will have in the robot's cube list
    pub index: usize,
    pub cell: IVec3,
    pub joints: SmallVec<[CubeJoint; 6]>,
    pub free_faces: FaceSet,
    /// Arena ids of aliased vertices, `None` while still unassigned
    pub mass_ids: [Option<usize>; CUBE_MASSES],
    /// Arena ids of aliased springs, `None` while still unassigned
    pub spring_ids: [Option<usize>; CUBE_SPRINGS],
}

impl PendingCube {
    pub fn new(index: usize, cell: IVec3) -> Self {
        Self {
            index,
            cell,
            joints: SmallVec::new(),
            free_faces: FaceSet::all(),
            mass_ids: [None; CUBE_MASSES],
            spring_ids: [None; CUBE_SPRINGS],
        }
    }

    /// Local vertices that still need a fresh arena entry
    pub fn masses_left(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CUBE_MASSES).filter(|&v| self.mass_ids[v].is_none())
    }

    /// Local springs that still need a fresh arena entry
    pub fn springs_left(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CUBE_SPRINGS).filter(|&s| self.spring_ids[s].is_none())
    }

    /// Allocate arena entries for everything fusion left unassigned and turn
    /// this into a placed cube.
    pub fn flush(
        self,
        masses: &mut Vec<PointMass>,
        springs: &mut Vec<Spring>,
        welds: &mut MassWelds,
        point_mass: f32,
        stiffness: f32,
    ) -> Cube {
        let origin = cell_origin(self.cell);

        let mut mass_ids = [0; CUBE_MASSES];
        for (v, slot) in self.mass_ids.iter().enumerate() {
            mass_ids[v] = match slot {
                Some(id) => *id,
                None => {
                    let id = welds.push();
                    debug_assert_eq!(id, masses.len());
                    masses.push(PointMass::at_rest(point_mass, origin + VERTEX_OFFSETS[v]));
                    id
                }
            };
        }

        let mut spring_ids = [0; CUBE_SPRINGS];
        for (s, slot) in self.spring_ids.iter().enumerate() {
            spring_ids[s] = match slot {
                Some(id) => *id,
                None => {
                    let (a, b) = SPRING_ENDPOINTS[s];
                    springs.push(Spring::new(
                        mass_ids[a],
                        mass_ids[b],
                        template_rest_length(s),
                        stiffness,
                    ));
                    springs.len() - 1
                }
            };
        }

        Cube {
            cell: self.cell,
            joints: self.joints,
            free_faces: self.free_faces,
            mass_ids,
            spring_ids,
            center: cell_centroid(self.cell),
        }
    }
}

/// Fuse `incoming` onto face `face` of the placed cube `existing`
///
/// The incoming cube mates with the antipodal face. Both faces must still be
/// free. Shared vertices and springs of `incoming` are aliased to the arena
/// ids `existing` holds; vertices that were already aliased to a different
/// mass through an earlier fusion are welded to it.
pub fn fuse(
    existing: &mut Cube,
    existing_index: usize,
    face: Face,
    incoming: &mut PendingCube,
    welds: &mut MassWelds,
) -> Result<(), AssemblyError> {
    let mate = face.antipode();
    if !existing.free_faces.contains_face(face) {
        return Err(AssemblyError::FaceConsumed {
            cube: existing_index,
            face,
        });
    }
    if !incoming.free_faces.contains_face(mate) {
        return Err(AssemblyError::FaceConsumed {
            cube: incoming.index,
            face: mate,
        });
    }

    for (a, b) in face.vertices().into_iter().zip(mate.vertices()) {
        let global = existing.mass_ids[a];
        match incoming.mass_ids[b] {
            None => incoming.mass_ids[b] = Some(global),
            Some(other) => {
                if welds.weld(global, other) {
                    trace!(
                        "Cube {} vertex {b}: welded mass {other} onto {global}",
                        incoming.index
                    );
                }
            }
        }
    }

    // A spring that already has an id lies on an edge shared with an earlier
    // neighbour; its duplicate collapses once the welded masses are merged.
    for (sa, sb) in face.springs().into_iter().zip(mate.springs()) {
        if incoming.spring_ids[sb].is_none() {
            incoming.spring_ids[sb] = Some(existing.spring_ids[sa]);
        }
    }

    existing.joints.push(CubeJoint {
        neighbor: incoming.index,
        face,
        other_face: mate,
    });
    existing.free_faces.remove_face(face);
    incoming.joints.push(CubeJoint {
        neighbor: existing_index,
        face: mate,
        other_face: face,
    });
    incoming.free_faces.remove_face(mate);

    trace!(
        "Fused cube {} ({mate}) onto cube {existing_index} ({face})",
        incoming.index
    );
    Ok(())
}
