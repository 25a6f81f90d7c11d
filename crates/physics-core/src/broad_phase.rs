//! Broad-phase collision detection: a pairwise bounding-sphere overlap test.

use crate::body::RigidBody;

/// An ordered (by ascending id) candidate pair of bodies whose bounding spheres overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyPair {
    /// Index into the bodies slice of the first body (lower id).
    pub first: usize,
    /// Index into the bodies slice of the second body (higher id).
    pub second: usize,
}

/// Returns all ordered-by-id pairs `(i, j)` with `bodies[i].id < bodies[j].id` whose bounding
/// spheres overlap: `‖p_i - p_j‖ < r_i + r_j`. `first`/`second` are indices into `bodies`, but
/// the pair itself is ordered by body id rather than Vec position, since the two diverge once
/// a body is removed and another added (the freed id is reused but pushed to the Vec's end).
/// O(n²); acceptable at the scales this engine targets.
pub fn get_pairs(bodies: &[RigidBody]) -> Vec<BodyPair> {
    let mut order: Vec<usize> = (0..bodies.len()).collect();
    order.sort_by_key(|&i| bodies[i].id);

    let mut pairs = Vec::new();
    for a in 0..order.len() {
        for b in (a + 1)..order.len() {
            let i = order[a];
            let j = order[b];
            let bi = &bodies[i];
            let bj = &bodies[j];
            let r = bi.bounding_sphere_radius + bj.bounding_sphere_radius;
            if (bi.world_transform.origin - bj.world_transform.origin).norm() < r {
                pairs.push(BodyPair { first: i, second: j });
            }
        }
    }
    pairs
}
