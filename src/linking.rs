// linking.rs — crossing count between the X/Y projections of two polylines.
//
// Half the signed number of proper crossings. It stands in for a 3-D linking number;
// it is not one. Z is ignored throughout.

use crate::vector::Vec3;

/// One proper crossing between segment `a` of the first polyline and segment `b` of the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing {
    pub a: usize,
    pub b: usize,
    pub sign: i32,
}

/// Twice the signed area of the triangle (p, q, r) in the X/Y plane.
fn orient(p: Vec3, q: Vec3, r: Vec3) -> f32 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

/// Every proper crossing, in (segment of `a`, segment of `b`) order.
///
/// Segments touching at an endpoint or lying collinear produce a zero orientation on one
/// side and do not count.
pub fn crossings(a: &[Vec3], b: &[Vec3]) -> Vec<Crossing> {
    let mut out = Vec::new();
    for (i, sa) in a.windows(2).enumerate() {
        for (j, sb) in b.windows(2).enumerate() {
            let d1 = orient(sa[0], sa[1], sb[0]);
            let d2 = orient(sa[0], sa[1], sb[1]);
            let d3 = orient(sb[0], sb[1], sa[0]);
            let d4 = orient(sb[0], sb[1], sa[1]);
            if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
                out.push(Crossing { a: i, b: j, sign: if d1 > 0.0 { 1 } else { -1 } });
            }
        }
    }
    out
}

/// Signed crossing sum divided by two; may be a half-integer.
///
/// Unchanged when both polylines are reversed together. Swapping the arguments is a
/// different question (the sign comes from the first polyline's side test), so it is
/// not antisymmetric.
pub fn linking_number(a: &[Vec3], b: &[Vec3]) -> f32 {
    crossings(a, b).iter().map(|c| c.sign).sum::<i32>() as f32 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(xy: &[(f32, f32)], z: f32) -> Vec<Vec3> {
        xy.iter().map(|&(x, y)| Vec3::new(x, y, z)).collect()
    }

    #[test]
    fn parallel_chains_do_not_link() {
        let a: Vec<_> = (0..5).map(|i| Vec3::new(-1.0, i as f32, -1.0)).collect();
        let b: Vec<_> = (0..5).map(|i| Vec3::new(1.0, i as f32, 1.0)).collect();
        assert_eq!(linking_number(&a, &b), 0.0);
    }

    #[test]
    fn single_crossing_by_hand() {
        // x = -1 + y/2 against x = 1.25 - y/2: they meet once at (0.125, 2.25),
        // inside segment 2 of `a` and segment 1 of `b`.
        let a = poly(&[(-1.0, 0.0), (-0.5, 1.0), (0.0, 2.0), (0.5, 3.0), (1.0, 4.0)], -1.0);
        let b = poly(&[(1.0, 0.5), (0.5, 1.5), (0.0, 2.5), (-0.5, 3.5), (-1.0, 4.5)], 1.0);
        // d1 = orient((0,2), (0.5,3), (0.5,1.5)) = -0.75
        assert_eq!(crossings(&a, &b), vec![Crossing { a: 2, b: 1, sign: -1 }]);
        assert_eq!(linking_number(&a, &b), -0.5);
        // swapped: d1 = orient((0.5,1.5), (0,2.5), (0,2)) = 0.25
        assert_eq!(linking_number(&b, &a), 0.5);
    }

    #[test]
    fn reversing_both_is_invariant() {
        let a = poly(&[(-1.0, 0.0), (1.0, 1.0), (-1.0, 2.0), (1.0, 3.0)], 0.0);
        let b = poly(&[(0.0, -1.0), (0.2, 4.0)], 0.0);
        let (mut ra, mut rb) = (a.clone(), b.clone());
        ra.reverse();
        rb.reverse();
        assert_eq!(crossings(&a, &b).len(), 3);
        assert_eq!(linking_number(&a, &b), linking_number(&ra, &rb));
    }

    #[test]
    fn shared_endpoint_is_not_a_crossing() {
        let a = poly(&[(-1.0, 0.0), (0.0, 1.0), (1.0, 0.0)], 0.0);
        let b = poly(&[(-1.0, 2.0), (0.0, 1.0), (1.0, 2.0)], 0.0);
        assert!(crossings(&a, &b).is_empty());
    }

    #[test]
    fn z_is_ignored() {
        let a = poly(&[(-1.0, 0.0), (1.0, 0.0)], 5.0);
        let b = poly(&[(0.0, -1.0), (0.0, 1.0)], -5.0);
        let flat_b = poly(&[(0.0, -1.0), (0.0, 1.0)], 5.0);
        assert_eq!(linking_number(&a, &b), linking_number(&a, &flat_b));
        assert_eq!(linking_number(&a, &b).abs(), 0.5);
    }

    #[test]
    fn degenerate_inputs() {
        let one = poly(&[(0.0, 0.0)], 0.0);
        let seg = poly(&[(-1.0, 0.0), (1.0, 0.0)], 0.0);
        assert_eq!(linking_number(&one, &seg), 0.0);
        assert_eq!(linking_number(&[], &seg), 0.0);
    }
}
