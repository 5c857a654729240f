//! Interval algebra along a ray for constructive solid geometry.
//!
//! A solid's intersection with a ray's line is a sorted list of disjoint
//! [`Span`]s, each running from an entry [`Boundary`] to an exit boundary.
//! Boolean operations on solids become set operations on span lists:
//!
//! | solid op        | span op                     |
//! |-----------------|-----------------------------|
//! | `A ∪ B`         | [`SpanList::union`]         |
//! | `A ∩ B`         | [`SpanList::intersect`]     |
//! | `A − B`         | [`SpanList::subtract`]      |
//! | complement of A | [`SpanList::complement`]    |
//!
//! Every finite boundary remembers the primitive whose surface produced it,
//! and whether the primitive's outward normal must be flipped to point out
//! of the composite solid (boundaries contributed by a subtracted solid).

use optica_math::Tolerance;

use crate::intersect::Crossing;
use crate::scene::Primitive;
use crate::Ray;

/// One end of a [`Span`].
#[derive(Debug, Clone, Copy)]
pub struct Boundary<'a> {
    /// Parameter along the ray; `±∞` for unbounded spans.
    pub t: f64,
    /// Primitive whose surface lies here, `None` at infinity.
    pub primitive: Option<&'a Primitive>,
    /// The composite's outward normal is the primitive's inward normal.
    pub flipped: bool,
    /// Whether this boundary may be reported as a hit.
    pub visible: bool,
}

impl<'a> Boundary<'a> {
    /// A visible boundary on the surface of `primitive`.
    pub fn on(primitive: &'a Primitive, t: f64) -> Self {
        Self {
            t,
            primitive: Some(primitive),
            flipped: false,
            visible: true,
        }
    }

    /// The unbounded start of a span.
    pub fn minus_infinity() -> Self {
        Self::at_infinity(f64::NEG_INFINITY)
    }

    /// The unbounded end of a span.
    pub fn plus_infinity() -> Self {
        Self::at_infinity(f64::INFINITY)
    }

    fn at_infinity(t: f64) -> Self {
        Self {
            t,
            primitive: None,
            flipped: false,
            visible: false,
        }
    }

    /// The same boundary seen from the other side.
    pub fn flip(self) -> Self {
        Self {
            flipped: !self.flipped,
            ..self
        }
    }

    /// Whether this boundary counts as a hit for `ray`.
    pub fn is_hit_for(&self, ray: &Ray) -> bool {
        self.visible && self.primitive.is_some() && ray.accepts(self.t)
    }
}

/// A maximal interval of the ray's line that lies inside a solid.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    /// Where the line enters the solid.
    pub enter: Boundary<'a>,
    /// Where the line leaves the solid.
    pub exit: Boundary<'a>,
}

impl Span<'_> {
    /// Length along the ray (may be infinite).
    pub fn length(&self) -> f64 {
        self.exit.t - self.enter.t
    }

    /// Whether the span has more than zero measure at tolerance `tol`.
    /// NaN lengths (both ends at the same infinity) count as empty.
    fn is_substantial(&self, tol: &Tolerance) -> bool {
        self.length() > tol.linear
    }
}

/// Sorted, disjoint spans of one solid along one ray.
#[derive(Debug, Clone, Default)]
pub struct SpanList<'a> {
    spans: Vec<Span<'a>>,
}

impl<'a> SpanList<'a> {
    /// No interior anywhere along the line.
    pub fn empty() -> Self {
        Self { spans: Vec::new() }
    }

    /// Interior along the whole line.
    pub fn everything() -> Self {
        Self {
            spans: vec![Span {
                enter: Boundary::minus_infinity(),
                exit: Boundary::plus_infinity(),
            }],
        }
    }

    /// Build spans for one primitive from its sorted line crossings.
    ///
    /// Crossings that are inconsistent with the current inside/outside
    /// state (an exit while outside, an entry while inside) are skipped.
    pub fn from_crossings(
        primitive: &'a Primitive,
        crossings: &[Crossing],
        starts_inside: bool,
        tol: &Tolerance,
    ) -> Self {
        let mut spans = Vec::with_capacity(crossings.len() / 2 + 1);
        let mut open = starts_inside.then(Boundary::minus_infinity);
        for c in crossings {
            let b = Boundary::on(primitive, c.t);
            match (c.entering, open) {
                (true, None) => open = Some(b),
                (false, Some(enter)) => {
                    spans.push(Span { enter, exit: b });
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(enter) = open {
            spans.push(Span {
                enter,
                exit: Boundary::plus_infinity(),
            });
        }
        Self::normalised(spans, tol)
    }

    /// Sort, drop zero-measure spans and merge spans that overlap or touch
    /// within tolerance.
    fn normalised(mut spans: Vec<Span<'a>>, tol: &Tolerance) -> Self {
        spans.retain(|s| s.is_substantial(tol));
        spans.sort_by(|a, b| a.enter.t.total_cmp(&b.enter.t));

        let mut merged: Vec<Span<'a>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.enter.t <= last.exit.t + tol.linear => {
                    if span.exit.t > last.exit.t {
                        last.exit = span.exit;
                    }
                }
                _ => merged.push(span),
            }
        }
        Self { spans: merged }
    }

    /// The spans in order along the ray.
    pub fn spans(&self) -> &[Span<'a>] {
        &self.spans
    }

    /// Whether the line misses the solid entirely.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Points inside either solid.
    pub fn union(mut self, other: SpanList<'a>, tol: &Tolerance) -> Self {
        self.spans.extend(other.spans);
        Self::normalised(self.spans, tol)
    }

    /// Points inside both solids.
    pub fn intersect(&self, other: &SpanList<'a>, tol: &Tolerance) -> Self {
        let (a, b) = (&self.spans, &other.spans);
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let enter = if a[i].enter.t >= b[j].enter.t {
                a[i].enter
            } else {
                b[j].enter
            };
            let exit = if a[i].exit.t <= b[j].exit.t {
                a[i].exit
            } else {
                b[j].exit
            };
            let span = Span { enter, exit };
            if span.is_substantial(tol) {
                out.push(span);
            }
            if a[i].exit.t < b[j].exit.t {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { spans: out }
    }

    /// Points outside the solid. Boundaries are flipped so their normals
    /// keep pointing out of the (complemented) interior.
    pub fn complement(&self, tol: &Tolerance) -> Self {
        let mut out = Vec::with_capacity(self.spans.len() + 1);
        let mut prev = Boundary::minus_infinity();
        for s in &self.spans {
            let gap = Span {
                enter: prev,
                exit: s.enter.flip(),
            };
            if gap.is_substantial(tol) {
                out.push(gap);
            }
            prev = s.exit.flip();
        }
        let tail = Span {
            enter: prev,
            exit: Boundary::plus_infinity(),
        };
        if tail.is_substantial(tol) {
            out.push(tail);
        }
        Self { spans: out }
    }

    /// Points inside `self` but not inside `other`.
    pub fn subtract(&self, other: &SpanList<'a>, tol: &Tolerance) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        self.intersect(&other.complement(tol), tol)
    }

    /// Mark every boundary as invisible.
    pub fn hide(&mut self) {
        for s in &mut self.spans {
            s.enter.visible = false;
            s.exit.visible = false;
        }
    }

    /// Nearest boundary that counts as a hit for `ray`.
    pub fn first_hit(&self, ray: &Ray) -> Option<Boundary<'a>> {
        self.spans
            .iter()
            .flat_map(|s| [s.enter, s.exit])
            .find(|b| b.is_hit_for(ray))
    }
}
