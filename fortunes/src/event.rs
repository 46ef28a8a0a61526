//! Site and close events, and the packet-merging rule that bundles a point
//! site with the segment sites incident to it at a shared polygon vertex.

use ordered_float::OrderedFloat;

use crate::arc::ArcId;
use crate::geometry::{PointSite, SegmentSite, Vec2};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SiteEvent {
    Point(PointSite),
    Seg(SegmentSite),
}

impl SiteEvent {
    pub fn y(&self) -> OrderedFloat<f64> {
        match self {
            SiteEvent::Point(p) => p.point.y,
            SiteEvent::Seg(s) => s.a.y,
        }
    }

    pub fn label(&self) -> i64 {
        match self {
            SiteEvent::Point(p) => p.label,
            SiteEvent::Seg(s) => s.label,
        }
    }

    pub fn x(&self) -> OrderedFloat<f64> {
        match self {
            SiteEvent::Point(p) => p.point.x,
            SiteEvent::Seg(s) => s.a.x,
        }
    }
}

/// A packet of site events to insert atomically, per §3.2: a point packet is
/// always size one; a segment's upper endpoint may pull in up to two
/// already-queued SEG events sharing that same point.
#[derive(Clone, Debug)]
pub struct EventPacket {
    pub primary: SiteEvent,
    pub attached: Vec<SiteEvent>,
}

impl EventPacket {
    pub fn single(primary: SiteEvent) -> Self {
        Self {
            primary,
            attached: vec![],
        }
    }

    pub fn directrix(&self) -> f64 {
        self.primary.y().into_inner()
    }

    pub fn all(&self) -> impl Iterator<Item = &SiteEvent> {
        std::iter::once(&self.primary).chain(self.attached.iter())
    }
}

/// Pulls adjacent SEG events sharing the primary event's point out of the
/// back of `queue` (which must be sorted ascending by y, so `.last()` is the
/// next event to fire) and bundles them into one packet.
pub fn merge_packet(primary: SiteEvent, queue: &mut Vec<SiteEvent>) -> EventPacket {
    let point = match primary {
        SiteEvent::Point(p) => p.point,
        SiteEvent::Seg(s) => s.a,
    };

    let shares_point = |e: &SiteEvent| match e {
        SiteEvent::Seg(s) => s.a == point,
        SiteEvent::Point(_) => false,
    };

    let mut attached = vec![];
    if queue.len() >= 2 {
        let n = &queue[queue.len() - 1];
        let nn = &queue[queue.len() - 2];
        if shares_point(n) && shares_point(nn) {
            attached.push(queue.pop().unwrap());
            attached.push(queue.pop().unwrap());
            return EventPacket { primary, attached };
        }
    }
    if let Some(last) = queue.last() {
        if shares_point(last) {
            attached.push(queue.pop().unwrap());
        }
    }
    EventPacket { primary, attached }
}

/// An arc-disappearance (Voronoi vertex) event.
#[derive(Clone, Debug)]
pub struct CloseEvent {
    pub yval: f64,
    pub arc: ArcId,
    pub point: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn merge_packet_pulls_two_adjacent_seg_events() {
        let shared = Vec2::new(0.0, 10.0);
        let seg_a = SegmentSite::new(1, shared, Vec2::new(-5.0, 0.0)).unwrap();
        let seg_b = SegmentSite::new(2, shared, Vec2::new(5.0, 0.0)).unwrap();
        let point = PointSite::new(0, shared);

        let mut queue = vec![SiteEvent::Seg(seg_a), SiteEvent::Seg(seg_b)];
        let packet = merge_packet(SiteEvent::Point(point), &mut queue);

        assert!(queue.is_empty());
        assert_eq!(packet.attached.len(), 2);
    }

    #[test]
    fn merge_packet_leaves_unrelated_events_alone() {
        let point = PointSite::new(0, Vec2::new(0.0, 10.0));
        let other = SegmentSite::new(1, Vec2::new(5.0, 9.0), Vec2::new(5.0, 0.0)).unwrap();

        let mut queue = vec![SiteEvent::Seg(other)];
        let packet = merge_packet(SiteEvent::Point(point), &mut queue);

        assert_eq!(queue.len(), 1);
        assert!(packet.attached.is_empty());
    }
}
