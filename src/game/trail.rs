//! Trail Segment Pool
//!
//! While boosting, a slug drops segments behind itself at a fixed rate.
//! Segments live in a pool allocated once per entity; the spawn index
//! cycles through it, so under sustained boosting the oldest segment is
//! simply moved to the new spot.

use serde::{Serialize, Deserialize};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::vec2::Vec2;
use crate::game::state::PlayerNumber;
use crate::game::stats::FormStats;

/// One pooled trail segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailSegment {
    /// Spawned and not yet faded
    pub active: bool,
    /// World position
    pub position: Vec2,
    /// Display angle in degrees
    pub angle: f32,
    /// Player that dropped it
    pub owner: PlayerNumber,
    /// Seconds until it fades
    pub remaining: f32,
}

impl TrailSegment {
    /// Age the segment; deactivates it once its lifetime runs out.
    pub fn tick(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.active = false;
            self.remaining = 0.0;
        }
    }

    /// (Re)activate at a new spot.
    pub fn spawn(&mut self, position: Vec2, angle: f32, owner: PlayerNumber, lifetime: f32) {
        self.active = true;
        self.position = position;
        self.angle = angle;
        self.owner = owner;
        self.remaining = lifetime;
    }
}

/// Per-frame inputs to the spawner.
#[derive(Clone, Copy, Debug)]
pub struct TrailFrame {
    /// Boost active this frame
    pub boosting: bool,
    /// Entity is steering
    pub moving: bool,
    /// Spawn position
    pub position: Vec2,
    /// Spawn angle in degrees
    pub angle: f32,
    /// Seconds since the last frame
    pub dt: f32,
}

/// Fixed-size segment pool with a round-robin spawn index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrailSpawner {
    segments: Vec<TrailSegment>,
    next: usize,
    cooldown_remaining: f32,
}

impl TrailSpawner {
    /// Pre-allocate `size` inactive segments tagged with `owner`.
    pub fn new(size: usize, owner: PlayerNumber) -> Self {
        let segment = TrailSegment {
            owner,
            ..TrailSegment::default()
        };
        Self {
            segments: vec![segment; size],
            next: 0,
            cooldown_remaining: 0.0,
        }
    }

    /// Every pooled segment, active or not.
    pub fn segments(&self) -> &[TrailSegment] {
        &self.segments
    }

    /// Active segments with their pool index.
    pub fn active_segments(&self) -> impl Iterator<Item = (usize, &TrailSegment)> {
        self.segments.iter().enumerate().filter(|(_, s)| s.active)
    }

    /// Index the next spawn will use.
    ///
    /// Wraps modulo the pool size, so the last slot is used before index 0
    /// is recycled.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Seconds until the next spawn is allowed.
    #[inline]
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Advance one frame. Returns the index of a newly spawned segment.
    ///
    /// Segments age every frame; the spawn timer only runs while boosting.
    pub fn update(
        &mut self,
        frame: TrailFrame,
        owner: PlayerNumber,
        stats: &FormStats,
        lifetime: f32,
    ) -> Option<usize> {
        for segment in &mut self.segments {
            segment.tick(frame.dt);
        }

        if !frame.boosting || self.segments.is_empty() {
            return None;
        }

        self.cooldown_remaining -= frame.dt;
        if !frame.moving || self.cooldown_remaining > 0.0 {
            return None;
        }

        let index = self.next;
        self.segments[index].spawn(frame.position, frame.angle, owner, lifetime);
        self.cooldown_remaining = stats.trail_cooldown;
        self.next = (self.next + 1) % self.segments.len();

        #[cfg(feature = "debug-tracing")]
        trace!(player = owner, index, "Trail segment spawned");

        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats::StatTable;

    fn frame(boosting: bool, moving: bool, dt: f32) -> TrailFrame {
        TrailFrame {
            boosting,
            moving,
            position: Vec2::new(1.0, 2.0),
            angle: 90.0,
            dt,
        }
    }

    #[test]
    fn test_no_spawn_without_boost() {
        let stats = StatTable::default().slug;
        let mut trail = TrailSpawner::new(4, 1);

        assert_eq!(trail.update(frame(false, true, 0.1), 1, &stats, 1.0), None);
        assert_eq!(trail.active_segments().count(), 0);
    }

    #[test]
    fn test_no_spawn_while_stationary() {
        let stats = StatTable::default().slug;
        let mut trail = TrailSpawner::new(4, 1);

        assert_eq!(trail.update(frame(true, false, 0.1), 1, &stats, 1.0), None);
    }

    #[test]
    fn test_spawn_rate_follows_cooldown() {
        let stats = StatTable::default().slug;
        let mut trail = TrailSpawner::new(8, 3);

        // First boosting frame spawns immediately
        assert_eq!(trail.update(frame(true, true, 0.01), 3, &stats, 1.0), Some(0));
        assert_eq!(trail.cooldown_remaining(), stats.trail_cooldown);

        // Cooldown (0.04s) blocks the next few 0.01s frames
        assert_eq!(trail.update(frame(true, true, 0.01), 3, &stats, 1.0), None);
        assert_eq!(trail.update(frame(true, true, 0.01), 3, &stats, 1.0), None);

        let segment = trail.segments()[0];
        assert!(segment.active);
        assert_eq!(segment.owner, 3);
        assert_eq!(segment.position, Vec2::new(1.0, 2.0));
        assert_eq!(segment.angle, 90.0);
    }

    #[test]
    fn test_index_wraps_over_whole_pool() {
        let stats = StatTable::default().slug;
        let mut trail = TrailSpawner::new(3, 1);

        let spawned: Vec<_> = (0..5)
            .filter_map(|_| trail.update(frame(true, true, 1.0), 1, &stats, 10.0))
            .collect();
        assert_eq!(spawned, vec![0, 1, 2, 0, 1]);
        assert_eq!(trail.segments().len(), 3);
    }

    #[test]
    fn test_segments_fade_after_lifetime() {
        let stats = StatTable::default().slug;
        let mut trail = TrailSpawner::new(4, 1);

        trail.update(frame(true, true, 0.01), 1, &stats, 0.5);
        assert_eq!(trail.active_segments().count(), 1);

        trail.update(frame(true, false, 0.6), 1, &stats, 0.5);
        assert_eq!(trail.active_segments().count(), 0);
    }

    #[test]
    fn test_segments_fade_after_boost_ends() {
        let stats = StatTable::default().slug;
        let mut trail = TrailSpawner::new(4, 1);

        trail.update(frame(true, true, 0.05), 1, &stats, 0.5);
        trail.update(frame(true, true, 0.25), 1, &stats, 0.5);
        assert_eq!(trail.active_segments().count(), 2);

        // Boost over: no more spawns, but the dropped segments keep aging
        assert_eq!(trail.update(frame(false, true, 0.3), 1, &stats, 0.5), None);
        assert_eq!(trail.active_segments().count(), 1);
        trail.update(frame(false, false, 0.3), 1, &stats, 0.5);
        assert_eq!(trail.active_segments().count(), 0);
    }
}
