//! Static arena geometry
//!
//! A bordered rectangle filled with random obstacles. Border strips are
//! permanent stone; interior stone, barrels and power boxes can be destroyed.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{circle_rect_contact, circle_rect_overlap};
use super::rect::Rect;
use crate::config::GameMode;
use crate::consts::*;

/// Obstacle materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Blocks movement and shots
    Stone,
    /// Blocks, breaks easily
    Barrel,
    /// Hides characters, never blocks
    Bush,
    /// Decorative, currently non-blocking
    Water,
    /// Breakable box holding a power cube
    PowerBox,
}

impl ObstacleKind {
    #[inline]
    pub fn blocks(&self) -> bool {
        matches!(
            self,
            ObstacleKind::Stone | ObstacleKind::Barrel | ObstacleKind::PowerBox
        )
    }

    #[inline]
    pub fn destructible(&self) -> bool {
        self.blocks()
    }
}

/// A rectangular terrain piece
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    pub kind: ObstacleKind,
    /// Remaining integrity (power boxes only)
    pub hp: f32,
    /// Border walls never break
    pub permanent: bool,
}

impl Obstacle {
    #[inline]
    pub fn can_be_destroyed(&self) -> bool {
        !self.permanent && self.kind.destructible()
    }
}

/// Arena geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<Obstacle>,
    next_id: u32,
}

impl World {
    /// Empty bordered arena
    pub fn bordered(width: f32, height: f32) -> Self {
        let mut world = Self {
            width,
            height,
            obstacles: Vec::new(),
            next_id: 1,
        };
        let t = WALL_THICKNESS;
        let strips = [
            Rect::new(Vec2::ZERO, Vec2::new(width, t)),
            Rect::new(Vec2::new(0.0, height - t), Vec2::new(width, height)),
            Rect::new(Vec2::ZERO, Vec2::new(t, height)),
            Rect::new(Vec2::new(width - t, 0.0), Vec2::new(width, height)),
        ];
        for rect in strips {
            world.add_obstacle(rect, ObstacleKind::Stone);
            if let Some(last) = world.obstacles.last_mut() {
                last.permanent = true;
            }
        }
        world
    }

    /// Generate an arena for the given mode
    pub fn generate(rng: &mut Pcg32, mode: GameMode) -> Self {
        let mut world = Self::bordered(WORLD_WIDTH, WORLD_HEIGHT);
        let center = world.center();
        let mut placed = 0;
        let mut attempts = 0;

        while placed < OBSTACLE_COUNT && attempts < OBSTACLE_COUNT * 20 {
            attempts += 1;

            let roll: f32 = rng.random();
            let mut kind = if roll < 0.35 {
                ObstacleKind::Stone
            } else if roll < 0.60 {
                ObstacleKind::Bush
            } else if roll < 0.75 {
                ObstacleKind::Barrel
            } else if roll < 0.85 {
                ObstacleKind::Water
            } else {
                ObstacleKind::PowerBox
            };
            if kind == ObstacleKind::PowerBox && !mode.drops_power_cubes() {
                kind = ObstacleKind::Stone;
            }

            let size = match kind {
                ObstacleKind::PowerBox => Vec2::splat(70.0),
                ObstacleKind::Barrel => Vec2::splat(rng.random_range(50.0..80.0)),
                _ => Vec2::new(
                    rng.random_range(OBSTACLE_MIN_SIZE..OBSTACLE_MAX_SIZE),
                    rng.random_range(OBSTACLE_MIN_SIZE..OBSTACLE_MAX_SIZE),
                ),
            };
            let lo = WALL_THICKNESS + CHARACTER_RADIUS * 2.0;
            let origin = Vec2::new(
                rng.random_range(lo..(world.width - lo - size.x)),
                rng.random_range(lo..(world.height - lo - size.y)),
            );
            let rect = Rect::from_origin_size(origin, size);

            // Keep mid-map open
            if rect.distance_to(center) < KEEP_OUT_RADIUS {
                continue;
            }
            if world
                .obstacles
                .iter()
                .filter(|o| !o.permanent)
                .any(|o| o.rect.intersects(&rect))
            {
                continue;
            }

            world.add_obstacle(rect, kind);
            placed += 1;
        }

        if mode.is_round_based() {
            for side in 0..2 {
                for spawn in world.team_spawns(side) {
                    world.clear_area(spawn, CHARACTER_RADIUS * 3.0);
                }
            }
        }

        log::debug!(
            "Generated arena with {} obstacles ({} attempts)",
            placed,
            attempts
        );
        world
    }

    pub fn add_obstacle(&mut self, rect: Rect, kind: ObstacleKind) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let hp = if kind == ObstacleKind::PowerBox {
            POWER_BOX_HP
        } else {
            0.0
        };
        self.obstacles.push(Obstacle {
            id,
            rect,
            kind,
            hp,
            permanent: false,
        });
        id
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    #[inline]
    pub fn in_bounds(&self, point: Vec2) -> bool {
        self.bounds().contains(point)
    }

    /// True if a circle at `point` overlaps any blocking terrain or leaves the map
    pub fn collides(&self, point: Vec2, radius: f32) -> bool {
        if point.x - radius < 0.0
            || point.y - radius < 0.0
            || point.x + radius > self.width
            || point.y + radius > self.height
        {
            return true;
        }
        self.blocking_obstacle(point, radius).is_some()
    }

    /// Index of the first blocking obstacle overlapping the circle
    pub fn blocking_obstacle(&self, point: Vec2, radius: f32) -> Option<usize> {
        self.obstacles
            .iter()
            .position(|o| o.kind.blocks() && circle_rect_overlap(point, radius, &o.rect))
    }

    /// Is `point` hidden in a bush
    pub fn in_bush(&self, point: Vec2) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.kind == ObstacleKind::Bush && o.rect.contains(point))
    }

    /// Remove destructible obstacles whose centre lies within
    /// `radius + DESTROY_MARGIN` of `point`
    pub fn destroy(&mut self, point: Vec2, radius: f32) -> Vec<Obstacle> {
        let reach = radius + DESTROY_MARGIN;
        self.remove_where(|o| o.can_be_destroyed() && o.rect.center().distance(point) <= reach)
    }

    /// Remove destructible obstacles the circle overlaps at all
    pub fn destroy_overlapping(&mut self, point: Vec2, radius: f32) -> Vec<Obstacle> {
        self.remove_where(|o| o.can_be_destroyed() && circle_rect_overlap(point, radius, &o.rect))
    }

    /// Remove any non-border obstacle touching the circle
    pub fn clear_area(&mut self, point: Vec2, radius: f32) {
        self.remove_where(|o| !o.permanent && circle_rect_overlap(point, radius, &o.rect));
    }

    /// Remove one obstacle by index if it can be destroyed
    pub fn destroy_at(&mut self, index: usize) -> Option<Obstacle> {
        if self.obstacles.get(index)?.can_be_destroyed() {
            Some(self.obstacles.remove(index))
        } else {
            None
        }
    }

    fn remove_where<F>(&mut self, pred: F) -> Vec<Obstacle>
    where
        F: Fn(&Obstacle) -> bool,
    {
        let mut removed = Vec::new();
        self.obstacles.retain(|o| {
            if pred(o) {
                removed.push(o.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Push a circle out of any blocking terrain it overlaps
    pub fn push_out(&self, mut point: Vec2, radius: f32) -> Vec2 {
        for _ in 0..4 {
            let mut moved = false;
            for obstacle in self.obstacles.iter().filter(|o| o.kind.blocks()) {
                let contact = circle_rect_contact(point, radius, &obstacle.rect);
                if contact.hit {
                    point += contact.normal * (contact.penetration + 0.5);
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
        let lo = Vec2::splat(radius);
        let hi = Vec2::new(self.width, self.height) - lo;
        point.clamp(lo, hi)
    }

    /// Move a circle by `delta`, sliding along blocking terrain one axis at a time
    pub fn slide(&self, from: Vec2, delta: Vec2, radius: f32) -> Vec2 {
        let mut pos = from;
        let try_x = Vec2::new(pos.x + delta.x, pos.y);
        if !self.collides(try_x, radius) {
            pos = try_x;
        }
        let try_y = Vec2::new(pos.x, pos.y + delta.y);
        if !self.collides(try_y, radius) {
            pos = try_y;
        }
        pos
    }

    /// Random point where a circle of `radius` fits, if found within the retry budget
    pub fn random_open_position(&self, rng: &mut Pcg32, radius: f32) -> Option<Vec2> {
        let lo = WALL_THICKNESS + radius;
        for _ in 0..SPAWN_ATTEMPTS {
            let candidate = Vec2::new(
                rng.random_range(lo..(self.width - lo)),
                rng.random_range(lo..(self.height - lo)),
            );
            if !self.collides(candidate, radius) {
                return Some(candidate);
            }
        }
        None
    }

    /// Fixed knockout spawn points; side 0 at the bottom, side 1 at the top
    pub fn team_spawns(&self, side: usize) -> [Vec2; 3] {
        let y = if side == 0 {
            self.height - WALL_THICKNESS - 160.0
        } else {
            WALL_THICKNESS + 160.0
        };
        let cx = self.width / 2.0;
        [
            Vec2::new(cx - 220.0, y),
            Vec2::new(cx, y),
            Vec2::new(cx + 220.0, y),
        ]
    }
}
