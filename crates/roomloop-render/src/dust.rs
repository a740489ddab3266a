//! Floating dust particles.
//!
//! The one stateful piece of the preview: a fixed population of slow
//! particles integrated per tick and wrapped toroidally at the canvas
//! bounds. The batch path has no counterpart — the external encoder has
//! no particle system, so dust is a preview-only effect.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use roomloop_core::{FrameBuffer, Point2D};

/// Number of particles in a dust field.
pub const DUST_COUNT: usize = 30;

/// One floating dust mote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustParticle {
    pub pos: Point2D,
    pub vel: Point2D,
    pub size: f64,
}

/// A fixed-size field of dust particles scoped to one preview session.
///
/// Particles are never destroyed individually; toggling the feature
/// reinitializes the whole field.
#[derive(Debug, Clone)]
pub struct DustField {
    particles: Vec<DustParticle>,
    width: f64,
    height: f64,
}

impl DustField {
    /// Seed a new field across the canvas.
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..DUST_COUNT)
            .map(|_| DustParticle {
                pos: Point2D::new(
                    rng.gen::<f64>() * width as f64,
                    rng.gen::<f64>() * height as f64,
                ),
                vel: Point2D::new(
                    (rng.gen::<f64>() - 0.5) * 0.5,
                    (rng.gen::<f64>() - 0.5) * 0.3,
                ),
                size: rng.gen::<f64>() * 2.0 + 1.0,
            })
            .collect();
        Self {
            particles,
            width: width as f64,
            height: height as f64,
        }
    }

    /// Advance every particle by one tick, wrapping at the edges.
    pub fn advance(&mut self) {
        for p in &mut self.particles {
            p.pos.x += p.vel.x;
            p.pos.y += p.vel.y;
            if p.pos.x < 0.0 {
                p.pos.x = self.width;
            }
            if p.pos.x > self.width {
                p.pos.x = 0.0;
            }
            if p.pos.y < 0.0 {
                p.pos.y = self.height;
            }
            if p.pos.y > self.height {
                p.pos.y = 0.0;
            }
        }
    }

    /// Draw the particles as soft translucent white dots.
    pub fn draw(&self, fb: &mut FrameBuffer) {
        const ALPHA: f64 = 0.18;
        for p in &self.particles {
            let r = p.size.ceil() as i32;
            let px = p.pos.x as i32;
            let py = p.pos.y as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    if (dx * dx + dy * dy) as f64 > p.size * p.size {
                        continue;
                    }
                    let x = px + dx;
                    let y = py + dy;
                    if x < 0 || y < 0 || x >= fb.width as i32 || y >= fb.height as i32 {
                        continue;
                    }
                    let offset = ((y as usize) * (fb.width as usize) + (x as usize)) * 4;
                    for c in 0..3 {
                        let v = fb.data[offset + c] as f64;
                        fb.data[offset + c] = (v + (255.0 - v) * ALPHA) as u8;
                    }
                    fb.data[offset + 3] = fb.data[offset + 3].max((ALPHA * 255.0) as u8);
                }
            }
        }
    }

    /// The current particles, for inspection.
    pub fn particles(&self) -> &[DustParticle] {
        &self.particles
    }
}
