use crate::model::{Gait, Rules};
use crate::sim::TickOutcome;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::debug;

/* -----------------------------
   Terrain: seeded value-noise heightmap
------------------------------ */

fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846ca68b);
    x ^= x >> 16;
    x
}

fn hash2(x: i32, y: i32, seed: u32) -> u32 {
    hash_u32(seed ^ (x as u32).wrapping_mul(0x9e3779b1) ^ (y as u32).wrapping_mul(0x85ebca6b))
}

fn rand01_from_hash(h: u32) -> f32 {
    ((h & 0x00FF_FFFF) as f32) / 16_777_215.0
}

fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn value_noise2(x: f32, y: f32, seed: u32) -> f32 {
    let xi = x.floor() as i32;
    let yi = y.floor() as i32;
    let xf = x - xi as f32;
    let yf = y - yi as f32;

    let h00 = rand01_from_hash(hash2(xi, yi, seed));
    let h10 = rand01_from_hash(hash2(xi + 1, yi, seed));
    let h01 = rand01_from_hash(hash2(xi, yi + 1, seed));
    let h11 = rand01_from_hash(hash2(xi + 1, yi + 1, seed));

    let u = fade(xf);
    let v = fade(yf);
    let x0 = h00 + (h10 - h00) * u;
    let x1 = h01 + (h11 - h01) * u;
    x0 + (x1 - x0) * v
}

fn fbm2(mut x: f32, mut y: f32, seed: u32, octaves: usize) -> f32 {
    let mut amp = 0.5;
    let mut sum = 0.0;
    let mut norm = 0.0;
    for i in 0..octaves {
        let s = seed.wrapping_add((i as u32).wrapping_mul(1013));
        sum += (value_noise2(x, y, s) * 2.0 - 1.0) * amp;
        norm += amp;
        x *= 2.0;
        y *= 2.0;
        amp *= 0.5;
    }
    (sum / norm) * 0.5 + 0.5
}

/// Ambient 0.6 plus a white directional light shining from (5, 10, 5).
const AMBIENT: f32 = 0.6;
const DIFFUSE: f32 = 0.8;

fn light_dir() -> [f32; 3] {
    let (x, y, z) = (5.0f32, 10.0f32, 5.0f32);
    let len = (x * x + y * y + z * z).sqrt();
    [x / len, y / len, z / len]
}

pub(crate) struct Terrain {
    pub(crate) w: u32,
    pub(crate) h: u32,
    /// Normalised heights sampled on the (w+1) x (h+1) integer lattice.
    heights: Vec<f32>,
    water_level: f32,
    height_scale: f32,
}

impl Terrain {
    pub(crate) fn generate(seed: u64, rules: &Rules) -> Self {
        let w = rules.world_w.max(2);
        let h = rules.world_h.max(2);
        let seed32 = (seed ^ (seed >> 32)) as u32;
        let mut heights = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        for z in 0..=h {
            for x in 0..=w {
                let n = fbm2(
                    x as f32 * rules.terrain_freq,
                    z as f32 * rules.terrain_freq,
                    seed32,
                    4,
                );
                heights.push(n.clamp(0.0, 1.0));
            }
        }
        Self {
            w,
            h,
            heights,
            water_level: rules.water_level,
            height_scale: rules.terrain_height,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_heights(w: u32, h: u32, heights: Vec<f32>, rules: &Rules) -> Self {
        assert_eq!(heights.len(), ((w + 1) * (h + 1)) as usize);
        Self {
            w,
            h,
            heights,
            water_level: rules.water_level,
            height_scale: rules.terrain_height,
        }
    }

    fn lattice(&self, x: u32, z: u32) -> f32 {
        let x = x.min(self.w);
        let z = z.min(self.h);
        self.heights[(z * (self.w + 1) + x) as usize]
    }

    pub(crate) fn in_bounds(&self, x: f32, z: f32) -> bool {
        x >= 0.0 && z >= 0.0 && x <= self.w as f32 && z <= self.h as f32
    }

    /// Bilinear normalised height in [0,1]; positions outside are clamped to the edge.
    pub(crate) fn height01(&self, x: f32, z: f32) -> f32 {
        let x = x.clamp(0.0, self.w as f32);
        let z = z.clamp(0.0, self.h as f32);
        let xi = (x.floor() as u32).min(self.w - 1);
        let zi = (z.floor() as u32).min(self.h - 1);
        let fx = x - xi as f32;
        let fz = z - zi as f32;
        let a = self.lattice(xi, zi);
        let b = self.lattice(xi + 1, zi);
        let c = self.lattice(xi, zi + 1);
        let d = self.lattice(xi + 1, zi + 1);
        let top = a + (b - a) * fx;
        let bottom = c + (d - c) * fx;
        top + (bottom - top) * fz
    }

    /// Ground elevation in world units. Water is flat at the water line.
    pub(crate) fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.height01(x, z).max(self.water_level) * self.height_scale
    }

    pub(crate) fn is_water(&self, x: f32, z: f32) -> bool {
        self.height01(x, z) < self.water_level
    }

    /// Light intensity at a point, ambient + lambert.
    pub(crate) fn shade(&self, x: f32, z: f32) -> f32 {
        let e = 0.5;
        let dx = (self.ground_height(x + e, z) - self.ground_height(x - e, z)) / (2.0 * e);
        let dz = (self.ground_height(x, z + e) - self.ground_height(x, z - e)) / (2.0 * e);
        let (nx, ny, nz) = (-dx, 1.0, -dz);
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        let l = light_dir();
        let lambert = ((nx * l[0] + ny * l[1] + nz * l[2]) / len).max(0.0);
        AMBIENT + DIFFUSE * lambert
    }

    pub(crate) fn water_level(&self) -> f32 {
        self.water_level
    }

    /// Nearest dry lattice point to (x, z), searched ring by ring.
    pub(crate) fn nearest_dry(&self, x: f32, z: f32) -> (f32, f32) {
        if !self.is_water(x, z) {
            return (x, z);
        }
        let max_r = self.w.max(self.h) as i32;
        let (cx, cz) = (x.round() as i32, z.round() as i32);
        for r in 1..=max_r {
            for dz in -r..=r {
                for dx in -r..=r {
                    if dx.abs() != r && dz.abs() != r {
                        continue;
                    }
                    let (px, pz) = ((cx + dx) as f32, (cz + dz) as f32);
                    if self.in_bounds(px, pz) && !self.is_water(px, pz) {
                        return (px, pz);
                    }
                }
            }
        }
        (x, z)
    }
}

/* -----------------------------
   Dog body
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Dog {
    pub(crate) x: f32,
    pub(crate) z: f32,
    /// Radians; 0 faces +z.
    pub(crate) heading: f32,
    pub(crate) gait: Option<Gait>,
    pub(crate) eating: bool,
}

impl Dog {
    pub(crate) fn forward(&self) -> (f32, f32) {
        (self.heading.sin(), self.heading.cos())
    }

    pub(crate) fn distance_to(&self, x: f32, z: f32) -> f32 {
        ((self.x - x).powi(2) + (self.z - z).powi(2)).sqrt()
    }
}

/* -----------------------------
   Apples
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Apple {
    pub(crate) x: f32,
    pub(crate) z: f32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct AppleField {
    pub(crate) apples: Vec<Apple>,
    pub(crate) collected: u32,
    pub(crate) total: u32,
    spawned: bool,
}

impl AppleField {
    pub(crate) fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub(crate) fn spawn(&mut self, terrain: &Terrain, rng: &mut StdRng, rules: &Rules) {
        self.apples.clear();
        self.collected = 0;
        self.total = rules.apple_count;
        self.spawned = true;

        let mut attempts = 0;
        while (self.apples.len() as u32) < self.total && attempts < rules.apple_spawn_attempts {
            attempts += 1;
            let x = rng.gen::<f32>() * terrain.w as f32;
            let z = rng.gen::<f32>() * terrain.h as f32;
            // no apples in the water or on the peaks
            let h = terrain.height01(x, z);
            if h < terrain.water_level() || h > 0.92 {
                continue;
            }
            self.apples.push(Apple { x, z });
        }
        debug!(spawned = self.apples.len(), attempts, "apples placed");
    }

    /// Removes every apple within `radius` of the dog and returns how many.
    pub(crate) fn collect_near(&mut self, dog: &Dog, radius: f32) -> u32 {
        let before = self.apples.len();
        self.apples.retain(|a| dog.distance_to(a.x, a.z) >= radius);
        let picked = (before - self.apples.len()) as u32;
        self.collected += picked;
        picked
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/* -----------------------------
   Splash particles
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SplashColor {
    Blue,
    White,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Splash {
    pub(crate) x: f32,
    pub(crate) z: f32,
    pub(crate) rise: f32,
    pub(crate) life: f32,
    pub(crate) color: SplashColor,
}

impl Splash {
    pub(crate) fn opacity(&self, lifetime: f32) -> f32 {
        (self.life / lifetime).clamp(0.0, 1.0) * 0.8
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Splashes {
    pub(crate) live: Vec<Splash>,
    cooldown: f32,
}

impl Splashes {
    pub(crate) fn update(
        &mut self,
        dt: f32,
        dog: &Dog,
        emit: bool,
        rng: &mut StdRng,
        rules: &Rules,
    ) {
        if emit && self.cooldown <= 0.0 {
            let scale = rules.world_scale;
            for i in 0..rules.splash_burst {
                if self.live.len() >= rules.max_splashes {
                    break;
                }
                let angle = rng.gen::<f32>() * TAU;
                let lo = rules.splash_scatter_min.min(rules.splash_scatter_max);
                let hi = rules.splash_scatter_min.max(rules.splash_scatter_max);
                let radius = rng.gen_range(lo..=hi);
                self.live.push(Splash {
                    x: dog.x + angle.cos() * radius * scale,
                    z: dog.z + angle.sin() * radius * scale,
                    rise: 0.0,
                    life: rules.splash_lifetime_secs,
                    color: if i % 2 == 0 {
                        SplashColor::Blue
                    } else {
                        SplashColor::White
                    },
                });
            }
            self.cooldown = rules.splash_cooldown_secs;
        }
        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }

        for s in &mut self.live {
            s.life -= dt;
            s.rise += dt * rules.splash_rise_rate * rules.world_scale;
        }
        self.live.retain(|s| s.life > 0.0);
    }
}

/* -----------------------------
   World: everything the dog can touch
------------------------------ */

pub(crate) struct World {
    pub(crate) terrain: Terrain,
    pub(crate) dog: Dog,
    pub(crate) apples: AppleField,
    pub(crate) splashes: Splashes,
    spawn: (f32, f32),
    rng: StdRng,
}

impl World {
    pub(crate) fn new(seed: u64, rules: &Rules) -> Self {
        Self::with_terrain(Terrain::generate(seed, rules), seed)
    }

    pub(crate) fn with_terrain(terrain: Terrain, seed: u64) -> Self {
        let spawn = terrain.nearest_dry(terrain.w as f32 / 2.0 + 1.0, terrain.h as f32 / 2.0 + 1.0);
        Self {
            terrain,
            dog: Dog {
                x: spawn.0,
                z: spawn.1,
                heading: std::f32::consts::PI,
                gait: None,
                eating: false,
            },
            apples: AppleField::default(),
            splashes: Splashes::default(),
            spawn,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Back to the start of a game: dog at the spawn point, no apples.
    pub(crate) fn reset(&mut self) {
        self.dog = Dog {
            x: self.spawn.0,
            z: self.spawn.1,
            heading: std::f32::consts::PI,
            gait: None,
            eating: false,
        };
        self.apples.clear();
        self.splashes = Splashes::default();
    }

    pub(crate) fn ensure_apples(&mut self, rules: &Rules) {
        if !self.apples.is_spawned() {
            self.apples.spawn(&self.terrain, &mut self.rng, rules);
        }
    }

    pub(crate) fn collect_apples(&mut self, rules: &Rules) -> u32 {
        let radius = rules.collection_radius * rules.world_scale;
        self.apples.collect_near(&self.dog, radius)
    }

    /// Moves the dog as the tick allowed. Returns true if it actually changed position.
    pub(crate) fn step_dog(&mut self, out: &TickOutcome, dt: f32, rules: &Rules) -> bool {
        self.dog.heading += out.turn * rules.turn_rate * dt;
        self.dog.gait = out.gait;
        self.dog.eating = out.eating;

        let Some(gait) = out.gait else {
            return false;
        };
        let step = gait.speed(rules) * dt;
        if step <= 0.0 {
            return false;
        }
        let (fx, fz) = self.dog.forward();
        let nx = self.dog.x + fx * step;
        let nz = self.dog.z + fz * step;
        if !self.terrain.in_bounds(nx, nz) {
            return false;
        }
        let rise = self.terrain.ground_height(nx, nz)
            - self.terrain.ground_height(self.dog.x, self.dog.z);
        if rise > rules.max_slope * step {
            return false;
        }
        self.dog.x = nx;
        self.dog.z = nz;
        true
    }

    pub(crate) fn update_splashes(&mut self, dt: f32, rules: &Rules) {
        let emit = self.dog.gait.is_some() && self.terrain.is_water(self.dog.x, self.dog.z);
        self.splashes.update(dt, &self.dog, emit, &mut self.rng, rules);
    }
}
