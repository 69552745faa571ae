use crate::config::Settings;
use crate::model::{Activity, Gait, Message, Overlay, PetState, Phase};
use crate::world::{Dog, SplashColor, Terrain, World};
use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell {
            bg,
            ..Cell::default()
        });
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn clear(&mut self) {
        self.px.fill(Pixel::default());
    }
    fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }
    fn disc(&mut self, cx: i32, cy: i32, radius: i32, p: Pixel) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.blend_over(cx + x, cy + y, p);
                }
            }
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
    /// The terminal reports key releases, so held keys need no timeout.
    pub(crate) release_events: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        // Braille: 2×4 pixels per cell
        let canvas = PixelCanvas::new(cols as u32 * 2, rows as u32 * 4);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
            canvas,
            release_events,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        if self.release_events {
            queue!(self.out, PopKeyboardEnhancementFlags)?;
        }
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        Ok(true)
    }

    pub(crate) fn bell(&mut self) -> anyhow::Result<()> {
        queue!(self.out, Print('\x07'))?;
        Ok(())
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

/// Inks braille dots over the cells that have any; empty cells keep what the
/// terrain pass put there, background included.
pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool) {
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];

                    // threshold: treat alpha as ink
                    if p.a >= 32 {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink_count += 1;
                    }
                }
            }
            if mask == 0 {
                continue;
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');
            let fg = if enable_color {
                Color::Rgb {
                    r: (sum_r / ink_count) as u8,
                    g: (sum_g / ink_count) as u8,
                    b: (sum_b / ink_count) as u8,
                }
            } else {
                Color::White
            };
            let bg = out
                .get(cx as u16, cy as u16)
                .map_or(Color::Black, |c| c.bg);
            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

/* -----------------------------
   Camera: world units -> cells / subpixels
------------------------------ */

/// One world unit is one column wide; a row is two units tall.
const UNITS_PER_ROW: f32 = 2.0;
const SUBPX_PER_UNIT: f32 = 2.0;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewport {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) w: u16,
    pub(crate) h: u16,
}

/// North-up view: screen up is +z.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Camera {
    vp: Viewport,
    left: f32,
    top: f32,
}

impl Camera {
    pub(crate) fn follow(dog: &Dog, terrain: &Terrain, vp: Viewport) -> Self {
        let view_w = vp.w as f32;
        let view_h = vp.h as f32 * UNITS_PER_ROW;
        let world_w = terrain.w as f32;
        let world_h = terrain.h as f32;

        let left = if world_w >= view_w {
            (dog.x - view_w / 2.0).clamp(0.0, world_w - view_w)
        } else {
            (world_w - view_w) / 2.0
        };
        let top = if world_h >= view_h {
            (dog.z + view_h / 2.0).clamp(view_h, world_h)
        } else {
            (world_h + view_h) / 2.0
        };
        Self { vp, left, top }
    }

    /// World position at the centre of a viewport cell.
    pub(crate) fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        let x = self.left + (col - self.vp.x) as f32 + 0.5;
        let z = self.top - ((row - self.vp.y) as f32 + 0.5) * UNITS_PER_ROW;
        (x, z)
    }

    pub(crate) fn to_subpx(&self, x: f32, z: f32) -> (i32, i32) {
        let sx = (self.vp.x as f32 * 2.0 + (x - self.left) * SUBPX_PER_UNIT).floor() as i32;
        let sy = (self.vp.y as f32 * 4.0 + (self.top - z) * SUBPX_PER_UNIT).floor() as i32;
        (sx, sy)
    }

    /// Cell under a world position, if it is inside the viewport.
    pub(crate) fn to_cell(&self, x: f32, z: f32) -> Option<(u16, u16)> {
        let col = (x - self.left).floor();
        let row = ((self.top - z) / UNITS_PER_ROW).floor();
        if col < 0.0 || row < 0.0 || col >= self.vp.w as f32 || row >= self.vp.h as f32 {
            return None;
        }
        Some((self.vp.x + col as u16, self.vp.y + row as u16))
    }
}

/* -----------------------------
   Terrain pass
------------------------------ */

fn scale_rgb(rgb: (f32, f32, f32), k: f32) -> Color {
    let c = |v: f32| (v * k).clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: c(rgb.0),
        g: c(rgb.1),
        b: c(rgb.2),
    }
}

fn terrain_cell(terrain: &Terrain, x: f32, z: f32, enable_color: bool) -> Cell {
    if !terrain.in_bounds(x, z) {
        return Cell::default();
    }
    let h = terrain.height01(x, z);
    let water = terrain.is_water(x, z);

    if !enable_color {
        let ch = if water {
            '~'
        } else if h < 0.5 {
            '.'
        } else if h < 0.65 {
            ','
        } else if h < 0.85 {
            ':'
        } else {
            '^'
        };
        return Cell { ch, ..Cell::default() };
    }

    let shade = terrain.shade(x, z);
    let base = if water {
        let depth = ((terrain.water_level() - h) / terrain.water_level().max(1e-3)).clamp(0.0, 1.0);
        (50.0 - 30.0 * depth, 120.0 - 50.0 * depth, 210.0 - 40.0 * depth)
    } else if h < 0.5 {
        (80.0, 140.0, 55.0)
    } else if h < 0.65 {
        (165.0, 115.0, 45.0)
    } else if h < 0.85 {
        (125.0, 85.0, 50.0)
    } else {
        (150.0, 145.0, 140.0)
    };
    Cell {
        ch: ' ',
        fg: Color::White,
        bg: scale_rgb(base, shade),
    }
}

fn draw_terrain(buf: &mut CellBuffer, cam: &Camera, terrain: &Terrain, enable_color: bool) {
    for row in cam.vp.y..cam.vp.y + cam.vp.h {
        for col in cam.vp.x..cam.vp.x + cam.vp.w {
            let (x, z) = cam.cell_center(col, row);
            buf.set(col, row, terrain_cell(terrain, x, z, enable_color));
        }
    }
}

/* -----------------------------
   Sprites
------------------------------ */

const APPLE: Pixel = Pixel {
    r: 220,
    g: 30,
    b: 30,
    a: 255,
};

/// What the sprite shows: the gait the dog is actually using, else the pet's state.
fn pose(world: &World, pet: &PetState) -> Activity {
    match world.dog.gait {
        Some(g) => g.activity(),
        None if world.dog.eating => Activity::Eating,
        None => pet.activity,
    }
}

fn dog_colors(activity: Activity) -> (Pixel, Pixel) {
    let (body, head) = match activity {
        Activity::Sleeping => ((110, 95, 85), (90, 75, 70)),
        Activity::Eating => ((185, 125, 65), (235, 200, 120)),
        _ => ((175, 115, 60), (120, 75, 35)),
    };
    let px = |(r, g, b): (u8, u8, u8)| Pixel { r, g, b, a: 255 };
    (px(body), px(head))
}

pub(crate) fn draw_sprites_braille(
    canvas: &mut PixelCanvas,
    cam: &Camera,
    world: &World,
    pet: &PetState,
    lifetime: f32,
) {
    for a in &world.apples.apples {
        let (x, y) = cam.to_subpx(a.x, a.z);
        canvas.disc(x, y, 1, APPLE);
    }

    for s in &world.splashes.live {
        let (x, y) = cam.to_subpx(s.x, s.z);
        let (r, g, b) = match s.color {
            SplashColor::Blue => (51, 153, 255),
            SplashColor::White => (255, 255, 255),
        };
        let a = (s.opacity(lifetime) * 255.0) as u8;
        let lift = (s.rise * SUBPX_PER_UNIT) as i32;
        canvas.blend_over(x, y - lift, Pixel { r, g, b, a });
    }

    let dog = &world.dog;
    let (body, head) = dog_colors(pose(world, pet));
    let (fx, fz) = dog.forward();
    let (bx, by) = cam.to_subpx(dog.x, dog.z);
    let (hx, hy) = cam.to_subpx(dog.x + fx * 1.6, dog.z + fz * 1.6);
    let (tx, ty) = cam.to_subpx(dog.x - fx * 1.8, dog.z - fz * 1.8);
    // jumping dogs leave the ground for a moment
    let hop = if dog.gait == Some(Gait::Jump) { 2 } else { 0 };
    canvas.disc(bx, by - hop, 2, body);
    canvas.disc(hx, hy - hop, 1, head);
    canvas.blend_over(tx, ty - hop, body);
}

pub(crate) fn draw_sprites_ascii(
    buf: &mut CellBuffer,
    cam: &Camera,
    world: &World,
    pet: &PetState,
    enable_color: bool,
) {
    let mut put = |x: f32, z: f32, ch: char, fg: Color| {
        if let Some((col, row)) = cam.to_cell(x, z) {
            let bg = buf.get(col, row).map_or(Color::Black, |c| c.bg);
            let fg = if enable_color { fg } else { Color::White };
            buf.set(col, row, Cell { ch, fg, bg });
        }
    };

    for a in &world.apples.apples {
        put(a.x, a.z, 'o', Color::Red);
    }
    for s in &world.splashes.live {
        let ch = match s.color {
            SplashColor::Blue => '~',
            SplashColor::White => '*',
        };
        put(s.x, s.z + s.rise, ch, Color::Cyan);
    }
    let dog = &world.dog;
    let ch = match pose(world, pet) {
        Activity::Sleeping => 'z',
        Activity::Eating => '&',
        Activity::Run => '>',
        Activity::Jump => '^',
        _ => '@',
    };
    put(dog.x, dog.z, ch, Color::Yellow);
}

/* -----------------------------
   UI overlay (text + meters)
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn food_color(pct: f32) -> Color {
    if pct > 60.0 {
        Color::Green
    } else if pct > 30.0 {
        Color::DarkYellow
    } else {
        Color::Red
    }
}

/// Everything a frame needs to know, borrowed from the app.
pub(crate) struct Frame<'a> {
    pub(crate) pet: &'a PetState,
    pub(crate) phase: Phase,
    pub(crate) message: Option<Message>,
    pub(crate) world: &'a World,
    pub(crate) settings: &'a Settings,
    pub(crate) overlay: Overlay,
    pub(crate) settings_cursor: usize,
    pub(crate) bubble: Option<&'a str>,
    pub(crate) splash_lifetime: f32,
}

pub(crate) fn panel_width(cols: u16) -> u16 {
    (cols / 3).max(30).min(cols.saturating_sub(10))
}

pub(crate) fn draw_world(term: &mut Terminal, frame: &Frame<'_>) {
    let cols = term.cols;
    let rows = term.rows;
    let panel_w = panel_width(cols);
    let vp = Viewport {
        x: panel_w,
        y: 0,
        w: cols.saturating_sub(panel_w),
        h: rows.saturating_sub(1),
    };
    if vp.w == 0 || vp.h == 0 {
        return;
    }
    let world = frame.world;
    let cam = Camera::follow(&world.dog, &world.terrain, vp);
    let color = frame.settings.enable_color;

    draw_terrain(&mut term.cur, &cam, &world.terrain, color);
    if frame.settings.enable_braille {
        term.canvas.clear();
        draw_sprites_braille(&mut term.canvas, &cam, world, frame.pet, frame.splash_lifetime);
        canvas_to_cells(&term.canvas, &mut term.cur, color);
    } else {
        draw_sprites_ascii(&mut term.cur, &cam, world, frame.pet, color);
    }

    // text above the dog
    if let Some((col, row)) = cam.to_cell(world.dog.x, world.dog.z) {
        let mut above = row;
        if frame.pet.is_sleeping() && above >= 2 {
            above -= 2;
            draw_text(&mut term.cur, col, above, "z Z", Color::White, Color::Black);
        }
        if let Some(text) = frame.bubble {
            if above >= 1 {
                let x = col.saturating_sub(text.chars().count() as u16 / 2).max(vp.x);
                draw_text(&mut term.cur, x, above - 1, text, Color::Black, Color::White);
            }
        }
    }

    if let (Some(msg), Phase::Running) = (frame.message, frame.phase) {
        let text = msg.to_string();
        let x = vp.x + vp.w.saturating_sub(text.chars().count() as u16) / 2;
        let y = vp.y + vp.h / 4;
        draw_text(&mut term.cur, x, y, &text, Color::White, Color::DarkRed);
    }
}

pub(crate) fn ui_overlay(buf: &mut CellBuffer, frame: &Frame<'_>) {
    let bg = Color::Black;
    let fg = Color::White;
    let color = frame.settings.enable_color;
    let panel_w = panel_width(buf.w);
    for y in 0..buf.h.saturating_sub(1) {
        for x in 0..panel_w {
            buf.set(x, y, Cell::default());
        }
    }

    let phase = match frame.phase {
        Phase::NotStarted => "not started",
        Phase::Running => "running",
        Phase::Over => "over",
        Phase::Quit => "quit",
    };
    draw_text(buf, 1, 0, &format!("Dogpark  |  {phase}"), fg, bg);

    let pet = frame.pet;
    let food_pct = pet.food / pet.max_food * 100.0;
    let lines = [
        ("Health", pet.health, if color { Color::Green } else { fg }),
        ("Hunger", pet.hunger, if color { Color::DarkYellow } else { fg }),
        ("Mood  ", pet.mood, if color { Color::Blue } else { fg }),
        ("Food  ", food_pct, if color { food_color(food_pct) } else { fg }),
    ];
    for (i, (name, val, col)) in lines.iter().enumerate() {
        let s = format!("{name} {} {:>5.1}", bar(*val / 100.0, 12), val);
        draw_text(buf, 1, 2 + i as u16, &s, *col, bg);
    }

    let doing = format!("Doing:  {:?}", pet.activity);
    draw_text(buf, 1, 7, &doing, fg, bg);
    let apples = &frame.world.apples;
    let counter = format!("Apples: {} / {}", apples.collected, apples.total);
    draw_text(buf, 1, 8, &counter, fg, bg);

    let help = match (frame.overlay, frame.phase) {
        (Overlay::Settings, _) => "Settings: ↑↓ select | enter toggle | esc/tab back",
        (Overlay::Help, _) => "Help: esc or h to close",
        (Overlay::None, Phase::NotStarted) => "enter start | h help | tab settings | q/esc exit",
        (Overlay::None, Phase::Running) => {
            "w walk | r run | j jump | e eat | n/m turn | s sleep | p pet | q quit | h help"
        }
        (Overlay::None, Phase::Over | Phase::Quit) => "enter restart | q/esc exit",
    };
    draw_text(buf, 1, buf.h.saturating_sub(1), help, fg, bg);

    if frame.overlay == Overlay::Settings {
        draw_settings(buf, frame.settings, frame.settings_cursor);
    }
}

/* -----------------------------
   Settings UI
------------------------------ */

pub(crate) const SETTINGS_ROWS: usize = 3;

pub(crate) fn draw_settings(buf: &mut CellBuffer, settings: &Settings, selected: usize) {
    let bg = Color::Black;
    let fg = Color::White;
    let hi = Color::Yellow;

    let start_x = 1;
    let start_y = 11;
    draw_text(buf, start_x, start_y, "Settings", fg, bg);

    let on_off = |b: bool| if b { "on" } else { "off" };
    let entries = [
        format!(
            "Render: {}",
            if settings.enable_braille { "Braille" } else { "ASCII" }
        ),
        format!("Colour: {}", on_off(settings.enable_color)),
        format!("Bell:   {}", on_off(settings.enable_bell)),
    ];
    for (i, entry) in entries.iter().enumerate() {
        let marker = if i == selected { ">" } else { " " };
        draw_text(
            buf,
            start_x,
            start_y + 2 + i as u16,
            &format!("{marker} {entry}"),
            if i == selected { hi } else { fg },
            bg,
        );
    }
}
