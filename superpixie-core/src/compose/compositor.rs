//! Frame compositor
//!
//! Layers, in order:
//! 1. background gradient
//! 2. character mask through the display gradient (additive)
//! 3. blurred fx copy of the character mask (additive)
//! 4. backlight pixel
//! 5. ripple (additive)
//! 6. touch desaturation, dimming and glow
//! 7. global brightness with the boot fade-in
//! 8. decay-only frame blending
//! 9. debug overlay
//!
//! The physical strip is wired in three 35-LED bands of five rows each,
//! every band running in columns from right to left. The backlight LED
//! sits at the end of the strip.

use smart_leds::RGB8;

use crate::chain::ChainConfig;
use crate::color::ColorF;
use crate::raster::{decode, rasterize, LineMemory, Mask, Transform, LEDS_X, LEDS_Y};
use crate::render::RenderMachine;
use crate::state::CharacterState;

use super::ripple::RippleLayer;
use super::{gradient, overlay, touch};

/// Matrix LEDs plus the backlight
pub const NUM_LEDS: usize = LEDS_X * LEDS_Y + 1;

/// Strip position of the backlight LED
pub const BACKLIGHT_INDEX: usize = NUM_LEDS - 1;

/// Boot fade-in step per frame
pub const FADE_IN_STEP: f32 = 0.01;

/// Rows per wiring band
const BAND_ROWS: usize = 5;

/// Output buffer handed to the LED sink
pub type Frame = [RGB8; NUM_LEDS];

/// Strip index of matrix pixel (x, y)
pub const fn led_index(x: usize, y: usize) -> usize {
    (y / BAND_ROWS) * (BAND_ROWS * LEDS_X) + (LEDS_X - 1 - x) * BAND_ROWS + y % BAND_ROWS
}

/// Render parameters that do not take part in transitions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderSettings {
    /// Weight of the previous frame when a pixel gets darker
    pub frame_blending: f32,
    pub fx_color: ColorF,
    pub fx_opacity: f32,
    /// Blur kernel size of the fx layer, 0.0..=10.0
    pub fx_blur: f32,
    pub character_scale: f32,
    pub master_opacity: f32,
    pub debug_overlay_opacity: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_blending: 0.0,
            fx_color: ColorF::BLACK,
            fx_opacity: 0.0,
            fx_blur: 0.0,
            character_scale: 1.0,
            master_opacity: 1.0,
            debug_overlay_opacity: 0.0,
        }
    }
}

/// Everything a frame is composed from
pub struct FrameInputs<'a> {
    pub machine: &'a RenderMachine,
    pub settings: &'a RenderSettings,
    pub ripple: &'a RippleLayer,
    pub touch_strength: f32,
    pub chain: &'a ChainConfig,
    pub terminating: bool,
}

/// Decoded strokes, kept until the glyph changes
#[derive(Debug, Clone)]
struct GlyphCache {
    glyph: Option<u8>,
    lines: LineMemory,
}

impl GlyphCache {
    const fn new() -> Self {
        Self {
            glyph: None,
            lines: LineMemory::new(),
        }
    }

    fn lines(&mut self, glyph: u8) -> &LineMemory {
        if self.glyph != Some(glyph) {
            self.lines = decode(glyph);
            self.glyph = Some(glyph);
        }
        &self.lines
    }
}

pub struct Compositor {
    outgoing: GlyphCache,
    incoming: GlyphCache,
    character_mask: Mask,
    fx_mask: Mask,
    slot_mask: Mask,
    scratch: Mask,
    past: [ColorF; NUM_LEDS],
    fade_in: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub const fn new() -> Self {
        Self {
            outgoing: GlyphCache::new(),
            incoming: GlyphCache::new(),
            character_mask: Mask::new(),
            fx_mask: Mask::new(),
            slot_mask: Mask::new(),
            scratch: Mask::new(),
            past: [ColorF::BLACK; NUM_LEDS],
            fade_in: 0.0,
        }
    }

    /// Current boot fade-in factor
    pub fn fade_in(&self) -> f32 {
        self.fade_in
    }

    /// Character mask of the last rasterized frame
    pub fn character_mask(&self) -> &Mask {
        &self.character_mask
    }

    /// Compose one frame into `out`
    pub fn compose(&mut self, inputs: &FrameInputs<'_>, now_ms: u64, out: &mut Frame) {
        let settings = inputs.settings;

        self.rasterize_characters(inputs.machine, settings);

        self.fade_in = (self.fade_in + FADE_IN_STEP).min(1.0);

        let live = inputs.machine.live_system();
        let global = live.brightness * self.fade_in;
        let fx_active = settings.fx_opacity > 0.0;

        for y in 0..LEDS_Y {
            for x in 0..LEDS_X {
                let mut color = gradient::color_at(
                    live.background_gradient_type,
                    live.background_color_a,
                    live.background_color_b,
                    x,
                    y,
                    1.0,
                );

                let m = self.character_mask.get(x, y);
                let brightness = m * m;
                let glyph = gradient::color_at(
                    live.gradient_type,
                    live.display_color_a,
                    live.display_color_b,
                    x,
                    y,
                    brightness,
                );
                color = color.add_clipped(glyph.scale(brightness));

                if fx_active {
                    let f = self.fx_mask.get(x, y);
                    color = color.add_clipped(settings.fx_color.scale(f * f * settings.fx_opacity));
                }

                color = color.add_clipped(inputs.ripple.sample(x, y, now_ms));
                color = touch::apply(
                    color,
                    x,
                    y,
                    inputs.touch_strength,
                    live.touch_glow_position,
                    live.touch_color,
                );
                color = color.scale(global);

                let index = led_index(x, y);
                color = blend_decay(self.past[index], color, settings.frame_blending);
                self.past[index] = color;

                color = overlay::apply(
                    color,
                    x,
                    y,
                    inputs.chain,
                    inputs.terminating,
                    settings.debug_overlay_opacity,
                );
                out[index] = color.to_rgb8();
            }
        }

        out[BACKLIGHT_INDEX] = live
            .backlight_color
            .scale(live.backlight_brightness * global)
            .to_rgb8();
    }

    fn rasterize_characters(&mut self, machine: &RenderMachine, settings: &RenderSettings) {
        let (outgoing, incoming) = machine.live_characters();

        draw_character(
            &mut self.outgoing,
            outgoing,
            settings,
            &mut self.scratch,
            &mut self.character_mask,
        );
        if let Some(incoming) = incoming {
            draw_character(
                &mut self.incoming,
                incoming,
                settings,
                &mut self.scratch,
                &mut self.slot_mask,
            );
            self.character_mask.max_merge(&self.slot_mask);
        }

        self.fx_mask = self.character_mask;
        if settings.fx_opacity > 0.0 {
            self.fx_mask.blur(libm::roundf(settings.fx_blur.clamp(0.0, 10.0)) as u8);
        }
    }
}

fn draw_character(
    cache: &mut GlyphCache,
    character: &CharacterState,
    settings: &RenderSettings,
    scratch: &mut Mask,
    out: &mut Mask,
) {
    let transform = Transform::for_character(character, settings.character_scale, settings.master_opacity);
    rasterize(cache.lines(character.glyph), &transform, scratch, out);
}

/// Frame blending that only ever slows down darkening
fn blend_decay(past: ColorF, new: ColorF, blend: f32) -> ColorF {
    if blend <= 0.0 {
        return new;
    }
    let channel = |p: f32, n: f32| if n >= p { n } else { p * blend + n * (1.0 - blend) };
    ColorF::new(
        channel(past.r, new.r),
        channel(past.g, new.g),
        channel(past.b, new.b),
    )
}
