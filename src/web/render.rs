use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::GameConfig;
use crate::error::ArcadeError;
use crate::game::{ColorClass, Phase, RenderItem};

const WORD_FONT: &str = "20px Arial";
const LEVEL_BACKGROUNDS: [&str; 5] = ["#f9f9f9", "#f0f4c3", "#ffe0b2", "#d1c4e9", "#b2ebf2"];

/// Backdrop colour for `level`, cycling through the palette.
pub(crate) fn level_background(level: u32) -> &'static str {
    let idx = (level.max(1) - 1) as usize % LEVEL_BACKGROUNDS.len();
    LEVEL_BACKGROUNDS[idx]
}

fn word_color(color: ColorClass) -> &'static str {
    match color {
        ColorClass::Matched => "green",
        ColorClass::Missed => "red",
        ColorClass::Pending => "#1976d2",
    }
}

/// The play-field canvas.
pub(crate) struct CanvasView {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasView {
    /// Reuses `#canvas_id` or appends a fresh canvas to the body.
    pub(crate) fn attach(canvas_id: &str, height: f64) -> Result<Self, ArcadeError> {
        let win = web_sys::window().ok_or_else(|| ArcadeError::dom("window", "no global window"))?;
        let doc = win
            .document()
            .ok_or_else(|| ArcadeError::dom("document", "window has no document"))?;

        let canvas: HtmlCanvasElement = match doc.get_element_by_id(canvas_id) {
            Some(el) => el
                .dyn_into()
                .map_err(|_| ArcadeError::dom("canvas", format!("#{canvas_id} is not a canvas")))?,
            None => {
                let c: HtmlCanvasElement = doc
                    .create_element("canvas")
                    .map_err(|e| ArcadeError::js("createElement", e))?
                    .dyn_into()
                    .map_err(|_| ArcadeError::dom("canvas", "created element is not a canvas"))?;
                c.set_id(canvas_id);
                let body = doc
                    .body()
                    .ok_or_else(|| ArcadeError::dom("body", "document has no body"))?;
                body.append_child(&c)
                    .map_err(|e| ArcadeError::js("appendChild", e))?;
                c
            }
        };

        canvas.set_height(height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| ArcadeError::js("getContext", e))?
            .ok_or_else(|| ArcadeError::dom("canvas", "2d context unavailable"))?
            .dyn_into()
            .map_err(|_| ArcadeError::dom("canvas", "context is not 2d"))?;

        let view = Self { canvas, ctx };
        view.fit_to_window();
        Ok(view)
    }

    /// Stretches the canvas to 90% of the window width; returns the new width.
    pub(crate) fn fit_to_window(&self) -> f64 {
        let width = web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|w| w.as_f64())
            .map(|w| w * 0.9)
            .unwrap_or(GameConfig::DEFAULT_FIELD_WIDTH);
        self.canvas.set_width(width as u32);
        self.width()
    }

    pub(crate) fn width(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn height(&self) -> f64 {
        self.canvas.height() as f64
    }

    pub(crate) fn draw(&self, phase: Phase, level: u32, items: &[RenderItem]) {
        let (w, h) = (self.width(), self.height());
        self.ctx.set_fill_style_str(level_background(level));
        self.ctx.fill_rect(0.0, 0.0, w, h);

        self.ctx.set_font(WORD_FONT);
        self.ctx.set_text_align("left");
        for item in items {
            self.ctx.set_fill_style_str(word_color(item.color));
            self.fill_text(&item.text, item.x, item.y);
        }

        if phase == Phase::GameOver {
            self.draw_game_over(w, h);
        }
    }

    fn draw_game_over(&self, w: f64, h: f64) {
        self.ctx.set_fill_style_str("rgba(0,0,0,0.55)");
        self.ctx.fill_rect(0.0, 0.0, w, h);
        self.ctx.set_fill_style_str("#ffffff");
        self.ctx.set_stroke_style_str("#000000");
        self.ctx.set_line_width(6.0);
        self.ctx.set_font("72px Arial");
        self.ctx.set_text_align("center");
        let (cx, cy) = (w / 2.0, h / 2.0);
        if let Err(e) = self.ctx.stroke_text("GAME OVER", cx, cy) {
            log::warn!("{}", ArcadeError::js("strokeText", e));
        }
        self.fill_text("GAME OVER", cx, cy);
        self.ctx.set_font(WORD_FONT);
        self.fill_text("Press Start Game to play again", cx, cy + 44.0);
    }

    fn fill_text(&self, text: &str, x: f64, y: f64) {
        if let Err(e) = self.ctx.fill_text(text, x, y) {
            log::warn!("{}", ArcadeError::js("fillText", e));
        }
    }
}
