//! The slice of the 2D context API the renderers draw with.

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::error::CanvasError;

pub trait Canvas2d {
	type Image;

	fn image_size(image: &Self::Image) -> (f64, f64);

	fn save(&self);
	fn restore(&self);
	fn set_transform(&self, matrix: [f64; 6]) -> Result<(), CanvasError>;
	fn translate(&self, x: f64, y: f64) -> Result<(), CanvasError>;
	fn rotate(&self, angle: f64) -> Result<(), CanvasError>;

	fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);
	fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
	fn begin_path(&self);
	fn close_path(&self);
	fn move_to(&self, x: f64, y: f64);
	fn line_to(&self, x: f64, y: f64);
	fn quadratic_curve_to(&self, cx: f64, cy: f64, x: f64, y: f64);
	fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), CanvasError>;
	fn rect(&self, x: f64, y: f64, w: f64, h: f64);
	fn fill(&self);
	fn stroke(&self);
	fn clip(&self);

	fn set_fill_style(&self, style: &str);
	fn set_stroke_style(&self, style: &str);
	fn set_line_width(&self, width: f64);
	fn set_global_alpha(&self, alpha: f64);
	fn set_font(&self, font: &str);
	fn set_text_align(&self, align: &str);
	fn set_text_baseline(&self, baseline: &str);
	fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), CanvasError>;
	fn measure_text(&self, text: &str) -> Result<f64, CanvasError>;

	fn draw_image(
		&self,
		image: &Self::Image,
		dx: f64,
		dy: f64,
		dw: f64,
		dh: f64,
	) -> Result<(), CanvasError>;
	/// Draws the `source` rectangle of the image into `dest` (both `[x, y, w, h]`).
	fn draw_image_region(
		&self,
		image: &Self::Image,
		source: [f64; 4],
		dest: [f64; 4],
	) -> Result<(), CanvasError>;
}

impl Canvas2d for CanvasRenderingContext2d {
	type Image = HtmlImageElement;

	fn image_size(image: &HtmlImageElement) -> (f64, f64) {
		(image.natural_width() as f64, image.natural_height() as f64)
	}

	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn set_transform(&self, [a, b, c, d, e, f]: [f64; 6]) -> Result<(), CanvasError> {
		Ok(CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f)?)
	}

	fn translate(&self, x: f64, y: f64) -> Result<(), CanvasError> {
		Ok(CanvasRenderingContext2d::translate(self, x, y)?)
	}

	fn rotate(&self, angle: f64) -> Result<(), CanvasError> {
		Ok(CanvasRenderingContext2d::rotate(self, angle)?)
	}

	fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
	}

	fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn close_path(&self) {
		CanvasRenderingContext2d::close_path(self);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn quadratic_curve_to(&self, cx: f64, cy: f64, x: f64, y: f64) {
		CanvasRenderingContext2d::quadratic_curve_to(self, cx, cy, x, y);
	}

	fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), CanvasError> {
		Ok(CanvasRenderingContext2d::arc(self, x, y, radius, start, end)?)
	}

	fn rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::rect(self, x, y, w, h);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn clip(&self) {
		CanvasRenderingContext2d::clip(self);
	}

	fn set_fill_style(&self, style: &str) {
		self.set_fill_style_str(style);
	}

	fn set_stroke_style(&self, style: &str) {
		self.set_stroke_style_str(style);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_global_alpha(&self, alpha: f64) {
		CanvasRenderingContext2d::set_global_alpha(self, alpha);
	}

	fn set_font(&self, font: &str) {
		CanvasRenderingContext2d::set_font(self, font);
	}

	fn set_text_align(&self, align: &str) {
		CanvasRenderingContext2d::set_text_align(self, align);
	}

	fn set_text_baseline(&self, baseline: &str) {
		CanvasRenderingContext2d::set_text_baseline(self, baseline);
	}

	fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), CanvasError> {
		Ok(CanvasRenderingContext2d::fill_text(self, text, x, y)?)
	}

	fn measure_text(&self, text: &str) -> Result<f64, CanvasError> {
		Ok(CanvasRenderingContext2d::measure_text(self, text)?.width())
	}

	fn draw_image(
		&self,
		image: &HtmlImageElement,
		dx: f64,
		dy: f64,
		dw: f64,
		dh: f64,
	) -> Result<(), CanvasError> {
		Ok(self.draw_image_with_html_image_element_and_dw_and_dh(image, dx, dy, dw, dh)?)
	}

	fn draw_image_region(
		&self,
		image: &HtmlImageElement,
		[sx, sy, sw, sh]: [f64; 4],
		[dx, dy, dw, dh]: [f64; 4],
	) -> Result<(), CanvasError> {
		Ok(self
			.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
				image, sx, sy, sw, sh, dx, dy, dw, dh,
			)?)
	}
}
