//! Built-in glyphs, rendered on demand into colorized SVG data URLs.

use super::error::ImageLoadError;
use super::image_cache::CacheKey;

const GLYPHS: &[(&str, &str)] = &[
	("user", "M12 12a4 4 0 1 0 0-8 4 4 0 0 0 0 8zM5 20a7 7 0 0 1 14 0"),
	("building", "M4 21V3h10v18M14 9h6v12M8 7h2M8 11h2M8 15h2"),
	(
		"globe",
		"M12 21a9 9 0 1 0 0-18 9 9 0 0 0 0 18zM3 12h18M12 3a14 14 0 0 1 0 18M12 3a14 14 0 0 0 0 18",
	),
	("mail", "M3 6h18v12H3zM3 6l9 7 9-7"),
	("phone", "M7 3h10v18H7zM11 18h2"),
	(
		"map-pin",
		"M12 21s-7-6.5-7-11a7 7 0 0 1 14 0c0 4.5-7 11-7 11zM12 12.5a2.5 2.5 0 1 0 0-5 2.5 2.5 0 0 0 0 5z",
	),
	("server", "M4 4h16v6H4zM4 14h16v6H4zM8 7h.01M8 17h.01"),
	("file", "M6 3h8l4 4v14H6zM14 3v4h4"),
	("circle", "M12 21a9 9 0 1 0 0-18 9 9 0 0 0 0 18z"),
];

const FLAG_PATH: &str = "M5 21V4M5 4h11l-2 4 2 4H5z";

pub fn glyph(name: &str) -> Option<&'static str> {
	GLYPHS
		.iter()
		.find(|(glyph, _)| *glyph == name)
		.map(|(_, path)| *path)
}

/// Glyph drawn for nodes of a type that carry no icon of their own.
pub fn glyph_for_type(node_type: &str) -> &'static str {
	match node_type.to_ascii_lowercase().as_str() {
		"person" | "username" | "account" => "user",
		"organization" | "company" => "building",
		"domain" | "website" | "url" => "globe",
		"email" => "mail",
		"phone" => "phone",
		"location" | "address" => "map-pin",
		"ip" | "ipaddress" | "server" => "server",
		"document" | "file" => "file",
		_ => "circle",
	}
}

/// `(stroke, fill)` of the badge for a flag tag.
pub fn flag_colors(tag: &str) -> (&'static str, &'static str) {
	match tag {
		"red" => ("#991b1b", "#ef4444"),
		"orange" => ("#9a3412", "#f97316"),
		"yellow" => ("#854d0e", "#eab308"),
		"green" => ("#166534", "#22c55e"),
		"blue" => ("#1e40af", "#3b82f6"),
		"purple" => ("#6b21a8", "#a855f7"),
		_ => ("#334155", "#94a3b8"),
	}
}

/// Resolves a cache key to something an `<img>` can load.
pub fn image_source(key: &CacheKey) -> Result<String, ImageLoadError> {
	match key {
		CacheKey::Image { url } => Ok(url.clone()),
		CacheKey::TypeIcon { node_type, color } => {
			let path = glyph(glyph_for_type(node_type)).unwrap_or_default();
			Ok(svg_data_url(&glyph_svg(path, svg_color(color)?)))
		}
		CacheKey::NamedIcon { icon, color } => {
			let path = glyph(icon).ok_or_else(|| ImageLoadError::UnknownIcon { name: icon.clone() })?;
			Ok(svg_data_url(&glyph_svg(path, svg_color(color)?)))
		}
		CacheKey::Flag { stroke, fill } => {
			let (stroke, fill) = (svg_color(stroke)?, svg_color(fill)?);
			Ok(svg_data_url(&format!(
				"<svg xmlns='http://www.w3.org/2000/svg' width='48' height='48' viewBox='0 0 24 24'>\
				<path d='{FLAG_PATH}' fill='{fill}' stroke='{stroke}' stroke-width='1.5' stroke-linejoin='round'/></svg>"
			)))
		}
	}
}

/// Colors end up inside quoted SVG attributes, so only the characters of
/// hex, named and functional CSS colors are accepted.
fn svg_color(color: &str) -> Result<&str, ImageLoadError> {
	let usable = !color.is_empty()
		&& color
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-'));
	if usable {
		Ok(color)
	} else {
		Err(ImageLoadError::InvalidColor {
			color: color.to_owned(),
		})
	}
}

fn glyph_svg(path: &str, color: &str) -> String {
	format!(
		"<svg xmlns='http://www.w3.org/2000/svg' width='96' height='96' viewBox='0 0 24 24' fill='none' \
		stroke='{color}' stroke-width='2' stroke-linecap='round' stroke-linejoin='round'><path d='{path}'/></svg>"
	)
}

fn svg_data_url(svg: &str) -> String {
	let mut url = String::from("data:image/svg+xml;charset=utf-8,");
	for c in svg.chars() {
		match c {
			'%' => url.push_str("%25"),
			'#' => url.push_str("%23"),
			'<' => url.push_str("%3C"),
			'>' => url.push_str("%3E"),
			'"' => url.push_str("%22"),
			_ => url.push(c),
		}
	}
	url
}
