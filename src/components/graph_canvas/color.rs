/// Opacity of nodes and labels outside an active highlight.
pub const DIM_ALPHA: f64 = 0.2;

/// Returns `color` at the given opacity. `#rgb`, `#rrggbb` and `rgb(...)`
/// inputs are rewritten as `rgba(...)`; anything else is returned unchanged.
pub fn with_alpha(color: &str, alpha: f64) -> String {
	let alpha = alpha.clamp(0.0, 1.0);
	match parse_rgb(color) {
		Some((r, g, b)) => format!("rgba({r}, {g}, {b}, {alpha})"),
		None => color.to_owned(),
	}
}

fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
	let color = color.trim();
	if let Some(hex) = color.strip_prefix('#') {
		if !hex.is_ascii() {
			return None;
		}
		let channel = |s: &str| u8::from_str_radix(s, 16).ok();
		return match hex.len() {
			3 => {
				let mut chars = hex.chars().map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
				Some((chars.next()??, chars.next()??, chars.next()??))
			}
			6 | 8 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
			_ => None,
		};
	}

	let inner = color
		.strip_prefix("rgba(")
		.or_else(|| color.strip_prefix("rgb("))?
		.strip_suffix(')')?;
	let mut parts = inner.split(',').map(|part| part.trim().parse::<u8>().ok());
	Some((parts.next()??, parts.next()??, parts.next()??))
}
