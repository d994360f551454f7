use thiserror::Error;

use super::image_cache::CacheKey;

/// A 2D context call rejected by the host.
#[derive(Clone, Debug, Error)]
#[error("canvas call failed: {0}")]
pub struct CanvasError(pub String);

impl From<wasm_bindgen::JsValue> for CanvasError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

#[derive(Clone, Debug, Error)]
pub enum ImageLoadError {
	#[error("image for {key} failed to load")]
	Failed { key: CacheKey },
	#[error("load of {key} was dropped before it settled")]
	Canceled { key: CacheKey },
	#[error("no glyph named {name:?}")]
	UnknownIcon { name: String },
	#[error("{color:?} is not a usable icon color")]
	InvalidColor { color: String },
}

#[derive(Debug, Error)]
pub enum DrawError {
	#[error(transparent)]
	Canvas(#[from] CanvasError),
	#[error("edge {id} has an endpoint that is not materialized")]
	DanglingEdge { id: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid settings json: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("setting {field} is invalid: {reason}")]
	Invalid { field: &'static str, reason: String },
}
