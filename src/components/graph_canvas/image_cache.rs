//! Load-once image cache shared by every renderer of a canvas.
//!
//! Each key resolves through exactly one load, however many callers ask for
//! it while the load is in flight: they all receive clones of the same
//! [`Shared`] future. Resolved handles stay cached until a `clear*` call.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlImageElement;

use super::error::ImageLoadError;
use super::icons;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
	TypeIcon { node_type: String, color: String },
	NamedIcon { icon: String, color: String },
	Image { url: String },
	Flag { stroke: String, fill: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
	TypeIcon,
	NamedIcon,
	Image,
	Flag,
}

impl CacheKey {
	pub fn namespace(&self) -> CacheNamespace {
		match self {
			CacheKey::TypeIcon { .. } => CacheNamespace::TypeIcon,
			CacheKey::NamedIcon { .. } => CacheNamespace::NamedIcon,
			CacheKey::Image { .. } => CacheNamespace::Image,
			CacheKey::Flag { .. } => CacheNamespace::Flag,
		}
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CacheKey::TypeIcon { node_type, color } => write!(f, "type:{node_type}+{color}"),
			CacheKey::NamedIcon { icon, color } => write!(f, "icon:{icon}+{color}"),
			CacheKey::Image { url } => write!(f, "image:{url}"),
			CacheKey::Flag { stroke, fill } => write!(f, "flag:{stroke}+{fill}"),
		}
	}
}

pub type ImageResult<I> = Result<I, ImageLoadError>;
pub type SharedImageFuture<I> = Shared<LocalBoxFuture<'static, ImageResult<I>>>;
/// Runs detached futures; `wasm_bindgen_futures::spawn_local` in the browser.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

pub trait ImageLoader {
	type Image: Clone + 'static;

	fn load(&self, key: &CacheKey) -> LocalBoxFuture<'static, ImageResult<Self::Image>>;
}

enum Entry<I> {
	Ready(I),
	Loading { id: u64, future: SharedImageFuture<I> },
}

struct CacheInner<I> {
	entries: HashMap<CacheKey, Entry<I>>,
	failed: HashSet<CacheKey>,
	next_id: u64,
}

impl<I: Clone> CacheInner<I> {
	fn settle(&mut self, key: &CacheKey, id: u64, result: &ImageResult<I>) {
		// Only the load that is still registered for the key may settle it;
		// a clear in the meantime leaves the entry gone.
		if !matches!(self.entries.get(key), Some(Entry::Loading { id: current, .. }) if *current == id)
		{
			return;
		}
		match result {
			Ok(image) => {
				self.entries.insert(key.clone(), Entry::Ready(image.clone()));
			}
			Err(error) => {
				log::warn!("{error}");
				self.entries.remove(key);
				self.failed.insert(key.clone());
			}
		}
	}
}

pub struct ImageCache<L: ImageLoader> {
	loader: L,
	inner: Rc<RefCell<CacheInner<L::Image>>>,
	spawner: Spawner,
}

impl<L: ImageLoader> ImageCache<L> {
	pub fn new(loader: L) -> Self {
		Self::with_spawner(
			loader,
			Rc::new(|task: LocalBoxFuture<'static, ()>| {
				wasm_bindgen_futures::spawn_local(task)
			}),
		)
	}

	pub fn with_spawner(loader: L, spawner: Spawner) -> Self {
		Self {
			loader,
			inner: Rc::new(RefCell::new(CacheInner {
				entries: HashMap::new(),
				failed: HashSet::new(),
				next_id: 0,
			})),
			spawner,
		}
	}

	pub fn request(&self, key: CacheKey) -> SharedImageFuture<L::Image> {
		let mut inner = self.inner.borrow_mut();
		match inner.entries.get(&key) {
			Some(Entry::Ready(image)) => return future::ready(Ok(image.clone())).boxed_local().shared(),
			Some(Entry::Loading { future, .. }) => return future.clone(),
			None => {}
		}

		inner.failed.remove(&key);
		let id = inner.next_id;
		inner.next_id += 1;

		let load = self.loader.load(&key);
		let weak: Weak<RefCell<CacheInner<L::Image>>> = Rc::downgrade(&self.inner);
		let settle_key = key.clone();
		let future = async move {
			let result = load.await;
			if let Some(inner) = weak.upgrade() {
				inner.borrow_mut().settle(&settle_key, id, &result);
			}
			result
		}
		.boxed_local()
		.shared();

		inner.entries.insert(
			key,
			Entry::Loading {
				id,
				future: future.clone(),
			},
		);
		drop(inner);
		// Settles the entry even when the caller drops its future unpolled.
		(self.spawner)(future.clone().map(|_| ()).boxed_local());
		future
	}

	pub fn ready(&self, key: &CacheKey) -> Option<L::Image> {
		match self.inner.borrow().entries.get(key) {
			Some(Entry::Ready(image)) => Some(image.clone()),
			_ => None,
		}
	}

	pub fn is_loading(&self, key: &CacheKey) -> bool {
		matches!(self.inner.borrow().entries.get(key), Some(Entry::Loading { .. }))
	}

	pub fn has_failed(&self, key: &CacheKey) -> bool {
		self.inner.borrow().failed.contains(key)
	}

	/// Per-frame access: the handle if resolved, otherwise starts a background
	/// load once. Keys that failed stay empty until cleared or requested again.
	pub fn get_or_spawn(&self, key: CacheKey) -> Option<L::Image> {
		{
			let inner = self.inner.borrow();
			match inner.entries.get(&key) {
				Some(Entry::Ready(image)) => return Some(image.clone()),
				Some(Entry::Loading { .. }) => return None,
				None if inner.failed.contains(&key) => return None,
				None => {}
			}
		}
		self.request(key);
		None
	}

	pub fn clear(&self, key: &CacheKey) {
		let mut inner = self.inner.borrow_mut();
		inner.entries.remove(key);
		inner.failed.remove(key);
	}

	pub fn clear_namespace(&self, namespace: CacheNamespace) {
		let mut inner = self.inner.borrow_mut();
		inner.entries.retain(|key, _| key.namespace() != namespace);
		inner.failed.retain(|key| key.namespace() != namespace);
	}

	pub fn clear_all(&self) {
		let mut inner = self.inner.borrow_mut();
		inner.entries.clear();
		inner.failed.clear();
	}

	pub fn len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Loads through detached `<img>` elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlImageLoader;

impl ImageLoader for HtmlImageLoader {
	type Image = HtmlImageElement;

	fn load(&self, key: &CacheKey) -> LocalBoxFuture<'static, ImageResult<HtmlImageElement>> {
		let src = match icons::image_source(key) {
			Ok(src) => src,
			Err(error) => return future::ready(Err(error)).boxed_local(),
		};
		let key = key.clone();

		async move {
			let image = HtmlImageElement::new().map_err(|_| ImageLoadError::Failed { key: key.clone() })?;
			let (tx, rx) = futures::channel::oneshot::channel::<bool>();
			let tx = Rc::new(RefCell::new(Some(tx)));
			let settle = |loaded: bool| {
				let tx = tx.clone();
				Closure::<dyn FnMut()>::new(move || {
					if let Some(tx) = tx.borrow_mut().take() {
						let _ = tx.send(loaded);
					}
				})
			};
			let on_load = settle(true);
			let on_error = settle(false);

			image.set_onload(Some(on_load.as_ref().unchecked_ref()));
			image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
			if matches!(key, CacheKey::Image { .. }) {
				image.set_cross_origin(Some("anonymous"));
			}
			image.set_src(&src);

			let outcome = rx.await;
			image.set_onload(None);
			image.set_onerror(None);
			drop((on_load, on_error));

			match outcome {
				Ok(true) => Ok(image),
				Ok(false) => Err(ImageLoadError::Failed { key }),
				Err(_) => Err(ImageLoadError::Canceled { key }),
			}
		}
		.boxed_local()
	}
}
