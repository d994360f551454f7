use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Runs work on the host's next display refresh.
pub trait FrameScheduler {
	fn request(&self, callback: Box<dyn FnOnce()>) -> FrameHandle;
	/// Cancelling a handle that already fired is a no-op.
	fn cancel(&self, handle: FrameHandle);
}

/// `requestAnimationFrame` backed scheduler.
#[derive(Default)]
pub struct AnimationFrameScheduler {
	closures: Rc<RefCell<HashMap<i32, Closure<dyn FnMut()>>>>,
	// A closure cannot be dropped while it runs, so fired ids are collected
	// here and released on the next request.
	fired: Rc<RefCell<Vec<i32>>>,
}

impl AnimationFrameScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	fn release_fired(&self) {
		let mut closures = self.closures.borrow_mut();
		for id in self.fired.borrow_mut().drain(..) {
			closures.remove(&id);
		}
	}
}

impl FrameScheduler for AnimationFrameScheduler {
	fn request(&self, callback: Box<dyn FnOnce()>) -> FrameHandle {
		self.release_fired();

		let Some(window) = web_sys::window() else {
			log::warn!("no window, frame callback dropped");
			return FrameHandle(-1);
		};

		let id = Rc::new(Cell::new(-1));
		let (own_id, fired) = (id.clone(), self.fired.clone());
		let mut callback = Some(callback);
		let closure = Closure::<dyn FnMut()>::new(move || {
			if let Some(callback) = callback.take() {
				callback();
			}
			fired.borrow_mut().push(own_id.get());
		});

		match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
			Ok(handle) => {
				id.set(handle);
				self.closures.borrow_mut().insert(handle, closure);
				FrameHandle(handle)
			}
			Err(error) => {
				log::warn!("requestAnimationFrame failed: {error:?}");
				FrameHandle(-1)
			}
		}
	}

	fn cancel(&self, handle: FrameHandle) {
		if handle.0 < 0 {
			return;
		}
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(handle.0);
		}
		self.closures.borrow_mut().remove(&handle.0);
	}
}

#[cfg(test)]
pub mod manual {
	//! Scheduler double whose frames fire only when the test says so.

	use std::cell::{Cell, RefCell};

	use super::{FrameHandle, FrameScheduler};

	#[derive(Default)]
	pub struct ManualScheduler {
		queue: RefCell<Vec<(i32, Box<dyn FnOnce()>)>>,
		next: Cell<i32>,
		pub requested: Cell<usize>,
		pub canceled: Cell<usize>,
	}

	impl ManualScheduler {
		pub fn pending(&self) -> usize {
			self.queue.borrow().len()
		}

		/// Fires every callback queued before this call.
		pub fn frame(&self) {
			let due = std::mem::take(&mut *self.queue.borrow_mut());
			for (_, callback) in due {
				callback();
			}
		}
	}

	impl FrameScheduler for ManualScheduler {
		fn request(&self, callback: Box<dyn FnOnce()>) -> FrameHandle {
			let id = self.next.get();
			self.next.set(id + 1);
			self.requested.set(self.requested.get() + 1);
			self.queue.borrow_mut().push((id, callback));
			FrameHandle(id)
		}

		fn cancel(&self, handle: FrameHandle) {
			let mut queue = self.queue.borrow_mut();
			let before = queue.len();
			queue.retain(|(id, _)| *id != handle.0);
			if queue.len() != before {
				self.canceled.set(self.canceled.get() + 1);
			}
		}
	}
}
