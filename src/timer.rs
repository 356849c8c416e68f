//! Browser timers owned by a view. Dropping one clears it.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::dom::window;

fn as_timeout(ms: u32) -> i32 {
    ms.min(i32::MAX as u32) as i32
}

pub struct Interval {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new<F: FnMut() + 'static>(period_ms: u32, f: F) -> Result<Interval, JsValue> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let handle = window().set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            as_timeout(period_ms),
        )?;
        Ok(Interval { handle, _callback: callback })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(w) = web_sys::window() {
            w.clear_interval_with_handle(self.handle);
        }
    }
}

pub struct Timeout {
    handle: i32,
    fired: Rc<Cell<bool>>,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    pub fn new<F: FnMut() + 'static>(delay_ms: u32, mut f: F) -> Result<Timeout, JsValue> {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let callback = Closure::wrap(Box::new(move || {
            flag.set(true);
            f();
        }) as Box<dyn FnMut()>);
        let handle = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            as_timeout(delay_ms),
        )?;
        Ok(Timeout { handle, fired, _callback: callback })
    }

    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if self.has_fired() {
            return;
        }
        if let Some(w) = web_sys::window() {
            w.clear_timeout_with_handle(self.handle);
        }
    }
}
