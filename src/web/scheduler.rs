use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::error::ArcadeError;
use crate::scheduler::{Cadence, Scheduler, Timer};

/// Routes a fired timer to whichever engine owns the scheduler.
pub(crate) type TimerDispatch = fn(Timer, f64);

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

enum Armed {
    Interval {
        id: i32,
        callback: Closure<dyn FnMut()>,
    },
    Timeout {
        id: i32,
        fired: Rc<Cell<bool>>,
        callback: Closure<dyn FnMut()>,
    },
    Frame {
        request: Rc<Cell<i32>>,
        running: Rc<Cell<bool>>,
        callback: FrameCallback,
    },
}

/// `setInterval` / `setTimeout` / `requestAnimationFrame` behind [`Scheduler`].
///
/// Cancelled callbacks are parked in `retired_*` and only dropped on the next
/// `schedule`, since a timer is often cancelled from inside its own callback.
pub(crate) struct WebScheduler {
    dispatch: TimerDispatch,
    armed: HashMap<Timer, Armed>,
    retired_ticks: Vec<Closure<dyn FnMut()>>,
    retired_frames: Vec<Closure<dyn FnMut(f64)>>,
}

pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn millis(d: Duration) -> i32 {
    d.as_millis().min(i32::MAX as u128) as i32
}

impl WebScheduler {
    pub(crate) fn new(dispatch: TimerDispatch) -> Self {
        Self {
            dispatch,
            armed: HashMap::new(),
            retired_ticks: Vec::new(),
            retired_frames: Vec::new(),
        }
    }

    fn arm(&self, win: &Window, timer: Timer, cadence: Cadence) -> Result<Armed, ArcadeError> {
        let dispatch = self.dispatch;
        match cadence {
            Cadence::Every(period) => {
                let callback = Closure::wrap(Box::new(move || dispatch(timer, now_ms())) as Box<dyn FnMut()>);
                let id = win
                    .set_interval_with_callback_and_timeout_and_arguments_0(
                        callback.as_ref().unchecked_ref(),
                        millis(period),
                    )
                    .map_err(|e| ArcadeError::js("setInterval", e))?;
                Ok(Armed::Interval { id, callback })
            }
            Cadence::Once(delay) => {
                let fired = Rc::new(Cell::new(false));
                let flag = fired.clone();
                let callback = Closure::wrap(Box::new(move || {
                    flag.set(true);
                    dispatch(timer, now_ms());
                }) as Box<dyn FnMut()>);
                let id = win
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.as_ref().unchecked_ref(),
                        millis(delay),
                    )
                    .map_err(|e| ArcadeError::js("setTimeout", e))?;
                Ok(Armed::Timeout { id, fired, callback })
            }
            Cadence::EveryFrame => {
                let running = Rc::new(Cell::new(true));
                let request = Rc::new(Cell::new(0));
                let callback: FrameCallback = Rc::new(RefCell::new(None));

                let next = callback.clone();
                let (live, pending) = (running.clone(), request.clone());
                *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                    if !live.get() {
                        return;
                    }
                    dispatch(timer, ts);
                    // the handler may have cancelled this loop
                    if !live.get() {
                        return;
                    }
                    if let (Some(w), Some(cb)) = (web_sys::window(), next.borrow().as_ref()) {
                        if let Ok(id) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            pending.set(id);
                        }
                    }
                }) as Box<dyn FnMut(f64)>));

                let first = match callback.borrow().as_ref() {
                    Some(cb) => win
                        .request_animation_frame(cb.as_ref().unchecked_ref())
                        .map_err(|e| ArcadeError::js("requestAnimationFrame", e))?,
                    None => 0,
                };
                request.set(first);
                Ok(Armed::Frame {
                    request,
                    running,
                    callback,
                })
            }
        }
    }

    fn disarm(&mut self, armed: Armed) {
        let win = web_sys::window();
        match armed {
            Armed::Interval { id, callback } => {
                if let Some(w) = &win {
                    w.clear_interval_with_handle(id);
                }
                self.retired_ticks.push(callback);
            }
            Armed::Timeout { id, callback, .. } => {
                if let Some(w) = &win {
                    w.clear_timeout_with_handle(id);
                }
                self.retired_ticks.push(callback);
            }
            Armed::Frame {
                request,
                running,
                callback,
            } => {
                running.set(false);
                if let Some(Err(e)) = win.as_ref().map(|w| w.cancel_animation_frame(request.get())) {
                    log::debug!("{}", ArcadeError::js("cancelAnimationFrame", e));
                }
                // Taking the closure out breaks the self-reference.
                if let Some(cb) = callback.borrow_mut().take() {
                    self.retired_frames.push(cb);
                }
            }
        }
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&mut self, timer: Timer, cadence: Cadence) {
        self.retired_ticks.clear();
        self.retired_frames.clear();
        self.cancel(timer);

        let Some(win) = web_sys::window() else {
            log::warn!("cannot arm {timer:?}: no window");
            return;
        };
        match self.arm(&win, timer, cadence) {
            Ok(armed) => {
                self.armed.insert(timer, armed);
            }
            Err(err) => log::warn!("cannot arm {timer:?}: {err}"),
        }
    }

    fn cancel(&mut self, timer: Timer) {
        if let Some(armed) = self.armed.remove(&timer) {
            self.disarm(armed);
        }
    }

    fn is_scheduled(&self, timer: Timer) -> bool {
        match self.armed.get(&timer) {
            Some(Armed::Timeout { fired, .. }) => !fired.get(),
            Some(_) => true,
            None => false,
        }
    }
}

impl Drop for WebScheduler {
    fn drop(&mut self) {
        let timers: Vec<Timer> = self.armed.keys().copied().collect();
        for timer in timers {
            self.cancel(timer);
        }
    }
}
