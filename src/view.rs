//! Mounted views: wire polling, optimistic actions, and rendering to a DOM root.
//!
//! Async callbacks only hold a `Weak` to the view, so a request that
//! completes after the view is gone is dropped instead of touching the DOM.
//! Re-renders patch the previous tree in place rather than replacing the
//! root's HTML, so clicks and focus survive polls and ticks.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::api::Api;
use crate::city::{CityState, ReconcileEffects};
use crate::config::ViewConfig;
use crate::dom::{self, alert, closest_attr, EventListener};
use crate::render;
use crate::timer::{Interval, Timeout};
use crate::trainer::{TrainerAction, TrainerState};
use crate::vdom::VNode;

/// Last tree written under a root, for patching.
struct Rendered {
    root: Element,
    tree: Vec<VNode>,
}

impl Rendered {
    fn new(root: Element) -> Rendered {
        root.set_inner_html("");
        Rendered { root, tree: Vec::new() }
    }

    fn update(&mut self, next: VNode) {
        let next = vec![next];
        if next == self.tree {
            return;
        }
        if let Err(e) = dom::patch(&self.root, &self.tree, &next) {
            log::error!("patching view failed, rewriting it: {:?}", e);
            let html: String = next.iter().map(VNode::to_html).collect();
            self.root.set_inner_html(&html);
        }
        self.tree = next;
    }

    fn clear(&mut self) {
        self.root.set_inner_html("");
        self.tree.clear();
    }
}

// --- CITY VIEW ---

struct CityInner {
    state: CityState,
    cfg: ViewConfig,
    api: Api,
    view: Rendered,
    repolls: Vec<Timeout>,
}

impl CityInner {
    fn render(&mut self) {
        let next = render::render_city(&self.state, &self.cfg);
        self.view.update(next);
    }

    fn schedule_repoll(&mut self, timeout: Timeout) {
        self.repolls.retain(|t| !t.has_fired());
        self.repolls.push(timeout);
    }
}

pub struct CityView {
    inner: Rc<RefCell<CityInner>>,
    _poll: Interval,
    _clicks: EventListener,
}

impl CityView {
    pub fn mount(root: Element, cfg: ViewConfig) -> Result<CityView, JsValue> {
        let inner = Rc::new(RefCell::new(CityInner {
            state: CityState::new(cfg.repoll_delay_ms),
            api: Api::new(&cfg.api_base),
            cfg: cfg.clone(),
            view: Rendered::new(root.clone()),
            repolls: Vec::new(),
        }));
        inner.borrow_mut().render();

        let weak = Rc::downgrade(&inner);
        poll_city(weak.clone());

        let poll = {
            let weak = weak.clone();
            Interval::new(cfg.poll_interval_ms, move || poll_city(weak.clone()))?
        };

        let clicks = EventListener::new(&root, "click", move |event| {
            if let Some(building) = closest_attr(&event, "button[data-building]", "data-building") {
                upgrade(weak.clone(), building);
            }
        })?;

        log::info!("city view mounted, polling every {}ms", cfg.poll_interval_ms);
        Ok(CityView { inner, _poll: poll, _clicks: clicks })
    }
}

impl Drop for CityView {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.view.clear();
        }
        log::info!("city view unmounted");
    }
}

fn poll_city(weak: Weak<RefCell<CityInner>>) {
    let api = match weak.upgrade() {
        Some(inner) => inner.borrow().api.clone(),
        None => return,
    };
    spawn_local(async move {
        let result = api.fetch_city().await;
        let Some(inner) = weak.upgrade() else {
            log::debug!("city view gone, dropping poll result");
            return;
        };
        let mut inner = inner.borrow_mut();
        match result {
            Ok(snapshot) => inner.state.apply_snapshot(snapshot),
            Err(err) => inner.state.poll_failed(&err),
        }
        inner.render();
    });
}

fn upgrade(weak: Weak<RefCell<CityInner>>, building: String) {
    let Some(inner) = weak.upgrade() else { return };
    let (api, req) = {
        let mut inner = inner.borrow_mut();
        let Some(req) = inner.state.begin_upgrade(&building) else { return };
        inner.render();
        (inner.api.clone(), req)
    };
    drop(inner);

    spawn_local(async move {
        let result = api.upgrade_building(&req).await;
        let Some(inner) = weak.upgrade() else { return };
        let reconcile = {
            let mut inner = inner.borrow_mut();
            let reconcile = inner.state.finish_upgrade(&building, result);
            inner.render();
            reconcile
        };

        drop(inner);
        reconcile.apply(&mut BrowserEffects { weak });
    });
}

struct BrowserEffects {
    weak: Weak<RefCell<CityInner>>,
}

impl ReconcileEffects for BrowserEffects {
    fn repoll_after(&mut self, delay_ms: u32) {
        let repoll = self.weak.clone();
        match Timeout::new(delay_ms, move || poll_city(repoll.clone())) {
            Ok(timeout) => {
                if let Some(inner) = self.weak.upgrade() {
                    inner.borrow_mut().schedule_repoll(timeout);
                }
            }
            Err(e) => {
                log::error!("failed to schedule re-poll: {:?}", e);
                poll_city(self.weak.clone());
            }
        }
    }

    fn alert(&mut self, message: &str) {
        alert(message);
    }

    fn repoll_now(&mut self) {
        poll_city(self.weak.clone());
    }
}

// --- TRAINER VIEW ---

struct TrainerInner {
    state: TrainerState,
    cfg: ViewConfig,
    api: Api,
    view: Rendered,
}

impl TrainerInner {
    fn render(&mut self) {
        let next = render::render_trainer(&self.state, &self.cfg);
        self.view.update(next);
    }
}

pub struct TrainerView {
    inner: Rc<RefCell<TrainerInner>>,
    _poll: Interval,
    _tick: Interval,
    _clicks: EventListener,
}

impl TrainerView {
    pub fn mount(root: Element, cfg: ViewConfig) -> Result<TrainerView, JsValue> {
        let inner = Rc::new(RefCell::new(TrainerInner {
            state: TrainerState::default(),
            api: Api::new(&cfg.api_base),
            cfg: cfg.clone(),
            view: Rendered::new(root.clone()),
        }));
        inner.borrow_mut().render();

        let weak = Rc::downgrade(&inner);
        poll_trainer(weak.clone());

        let poll = {
            let weak = weak.clone();
            Interval::new(cfg.poll_interval_ms, move || poll_trainer(weak.clone()))?
        };

        let tick = {
            let weak = weak.clone();
            Interval::new(cfg.tick_interval_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.borrow_mut();
                    inner.state.tick();
                    inner.render();
                }
            })?
        };

        let clicks = EventListener::new(&root, "click", move |event| {
            let action = closest_attr(&event, "button[data-action]", "data-action")
                .and_then(|attr| TrainerAction::from_attr(&attr));
            if let Some(action) = action {
                run_action(weak.clone(), action);
            }
        })?;

        log::info!("trainer view mounted");
        Ok(TrainerView { inner, _poll: poll, _tick: tick, _clicks: clicks })
    }
}

impl Drop for TrainerView {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.view.clear();
        }
    }
}

fn poll_trainer(weak: Weak<RefCell<TrainerInner>>) {
    let api = match weak.upgrade() {
        Some(inner) => inner.borrow().api.clone(),
        None => return,
    };
    spawn_local(async move {
        let result = api.fetch_foobar().await;
        let Some(inner) = weak.upgrade() else { return };
        let mut inner = inner.borrow_mut();
        match result {
            Ok(counters) => inner.state.apply_poll(counters),
            Err(err) => inner.state.poll_failed(&err),
        }
        inner.render();
    });
}

fn run_action(weak: Weak<RefCell<TrainerInner>>, action: TrainerAction) {
    let Some(inner) = weak.upgrade() else { return };
    let api = {
        let mut inner = inner.borrow_mut();
        let send = inner.state.begin(action);
        inner.render();
        if !send {
            return;
        }
        inner.api.clone()
    };
    drop(inner);

    spawn_local(async move {
        let result = match action {
            TrainerAction::TrainFoo => api.train_foo().await,
            TrainerAction::BuildBar => api.build_bar().await,
        };
        let Some(inner) = weak.upgrade() else { return };
        let mut inner = inner.borrow_mut();
        inner.state.finish(action, result);
        inner.render();
    });
}
