//! State to element trees. Nothing in here mutates state.

use crate::city::CityState;
use crate::config::ViewConfig;
use crate::protocol::QueueEntry;
use crate::trainer::{TrainerAction, TrainerState};
use crate::vdom::{el, VElement, VNode};

/// Turns an identifier like `town_hall` into `Town Hall`.
///
/// Only the first underscore becomes a space: `iron_ore_mine` renders as
/// `Iron Ore_mine`. Word starts follow regex `\b\w`, so the underscore
/// still counts as a word character.
pub fn pretty_name(name: &str) -> String {
    let spaced = name.replacen('_', " ", 1);
    let mut out = String::with_capacity(spaced.len());
    let mut in_word = false;
    for c in spaced.chars() {
        let word = c.is_ascii_alphanumeric() || c == '_';
        out.push(if word && !in_word { c.to_ascii_uppercase() } else { c });
        in_word = word;
    }
    out
}

/// Completion timestamp as a wall-clock time. Unparseable input is shown as-is.
#[cfg(target_arch = "wasm32")]
pub fn format_time(ts: &str) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_str(ts));
    if date.get_time().is_nan() {
        return ts.to_string();
    }
    date.to_locale_time_string("default").into()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_time(ts: &str) -> String {
    use time::format_description::well_known::Rfc3339;
    match time::OffsetDateTime::parse(ts, &Rfc3339) {
        Ok(t) => format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second()),
        Err(_) => ts.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Entry(&'a QueueEntry),
    Empty,
}

/// Real entries first, then empty placeholders up to `min` slots.
pub fn queue_slots(queue: &[QueueEntry], min: usize) -> Vec<Slot<'_>> {
    let mut slots: Vec<Slot> = queue.iter().map(Slot::Entry).collect();
    while slots.len() < min {
        slots.push(Slot::Empty);
    }
    slots
}

// --- CITY ---

pub fn render_city(state: &CityState, cfg: &ViewConfig) -> VNode {
    let city = match state.snapshot() {
        Some(city) => city,
        None => return el("div").text("Loading City...").into(),
    };

    let mut resources = el("div").attr("class", "resourceBar");
    for (name, value) in &city.resources {
        resources = resources.child(
            el("div")
                .attr("class", format!("resource {}", name))
                .child(el("span").attr("class", "resource-name").text(pretty_name(name)))
                .child(el("div").attr("class", "resource-value").text(value.to_string())),
        );
    }

    let mut queue = el("div").attr("class", "buildingsQueue").child(el("h3").text("Building Queue"));
    for slot in queue_slots(&city.queue, cfg.min_queue_slots) {
        queue = queue.child(match slot {
            Slot::Entry(entry) => {
                let when = match &entry.complete_time {
                    Some(ts) => format!("Complete: {}", format_time(ts)),
                    None => "Processing...".to_string(),
                };
                el("div")
                    .attr("class", "queueItem")
                    .child(
                        el("span")
                            .attr("class", "queueBuilding")
                            .text(format!("{} → Level {}", pretty_name(&entry.building), entry.level)),
                    )
                    .child(el("span").attr("class", "queueTime").text(when))
            }
            Slot::Empty => el("div")
                .attr("class", "queueItem emptySlot")
                .child(el("span").attr("class", "queueBuilding").text("Empty slot"))
                .child(el("span").attr("class", "queueTime").text("-")),
        });
    }

    let mut buildings = el("div").attr("class", "buildings").child(el("h3").text("Buildings"));
    for (name, level) in &city.buildings {
        buildings = buildings.child(
            el("div")
                .attr("class", format!("building {}", name))
                .child(
                    el("div")
                        .attr("class", "buildingInfo")
                        .child(el("div").attr("class", "building-name").text(pretty_name(name)))
                        .child(el("div").attr("class", "building-level").text(format!("Level {}", level))),
                )
                .child(upgrade_button(name, *level, state.is_in_flight(name))),
        );
    }

    el("div")
        .attr("class", "city")
        .child(el("div").attr("class", "cityName").text(city.name.clone()))
        .child(resources)
        .child(queue)
        .child(buildings)
        .into()
}

fn upgrade_button(building: &str, level: i64, in_flight: bool) -> VElement {
    let button = el("button").attr("class", "upgradeButton").attr("data-building", building);
    if in_flight {
        return button.flag("disabled", true).text("Upgrading...");
    }
    match level.checked_add(1) {
        Some(next) => button.text(format!("Upgrade to {}", next)),
        None => button.flag("disabled", true).text("Max level"),
    }
}

// --- TRAINER ---

pub fn render_trainer(state: &TrainerState, cfg: &ViewConfig) -> VNode {
    let app = el("div").attr("class", "app").child(el("h1").text("Stickian Game"));
    if state.loading {
        return app.child(el("p").text("Loading game state...")).into();
    }

    // Always present so the nodes after it keep their position.
    let error = el("div")
        .attr("class", "error")
        .flag("hidden", state.error.is_none())
        .text(state.error.as_ref().map(|e| format!("Error: {}", e)).unwrap_or_default());

    let counters = el("div")
        .attr("class", "game-state")
        .child(el("div").attr("class", "resource").child(el("strong").text(format!("Foo: {}", state.foo))))
        .child(el("div").attr("class", "resource").child(el("strong").text(format!("Bar: {}", state.bar))));

    let mut actions = el("div").attr("class", "actions");
    for (action, label) in [
        (TrainerAction::TrainFoo, "Train Foo (Cost: 1 Bar)"),
        (TrainerAction::BuildBar, "Build Bar (Cost: 1 Bar, Produces: 2 Bar)"),
    ] {
        actions = actions.child(
            el("button")
                .attr("data-action", action.attr())
                .flag("disabled", !state.can_afford(action))
                .text(label),
        );
    }

    let notes = el("div")
        .attr("class", "notes")
        .child(el("p").text("• Foo training takes 3 ticks to complete"))
        .child(el("p").text("• Bar production gives +1 Bar per tick baseline"))
        .child(el("p").text(format!(
            "• State syncs with server every {} seconds",
            cfg.poll_interval_ms as f64 / 1000.0
        )));

    app.child(error).child(counters).child(actions).child(notes).into()
}
