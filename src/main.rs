//! Main module for the JDM Pulse dashboard using Yew.
//! Wires UI components, state hooks, and side-effect logic.

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use jdm_pulse::api::{self, PredictRequest, PredictResponse};
use jdm_pulse::{format_bdt, format_jpy, read_vehicles_from_csv_string, resolve_recommended_bid, Vehicle};

mod chart;
mod components;
mod config;
mod hooks;
mod utils;

use chart::{draw_cost_breakdown, COST_CHART_CANVAS_ID};
use components::{render_duty_stats, render_japan_costs, VehicleCard, WinProbSlider};
use config::*;
use hooks::use_bid_input;
use utils::{win_prob_from_percent, win_prob_to_percent};

/// Create a debounced callback that cancels any previous pending call.
fn debounce_callback<T: 'static>(
    timer_handle: &UseStateHandle<Option<Timeout>>,
    callback: Callback<T>,
    value: T,
    delay_ms: u32,
) {
    // Cancel any existing timer by replacing it
    timer_handle.set(None);

    let timer_handle_clone = timer_handle.clone();
    let handle = Timeout::new(delay_ms, move || {
        callback.emit(value);
        timer_handle_clone.set(None);
    });
    timer_handle.set(Some(handle));
}

/// Everything one prediction round needs, carried explicitly so a card
/// click can fire before the selection state handle has committed.
struct AnalysisRun {
    vehicle: Vehicle,
    user_bid_jpy: Option<u64>,
    target_win_prob: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BackendStatus {
    Checking,
    Online,
    Offline,
}

/// Primary application component wiring state, effects, and UI elements.
#[function_component(App)]
fn app() -> Html {
    let catalog_csv = include_str!("vehicles.csv");
    let vehicles = use_state(Vec::<Vehicle>::new);
    let selected = use_state(|| None::<Vehicle>);
    let analysis = use_state(|| None::<PredictResponse>);
    let recommended_bid = use_state(|| None::<u64>);
    let win_prob = use_state(|| DEFAULT_WIN_PROB);
    let loading = use_state(|| false);
    let error_message = use_state(|| None::<String>);
    let backend_status = use_state(|| BackendStatus::Checking);
    let japan_costs_visible = use_state(|| false);
    // Debounce timer slot for slider-driven refetches; the newest movement
    // replaces (and thereby cancels) the pending one.
    let debounce_timer = use_state(|| None::<Timeout>);
    let bid_input = use_bid_input();

    // Load the featured catalog on mount
    {
        let vehicles = vehicles.clone();
        use_effect_with((), move |_| {
            let loaded = read_vehicles_from_csv_string(catalog_csv).unwrap_or_default();
            vehicles.set(loaded);
        });
    }

    // Probe the backend once on mount for the header status pill
    {
        let backend_status = backend_status.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let status = match api::fetch_health().await {
                    Ok(health) if health.is_model_loaded => BackendStatus::Online,
                    Ok(_) | Err(_) => BackendStatus::Offline,
                };
                backend_status.set(status);
            });
        });
    }

    // One prediction round: POST the vehicle, store the response, derive the
    // recommended bid. When the round carried no explicit bid, the bid field
    // is seeded with the fresh prediction.
    let run_analysis = {
        let analysis = analysis.clone();
        let recommended_bid = recommended_bid.clone();
        let loading = loading.clone();
        let error_message = error_message.clone();
        let bid_set_value = bid_input.set_value.clone();
        Callback::from(move |run: AnalysisRun| {
            let analysis = analysis.clone();
            let recommended_bid = recommended_bid.clone();
            let loading = loading.clone();
            let error_message = error_message.clone();
            let bid_set_value = bid_set_value.clone();

            loading.set(true);
            error_message.set(None);
            spawn_local(async move {
                let request = PredictRequest {
                    vehicle: run.vehicle,
                    user_bid_jpy: run.user_bid_jpy,
                    target_win_prob: Some(run.target_win_prob),
                };
                match api::analyze_vehicle(&request).await {
                    Ok(response) => {
                        recommended_bid
                            .set(Some(resolve_recommended_bid(&response, run.target_win_prob)));
                        if run.user_bid_jpy.is_none() {
                            bid_set_value.emit(response.predicted_winning_bid_jpy);
                        }
                        analysis.set(Some(response));
                    }
                    Err(err) => {
                        warn!("prediction request failed: {}", err);
                        error_message.set(Some(err.to_string()));
                    }
                }
                loading.set(false);
            });
        })
    };

    // Redraw the donut whenever a new analysis lands
    {
        let current = (*analysis).clone();
        use_effect_with(current, move |analysis| {
            if let Some(analysis) = analysis {
                let platform_fee = analysis.platform_fee_bdt.unwrap_or(0);
                if let Err(err) = draw_cost_breakdown(COST_CHART_CANVAS_ID, analysis, platform_fee)
                {
                    warn!("cost chart render failed: {}", err);
                }
            }
            || ()
        });
    }

    let on_select = {
        let selected = selected.clone();
        let analysis = analysis.clone();
        let win_prob = win_prob.clone();
        let run_analysis = run_analysis.clone();
        Callback::from(move |vehicle: Vehicle| {
            selected.set(Some(vehicle.clone()));
            analysis.set(None);
            run_analysis.emit(AnalysisRun {
                vehicle,
                user_bid_jpy: None,
                target_win_prob: *win_prob,
            });
        })
    };

    let on_win_prob_input = {
        let win_prob = win_prob.clone();
        let selected = selected.clone();
        let run_analysis = run_analysis.clone();
        let debounce_timer = debounce_timer.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(percent) = input.value().parse::<u32>() {
                let prob = win_prob_from_percent(percent);
                win_prob.set(prob);
                if let Some(vehicle) = (*selected).clone() {
                    debounce_callback(
                        &debounce_timer,
                        run_analysis.clone(),
                        AnalysisRun {
                            vehicle,
                            user_bid_jpy: None,
                            target_win_prob: prob,
                        },
                        DEBOUNCE_MS,
                    );
                }
            }
        })
    };

    let on_use_recommended = {
        let selected = selected.clone();
        let recommended_bid = recommended_bid.clone();
        let win_prob = win_prob.clone();
        let run_analysis = run_analysis.clone();
        Callback::from(move |_: MouseEvent| {
            if let (Some(vehicle), Some(bid)) = ((*selected).clone(), *recommended_bid) {
                run_analysis.emit(AnalysisRun {
                    vehicle,
                    user_bid_jpy: Some(bid),
                    target_win_prob: *win_prob,
                });
            }
        })
    };

    let on_calculate = {
        let selected = selected.clone();
        let win_prob = win_prob.clone();
        let run_analysis = run_analysis.clone();
        let bid = bid_input.value;
        Callback::from(move |_: MouseEvent| {
            // Bids outside the auction limits never leave the client.
            if let (Some(vehicle), Some(bid)) = ((*selected).clone(), bid) {
                run_analysis.emit(AnalysisRun {
                    vehicle,
                    user_bid_jpy: Some(bid),
                    target_win_prob: *win_prob,
                });
            }
        })
    };

    let on_toggle_japan_costs = {
        let japan_costs_visible = japan_costs_visible.clone();
        Callback::from(move |_: MouseEvent| {
            japan_costs_visible.set(!*japan_costs_visible);
        })
    };

    let (status_class, status_label) = match *backend_status {
        BackendStatus::Checking => ("checking", "checking backend…"),
        BackendStatus::Online => ("online", "backend online"),
        BackendStatus::Offline => ("offline", "backend offline"),
    };

    html! {
        <div class="container">
            <header class="app-header">
                <div class="brand">
                    <div class="brand-mark"></div>
                    <h1>{ "JDM Pulse" }</h1>
                </div>
                <span class={classes!("backend-status", status_class)}>{ status_label }</span>
            </header>

            <section class="hero">
                <h2>{ "Import JDM Vehicles with Confidence" }</h2>
                <p>{ "Predict winning bids with ML. Calculate landed costs down to the last Taka. \
                      No hidden fees—just data." }</p>
            </section>

            <section class="featured">
                <h3>{ "Featured Live Auctions" }</h3>
                <div class="vehicle-grid">
                    { for vehicles.iter().map(|vehicle| {
                        let is_selected = selected.as_ref() == Some(vehicle);
                        html! {
                            <VehicleCard
                                vehicle={vehicle.clone()}
                                selected={is_selected}
                                onselect={on_select.clone()}
                            />
                        }
                    }) }
                </div>
            </section>

            if let Some(vehicle) = &*selected {
                <section class="analytics">
                    <div class="panel prediction-panel">
                        <h4>{ "Predictive Analysis" }</h4>

                        <div class="selected-vehicle">
                            <div class="vehicle-thumb">{ "🚗" }</div>
                            <div>
                                <div class="vehicle-name">
                                    { format!("{} {}", vehicle.make, vehicle.model) }
                                </div>
                                <div class="vehicle-detail">
                                    { format!("{} • {}cc", vehicle.year, vehicle.engine_cc) }
                                </div>
                            </div>
                        </div>

                        <div class="metric-box">
                            <div class="metric-header">
                                <span class="metric-label">{ "ML Predicted Winning Bid" }</span>
                                <span class="badge">{ "Fast inference" }</span>
                            </div>
                            <div class="metric-value accent-green">{
                                match (&*analysis, *loading) {
                                    (Some(analysis), _) => format_jpy(analysis.predicted_winning_bid_jpy),
                                    (None, true) => "…".to_string(),
                                    (None, false) => "-".to_string(),
                                }
                            }</div>
                        </div>

                        <div class="metric-box">
                            <WinProbSlider
                                percent={win_prob_to_percent(*win_prob)}
                                oninput={on_win_prob_input.clone()}
                            />
                            <div class="metric-label">{ "Recommended Bid" }</div>
                            <div class="metric-value">{
                                recommended_bid
                                    .map(format_jpy)
                                    .unwrap_or_else(|| "-".to_string())
                            }</div>
                            <button class="btn-secondary"
                                disabled={*loading || recommended_bid.is_none()}
                                onclick={on_use_recommended}
                            >
                                { "Use Recommended Bid" }
                            </button>
                        </div>

                        <div class="bid-form">
                            <label for="user_bid">{ "Your Bid (JPY)" }</label>
                            <input type="text"
                                id="user_bid"
                                value={bid_input.text.clone()}
                                oninput={bid_input.on_input.clone()}
                                placeholder="Enter bid or use prediction"
                            />
                            <button class="btn-primary"
                                disabled={*loading || bid_input.value.is_none()}
                                onclick={on_calculate}
                            >
                                { if *loading { "Calculating…" } else { "Calculate Landed Cost" } }
                            </button>
                            if let Some(err) = &*error_message {
                                <div class="request-error">{ err.clone() }</div>
                            }
                        </div>
                    </div>

                    <div class="panel cost-panel">
                        <h4>{ "Total Landed Cost" }</h4>

                        <div class="total-display">
                            <div class="total-label">{ "Final Price (incl. platform)" }</div>
                            <div class="total-value">{
                                match (&*analysis, *loading) {
                                    (Some(analysis), _) => format_bdt(analysis.total_incl_platform()),
                                    (None, true) => "…".to_string(),
                                    (None, false) => "-".to_string(),
                                }
                            }</div>
                            if let Some(analysis) = &*analysis {
                                <div class="total-detail">{
                                    format!(
                                        "Base landed: {} • Platform: {}",
                                        format_bdt(analysis.total_landed_cost_bdt),
                                        analysis
                                            .platform_fee_bdt
                                            .map(format_bdt)
                                            .unwrap_or_else(|| "n/a".to_string())
                                    )
                                }</div>
                            }
                        </div>

                        if analysis.is_some() {
                            <canvas id={COST_CHART_CANVAS_ID}></canvas>
                        }

                        if let Some(analysis) = &*analysis {
                            { render_duty_stats(analysis) }
                            <div class="duty-burden">{
                                format!("Duties amount to {:.1}% of CIF value", analysis.duty_percentage)
                            }</div>
                            <div class="japan-costs">
                                <button class="section-toggle" onclick={on_toggle_japan_costs.clone()}>
                                    { if *japan_costs_visible {
                                        "Hide Japan-side costs"
                                    } else {
                                        "Show Japan-side costs"
                                    } }
                                </button>
                                if *japan_costs_visible {
                                    { render_japan_costs(analysis) }
                                }
                            </div>
                        }
                    </div>
                </section>
            }

            <footer class="app-footer">
                { "Built for speed • Yew + Plotters • Python FastAPI backend" }
            </footer>
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the Yew renderer.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
