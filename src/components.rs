//! Pure Yew view components for the JDM Pulse dashboard.
//!
//! Stateless pieces that render from props, keeping the stateful wiring in
//! `main.rs` small.

use yew::prelude::*;

use jdm_pulse::api::PredictResponse;
use jdm_pulse::{format_bdt, format_jpy, Vehicle};

use crate::config::{MAX_WIN_PROB_PCT, MIN_WIN_PROB_PCT, WIN_PROB_STEP_PCT};

/// Card for one featured vehicle in the catalog grid.
#[derive(Properties, PartialEq)]
pub struct VehicleCardProps {
    pub vehicle: Vehicle,
    pub selected: bool,
    pub onselect: Callback<Vehicle>,
}

#[function_component(VehicleCard)]
pub fn vehicle_card(props: &VehicleCardProps) -> Html {
    let onclick = {
        let vehicle = props.vehicle.clone();
        let onselect = props.onselect.clone();
        Callback::from(move |_| onselect.emit(vehicle.clone()))
    };

    html! {
        <button class={classes!("vehicle-card", props.selected.then_some("selected"))} {onclick}>
            <div class="vehicle-thumb">{ "🚗" }</div>
            <div class="vehicle-meta">
                <div class="vehicle-name">
                    { format!("{} {}", props.vehicle.make, props.vehicle.model) }
                </div>
                <div class="vehicle-detail">
                    { format!("{} • {}cc • grade {:.1}",
                              props.vehicle.year,
                              props.vehicle.engine_cc,
                              props.vehicle.auction_grade) }
                </div>
            </div>
        </button>
    }
}

/// Win-probability slider with its percent readout.
#[derive(Properties, PartialEq)]
pub struct WinProbSliderProps {
    pub percent: u32,
    pub oninput: Callback<InputEvent>,
}

#[function_component(WinProbSlider)]
pub fn win_prob_slider(props: &WinProbSliderProps) -> Html {
    html! {
        <div class="form-group">
            <div class="slider-header">
                <label for="win_prob">{ "Target Win Probability" }</label>
                <span class="slider-value">{ format!("{}%", props.percent) }</span>
            </div>
            <input type="range"
                id="win_prob"
                min={MIN_WIN_PROB_PCT.to_string()}
                max={MAX_WIN_PROB_PCT.to_string()}
                step={WIN_PROB_STEP_PCT.to_string()}
                value={props.percent.to_string()}
                oninput={props.oninput.clone()}
            />
        </div>
    }
}

fn render_stat(label: &str, value: String) -> Html {
    html! {
        <div class="stat-tile">
            <div class="stat-label">{ label }</div>
            <div class="stat-value">{ value }</div>
        </div>
    }
}

/// The headline duty tiles shown under the donut chart.
pub fn render_duty_stats(analysis: &PredictResponse) -> Html {
    let duties = &analysis.bangladesh_duties_bdt;
    html! {
        <div class="stat-grid">
            { render_stat("Customs Duty", format_bdt(duties.customs_duty)) }
            { render_stat("VAT", format_bdt(duties.vat)) }
            { render_stat("Advance Tax", format_bdt(duties.advance_tax)) }
            { render_stat("AIT", format_bdt(duties.ait)) }
        </div>
    }
}

fn render_cost_row(label: &str, amount: u64) -> Html {
    html! {
        <div class="cost-row">
            <span>{ label }</span>
            <span>{ format_jpy(amount) }</span>
        </div>
    }
}

/// Japan-side acquisition costs, shown in the collapsible section.
pub fn render_japan_costs(analysis: &PredictResponse) -> Html {
    let costs = &analysis.japan_costs_jpy;
    html! {
        <div class="cost-list">
            { render_cost_row("Winning bid", costs.winning_bid) }
            { render_cost_row("Auction fee", costs.auction_fee) }
            { render_cost_row("Export certificate", costs.export_certificate) }
            { render_cost_row("Freight & inspection", costs.freight_inspection) }
            { render_cost_row("Shipping to Bangladesh", costs.shipping) }
            <div class="cost-row cost-total">
                <span>{ "Total Japan-side" }</span>
                <span>{ format_jpy(costs.total) }</span>
            </div>
        </div>
    }
}
