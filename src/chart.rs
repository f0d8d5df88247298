//! Canvas rendering for the landed-cost donut chart.
//!
//! The donut is drawn directly on an `HtmlCanvasElement` with plotters:
//! each cost category becomes an annular sector polygon, labelled outside
//! with its share, with the inclusive total annotated in the hole.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_canvas::CanvasBackend;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use jdm_pulse::api::PredictResponse;
use jdm_pulse::format_bdt;

pub const COST_CHART_CANVAS_ID: &str = "cost-breakdown-chart";

const CHART_WIDTH: u32 = 480;
const CHART_HEIGHT: u32 = 420;
const OUTER_RADIUS: f64 = 130.0;
const HOLE_RATIO: f64 = 0.5;
const LABEL_OFFSET: f64 = 14.0;
/// Slices below this share of the total keep their wedge but get no
/// outside label.
const LABEL_MIN_FRACTION: f64 = 0.015;
/// Arc step in radians when tessellating a sector.
const ARC_STEP: f64 = 0.05;

const LABEL_COLOR: RGBColor = RGBColor(0xcb, 0xd5, 0xe1);
const TOTAL_COLOR: RGBColor = RGBColor(0x3b, 0x82, 0xf6);

const SLICE_COLORS: [RGBColor; 11] = [
    RGBColor(0x3b, 0x82, 0xf6), // CIF value
    RGBColor(0x8b, 0x5c, 0xf6), // customs duty
    RGBColor(0xec, 0x48, 0x99), // supplementary duty
    RGBColor(0xf5, 0x9e, 0x0b), // VAT
    RGBColor(0x10, 0xb9, 0x81), // advance tax
    RGBColor(0x06, 0xb6, 0xd4), // AIT
    RGBColor(0x63, 0x66, 0xf1), // regulatory duty
    RGBColor(0x84, 0xcc, 0x16), // environmental surcharge
    RGBColor(0xf9, 0x73, 0x16), // clearing agent
    RGBColor(0x14, 0xb8, 0xa6), // BRTA registration
    RGBColor(0x64, 0x74, 0x8b), // platform fee
];

/// The fixed eleven-slice layout: CIF value, the seven duty and surcharge
/// categories, the two local fees, then the platform fee.
pub fn breakdown_slices(
    analysis: &PredictResponse,
    platform_fee_bdt: u64,
) -> Vec<(&'static str, u64)> {
    let duties = &analysis.bangladesh_duties_bdt;
    let local = &analysis.local_costs_bdt;
    vec![
        ("CIF Value", duties.cif_value),
        ("Customs Duty", duties.customs_duty),
        ("Supplementary Duty", duties.supplementary_duty),
        ("VAT (15%)", duties.vat),
        ("Advance Tax", duties.advance_tax),
        ("AIT", duties.ait),
        ("Regulatory Duty", duties.regulatory_duty),
        ("Environmental", duties.environmental_surcharge),
        ("Clearing Agent", local.clearing_agent_fee),
        ("BRTA Registration", local.brta_registration),
        ("Platform Fee", platform_fee_bdt),
    ]
}

/// Outline of one annular sector: out along the starting edge, around the
/// outer arc, back along the closing edge, and home around the inner arc.
fn sector_points(
    center: (f64, f64),
    inner: f64,
    outer: f64,
    start: f64,
    end: f64,
) -> Vec<(i32, i32)> {
    let steps = (((end - start) / ARC_STEP).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(2 * steps + 2);
    for k in 0..=steps {
        let angle = start + (end - start) * k as f64 / steps as f64;
        points.push((
            (center.0 + outer * angle.cos()).round() as i32,
            (center.1 + outer * angle.sin()).round() as i32,
        ));
    }
    for k in (0..=steps).rev() {
        let angle = start + (end - start) * k as f64 / steps as f64;
        points.push((
            (center.0 + inner * angle.cos()).round() as i32,
            (center.1 + inner * angle.sin()).round() as i32,
        ));
    }
    points
}

/// Render the cost breakdown donut onto the canvas with the given id.
///
/// The center annotation always shows landed cost plus platform fee; duty
/// figures come from the response untouched.
pub fn draw_cost_breakdown(
    canvas_id: &str,
    analysis: &PredictResponse,
    platform_fee_bdt: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let canvas = gloo_utils::document()
        .get_element_by_id(canvas_id)
        .ok_or("cost chart canvas is not mounted")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| "cost chart element is not a canvas")?;

    // Resetting the size also clears any previous frame.
    canvas.set_width(CHART_WIDTH);
    canvas.set_height(CHART_HEIGHT);

    let backend =
        CanvasBackend::with_canvas_object(canvas).ok_or("canvas 2d context unavailable")?;
    let root = backend.into_drawing_area();

    let slices = breakdown_slices(analysis, platform_fee_bdt);
    let total: u64 = slices.iter().map(|(_, amount)| amount).sum();
    if total == 0 {
        return Ok(());
    }

    let center = (CHART_WIDTH as f64 / 2.0, CHART_HEIGHT as f64 / 2.0);
    let inner = OUTER_RADIUS * HOLE_RATIO;
    let label_font = ("sans-serif", 12).into_font().color(&LABEL_COLOR);

    // Start at twelve o'clock and sweep clockwise.
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, (label, amount)) in slices.iter().enumerate() {
        if *amount == 0 {
            continue;
        }
        let fraction = *amount as f64 / total as f64;
        let sweep = fraction * std::f64::consts::TAU;
        let color = SLICE_COLORS[i % SLICE_COLORS.len()];
        root.draw(&Polygon::new(
            sector_points(center, inner, OUTER_RADIUS, angle, angle + sweep),
            color.filled(),
        ))?;

        if fraction >= LABEL_MIN_FRACTION {
            let mid = angle + sweep / 2.0;
            let x = center.0 + (OUTER_RADIUS + LABEL_OFFSET) * mid.cos();
            let y = center.1 + (OUTER_RADIUS + LABEL_OFFSET) * mid.sin();
            let h_pos = if mid.cos() < 0.0 { HPos::Right } else { HPos::Left };
            let style = label_font.clone().pos(Pos::new(h_pos, VPos::Center));
            root.draw(&Text::new(
                format!("{} {:.1}%", label, fraction * 100.0),
                (x.round() as i32, y.round() as i32),
                style,
            ))?;
        }
        angle += sweep;
    }

    let total_style = ("sans-serif", 20)
        .into_font()
        .color(&TOTAL_COLOR)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        format_bdt(analysis.total_landed_cost_bdt + platform_fee_bdt),
        (center.0.round() as i32, center.1.round() as i32),
        total_style,
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_analysis() -> PredictResponse {
        serde_json::from_value(serde_json::json!({
            "predicted_winning_bid_jpy": 5_000_000u64,
            "user_bid_jpy": null,
            "bid_used_for_calculation": 5_000_000u64,
            "currency_conversion": {
                "jpy_to_bdt_rate": 0.72,
                "total_japan_cost_jpy": 5_440_000u64,
                "total_japan_cost_bdt": 3_916_800u64
            },
            "japan_costs_jpy": {
                "winning_bid": 5_000_000u64,
                "auction_fee": 250_000u64,
                "export_certificate": 15_000u64,
                "freight_inspection": 25_000u64,
                "shipping": 150_000u64,
                "total": 5_440_000u64
            },
            "bangladesh_duties_bdt": {
                "cif_value": 3_916_800u64,
                "customs_duty": 19_584_000u64,
                "supplementary_duty": 10_575_360u64,
                "vat": 5_111_424u64,
                "advance_tax": 1_703_808u64,
                "ait": 1_022_284u64,
                "regulatory_duty": 156_672u64,
                "environmental_surcharge": 78_336u64,
                "total_duties": 38_231_884u64
            },
            "local_costs_bdt": {
                "clearing_agent_fee": 50_000u64,
                "brta_registration": 85_000u64,
                "documentation_fee": 15_000u64,
                "total": 150_000u64
            },
            "total_landed_cost_bdt": 42_298_684u64,
            "total_landed_cost_usd": 384_533u64,
            "duty_percentage": 976.1
        }))
        .unwrap()
    }

    #[test]
    fn slices_follow_the_fixed_layout() {
        let analysis = sample_analysis();
        let slices = breakdown_slices(&analysis, 72_000);
        assert_eq!(slices.len(), 11);
        assert_eq!(slices.len(), SLICE_COLORS.len());
        assert_eq!(slices[0], ("CIF Value", 3_916_800));
        assert_eq!(slices[3], ("VAT (15%)", 5_111_424));
        assert_eq!(slices[8], ("Clearing Agent", 50_000));
        assert_eq!(slices[10], ("Platform Fee", 72_000));
    }

    #[test]
    fn slices_sum_to_cif_plus_duties_local_and_fee() {
        let analysis = sample_analysis();
        let slices = breakdown_slices(&analysis, 72_000);
        let total: u64 = slices.iter().map(|(_, amount)| amount).sum();
        let duties = &analysis.bangladesh_duties_bdt;
        let expected = duties.cif_value
            + duties.total_duties
            - analysis.local_costs_bdt.documentation_fee // not charted
            + analysis.local_costs_bdt.total
            + 72_000;
        assert_eq!(total, expected);
    }

    #[test]
    fn sector_outline_stays_within_radii() {
        let center = (100.0, 100.0);
        let points = sector_points(center, 50.0, 100.0, 0.0, std::f64::consts::FRAC_PI_2);
        assert!(points.len() >= 6);
        for (x, y) in points {
            let r = (((x as f64) - center.0).powi(2) + ((y as f64) - center.1).powi(2)).sqrt();
            assert!(r >= 49.0 && r <= 101.0, "point radius {} out of band", r);
        }
    }
}
