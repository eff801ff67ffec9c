//! Snapshot to quad list. Layers are emitted back to front.

use super::quad::{QuadInstance, quad_centered, quad_from_rect};
use crate::core::input::actions::DrumKey;
use crate::models::engine::{
    ALPHA_MAX, LANE_BOTTOM, LANE_CENTER_Y, LANE_HEIGHT, NoteKind, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::models::stats::JudgementColors;
use crate::shared::snapshot::GameplaySnapshot;
use crate::state::game::feedback::Repique;

pub const BACKGROUND_COLOR: [f32; 4] = [0.05, 0.05, 0.08, 1.0];
const LANE_COLOR: [f32; 4] = [0.15, 0.15, 0.2, 1.0];
const HIT_LINE_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
const PERFECT_BAND_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.08];
const LEADER_RING_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
const REPIQUE_NEUTRAL: [f32; 4] = [0.35, 0.35, 0.4, 1.0];
const OVERLAY_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.75];
const PANEL_COLOR: [f32; 4] = [0.12, 0.12, 0.16, 1.0];

const HIT_LINE_WIDTH: f32 = 4.0;
const LEADER_RING: f32 = 3.0;
const FLASH_OPACITY: f32 = 0.35;
const REPIQUE_X: f32 = 40.0;
const REPIQUE_SIZE: f32 = 36.0;
const PAD_SIZE: f32 = 28.0;
const PAD_SPACING: f32 = 40.0;
const PAD_OFFSET: f32 = 36.0;
const PAD_IDLE_OPACITY: f32 = 0.25;

const PANEL_WIDTH: f32 = 480.0;
const PANEL_HEIGHT: f32 = 200.0;
const BAR_HEIGHT: f32 = 28.0;
const BAR_GAP: f32 = 20.0;

pub fn kind_color(kind: NoteKind) -> [f32; 4] {
    match kind {
        NoteKind::Agudo => [0.95, 0.55, 0.15, 1.0],
        NoteKind::Grave => [0.2, 0.45, 0.95, 1.0],
        NoteKind::Mao => [0.3, 0.85, 0.4, 1.0],
        NoteKind::Flam => [0.8, 0.3, 0.85, 1.0],
    }
}

fn with_alpha(mut color: [f32; 4], factor: f32) -> [f32; 4] {
    color[3] *= factor.clamp(0.0, 1.0);
    color
}

fn rect(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> QuadInstance {
    quad_from_rect(x, y, w, h, color, SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32)
}

fn centered(cx: f32, cy: f32, w: f32, h: f32, color: [f32; 4]) -> QuadInstance {
    quad_centered(cx, cy, w, h, color, SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32)
}

fn repique_color(repique: Repique, colors: &JudgementColors) -> [f32; 4] {
    match repique {
        Repique::Neutral => REPIQUE_NEUTRAL,
        Repique::Perfect => colors.perfect,
        Repique::Good => colors.good,
        Repique::Error => colors.miss,
    }
}

/// Builds every quad of a frame from a snapshot.
pub fn build_scene(snapshot: &GameplaySnapshot, colors: &JudgementColors) -> Vec<QuadInstance> {
    let mut quads = Vec::with_capacity(snapshot.notes.len() * 2 + 16);
    let lane_top = (LANE_BOTTOM - LANE_HEIGHT) as f32;
    let lane_height = LANE_HEIGHT as f32;
    let hit_line = snapshot.hit_line as f32;
    let radius = snapshot.note_radius as f32;

    quads.push(rect(0.0, lane_top, SCREEN_WIDTH as f32, lane_height, LANE_COLOR));

    if let Some(color) = snapshot.flash_color {
        let strength = snapshot.flash_intensity as f32 * FLASH_OPACITY;
        quads.push(rect(
            0.0,
            lane_top,
            SCREEN_WIDTH as f32,
            lane_height,
            with_alpha(color, strength),
        ));
    }

    quads.push(centered(
        hit_line,
        LANE_CENTER_Y as f32,
        radius * 2.0,
        lane_height,
        PERFECT_BAND_COLOR,
    ));
    quads.push(centered(
        hit_line,
        LANE_CENTER_Y as f32,
        HIT_LINE_WIDTH,
        lane_height,
        HIT_LINE_COLOR,
    ));
    quads.push(centered(
        REPIQUE_X,
        LANE_CENTER_Y as f32,
        REPIQUE_SIZE,
        REPIQUE_SIZE,
        repique_color(snapshot.repique, colors),
    ));

    // Pad lights sit under the hit line, one per pad.
    let pad_y = LANE_BOTTOM as f32 + PAD_OFFSET;
    for (i, key) in DrumKey::ALL.into_iter().enumerate() {
        let opacity = if snapshot.held_pads[i] { 1.0 } else { PAD_IDLE_OPACITY };
        quads.push(centered(
            hit_line + (i as f32 - 1.0) * PAD_SPACING,
            pad_y,
            PAD_SIZE,
            PAD_SIZE,
            with_alpha(kind_color(key.single_kind()), opacity),
        ));
    }

    for note in &snapshot.notes {
        let opacity = (note.alpha / ALPHA_MAX) as f32;
        let (x, y) = (note.x as f32, note.y as f32);
        if note.active {
            let ring = (radius + LEADER_RING) * 2.0;
            quads.push(centered(x, y, ring, ring, with_alpha(LEADER_RING_COLOR, opacity)));
        }
        quads.push(centered(
            x,
            y,
            radius * 2.0,
            radius * 2.0,
            with_alpha(kind_color(note.kind), opacity),
        ));
    }

    push_results(&mut quads, snapshot, colors);

    if snapshot.exit_alpha > 0.0 {
        let opacity = (snapshot.exit_alpha / ALPHA_MAX) as f32;
        quads.push(rect(
            0.0,
            0.0,
            SCREEN_WIDTH as f32,
            SCREEN_HEIGHT as f32,
            [0.0, 0.0, 0.0, opacity.clamp(0.0, 1.0)],
        ));
    }

    quads
}

/// Dim overlay, then a panel with one bar per judgement scaled to its share.
fn push_results(quads: &mut Vec<QuadInstance>, snapshot: &GameplaySnapshot, colors: &JudgementColors) {
    if snapshot.overlay_alpha > 0.0 {
        let opacity = (snapshot.overlay_alpha / ALPHA_MAX) as f32;
        quads.push(rect(
            0.0,
            0.0,
            SCREEN_WIDTH as f32,
            SCREEN_HEIGHT as f32,
            with_alpha(OVERLAY_COLOR, opacity),
        ));
    }

    if snapshot.results_alpha <= 0.0 {
        return;
    }
    let opacity = (snapshot.results_alpha / ALPHA_MAX) as f32;
    let panel_x = (SCREEN_WIDTH as f32 - PANEL_WIDTH) / 2.0;
    let panel_y = (SCREEN_HEIGHT as f32 - PANEL_HEIGHT) / 2.0;
    quads.push(rect(
        panel_x,
        panel_y,
        PANEL_WIDTH,
        PANEL_HEIGHT,
        with_alpha(PANEL_COLOR, opacity),
    ));

    let stats = &snapshot.hit_stats;
    let total = stats.judged().max(1) as f32;
    let bar_max = PANEL_WIDTH - BAR_GAP * 2.0;
    let mut y = panel_y + BAR_GAP * 1.5;
    for (count, color) in [
        (stats.perfect, colors.perfect),
        (stats.good, colors.good),
        (stats.miss, colors.miss),
    ] {
        let width = bar_max * count as f32 / total;
        if width > 0.0 {
            quads.push(rect(
                panel_x + BAR_GAP,
                y,
                width,
                BAR_HEIGHT,
                with_alpha(color, opacity),
            ));
        }
        y += BAR_HEIGHT + BAR_GAP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::tests::{harness, reach_hit_line};
    use crate::state::game::SessionState;

    #[test]
    fn playing_frame_draws_lane_and_notes() {
        let mut h = harness(&[(1.0, NoteKind::Agudo), (1.5, NoteKind::Mao)]);
        reach_hit_line(&mut h.session, 1.0);
        let snapshot = h.session.snapshot();
        let quads = build_scene(&snapshot, &JudgementColors::default());

        // Lane, band, hit line, repique, three pads, plus one ring for the leader.
        let fixed = 4 + DrumKey::ALL.len() + snapshot.notes.len() + 1;
        assert_eq!(quads.len(), fixed);
        assert!(quads.iter().any(|q| q.color == kind_color(NoteKind::Agudo)));
    }

    #[test]
    fn held_pad_lights_up() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        h.session.update(0.016);
        let mut snapshot = h.session.snapshot();
        snapshot.held_pads = [false, false, true];
        let quads = build_scene(&snapshot, &JudgementColors::default());
        let lit = with_alpha(kind_color(NoteKind::Mao), 1.0);
        let idle = with_alpha(kind_color(NoteKind::Agudo), PAD_IDLE_OPACITY);
        assert!(quads.iter().any(|q| q.color == lit));
        assert!(quads.iter().any(|q| q.color == idle));
    }

    #[test]
    fn faded_note_is_translucent() {
        let mut h = harness(&[(1.0, NoteKind::Grave)]);
        reach_hit_line(&mut h.session, 1.0);
        let mut snapshot = h.session.snapshot();
        snapshot.notes[0].alpha = ALPHA_MAX / 2.0;
        snapshot.notes[0].active = false;
        let quads = build_scene(&snapshot, &JudgementColors::default());
        let note = quads.last().unwrap();
        assert!((note.color[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn results_bars_follow_counts() {
        let mut h = harness(&[]);
        h.session.update(0.016);
        let mut snapshot = h.session.snapshot();
        snapshot.state = SessionState::ShowResults;
        snapshot.overlay_alpha = ALPHA_MAX;
        snapshot.results_alpha = ALPHA_MAX;
        snapshot.hit_stats.perfect = 3;
        snapshot.hit_stats.miss = 1;
        let colors = JudgementColors::default();
        let quads = build_scene(&snapshot, &colors);

        let perfect = quads.iter().find(|q| q.color == colors.perfect).unwrap();
        let miss = quads.iter().find(|q| q.color == colors.miss).unwrap();
        assert!((perfect.size[0] - miss.size[0] * 3.0).abs() < 1e-5);
        assert!(!quads.iter().any(|q| q.color == colors.good));
    }
}
