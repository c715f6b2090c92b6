//! World Renderer
//!
//! Draws the world with macroquad immediate-mode calls, back to front:
//! background, ground, obstacles, fires, labels, extinguishers, player,
//! particles, then the HUD bars.

use macroquad::prelude::*;

use super::entity::{EntityKind, EntityStore, ExtinguisherBody, PlayerBody};
use super::geometry::Bounds;
use super::particles::ParticlePool;
use crate::settings::Settings;

pub const BACKGROUND: Color = Color::new(17.0 / 255.0, 17.0 / 255.0, 17.0 / 255.0, 1.0);
const GROUND_COLOR: Color = Color::new(0.16, 0.2, 0.16, 1.0);
const LABEL_COLOR: Color = Color::new(0.85, 0.85, 0.85, 1.0);
/// Top of the HUD, below the editor banner so both stay readable
pub const HUD_TOP: f32 = 36.0;
/// On-screen scale of the extinguisher sprite
const EXTINGUISHER_SCALE: f32 = 0.35;

/// Textures the renderer can use; everything falls back to shapes
#[derive(Default)]
pub struct RenderAssets {
    pub extinguisher: Option<Texture2D>,
}

/// Fire colour: dim orange at low intensity, bright yellow-orange when fully grown
pub fn fire_color(intensity: f32) -> Color {
    let t = intensity.clamp(0.0, 1.0);
    Color::new(1.0, 0.3 + 0.4 * t, 0.1, 0.25 + 0.6 * t)
}

/// Health bar colour, green to red
pub fn health_color(fraction: f32) -> Color {
    let f = fraction.clamp(0.0, 1.0);
    Color::new(1.0 - f, f, 0.2, 1.0)
}

fn fill(b: &Bounds, color: Color) {
    draw_rectangle(b.x, b.y, b.w, b.h, color);
}

fn draw_bar(x: f32, y: f32, w: f32, fraction: f32, color: Color) {
    draw_rectangle(x, y, w, 6.0, Color::new(0.0, 0.0, 0.0, 0.6));
    draw_rectangle(x, y, w * fraction.clamp(0.0, 1.0), 6.0, color);
}

/// Draw the whole world
pub fn draw_world(store: &EntityStore, particles: &ParticlePool, assets: &RenderAssets, settings: &Settings) {
    clear_background(BACKGROUND);

    for b in store.grounds() {
        fill(&b, GROUND_COLOR);
    }
    for b in store.obstacles() {
        fill(&b, GRAY);
    }

    for entity in store.iter() {
        match &entity.kind {
            EntityKind::Fire(zone) => fill(&zone.bounds, fire_color(zone.intensity)),
            EntityKind::HelpText(label) => {
                draw_text(&label.text, label.position.x, label.position.y, label.font_size as f32, LABEL_COLOR);
            }
            _ => {}
        }
    }

    for entity in store.iter() {
        if let EntityKind::Extinguisher(ext) = &entity.kind {
            draw_extinguisher(ext, assets, settings.physics.extinguisher_radius);
        }
    }

    if let Some((_, player)) = store.player() {
        draw_player(player, settings.physics.player_radius);
    }

    for (_, p) in particles.alive() {
        let mut color = p.color;
        color.a *= p.fade();
        draw_circle(p.position.x, p.position.y, 2.0, color);
    }

    draw_hud(store);
}

fn draw_extinguisher(ext: &ExtinguisherBody, assets: &RenderAssets, radius: f32) {
    match &assets.extinguisher {
        Some(texture) => {
            let size = vec2(texture.width(), texture.height()) * EXTINGUISHER_SCALE;
            draw_texture_ex(
                texture,
                ext.position.x - size.x * 0.5,
                ext.position.y - size.y * 0.5,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(size),
                    ..Default::default()
                },
            );
        }
        None => {
            draw_circle(ext.position.x, ext.position.y, radius, RED);
            draw_rectangle(ext.position.x - 3.0, ext.position.y - radius - 6.0, 6.0, 8.0, DARKGRAY);
        }
    }

    // Charge gauge under the body
    let w = radius * 2.0;
    draw_bar(ext.position.x - radius, ext.position.y + radius + 4.0, w, ext.charge.fraction(), SKYBLUE);
}

fn draw_player(player: &PlayerBody, radius: f32) {
    draw_circle(player.position.x, player.position.y, radius, PINK);
    draw_circle_lines(player.position.x, player.position.y, radius, 1.5, Color::new(0.0, 0.0, 0.0, 0.5));
}

fn draw_hud(store: &EntityStore) {
    let Some((_, player)) = store.player() else {
        return;
    };
    let health = player.health.fraction();
    draw_text("Health", 10.0, HUD_TOP + 10.0, 18.0, WHITE);
    draw_bar(70.0, HUD_TOP, 150.0, health, health_color(health));

    let fires = store.count_fires();
    if fires > 0 {
        draw_text(&format!("Fires: {}", fires), 240.0, HUD_TOP + 10.0, 18.0, ORANGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_color_brightens_with_intensity() {
        let dim = fire_color(0.0);
        let bright = fire_color(1.0);
        assert!(bright.g > dim.g);
        assert!(bright.a > dim.a);
        assert_eq!(fire_color(5.0), bright);
    }

    #[test]
    fn test_hud_clears_editor_banner() {
        // Text is drawn from its baseline, so its top sits about one font size above
        assert!(HUD_TOP + 10.0 - 18.0 >= crate::editor::BANNER_HEIGHT);
    }

    #[test]
    fn test_health_color_ends() {
        assert_eq!(health_color(1.0).g, 1.0);
        assert_eq!(health_color(0.0).r, 1.0);
    }
}
