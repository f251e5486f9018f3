//! Default keyboard and mouse bindings
//!
//! | Input | Action |
//! |---|---|
//! | `w` / `s` | pitch up / down |
//! | `a` / `d` | yaw left / right |
//! | `=` / `-` | dolly in / out |
//! | `0` | toggle orthographic projection |
//! | `shift + r` | reset camera |
//! | `'` | toggle distance rings |
//! | `[` / `]` | shrink / grow ring spacing |
//! | `esc` | stop the render loop |
//! | left drag | orbit |
//! | middle drag | pan |
//! | scroll | dolly |

use crate::input::{Key, KeyEvent, WindowCtx};
use crate::viz::PointVizHandle;

const KEY_ANGLE_STEP: f64 = 5.0;
const KEY_DOLLY_STEP: f64 = 5.0;
const SCROLL_DOLLY_STEP: f64 = 5.0;
/// Degrees of rotation per pixel of mouse drag.
const ORBIT_SENSITIVITY: f64 = 0.3;
const MIN_RING_SIZE: i32 = -2;
const MAX_RING_SIZE: i32 = 2;

/// Register the default camera and loop controls.
pub fn add_default_controls(viz: &PointVizHandle) {
    viz.push_key_handler(handle_key);

    viz.push_mouse_pos_handler(|viz: &PointVizHandle, ctx: &WindowCtx, x: f64, y: f64| {
        let dx = x - ctx.mouse_x;
        let dy = y - ctx.mouse_y;
        if ctx.lbutton_down {
            let mut scene = viz.lock();
            let camera = scene.camera_mut();
            camera.yaw(ORBIT_SENSITIVITY * dx);
            camera.pitch(ORBIT_SENSITIVITY * dy);
            true
        } else if ctx.mbutton_down {
            // half the window height is one view distance at the target
            let height = ctx.viewport_height.max(1) as f64;
            viz.lock()
                .camera_mut()
                .dolly_xy(-2.0 * dx / height, 2.0 * dy / height);
            true
        } else {
            false
        }
    });

    viz.push_scroll_handler(|viz: &PointVizHandle, _ctx: &WindowCtx, _x: f64, y: f64| {
        viz.lock().camera_mut().dolly(-SCROLL_DOLLY_STEP * y);
        true
    });
}

fn handle_key(viz: &PointVizHandle, _ctx: &WindowCtx, event: KeyEvent) -> bool {
    if !event.action.is_down() {
        return false;
    }
    let mods = event.mods;
    if mods.ctrl || mods.alt || mods.cmd {
        return false;
    }

    if mods.shift {
        if event.key == Key::R {
            viz.lock().camera_mut().reset();
            return true;
        }
        return false;
    }

    let mut scene = viz.lock();
    match event.key {
        Key::W => scene.camera_mut().pitch(KEY_ANGLE_STEP),
        Key::S => scene.camera_mut().pitch(-KEY_ANGLE_STEP),
        Key::A => scene.camera_mut().yaw(KEY_ANGLE_STEP),
        Key::D => scene.camera_mut().yaw(-KEY_ANGLE_STEP),
        Key::Equal => scene.camera_mut().dolly(-KEY_DOLLY_STEP),
        Key::Minus => scene.camera_mut().dolly(KEY_DOLLY_STEP),
        Key::Key0 => {
            let camera = scene.camera_mut();
            let ortho = camera.is_orthographic();
            camera.set_orthographic(!ortho);
        }
        Key::Apostrophe => {
            let display = scene.target_display_mut();
            let enabled = display.rings_enabled();
            display.enable_rings(!enabled);
        }
        Key::LeftBracket => {
            let display = scene.target_display_mut();
            let size = (display.ring_size() - 1).max(MIN_RING_SIZE);
            display.set_ring_size(size);
        }
        Key::RightBracket => {
            let display = scene.target_display_mut();
            let size = (display.ring_size() + 1).min(MAX_RING_SIZE);
            display.set_ring_size(size);
        }
        Key::Esc => {
            drop(scene);
            viz.set_running(false);
        }
        _ => return false,
    }
    true
}
