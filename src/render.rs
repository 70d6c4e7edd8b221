use macroquad::prelude::*;

use crate::gid::{self, DecodedGid};
use crate::map::{Node, ObjectGroup, TileLayer, TileMap, Tileset};

/// The drawing surface the map renderer needs.
///
/// The renderer resolves tilesets, quads, origins and tints; an
/// implementation only has to blit one rectangular region. `layer` is the
/// name of the node being drawn, for diagnostics.
pub trait RenderTarget {
    #[allow(clippy::too_many_arguments)]
    fn draw_region(
        &mut self,
        tileset: &Tileset,
        source: Rect,
        dest: Rect,
        tint: Color,
        rotation: f32,
        origin: Vec2,
        flip_y: bool,
        layer: &str,
    );
}

/// Draws straight to the macroquad frame buffer.
pub struct ScreenTarget;

impl RenderTarget for ScreenTarget {
    fn draw_region(
        &mut self,
        tileset: &Tileset,
        source: Rect,
        dest: Rect,
        tint: Color,
        rotation: f32,
        origin: Vec2,
        flip_y: bool,
        _layer: &str,
    ) {
        let Some(texture) = tileset.texture.as_ref() else {
            return;
        };
        draw_texture_ex(
            texture,
            dest.x - origin.x,
            dest.y - origin.y,
            tint,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: Some(source),
                rotation,
                flip_x: false,
                flip_y,
                pivot: Some(vec2(dest.x, dest.y)),
            },
        );
    }
}

fn opacity_tint(opacity: f32) -> Color {
    // white * opacity, multiplied through every channel
    Color::new(opacity, opacity, opacity, opacity)
}

fn layer_origin(decoded: &DecodedGid, quad: Rect, tile_w: f32, tile_h: f32) -> (Vec2, bool) {
    if decoded.rotation > 0.0 {
        (vec2(quad.w - tile_w, quad.h), false)
    } else if decoded.rotation < 0.0 {
        (vec2(tile_w, 0.0), false)
    } else if decoded.flipped_both() {
        (vec2(tile_w - quad.w, quad.h - tile_h), true)
    } else {
        // tiles taller than the grid hang upwards out of their cell
        (vec2(0.0, quad.h - tile_h), false)
    }
}

fn object_origin(rotation: f32, decoded: &DecodedGid, quad: Rect, tile_w: f32, tile_h: f32) -> (Vec2, bool) {
    if rotation != 0.0 {
        (vec2(quad.w - tile_w, quad.h), false)
    } else if decoded.flipped_both() {
        (vec2(tile_w - quad.w, quad.h - tile_h), true)
    } else {
        // GID objects anchor at the bottom-left of their bounds
        (vec2(0.0, quad.h), false)
    }
}

impl TileMap {
    /// Draw every visible layer, group, object group and image layer in
    /// declaration order.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        for node in &self.contents {
            self.draw_node(node, target);
        }
    }

    /// [TileMap::draw] onto the macroquad frame buffer.
    pub fn draw_to_screen(&self) {
        self.draw(&mut ScreenTarget);
    }

    fn draw_node(&self, node: &Node, target: &mut dyn RenderTarget) {
        // a hidden node hides its entire subtree
        if !node.visible() {
            return;
        }
        match node {
            Node::Group(group) => {
                for child in &group.contents {
                    self.draw_node(child, target);
                }
            }
            Node::Layer(layer) => self.draw_tile_layer(layer, target),
            Node::Objects(group) => self.draw_object_group(group, target),
            // image layers are parsed but not drawn yet
            Node::Image(_) => {}
        }
    }

    fn draw_tile_layer(&self, layer: &TileLayer, target: &mut dyn RenderTarget) {
        let tile_w = self.tile_width as f32;
        let tile_h = self.tile_height as f32;

        for row in 0..layer.height {
            for col in 0..layer.width {
                let raw = layer.data[(row * layer.width + col) as usize];
                let decoded = gid::decode(raw);
                if decoded.id == 0 {
                    continue;
                }
                let Some(tileset) = self.tileset_for(decoded.id) else {
                    continue;
                };
                let Some(&quad) = tileset.quads.get(&decoded.id) else {
                    continue;
                };

                let dest = Rect::new(
                    col as f32 * tile_w * self.scale + self.offset.x,
                    row as f32 * tile_h * self.scale + self.offset.y,
                    tileset.tile_width as f32 * self.scale,
                    tileset.tile_height as f32 * self.scale,
                );
                let (origin, flip_y) = layer_origin(&decoded, quad, tile_w, tile_h);

                target.draw_region(
                    tileset,
                    quad,
                    dest,
                    opacity_tint(layer.opacity),
                    decoded.rotation,
                    origin,
                    flip_y,
                    &layer.name,
                );
            }
        }
    }

    fn draw_object_group(&self, group: &ObjectGroup, target: &mut dyn RenderTarget) {
        let tile_w = self.tile_width as f32;
        let tile_h = self.tile_height as f32;

        for object in &group.objects {
            if object.gid == 0 || !object.visible {
                continue;
            }
            let decoded = gid::decode(object.gid);
            if decoded.id == 0 {
                continue;
            }
            let Some(tileset) = self.tileset_for(decoded.id) else {
                continue;
            };
            let Some(&quad) = tileset.quads.get(&decoded.id) else {
                continue;
            };

            let rotation = decoded.rotation + object.rotation.to_radians();
            let dest = Rect::new(
                object.bounds.x * self.scale + self.offset.x,
                object.bounds.y * self.scale + self.offset.y,
                object.bounds.w * self.scale,
                object.bounds.h * self.scale,
            );
            let (origin, flip_y) = object_origin(rotation, &decoded, quad, tile_w, tile_h);

            target.draw_region(
                tileset,
                quad,
                dest,
                opacity_tint(group.opacity),
                rotation,
                origin,
                flip_y,
                &group.name,
            );
        }
    }
}
