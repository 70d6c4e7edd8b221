use macroquad::prelude::*;

use crate::map::{Node, Object, TileMap};

/// Read-only lookups over the map's contents tree. All of them traverse
/// depth-first in declaration order and recurse into groups; none of them
/// mutate the model or raise for "not found".
impl TileMap {
    /// First node of any kind whose name matches, case-insensitively.
    pub fn get_layer(&self, name: &str) -> Option<&Node> {
        find_node(&self.contents, name)
    }

    /// Raw packed id of the first nonzero cell under a pixel coordinate,
    /// scanning nested tile layers in declaration order. Returns 0 when the
    /// coordinate misses the map or every layer is empty there. The result
    /// is not GID-decoded.
    pub fn get_tile_id_from_coord(&self, pos: Vec2) -> u32 {
        if self.tile_width == 0 || self.tile_height == 0 {
            return 0;
        }
        let col = (pos.x / self.tile_width as f32).floor() as i64;
        let row = (pos.y / self.tile_height as f32).floor() as i64;
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return 0;
        }
        first_tile_id(&self.contents, col as u32, row as u32)
    }

    /// Every object whose bounds rectangle contains the point, in discovery
    /// order. Plain rectangular containment, regardless of shape kind.
    pub fn get_objects_from_coord(&self, pos: Vec2) -> Vec<&Object> {
        let mut found = Vec::new();
        collect_objects(&self.contents, &|o| o.bounds.contains(pos), &mut found);
        found
    }

    /// First object whose name matches, case-insensitively.
    pub fn get_object_from_name(&self, name: &str) -> Option<&Object> {
        find_object(&self.contents, &|o| o.name.eq_ignore_ascii_case(name))
    }

    /// Every object whose class matches, case-insensitively, in declaration
    /// order.
    pub fn get_objects_from_class(&self, class: &str) -> Vec<&Object> {
        let mut found = Vec::new();
        collect_objects(
            &self.contents,
            &|o| o.class.eq_ignore_ascii_case(class),
            &mut found,
        );
        found
    }

    /// First object with this exact id.
    pub fn get_object_from_id(&self, id: u32) -> Option<&Object> {
        find_object(&self.contents, &|o| o.id == id)
    }
}

impl Object {
    /// Whether the point lies inside this object.
    ///
    /// Objects carrying a GID are anchored at the bottom-left of their
    /// bounds, so the test rectangle sits one height above the stored one.
    /// [TileMap::get_objects_from_coord] does not apply this correction.
    pub fn contains(&self, point: Vec2) -> bool {
        if self.gid == 0 {
            self.bounds.contains(point)
        } else {
            Rect::new(
                self.bounds.x,
                self.bounds.y - self.bounds.h,
                self.bounds.w,
                self.bounds.h,
            )
            .contains(point)
        }
    }
}

fn find_node<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.name().eq_ignore_ascii_case(name) {
            return Some(node);
        }
        if let Node::Group(group) = node {
            if let Some(found) = find_node(&group.contents, name) {
                return Some(found);
            }
        }
    }
    None
}

fn first_tile_id(nodes: &[Node], col: u32, row: u32) -> u32 {
    for node in nodes {
        match node {
            Node::Layer(layer) => {
                if col >= layer.width {
                    continue;
                }
                let index = (row * layer.width + col) as usize;
                if let Some(&id) = layer.data.get(index) {
                    if id != 0 {
                        return id;
                    }
                }
            }
            Node::Group(group) => {
                let id = first_tile_id(&group.contents, col, row);
                if id != 0 {
                    return id;
                }
            }
            _ => {}
        }
    }
    0
}

fn find_object<'a>(nodes: &'a [Node], matches: &dyn Fn(&Object) -> bool) -> Option<&'a Object> {
    for node in nodes {
        match node {
            Node::Objects(group) => {
                if let Some(found) = group.objects.iter().find(|&o| matches(o)) {
                    return Some(found);
                }
            }
            Node::Group(group) => {
                if let Some(found) = find_object(&group.contents, matches) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn collect_objects<'a>(
    nodes: &'a [Node],
    matches: &dyn Fn(&Object) -> bool,
    out: &mut Vec<&'a Object>,
) {
    for node in nodes {
        match node {
            Node::Objects(group) => out.extend(group.objects.iter().filter(|&o| matches(o))),
            Node::Group(group) => collect_objects(&group.contents, matches, out),
            _ => {}
        }
    }
}
