//! TMX (Tiled XML) map loader, renderer & scene queries for Macroquad.
//!
//! [TileMap::load] turns a Tiled map document into a scene graph that can
//! be drawn every frame with [TileMap::draw] and inspected with the query
//! methods (`get_layer`, `get_object_from_name`, ...). Parsing is pure and
//! side-effect free; textures are resolved in a second step so the model
//! stays fully testable without a window.

mod error;
pub mod gid;
mod loader {
    pub mod tmx_loader;
}
pub mod map;
mod query;
mod render;

pub use error::MapError;
pub use loader::tmx_loader::{decode_tmx_file, decode_tmx_str};
pub use map::{
    Group, ImageLayer, Node, Object, ObjectGroup, Orientation, Properties, Property,
    PropertyValue, ShapeKind, TileLayer, TileMap, Tileset, Transformations,
};
pub use render::{RenderTarget, ScreenTarget};
