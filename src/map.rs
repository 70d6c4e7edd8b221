use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use log::{debug, warn};
use macroquad::prelude::*;

use crate::loader::tmx_loader::decode_tmx_file;

/// Map orientation as declared in the TMX root element.
///
/// All four orientations are parsed, but only [Orthogonal](Orientation::Orthogonal)
/// maps are actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl std::str::FromStr for Orientation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        use Orientation::*;
        match s {
            "orthogonal" => Ok(Orthogonal),
            "isometric" => Ok(Isometric),
            "staggered" => Ok(Staggered),
            "hexagonal" => Ok(Hexagonal),
            _ => Err(()),
        }
    }
}

/// Allowed tile transformations, from a tileset's `<transformations>` child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transformations {
    pub hflip: bool,
    pub vflip: bool,
    pub rotate: bool,
    pub prefer_untransformed: bool,
}

/// A typed custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Color(Color),
    File(String),
    Float(f32),
    Int(i32),
    /// Reference to another object, by id
    Object(i32),
    String(String),
}

/// One `<property>` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: u32,
    pub name: String,
    pub value: PropertyValue,
}

/// An ordered collection of custom properties with typed accessors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties(pub Vec<Property>);

impl Properties {
    pub fn new() -> Self {
        Properties(Vec::new())
    }

    pub fn push(&mut self, prop: Property) {
        self.0.push(prop);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            PropertyValue::Int(v) | PropertyValue::Object(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) | PropertyValue::File(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            PropertyValue::Color(v) => Some(*v),
            _ => None,
        }
    }
}

/// Shape kind of a placed object, inferred from its first shape child element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    /// Plain rectangle, no shape child present
    #[default]
    Default,
    Ellipse,
    Point,
    Polygon,
    Text,
}

/// A placed entity inside an [ObjectGroup].
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub id: u32,
    pub name: String,
    pub class: String,
    /// Packed GID; 0 for pure shapes, nonzero when the object renders a tile
    pub gid: u32,
    pub bounds: Rect,
    /// Rotation in degrees
    pub rotation: f32,
    pub visible: bool,
    pub shape: ShapeKind,
    pub properties: Properties,
    /// Name of the enclosing group, for diagnostics only
    pub parent: String,
}

/// A grid of packed tile ids the size of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub class: String,
    pub width: u32,
    pub height: u32,
    pub opacity: f32,
    pub visible: bool,
    /// Row-major packed GIDs, `cell = row * width + col`; 0 means empty
    pub data: Vec<u32>,
    pub properties: Properties,
    /// Name of the enclosing group, for diagnostics only
    pub parent: String,
}

/// A named container of other layers, used for organization and bulk
/// visibility toggling. Groups nest to unbounded depth.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    pub properties: Properties,
    pub parent: String,
    /// Child nodes in document order
    pub contents: Vec<Node>,
}

impl Group {
    pub fn add_node(&mut self, node: Node) {
        self.contents.push(node);
    }
}

/// An ordered list of placed objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroup {
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    pub objects: Vec<Object>,
    pub properties: Properties,
    pub parent: String,
}

impl ObjectGroup {
    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }
}

/// A single free-floating image. Parsed, but not drawn yet.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub name: String,
    pub class: String,
    pub opacity: f32,
    pub visible: bool,
    pub offset: Vec2,
    pub repeat_x: bool,
    pub repeat_y: bool,
    pub image_source: String,
    /// Transparency color from the image's `trans` attribute
    pub transparent: Option<Color>,
    pub texture: Option<Texture2D>,
    pub properties: Properties,
    pub parent: String,
}

/// One entry of a map's (or group's) ordered contents sequence.
///
/// Both the renderer and the queries dispatch on this enum, so traversal
/// order and visibility short-circuiting stay in one place.
#[derive(Debug, Clone)]
pub enum Node {
    Layer(TileLayer),
    Group(Group),
    Objects(ObjectGroup),
    Image(ImageLayer),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Layer(l) => &l.name,
            Node::Group(g) => &g.name,
            Node::Objects(o) => &o.name,
            Node::Image(i) => &i.name,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            Node::Layer(l) => l.visible,
            Node::Group(g) => g.visible,
            Node::Objects(o) => o.visible,
            Node::Image(i) => i.visible,
        }
    }

    pub fn as_tile_layer(&self) -> Option<&TileLayer> {
        match self {
            Node::Layer(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_object_group(&self) -> Option<&ObjectGroup> {
        match self {
            Node::Objects(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_image_layer(&self) -> Option<&ImageLayer> {
        match self {
            Node::Image(i) => Some(i),
            _ => None,
        }
    }
}

/// A named range of tile ids backed by one source image, sliced into
/// fixed-size quads at load time.
#[derive(Debug, Clone)]
pub struct Tileset {
    /// First global id this tileset claims
    pub first_gid: u32,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    /// 0 means "infer from tile_count"
    pub columns: u32,
    pub visible: bool,
    pub tile_offset: Vec2,
    pub transformations: Transformations,
    pub image_source: String,
    /// Transparency color from the image's `trans` attribute
    pub transparent: Option<Color>,
    pub texture: Option<Texture2D>,
    /// Source rectangle per absolute tile id, precomputed at load time
    pub quads: HashMap<u32, Rect>,
}

impl Tileset {
    /// Whether `id` falls inside this tileset's claimed range
    /// `[first_gid, first_gid + tile_count)`.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        id >= self.first_gid && id < self.first_gid + self.tile_count
    }

    /// Walk rows and columns with margin and spacing offsets, storing one
    /// quad per absolute tile id.
    pub fn build_quads(&mut self) {
        let columns = if self.columns > 0 {
            self.columns
        } else {
            self.tile_count.max(1)
        };
        self.quads = (0..self.tile_count)
            .map(|index| {
                let row = index / columns;
                let col = index % columns;
                let x = self.margin + col * (self.tile_width + self.spacing);
                let y = self.margin + row * (self.tile_height + self.spacing);
                (
                    self.first_gid + index,
                    Rect::new(
                        x as f32,
                        y as f32,
                        self.tile_width as f32,
                        self.tile_height as f32,
                    ),
                )
            })
            .collect();
    }
}

/// The top-level scene produced by a load.
///
/// `contents` preserves document order, which is also the draw and lookup
/// order. The map owns all of its children exclusively; nothing is removed
/// or restructured after a load.
#[derive(Debug, Clone)]
pub struct TileMap {
    pub orientation: Orientation,
    pub render_order: String,
    /// Grid size in tiles
    pub width: u32,
    pub height: u32,
    /// Tile size in pixels
    pub tile_width: u32,
    pub tile_height: u32,
    pub infinite: bool,
    /// Global render scale applied to every destination rectangle
    pub scale: f32,
    /// Global pixel offset applied to every destination rectangle
    pub offset: Vec2,
    pub tilesets: Vec<Tileset>,
    pub contents: Vec<Node>,
    pub properties: Properties,
}

impl Default for TileMap {
    fn default() -> Self {
        TileMap {
            orientation: Orientation::Orthogonal,
            render_order: "left-up".to_string(),
            width: 0,
            height: 0,
            tile_width: 0,
            tile_height: 0,
            infinite: false,
            scale: 1.0,
            offset: Vec2::ZERO,
            tilesets: Vec::new(),
            contents: Vec::new(),
            properties: Properties::new(),
        }
    }
}

impl TileMap {
    pub fn add_tileset(&mut self, tileset: Tileset) {
        self.tilesets.push(tileset);
    }

    pub fn add_node(&mut self, node: Node) {
        self.contents.push(node);
    }

    /// First tileset whose id range contains `id`, in declaration order.
    ///
    /// Ranges are expected not to overlap; if they do, declaration order
    /// decides. `None` means the id is not drawable.
    #[inline]
    pub fn tileset_for(&self, id: u32) -> Option<&Tileset> {
        self.tilesets.iter().find(|ts| ts.contains(id))
    }

    /// Load a TMX map from a file and resolve every referenced image into
    /// a texture.
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let (mut map, base_dir) = decode_tmx_file(path)?;
        map.resolve_images(&base_dir).await?;
        debug!(
            "loaded {}: {}x{} tiles, {} tilesets, {} top-level nodes",
            path,
            map.width,
            map.height,
            map.tilesets.len(),
            map.contents.len()
        );
        Ok(map)
    }

    /// Load every tileset and image-layer texture relative to `base_dir`.
    pub async fn resolve_images(&mut self, base_dir: &Path) -> anyhow::Result<()> {
        let mut sources: Vec<String> = self
            .tilesets
            .iter()
            .map(|ts| ts.image_source.clone())
            .collect();
        collect_image_sources(&self.contents, &mut sources);

        let mut textures: HashMap<String, Texture2D> = HashMap::new();
        for source in sources {
            if source.is_empty() {
                warn!("skipping image with empty source");
                continue;
            }
            if textures.contains_key(&source) {
                continue;
            }
            let path = base_dir.join(&source);
            let tex = load_texture(&path.to_string_lossy())
                .await
                .with_context(|| format!("Loading texture {}", source))?;
            tex.set_filter(FilterMode::Nearest);
            textures.insert(source, tex);
        }

        for ts in &mut self.tilesets {
            ts.texture = textures.get(&ts.image_source).cloned();
        }
        assign_image_textures(&mut self.contents, &textures);
        Ok(())
    }
}

fn collect_image_sources(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Image(image) => out.push(image.image_source.clone()),
            Node::Group(group) => collect_image_sources(&group.contents, out),
            _ => {}
        }
    }
}

fn assign_image_textures(nodes: &mut [Node], textures: &HashMap<String, Texture2D>) {
    for node in nodes {
        match node {
            Node::Image(image) => {
                image.texture = textures.get(&image.image_source).cloned();
            }
            Node::Group(group) => assign_image_textures(&mut group.contents, textures),
            _ => {}
        }
    }
}
